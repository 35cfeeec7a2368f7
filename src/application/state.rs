use crate::domain::payment::PaymentState;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Holds the payment awaiting OTP confirmation for the current session.
///
/// Clones share the same cell. Every change is pushed to subscribers, which is
/// how views know to re-render.
#[derive(Clone)]
pub struct PaymentStateStore {
    cell: Arc<watch::Sender<Option<PaymentState>>>,
}

impl Default for PaymentStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentStateStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { cell: Arc::new(tx) }
    }

    pub fn get(&self) -> Option<PaymentState> {
        self.cell.borrow().clone()
    }

    pub fn is_present(&self) -> bool {
        self.cell.borrow().is_some()
    }

    pub fn set(&self, state: PaymentState) {
        info!(method = %state.method(), "payment state stored");
        self.cell.send_replace(Some(state));
    }

    /// Returns the state that was held, if any.
    pub fn clear(&self) -> Option<PaymentState> {
        let previous = self.cell.send_replace(None);
        if previous.is_some() {
            info!("payment state cleared");
        }
        previous
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PaymentState>> {
        self.cell.subscribe()
    }
}
