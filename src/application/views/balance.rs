use super::{ViewCell, ViewState};
use crate::application::validation::BalanceForm;
use crate::domain::ports::{BalanceReply, SharedPaymentApi};
use crate::error::{PaymentError, Result};
use tokio::sync::watch;
use tracing::warn;

pub const BALANCE_FAILURE_MESSAGE: &str = "Error fetching balance. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceOutcome {
    Balance(String),
    Rejected(String),
    Failed(String),
}

impl BalanceOutcome {
    pub fn message(&self) -> &str {
        match self {
            BalanceOutcome::Balance(text)
            | BalanceOutcome::Rejected(text)
            | BalanceOutcome::Failed(text) => text,
        }
    }

    /// Rejections and failures are styled as errors.
    pub fn is_error(&self) -> bool {
        !matches!(self, BalanceOutcome::Balance(_))
    }
}

pub struct BalanceView {
    api: SharedPaymentApi,
    pub form: BalanceForm,
    state: ViewCell<BalanceOutcome>,
}

impl BalanceView {
    pub fn new(api: SharedPaymentApi) -> Self {
        Self {
            api,
            form: BalanceForm::default(),
            state: ViewCell::new(),
        }
    }

    pub fn state(&self) -> ViewState<BalanceOutcome> {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<BalanceOutcome>> {
        self.state.subscribe()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.state.is_loading() && self.form.submit_enabled()
    }

    pub async fn check(&mut self) -> Result<BalanceOutcome> {
        let (account, ifsc) = self.form.validate().map_err(PaymentError::from)?;

        let _loading = self.state.begin();
        let outcome = match self.api.check_balance(&account, &ifsc).await {
            Ok(BalanceReply::Balance(text)) => BalanceOutcome::Balance(text),
            Ok(BalanceReply::Rejected(text)) => BalanceOutcome::Rejected(text),
            Err(err) => {
                warn!(error = %err, "balance lookup failed");
                BalanceOutcome::Failed(BALANCE_FAILURE_MESSAGE.to_string())
            }
        };
        self.state.set(ViewState::Resolved(outcome.clone()));
        Ok(outcome)
    }

    /// "Try Again": empty form, nothing shown.
    pub fn try_again(&mut self) {
        self.form.reset();
        self.state.set(ViewState::Idle);
    }
}
