use super::{ViewCell, ViewState};
use crate::application::validation::{AccountNumberField, Field, HandleField, submit_enabled};
use crate::domain::payment::PaymentMethod;
use crate::domain::ports::{HistoryQuery, HistoryReply, SharedPaymentApi};
use crate::error::{FieldError, PaymentError, Result};
use tokio::sync::watch;
use tracing::warn;

pub const HISTORY_FAILURE_MESSAGE: &str = "Unable to fetch transactions. Please try again.";

/// Transaction history lookup by account number or UPI handle.
pub struct HistoryView {
    api: SharedPaymentApi,
    option: PaymentMethod,
    pub account: AccountNumberField,
    pub handle: HandleField,
    state: ViewCell<HistoryReply>,
}

impl HistoryView {
    pub fn new(api: SharedPaymentApi) -> Self {
        Self {
            api,
            option: PaymentMethod::Account,
            account: AccountNumberField::default(),
            handle: HandleField::default(),
            state: ViewCell::new(),
        }
    }

    pub fn option(&self) -> PaymentMethod {
        self.option
    }

    /// Switching lookup kind wipes both inputs and any shown result.
    pub fn select(&mut self, option: PaymentMethod) {
        self.option = option;
        self.account.reset();
        self.handle.reset();
        self.state.set(ViewState::Idle);
    }

    pub fn state(&self) -> ViewState<HistoryReply> {
        self.state.get()
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState<HistoryReply>> {
        self.state.subscribe()
    }

    pub fn submit_enabled(&self) -> bool {
        !self.state.is_loading()
            && match self.option {
                PaymentMethod::Account => submit_enabled(&[&self.account]),
                PaymentMethod::Upi => submit_enabled(&[&self.handle]),
            }
    }

    fn query(&self) -> std::result::Result<HistoryQuery, FieldError> {
        let (field, name) = match self.option {
            PaymentMethod::Account => (&self.account as &dyn Field, "Account number"),
            PaymentMethod::Upi => (&self.handle as &dyn Field, "UPI ID"),
        };
        if let Some(err) = field.error() {
            return Err(err.clone());
        }
        if field.is_empty() {
            return Err(FieldError::Missing(name));
        }
        let value = field.value().trim().to_string();
        Ok(match self.option {
            PaymentMethod::Account => HistoryQuery::Account(value),
            PaymentMethod::Upi => HistoryQuery::Upi(value),
        })
    }

    /// Fetches the history. Records come back newest first; "nothing found"
    /// and "lookup failed" stay distinct.
    pub async fn lookup(&mut self) -> Result<HistoryReply> {
        let query = self.query().map_err(PaymentError::from)?;

        let _loading = self.state.begin();
        let reply = match self.api.history(&query).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "history lookup failed");
                HistoryReply::Failure(HISTORY_FAILURE_MESSAGE.to_string())
            }
        };
        self.state.set(ViewState::Resolved(reply.clone()));
        Ok(reply)
    }
}
