use super::Busy;
use crate::application::navigation::Route;
use crate::application::state::PaymentStateStore;
use crate::application::validation::{BankTransferForm, UpiTransferForm};
use crate::domain::payment::{PaymentMethod, PaymentState};
use crate::domain::ports::{Acknowledgement, SharedPaymentApi};
use crate::error::Result;
use tracing::warn;

pub const INITIATE_FAILURE_MESSAGE: &str = "Payment failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitiateOutcome {
    /// OTP issued; the payment is held and the user goes to `next`.
    AwaitingOtp { next: Route },
    /// The service declined. Its message is shown inline.
    Rejected(String),
    /// The call did not complete.
    Failed(String),
}

/// The "make a payment" form, for either bank or UPI transfers.
pub struct InitiatePaymentView {
    api: SharedPaymentApi,
    store: PaymentStateStore,
    method: PaymentMethod,
    pub bank: BankTransferForm,
    pub upi: UpiTransferForm,
    error: Option<String>,
    loading: bool,
}

impl InitiatePaymentView {
    pub fn new(api: SharedPaymentApi, store: PaymentStateStore) -> Self {
        Self {
            api,
            store,
            method: PaymentMethod::default(),
            bank: BankTransferForm::default(),
            upi: UpiTransferForm::default(),
            error: None,
            loading: false,
        }
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn select_method(&mut self, method: PaymentMethod) {
        self.method = method;
        self.error = None;
    }

    /// Inline message under the form, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn submit_enabled(&self) -> bool {
        !self.loading
            && match self.method {
                PaymentMethod::Account => self.bank.submit_enabled(),
                PaymentMethod::Upi => self.upi.submit_enabled(),
            }
    }

    /// Validates the active form and asks the service to issue an OTP.
    ///
    /// Validation failures come back as `Err` and never reach the network.
    pub async fn submit(&mut self) -> Result<InitiateOutcome> {
        self.error = None;
        let state = match self.validated() {
            Ok(state) => state,
            Err(err) => {
                self.error = Some(err.user_message());
                return Err(err);
            }
        };

        let reply = {
            let _busy = Busy::new(&mut self.loading);
            match &state {
                PaymentState::Bank(transfer) => self.api.initiate_bank(transfer).await,
                PaymentState::Upi(transfer) => self.api.initiate_upi(transfer).await,
            }
        };

        let outcome = match reply {
            Ok(Acknowledgement::Accepted) => {
                self.store.set(state);
                InitiateOutcome::AwaitingOtp {
                    next: Route::OtpAuth,
                }
            }
            Ok(Acknowledgement::Rejected(message)) => {
                self.error = Some(message.clone());
                InitiateOutcome::Rejected(message)
            }
            Err(err) => {
                warn!(method = %self.method, error = %err, "payment initiation failed");
                self.error = Some(INITIATE_FAILURE_MESSAGE.to_string());
                InitiateOutcome::Failed(INITIATE_FAILURE_MESSAGE.to_string())
            }
        };
        Ok(outcome)
    }

    fn validated(&self) -> Result<PaymentState> {
        Ok(match self.method {
            PaymentMethod::Account => PaymentState::Bank(self.bank.validate()?),
            PaymentMethod::Upi => PaymentState::Upi(self.upi.validate()?),
        })
    }
}
