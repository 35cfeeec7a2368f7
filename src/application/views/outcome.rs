use super::Mount;
use crate::application::navigation::{Access, Navigator, Route};
use crate::application::state::PaymentStateStore;
use crate::domain::payment::PaymentState;
use chrono::{DateTime, Local};

pub const FAILURE_MESSAGE: &str =
    "Your OTP has expired or was invalid. Please retry the payment process.";

/// What the success page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub payment: PaymentState,
    pub completed_at: DateTime<Local>,
}

impl Receipt {
    /// Label/value rows in display order. Blank purpose or note is omitted.
    pub fn lines(&self) -> Vec<(&'static str, String)> {
        let (sender_label, receiver_label) = match self.payment {
            PaymentState::Bank(_) => ("Sender Account", "Receiver Account"),
            PaymentState::Upi(_) => ("Sender UPI ID", "Receiver UPI ID"),
        };
        let mut lines = vec![
            (sender_label, self.payment.sender().to_string()),
            (receiver_label, self.payment.receiver().to_string()),
            ("Amount Paid", format!("₹{}", self.payment.amount())),
        ];
        if let Some(remark) = self.payment.remark() {
            let label = match self.payment {
                PaymentState::Bank(_) => "Purpose",
                PaymentState::Upi(_) => "Note",
            };
            lines.push((label, remark.to_string()));
        }
        lines.push((
            "Date & Time",
            self.completed_at.format("%d/%m/%Y, %H:%M:%S").to_string(),
        ));
        lines
    }
}

pub struct SuccessView {
    store: PaymentStateStore,
    receipt: Receipt,
}

impl SuccessView {
    pub fn mount(navigator: &Navigator, store: PaymentStateStore) -> Mount<Self> {
        match navigator.navigate(Route::PaymentSuccess) {
            Access::Granted(_, payment) => Mount::Rendered(Self {
                store,
                receipt: Receipt {
                    payment,
                    completed_at: Local::now(),
                },
            }),
            other => Mount::Redirected(other.landed()),
        }
    }

    pub fn receipt(&self) -> &Receipt {
        &self.receipt
    }

    /// "Go to Home". The payment is done, so the held state goes too.
    pub fn finish(self, navigator: &Navigator) -> Access {
        self.store.clear();
        navigator.navigate(Route::Home)
    }
}

pub struct FailureView {
    store: PaymentStateStore,
}

impl FailureView {
    pub fn mount(navigator: &Navigator, store: PaymentStateStore) -> Mount<Self> {
        match navigator.navigate(Route::PaymentFailure) {
            Access::Granted(..) => Mount::Rendered(Self { store }),
            other => Mount::Redirected(other.landed()),
        }
    }

    pub fn message(&self) -> &'static str {
        FAILURE_MESSAGE
    }

    /// "Retry Payment": back to an empty payment form.
    pub fn retry(self, navigator: &Navigator) -> Access {
        self.store.clear();
        navigator.navigate(Route::Payment)
    }
}
