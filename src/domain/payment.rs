use super::amount::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Account,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Account => "account",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account-to-account transfer identified by account number and IFSC code.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BankTransfer {
    pub sender_account_number: String,
    pub sender_ifsc_code: String,
    pub receiver_account_number: String,
    pub receiver_ifsc_code: String,
    pub amount: Amount,
    pub purpose: String,
}

/// A transfer between two UPI handles.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UpiTransfer {
    pub sender_upi_id: String,
    pub receiver_upi_id: String,
    pub amount: Amount,
    pub note: String,
}

/// The in-flight payment held between initiation and OTP confirmation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "paymentMethod", rename_all = "lowercase")]
pub enum PaymentState {
    #[serde(rename = "account")]
    Bank(BankTransfer),
    Upi(UpiTransfer),
}

impl PaymentState {
    pub fn method(&self) -> PaymentMethod {
        match self {
            PaymentState::Bank(_) => PaymentMethod::Account,
            PaymentState::Upi(_) => PaymentMethod::Upi,
        }
    }

    pub fn amount(&self) -> Amount {
        match self {
            PaymentState::Bank(t) => t.amount,
            PaymentState::Upi(t) => t.amount,
        }
    }

    pub fn sender(&self) -> &str {
        match self {
            PaymentState::Bank(t) => &t.sender_account_number,
            PaymentState::Upi(t) => &t.sender_upi_id,
        }
    }

    pub fn receiver(&self) -> &str {
        match self {
            PaymentState::Bank(t) => &t.receiver_account_number,
            PaymentState::Upi(t) => &t.receiver_upi_id,
        }
    }

    /// Purpose for bank transfers, note for UPI. `None` when left blank.
    pub fn remark(&self) -> Option<&str> {
        let text = match self {
            PaymentState::Bank(t) => &t.purpose,
            PaymentState::Upi(t) => &t.note,
        };
        (!text.is_empty()).then_some(text.as_str())
    }
}

impl From<BankTransfer> for PaymentState {
    fn from(transfer: BankTransfer) -> Self {
        PaymentState::Bank(transfer)
    }
}

impl From<UpiTransfer> for PaymentState {
    fn from(transfer: UpiTransfer) -> Self {
        PaymentState::Upi(transfer)
    }
}
