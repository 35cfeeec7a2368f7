use crate::domain::amount::Amount;
use crate::domain::payment::{BankTransfer, UpiTransfer};
use crate::error::FieldError;

pub const ROUTING_CODE_LEN: usize = 11;

/// A form field that holds text and possibly an active validation error.
pub trait Field {
    fn value(&self) -> &str;
    fn error(&self) -> Option<&FieldError>;

    fn is_empty(&self) -> bool {
        self.value().trim().is_empty()
    }
}

/// True when every required field is filled and none carries an error.
pub fn submit_enabled(required: &[&dyn Field]) -> bool {
    required.iter().all(|f| !f.is_empty() && f.error().is_none())
}

pub fn is_digits(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit())
}

/// Four letters followed by seven letters or digits.
pub fn is_valid_routing_code(s: &str) -> bool {
    s.len() == ROUTING_CODE_LEN
        && s.chars().take(4).all(|c| c.is_ascii_alphabetic())
        && s.chars().skip(4).all(|c| c.is_ascii_alphanumeric())
}

/// Digits only. A non-digit edit is refused: the old value stays and the
/// error is raised until a digit-only value arrives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountNumberField {
    value: String,
    error: Option<FieldError>,
}

impl AccountNumberField {
    /// Applies an edit. Returns whether it was accepted.
    pub fn input(&mut self, candidate: &str) -> bool {
        if is_digits(candidate) {
            self.value = candidate.to_string();
            self.error = None;
            true
        } else {
            self.error = Some(FieldError::NonNumericAccount);
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Field for AccountNumberField {
    fn value(&self) -> &str {
        &self.value
    }

    fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }
}

/// IFSC-style code, upper-cased as it is typed. Flagged while the shape is
/// wrong, cleared as soon as it is right. Blank counts as missing, not invalid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingCodeField {
    value: String,
    error: Option<FieldError>,
}

impl RoutingCodeField {
    pub fn input(&mut self, candidate: &str) {
        self.value = candidate.trim().to_ascii_uppercase();
        self.error = if self.value.is_empty() || is_valid_routing_code(&self.value) {
            None
        } else {
            Some(FieldError::RoutingCodeShape)
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Field for RoutingCodeField {
    fn value(&self) -> &str {
        &self.value
    }

    fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }
}

/// UPI handle. Values starting with `-` are refused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandleField {
    value: String,
    error: Option<FieldError>,
}

impl HandleField {
    pub fn input(&mut self, candidate: &str) -> bool {
        if candidate.starts_with('-') {
            self.error = Some(FieldError::NegativeHandle);
            false
        } else {
            self.value = candidate.trim().to_string();
            self.error = None;
            true
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Field for HandleField {
    fn value(&self) -> &str {
        &self.value
    }

    fn error(&self) -> Option<&FieldError> {
        self.error.as_ref()
    }
}

/// Free text: amount as typed, purpose, note.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextField {
    value: String,
}

impl TextField {
    pub fn input(&mut self, candidate: &str) {
        self.value = candidate.to_string();
    }

    pub fn reset(&mut self) {
        self.value.clear();
    }
}

impl Field for TextField {
    fn value(&self) -> &str {
        &self.value
    }

    fn error(&self) -> Option<&FieldError> {
        None
    }
}

fn require(field: &dyn Field, name: &'static str) -> Result<String, FieldError> {
    if let Some(err) = field.error() {
        return Err(err.clone());
    }
    if field.is_empty() {
        return Err(FieldError::Missing(name));
    }
    Ok(field.value().trim().to_string())
}

#[derive(Debug, Clone, Default)]
pub struct BankTransferForm {
    pub sender_account: AccountNumberField,
    pub sender_ifsc: RoutingCodeField,
    pub receiver_account: AccountNumberField,
    pub receiver_ifsc: RoutingCodeField,
    pub amount: TextField,
    pub purpose: TextField,
}

impl BankTransferForm {
    pub fn submit_enabled(&self) -> bool {
        submit_enabled(&[
            &self.sender_account,
            &self.sender_ifsc,
            &self.receiver_account,
            &self.receiver_ifsc,
            &self.amount,
        ])
    }

    /// Checks every field and builds the transfer. The amount is only
    /// checked here, at submit time.
    pub fn validate(&self) -> Result<BankTransfer, FieldError> {
        Ok(BankTransfer {
            sender_account_number: require(&self.sender_account, "Sender account number")?,
            sender_ifsc_code: require(&self.sender_ifsc, "Sender IFSC code")?,
            receiver_account_number: require(&self.receiver_account, "Receiver account number")?,
            receiver_ifsc_code: require(&self.receiver_ifsc, "Receiver IFSC code")?,
            amount: self.amount.value().parse::<Amount>()?,
            purpose: self.purpose.value().trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpiTransferForm {
    pub sender: HandleField,
    pub receiver: HandleField,
    pub amount: TextField,
    pub note: TextField,
}

impl UpiTransferForm {
    pub fn submit_enabled(&self) -> bool {
        submit_enabled(&[&self.sender, &self.receiver, &self.amount])
    }

    pub fn validate(&self) -> Result<UpiTransfer, FieldError> {
        Ok(UpiTransfer {
            sender_upi_id: require(&self.sender, "Sender UPI ID")?,
            receiver_upi_id: require(&self.receiver, "Receiver UPI ID")?,
            amount: self.amount.value().parse::<Amount>()?,
            note: self.note.value().trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct BalanceForm {
    pub account: AccountNumberField,
    pub ifsc: RoutingCodeField,
}

impl BalanceForm {
    pub fn submit_enabled(&self) -> bool {
        submit_enabled(&[&self.account, &self.ifsc])
    }

    pub fn validate(&self) -> Result<(String, String), FieldError> {
        Ok((
            require(&self.account, "Account number")?,
            require(&self.ifsc, "IFSC code")?,
        ))
    }

    pub fn reset(&mut self) {
        self.account.reset();
        self.ifsc.reset();
    }
}
