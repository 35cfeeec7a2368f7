use super::payment::{BankTransfer, UpiTransfer};
use super::transaction::{TransactionRecord, sort_newest_first};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Reply to an initiate or confirm call, decided by comparing the body
/// against the service's fixed success sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    Accepted,
    /// The call went through but the service said no. Carries its message.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceReply {
    Balance(String),
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryReply {
    /// Non-empty, newest first.
    Records(Vec<TransactionRecord>),
    Empty,
    Failure(String),
}

impl HistoryReply {
    /// Builds the reply from a successful list response.
    pub fn from_records(mut records: Vec<TransactionRecord>) -> Self {
        if records.is_empty() {
            HistoryReply::Empty
        } else {
            sort_newest_first(&mut records);
            HistoryReply::Records(records)
        }
    }
}

/// Which history endpoint to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryQuery {
    Account(String),
    Upi(String),
}

/// The remote payment service.
///
/// `Err` means the round trip itself failed (transport, unexpected status).
/// Business rejections come back as `Ok` with a negative variant.
#[async_trait]
pub trait PaymentApi: Send + Sync {
    async fn initiate_bank(&self, transfer: &BankTransfer) -> Result<Acknowledgement>;
    async fn initiate_upi(&self, transfer: &UpiTransfer) -> Result<Acknowledgement>;
    async fn confirm_bank(&self, transfer: &BankTransfer, otp: &str) -> Result<Acknowledgement>;
    async fn confirm_upi(&self, transfer: &UpiTransfer, otp: &str) -> Result<Acknowledgement>;
    async fn check_balance(&self, account_number: &str, ifsc_code: &str) -> Result<BalanceReply>;
    async fn history(&self, query: &HistoryQuery) -> Result<HistoryReply>;
}

/// Views share one client for the session.
pub type SharedPaymentApi = Arc<dyn PaymentApi>;
