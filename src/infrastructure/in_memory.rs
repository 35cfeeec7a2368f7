use super::http::INVALID_ACCOUNT_DETAILS;
use crate::domain::payment::{BankTransfer, UpiTransfer};
use crate::domain::ports::{
    Acknowledgement, BalanceReply, HistoryQuery, HistoryReply, PaymentApi,
};
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A call received by [`ScriptedPaymentApi`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    InitiateBank(BankTransfer),
    InitiateUpi(UpiTransfer),
    ConfirmBank { transfer: BankTransfer, otp: String },
    ConfirmUpi { transfer: UpiTransfer, otp: String },
    CheckBalance { account_number: String, ifsc_code: String },
    History(HistoryQuery),
}

#[derive(Default)]
struct Script {
    initiate: Option<Acknowledgement>,
    otp: Option<String>,
    balances: HashMap<(String, String), String>,
    history: HashMap<String, HistoryReply>,
    outage: bool,
    stalled: bool,
    calls: Vec<ApiCall>,
}

/// A stand-in for the payment service that answers from a script and records
/// every call it receives.
///
/// Unscripted calls get neutral answers: initiation is accepted, any OTP is
/// accepted, unknown accounts are rejected and unknown histories are empty.
#[derive(Default, Clone)]
pub struct ScriptedPaymentApi {
    script: Arc<RwLock<Script>>,
}

impl ScriptedPaymentApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reply_to_initiate(&self, ack: Acknowledgement) {
        self.script.write().await.initiate = Some(ack);
    }

    /// Only this code will confirm a transfer.
    pub async fn expect_otp(&self, otp: impl Into<String>) {
        self.script.write().await.otp = Some(otp.into());
    }

    pub async fn add_balance(&self, account: &str, ifsc: &str, balance: impl Into<String>) {
        self.script
            .write()
            .await
            .balances
            .insert((account.to_string(), ifsc.to_string()), balance.into());
    }

    pub async fn add_history(&self, key: &str, records: Vec<TransactionRecord>) {
        self.script
            .write()
            .await
            .history
            .insert(key.to_string(), HistoryReply::from_records(records));
    }

    pub async fn fail_history(&self, key: &str, message: impl Into<String>) {
        self.script
            .write()
            .await
            .history
            .insert(key.to_string(), HistoryReply::Failure(message.into()));
    }

    /// While set, every call fails as if the service were unreachable.
    pub async fn set_outage(&self, outage: bool) {
        self.script.write().await.outage = outage;
    }

    /// While set, every call is recorded and then never answers.
    pub async fn set_stalled(&self, stalled: bool) {
        self.script.write().await.stalled = stalled;
    }

    pub async fn calls(&self) -> Vec<ApiCall> {
        self.script.read().await.calls.clone()
    }

    async fn record(&self, call: ApiCall) -> Result<()> {
        let stalled = {
            let mut script = self.script.write().await;
            script.calls.push(call);
            if script.outage {
                return Err(PaymentError::Status {
                    status: 503,
                    body: "service unavailable".into(),
                });
            }
            script.stalled
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    async fn check_otp(&self, otp: &str) -> Acknowledgement {
        match &self.script.read().await.otp {
            Some(expected) if expected != otp => Acknowledgement::Rejected("Invalid OTP".into()),
            _ => Acknowledgement::Accepted,
        }
    }

    async fn initiate_reply(&self) -> Acknowledgement {
        self.script
            .read()
            .await
            .initiate
            .clone()
            .unwrap_or(Acknowledgement::Accepted)
    }
}

#[async_trait]
impl PaymentApi for ScriptedPaymentApi {
    async fn initiate_bank(&self, transfer: &BankTransfer) -> Result<Acknowledgement> {
        self.record(ApiCall::InitiateBank(transfer.clone())).await?;
        Ok(self.initiate_reply().await)
    }

    async fn initiate_upi(&self, transfer: &UpiTransfer) -> Result<Acknowledgement> {
        self.record(ApiCall::InitiateUpi(transfer.clone())).await?;
        Ok(self.initiate_reply().await)
    }

    async fn confirm_bank(&self, transfer: &BankTransfer, otp: &str) -> Result<Acknowledgement> {
        self.record(ApiCall::ConfirmBank {
            transfer: transfer.clone(),
            otp: otp.to_string(),
        })
        .await?;
        Ok(self.check_otp(otp).await)
    }

    async fn confirm_upi(&self, transfer: &UpiTransfer, otp: &str) -> Result<Acknowledgement> {
        self.record(ApiCall::ConfirmUpi {
            transfer: transfer.clone(),
            otp: otp.to_string(),
        })
        .await?;
        Ok(self.check_otp(otp).await)
    }

    async fn check_balance(&self, account_number: &str, ifsc_code: &str) -> Result<BalanceReply> {
        self.record(ApiCall::CheckBalance {
            account_number: account_number.to_string(),
            ifsc_code: ifsc_code.to_string(),
        })
        .await?;
        let script = self.script.read().await;
        let key = (account_number.to_string(), ifsc_code.to_string());
        Ok(match script.balances.get(&key) {
            Some(balance) => BalanceReply::Balance(balance.clone()),
            None => BalanceReply::Rejected(INVALID_ACCOUNT_DETAILS.to_string()),
        })
    }

    async fn history(&self, query: &HistoryQuery) -> Result<HistoryReply> {
        self.record(ApiCall::History(query.clone())).await?;
        let key = match query {
            HistoryQuery::Account(account) => account,
            HistoryQuery::Upi(handle) => handle,
        };
        Ok(self
            .script
            .read()
            .await
            .history
            .get(key)
            .cloned()
            .unwrap_or(HistoryReply::Empty))
    }
}
