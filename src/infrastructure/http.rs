use crate::config::ClientConfig;
use crate::domain::payment::{BankTransfer, UpiTransfer};
use crate::domain::ports::{
    Acknowledgement, BalanceReply, HistoryQuery, HistoryReply, PaymentApi,
};
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use tracing::{debug, warn};

/// Body returned when an OTP has been issued for a new transfer.
pub const OTP_SENT: &str =
    "OTP sent to your registered email. Please verify to complete the transaction.";
/// Body returned when a bank transfer has been confirmed.
pub const BANK_TRANSFER_COMPLETED: &str = "Funds transferred successfully.";
/// Body returned when a UPI transfer has been confirmed.
pub const UPI_TRANSFER_COMPLETED: &str = "Transaction Successful.";
/// Body returned by the balance endpoint for an unknown account/IFSC pair.
pub const INVALID_ACCOUNT_DETAILS: &str = "Invalid account details.";

const BANK_INITIATE: &[&str] = &["api", "payment", "bank", "initiateTransaction"];
const UPI_INITIATE: &[&str] = &["api", "payment", "upi", "initiateTransaction"];
const BANK_CONFIRM: &[&str] = &["api", "payment", "bank", "verifyOtpAndTransfer"];
const UPI_CONFIRM: &[&str] = &["api", "payment", "upi", "verifyOtpAndTransfer"];
const BANK_BALANCE: &[&str] = &["api", "payment", "bank", "check-balance"];
const BANK_HISTORY: &[&str] = &["api", "payment", "bank", "transactions"];
const UPI_HISTORY: &[&str] = &["api", "payment", "upi", "transactionHistory"];

#[derive(Serialize)]
struct WithOtp<'a, T: Serialize> {
    #[serde(flatten)]
    transfer: &'a T,
    otp: &'a str,
}

/// [`PaymentApi`] over HTTP.
///
/// The service answers in plain sentences or JSON depending on the endpoint;
/// everything is turned into tagged replies here so callers never look at raw
/// bodies.
pub struct HttpPaymentApi {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpPaymentApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| PaymentError::Config(format!("invalid base URL: {}", e)))?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { base_url, client })
    }

    /// Appends percent-encoded path segments to the base URL.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PaymentError::Config("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &T,
    ) -> Result<(StatusCode, String)> {
        let url = self.endpoint(segments)?;
        self.send(self.client.post(url.clone()).json(body), &url).await
    }

    async fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<(StatusCode, String)> {
        self.send(self.client.get(url.clone()).query(query), &url).await
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<(StatusCode, String)> {
        let response = request.send().await.inspect_err(|e| {
            warn!(path = url.path(), error = %e, "payment api request failed");
        })?;
        let status = response.status();
        let body = response.text().await?;
        debug!(path = url.path(), status = status.as_u16(), "payment api responded");
        Ok((status, body))
    }
}

/// Decides an initiate/confirm reply. A 2xx carrying anything other than the
/// sentinel is a rejection. Non-2xx answers are errors; their bodies are
/// never shown.
pub fn acknowledge(status: StatusCode, body: &str, sentinel: &str) -> Result<Acknowledgement> {
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    let text = body.trim();
    if text == sentinel {
        Ok(Acknowledgement::Accepted)
    } else {
        Ok(Acknowledgement::Rejected(message_or_status(text, status)))
    }
}

pub fn classify_balance(status: StatusCode, body: &str) -> Result<BalanceReply> {
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    let text = body.trim();
    if text == INVALID_ACCOUNT_DETAILS {
        Ok(BalanceReply::Rejected(message_or_status(text, status)))
    } else {
        Ok(BalanceReply::Balance(text.to_string()))
    }
}

/// A JSON array is the record list. Any other 2xx answer carries a message.
pub fn classify_history(status: StatusCode, body: &str) -> Result<HistoryReply> {
    if !status.is_success() {
        return Err(status_error(status, body));
    }
    let text = body.trim();
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value @ serde_json::Value::Array(_)) => {
            let records: Vec<TransactionRecord> = serde_json::from_value(value)
                .map_err(|e| PaymentError::Internal(Box::new(e)))?;
            Ok(HistoryReply::from_records(records))
        }
        Ok(serde_json::Value::String(message)) => Ok(HistoryReply::Failure(message)),
        _ => Ok(HistoryReply::Failure(message_or_status(text, status))),
    }
}

fn with_tail<'a>(prefix: &[&'a str], tail: &'a str) -> Vec<&'a str> {
    let mut segments = prefix.to_vec();
    segments.push(tail);
    segments
}

fn message_or_status(text: &str, status: StatusCode) -> String {
    if text.is_empty() {
        format!("Request failed with status {}", status.as_u16())
    } else {
        text.to_string()
    }
}

fn status_error(status: StatusCode, body: &str) -> PaymentError {
    debug!(status = status.as_u16(), body = body.trim(), "payment api error body");
    PaymentError::Status {
        status: status.as_u16(),
        body: body.trim().to_string(),
    }
}

#[async_trait]
impl PaymentApi for HttpPaymentApi {
    async fn initiate_bank(&self, transfer: &BankTransfer) -> Result<Acknowledgement> {
        let (status, body) = self.post(BANK_INITIATE, transfer).await?;
        acknowledge(status, &body, OTP_SENT)
    }

    async fn initiate_upi(&self, transfer: &UpiTransfer) -> Result<Acknowledgement> {
        let (status, body) = self.post(UPI_INITIATE, transfer).await?;
        acknowledge(status, &body, OTP_SENT)
    }

    async fn confirm_bank(&self, transfer: &BankTransfer, otp: &str) -> Result<Acknowledgement> {
        let (status, body) = self.post(BANK_CONFIRM, &WithOtp { transfer, otp }).await?;
        acknowledge(status, &body, BANK_TRANSFER_COMPLETED)
    }

    async fn confirm_upi(&self, transfer: &UpiTransfer, otp: &str) -> Result<Acknowledgement> {
        let (status, body) = self.post(UPI_CONFIRM, &WithOtp { transfer, otp }).await?;
        acknowledge(status, &body, UPI_TRANSFER_COMPLETED)
    }

    async fn check_balance(&self, account_number: &str, ifsc_code: &str) -> Result<BalanceReply> {
        let url = self.endpoint(BANK_BALANCE)?;
        let (status, body) = self
            .get(url, &[("accountNumber", account_number), ("ifscCode", ifsc_code)])
            .await?;
        classify_balance(status, &body)
    }

    async fn history(&self, query: &HistoryQuery) -> Result<HistoryReply> {
        let url = match query {
            HistoryQuery::Account(account) => self.endpoint(&with_tail(BANK_HISTORY, account))?,
            HistoryQuery::Upi(handle) => self.endpoint(&with_tail(UPI_HISTORY, handle))?,
        };
        let (status, body) = self.get(url, &[]).await?;
        classify_history(status, &body)
    }
}
