use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// A transaction as reported by the payment service. Display only.
///
/// Bank history uses `senderAccountNumber`/`receiverAccountNumber`/`transactionDate`,
/// UPI history uses `senderUpiId`/`receiverUpiId`/`date`. Both land here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransactionRecord {
    #[serde(
        alias = "senderAccountNumber",
        alias = "senderUpiId",
        deserialize_with = "string_or_number"
    )]
    pub sender: String,
    #[serde(
        alias = "receiverAccountNumber",
        alias = "receiverUpiId",
        deserialize_with = "string_or_number"
    )]
    pub receiver: String,
    pub amount: Decimal,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    #[serde(default, alias = "purpose")]
    pub note: Option<String>,
    #[serde(
        alias = "transactionDate",
        alias = "date",
        deserialize_with = "flexible_timestamp"
    )]
    pub timestamp: NaiveDateTime,
}

/// Orders records newest first. Ties keep their server order.
pub fn sort_newest_first(records: &mut [TransactionRecord]) {
    records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized timestamp '{}'", raw)))
}

/// Accepts RFC 3339 (normalized to UTC), naive ISO date-times and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
