use crate::application::views::balance::BalanceOutcome;
use crate::application::views::outcome::Receipt;
use crate::domain::payment::PaymentMethod;
use crate::domain::ports::HistoryReply;
use crate::domain::transaction::TransactionRecord;

fn columns(method: PaymentMethod) -> &'static [&'static str] {
    match method {
        PaymentMethod::Account => &[
            "Sender Account Number",
            "Receiver Account Number",
            "Amount (₹)",
            "Status",
            "Transaction Date",
        ],
        PaymentMethod::Upi => &[
            "Sender UPI ID",
            "Receiver UPI ID",
            "Amount (₹)",
            "Status",
            "Note",
            "Transaction Date",
        ],
    }
}

fn row(method: PaymentMethod, record: &TransactionRecord) -> Vec<String> {
    let date = record.timestamp.format("%d/%m/%Y").to_string();
    let amount = format!("₹{}", record.amount.normalize());
    match method {
        PaymentMethod::Account => vec![
            record.sender.clone(),
            record.receiver.clone(),
            amount,
            record.status.clone(),
            date,
        ],
        PaymentMethod::Upi => vec![
            record.sender.clone(),
            record.receiver.clone(),
            amount,
            record.status.clone(),
            record.note.clone().unwrap_or_default(),
            date,
        ],
    }
}

/// Renders records as an aligned text table.
pub fn history_table(method: PaymentMethod, records: &[TransactionRecord]) -> String {
    let header: Vec<String> = columns(method).iter().map(|c| c.to_string()).collect();
    let rows: Vec<Vec<String>> = records.iter().map(|r| row(method, r)).collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(&header)];
    out.extend(rows.iter().map(|cells| line(cells)));
    out.join("\n")
}

/// Text for a resolved history lookup. Empty and failed lookups read
/// differently.
pub fn history_reply(method: PaymentMethod, reply: &HistoryReply) -> String {
    match reply {
        HistoryReply::Records(records) => history_table(method, records),
        HistoryReply::Empty => "No transactions found.".to_string(),
        HistoryReply::Failure(message) => format!("Error: {}", message),
    }
}

pub fn balance(outcome: &BalanceOutcome) -> String {
    match outcome {
        BalanceOutcome::Balance(text) => text.clone(),
        BalanceOutcome::Rejected(text) | BalanceOutcome::Failed(text) => {
            format!("Error: {}", text)
        }
    }
}

pub fn receipt(receipt: &Receipt) -> String {
    let mut out = vec!["Payment Successful!".to_string()];
    out.extend(
        receipt
            .lines()
            .into_iter()
            .map(|(label, value)| format!("{}: {}", label, value)),
    );
    out.join("\n")
}
