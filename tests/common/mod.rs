#![allow(dead_code)]

use ezpay::domain::amount::Amount;
use ezpay::domain::payment::{BankTransfer, PaymentState, UpiTransfer};
use ezpay::domain::transaction::{TransactionRecord, parse_timestamp};
use rust_decimal::Decimal;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::str::FromStr;
use std::thread::{self, JoinHandle};

pub fn bank_transfer(amount: &str) -> BankTransfer {
    BankTransfer {
        sender_account_number: "100200300".into(),
        sender_ifsc_code: "SBIN0001234".into(),
        receiver_account_number: "400500600".into(),
        receiver_ifsc_code: "HDFC0004321".into(),
        amount: Amount::from_str(amount).unwrap(),
        purpose: "rent".into(),
    }
}

pub fn upi_transfer(amount: &str) -> UpiTransfer {
    UpiTransfer {
        sender_upi_id: "alice@okbank".into(),
        receiver_upi_id: "bob@okbank".into(),
        amount: Amount::from_str(amount).unwrap(),
        note: "lunch".into(),
    }
}

pub fn bank_state() -> PaymentState {
    PaymentState::Bank(bank_transfer("75"))
}

pub fn record(receiver: &str, amount: &str, timestamp: &str) -> TransactionRecord {
    TransactionRecord {
        sender: "alice@okbank".into(),
        receiver: receiver.into(),
        amount: Decimal::from_str(amount).unwrap(),
        status: "SUCCESS".into(),
        note: None,
        timestamp: parse_timestamp(timestamp).unwrap(),
    }
}

/// A local HTTP endpoint that answers exactly one request with a canned
/// response, then reports the request head it saw.
pub struct OneShotServer {
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl OneShotServer {
    pub fn respond(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let body = body.to_string();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let head_end = loop {
                if let Some(at) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break at + 4;
                }
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break request.len();
                }
                request.extend_from_slice(&buf[..n]);
            };

            // Drain the body so closing the socket does not reset the client.
            let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            while request.len() < head_end + body_len {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {} OK\r\ncontent-type: text/plain; charset=utf-8\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        Self { base_url, handle }
    }

    /// The request line received, e.g. `GET /api/... HTTP/1.1`.
    pub fn request_line(self) -> String {
        self.handle.join().unwrap()
    }
}
