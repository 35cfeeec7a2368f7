//! Domain types shared by every view: transfer parameters, server records and
//! the port to the payment service.

pub mod amount;
pub mod payment;
pub mod ports;
pub mod transaction;
