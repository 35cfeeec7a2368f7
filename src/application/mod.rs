//! Client-side payment flow.
//!
//! The pending payment lives in a [`state::PaymentStateStore`] shared by the
//! views. [`navigation`] guards the routes that need it, [`countdown`] bounds
//! how long an OTP can be entered, and [`views`] hold the per-screen logic.

pub mod countdown;
pub mod navigation;
pub mod state;
pub mod validation;
pub mod views;
