use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::info;

/// How long an issued OTP stays usable, in seconds.
pub const OTP_VALIDITY_SECS: u32 = 300;
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    /// Produced by the one transition that reaches zero.
    Expired,
    /// Already at zero; nothing changed.
    Stopped,
}

pub fn is_expired(remaining: u32) -> bool {
    remaining == 0
}

/// The countdown as a plain state machine: every tick is `n -> n - 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(budget_secs: u32) -> Self {
        Self {
            remaining: budget_secs,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_expired(&self) -> bool {
        is_expired(self.remaining)
    }

    pub fn tick(&mut self) -> Tick {
        if self.is_expired() {
            return Tick::Stopped;
        }
        self.remaining -= 1;
        if self.is_expired() {
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(OTP_VALIDITY_SECS)
    }
}

/// Formats seconds as `m:ss`.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Drives a [`Countdown`] on the tokio clock.
///
/// The remaining seconds are published on a watch channel. `on_expire` runs at
/// most once, from the tick that reaches zero. The task is aborted on drop.
pub struct CountdownTimer {
    remaining: watch::Receiver<u32>,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    pub fn start<F>(budget_secs: u32, period: Duration, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = watch::channel(budget_secs);
        let mut countdown = Countdown::new(budget_secs);

        let handle = tokio::spawn(async move {
            if countdown.is_expired() {
                on_expire();
                return;
            }
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                match countdown.tick() {
                    Tick::Running(n) => {
                        tx.send_replace(n);
                    }
                    Tick::Expired => {
                        info!("confirmation window expired");
                        on_expire();
                        tx.send_replace(0);
                        break;
                    }
                    Tick::Stopped => break,
                }
            }
        });

        Self {
            remaining: rx,
            handle,
        }
    }

    /// Starts the standard five minute OTP window.
    pub fn otp_window<F>(on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::start(OTP_VALIDITY_SECS, TICK_PERIOD, on_expire)
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.clone()
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
