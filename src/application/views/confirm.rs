use super::{Busy, Mount};
use crate::application::countdown::{
    CountdownTimer, OTP_VALIDITY_SECS, TICK_PERIOD, format_remaining, is_expired,
};
use crate::application::navigation::{Access, Navigator, Route};
use crate::application::state::PaymentStateStore;
use crate::application::validation::{Field, TextField};
use crate::domain::payment::PaymentState;
use crate::domain::ports::{Acknowledgement, SharedPaymentApi};
use crate::error::{FieldError, PaymentError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

pub const INVALID_OTP_MESSAGE: &str = "Invalid OTP. Please try again.";
pub const CONFIRM_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Confirmed,
    /// Wrong code. The field is cleared and the countdown keeps running.
    InvalidCode,
    Failed(String),
    Expired,
}

impl ConfirmOutcome {
    /// Where the user should be after this outcome.
    pub fn next_route(&self) -> Route {
        match self {
            ConfirmOutcome::Confirmed => Route::PaymentSuccess,
            ConfirmOutcome::Expired => Route::PaymentFailure,
            ConfirmOutcome::InvalidCode | ConfirmOutcome::Failed(_) => Route::OtpAuth,
        }
    }
}

/// OTP entry for the held payment. Only reachable through the route guard.
///
/// Mounting starts the five minute window; dropping the view stops it. When the
/// window runs out the navigator is moved to the failure route, once.
pub struct ConfirmView {
    api: SharedPaymentApi,
    store: PaymentStateStore,
    payment: PaymentState,
    code: TextField,
    error: Option<String>,
    loading: bool,
    expired: Arc<AtomicBool>,
    timer: CountdownTimer,
}

impl ConfirmView {
    pub fn mount(
        navigator: &Navigator,
        api: SharedPaymentApi,
        store: PaymentStateStore,
    ) -> Mount<Self> {
        Self::mount_with_window(navigator, api, store, OTP_VALIDITY_SECS, TICK_PERIOD)
    }

    pub fn mount_with_window(
        navigator: &Navigator,
        api: SharedPaymentApi,
        store: PaymentStateStore,
        budget_secs: u32,
        period: Duration,
    ) -> Mount<Self> {
        let payment = match navigator.navigate(Route::OtpAuth) {
            Access::Granted(_, payment) => payment,
            other => return Mount::Redirected(other.landed()),
        };

        let expired = Arc::new(AtomicBool::new(false));
        let flag = expired.clone();
        let on_expiry = navigator.clone();
        let timer = CountdownTimer::start(budget_secs, period, move || {
            flag.store(true, Ordering::SeqCst);
            on_expiry.navigate(Route::PaymentFailure);
        });

        Mount::Rendered(Self {
            api,
            store,
            payment,
            code: TextField::default(),
            error: None,
            loading: false,
            expired,
            timer,
        })
    }

    pub fn payment(&self) -> &PaymentState {
        &self.payment
    }

    pub fn code(&self) -> &str {
        self.code.value()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn remaining(&self) -> u32 {
        self.timer.remaining()
    }

    /// Remaining time as `m:ss`.
    pub fn time_left(&self) -> String {
        format_remaining(self.remaining())
    }

    pub fn is_expired(&self) -> bool {
        self.expired.load(Ordering::SeqCst)
    }

    pub fn submit_enabled(&self) -> bool {
        !self.loading && !self.is_expired() && !self.code.is_empty()
    }

    /// Resolves once the window has run out. Never resolves if the timer was
    /// stopped first.
    pub async fn expired(&self) {
        let mut remaining = self.timer.subscribe();
        if remaining.wait_for(|n| is_expired(*n)).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    pub fn input_code(&mut self, code: &str) {
        self.code.input(code.trim());
    }

    /// Sends the entered code together with the held transfer.
    pub async fn submit(&mut self) -> Result<ConfirmOutcome> {
        if self.is_expired() {
            return Ok(ConfirmOutcome::Expired);
        }
        if self.code.is_empty() {
            let err = PaymentError::from(FieldError::Missing("OTP"));
            self.error = Some(err.user_message());
            return Err(err);
        }
        self.error = None;

        let otp = self.code.value().to_string();
        let reply = {
            let _busy = Busy::new(&mut self.loading);
            match &self.payment {
                PaymentState::Bank(transfer) => self.api.confirm_bank(transfer, &otp).await,
                PaymentState::Upi(transfer) => self.api.confirm_upi(transfer, &otp).await,
            }
        };

        Ok(match reply {
            Ok(Acknowledgement::Accepted) => {
                self.timer.cancel();
                info!(method = %self.payment.method(), "transfer confirmed");
                ConfirmOutcome::Confirmed
            }
            Ok(Acknowledgement::Rejected(_)) => {
                self.code.reset();
                self.error = Some(INVALID_OTP_MESSAGE.to_string());
                ConfirmOutcome::InvalidCode
            }
            Err(err) => {
                warn!(error = %err, "OTP verification failed");
                self.error = Some(CONFIRM_FAILURE_MESSAGE.to_string());
                ConfirmOutcome::Failed(CONFIRM_FAILURE_MESSAGE.to_string())
            }
        })
    }

    /// Convenience for `input_code` followed by `submit`.
    pub async fn submit_code(&mut self, code: &str) -> Result<ConfirmOutcome> {
        self.input_code(code);
        self.submit().await
    }

    /// "Go back to Home": drops the pending payment and stops the timer.
    pub fn abandon(self, navigator: &Navigator) -> Access {
        self.timer.cancel();
        self.store.clear();
        navigator.navigate(Route::Home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::Amount;
    use crate::domain::payment::BankTransfer;
    use crate::infrastructure::in_memory::{ApiCall, ScriptedPaymentApi};
    use rust_decimal_macros::dec;

    fn bank() -> PaymentState {
        PaymentState::Bank(BankTransfer {
            sender_account_number: "1111".into(),
            sender_ifsc_code: "SBIN0001234".into(),
            receiver_account_number: "2222".into(),
            receiver_ifsc_code: "HDFC0004321".into(),
            amount: Amount::new(dec!(75)).unwrap(),
            purpose: "rent".into(),
        })
    }

    fn setup(held: Option<PaymentState>) -> (ScriptedPaymentApi, PaymentStateStore, Navigator) {
        let api = ScriptedPaymentApi::new();
        let store = PaymentStateStore::new();
        if let Some(state) = held {
            store.set(state);
        }
        let navigator = Navigator::new(store.clone());
        (api, store, navigator)
    }

    #[tokio::test]
    async fn test_mount_without_state_redirects_home() {
        let (api, store, nav) = setup(None);
        let mount = ConfirmView::mount(&nav, Arc::new(api), store);
        assert!(matches!(mount, Mount::Redirected(Route::Home)));
        assert_eq!(nav.current(), Route::Home);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wrong_code_clears_field_and_keeps_countdown() {
        let (api, store, nav) = setup(Some(bank()));
        api.expect_otp("654321").await;
        let mut view = ConfirmView::mount(&nav, Arc::new(api.clone()), store.clone())
            .rendered()
            .unwrap();

        tokio::time::sleep(Duration::from_millis(10_500)).await;
        tokio::task::yield_now().await;
        let before = view.remaining();
        assert_eq!(before, OTP_VALIDITY_SECS - 10);

        let outcome = view.submit_code("000000").await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::InvalidCode);
        assert_eq!(outcome.next_route(), Route::OtpAuth);
        assert_eq!(view.code(), "");
        assert_eq!(view.error(), Some(INVALID_OTP_MESSAGE));
        assert_eq!(view.remaining(), before);
        assert!(store.get().is_some());

        let outcome = view.submit_code("654321").await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Confirmed);
        assert_eq!(outcome.next_route(), Route::PaymentSuccess);

        let calls = api.calls().await;
        assert!(matches!(&calls[1], ApiCall::ConfirmBank { otp, .. } if otp == "654321"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry_routes_to_failure() {
        let (api, store, nav) = setup(Some(bank()));
        let mut view = ConfirmView::mount(&nav, Arc::new(api.clone()), store)
            .rendered()
            .unwrap();

        view.expired().await;
        assert!(view.is_expired());
        assert_eq!(nav.current(), Route::PaymentFailure);
        assert_eq!(view.time_left(), "0:00");
        assert!(!view.submit_enabled());

        let outcome = view.submit_code("123456").await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Expired);
        assert_eq!(outcome.next_route(), Route::PaymentFailure);
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_code_is_a_validation_error() {
        let (api, store, nav) = setup(Some(bank()));
        let mut view = ConfirmView::mount(&nav, Arc::new(api.clone()), store)
            .rendered()
            .unwrap();
        assert!(view.submit_code("  ").await.unwrap_err().is_validation());
        assert_eq!(view.error(), Some("OTP is required"));
        assert!(api.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_allows_retry() {
        let (api, store, nav) = setup(Some(bank()));
        api.set_outage(true).await;
        let mut view = ConfirmView::mount(&nav, Arc::new(api.clone()), store)
            .rendered()
            .unwrap();

        let outcome = view.submit_code("111111").await.unwrap();
        assert_eq!(outcome, ConfirmOutcome::Failed(CONFIRM_FAILURE_MESSAGE.into()));
        assert_eq!(view.code(), "111111");
        assert!(view.submit_enabled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_submit_re_enables_trigger() {
        let (api, store, nav) = setup(Some(bank()));
        api.set_stalled(true).await;
        let mut view = ConfirmView::mount(&nav, Arc::new(api), store)
            .rendered()
            .unwrap();
        view.input_code("123456");

        let abandoned = tokio::time::timeout(Duration::from_millis(10), view.submit()).await;
        assert!(abandoned.is_err());
        assert!(view.submit_enabled());
        assert_eq!(view.code(), "123456");
    }

    #[tokio::test]
    async fn test_abandon_clears_state() {
        let (api, store, nav) = setup(Some(bank()));
        let view = ConfirmView::mount(&nav, Arc::new(api), store.clone())
            .rendered()
            .unwrap();
        assert_eq!(view.abandon(&nav), Access::Open(Route::Home));
        assert!(store.get().is_none());
        assert_eq!(nav.navigate(Route::OtpAuth).landed(), Route::Home);
    }
}
