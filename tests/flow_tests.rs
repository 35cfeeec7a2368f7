mod common;

use common::{bank_state, record};
use ezpay::application::countdown::OTP_VALIDITY_SECS;
use ezpay::application::navigation::{Access, Navigator, Route};
use ezpay::application::state::PaymentStateStore;
use ezpay::application::views::Mount;
use ezpay::application::views::confirm::{ConfirmOutcome, ConfirmView, INVALID_OTP_MESSAGE};
use ezpay::application::views::history::HistoryView;
use ezpay::application::views::initiate::{InitiateOutcome, InitiatePaymentView};
use ezpay::application::views::outcome::{FAILURE_MESSAGE, FailureView, SuccessView};
use ezpay::domain::payment::{PaymentMethod, PaymentState};
use ezpay::domain::ports::{HistoryReply, SharedPaymentApi};
use ezpay::infrastructure::in_memory::{ApiCall, ScriptedPaymentApi};
use std::sync::Arc;
use std::time::Duration;

struct App {
    api: ScriptedPaymentApi,
    store: PaymentStateStore,
    navigator: Navigator,
}

impl App {
    fn new() -> Self {
        let store = PaymentStateStore::new();
        Self {
            api: ScriptedPaymentApi::new(),
            navigator: Navigator::new(store.clone()),
            store,
        }
    }

    fn shared(&self) -> SharedPaymentApi {
        Arc::new(self.api.clone())
    }

    async fn initiate_bank(&self) -> InitiateOutcome {
        self.navigator.navigate(Route::Payment);
        let mut view = InitiatePaymentView::new(self.shared(), self.store.clone());
        view.bank.sender_account.input("100200300");
        view.bank.sender_ifsc.input("sbin0001234");
        view.bank.receiver_account.input("400500600");
        view.bank.receiver_ifsc.input("HDFC0004321");
        view.bank.amount.input("75");
        view.bank.purpose.input("rent");
        view.submit().await.unwrap()
    }

    fn confirm(&self) -> ConfirmView {
        ConfirmView::mount(&self.navigator, self.shared(), self.store.clone())
            .rendered()
            .unwrap()
    }
}

#[tokio::test(start_paused = true)]
async fn test_bank_payment_happy_path() {
    let app = App::new();
    app.api.expect_otp("482913").await;

    let InitiateOutcome::AwaitingOtp { next } = app.initiate_bank().await else {
        panic!("initiation should await an OTP");
    };
    assert_eq!(next, Route::OtpAuth);
    assert_eq!(app.store.get(), Some(bank_state()));

    let mut confirm = app.confirm();
    assert_eq!(app.navigator.current(), Route::OtpAuth);
    assert_eq!(confirm.remaining(), OTP_VALIDITY_SECS);

    let outcome = confirm.submit_code("482913").await.unwrap();
    assert_eq!(outcome, ConfirmOutcome::Confirmed);
    drop(confirm);

    let success = SuccessView::mount(&app.navigator, app.store.clone())
        .rendered()
        .unwrap();
    assert_eq!(success.receipt().payment, bank_state());
    assert_eq!(success.finish(&app.navigator), Access::Open(Route::Home));
    assert!(!app.store.is_present());

    let calls = app.api.calls().await;
    assert_eq!(calls.len(), 2);
    assert!(matches!(
        &calls[0],
        ApiCall::InitiateBank(t) if t.sender_ifsc_code == "SBIN0001234"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_wrong_code_keeps_user_on_confirm_view() {
    let app = App::new();
    app.api.expect_otp("482913").await;
    app.initiate_bank().await;
    let mut confirm = app.confirm();

    tokio::time::sleep(Duration::from_millis(30_500)).await;
    tokio::task::yield_now().await;
    let remaining = confirm.remaining();

    let outcome = confirm.submit_code("111111").await.unwrap();
    assert_eq!(outcome, ConfirmOutcome::InvalidCode);
    assert_eq!(confirm.code(), "");
    assert_eq!(confirm.error(), Some(INVALID_OTP_MESSAGE));
    assert_eq!(confirm.remaining(), remaining);
    assert_eq!(app.navigator.current(), Route::OtpAuth);
    assert!(app.store.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_leads_to_failure_and_retry() {
    let app = App::new();
    app.initiate_bank().await;
    let confirm = app.confirm();

    confirm.expired().await;
    assert!(confirm.is_expired());
    assert_eq!(app.navigator.current(), Route::PaymentFailure);
    drop(confirm);

    let failure = FailureView::mount(&app.navigator, app.store.clone())
        .rendered()
        .unwrap();
    assert_eq!(failure.message(), FAILURE_MESSAGE);
    assert_eq!(failure.retry(&app.navigator), Access::Open(Route::Payment));
    assert!(!app.store.is_present());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_moves_to_failure_on_its_own() {
    let app = App::new();
    app.initiate_bank().await;
    let confirm = app.confirm();
    let mut moves = app.navigator.subscribe();
    moves.borrow_and_update();

    tokio::time::sleep(Duration::from_secs(400)).await;

    assert_eq!(app.navigator.current(), Route::PaymentFailure);
    assert!(moves.has_changed().unwrap());
    assert_eq!(*moves.borrow_and_update(), Route::PaymentFailure);
    // One transition only; the user stays put afterwards.
    tokio::time::sleep(Duration::from_secs(400)).await;
    assert!(!moves.has_changed().unwrap());
    assert_eq!(app.api.calls().await.len(), 1, "no confirm call was made");
    drop(confirm);
}

#[tokio::test(start_paused = true)]
async fn test_confirmed_payment_is_not_moved_by_the_timer() {
    let app = App::new();
    app.initiate_bank().await;
    let mut confirm = app.confirm();
    assert_eq!(
        confirm.submit_code("123456").await.unwrap(),
        ConfirmOutcome::Confirmed
    );
    app.navigator.navigate(Route::PaymentSuccess);

    tokio::time::sleep(Duration::from_secs(400)).await;
    assert_eq!(app.navigator.current(), Route::PaymentSuccess);
    drop(confirm);
}

#[tokio::test]
async fn test_protected_routes_redirect_without_state() {
    let app = App::new();
    for route in Route::ALL.into_iter().filter(Route::is_protected) {
        assert_eq!(
            app.navigator.navigate(route),
            Access::Redirect {
                from: route,
                to: Route::Home
            }
        );
        assert_eq!(app.navigator.current(), Route::Home);
    }
    assert!(matches!(
        ConfirmView::mount(&app.navigator, app.shared(), app.store.clone()),
        Mount::Redirected(Route::Home)
    ));
    assert!(app.api.calls().await.is_empty());
}

#[tokio::test]
async fn test_held_state_unlocks_protected_routes() {
    let app = App::new();
    app.store.set(bank_state());
    for route in Route::ALL.into_iter().filter(Route::is_protected) {
        assert!(matches!(
            app.navigator.navigate(route),
            Access::Granted(r, PaymentState::Bank(_)) if r == route
        ));
    }
}

#[tokio::test]
async fn test_history_newest_first_across_methods() {
    let app = App::new();
    app.api
        .add_history(
            "100200300",
            vec![
                record("t2", "20", "2024-06-02T09:00:00"),
                record("t1", "10", "2024-06-01T09:00:00"),
                record("t3", "30", "2024-06-03T09:00:00"),
            ],
        )
        .await;

    let mut view = HistoryView::new(app.shared());
    view.account.input("100200300");
    let HistoryReply::Records(records) = view.lookup().await.unwrap() else {
        panic!("expected records");
    };
    let order: Vec<&str> = records.iter().map(|r| r.receiver.as_str()).collect();
    assert_eq!(order, ["t3", "t2", "t1"]);

    view.select(PaymentMethod::Upi);
    view.handle.input("nobody@okbank");
    assert_eq!(view.lookup().await.unwrap(), HistoryReply::Empty);
}
