use super::state::PaymentStateStore;
use crate::domain::payment::PaymentState;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Payment,
    PaymentHistory,
    CheckBalance,
    OtpAuth,
    PaymentSuccess,
    PaymentFailure,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Home,
        Route::Payment,
        Route::PaymentHistory,
        Route::CheckBalance,
        Route::OtpAuth,
        Route::PaymentSuccess,
        Route::PaymentFailure,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Payment => "/payment",
            Route::PaymentHistory => "/payment-history",
            Route::CheckBalance => "/check-balance",
            Route::OtpAuth => "/payment/otp-auth",
            Route::PaymentSuccess => "/payment/payment-success",
            Route::PaymentFailure => "/payment/payment-failure",
        }
    }

    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    /// Routes that only make sense while a payment is pending.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::OtpAuth | Route::PaymentSuccess | Route::PaymentFailure
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Result of asking the guard whether a route may render.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Open(Route),
    Granted(Route, PaymentState),
    Redirect { from: Route, to: Route },
}

impl Access {
    /// The route that ends up on screen.
    pub fn landed(&self) -> Route {
        match self {
            Access::Open(route) | Access::Granted(route, _) => *route,
            Access::Redirect { to, .. } => *to,
        }
    }
}

/// Checks protected routes against the held payment state. Holds no cache:
/// each call reads the store afresh.
#[derive(Clone)]
pub struct RouteGuard {
    store: PaymentStateStore,
}

impl RouteGuard {
    pub fn new(store: PaymentStateStore) -> Self {
        Self { store }
    }

    pub fn resolve(&self, route: Route) -> Access {
        if !route.is_protected() {
            return Access::Open(route);
        }
        match self.store.get() {
            Some(state) => Access::Granted(route, state),
            None => {
                info!(from = %route, "no pending payment, redirecting home");
                Access::Redirect {
                    from: route,
                    to: Route::Home,
                }
            }
        }
    }
}

/// Tracks the current route, running the guard on every move.
///
/// Clones share one position, so a background task (the OTP countdown) can
/// move the user as well.
#[derive(Clone)]
pub struct Navigator {
    guard: RouteGuard,
    current: Arc<watch::Sender<Route>>,
}

impl Navigator {
    pub fn new(store: PaymentStateStore) -> Self {
        let (tx, _rx) = watch::channel(Route::Home);
        Self {
            guard: RouteGuard::new(store),
            current: Arc::new(tx),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.borrow()
    }

    pub fn navigate(&self, route: Route) -> Access {
        let access = self.guard.resolve(route);
        self.current.send_replace(access.landed());
        access
    }

    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::Amount;
    use crate::domain::payment::UpiTransfer;
    use rust_decimal_macros::dec;

    fn pending() -> PaymentState {
        PaymentState::Upi(UpiTransfer {
            sender_upi_id: "a@x".into(),
            receiver_upi_id: "b@x".into(),
            amount: Amount::new(dec!(1)).unwrap(),
            note: String::new(),
        })
    }

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn test_protected_routes_redirect_without_state() {
        let guard = RouteGuard::new(PaymentStateStore::new());
        for route in Route::ALL.into_iter().filter(Route::is_protected) {
            assert_eq!(
                guard.resolve(route),
                Access::Redirect {
                    from: route,
                    to: Route::Home
                }
            );
        }
    }

    #[test]
    fn test_open_routes_ignore_state() {
        let guard = RouteGuard::new(PaymentStateStore::new());
        assert_eq!(guard.resolve(Route::Payment), Access::Open(Route::Payment));
        assert_eq!(
            guard.resolve(Route::CheckBalance),
            Access::Open(Route::CheckBalance)
        );
    }

    #[test]
    fn test_guard_is_re_evaluated_each_time() {
        let store = PaymentStateStore::new();
        let nav = Navigator::new(store.clone());

        assert_eq!(nav.navigate(Route::OtpAuth).landed(), Route::Home);

        store.set(pending());
        assert_eq!(
            nav.navigate(Route::OtpAuth),
            Access::Granted(Route::OtpAuth, pending())
        );
        assert_eq!(nav.current(), Route::OtpAuth);

        store.clear();
        assert_eq!(nav.navigate(Route::PaymentSuccess).landed(), Route::Home);
        assert_eq!(nav.current(), Route::Home);
    }

    #[test]
    fn test_clones_share_position() {
        let store = PaymentStateStore::new();
        store.set(pending());
        let nav = Navigator::new(store);
        let background = nav.clone();
        let mut moves = nav.subscribe();

        background.navigate(Route::PaymentFailure);
        assert_eq!(nav.current(), Route::PaymentFailure);
        assert!(moves.has_changed().unwrap());
        assert_eq!(*moves.borrow_and_update(), Route::PaymentFailure);
    }
}
