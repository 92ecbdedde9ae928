//! Navigation sink — current location plus an outbound route channel.
//!
//! DESIGN
//! ======
//! The host shell owns actual screen transitions. This handle tracks the
//! screen the app is on (updated by the host on user navigation, and
//! eagerly on every requested route so redundant reconciliations read the
//! post-navigation location) and delivers requested routes over a bounded
//! channel.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::route::{Route, Screen};

const ROUTE_CHANNEL_CAPACITY: usize = 32;

#[derive(Clone)]
pub struct Navigator {
    inner: Arc<NavigatorInner>,
}

struct NavigatorInner {
    location: Mutex<Screen>,
    tx: mpsc::Sender<Route>,
}

impl Navigator {
    /// Create a navigator starting at `initial`, returning the receiving end
    /// the host shell drains.
    #[must_use]
    pub fn new(initial: Screen) -> (Self, mpsc::Receiver<Route>) {
        let (tx, rx) = mpsc::channel(ROUTE_CHANNEL_CAPACITY);
        let inner = NavigatorInner { location: Mutex::new(initial), tx };
        (Self { inner: Arc::new(inner) }, rx)
    }

    #[must_use]
    pub fn current(&self) -> Screen {
        *self.inner.location.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Host callback: the user navigated on their own.
    pub fn set_current(&self, screen: Screen) {
        *self.inner.location.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = screen;
    }

    /// Request a replace-navigation to `route`. The tracked location moves
    /// immediately so a reconciliation re-run against the same snapshot sees
    /// itself already there and stays quiet.
    pub fn replace(&self, route: Route) {
        self.set_current(route.screen());
        if let Err(e) = self.inner.tx.try_send(route) {
            tracing::warn!(error = %e, "dropping navigation request, host not draining");
        }
    }
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod tests;
