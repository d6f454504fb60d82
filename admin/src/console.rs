//! Terminal stand-ins for the dashboard's snackbar and router.

use jobdesk_forms::{Navigator, NotificationSink, RouteKey, Severity};
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// Prints notices: errors and warnings to stderr, the rest to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error | Severity::Warning => eprintln!("{message}"),
            Severity::Success | Severity::Info => println!("{message}"),
        }
    }
}

/// Logs where the dashboard would go next and remembers the last route.
#[derive(Debug, Default)]
pub struct LogNavigator {
    last: Mutex<Option<RouteKey>>,
}

impl LogNavigator {
    pub fn last_route(&self) -> Option<RouteKey> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for LogNavigator {
    fn go_to(&self, route: RouteKey) {
        info!("Next page: {}", route.path());
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(route);
    }
}
