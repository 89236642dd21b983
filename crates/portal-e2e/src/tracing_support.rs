//! Log setup for test runs.
//!
//! The library only emits `tracing` events; binaries and tests decide where
//! they go. `init_test_logging` routes them through libtest's captured output,
//! and `LogCapture` records them in memory so a test can assert on what the
//! resolver reported.

use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "portal_e2e=debug";

/// Install a fmt subscriber that writes through the test harness
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init();
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedEvent {
    /// Event level
    pub level: Level,
    /// The `message` field
    pub message: String,
    /// Every other field as `name=value`, in emission order
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Value of a named field
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let mut rendered = String::new();
        let _ = write!(rendered, "{value:?}");
        if field.name() == "message" {
            self.message = rendered;
        } else {
            self.fields.push((field.name().to_string(), rendered));
        }
    }
}

/// Layer that keeps every event in memory
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl LogCapture {
    /// Create an empty capture
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Events whose message equals `message`
    #[must_use]
    pub fn with_message(&self, message: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.message == message)
            .collect()
    }

    /// Run `f` with this capture installed as the thread's subscriber
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        use tracing_subscriber::layer::SubscriberExt;

        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl<S: Subscriber> Layer<S> for LogCapture {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        if let Ok(mut events) = self.events.lock() {
            events.push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                fields: visitor.fields,
            });
        }
    }
}
