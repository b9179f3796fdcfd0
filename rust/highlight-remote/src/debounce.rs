//! Keystroke debouncing.

use std::time::Duration;

use tokio::time::Instant;
use tracing::trace;

/// Collapses a burst of input revisions into a single trigger.
///
/// [Debouncer::schedule] records the latest text and re-arms the timer;
/// [Debouncer::fired] resolves once the timer runs out uninterrupted and
/// yields the text recorded last. However many revisions arrive within one
/// window, the trigger fires at most once.
///
/// `fired` is cancel-safe: dropping it before it resolves leaves the timer
/// armed, so it can sit in a `tokio::select!` loop next to other events.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use highlight_remote::Debouncer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut debouncer = Debouncer::new(Duration::from_millis(10));
///
/// debouncer.schedule("App");
/// debouncer.schedule("Apple");
///
/// assert_eq!(debouncer.fired().await, "Apple");
/// assert!(!debouncer.is_armed());
/// # }
/// ```
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    latest: String,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: String::new(),
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record `text` and restart the quiet period.
    ///
    /// Blank text disarms the timer instead and returns false; it never
    /// leads to a trigger.
    pub fn schedule(&mut self, text: impl Into<String>) -> bool {
        self.latest = text.into();

        if self.latest.trim().is_empty() {
            self.deadline = None;
            trace!("Debounce disarmed by blank input");
            return false;
        }

        let deadline = Instant::now() + self.delay;
        self.deadline = Some(deadline);
        trace!(delay_ms = self.delay.as_millis() as u64, "Debounce armed");
        true
    }

    /// Disarm the timer without triggering.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// The most recently scheduled text.
    pub fn latest(&self) -> &str {
        &self.latest
    }

    /// Wait for the armed timer to run out and take the latest text.
    /// Never resolves while disarmed.
    pub async fn fired(&mut self) -> String {
        let Some(deadline) = self.deadline else {
            return std::future::pending().await;
        };

        tokio::time::sleep_until(deadline).await;

        self.deadline = None;
        self.latest.clone()
    }
}
