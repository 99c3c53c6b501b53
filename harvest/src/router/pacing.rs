use std::time::Duration;

/// Inserts a fixed pause before every call except the first.
///
/// The pause is measured from the moment `wait` is entered, so a slow call
/// is still followed by the full delay.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    /// Sleep `delay` unless this is the first call, then mark a call as started.
    pub async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}
