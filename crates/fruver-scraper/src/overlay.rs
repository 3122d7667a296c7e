use std::time::Duration;

use fruver_core::Locator;

use crate::browser::{Action, Browser, Wait};
use crate::delay::DelayPolicy;

const OVERLAY_TIMEOUT: Duration = Duration::from_secs(5);
const AFTER_DISMISS_SECS: f64 = 2.0;

/// A promo, geolocation or cookie banner that can intercept clicks.
#[derive(Debug, Clone)]
pub struct Overlay {
    close: Locator,
    timeout: Duration,
    after_dismiss: DelayPolicy,
}

impl Overlay {
    #[must_use]
    pub fn new(close: Locator, delay_scale: f64) -> Self {
        Self {
            close,
            timeout: OVERLAY_TIMEOUT,
            after_dismiss: DelayPolicy::fixed(AFTER_DISMISS_SECS, delay_scale),
        }
    }

    /// Click the close control if it shows up in time.
    ///
    /// Returns `true` when the overlay was dismissed. Absence is normal and
    /// only logged.
    pub async fn dismiss<B: Browser>(&self, browser: &B) -> bool {
        let button = match browser
            .find(None, &self.close, Wait::clickable(self.timeout))
            .await
        {
            Ok(button) => button,
            Err(err) => {
                tracing::debug!(locator = %self.close, error = %err, "no overlay to dismiss");
                return false;
            }
        };

        match browser.act(Action::Click(&button)).await {
            Ok(()) => {
                tracing::info!(locator = %self.close, "overlay dismissed");
                self.after_dismiss.pause().await;
                true
            }
            Err(err) => {
                tracing::info!(locator = %self.close, error = %err, "overlay could not be closed");
                false
            }
        }
    }
}
