use std::time::Duration;

use fruver_core::{DedupPolicy, Locator, RevealConfig};

use super::{Advance, Batch, PaginationStrategy};
use crate::browser::{Action, Browser, Wait};
use crate::delay::DelayPolicy;
use crate::error::DriverError;
use crate::harvest::{HarvestState, StopReason};
use crate::overlay::Overlay;
use crate::parser::ProductParser;

/// A "show more" button that appends cards to the same grid.
///
/// Every batch re-reads the whole grid, so records must be deduplicated
/// against everything collected so far. The catalogue is exhausted once a
/// pass adds nothing new or the button is gone.
#[derive(Debug, Clone)]
pub struct RevealStrategy {
    card: Locator,
    button: Locator,
    button_timeout: Duration,
    delay: DelayPolicy,
    overlay: Option<Overlay>,
    dedup: DedupPolicy,
}

impl RevealStrategy {
    #[must_use]
    pub fn new(
        card: Locator,
        config: &RevealConfig,
        overlay: Option<Overlay>,
        delay_scale: f64,
    ) -> Self {
        Self {
            card,
            button: config.button.clone(),
            button_timeout: Duration::from_secs(config.button_timeout_secs),
            delay: DelayPolicy::from_range(config.delay, delay_scale),
            overlay,
            dedup: config.dedup,
        }
    }
}

impl<B: Browser> PaginationStrategy<B> for RevealStrategy {
    fn name(&self) -> &'static str {
        "reveal"
    }

    fn dedup_policy(&self) -> DedupPolicy {
        self.dedup
    }

    async fn extract_batch(
        &mut self,
        browser: &B,
        parser: &ProductParser,
    ) -> Result<Batch, DriverError> {
        let cards = browser
            .find_all(None, &self.card, Wait::present(self.button_timeout))
            .await?;
        tracing::debug!(cards = cards.len(), "product cards on page");
        Ok(Batch::Cards(parser.parse_cards(browser, &cards).await))
    }

    async fn advance(&mut self, browser: &B, _state: &HarvestState) -> Result<Advance, DriverError> {
        if let Some(overlay) = &self.overlay {
            overlay.dismiss(browser).await;
        }

        let button = match browser
            .find(None, &self.button, Wait::present(self.button_timeout))
            .await
        {
            Ok(button) => button,
            Err(err) if err.is_absent() => {
                tracing::info!(locator = %self.button, "show-more control no longer present");
                return Ok(Advance::Done(StopReason::ControlMissing));
            }
            Err(err) => return Err(err),
        };

        browser.act(Action::ScrollIntoView(&button)).await?;
        browser.act(Action::Click(&button)).await?;
        self.delay.pause().await;
        Ok(Advance::Moved { marker: None })
    }

    fn is_done(&self, _state: &HarvestState, new_records: usize) -> bool {
        new_records == 0
    }
}
