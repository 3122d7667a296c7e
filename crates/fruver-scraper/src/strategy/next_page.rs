use std::time::Duration;

use fruver_core::{ClickMode, DedupPolicy, Locator, NextPageConfig};

use super::{wait_for_location_change, Advance, Batch, PaginationStrategy};
use crate::browser::{Action, Browser, Wait};
use crate::delay::DelayPolicy;
use crate::error::DriverError;
use crate::harvest::{HarvestState, StopReason};
use crate::overlay::Overlay;
use crate::parser::ProductParser;

/// A "next page" control that replaces the grid with the following page.
///
/// A page counts as reached once the browser location differs from the
/// location recorded for the previous page.
#[derive(Debug, Clone)]
pub struct NextPageStrategy {
    card: Locator,
    next_button: Locator,
    grid_timeout: Duration,
    next_timeout: Duration,
    location_timeout: Duration,
    settle: DelayPolicy,
    click: ClickMode,
    /// Set when an intercepted click should be retried after closing it.
    retry_overlay: Option<Overlay>,
    dedup: DedupPolicy,
}

impl NextPageStrategy {
    #[must_use]
    pub fn new(
        card: Locator,
        config: &NextPageConfig,
        overlay: Option<Overlay>,
        delay_scale: f64,
    ) -> Self {
        Self {
            card,
            next_button: config.next_button.clone(),
            grid_timeout: Duration::from_secs(config.grid_timeout_secs),
            next_timeout: Duration::from_secs(config.next_timeout_secs),
            location_timeout: Duration::from_secs(config.location_timeout_secs),
            settle: DelayPolicy::from_range(config.settle, delay_scale),
            click: config.click,
            retry_overlay: overlay.filter(|_| config.retry_after_overlay),
            dedup: config.dedup,
        }
    }

    async fn click<B: Browser>(&self, browser: &B, button: &B::Element) -> Result<(), DriverError> {
        match self.click {
            ClickMode::Native => browser.act(Action::Click(button)).await,
            ClickMode::Script => browser.act(Action::ScriptClick(button)).await,
        }
    }

    /// Click the next control, closing the overlay and retrying once if it
    /// swallowed the first click. `Ok(false)` means the click never landed.
    async fn click_through<B: Browser>(
        &self,
        browser: &B,
        button: &B::Element,
    ) -> Result<bool, DriverError> {
        match self.click(browser, button).await {
            Ok(()) => Ok(true),
            Err(DriverError::ClickIntercepted) => {
                let Some(overlay) = &self.retry_overlay else {
                    tracing::warn!("next-page click intercepted");
                    return Ok(false);
                };
                tracing::info!("next-page click intercepted; closing overlay and retrying");
                overlay.dismiss(browser).await;
                match self.click(browser, button).await {
                    Ok(()) => Ok(true),
                    Err(err) if is_click_refusal(&err) => {
                        tracing::warn!(error = %err, "next-page click failed after retry");
                        Ok(false)
                    }
                    Err(err) => Err(err),
                }
            }
            Err(err) if is_click_refusal(&err) => {
                tracing::warn!(error = %err, "next-page click failed");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

fn is_click_refusal(err: &DriverError) -> bool {
    err.is_absent()
        || matches!(
            err,
            DriverError::ClickIntercepted | DriverError::NotInteractable
        )
}

impl<B: Browser> PaginationStrategy<B> for NextPageStrategy {
    fn name(&self) -> &'static str {
        "next_page"
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
            .find_all(None, &self.card, Wait::present(self.grid_timeout))
            .await?;
        if cards.is_empty() {
            tracing::info!(locator = %self.card, "product grid did not appear");
            return Ok(Batch::Exhausted(StopReason::GridEmpty));
        }
        tracing::debug!(cards = cards.len(), "product cards on page");
        Ok(Batch::Cards(parser.parse_cards(browser, &cards).await))
    }

    async fn advance(&mut self, browser: &B, state: &HarvestState) -> Result<Advance, DriverError> {
        let button = match browser
            .find(None, &self.next_button, Wait::clickable(self.next_timeout))
            .await
        {
            Ok(button) => button,
            Err(err) if err.is_absent() => {
                tracing::info!(page = state.page, "no enabled next-page control; last page reached");
                return Ok(Advance::Done(StopReason::ControlMissing));
            }
            Err(err) => return Err(err),
        };

        if !self.click_through(browser, &button).await? {
            return Ok(Advance::Done(StopReason::ClickFailed));
        }
        self.settle.pause().await;

        match wait_for_location_change(
            browser,
            state.previous_marker.as_deref(),
            self.location_timeout,
        )
        .await?
        {
            Some(location) => {
                tracing::debug!(%location, "moved to next page");
                Ok(Advance::Moved {
                    marker: Some(location),
                })
            }
            None => {
                tracing::warn!(page = state.page, "location did not change after next-page click");
                Ok(Advance::Done(StopReason::NavigationStalled))
            }
        }
    }
}
