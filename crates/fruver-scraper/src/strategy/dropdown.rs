use std::time::Duration;

use fruver_core::{DedupPolicy, DropdownConfig, Locator};

use super::{Advance, Batch, PaginationStrategy};
use crate::browser::{Action, Browser, Wait};
use crate::delay::DelayPolicy;
use crate::error::DriverError;
use crate::harvest::{HarvestState, StopReason};
use crate::parser::ProductParser;

/// Upper bound on descents while the page keeps growing under the scroll.
const MAX_SCROLL_ROUNDS: usize = 20;

/// Pauses of one slow scroll pass, already scaled.
#[derive(Debug, Clone)]
struct Pacing {
    steps: u32,
    step_down: DelayPolicy,
    step_up: DelayPolicy,
    growth_wait: DelayPolicy,
    bottom_wait: DelayPolicy,
    after_pass: DelayPolicy,
}

/// A page-number `<select>` at the foot of a lazily rendered grid.
///
/// The page numbers are read from the select once. Each page is then
/// scrolled slowly top to bottom so every lazy tile renders, and its
/// fields are collected page-wide and paired by position.
#[derive(Debug, Clone)]
pub struct DropdownStrategy {
    select: Locator,
    select_timeout: Duration,
    max_pages: usize,
    select_delay: DelayPolicy,
    pacing: Pacing,
    dedup: DedupPolicy,
    pages: Vec<String>,
    cursor: usize,
}

impl DropdownStrategy {
    #[must_use]
    pub fn new(config: &DropdownConfig, delay_scale: f64) -> Self {
        let scroll = &config.scroll;
        Self {
            select: config.select.clone(),
            select_timeout: Duration::from_secs(config.select_timeout_secs),
            max_pages: config.max_pages,
            select_delay: DelayPolicy::from_range(config.select_delay, delay_scale),
            pacing: Pacing {
                steps: scroll.steps.max(1),
                step_down: DelayPolicy::fixed(scroll.step_down_secs, delay_scale),
                step_up: DelayPolicy::fixed(scroll.step_up_secs, delay_scale),
                growth_wait: DelayPolicy::fixed(scroll.growth_wait_secs, delay_scale),
                bottom_wait: DelayPolicy::fixed(scroll.bottom_wait_secs, delay_scale),
                after_pass: DelayPolicy::fixed(scroll.after_pass_secs, delay_scale),
            },
            dedup: config.dedup,
            pages: Vec::new(),
            cursor: 0,
        }
    }

    /// Page values selected from the dropdown, in visiting order.
    #[must_use]
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    async fn scroll_to_bottom<B: Browser>(&self, browser: &B) -> Result<(), DriverError> {
        browser.act(Action::ScrollToBottom).await?;
        self.pacing.bottom_wait.pause().await;
        browser.act(Action::ScrollToBottom).await?;
        self.pacing.growth_wait.pause().await;
        Ok(())
    }

    /// Read the numeric option values of the page selector.
    async fn enumerate_pages<B: Browser>(&self, browser: &B) -> Result<Vec<String>, DriverError> {
        self.scroll_to_bottom(browser).await?;
        let select = match browser
            .find(None, &self.select, Wait::present(self.select_timeout))
            .await
        {
            Ok(select) => select,
            Err(err) if err.is_absent() => {
                tracing::warn!(locator = %self.select, "page selector not found");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let values = browser.option_values(&select).await?;
        Ok(values
            .into_iter()
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit()))
            .collect())
    }

    /// Select `value` in the page selector. A selector that cannot be found
    /// is logged and the harvest carries on with whatever is shown.
    async fn select_page<B: Browser>(&self, browser: &B, value: &str) -> Result<(), DriverError> {
        self.scroll_to_bottom(browser).await?;
        match browser
            .find(None, &self.select, Wait::present(self.select_timeout))
            .await
        {
            Ok(select) => {
                browser.act(Action::SelectValue(&select, value)).await?;
                tracing::info!(page = value, "selected page");
                self.select_delay.pause().await;
            }
            Err(err) if err.is_absent() => {
                tracing::warn!(page = value, locator = %self.select, "page selector not found");
            }
            Err(err) => return Err(err),
        }
        browser.act(Action::ScrollTo(0.0)).await
    }

    /// Scroll down in even steps until the page stops growing, then back
    /// up, so every lazily rendered tile has been in view.
    async fn scroll_slowly<B: Browser>(&self, browser: &B) -> Result<(), DriverError> {
        let steps = f64::from(self.pacing.steps);
        let mut height = browser.page_height().await?;

        for _ in 0..MAX_SCROLL_ROUNDS {
            for i in 1..=self.pacing.steps {
                browser
                    .act(Action::ScrollTo(height * f64::from(i) / steps))
                    .await?;
                self.pacing.step_down.pause().await;
            }
            self.pacing.growth_wait.pause().await;
            let grown = browser.page_height().await?;
            if grown <= height {
                break;
            }
            tracing::debug!(from = height, to = grown, "page grew while scrolling");
            height = grown;
        }

        for i in (0..self.pacing.steps).rev() {
            browser
                .act(Action::ScrollTo(height * f64::from(i) / steps))
                .await?;
            self.pacing.step_up.pause().await;
        }
        Ok(())
    }
}

impl<B: Browser> PaginationStrategy<B> for DropdownStrategy {
    fn name(&self) -> &'static str {
        "dropdown"
    }

    fn dedup_policy(&self) -> DedupPolicy {
        self.dedup
    }

    async fn prepare(&mut self, browser: &B) -> Result<(), DriverError> {
        let mut pages = self.enumerate_pages(browser).await?;
        tracing::info!(found = pages.len(), max_pages = self.max_pages, "page selector read");
        pages.truncate(self.max_pages);
        self.pages = pages;
        self.cursor = 0;

        if let Some(first) = self.pages.first() {
            self.select_page(browser, first).await?;
        }
        Ok(())
    }

    async fn extract_batch(
        &mut self,
        browser: &B,
        parser: &ProductParser,
    ) -> Result<Batch, DriverError> {
        if self.cursor >= self.pages.len() {
            return Ok(Batch::Exhausted(StopReason::PageLimit));
        }
        self.scroll_slowly(browser).await?;
        self.pacing.after_pass.pause().await;
        Ok(Batch::Cards(parser.parse_columns(browser).await))
    }

    async fn advance(&mut self, browser: &B, _state: &HarvestState) -> Result<Advance, DriverError> {
        let Some(next) = self.pages.get(self.cursor + 1).cloned() else {
            self.cursor = self.pages.len();
            return Ok(Advance::Done(StopReason::PageLimit));
        };
        self.select_page(browser, &next).await?;
        self.cursor += 1;
        Ok(Advance::Moved { marker: Some(next) })
    }
}
