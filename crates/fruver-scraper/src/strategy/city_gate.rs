use std::time::Duration;

use fruver_core::{CityGateConfig, DedupPolicy, Locator};

use super::{Advance, Batch, NextPageStrategy, PaginationStrategy};
use crate::browser::{Action, Browser, Wait};
use crate::error::DriverError;
use crate::harvest::HarvestState;
use crate::overlay::Overlay;
use crate::parser::ProductParser;

/// A city picker shown before the catalogue, then ordinary next-page
/// pagination.
#[derive(Debug, Clone)]
pub struct CityGateStrategy {
    city_option: Locator,
    confirm: Locator,
    gate_timeout: Duration,
    pages: NextPageStrategy,
}

impl CityGateStrategy {
    #[must_use]
    pub fn new(
        card: Locator,
        config: &CityGateConfig,
        overlay: Option<Overlay>,
        delay_scale: f64,
    ) -> Self {
        Self {
            city_option: config.city_option.clone(),
            confirm: config.confirm.clone(),
            gate_timeout: Duration::from_secs(config.gate_timeout_secs),
            pages: NextPageStrategy::new(card, &config.pages, overlay, delay_scale),
        }
    }

    async fn click_gate_control<B: Browser>(
        &self,
        browser: &B,
        locator: &Locator,
    ) -> Result<bool, DriverError> {
        match browser
            .find(None, locator, Wait::clickable(self.gate_timeout))
            .await
        {
            Ok(control) => {
                browser.act(Action::Click(&control)).await?;
                Ok(true)
            }
            Err(err) if err.is_absent() => Ok(false),
            Err(err) => Err(err),
        }
    }
}

impl<B: Browser> PaginationStrategy<B> for CityGateStrategy {
    fn name(&self) -> &'static str {
        "city_gate"
    }

    fn dedup_policy(&self) -> DedupPolicy {
        PaginationStrategy::<B>::dedup_policy(&self.pages)
    }

    /// Pick the city and confirm. A gate that never shows up is not an
    /// error; the catalogue is simply already visible.
    async fn prepare(&mut self, browser: &B) -> Result<(), DriverError> {
        if !self.click_gate_control(browser, &self.city_option).await? {
            tracing::info!(locator = %self.city_option, "city gate not shown");
            return Ok(());
        }
        if self.click_gate_control(browser, &self.confirm).await? {
            tracing::info!("city selected");
        } else {
            tracing::info!(locator = %self.confirm, "city confirm control not shown");
        }
        Ok(())
    }

    async fn extract_batch(
        &mut self,
        browser: &B,
        parser: &ProductParser,
    ) -> Result<Batch, DriverError> {
        self.pages.extract_batch(browser, parser).await
    }

    async fn advance(&mut self, browser: &B, state: &HarvestState) -> Result<Advance, DriverError> {
        self.pages.advance(browser, state).await
    }
}
