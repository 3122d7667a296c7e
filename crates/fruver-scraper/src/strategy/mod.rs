//! Pagination strategies: how each shop reveals its next batch of products.
//!
//! The harvest loop only knows the [`PaginationStrategy`] contract. Each
//! implementation owns its locators, waits and pacing, and decides when
//! its catalogue is exhausted.

mod city_gate;
mod dropdown;
mod next_page;
mod reveal;

use std::time::Duration;

use fruver_core::{DedupPolicy, PaginationConfig, ProductRecord, SiteConfig};
use tokio::time::Instant;

use crate::browser::Browser;
use crate::error::DriverError;
use crate::harvest::{HarvestState, StopReason};
use crate::overlay::Overlay;
use crate::parser::ProductParser;

pub use city_gate::CityGateStrategy;
pub use dropdown::DropdownStrategy;
pub use next_page::NextPageStrategy;
pub use reveal::RevealStrategy;

const LOCATION_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of reading the products currently on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    Cards(Vec<ProductRecord>),
    /// Nothing left to read; the harvest ends without advancing.
    Exhausted(StopReason),
}

/// Outcome of trying to reveal the next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// The page moved on. `marker` identifies where it landed, such as the
    /// new location, when the strategy tracks one.
    Moved { marker: Option<String> },
    Done(StopReason),
}

/// One shop's way of walking its catalogue.
///
/// Each harvest iteration reads a batch, merges it, asks [`is_done`], then
/// asks the strategy to advance. Methods return `Err` only for unexpected
/// browser faults; an absent control is a normal [`Advance::Done`].
///
/// [`is_done`]: PaginationStrategy::is_done
#[allow(async_fn_in_trait)]
pub trait PaginationStrategy<B: Browser> {
    fn name(&self) -> &'static str;

    fn dedup_policy(&self) -> DedupPolicy;

    /// One-off setup before the first batch is read.
    async fn prepare(&mut self, _browser: &B) -> Result<(), DriverError> {
        Ok(())
    }

    async fn extract_batch(
        &mut self,
        browser: &B,
        parser: &ProductParser,
    ) -> Result<Batch, DriverError>;

    async fn advance(&mut self, browser: &B, state: &HarvestState)
        -> Result<Advance, DriverError>;

    /// Checked after each merge with the number of records it added.
    fn is_done(&self, _state: &HarvestState, _new_records: usize) -> bool {
        false
    }
}

/// The strategy configured for a site.
#[derive(Debug, Clone)]
pub enum SiteStrategy {
    Reveal(RevealStrategy),
    NextPage(NextPageStrategy),
    Dropdown(DropdownStrategy),
    CityGate(CityGateStrategy),
}

impl SiteStrategy {
    /// Build the strategy for `site`, scaling every pause by `delay_scale`.
    ///
    /// Sites validated by `fruver_core::parse_sites` always carry a card
    /// locator for the card-based strategies; an unvalidated site without
    /// one falls back to the name locator.
    #[must_use]
    pub fn for_site(site: &SiteConfig, delay_scale: f64) -> Self {
        let card = site
            .card
            .clone()
            .unwrap_or_else(|| site.fields.name.clone());
        let overlay = site
            .overlay_close
            .clone()
            .map(|close| Overlay::new(close, delay_scale));

        match &site.pagination {
            PaginationConfig::Reveal(config) => {
                Self::Reveal(RevealStrategy::new(card, config, overlay, delay_scale))
            }
            PaginationConfig::NextPage(config) => {
                Self::NextPage(NextPageStrategy::new(card, config, overlay, delay_scale))
            }
            PaginationConfig::Dropdown(config) => {
                Self::Dropdown(DropdownStrategy::new(config, delay_scale))
            }
            PaginationConfig::CityGate(config) => {
                Self::CityGate(CityGateStrategy::new(card, config, overlay, delay_scale))
            }
        }
    }
}

impl<B: Browser> PaginationStrategy<B> for SiteStrategy {
    fn name(&self) -> &'static str {
        match self {
            Self::Reveal(s) => PaginationStrategy::<B>::name(s),
            Self::NextPage(s) => PaginationStrategy::<B>::name(s),
            Self::Dropdown(s) => PaginationStrategy::<B>::name(s),
            Self::CityGate(s) => PaginationStrategy::<B>::name(s),
        }
    }

    fn dedup_policy(&self) -> DedupPolicy {
        match self {
            Self::Reveal(s) => PaginationStrategy::<B>::dedup_policy(s),
            Self::NextPage(s) => PaginationStrategy::<B>::dedup_policy(s),
            Self::Dropdown(s) => PaginationStrategy::<B>::dedup_policy(s),
            Self::CityGate(s) => PaginationStrategy::<B>::dedup_policy(s),
        }
    }

    async fn prepare(&mut self, browser: &B) -> Result<(), DriverError> {
        match self {
            Self::Reveal(s) => s.prepare(browser).await,
            Self::NextPage(s) => s.prepare(browser).await,
            Self::Dropdown(s) => s.prepare(browser).await,
            Self::CityGate(s) => s.prepare(browser).await,
        }
    }

    async fn extract_batch(
        &mut self,
        browser: &B,
        parser: &ProductParser,
    ) -> Result<Batch, DriverError> {
        match self {
            Self::Reveal(s) => s.extract_batch(browser, parser).await,
            Self::NextPage(s) => s.extract_batch(browser, parser).await,
            Self::Dropdown(s) => s.extract_batch(browser, parser).await,
            Self::CityGate(s) => s.extract_batch(browser, parser).await,
        }
    }

    async fn advance(&mut self, browser: &B, state: &HarvestState) -> Result<Advance, DriverError> {
        match self {
            Self::Reveal(s) => s.advance(browser, state).await,
            Self::NextPage(s) => s.advance(browser, state).await,
            Self::Dropdown(s) => s.advance(browser, state).await,
            Self::CityGate(s) => s.advance(browser, state).await,
        }
    }

    fn is_done(&self, state: &HarvestState, new_records: usize) -> bool {
        match self {
            Self::Reveal(s) => PaginationStrategy::<B>::is_done(s, state, new_records),
            Self::NextPage(s) => PaginationStrategy::<B>::is_done(s, state, new_records),
            Self::Dropdown(s) => PaginationStrategy::<B>::is_done(s, state, new_records),
            Self::CityGate(s) => PaginationStrategy::<B>::is_done(s, state, new_records),
        }
    }
}

/// Poll the location until it differs from `previous`.
///
/// Returns the new location, or `None` if it had not changed when
/// `timeout` ran out.
pub(crate) async fn wait_for_location_change<B: Browser>(
    browser: &B,
    previous: Option<&str>,
    timeout: Duration,
) -> Result<Option<String>, DriverError> {
    let deadline = Instant::now() + timeout;
    loop {
        let current = browser.current_url().await?;
        if previous != Some(current.as_str()) {
            return Ok(Some(current));
        }
        let now = Instant::now();
        if now >= deadline {
            return Ok(None);
        }
        tokio::time::sleep(LOCATION_POLL_INTERVAL.min(deadline - now)).await;
    }
}
