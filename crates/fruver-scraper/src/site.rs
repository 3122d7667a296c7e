//! Harvesting one configured site in an already open browser session.

use std::time::Duration;

use fruver_core::{AppConfig, SiteConfig};

use crate::browser::Browser;
use crate::delay::DelayPolicy;
use crate::error::ScraperError;
use crate::extract::FieldExtractor;
use crate::harvest::{harvest, HarvestOptions, HarvestOutcome};
use crate::parser::ProductParser;
use crate::strategy::SiteStrategy;

/// Runtime knobs shared by every site in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub field_timeout: Duration,
    pub max_consecutive_faults: u32,
    /// Multiplies every randomized pause; `0.0` disables them.
    pub delay_scale: f64,
}

impl RunSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            field_timeout: Duration::from_secs(config.field_timeout_secs),
            max_consecutive_faults: config.max_consecutive_faults,
            delay_scale: config.delay_scale,
        }
    }
}

/// Open the site's catalogue page, let it settle, and harvest it with the
/// configured strategy.
///
/// The session is borrowed, not consumed; releasing it is the caller's job
/// whatever this returns.
///
/// # Errors
///
/// Returns [`ScraperError::Navigation`] if the catalogue page cannot be
/// opened. Faults during the harvest itself end it early but still return
/// the records gathered so far.
pub async fn harvest_site<B: Browser>(
    browser: &B,
    site: &SiteConfig,
    settings: RunSettings,
) -> Result<HarvestOutcome, ScraperError> {
    browser
        .goto(&site.url)
        .await
        .map_err(|source| ScraperError::Navigation {
            url: site.url.clone(),
            source,
        })?;
    DelayPolicy::from_range(site.initial_settle, settings.delay_scale)
        .pause()
        .await;

    let mut strategy = SiteStrategy::for_site(site, settings.delay_scale);
    let parser = ProductParser::new(
        site.fields.clone(),
        FieldExtractor::new(settings.field_timeout),
    );
    let options = HarvestOptions {
        max_consecutive_faults: settings.max_consecutive_faults,
    };

    Ok(harvest(browser, &mut strategy, &parser, options).await)
}
