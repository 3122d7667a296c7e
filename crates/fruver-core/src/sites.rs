//! Site catalogue: one entry per shop, loaded from `config/sites.yaml`.
//!
//! Each entry names the catalog URL, the locators for the product grid and
//! its fields, the overlay to dismiss, how prices are formatted, and which
//! pagination strategy reveals successive batches of cards.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// An element locator, written in YAML as `{ xpath: "..." }`,
/// `{ css: "..." }` or `{ id: "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocatorMap", into = "LocatorMap")]
pub enum Locator {
    Xpath(String),
    Css(String),
    Id(String),
}

/// YAML form of a [`Locator`]: a map with exactly one of the three keys.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocatorMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    xpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    css: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl TryFrom<LocatorMap> for Locator {
    type Error = String;

    fn try_from(map: LocatorMap) -> Result<Self, Self::Error> {
        match (map.xpath, map.css, map.id) {
            (Some(expr), None, None) => Ok(Self::Xpath(expr)),
            (None, Some(expr), None) => Ok(Self::Css(expr)),
            (None, None, Some(expr)) => Ok(Self::Id(expr)),
            _ => Err("a locator needs exactly one of `xpath`, `css` or `id`".to_string()),
        }
    }
}

impl From<Locator> for LocatorMap {
    fn from(locator: Locator) -> Self {
        match locator {
            Locator::Xpath(expr) => Self {
                xpath: Some(expr),
                ..Self::default()
            },
            Locator::Css(expr) => Self {
                css: Some(expr),
                ..Self::default()
            },
            Locator::Id(expr) => Self {
                id: Some(expr),
                ..Self::default()
            },
        }
    }
}

impl Locator {
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::Xpath(expr.into())
    }

    #[must_use]
    pub fn css(expr: impl Into<String>) -> Self {
        Self::Css(expr.into())
    }

    #[must_use]
    pub fn id(expr: impl Into<String>) -> Self {
        Self::Id(expr.into())
    }

    /// The raw selector expression without its kind.
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Xpath(expr) | Self::Css(expr) | Self::Id(expr) => expr,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xpath(expr) => write!(f, "xpath={expr}"),
            Self::Css(expr) => write!(f, "css={expr}"),
            Self::Id(expr) => write!(f, "id={expr}"),
        }
    }
}

/// Bounds for a uniformly random pause, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    #[must_use]
    pub const fn between(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    #[must_use]
    pub const fn fixed(secs: f64) -> Self {
        Self::between(secs, secs)
    }

    fn is_valid(&self) -> bool {
        self.min_secs.is_finite()
            && self.max_secs.is_finite()
            && self.min_secs >= 0.0
            && self.min_secs <= self.max_secs
    }
}

/// Whether harvested records are checked against everything collected so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Skip any record structurally equal to one already collected.
    Global,
    /// Append every parsed record.
    Off,
}

/// How a pagination control is clicked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickMode {
    /// A real WebDriver click, which overlays can intercept.
    #[default]
    Native,
    /// `arguments[0].click()` through the page's script engine.
    Script,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// The "show more" control.
    pub button: Locator,
    #[serde(default = "default_control_timeout_secs")]
    pub button_timeout_secs: u64,
    /// Pause after each click while new cards attach.
    #[serde(default = "default_reveal_delay")]
    pub delay: DelayRange,
    #[serde(default = "default_global")]
    pub dedup: DedupPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextPageConfig {
    /// An enabled "next page" control; the locator must exclude disabled ones.
    pub next_button: Locator,
    #[serde(default = "default_long_timeout_secs")]
    pub grid_timeout_secs: u64,
    #[serde(default = "default_long_timeout_secs")]
    pub next_timeout_secs: u64,
    #[serde(default = "default_long_timeout_secs")]
    pub location_timeout_secs: u64,
    /// Pause after the click, before watching for the location change.
    #[serde(default = "default_page_settle")]
    pub settle: DelayRange,
    #[serde(default)]
    pub click: ClickMode,
    /// Dismiss the site overlay and click once more if the first click is intercepted.
    #[serde(default)]
    pub retry_after_overlay: bool,
    #[serde(default = "default_off")]
    pub dedup: DedupPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityGateConfig {
    pub city_option: Locator,
    pub confirm: Locator,
    #[serde(default = "default_control_timeout_secs")]
    pub gate_timeout_secs: u64,
    /// Pagination once past the gate.
    pub pages: NextPageConfig,
}

/// Fixed pauses of the slow scroll pass used by the dropdown strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollPacing {
    /// Discrete steps per descent and per ascent.
    pub steps: u32,
    pub step_down_secs: f64,
    pub step_up_secs: f64,
    /// Wait after a full descent before re-measuring the page height.
    pub growth_wait_secs: f64,
    /// Wait after a jump to the bottom of the page.
    pub bottom_wait_secs: f64,
    /// Wait after a complete pass before reading the grid.
    pub after_pass_secs: f64,
}

impl Default for ScrollPacing {
    fn default() -> Self {
        Self {
            steps: 10,
            step_down_secs: 0.5,
            step_up_secs: 0.3,
            growth_wait_secs: 2.0,
            bottom_wait_secs: 5.0,
            after_pass_secs: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownConfig {
    /// The `<select>` listing page numbers.
    pub select: Locator,
    #[serde(default = "default_control_timeout_secs")]
    pub select_timeout_secs: u64,
    /// How many of the enumerated pages are visited.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_select_delay")]
    pub select_delay: DelayRange,
    #[serde(default)]
    pub scroll: ScrollPacing,
    #[serde(default = "default_off")]
    pub dedup: DedupPolicy,
}

/// The strategy that reveals successive batches of product cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PaginationConfig {
    Reveal(RevealConfig),
    NextPage(NextPageConfig),
    Dropdown(DropdownConfig),
    CityGate(CityGateConfig),
}

impl PaginationConfig {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reveal(_) => "reveal",
            Self::NextPage(_) => "next_page",
            Self::Dropdown(_) => "dropdown",
            Self::CityGate(_) => "city_gate",
        }
    }

    #[must_use]
    pub fn dedup(&self) -> DedupPolicy {
        match self {
            Self::Reveal(c) => c.dedup,
            Self::NextPage(c) => c.dedup,
            Self::Dropdown(c) => c.dedup,
            Self::CityGate(c) => c.pages.dedup,
        }
    }

    fn delay_ranges(&self) -> Vec<(&'static str, DelayRange)> {
        match self {
            Self::Reveal(c) => vec![("delay", c.delay)],
            Self::NextPage(c) => vec![("settle", c.settle)],
            Self::Dropdown(c) => vec![("select_delay", c.select_delay)],
            Self::CityGate(c) => vec![("pages.settle", c.pages.settle)],
        }
    }
}

/// Locators applied inside one product card (or, for the dropdown
/// strategy, across the whole page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldLocators {
    pub name: Locator,
    pub price: Locator,
    /// Absent for shops that do not show a unit price.
    #[serde(default)]
    pub unit_price: Option<Locator>,
}

/// Header used for the product-name column of the export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameColumn {
    #[default]
    Producto,
    Nombre,
}

impl NameColumn {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Producto => "producto",
            Self::Nombre => "nombre",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitPriceFormat {
    /// Passed through untouched.
    #[default]
    Plain,
    /// `"<unit> a <price>"`, split into a unit label and a stripped price.
    Combined {
        /// Remove `(` and `)` before splitting, e.g. `"(kg a $4.980)"`.
        #[serde(default)]
        strip_parens: bool,
        /// Turn a decimal comma into a point after stripping, e.g. `"12,5"` -> `"12.5"`.
        #[serde(default)]
        decimal_comma: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceFormat {
    /// Drop a trailing `,00` cents part, e.g. `"$4.500,00"` -> `"4500"`.
    #[serde(default)]
    pub strip_cents_suffix: bool,
    #[serde(default)]
    pub unit_price: UnitPriceFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Short identifier, also the export file prefix.
    pub slug: String,
    pub url: String,
    #[serde(default)]
    pub name_column: NameColumn,
    /// Product card container. Not used by the dropdown strategy, which
    /// reads the field locators across the whole page.
    #[serde(default)]
    pub card: Option<Locator>,
    pub fields: FieldLocators,
    /// Close button of a promo/geolocation overlay that can block clicks.
    #[serde(default)]
    pub overlay_close: Option<Locator>,
    /// Pause after the first navigation.
    #[serde(default = "default_initial_settle")]
    pub initial_settle: DelayRange,
    #[serde(default)]
    pub price_format: PriceFormat,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
}

impl SitesFile {
    /// Look up a site by slug.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSite`] if no entry has that slug.
    pub fn get(&self, slug: &str) -> Result<&SiteConfig, ConfigError> {
        self.sites
            .iter()
            .find(|s| s.slug == slug)
            .ok_or_else(|| ConfigError::UnknownSite(slug.to_string()))
    }

    #[must_use]
    pub fn slugs(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.slug.as_str()).collect()
    }
}

/// Load and validate the site catalogue from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_sites(&content)
}

/// Parse and validate a site catalogue from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML for [`SitesFile`]
/// or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile = serde_yaml::from_str(content)?;
    validate_sites(&sites_file)?;
    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    if sites_file.sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();

    for site in &sites_file.sites {
        let valid_slug = !site.slug.is_empty()
            && site
                .slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid_slug {
            return Err(ConfigError::Validation(format!(
                "site slug '{}' must be non-empty lowercase ascii, digits, '-' or '_'",
                site.slug
            )));
        }

        if !seen_slugs.insert(site.slug.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site slug: '{}'",
                site.slug
            )));
        }

        if !site.url.starts_with("https://") && !site.url.starts_with("http://") {
            return Err(ConfigError::Validation(format!(
                "site '{}' url '{}' must be http(s)",
                site.slug, site.url
            )));
        }

        let needs_card = !matches!(site.pagination, PaginationConfig::Dropdown(_));
        if needs_card && site.card.is_none() {
            return Err(ConfigError::Validation(format!(
                "site '{}' uses {} pagination and needs a card locator",
                site.slug,
                site.pagination.kind()
            )));
        }

        let mut ranges = site.pagination.delay_ranges();
        ranges.push(("initial_settle", site.initial_settle));
        for (name, range) in ranges {
            if !range.is_valid() {
                return Err(ConfigError::Validation(format!(
                    "site '{}' has invalid {name} range {}..{}",
                    site.slug, range.min_secs, range.max_secs
                )));
            }
        }

        if let PaginationConfig::Dropdown(dropdown) = &site.pagination {
            if dropdown.max_pages == 0 {
                return Err(ConfigError::Validation(format!(
                    "site '{}' dropdown max_pages must be at least 1",
                    site.slug
                )));
            }
            if dropdown.scroll.steps == 0 {
                return Err(ConfigError::Validation(format!(
                    "site '{}' scroll steps must be at least 1",
                    site.slug
                )));
            }
        }
    }

    Ok(())
}

fn default_control_timeout_secs() -> u64 {
    10
}

fn default_long_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> usize {
    2
}

fn default_global() -> DedupPolicy {
    DedupPolicy::Global
}

fn default_off() -> DedupPolicy {
    DedupPolicy::Off
}

fn default_reveal_delay() -> DelayRange {
    DelayRange::between(5.0, 8.0)
}

fn default_page_settle() -> DelayRange {
    DelayRange::between(8.0, 12.0)
}

fn default_select_delay() -> DelayRange {
    DelayRange::between(3.0, 5.0)
}

fn default_initial_settle() -> DelayRange {
    DelayRange::between(6.0, 12.0)
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
