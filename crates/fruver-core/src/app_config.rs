use std::path::PathBuf;

/// Runtime settings shared by every site in a run.
///
/// Site-specific locators and pagination budgets live in the sites file
/// (see [`crate::sites`]); this struct only carries what is the same for
/// all of them.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// WebDriver endpoint (chromedriver, geckodriver, selenium grid).
    pub webdriver_url: String,
    pub sites_path: PathBuf,
    /// Directory the timestamped CSV exports are written to.
    pub output_dir: PathBuf,
    pub log_level: String,
    pub headless: bool,
    pub user_agent: String,
    /// Wait budget for a single product field inside a card.
    pub field_timeout_secs: u64,
    /// Consecutive faulted harvest iterations tolerated before stopping.
    pub max_consecutive_faults: u32,
    /// Multiplier applied to every randomized delay. `0.0` disables them.
    pub delay_scale: f64,
}
