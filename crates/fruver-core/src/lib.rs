pub mod app_config;
pub mod config;
pub mod products;
pub mod sites;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{NormalizedRow, ProductRecord, MISSING_VALUE};
pub use sites::{
    load_sites, parse_sites, CityGateConfig, ClickMode, DedupPolicy, DelayRange, DropdownConfig,
    FieldLocators, Locator, NameColumn, NextPageConfig, PaginationConfig, PriceFormat,
    RevealConfig, ScrollPacing, SiteConfig, SitesFile, UnitPriceFormat,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sites file {path}: {source}")]
    SitesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sites file: {0}")]
    SitesFileParse(#[from] serde_yaml::Error),

    #[error("sites validation failed: {0}")]
    Validation(String),

    #[error("unknown site '{0}'")]
    UnknownSite(String),
}
