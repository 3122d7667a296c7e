pub mod browser;
pub mod delay;
pub mod error;
pub mod extract;
pub mod harvest;
pub mod normalize;
pub mod overlay;
pub mod parser;
pub mod site;
pub mod strategy;

pub use browser::{Action, Browser, Condition, Wait, WebDriverBrowser};
pub use delay::DelayPolicy;
pub use error::{DriverError, ScraperError};
pub use extract::FieldExtractor;
pub use harvest::{
    harvest, HarvestOptions, HarvestOutcome, HarvestState, StopReason,
    DEFAULT_MAX_CONSECUTIVE_FAULTS,
};
pub use normalize::{normalize_price, normalize_record, normalize_records, split_unit_price};
pub use overlay::Overlay;
pub use parser::ProductParser;
pub use site::{harvest_site, RunSettings};
pub use strategy::{
    Advance, Batch, CityGateStrategy, DropdownStrategy, NextPageStrategy, PaginationStrategy,
    RevealStrategy, SiteStrategy,
};
