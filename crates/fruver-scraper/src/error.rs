use fantoccini::error::{CmdError, ErrorStatus, NewSessionError};
use thiserror::Error;

/// Failures reported by the browser boundary.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no element matching {locator} after {waited_ms}ms")]
    Timeout { locator: String, waited_ms: u64 },

    #[error("no element matching {locator}")]
    NotFound { locator: String },

    #[error("element is no longer attached to the page")]
    Stale,

    #[error("click was intercepted by another element")]
    ClickIntercepted,

    #[error("element is not interactable")]
    NotInteractable,

    #[error("browser session error: {0}")]
    Session(String),

    #[error("script error: {0}")]
    Script(String),
}

impl DriverError {
    /// Returns `true` for outcomes that mean "the feature is not on the page
    /// right now" rather than a broken session.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            DriverError::Timeout { .. } | DriverError::NotFound { .. } | DriverError::Stale
        )
    }
}

impl From<CmdError> for DriverError {
    fn from(err: CmdError) -> Self {
        match &err {
            CmdError::Standard(wd) => match wd.error {
                ErrorStatus::NoSuchElement => DriverError::NotFound {
                    locator: wd.message.to_string(),
                },
                ErrorStatus::StaleElementReference => DriverError::Stale,
                ErrorStatus::ElementClickIntercepted => DriverError::ClickIntercepted,
                ErrorStatus::ElementNotInteractable => DriverError::NotInteractable,
                ErrorStatus::JavascriptError => DriverError::Script(wd.message.to_string()),
                _ => DriverError::Session(err.to_string()),
            },
            CmdError::WaitTimeout => DriverError::Timeout {
                locator: "<wait>".to_string(),
                waited_ms: 0,
            },
            _ => DriverError::Session(err.to_string()),
        }
    }
}

/// Failures that end a site run before any harvesting happens.
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("failed to start a WebDriver session at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: NewSessionError,
    },

    #[error("failed to open {url}: {source}")]
    Navigation {
        url: String,
        #[source]
        source: DriverError,
    },

    #[error(transparent)]
    Driver(#[from] DriverError),
}
