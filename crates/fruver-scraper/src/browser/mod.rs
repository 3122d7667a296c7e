//! The boundary between the harvest core and a live browser.
//!
//! The core needs three things from a browser: navigate, locate elements
//! inside a scope with a bounded wait, and run an action against the live
//! page. [`Browser`] captures exactly that so the strategies and the
//! harvest loop can run against [`WebDriverBrowser`] in production and a
//! scripted double in tests.

mod webdriver;

use std::time::Duration;

use fruver_core::Locator;

use crate::error::DriverError;

pub use webdriver::WebDriverBrowser;

/// What must hold for a located element to count as found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Attached to the DOM.
    Present,
    /// Attached, displayed and enabled.
    Clickable,
}

/// A bounded wait for a locator to match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub condition: Condition,
    pub timeout: Duration,
}

impl Wait {
    /// Look once, without waiting.
    pub const NOW: Self = Self::present(Duration::ZERO);

    #[must_use]
    pub const fn present(timeout: Duration) -> Self {
        Self {
            condition: Condition::Present,
            timeout,
        }
    }

    #[must_use]
    pub const fn clickable(timeout: Duration) -> Self {
        Self {
            condition: Condition::Clickable,
            timeout,
        }
    }

    #[must_use]
    pub const fn present_secs(secs: u64) -> Self {
        Self::present(Duration::from_secs(secs))
    }

    #[must_use]
    pub const fn clickable_secs(secs: u64) -> Self {
        Self::clickable(Duration::from_secs(secs))
    }
}

/// An action run against the live page.
#[derive(Debug, Clone, Copy)]
pub enum Action<'a, E> {
    /// A real pointer click; overlays can intercept it.
    Click(&'a E),
    /// `arguments[0].click()` through the page's script engine.
    ScriptClick(&'a E),
    ScrollIntoView(&'a E),
    /// Scroll the window to an absolute vertical offset in pixels.
    ScrollTo(f64),
    ScrollToBottom,
    /// Pick the `<option>` with this value in a `<select>`.
    SelectValue(&'a E, &'a str),
}

/// A browser session the harvest core can drive.
///
/// `scope` is `None` for the whole page or `Some(card)` to search inside
/// one element's subtree.
#[allow(async_fn_in_trait)]
pub trait Browser {
    type Element: Clone;

    /// Navigate the session to `url`.
    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    /// Locate the first element matching `locator`, waiting up to
    /// `wait.timeout` for `wait.condition` to hold.
    ///
    /// # Errors
    ///
    /// [`DriverError::Timeout`] when nothing matched in time.
    async fn find(
        &self,
        scope: Option<&Self::Element>,
        locator: &Locator,
        wait: Wait,
    ) -> Result<Self::Element, DriverError> {
        self.find_all(scope, locator, wait)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::Timeout {
                locator: locator.to_string(),
                waited_ms: millis(wait.timeout),
            })
    }

    /// Locate every element matching `locator`, waiting up to
    /// `wait.timeout` for at least one. An empty list means nothing
    /// appeared in time.
    async fn find_all(
        &self,
        scope: Option<&Self::Element>,
        locator: &Locator,
        wait: Wait,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// Visible text of an element, as rendered.
    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// An attribute of an element, `None` when it is not set.
    async fn attr(&self, element: &Self::Element, name: &str)
        -> Result<Option<String>, DriverError>;

    /// The `value` attribute of every `<option>` under a `<select>`.
    async fn option_values(&self, select: &Self::Element) -> Result<Vec<String>, DriverError>;

    /// Current `document.body.scrollHeight` in pixels.
    async fn page_height(&self) -> Result<f64, DriverError>;

    async fn act(&self, action: Action<'_, Self::Element>) -> Result<(), DriverError>;

    /// End the session. Consumes the browser so it cannot be used after
    /// release.
    async fn close(self) -> Result<(), DriverError>
    where
        Self: Sized;
}

pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
