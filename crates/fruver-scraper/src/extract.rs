//! Reading one text field out of the page or a product card.

use std::time::Duration;

use fruver_core::Locator;

use crate::browser::{Browser, Wait};

/// Reads the trimmed text of the first element matching a locator.
///
/// Never fails: a missing, stale or unreadable element yields `None` and
/// one log line. An element whose text is blank also yields `None`, so a
/// returned value is never empty.
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor {
    timeout: Duration,
}

impl FieldExtractor {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn extract<B: Browser>(
        &self,
        browser: &B,
        scope: Option<&B::Element>,
        locator: &Locator,
    ) -> Option<String> {
        let element = match browser.find(scope, locator, Wait::present(self.timeout)).await {
            Ok(element) => element,
            Err(err) if err.is_absent() => {
                tracing::debug!(%locator, "element not found or stale");
                return None;
            }
            Err(err) => {
                tracing::warn!(%locator, error = %err, "failed to locate field");
                return None;
            }
        };

        read_text(browser, &element, locator).await
    }
}

/// Text of an already located element, `None` when unreadable or blank.
pub(crate) async fn read_text<B: Browser>(
    browser: &B,
    element: &B::Element,
    locator: &Locator,
) -> Option<String> {
    match browser.text(element).await {
        Ok(text) => {
            let text = text.trim();
            if text.is_empty() {
                tracing::debug!(%locator, "element has no visible text");
                None
            } else {
                Some(text.to_owned())
            }
        }
        Err(err) if err.is_absent() => {
            tracing::debug!(%locator, "element went stale before its text was read");
            None
        }
        Err(err) => {
            tracing::warn!(%locator, error = %err, "failed to read field text");
            None
        }
    }
}
