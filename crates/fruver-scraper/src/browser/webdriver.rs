//! [`Browser`] over a W3C WebDriver session (chromedriver by default).

use std::time::Duration;

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use fruver_core::Locator;
use serde_json::{json, Value};
use tokio::time::Instant;

use super::{millis, Action, Browser, Condition, Wait};
use crate::error::{DriverError, ScraperError};

/// How often an element-scoped wait re-checks the DOM.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

const WINDOW_SIZE_ARG: &str = "--window-size=1920,1080";

/// A live WebDriver session.
///
/// Exclusively owned by one site run; [`Browser::close`] consumes
/// it so the session cannot be used after it has been released.
pub struct WebDriverBrowser {
    client: Client,
}

impl WebDriverBrowser {
    /// Start a Chrome session through the WebDriver server at `webdriver_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Connect`] if no session can be created.
    pub async fn connect(
        webdriver_url: &str,
        headless: bool,
        user_agent: &str,
    ) -> Result<Self, ScraperError> {
        let mut args = vec![
            format!("--user-agent={user_agent}"),
            WINDOW_SIZE_ARG.to_string(),
        ];
        if headless {
            args.push("--headless=new".to_string());
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(webdriver_url)
            .await
            .map_err(|source| ScraperError::Connect {
                url: webdriver_url.to_string(),
                source,
            })?;

        tracing::debug!(webdriver_url, headless, "webdriver session started");
        Ok(Self { client })
    }

    async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        self.client
            .execute(script, args)
            .await
            .map_err(DriverError::from)
    }

    fn element_arg(element: &Element) -> Result<Value, DriverError> {
        serde_json::to_value(element).map_err(|e| DriverError::Script(e.to_string()))
    }

    /// One look at the DOM. Misses and stale handles yield an empty list so
    /// the caller keeps polling.
    async fn probe(
        &self,
        scope: Option<&Element>,
        locator: &Locator,
        condition: Condition,
    ) -> Result<Vec<Element>, DriverError> {
        let found = match scope {
            Some(element) => element.find_all(to_fantoccini(locator)).await,
            None => self.client.find_all(to_fantoccini(locator)).await,
        };

        let elements = match found.map_err(DriverError::from) {
            Ok(elements) => elements,
            Err(err) if err.is_absent() => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };

        if condition == Condition::Present {
            return Ok(elements);
        }

        let mut clickable = Vec::with_capacity(elements.len());
        for element in elements {
            match is_clickable(&element).await {
                Ok(true) => clickable.push(element),
                Ok(false) => {}
                Err(err) if err.is_absent() => {}
                Err(err) => return Err(err),
            }
        }
        Ok(clickable)
    }
}

async fn is_clickable(element: &Element) -> Result<bool, DriverError> {
    Ok(element.is_displayed().await? && element.is_enabled().await?)
}

fn to_fantoccini(locator: &Locator) -> fantoccini::Locator<'_> {
    match locator {
        Locator::Xpath(expr) => fantoccini::Locator::XPath(expr),
        Locator::Css(expr) => fantoccini::Locator::Css(expr),
        Locator::Id(expr) => fantoccini::Locator::Id(expr),
    }
}

impl Browser for WebDriverBrowser {
    type Element = Element;

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        self.client.goto(url).await.map_err(DriverError::from)
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let url = self.client.current_url().await?;
        Ok(url.to_string())
    }

    async fn find_all(
        &self,
        scope: Option<&Element>,
        locator: &Locator,
        wait: Wait,
    ) -> Result<Vec<Element>, DriverError> {
        let deadline = Instant::now() + wait.timeout;
        loop {
            let elements = self.probe(scope, locator, wait.condition).await?;
            if !elements.is_empty() {
                return Ok(elements);
            }
            let now = Instant::now();
            if now >= deadline {
                tracing::trace!(
                    %locator,
                    waited_ms = millis(wait.timeout),
                    "no match before deadline"
                );
                return Ok(Vec::new());
            }
            tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }

    async fn text(&self, element: &Element) -> Result<String, DriverError> {
        element.text().await.map_err(DriverError::from)
    }

    async fn attr(&self, element: &Element, name: &str) -> Result<Option<String>, DriverError> {
        element.attr(name).await.map_err(DriverError::from)
    }

    async fn option_values(&self, select: &Element) -> Result<Vec<String>, DriverError> {
        let options = select.find_all(fantoccini::Locator::Css("option")).await?;
        let mut values = Vec::with_capacity(options.len());
        for option in &options {
            if let Some(value) = self.attr(option, "value").await? {
                values.push(value);
            }
        }
        Ok(values)
    }

    async fn page_height(&self) -> Result<f64, DriverError> {
        let height = self
            .execute("return document.body.scrollHeight;", Vec::new())
            .await?;
        height
            .as_f64()
            .ok_or_else(|| DriverError::Script(format!("scrollHeight was not a number: {height}")))
    }

    async fn act(&self, action: Action<'_, Element>) -> Result<(), DriverError> {
        match action {
            Action::Click(element) => element.click().await.map_err(DriverError::from),
            Action::ScriptClick(element) => {
                let arg = Self::element_arg(element)?;
                self.execute("arguments[0].click();", vec![arg]).await?;
                Ok(())
            }
            Action::ScrollIntoView(element) => {
                let arg = Self::element_arg(element)?;
                self.execute(
                    "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});",
                    vec![arg],
                )
                .await?;
                Ok(())
            }
            Action::ScrollTo(y) => {
                self.execute("window.scrollTo(0, arguments[0]);", vec![json!(y)])
                    .await?;
                Ok(())
            }
            Action::ScrollToBottom => {
                self.execute(
                    "window.scrollTo(0, document.body.scrollHeight);",
                    Vec::new(),
                )
                .await?;
                Ok(())
            }
            Action::SelectValue(select, value) => select
                .select_by_value(value)
                .await
                .map_err(DriverError::from),
        }
    }

    async fn close(self) -> Result<(), DriverError> {
        self.client.close().await.map_err(DriverError::from)
    }
}
