use fruver_core::{FieldLocators, Locator, ProductRecord};

use crate::browser::{Browser, Wait};
use crate::extract::{read_text, FieldExtractor};

/// Turns product cards, or page-wide field columns, into [`ProductRecord`]s.
#[derive(Debug, Clone)]
pub struct ProductParser {
    fields: FieldLocators,
    extractor: FieldExtractor,
}

impl ProductParser {
    #[must_use]
    pub fn new(fields: FieldLocators, extractor: FieldExtractor) -> Self {
        Self { fields, extractor }
    }

    /// Parse one product card.
    ///
    /// Each field is read independently; a missing field stays `None`.
    /// Returns `None` only when no field at all could be read, which means
    /// the card is not a product tile (a banner, a placeholder still
    /// loading) and is skipped.
    pub async fn parse_card<B: Browser>(
        &self,
        browser: &B,
        card: &B::Element,
    ) -> Option<ProductRecord> {
        let name = self
            .extractor
            .extract(browser, Some(card), &self.fields.name)
            .await;
        let price = self
            .extractor
            .extract(browser, Some(card), &self.fields.price)
            .await;
        let unit_price = match &self.fields.unit_price {
            Some(locator) => self.extractor.extract(browser, Some(card), locator).await,
            None => None,
        };

        let record = ProductRecord::new(name, price, unit_price);
        if record.is_empty() {
            tracing::warn!("skipping card with no readable fields");
            return None;
        }
        Some(record)
    }

    /// Parse every card in page order, skipping the unreadable ones.
    pub async fn parse_cards<B: Browser>(
        &self,
        browser: &B,
        cards: &[B::Element],
    ) -> Vec<ProductRecord> {
        let mut records = Vec::with_capacity(cards.len());
        for card in cards {
            if let Some(record) = self.parse_card(browser, card).await {
                records.push(record);
            }
        }
        records
    }

    /// Collect name, price and unit-price elements across the whole page
    /// and pair them by position.
    ///
    /// Used where the grid has no card container to scope into. The result
    /// is as long as the shortest located column; when no unit-price
    /// locator is configured that column does not limit the length.
    pub async fn parse_columns<B: Browser>(&self, browser: &B) -> Vec<ProductRecord> {
        let names = column(browser, &self.fields.name).await;
        let prices = column(browser, &self.fields.price).await;
        let unit_prices = match &self.fields.unit_price {
            Some(locator) => Some(column(browser, locator).await),
            None => None,
        };

        let mut len = names.len().min(prices.len());
        if let Some(units) = &unit_prices {
            len = len.min(units.len());
        }
        if names.len() != prices.len()
            || unit_prices.as_ref().is_some_and(|u| u.len() != names.len())
        {
            tracing::warn!(
                names = names.len(),
                prices = prices.len(),
                unit_prices = unit_prices.as_ref().map(Vec::len),
                kept = len,
                "field columns differ in length; pairing up to the shortest"
            );
        }

        let mut records = Vec::with_capacity(len);
        for (i, (name_el, price_el)) in names.iter().zip(&prices).take(len).enumerate() {
            let name = read_text(browser, name_el, &self.fields.name).await;
            let price = read_text(browser, price_el, &self.fields.price).await;
            let unit_el = unit_prices.as_ref().and_then(|units| units.get(i));
            let unit_price = match (unit_el, &self.fields.unit_price) {
                (Some(element), Some(locator)) => read_text(browser, element, locator).await,
                _ => None,
            };
            let record = ProductRecord::new(name, price, unit_price);
            if !record.is_empty() {
                records.push(record);
            }
        }
        records
    }
}

async fn column<B: Browser>(browser: &B, locator: &Locator) -> Vec<B::Element> {
    match browser.find_all(None, locator, Wait::NOW).await {
        Ok(elements) => elements,
        Err(err) => {
            tracing::warn!(%locator, error = %err, "failed to collect field column");
            Vec::new()
        }
    }
}
