/// Placeholder written to the export for any field that could not be read.
pub const MISSING_VALUE: &str = "No disponible";

/// One product card as read from a catalog page.
///
/// Fields hold the visible text exactly as the shop renders it (e.g.
/// `"$3.200"`); `None` means the field was not present on the card.
/// Equality is structural and drives de-duplication for strategies that
/// re-scan a cumulative grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductRecord {
    pub name: Option<String>,
    pub price: Option<String>,
    /// Unit price text, either a bare price or a combined
    /// `"<unit> a <price>"` string depending on the shop.
    pub unit_price: Option<String>,
}

impl ProductRecord {
    #[must_use]
    pub fn new(name: Option<String>, price: Option<String>, unit_price: Option<String>) -> Self {
        Self {
            name,
            price,
            unit_price,
        }
    }

    /// Returns `true` when no field could be read at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.unit_price.is_none()
    }
}

/// A product after price normalization, ready for export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedRow {
    pub name: Option<String>,
    /// Price with currency symbol and thousands separators removed, e.g. `"3200"`.
    pub price: Option<String>,
    pub unit_price: Option<String>,
    /// Unit label split off a combined unit-price text, e.g. `"500 g"`.
    /// Always `None` for shops that do not publish a combined format.
    pub unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_with_no_fields_is_empty() {
        assert!(ProductRecord::default().is_empty());
    }

    #[test]
    fn record_with_only_price_is_not_empty() {
        let record = ProductRecord::new(None, Some("$1.900".to_owned()), None);
        assert!(!record.is_empty());
    }

    #[test]
    fn records_compare_structurally() {
        let a = ProductRecord::new(Some("Banano".into()), Some("$2.500".into()), None);
        let b = ProductRecord::new(Some("Banano".into()), Some("$2.500".into()), None);
        let c = ProductRecord::new(Some("Banano".into()), Some("$2.600".into()), None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
