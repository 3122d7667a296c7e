//! Price cleanup from displayed text to plain digits.
//!
//! Shops render prices for people: `"$ 3.200"`, `"$4.500,00"`,
//! `"500 g a $3.200"`, `"(kg a $4.980)"`. Normalization strips the
//! currency sign and thousands separators and, for combined unit prices,
//! splits off the unit label. Missing values stay `None`; the export layer
//! decides how to render them.

use std::sync::LazyLock;

use fruver_core::{NormalizedRow, PriceFormat, ProductRecord, UnitPriceFormat};
use regex::Regex;

static CURRENCY_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$.]").expect("valid regex"));
static PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[()]").expect("valid regex"));

const UNIT_SEPARATOR: &str = " a ";
const CENTS_SUFFIX: &str = ",00";

/// Remove `$` and `.` and surrounding whitespace.
///
/// Idempotent: already stripped text comes back unchanged.
#[must_use]
pub fn strip_currency(text: &str) -> String {
    CURRENCY_MARKS.replace_all(text, "").trim().to_owned()
}

/// Normalize a main price according to the site's format.
#[must_use]
pub fn normalize_price(text: &str, format: &PriceFormat) -> String {
    let stripped = strip_currency(text);
    if format.strip_cents_suffix {
        if let Some(whole) = stripped.strip_suffix(CENTS_SUFFIX) {
            return whole.trim_end().to_owned();
        }
    }
    stripped
}

/// Split `"<unit> a <price>"` into `(unit, price)`.
///
/// The unit is the text before the first separator and the price is the
/// text after the last one. Without a separator both come from the whole
/// text.
#[must_use]
pub fn split_unit_price(text: &str, strip_parens: bool, decimal_comma: bool) -> (String, String) {
    let text = if strip_parens {
        PARENS.replace_all(text, "").into_owned()
    } else {
        text.to_owned()
    };

    let unit = text
        .split(UNIT_SEPARATOR)
        .next()
        .unwrap_or_default()
        .trim()
        .to_owned();
    let raw_price = text.rsplit(UNIT_SEPARATOR).next().unwrap_or_default();
    let mut price = strip_currency(raw_price);
    if decimal_comma {
        price = price.replace(',', ".");
    }
    (unit, price)
}

/// Normalize one record into an export row.
#[must_use]
pub fn normalize_record(record: &ProductRecord, format: &PriceFormat) -> NormalizedRow {
    let price = record
        .price
        .as_deref()
        .map(|text| normalize_price(text, format));

    let (unit_price, unit) = match (format.unit_price, record.unit_price.as_deref()) {
        (_, None) => (None, None),
        (UnitPriceFormat::Plain, Some(text)) => (Some(text.to_owned()), None),
        (
            UnitPriceFormat::Combined {
                strip_parens,
                decimal_comma,
            },
            Some(text),
        ) => {
            let (unit, price) = split_unit_price(text, strip_parens, decimal_comma);
            (non_empty(price), non_empty(unit))
        }
    };

    NormalizedRow {
        name: record.name.clone(),
        price,
        unit_price,
        unit,
    }
}

#[must_use]
pub fn normalize_records(records: &[ProductRecord], format: &PriceFormat) -> Vec<NormalizedRow> {
    records
        .iter()
        .map(|record| normalize_record(record, format))
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
