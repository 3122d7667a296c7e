//! CSV export of normalized rows, one file per site and run.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use fruver_core::{NormalizedRow, SiteConfig, UnitPriceFormat, MISSING_VALUE};

const TIMESTAMP_FORMAT: &str = "%d%m%Y%H%M";

/// `<slug>_<ddmmyyyyHHMM>.csv` inside `dir`, stamped with the run start.
pub(crate) fn export_path(dir: &Path, slug: &str, started: DateTime<Local>) -> PathBuf {
    dir.join(format!("{slug}_{}.csv", started.format(TIMESTAMP_FORMAT)))
}

/// Column headers for a site. The `unidad` column only exists for sites
/// whose unit price is split into unit and price.
pub(crate) fn header(site: &SiteConfig) -> Vec<&'static str> {
    let mut columns = vec![site.name_column.as_str(), "precio", "precio_x_unidad"];
    if has_unit_column(site) {
        columns.push("unidad");
    }
    columns
}

fn has_unit_column(site: &SiteConfig) -> bool {
    matches!(
        site.price_format.unit_price,
        UnitPriceFormat::Combined { .. }
    )
}

/// Write the header and one record per row; missing values are written as
/// [`MISSING_VALUE`].
pub(crate) fn write_rows<W: io::Write>(
    writer: W,
    site: &SiteConfig,
    rows: &[NormalizedRow],
) -> csv::Result<()> {
    let with_unit = has_unit_column(site);
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(header(site))?;

    for row in rows {
        let mut record = vec![
            cell(row.name.as_deref()),
            cell(row.price.as_deref()),
            cell(row.unit_price.as_deref()),
        ];
        if with_unit {
            record.push(cell(row.unit.as_deref()));
        }
        csv_writer.write_record(&record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Create `path` and write the site's rows into it.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub(crate) fn write_csv(path: &Path, site: &SiteConfig, rows: &[NormalizedRow]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    write_rows(file, site, rows)
        .with_context(|| format!("failed to write export file {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "export written");
    Ok(())
}

fn cell(value: Option<&str>) -> &str {
    value.unwrap_or(MISSING_VALUE)
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
