//! The collect run: one isolated browser session per site.
//!
//! Sites are processed one at a time. A site that fails is logged and
//! skipped so the rest of the run still produces its files; the run only
//! fails when every requested site did.

use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Local};
use fruver_core::{AppConfig, SiteConfig, SitesFile};
use fruver_scraper::{harvest_site, normalize_records, Browser, RunSettings, WebDriverBrowser};
use tracing::Instrument;

use crate::export;

/// What one site produced.
#[derive(Debug)]
pub(crate) struct SiteSummary {
    pub rows: usize,
    pub iterations: u32,
    pub pages: u32,
    pub path: PathBuf,
}

/// Resolve which catalogue entries a run covers.
pub(crate) fn select_sites<'a>(
    sites: &'a SitesFile,
    filter: Option<&str>,
) -> anyhow::Result<Vec<&'a SiteConfig>> {
    match filter {
        Some(slug) => Ok(vec![sites.get(slug)?]),
        None => Ok(sites.sites.iter().collect()),
    }
}

pub(crate) fn print_sites(sites: &SitesFile) {
    for site in &sites.sites {
        println!(
            "{:<10} {:<10} {}",
            site.slug,
            site.pagination.kind(),
            site.url
        );
    }
}

/// Harvest and export every selected site.
///
/// # Errors
///
/// Returns an error if the site filter names an unknown site, the output
/// directory cannot be created, or every selected site failed.
pub(crate) async fn run_collect(
    config: &AppConfig,
    sites: &SitesFile,
    filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let selected = select_sites(sites, filter)?;
    let started = Local::now();

    if dry_run {
        println!(
            "dry-run: would collect {} sites via {} (headless: {}):",
            selected.len(),
            config.webdriver_url,
            config.headless
        );
        for site in &selected {
            let path = export::export_path(&config.output_dir, &site.slug, started);
            println!(
                "  {} [{}] {} -> {}",
                site.slug,
                site.pagination.kind(),
                site.url,
                path.display()
            );
        }
        return Ok(());
    }

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mut failed_sites = 0usize;
    for site in &selected {
        let span = tracing::info_span!("site", site = %site.slug);
        match collect_site(config, site, started).instrument(span).await {
            Ok(summary) => {
                tracing::info!(
                    site = %site.slug,
                    rows = summary.rows,
                    iterations = summary.iterations,
                    pages = summary.pages,
                    path = %summary.path.display(),
                    "site collected"
                );
                println!(
                    "{}: {} products from {} pages ({} iterations) -> {}",
                    site.slug,
                    summary.rows,
                    summary.pages,
                    summary.iterations,
                    summary.path.display()
                );
            }
            Err(e) => {
                tracing::error!(site = %site.slug, error = %format!("{e:#}"), "site collection failed");
                failed_sites += 1;
            }
        }
    }

    if failed_sites > 0 {
        tracing::warn!(
            failed_sites,
            total_sites = selected.len(),
            "some sites failed during collection"
        );
    }
    if failed_sites == selected.len() {
        anyhow::bail!("all {failed_sites} sites failed collection");
    }
    Ok(())
}

/// Acquire a session, harvest, release the session, then export.
///
/// The session is closed whether or not the harvest succeeded.
async fn collect_site(
    config: &AppConfig,
    site: &SiteConfig,
    started: DateTime<Local>,
) -> anyhow::Result<SiteSummary> {
    let browser =
        WebDriverBrowser::connect(&config.webdriver_url, config.headless, &config.user_agent)
            .await?;

    let harvested = harvest_site(&browser, site, RunSettings::from_config(config)).await;

    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "failed to close browser session");
    }
    let outcome = harvested?;

    let rows = normalize_records(&outcome.records, &site.price_format);
    let path = export::export_path(&config.output_dir, &site.slug, started);
    export::write_csv(&path, site, &rows)?;

    Ok(SiteSummary {
        rows: rows.len(),
        iterations: outcome.iterations,
        pages: outcome.page,
        path,
    })
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
