//! The harvest loop shared by every pagination strategy.

use std::collections::HashSet;
use std::fmt;

use fruver_core::{DedupPolicy, ProductRecord};

use crate::browser::Browser;
use crate::error::DriverError;
use crate::parser::ProductParser;
use crate::strategy::{Advance, Batch, PaginationStrategy};

pub const DEFAULT_MAX_CONSECUTIVE_FAULTS: u32 = 3;

/// Why a harvest stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The pagination control is gone.
    ControlMissing,
    /// A pass over the grid produced no record not already collected.
    NoNewRecords,
    /// The product grid did not appear.
    GridEmpty,
    /// Every selected page has been visited.
    PageLimit,
    /// The pagination control was found but would not take a click.
    ClickFailed,
    /// A click went through but the location never changed.
    NavigationStalled,
    /// Too many iterations in a row failed with a browser fault.
    TooManyFaults,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ControlMissing => "pagination control missing",
            Self::NoNewRecords => "no new records",
            Self::GridEmpty => "product grid empty",
            Self::PageLimit => "page limit reached",
            Self::ClickFailed => "pagination click failed",
            Self::NavigationStalled => "location did not change",
            Self::TooManyFaults => "too many consecutive faults",
        };
        f.write_str(text)
    }
}

/// Mutable state of one harvest, owned by the loop.
#[derive(Debug, Clone)]
pub struct HarvestState {
    /// Records collected so far, in discovery order.
    pub records: Vec<ProductRecord>,
    seen: HashSet<ProductRecord>,
    /// Starts at 1 and is incremented on every successful advance.
    pub page: u32,
    /// Iterations started, including ones that faulted.
    pub iteration: u32,
    /// Where the last successful advance landed; `None` before the first
    /// one, so the first location wait is satisfied by any location.
    pub previous_marker: Option<String>,
}

impl Default for HarvestState {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvestState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            seen: HashSet::new(),
            page: 1,
            iteration: 0,
            previous_marker: None,
        }
    }

    /// Append `batch` under `policy`, returning how many records were added.
    pub fn merge(&mut self, batch: Vec<ProductRecord>, policy: DedupPolicy) -> usize {
        let before = self.records.len();
        match policy {
            DedupPolicy::Off => self.records.extend(batch),
            DedupPolicy::Global => {
                for record in batch {
                    if self.seen.insert(record.clone()) {
                        self.records.push(record);
                    }
                }
            }
        }
        self.records.len() - before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Browser faults tolerated in a row before the harvest gives up.
    pub max_consecutive_faults: u32,
}

impl Default for HarvestOptions {
    fn default() -> Self {
        Self {
            max_consecutive_faults: DEFAULT_MAX_CONSECUTIVE_FAULTS,
        }
    }
}

/// Result of a harvest. Records gathered before a fault are always kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestOutcome {
    pub records: Vec<ProductRecord>,
    pub iterations: u32,
    /// The page counter when the harvest stopped.
    pub page: u32,
    pub stop: StopReason,
}

impl HarvestOutcome {
    /// Successful advances, i.e. pages moved past.
    #[must_use]
    pub fn pages_advanced(&self) -> u32 {
        self.page.saturating_sub(1)
    }
}

/// Drive `strategy` until it reports the catalogue exhausted.
///
/// Each iteration reads a batch, merges it under the strategy's dedup
/// policy, then advances. A browser fault aborts only the current
/// iteration; after a fault in the advance step the next iteration retries
/// the advance without reading the same batch twice.
pub async fn harvest<B, S>(
    browser: &B,
    strategy: &mut S,
    parser: &ProductParser,
    options: HarvestOptions,
) -> HarvestOutcome
where
    B: Browser,
    S: PaginationStrategy<B>,
{
    let mut state = HarvestState::new();
    let policy = strategy.dedup_policy();
    let max_faults = options.max_consecutive_faults.max(1);

    tracing::info!(strategy = strategy.name(), "harvest started");
    if let Err(err) = strategy.prepare(browser).await {
        tracing::warn!(error = %err, "strategy setup failed; continuing");
    }

    let mut faults = 0u32;
    let mut awaiting_advance = false;
    let stop = loop {
        state.iteration += 1;
        match iterate(browser, strategy, parser, &mut state, policy, &mut awaiting_advance).await {
            Ok(Some(reason)) => break reason,
            Ok(None) => faults = 0,
            Err(err) => {
                faults += 1;
                tracing::warn!(
                    iteration = state.iteration,
                    faults,
                    error = %err,
                    "harvest iteration failed"
                );
                if faults >= max_faults {
                    break StopReason::TooManyFaults;
                }
            }
        }
    };

    tracing::info!(
        iterations = state.iteration,
        page = state.page,
        total = state.records.len(),
        reason = %stop,
        "harvest finished"
    );

    HarvestOutcome {
        records: state.records,
        iterations: state.iteration,
        page: state.page,
        stop,
    }
}

async fn iterate<B, S>(
    browser: &B,
    strategy: &mut S,
    parser: &ProductParser,
    state: &mut HarvestState,
    policy: DedupPolicy,
    awaiting_advance: &mut bool,
) -> Result<Option<StopReason>, DriverError>
where
    B: Browser,
    S: PaginationStrategy<B>,
{
    if !*awaiting_advance {
        let batch = match strategy.extract_batch(browser, parser).await? {
            Batch::Cards(batch) => batch,
            Batch::Exhausted(reason) => return Ok(Some(reason)),
        };
        let found = batch.len();
        let added = state.merge(batch, policy);
        tracing::info!(
            iteration = state.iteration,
            page = state.page,
            found,
            new_records = added,
            total = state.records.len(),
            "batch collected"
        );
        if strategy.is_done(state, added) {
            return Ok(Some(StopReason::NoNewRecords));
        }
        *awaiting_advance = true;
    }

    match strategy.advance(browser, state).await? {
        Advance::Moved { marker } => {
            *awaiting_advance = false;
            state.page += 1;
            if marker.is_some() {
                state.previous_marker = marker;
            }
            Ok(None)
        }
        Advance::Done(reason) => Ok(Some(reason)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> ProductRecord {
        ProductRecord::new(Some(name.to_string()), Some("1000".to_string()), None)
    }

    #[test]
    fn state_starts_on_page_one() {
        let state = HarvestState::new();
        assert_eq!(state.page, 1);
        assert_eq!(state.iteration, 0);
        assert!(state.records.is_empty());
    }

    #[test]
    fn global_merge_skips_records_already_seen() {
        let mut state = HarvestState::new();
        assert_eq!(state.merge(vec![record("a"), record("b")], DedupPolicy::Global), 2);
        assert_eq!(
            state.merge(vec![record("a"), record("b"), record("c")], DedupPolicy::Global),
            1
        );
        let names: Vec<_> = state.records.iter().filter_map(|r| r.name.as_deref()).collect();
        assert_eq!(names, ["a", "b", "c"]);
    }

    #[test]
    fn global_merge_drops_duplicates_within_one_batch() {
        let mut state = HarvestState::new();
        assert_eq!(state.merge(vec![record("a"), record("a")], DedupPolicy::Global), 1);
    }

    #[test]
    fn off_merge_keeps_every_record() {
        let mut state = HarvestState::new();
        state.merge(vec![record("a")], DedupPolicy::Off);
        assert_eq!(state.merge(vec![record("a")], DedupPolicy::Off), 1);
        assert_eq!(state.records.len(), 2);
    }

    #[test]
    fn pages_advanced_is_one_less_than_the_counter() {
        let outcome = HarvestOutcome {
            records: Vec::new(),
            iterations: 4,
            page: 4,
            stop: StopReason::ControlMissing,
        };
        assert_eq!(outcome.pages_advanced(), 3);
    }
}
