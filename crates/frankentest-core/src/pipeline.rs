//! Filter → sort → shuffle, applied to a suite before it runs.
//!
//! The pipeline works on a selection of case indices; the registry itself is never
//! reordered, so registration order stays observable after any run.

use std::cmp::Ordering;

use crate::case::TestCase;
use crate::pallet::Pallet;

/// Sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Lexicographic case name.
    Name,
    /// Outcome ordinal of the previous run.
    Result,
    /// Elapsed nanoseconds of the previous run.
    Time,
}

impl SortKey {
    /// Exact, case-insensitive key name. `None` for anything else.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Some(Self::Name),
            "result" => Some(Self::Result),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// `desc` selects descending; everything else is ascending.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => Self::Desc,
            _ => Self::Asc,
        }
    }
}

/// Indices of cases that pass the filters, in registration order.
///
/// A case is kept when its name equals `filter.name`, the suite name equals
/// `filter.suite`, its tag string contains `filter.tag`, and its name equals
/// `run.only`. Unset filters match everything.
#[must_use]
pub fn filter_cases(suite_name: &str, cases: &[TestCase], pallet: &Pallet) -> Vec<usize> {
    let filter = &pallet.filter;
    if filter.suite.as_deref().is_some_and(|s| s != suite_name) {
        return Vec::new();
    }
    cases
        .iter()
        .enumerate()
        .filter(|(_, case)| filter.name.as_deref().is_none_or(|n| n == case.name()))
        .filter(|(_, case)| filter.tag.as_deref().is_none_or(|t| case.tags().contains(t)))
        .filter(|(_, case)| pallet.run.only.as_deref().is_none_or(|o| o == case.name()))
        .map(|(i, _)| i)
        .collect()
}

fn compare(cases: &[TestCase], key: SortKey, a: usize, b: usize) -> Ordering {
    let (a, b) = (&cases[a], &cases[b]);
    match key {
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::Result => a.outcome().ordinal().cmp(&b.outcome().ordinal()),
        SortKey::Time => a.elapsed_ns().cmp(&b.elapsed_ns()),
    }
}

/// Sort a selection by `key`. Order among equal keys is not part of the contract.
pub fn sort_selection(cases: &[TestCase], selection: &mut [usize], key: SortKey, order: SortOrder) {
    selection.sort_by(|&a, &b| {
        let ord = compare(cases, key, a, b);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

// ---------------------------------------------------------------------------
// Shuffle
// ---------------------------------------------------------------------------

/// xorshift64* generator. Deterministic for a given seed.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Seeds pass through splitmix64 first so small or zero seeds still produce a
    /// well-mixed, non-zero state.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self {
            state: if z == 0 { 0x2545_F491_4F6C_DD1D } else { z },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform-enough index in `0..bound`. `bound` must be non-zero.
    pub fn below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

/// Seed derived from wall-clock nanoseconds.
#[must_use]
pub fn wall_clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

/// Fisher–Yates over the selection.
pub fn shuffle_selection(selection: &mut [usize], rng: &mut XorShift64) {
    for i in (1..selection.len()).rev() {
        let j = rng.below(i + 1);
        selection.swap(i, j);
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Execution order chosen for one suite, plus what the engine should log about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelinePlan {
    pub order: Vec<usize>,
    /// Seed used when the selection was shuffled.
    pub seed: Option<u64>,
    /// Configuration mismatches that disabled a step.
    pub warnings: Vec<String>,
}

/// Run the whole pipeline for one suite.
///
/// `shuffle_seed` is the seed resolved at engine start; it is only consulted when the
/// pallet enables shuffling. Unknown sort or shuffle keys disable that step and add a
/// warning rather than failing the run.
#[must_use]
pub fn plan(suite_name: &str, cases: &[TestCase], pallet: &Pallet, shuffle_seed: u64) -> PipelinePlan {
    let mut out = PipelinePlan {
        order: filter_cases(suite_name, cases, pallet),
        ..PipelinePlan::default()
    };

    if let Some(raw) = pallet.sort.by.as_deref() {
        match SortKey::parse(raw) {
            Some(key) => {
                let order = pallet
                    .sort
                    .order
                    .as_deref()
                    .map(SortOrder::from_str_loose)
                    .unwrap_or_default();
                sort_selection(cases, &mut out.order, key, order);
            }
            None => out
                .warnings
                .push(format!("unknown sort key '{raw}', sorting disabled")),
        }
    }

    if pallet.shuffle.enabled {
        let mut rng = XorShift64::new(shuffle_seed);
        shuffle_selection(&mut out.order, &mut rng);
        out.seed = Some(shuffle_seed);

        if let Some(raw) = pallet.shuffle.by.as_deref() {
            match SortKey::parse(raw) {
                Some(key) => sort_selection(cases, &mut out.order, key, SortOrder::Asc),
                None => out
                    .warnings
                    .push(format!("unknown shuffle key '{raw}', post-shuffle sort disabled")),
            }
        }
    }

    out
}
