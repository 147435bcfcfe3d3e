//! Serial allocator.
//!
//! Every written row gets a serial derived from the order's base serial:
//! the first row keeps the base, later rows get `base-1`, `base-2`, ...
//!
//! An allocator only knows the serials it issued itself plus whatever the
//! caller passed to [`SerialAllocator::seed`]. Export and send build a fresh
//! allocator per call unless seeding from the database store is enabled, so
//! two separate sends with the same base serial write the same serials.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// How suffixes are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SerialStrategy {
    /// Row 0 is `base`, row k is `base-k`. Restarts from `base` on every call
    /// and skips anything already issued.
    #[default]
    UniformSuffix,
    /// A counter keyed by the base serial is bumped on each collision and
    /// carries over between calls on the same allocator.
    RepeatCollapse,
}

impl std::fmt::Display for SerialStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SerialStrategy::UniformSuffix => write!(f, "uniform-suffix"),
            SerialStrategy::RepeatCollapse => write!(f, "repeat-collapse"),
        }
    }
}

impl std::str::FromStr for SerialStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uniform-suffix" => Ok(SerialStrategy::UniformSuffix),
            "repeat-collapse" => Ok(SerialStrategy::RepeatCollapse),
            other => Err(format!("unknown serial strategy '{}'", other)),
        }
    }
}

/// Issues serials that are unique among everything this allocator has seen.
#[derive(Debug, Clone, Default)]
pub struct SerialAllocator {
    strategy: SerialStrategy,
    issued: HashSet<String>,
    counters: HashMap<String, u64>,
}

impl SerialAllocator {
    /// Create an allocator with no history.
    pub fn new(strategy: SerialStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }

    /// Strategy in use.
    pub fn strategy(&self) -> SerialStrategy {
        self.strategy
    }

    /// Register serials issued elsewhere so they are never handed out again.
    pub fn seed<I, S>(&mut self, serials: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for serial in serials {
            let serial = serial.into();
            if serial.is_empty() {
                continue;
            }
            if let Some((base, n)) = split_suffix(&serial) {
                let counter = self.counters.entry(base.to_string()).or_insert(0);
                *counter = (*counter).max(n);
            }
            self.issued.insert(serial);
        }
    }

    /// Check if `serial` was issued or seeded.
    pub fn is_issued(&self, serial: &str) -> bool {
        self.issued.contains(serial)
    }

    /// Allocate `row_count` distinct serials for `base`.
    pub fn allocate(&mut self, base: &str, row_count: usize) -> Vec<String> {
        let mut serials = Vec::with_capacity(row_count);
        let mut next_suffix = 0u64;

        for _ in 0..row_count {
            let serial = match self.strategy {
                SerialStrategy::UniformSuffix => self.next_uniform(base, &mut next_suffix),
                SerialStrategy::RepeatCollapse => self.next_collapsed(base),
            };
            self.issued.insert(serial.clone());
            serials.push(serial);
        }

        serials
    }

    fn next_uniform(&self, base: &str, next_suffix: &mut u64) -> String {
        loop {
            let candidate = with_suffix(base, *next_suffix);
            *next_suffix = next_suffix.checked_add(1).unwrap_or(1);
            if !self.issued.contains(&candidate) {
                return candidate;
            }
        }
    }

    fn next_collapsed(&mut self, base: &str) -> String {
        if !self.issued.contains(base) {
            return base.to_string();
        }
        // A counter at u64::MAX (seeded from a stored serial) restarts at 1
        // and probes past issued serials.
        let counter = self.counters.entry(base.to_string()).or_insert(0);
        loop {
            *counter = counter.checked_add(1).unwrap_or(1);
            let candidate = with_suffix(base, *counter);
            if !self.issued.contains(&candidate) {
                return candidate;
            }
        }
    }
}

fn with_suffix(base: &str, n: u64) -> String {
    if n == 0 {
        base.to_string()
    } else {
        format!("{}-{}", base, n)
    }
}

/// Split `base-N` into its parts. Plain serials yield `None`.
fn split_suffix(serial: &str) -> Option<(&str, u64)> {
    let (base, suffix) = serial.rsplit_once('-')?;
    if base.is_empty() || suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok().map(|n| (base, n))
}
