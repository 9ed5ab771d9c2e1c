use std::collections::HashMap;
use std::ops::AddAssign;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::{DurationMs, SpecId};

/// Test counters for one spec (or, summed, for a whole run).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecStats {
    pub tests: u32,
    pub passes: u32,
    pub failures: u32,
    pub pending: u32,
    pub skipped: u32,
    pub duration_ms: DurationMs,
}

impl AddAssign for SpecStats {
    fn add_assign(&mut self, rhs: Self) {
        self.tests = self.tests.saturating_add(rhs.tests);
        self.passes = self.passes.saturating_add(rhs.passes);
        self.failures = self.failures.saturating_add(rhs.failures);
        self.pending = self.pending.saturating_add(rhs.pending);
        self.skipped = self.skipped.saturating_add(rhs.skipped);
        self.duration_ms = self.duration_ms.saturating_add(rhs.duration_ms);
    }
}

/// Pass/fail/duration summary of a single spec.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecSummary {
    pub stats: SpecStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpecSummary {
    /// `true` when no test failed and the spec itself did not error out.
    pub fn passed(&self) -> bool {
        self.stats.failures == 0 && self.error.is_none()
    }
}

/// Per-spec summaries accumulated over a whole run.
///
/// Iteration follows insertion order, which is batch completion order.
/// Inserting an existing spec replaces its summary in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    order: Vec<SpecId>,
    by_spec: HashMap<SpecId, SpecSummary>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `summary` for `spec`, returning the summary it replaced, if any.
    pub fn insert(&mut self, spec: SpecId, summary: SpecSummary) -> Option<SpecSummary> {
        let prev = self.by_spec.insert(spec.clone(), summary);
        if prev.is_none() {
            self.order.push(spec);
        }
        prev
    }

    pub fn get(&self, spec: &str) -> Option<&SpecSummary> {
        self.by_spec.get(spec)
    }

    pub fn contains(&self, spec: &str) -> bool {
        self.by_spec.contains_key(spec)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Specs in insertion order.
    pub fn specs(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpecSummary)> {
        self.order
            .iter()
            .filter_map(|spec| self.by_spec.get(spec).map(|s| (spec.as_str(), s)))
    }

    /// Counters summed over every spec.
    pub fn totals(&self) -> SpecStats {
        let mut total = SpecStats::default();
        for summary in self.by_spec.values() {
            total += summary.stats;
        }
        total
    }

    pub fn has_failures(&self) -> bool {
        self.by_spec.values().any(|s| !s.passed())
    }
}

impl Serialize for RunSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (spec, summary) in self.iter() {
            map.serialize_entry(spec, summary)?;
        }
        map.end()
    }
}
