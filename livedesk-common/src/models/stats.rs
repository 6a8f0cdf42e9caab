use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Differences of one named group against the previous window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDiff {
    pub diffs: BTreeMap<String, f64>,
    /// Only present for keys whose previous value was non-zero.
    pub diff_percents: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub funnel: BTreeMap<String, u64>,
    pub averages: BTreeMap<String, f64>,
    pub lists: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funnel_diff: Option<SnapshotDiff>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub averages_diff: Option<SnapshotDiff>,
}

impl Snapshot {
    pub fn funnel_value(&self, key: &str) -> u64 {
        self.funnel.get(key).copied().unwrap_or(0)
    }

    pub fn average(&self, key: &str) -> f64 {
        self.averages.get(key).copied().unwrap_or(0.0)
    }

    pub fn list(&self, key: &str) -> &[String] {
        self.lists.get(key).map(Vec::as_slice).unwrap_or(&[])
    }
}
