// src/stats/mod.rs
//
// Engagement statistics as a chain of pure stages over visitor records:
// stage filter -> session qualification -> event filter -> aggregate -> finalize.

pub mod dates;

use std::collections::{BTreeMap, HashSet};

use livedesk_common::models::visitor::{ENABLE_LIVECHAT_LABEL, WIDGET_VISIBLE_LABEL};
use livedesk_common::models::{
    LifecycleStage, SessionWindow, Snapshot, SnapshotDiff, VisitorEvent, VisitorRecord,
    VisitorSession,
};
use serde_json::Value;

use crate::config::StatsConfig;

pub const TOTAL_USERS: &str = "total_users";
pub const NEW_USERS: &str = "new_users";
pub const RETURNING_USERS: &str = "returning_users";
pub const QUALIFIED_LEAD: &str = "qualified_lead";
pub const UNQUALIFIED: &str = "unqualified";
pub const UNTAGGED: &str = "untagged";
pub const SESSIONS_PER_USER: &str = "sessions_per_user";
pub const SESSION_DURATION: &str = "session_duration";

/// A record that survived session qualification, with its surviving
/// sessions and events.
#[derive(Debug)]
pub struct QualifiedVisitor<'a> {
    pub record: &'a VisitorRecord,
    pub sessions: Vec<&'a VisitorSession>,
    pub events: Vec<&'a VisitorEvent>,
}

/// Funnel keys in display order.
pub fn funnel_keys(config: &StatsConfig) -> Vec<String> {
    let mut keys = vec![
        TOTAL_USERS.to_string(),
        NEW_USERS.to_string(),
        RETURNING_USERS.to_string(),
    ];
    keys.extend(config.funnel_steps.iter().map(|s| s.key.clone()));
    keys.extend([QUALIFIED_LEAD, UNQUALIFIED, UNTAGGED].map(String::from));
    keys
}

pub fn average_keys() -> Vec<String> {
    vec![SESSIONS_PER_USER.to_string(), SESSION_DURATION.to_string()]
}

pub fn list_keys(config: &StatsConfig) -> Vec<String> {
    config.categorical_fields.iter().map(|f| f.key.clone()).collect()
}

/// Stage 1.
pub fn filter_by_stage(
    records: &[VisitorRecord],
    stage: Option<LifecycleStage>,
) -> Vec<&VisitorRecord> {
    records
        .iter()
        .filter(|r| stage.is_none_or(|s| r.lifecycle_stage() == s))
        .collect()
}

/// Stage 2. Keeps finished sessions starting inside the window; a record
/// with none left is dropped.
pub fn qualify_sessions<'a>(
    record: &'a VisitorRecord,
    window: &SessionWindow,
) -> Option<QualifiedVisitor<'a>> {
    let sessions: Vec<&VisitorSession> = record
        .sessions
        .iter()
        .filter(|s| s.duration_ts.is_some_and(|d| d > 0.0) && window.contains(s.start_ts))
        .collect();

    if sessions.is_empty() {
        return None;
    }

    Some(QualifiedVisitor {
        record,
        sessions,
        events: Vec::new(),
    })
}

fn event_counts(event: &VisitorEvent) -> bool {
    if event.label == WIDGET_VISIBLE_LABEL {
        return event
            .metadata
            .as_ref()
            .and_then(|m| m.get("visible"))
            .is_some_and(|v| *v == Value::Bool(true));
    }
    if event.label == ENABLE_LIVECHAT_LABEL {
        return event.value == Value::Bool(true);
    }
    true
}

/// Stage 3. Keeps events of qualifying sessions, dropping widget-close and
/// live-chat-disable events.
pub fn filter_events(mut visitor: QualifiedVisitor<'_>) -> QualifiedVisitor<'_> {
    let indexes: HashSet<usize> = visitor.sessions.iter().map(|s| s.index).collect();
    visitor.events = visitor
        .record
        .events
        .iter()
        .filter(|e| indexes.contains(&e.session_index) && event_counts(e))
        .collect();
    visitor
}

/// Stages 4 and 5. An empty input yields zeroed counters and empty lists.
pub fn aggregate(visitors: &[QualifiedVisitor<'_>], config: &StatsConfig) -> Snapshot {
    let mut funnel: BTreeMap<String, u64> =
        funnel_keys(config).into_iter().map(|k| (k, 0)).collect();
    let mut lists: BTreeMap<String, Vec<String>> =
        list_keys(config).into_iter().map(|k| (k, Vec::new())).collect();

    let mut total_duration = 0.0;
    let mut total_sessions = 0usize;

    for visitor in visitors {
        *funnel.entry(TOTAL_USERS.into()).or_default() += 1;

        if visitor.sessions.iter().any(|s| s.index == 0) {
            *funnel.entry(NEW_USERS.into()).or_default() += 1;
        } else {
            *funnel.entry(RETURNING_USERS.into()).or_default() += 1;
        }

        for step in &config.funnel_steps {
            if visitor.events.iter().any(|e| e.label == step.label) {
                *funnel.entry(step.key.clone()).or_default() += 1;
            }
        }

        let tag_key = match visitor.record.lifecycle_stage() {
            LifecycleStage::Lead => QUALIFIED_LEAD,
            LifecycleStage::Unqualified => UNQUALIFIED,
            LifecycleStage::Subscriber => UNTAGGED,
        };
        *funnel.entry(tag_key.into()).or_default() += 1;

        total_duration += visitor
            .sessions
            .iter()
            .filter_map(|s| s.duration_ts)
            .sum::<f64>();
        total_sessions += visitor.sessions.len();

        for field in &config.categorical_fields {
            let path: Vec<&str> = field.path.iter().map(String::as_str).collect();
            if let Some(value) = visitor.record.metadata_str(&path) {
                lists.entry(field.key.clone()).or_default().push(value.to_string());
            }
        }
    }

    let mut averages = BTreeMap::new();
    let (sessions_per_user, session_duration) = if visitors.is_empty() || total_sessions == 0 {
        (0.0, 0.0)
    } else {
        (
            total_sessions as f64 / visitors.len() as f64,
            total_duration / total_sessions as f64,
        )
    };
    averages.insert(SESSIONS_PER_USER.to_string(), sessions_per_user);
    averages.insert(SESSION_DURATION.to_string(), session_duration);

    Snapshot {
        funnel,
        averages,
        lists,
        funnel_diff: None,
        averages_diff: None,
    }
}

/// Runs every stage over an unfiltered record set.
pub fn compute(
    records: &[VisitorRecord],
    stage: Option<LifecycleStage>,
    window: &SessionWindow,
    config: &StatsConfig,
) -> Snapshot {
    let qualified: Vec<QualifiedVisitor<'_>> = filter_by_stage(records, stage)
        .into_iter()
        .filter_map(|r| qualify_sessions(r, window))
        .map(filter_events)
        .collect();

    aggregate(&qualified, config)
}

fn diff_group<'a>(
    current: impl Iterator<Item = (&'a String, f64)>,
    previous: impl Fn(&str) -> Option<f64>,
) -> SnapshotDiff {
    let mut out = SnapshotDiff::default();
    for (key, value) in current {
        let Some(prev) = previous(key) else {
            continue;
        };
        let diff = value - prev;
        out.diffs.insert(key.clone(), diff);
        if prev != 0.0 {
            out.diff_percents.insert(key.clone(), diff / prev * 100.0);
        }
    }
    out
}

/// Attaches funnel and average differences against `previous`.
pub fn diff(mut current: Snapshot, previous: &Snapshot) -> Snapshot {
    let funnel_diff = diff_group(
        current.funnel.iter().map(|(k, v)| (k, *v as f64)),
        |k| previous.funnel.get(k).map(|v| *v as f64),
    );
    let averages_diff = diff_group(
        current.averages.iter().map(|(k, v)| (k, *v)),
        |k| previous.averages.get(k).copied(),
    );
    current.funnel_diff = Some(funnel_diff);
    current.averages_diff = Some(averages_diff);
    current
}

/// The `n` most frequent values with their integer share of the whole.
/// Ties keep first-occurrence order.
pub fn top_n(values: &[String], n: usize) -> Vec<(String, u64)> {
    let total = values.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: Vec<(String, u64)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.clone(), 1)),
        }
    }
    // stable sort keeps first occurrence ahead on ties
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(v, c)| (v, ((c as f64 / total as f64) * 100.0).round() as u64))
        .collect()
}
