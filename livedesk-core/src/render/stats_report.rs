// src/render/stats_report.rs

use livedesk_common::models::{Button, OutboundView, SnapshotDiff};

use crate::codec::{self, DateSelector, NavCommand, StatsNav, StatsView};
use crate::render::{REPORT_PAGES, StatsReport};
use crate::stats::{SESSION_DURATION, SESSIONS_PER_USER, top_n};
use crate::utils::time::to_readable_duration;

pub fn stat_title(key: &str) -> String {
    let known = match key {
        "total_users" => "Total Users",
        "new_users" => "New Users",
        "returning_users" => "Returning Users",
        "widget_open" => "Widget Open",
        "pricing" => "Pricing",
        "features" => "Features",
        "installation" => "Installation",
        "about" => "About",
        "contact" => "Contact",
        "live_chat_enabled" => "Live Chat Enabled",
        "subscribe" => "Subscribe",
        "qualified_lead" => "Qualified Leads",
        "unqualified" => "Unqualified",
        "untagged" => "Untagged",
        "sessions_per_user" => "Avg. Sessions per User",
        "session_duration" => "Avg. Session Duration",
        "cities" => "Top Cities",
        "countries" => "Top Countries",
        "form_factors" => "Top Form Factors",
        "devices" => "Top Devices",
        "browsers" => "Top Browsers",
        "referrers" => "Top Referrers",
        _ => "",
    };
    if known.is_empty() {
        // configured funnel steps fall back to their key, e.g. `book_demo` -> `Book Demo`
        key.split('_')
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    } else {
        known.to_string()
    }
}

fn diff_suffix(diff: Option<&SnapshotDiff>, key: &str, date: DateSelector) -> String {
    if date == DateSelector::AllTime {
        return String::new();
    }
    match diff.and_then(|d| d.diff_percents.get(key)).copied() {
        Some(pct) if pct != 0.0 => {
            let arrow = if pct > 0.0 { "🔼 " } else { "🔽 " };
            format!(" ({}{}%)", arrow, pct.round() as i64)
        }
        _ => String::new(),
    }
}

fn format_average(key: &str, value: f64) -> String {
    match key {
        SESSION_DURATION => to_readable_duration(value),
        SESSIONS_PER_USER => format!("{}", (value * 100.0).round() / 100.0),
        _ => format!("{value}"),
    }
}

fn stats_payload(report: &StatsReport, view: StatsView, page: usize) -> String {
    codec::encode(&NavCommand::Stats(StatsNav {
        view,
        lifecycle: report.lifecycle,
        date: (view == StatsView::Report).then_some(report.date),
        page,
    }))
}

fn push_counters(text: &mut String, report: &StatsReport) {
    let snap = &report.snapshot;
    for key in &report.funnel_order {
        text.push_str(&format!(
            "{}: {}{}\n",
            stat_title(key),
            snap.funnel_value(key),
            diff_suffix(snap.funnel_diff.as_ref(), key, report.date)
        ));
    }

    text.push('\n');
    for key in &report.average_order {
        text.push_str(&format!(
            "{}: {}{}\n",
            stat_title(key),
            format_average(key, snap.average(key)),
            diff_suffix(snap.averages_diff.as_ref(), key, report.date)
        ));
    }
}

fn push_top_lists(text: &mut String, report: &StatsReport) {
    let mut any = false;
    for key in &report.list_order {
        let top = top_n(report.snapshot.list(key), report.top_n);
        if top.is_empty() {
            continue;
        }
        let joined = top
            .iter()
            .map(|(value, pct)| format!("{value} ({pct}%)"))
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&format!("{}: {}\n", stat_title(key), joined));
        any = true;
    }
    if !any {
        text.push_str("No visitor details recorded.\n");
    }
}

/// Page 0 holds counters and averages, page 1 the top lists. Pages past the
/// end clamp to the last one.
pub fn render_report(report: &StatsReport) -> OutboundView {
    let page = report.page.min(REPORT_PAGES - 1);
    let mut text = format!(
        "Stats for {} for {}:\n\n",
        report.lifecycle.title(),
        report.date.title()
    );

    let pager = if page == 0 {
        push_counters(&mut text, report);
        Button::new("Top lists »", stats_payload(report, StatsView::Report, 1))
    } else {
        push_top_lists(&mut text, report);
        Button::new("« Counters", stats_payload(report, StatsView::Report, 0))
    };

    OutboundView::text(text).with_rows(vec![
        vec![pager],
        vec![Button::new("Back", stats_payload(report, StatsView::Date, 0))],
    ])
}
