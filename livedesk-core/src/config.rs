// src/config.rs

use std::time::Duration;

use chrono_tz::Tz;

use crate::Error;

/// A funnel counter: how many visitors produced an event with `label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunnelStep {
    pub key: String,
    pub label: String,
}

impl FunnelStep {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// A categorical list gathered from a nested metadata path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoricalField {
    pub key: String,
    pub path: Vec<String>,
}

impl CategoricalField {
    pub fn new(key: &str, path: &[&str]) -> Self {
        Self {
            key: key.to_string(),
            path: path.iter().map(|p| p.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub funnel_steps: Vec<FunnelStep>,
    pub categorical_fields: Vec<CategoricalField>,
    pub top_n: usize,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            funnel_steps: vec![
                FunnelStep::new("widget_open", "/livechat_visible"),
                FunnelStep::new("pricing", "/pricing"),
                FunnelStep::new("features", "/features"),
                FunnelStep::new("installation", "/installation"),
                FunnelStep::new("about", "/about"),
                FunnelStep::new("contact", "/contact"),
                FunnelStep::new("live_chat_enabled", "enable_livechat"),
                FunnelStep::new("subscribe", "/subscribe"),
            ],
            categorical_fields: vec![
                CategoricalField::new("cities", &["location_data", "city"]),
                CategoricalField::new("countries", &["location_data", "country"]),
                CategoricalField::new("form_factors", &["wurfl_data", "form_factor"]),
                CategoricalField::new("devices", &["wurfl_data", "complete_device_name"]),
                CategoricalField::new("browsers", &["browser_data", "browserName"]),
                CategoricalField::new("referrers", &["referrer_data", "referrer"]),
            ],
            top_n: 5,
        }
    }
}

/// Runtime settings shared by the dispatcher and delivery layer.
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Chat where new-message notifications are posted.
    pub admin_chat_id: String,
    /// Used in the greeting quick response.
    pub brand_name: String,
    pub timezone: Tz,
    pub delivery_timeout: Duration,
    /// Post new visitor messages as a one-line quote with an Expand button
    /// instead of the full transcript card.
    pub compact_notifications: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            admin_chat_id: String::new(),
            brand_name: "Rappo".to_string(),
            timezone: chrono_tz::Asia::Kolkata,
            delivery_timeout: Duration::from_secs(5),
            compact_notifications: false,
        }
    }
}

impl DeskConfig {
    pub fn parse_timezone(name: &str) -> Result<Tz, Error> {
        name.parse::<Tz>()
            .map_err(|e| Error::Config(format!("Unknown time zone '{name}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(DeskConfig::parse_timezone("Asia/Kolkata").unwrap(), chrono_tz::Asia::Kolkata);
        assert!(matches!(DeskConfig::parse_timezone("Mars/Olympus"), Err(Error::Config(_))));
    }
}
