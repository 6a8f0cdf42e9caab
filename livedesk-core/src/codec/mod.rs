// src/codec/mod.rs
//
// Button payloads look like `/chats{"s":"online","i":2}`: a command name
// followed by an optional JSON object of short keys. Decoding is tolerant;
// any key that is missing or has the wrong shape falls back to its default.

pub mod nav;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::warn;

use crate::Error;
pub use nav::{
    ChatSelector, ChatsNav, DateSelector, LifecycleSelector, NavCommand, QuickResponse,
    ScrollDirection, StatsNav, StatsView,
};

/// Reads one entity, ignoring values that do not deserialize into `T`.
pub fn entity<T: DeserializeOwned>(entities: &Map<String, Value>, key: &str) -> Option<T> {
    let value = entities.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Ignoring malformed entity '{}'={}: {}", key, value, e);
            None
        }
    }
}

pub fn encode(cmd: &NavCommand) -> String {
    let mut block = Map::new();
    match cmd {
        NavCommand::Chats(nav) => {
            if let Some(s) = nav.selector {
                block.insert("s".into(), json!(s.as_str()));
            }
            if let Some(p) = nav.parent {
                block.insert("p".into(), json!(p.as_str()));
            }
            if let Some(u) = &nav.visitor_id {
                block.insert("u".into(), json!(u));
            }
            if nav.page > 0 {
                block.insert("i".into(), json!(nav.page));
            }
        }
        NavCommand::Stats(nav) => {
            block.insert("v".into(), json!(nav.view.as_str()));
            if nav.lifecycle != LifecycleSelector::default() {
                block.insert("l".into(), json!(nav.lifecycle.as_str()));
            }
            if let Some(d) = nav.date {
                block.insert("d".into(), json!(d.as_str()));
            }
            if nav.page > 0 {
                block.insert("i".into(), json!(nav.page));
            }
        }
        NavCommand::Refresh => {}
        NavCommand::Scroll(direction) => {
            block.insert("d".into(), json!(direction.as_str()));
        }
        NavCommand::Tag(stage) => {
            if let Some(stage) = stage {
                block.insert("d".into(), json!(stage.as_str()));
            }
        }
        NavCommand::Quick(quick) => {
            if let Some(quick) = quick {
                block.insert("d".into(), json!(quick.as_str()));
            }
        }
    }

    if block.is_empty() {
        format!("/{}", cmd.command())
    } else {
        format!("/{}{}", cmd.command(), Value::Object(block))
    }
}

/// Builds a command from an intent name and its entities.
/// Unknown intents resolve to the chat menu.
pub fn from_entities(intent: &str, entities: &Map<String, Value>) -> NavCommand {
    match intent {
        "chats" => NavCommand::Chats(ChatsNav {
            selector: entity(entities, "s"),
            parent: entity(entities, "p"),
            visitor_id: entity::<String>(entities, "u").filter(|u| !u.is_empty()),
            page: entity(entities, "i").unwrap_or(0),
        }),
        "stats" => NavCommand::Stats(StatsNav {
            view: entity(entities, "v").unwrap_or_default(),
            lifecycle: entity(entities, "l").unwrap_or_default(),
            date: entity(entities, "d"),
            page: entity(entities, "i").unwrap_or(0),
        }),
        "refresh" => NavCommand::Refresh,
        "scroll" => NavCommand::Scroll(entity(entities, "d").unwrap_or_default()),
        "tag" => NavCommand::Tag(entity(entities, "d")),
        "quick" => NavCommand::Quick(entity(entities, "d")),
        _ => NavCommand::default(),
    }
}

/// Splits a payload into its intent and entity block.
pub fn try_split(payload: &str) -> Result<(String, Map<String, Value>), Error> {
    let body = payload
        .trim()
        .strip_prefix('/')
        .ok_or_else(|| Error::MalformedPayload(format!("missing leading '/': {payload}")))?;

    let (intent, block) = match body.find('{') {
        Some(idx) => (&body[..idx], Some(&body[idx..])),
        None => (body, None),
    };

    let entities = match block {
        None => Map::new(),
        Some(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                return Err(Error::MalformedPayload(format!(
                    "entity block is not an object: {other}"
                )));
            }
            Err(e) => return Err(Error::MalformedPayload(format!("{raw}: {e}"))),
        },
    };

    Ok((intent.trim().to_string(), entities))
}

pub fn try_decode(payload: &str) -> Result<NavCommand, Error> {
    let (intent, entities) = try_split(payload)?;
    Ok(from_entities(&intent, &entities))
}

/// Never fails: a payload that cannot be parsed yields the chat menu.
pub fn decode(payload: &str) -> NavCommand {
    match try_decode(payload) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!("{}; falling back to chat menu", e);
            NavCommand::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedesk_common::models::LifecycleStage;

    #[test]
    fn test_chats_round_trip() {
        let cmd = NavCommand::Chats(ChatsNav::visitor(ChatSelector::Online, "abc123", 2));
        let encoded = encode(&cmd);
        assert!(encoded.starts_with("/chats{"));
        assert_eq!(decode(&encoded), cmd);
    }

    #[test]
    fn test_stats_filter_date_and_page_round_trip() {
        let cmd = NavCommand::Stats(StatsNav {
            view: StatsView::Report,
            lifecycle: LifecycleSelector::QualifiedLead,
            date: Some(DateSelector::ThisWeek),
            page: 2,
        });
        let encoded = encode(&cmd);
        assert!(encoded.contains("\"l\":\"qualified-lead\""));
        assert!(encoded.contains("\"d\":\"this-week\""));
        assert!(encoded.contains("\"i\":2"));

        match decode(&encoded) {
            NavCommand::Stats(nav) => {
                assert_eq!(nav.lifecycle, LifecycleSelector::QualifiedLead);
                assert_eq!(nav.date, Some(DateSelector::ThisWeek));
                assert_eq!(nav.page, 2);
            }
            other => panic!("decoded to {other:?}"),
        }
    }

    #[test]
    fn test_every_stats_view_keeps_its_filter() {
        for view in [StatsView::Lifecycle, StatsView::Date, StatsView::Report] {
            for lifecycle in [LifecycleSelector::QualifiedLead, LifecycleSelector::Unqualified] {
                let cmd = NavCommand::Stats(StatsNav {
                    view,
                    lifecycle,
                    date: Some(DateSelector::LastMonth),
                    page: 1,
                });
                assert_eq!(decode(&encode(&cmd)), cmd);
            }
        }
    }

    #[test]
    fn test_every_command_round_trips() {
        let cmds = vec![
            NavCommand::default(),
            NavCommand::Chats(ChatsNav::list(ChatSelector::All, 3)),
            NavCommand::Refresh,
            NavCommand::Scroll(ScrollDirection::Up),
            NavCommand::Tag(Some(LifecycleStage::Unqualified)),
            NavCommand::Quick(Some(QuickResponse::Greet)),
        ];
        for cmd in cmds {
            assert_eq!(decode(&encode(&cmd)), cmd);
        }
    }

    #[test]
    fn test_empty_block_is_omitted() {
        assert_eq!(encode(&NavCommand::Refresh), "/refresh");
        assert_eq!(encode(&NavCommand::default()), "/chats");
    }

    #[test]
    fn test_malformed_keys_fall_back() {
        let cmd = decode(r#"/chats{"s":"nonsense","i":"two"}"#);
        assert_eq!(cmd, NavCommand::Chats(ChatsNav::default()));

        let cmd = decode(r#"/scroll{"d":42}"#);
        assert_eq!(cmd, NavCommand::Scroll(ScrollDirection::Start));
        assert_eq!(decode("/scroll"), NavCommand::Scroll(ScrollDirection::Start));

        let cmd = decode(r#"/stats{"v":"date"}"#);
        assert_eq!(
            cmd,
            NavCommand::Stats(StatsNav {
                view: StatsView::Date,
                lifecycle: LifecycleSelector::All,
                date: None,
                page: 0,
            })
        );
    }

    #[test]
    fn test_unparseable_payload_yields_menu() {
        assert_eq!(decode(r#"/chats{"s":"#), NavCommand::default());
        assert_eq!(decode("hello"), NavCommand::default());
        assert_eq!(decode("/launch_rockets"), NavCommand::default());
        assert!(matches!(try_decode("hello"), Err(Error::MalformedPayload(_))));
    }
}
