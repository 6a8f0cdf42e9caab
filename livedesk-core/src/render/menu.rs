// src/render/menu.rs

use livedesk_common::models::{Button, OutboundView};

use crate::codec::{
    self, ChatSelector, ChatsNav, DateSelector, LifecycleSelector, NavCommand, StatsNav, StatsView,
};

pub fn chat_menu() -> OutboundView {
    let row = [ChatSelector::Online, ChatSelector::All]
        .into_iter()
        .map(|s| {
            Button::new(
                s.title(),
                codec::encode(&NavCommand::Chats(ChatsNav::list(s, 0))),
            )
        })
        .collect();

    OutboundView::text("Select which chats you want to see:").with_rows(vec![row])
}

fn stats_button(title: &str, nav: StatsNav) -> Button {
    Button::new(title, codec::encode(&NavCommand::Stats(nav)))
}

fn lifecycle_button(lifecycle: LifecycleSelector) -> Button {
    stats_button(
        lifecycle.title(),
        StatsNav {
            view: StatsView::Date,
            lifecycle,
            ..Default::default()
        },
    )
}

pub fn lifecycle_picker() -> OutboundView {
    OutboundView::text("Select whose stats you want to see:").with_rows(vec![
        vec![
            lifecycle_button(LifecycleSelector::QualifiedLead),
            lifecycle_button(LifecycleSelector::Unqualified),
        ],
        vec![lifecycle_button(LifecycleSelector::All)],
    ])
}

pub fn date_picker(lifecycle: LifecycleSelector) -> OutboundView {
    let mut buttons: Vec<Button> = DateSelector::ALL
        .iter()
        .map(|date| {
            stats_button(
                date.title(),
                StatsNav {
                    view: StatsView::Report,
                    lifecycle,
                    date: Some(*date),
                    page: 0,
                },
            )
        })
        .collect();
    buttons.push(stats_button("Back", StatsNav::default()));

    let rows = buttons.chunks(2).map(|c| c.to_vec()).collect();
    OutboundView::text(format!(
        "Select the date range for {} stats:",
        lifecycle.title()
    ))
    .with_rows(rows)
}
