pub mod admin_actions;
pub mod ledger_service;
pub mod stats_service;
pub mod widget_events;

pub use admin_actions::AdminActionService;
pub use ledger_service::LedgerService;
pub use stats_service::StatsService;
pub use widget_events::WidgetEventService;
