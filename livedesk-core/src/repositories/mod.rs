// src/repositories/mod.rs

pub mod memory;
pub mod postgres;

pub use livedesk_common::traits::{LivechatRepository, MessageContextRepository};

pub use memory::livechat::InMemoryLivechatRepository;
pub use memory::message_context::InMemoryMessageContextRepository;
pub use postgres::livechat::PostgresLivechatRepository;
pub use postgres::message_context::PostgresMessageContextRepository;
