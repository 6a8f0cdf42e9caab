pub mod livechat;
pub mod message_context;
