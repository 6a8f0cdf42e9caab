// src/repositories/memory/message_context.rs

use async_trait::async_trait;
use dashmap::DashMap;

use livedesk_common::models::MessageContext;
use livedesk_common::traits::MessageContextRepository;

use crate::Error;

#[derive(Default)]
pub struct InMemoryMessageContextRepository {
    contexts: DashMap<String, MessageContext>,
}

impl InMemoryMessageContextRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageContextRepository for InMemoryMessageContextRepository {
    async fn put(&self, message_id: &str, context: &MessageContext) -> Result<(), Error> {
        self.contexts.insert(message_id.to_string(), context.clone());
        Ok(())
    }

    async fn get(&self, message_id: &str) -> Result<Option<MessageContext>, Error> {
        Ok(self.contexts.get(message_id).map(|c| c.value().clone()))
    }
}
