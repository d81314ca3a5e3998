//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use duologue::{
    config::MessagingConfig,
    messaging::{
        adapters::memory::{
            InMemoryConversationLookup, InMemoryConversationSummaries, InMemoryMessageLog,
        },
        domain::{ConversationId, Message, UserId},
        services::{MessageService, SendMessageRequest},
    },
};
use mockable::Clock;
use rstest::fixture;

pub use crate::test_helpers::{StepClock, epoch};

/// Clock that reads the same instant every time.
#[derive(Debug, Clone, Copy)]
pub struct FrozenClock(pub DateTime<Utc>);

impl Clock for FrozenClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Service type wired over the in-memory adapters.
pub type MemoryService = MessageService<
    InMemoryConversationLookup,
    InMemoryMessageLog,
    InMemoryConversationSummaries,
    StepClock,
>;

/// Builds a service over fresh in-memory tables with the given clock.
#[must_use]
pub fn memory_service_with_clock<C>(
    config: MessagingConfig,
    clock: C,
) -> MessageService<
    InMemoryConversationLookup,
    InMemoryMessageLog,
    InMemoryConversationSummaries,
    C,
>
where
    C: Clock + Send + Sync,
{
    MessageService::new(
        Arc::new(InMemoryConversationLookup::new()),
        Arc::new(InMemoryMessageLog::new()),
        Arc::new(InMemoryConversationSummaries::new()),
        Arc::new(clock),
        config,
    )
}

/// Builds a service over fresh in-memory tables.
#[must_use]
pub fn memory_service(config: MessagingConfig) -> MemoryService {
    memory_service_with_clock(config, StepClock::default())
}

/// Provides a service with default configuration.
#[fixture]
pub fn service() -> MemoryService {
    memory_service(MessagingConfig::default())
}

/// Sends `count` messages from user 1 to user 2 in one conversation and
/// returns them in send order.
///
/// # Errors
///
/// Returns the first send failure.
pub async fn send_many(
    service: &MemoryService,
    count: usize,
) -> Result<(ConversationId, Vec<Message>), Box<dyn std::error::Error + Send + Sync>> {
    let conversation_id = service
        .resolve_or_create_conversation(UserId::new(1), UserId::new(2))
        .await?;
    let mut sent = Vec::with_capacity(count);
    for index in 0..count {
        let request = SendMessageRequest::new(UserId::new(1), UserId::new(2), format!("m{index}"))
            .in_conversation(conversation_id);
        sent.push(service.send_message(request).await?);
    }
    Ok((conversation_id, sent))
}

/// Extracts message contents for order assertions.
#[must_use]
pub fn contents(messages: &[Message]) -> Vec<String> {
    messages
        .iter()
        .map(|message| message.content().to_owned())
        .collect()
}
