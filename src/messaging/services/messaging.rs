//! Message service: the public entry point of the messaging core.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use thiserror::Error;
use tracing::{instrument, warn};

use super::{ConversationIdentityIndex, ConversationSummaries, MessageLog, StoreCallPolicy};
use crate::config::MessagingConfig;
use crate::messaging::{
    domain::{
        ContentError, Conversation, ConversationId, ConversationSummary, Message,
        MessageContent, Page, PageRequest, PaginationError, UserId,
    },
    ports::{
        ConversationLookupRepository, ConversationSummaryRepository, MessageLogRepository,
        StoreError,
    },
};

/// Request payload for sending a direct message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageRequest {
    sender_id: UserId,
    receiver_id: UserId,
    content: String,
    conversation_id: Option<ConversationId>,
}

impl SendMessageRequest {
    /// Creates a request; the conversation is resolved from the pair.
    #[must_use]
    pub fn new(sender_id: UserId, receiver_id: UserId, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            receiver_id,
            content: content.into(),
            conversation_id: None,
        }
    }

    /// Targets a known conversation, skipping the identity lookup.
    #[must_use]
    pub const fn in_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }
}

/// Service-level errors for messaging operations.
#[derive(Debug, Error)]
pub enum MessageServiceError {
    /// Page, limit or continuation token rejected.
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// Message content rejected.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// A read or idempotent write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The message append failed. The row may or may not have been written,
    /// so resending risks a duplicate.
    #[error("message append failed: {0}")]
    Append(#[source] StoreError),

    /// The message was stored but at least one participant's summary was
    /// not updated. It converges on the next message in the conversation.
    #[error("message stored but {} summary update(s) failed: {source}", .stale_users.len())]
    FanOut {
        /// The persisted message.
        message: Box<Message>,
        /// Users whose conversation summary is stale.
        stale_users: Vec<UserId>,
        /// First summary write failure.
        source: StoreError,
    },
}

impl MessageServiceError {
    /// Returns `true` when repeating the whole operation is safe and may
    /// succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Store(err) => err.is_retryable(),
            Self::Pagination(_) | Self::Content(_) | Self::Append(_) | Self::FanOut { .. } => {
                false
            }
        }
    }
}

/// Result type for message service operations.
pub type MessageServiceResult<T> = Result<T, MessageServiceError>;

/// Coordinates the identity index, the message log and the per-user
/// summaries.
///
/// Writes fan out in a fixed order: identity resolution, log append, then
/// both summary touches concurrently. Nothing is rolled back; a summary
/// left stale by a failed touch is corrected by the next message.
#[derive(Clone)]
pub struct MessageService<I, L, S, C>
where
    I: ConversationLookupRepository,
    L: MessageLogRepository,
    S: ConversationSummaryRepository,
    C: Clock + Send + Sync,
{
    identity: ConversationIdentityIndex<I>,
    log: MessageLog<L, C>,
    summaries: ConversationSummaries<S>,
    config: MessagingConfig,
}

impl<I, L, S, C> MessageService<I, L, S, C>
where
    I: ConversationLookupRepository,
    L: MessageLogRepository,
    S: ConversationSummaryRepository,
    C: Clock + Send + Sync,
{
    /// Wires the service over injected repositories.
    #[must_use]
    pub fn new(
        lookup: Arc<I>,
        log: Arc<L>,
        summaries: Arc<S>,
        clock: Arc<C>,
        config: MessagingConfig,
    ) -> Self {
        let policy = StoreCallPolicy::from_config(&config);
        Self {
            identity: ConversationIdentityIndex::new(lookup, policy),
            log: MessageLog::new(log, clock, policy, config.count_scan_cap),
            summaries: ConversationSummaries::new(summaries, policy, config.count_scan_cap),
            config,
        }
    }

    /// Stores a message and updates both participants' summaries.
    ///
    /// A supplied conversation id is used as is; otherwise the pair's
    /// conversation is resolved or created.
    ///
    /// # Errors
    ///
    /// Returns [`MessageServiceError::Content`] for rejected content before
    /// any store call, [`MessageServiceError::Store`] when resolution fails,
    /// [`MessageServiceError::Append`] when the append fails and
    /// [`MessageServiceError::FanOut`] when a summary touch fails after the
    /// message was stored.
    #[instrument(
        skip_all,
        fields(sender_id = %request.sender_id, receiver_id = %request.receiver_id)
    )]
    pub async fn send_message(&self, request: SendMessageRequest) -> MessageServiceResult<Message> {
        let content = MessageContent::parse(request.content, self.config.max_content_bytes)?;
        let conversation_id = match request.conversation_id {
            Some(conversation_id) => conversation_id,
            None => {
                self.identity
                    .resolve_or_create(request.sender_id, request.receiver_id)
                    .await?
            }
        };

        let message = self
            .log
            .append(conversation_id, request.sender_id, request.receiver_id, content)
            .await
            .map_err(MessageServiceError::Append)?;

        let sender_view = ConversationSummary::for_sender(&message);
        let receiver_view = ConversationSummary::for_receiver(&message);
        let (sender_touch, receiver_touch) = tokio::join!(
            self.summaries.touch(&sender_view),
            self.summaries.touch(&receiver_view)
        );

        let mut stale_users = Vec::new();
        let mut first_failure = None;
        for (user_id, outcome) in [
            (message.sender_id(), sender_touch),
            (message.receiver_id(), receiver_touch),
        ] {
            if let Err(err) = outcome {
                warn!(%user_id, message_id = %message.id(), error = %err, "summary update failed");
                stale_users.push(user_id);
                first_failure.get_or_insert(err);
            }
        }
        if let Some(source) = first_failure {
            return Err(MessageServiceError::FanOut {
                message: Box::new(message),
                stale_users,
                source,
            });
        }
        Ok(message)
    }

    /// Lists a conversation's messages, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`MessageServiceError::Pagination`] before any store call
    /// when the limit exceeds the configured maximum, and
    /// [`MessageServiceError::Store`] when a read fails.
    #[instrument(skip_all, fields(%conversation_id, page = request.page(), limit = request.limit()))]
    pub async fn list_messages(
        &self,
        conversation_id: ConversationId,
        request: PageRequest,
    ) -> MessageServiceResult<Page<Message>> {
        self.config.check_limit(&request)?;
        Ok(self.log.scan(conversation_id, None, request).await?)
    }

    /// Lists a conversation's messages created strictly before `before`,
    /// newest first.
    ///
    /// # Errors
    ///
    /// As for [`Self::list_messages`].
    #[instrument(skip_all, fields(%conversation_id, %before, page = request.page(), limit = request.limit()))]
    pub async fn list_messages_before(
        &self,
        conversation_id: ConversationId,
        before: DateTime<Utc>,
        request: PageRequest,
    ) -> MessageServiceResult<Page<Message>> {
        self.config.check_limit(&request)?;
        Ok(self.log.scan(conversation_id, Some(before), request).await?)
    }

    /// Lists a user's conversations, most recently active first.
    ///
    /// # Errors
    ///
    /// As for [`Self::list_messages`].
    #[instrument(skip_all, fields(%user_id, page = request.page(), limit = request.limit()))]
    pub async fn list_user_conversations(
        &self,
        user_id: UserId,
        request: PageRequest,
    ) -> MessageServiceResult<Page<Conversation>> {
        self.config.check_limit(&request)?;
        Ok(self.summaries.list(user_id, request).await?)
    }

    /// Returns the conversation view derived from its newest message, or
    /// `None` when the conversation has no messages.
    ///
    /// # Errors
    ///
    /// Returns [`MessageServiceError::Store`] when the head read fails.
    #[instrument(skip_all, fields(%conversation_id))]
    pub async fn get_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> MessageServiceResult<Option<Conversation>> {
        let latest = self.log.latest(conversation_id).await?;
        Ok(latest.as_ref().map(Conversation::from_latest_message))
    }

    /// Returns the pair's conversation, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`MessageServiceError::Store`] when the lookup or insert
    /// fails.
    #[instrument(skip_all, fields(%user_a, %user_b))]
    pub async fn resolve_or_create_conversation(
        &self,
        user_a: UserId,
        user_b: UserId,
    ) -> MessageServiceResult<ConversationId> {
        Ok(self.identity.resolve_or_create(user_a, user_b).await?)
    }
}
