//! Conversation identity resolution against the in-memory index.

use std::sync::Arc;

use duologue::messaging::{
    adapters::memory::InMemoryConversationLookup,
    domain::UserId,
    services::{ConversationIdentityIndex, StoreCallPolicy},
};
use rstest::{fixture, rstest};

use super::helpers::{MemoryService, service};

#[fixture]
fn index() -> Arc<ConversationIdentityIndex<InMemoryConversationLookup>> {
    Arc::new(ConversationIdentityIndex::new(
        Arc::new(InMemoryConversationLookup::new()),
        StoreCallPolicy::default(),
    ))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn resolution_is_symmetric_and_stable(service: MemoryService) {
    let first = service
        .resolve_or_create_conversation(UserId::new(17), UserId::new(4))
        .await
        .expect("resolution succeeds");
    let reversed = service
        .resolve_or_create_conversation(UserId::new(4), UserId::new(17))
        .await
        .expect("resolution succeeds");
    let repeated = service
        .resolve_or_create_conversation(UserId::new(17), UserId::new(4))
        .await
        .expect("resolution succeeds");

    assert_eq!(first, reversed);
    assert_eq!(first, repeated);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn distinct_pairs_get_distinct_conversations(service: MemoryService) {
    let one_two = service
        .resolve_or_create_conversation(UserId::new(1), UserId::new(2))
        .await
        .expect("resolution succeeds");
    let one_three = service
        .resolve_or_create_conversation(UserId::new(1), UserId::new(3))
        .await
        .expect("resolution succeeds");

    assert_ne!(one_two, one_three);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn find_does_not_create(index: Arc<ConversationIdentityIndex<InMemoryConversationLookup>>) {
    let before = index
        .find(UserId::new(5), UserId::new(6))
        .await
        .expect("find succeeds");
    let created = index
        .resolve_or_create(UserId::new(6), UserId::new(5))
        .await
        .expect("resolution succeeds");
    let after = index
        .find(UserId::new(5), UserId::new(6))
        .await
        .expect("find succeeds");

    assert_eq!(before, None);
    assert_eq!(after, Some(created));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_first_contact_converges_on_one_id(
    index: Arc<ConversationIdentityIndex<InMemoryConversationLookup>>,
) {
    let handles: Vec<_> = (0..32)
        .map(|attempt| {
            let shared = Arc::clone(&index);
            tokio::spawn(async move {
                if attempt < 16 {
                    shared.resolve_or_create(UserId::new(8), UserId::new(3)).await
                } else {
                    shared.resolve_or_create(UserId::new(3), UserId::new(8)).await
                }
            })
        })
        .collect();

    let mut resolved = Vec::with_capacity(handles.len());
    for handle in handles {
        resolved.push(
            handle
                .await
                .expect("task joins")
                .expect("resolution succeeds"),
        );
    }

    let stored = index
        .find(UserId::new(3), UserId::new(8))
        .await
        .expect("find succeeds")
        .expect("conversation registered");
    assert!(resolved.iter().all(|id| *id == stored));
}
