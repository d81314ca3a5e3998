//! Per-user conversation summaries: touches and recency listings.

use std::sync::Arc;

use chrono::Duration;
use duologue::messaging::{
    adapters::memory::InMemoryConversationSummaries,
    domain::{ConversationId, ConversationSummary, PageRequest, UserId},
    services::{ConversationSummaries, SendMessageRequest, StoreCallPolicy},
};
use rstest::{fixture, rstest};

use super::helpers::{MemoryService, epoch, service};

#[fixture]
fn summaries() -> ConversationSummaries<InMemoryConversationSummaries> {
    ConversationSummaries::new(
        Arc::new(InMemoryConversationSummaries::new()),
        StoreCallPolicy::default(),
        100,
    )
}

fn conversation_ids(page: &[duologue::messaging::domain::Conversation]) -> Vec<ConversationId> {
    page.iter().map(|conversation| conversation.id).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn repeated_touch_leaves_one_unchanged_row(
    summaries: ConversationSummaries<InMemoryConversationSummaries>,
) {
    let summary = ConversationSummary::new(
        UserId::new(1),
        ConversationId::mint(),
        UserId::new(2),
        epoch(),
        "hello",
    );

    summaries.touch(&summary).await.expect("touch succeeds");
    let once = summaries
        .list(UserId::new(1), PageRequest::new(1, 10).expect("valid request"))
        .await
        .expect("listing succeeds");
    summaries.touch(&summary).await.expect("touch succeeds");
    let twice = summaries
        .list(UserId::new(1), PageRequest::new(1, 10).expect("valid request"))
        .await
        .expect("listing succeeds");

    assert_eq!(once, twice);
    assert_eq!(twice.total, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn later_touch_overwrites_earlier_one(
    summaries: ConversationSummaries<InMemoryConversationSummaries>,
) {
    let conversation_id = ConversationId::mint();
    let older =
        ConversationSummary::new(UserId::new(1), conversation_id, UserId::new(2), epoch(), "a");
    let newer = ConversationSummary::new(
        UserId::new(1),
        conversation_id,
        UserId::new(2),
        epoch() + Duration::seconds(1),
        "b",
    );

    summaries.touch(&older).await.expect("touch succeeds");
    summaries.touch(&newer).await.expect("touch succeeds");
    let page = summaries
        .list(UserId::new(1), PageRequest::new(1, 10).expect("valid request"))
        .await
        .expect("listing succeeds");

    assert_eq!(page.data.len(), 1);
    assert_eq!(
        page.data.first().map(|row| row.last_message_content.as_str()),
        Some("b")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conversations_are_listed_by_latest_activity(service: MemoryService) {
    let mut ids = Vec::new();
    for other in [2, 3, 4] {
        let sent = service
            .send_message(SendMessageRequest::new(UserId::new(1), UserId::new(other), "hey"))
            .await
            .expect("send succeeds");
        ids.push(sent.conversation_id());
    }
    service
        .send_message(SendMessageRequest::new(UserId::new(2), UserId::new(1), "back"))
        .await
        .expect("send succeeds");

    let page = service
        .list_user_conversations(UserId::new(1), PageRequest::new(1, 10).expect("valid request"))
        .await
        .expect("listing succeeds");

    let [with_two, with_three, with_four] = ids.as_slice() else {
        panic!("expected three conversations");
    };
    assert_eq!(
        conversation_ids(&page.data),
        vec![*with_two, *with_four, *with_three]
    );
    assert_eq!(
        page.data.first().map(|row| row.last_message_content.as_str()),
        Some("back")
    );
    assert!(page.data.iter().all(|row| row.user1_id == UserId::new(1)));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conversation_pages_follow_tokens_without_gaps(service: MemoryService) {
    for other in 2..=8 {
        service
            .send_message(SendMessageRequest::new(UserId::new(1), UserId::new(other), "hi"))
            .await
            .expect("send succeeds");
    }

    let mut partners = Vec::new();
    let mut request = PageRequest::new(1, 3).expect("valid request");
    loop {
        let page = service
            .list_user_conversations(UserId::new(1), request)
            .await
            .expect("listing succeeds");
        assert_eq!(page.total, 7);
        partners.extend(page.data.iter().map(|row| row.user2_id.value()));
        match page.next_token {
            Some(token) => request = request.next(token),
            None => break,
        }
    }

    assert_eq!(partners, vec![8, 7, 6, 5, 4, 3, 2]);
}
