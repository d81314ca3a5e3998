//! Summary upserts, recency listing and the full send flow against
//! `PostgreSQL`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use duologue::{
    config::MessagingConfig,
    messaging::{
        adapters::postgres::{
            PostgresConversationLookup, PostgresConversationSummaries, PostgresMessageLog,
        },
        domain::{ConversationId, ConversationSummary, PageRequest, UserId},
        ports::{ConversationSummaryRepository, SummaryScan},
        services::{ConversationSummaries, MessageService, SendMessageRequest, StoreCallPolicy},
    },
};
use rstest::rstest;

use crate::postgres::helpers::{PgContext, base_time, pg_context, seconds_after};
use crate::test_helpers::StepClock;

fn conversation(raw: i32) -> ConversationId {
    ConversationId::new(raw).expect("valid conversation id")
}

fn newest(user_id: UserId, limit: u32) -> SummaryScan {
    SummaryScan {
        user_id,
        resume: None,
        limit,
    }
}

#[rstest]
fn touching_twice_leaves_one_row(pg_context: PgContext, base_time: DateTime<Utc>) {
    let context = pg_context;
    let summaries = ConversationSummaries::new(
        Arc::new(PostgresConversationSummaries::new(context.pool.clone())),
        StoreCallPolicy::default(),
        100,
    );
    let user = UserId::new(1);
    let row = ConversationSummary::new(user, conversation(10), UserId::new(2), base_time, "hi");

    let page = context.rt.block_on(async {
        summaries.touch(&row).await.expect("first touch succeeds");
        summaries.touch(&row).await.expect("second touch succeeds");
        summaries
            .list(user, PageRequest::new(1, 20).expect("valid request"))
            .await
            .expect("listing succeeds")
    });

    assert_eq!(page.total, 1);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data.first().map(|view| view.id), Some(conversation(10)));
    assert_eq!(
        page.data.first().map(|view| view.last_message_content.as_str()),
        Some("hi")
    );

    drop(summaries);
    context.cleanup();
}

#[rstest]
fn upsert_overwrites_and_scan_follows_recency(pg_context: PgContext, base_time: DateTime<Utc>) {
    let context = pg_context;
    let summaries = PostgresConversationSummaries::new(context.pool.clone());
    let user = UserId::new(1);
    let row = |raw: i32, seconds: i64, text: &str| {
        ConversationSummary::new(
            user,
            conversation(raw),
            UserId::new(i64::from(raw)),
            seconds_after(base_time, seconds),
            text,
        )
    };
    let refreshed = row(30, 9, "refreshed");

    let (listed, resumed, counted) = context.rt.block_on(async {
        for initial in [row(10, 2, "ten"), row(20, 1, "twenty"), row(30, 0, "thirty")] {
            summaries.upsert(&initial).await.expect("upsert succeeds");
        }
        summaries.upsert(&refreshed).await.expect("upsert succeeds");
        let listed = summaries
            .scan(newest(user, 10))
            .await
            .expect("scan succeeds");
        let resumed = summaries
            .scan(SummaryScan {
                resume: Some(refreshed.resume_key()),
                ..newest(user, 1)
            })
            .await
            .expect("scan succeeds");
        let counted = summaries.count(user, 2).await.expect("count succeeds");
        (listed, resumed, counted)
    });

    let order: Vec<i32> = listed
        .iter()
        .map(|summary| summary.conversation_id().value())
        .collect();
    assert_eq!(order, vec![30, 10, 20]);
    assert_eq!(listed.first(), Some(&refreshed));
    assert_eq!(
        resumed.first().map(ConversationSummary::last_message_content),
        Some("ten")
    );
    assert_eq!((counted.count, counted.exact), (2, false));

    drop(summaries);
    context.cleanup();
}

#[rstest]
fn reply_updates_both_listings_and_the_conversation_view(pg_context: PgContext) {
    let context = pg_context;
    let service = MessageService::new(
        Arc::new(PostgresConversationLookup::new(context.pool.clone())),
        Arc::new(PostgresMessageLog::new(context.pool.clone())),
        Arc::new(PostgresConversationSummaries::new(context.pool.clone())),
        Arc::new(StepClock::default()),
        MessagingConfig::default(),
    );

    let (first, reply, ones, twos, view) = context.rt.block_on(async {
        let first = service
            .send_message(SendMessageRequest::new(UserId::new(1), UserId::new(2), "hi"))
            .await
            .expect("first send succeeds");
        let reply = service
            .send_message(SendMessageRequest::new(UserId::new(2), UserId::new(1), "hello"))
            .await
            .expect("reply succeeds");
        let request = PageRequest::new(1, 20).expect("valid request");
        let ones = service
            .list_user_conversations(UserId::new(1), request)
            .await
            .expect("listing succeeds");
        let twos = service
            .list_user_conversations(UserId::new(2), request)
            .await
            .expect("listing succeeds");
        let view = service
            .get_conversation(first.conversation_id())
            .await
            .expect("read succeeds");
        (first, reply, ones, twos, view)
    });

    assert_eq!(reply.conversation_id(), first.conversation_id());
    for (page, other) in [(&ones, UserId::new(2)), (&twos, UserId::new(1))] {
        let listed = page.data.first().expect("one conversation listed");
        assert_eq!(page.total, 1);
        assert_eq!(listed.id, first.conversation_id());
        assert_eq!(listed.user2_id, other);
        assert_eq!(listed.last_message_content, "hello");
        assert_eq!(listed.last_message_at, reply.created_at());
    }
    let view = view.expect("conversation has messages");
    assert_eq!(view.user1_id, UserId::new(2));
    assert_eq!(view.last_message_content, "hello");

    drop(service);
    context.cleanup();
}
