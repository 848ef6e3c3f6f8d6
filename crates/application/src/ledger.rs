//! 消息账本服务
//!
//! 只追加、按插入顺序全序的消息历史。对外提供发送（广播/私聊）与按查看者过滤的查询；
//! 发送者与私聊收件人是否在线通过在线名单确认。

use std::sync::Arc;

use domain::{
    visible_feed, DomainError, FeedLimit, MessageKind, MessageRecord, MessageRepository,
    NewMessage, OutgoingMessage, RawField,
};

use crate::{clock::Clock, error::ApplicationError, presence::PresenceRegistry};

const UNKNOWN_RECIPIENT: &str = "\"to\" must name a registered participant";

/// 发送请求的原始字段，校验前均可能缺失或类型不符。
#[derive(Debug, Clone, Default)]
pub struct SendMessageRequest {
    pub to: RawField,
    pub text: RawField,
    pub kind: RawField,
}

pub struct MessageLedgerDependencies {
    pub message_repository: Arc<dyn MessageRepository>,
    pub presence: Arc<PresenceRegistry>,
    pub clock: Arc<dyn Clock>,
}

pub struct MessageLedger {
    deps: MessageLedgerDependencies,
}

impl MessageLedger {
    pub fn new(deps: MessageLedgerDependencies) -> Self {
        Self { deps }
    }

    /// 发送广播或私聊消息。
    ///
    /// 请求体的所有违规会被一并报告。校验失败时立即返回，不会再访问存储，也不会写入任何记录。
    pub async fn send(
        &self,
        sender: Option<&str>,
        request: SendMessageRequest,
    ) -> Result<MessageRecord, ApplicationError> {
        let message = OutgoingMessage::validate(&request.to, &request.text, &request.kind)
            .map_err(rejected)?;

        if message.kind == MessageKind::Private
            && !self.deps.presence.is_active(&message.to).await?
        {
            return Err(rejected(vec![UNKNOWN_RECIPIENT.to_string()]));
        }

        let sender_name = sender.unwrap_or_default();
        let Some(participant) = self.deps.presence.find(sender_name).await? else {
            tracing::warn!(sender = %sender_name, "message from unknown sender rejected");
            return Err(DomainError::unknown_sender(sender_name).into());
        };

        let now = self.deps.clock.now();
        let record = self
            .deps
            .message_repository
            .append(NewMessage::outgoing(&participant.name, message, now))
            .await?;

        tracing::info!(
            seq = record.seq,
            from = %record.from,
            to = %record.to,
            kind = %record.kind,
            "message sent"
        );
        Ok(record)
    }

    /// 计算查看者可见的消息，按插入顺序排列，可选保留最后 `limit` 条。
    pub async fn query_visible(
        &self,
        viewer: Option<&str>,
        limit: FeedLimit,
    ) -> Result<Vec<MessageRecord>, ApplicationError> {
        let records = self.deps.message_repository.list_all().await?;
        Ok(visible_feed(records, viewer, limit))
    }
}

fn rejected(violations: Vec<String>) -> ApplicationError {
    tracing::warn!(violations = ?violations, "message rejected by validation");
    DomainError::invalid_message(violations).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::MemoryStore,
        presence::{PresenceRegistry, PresenceRegistryDependencies},
    };
    use domain::{MockParticipantRepository, ParticipantRepository, RepositoryError, Timestamp, EVERYONE};
    use time::macros::datetime;

    struct FixedClock(Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    fn wire(
        participants: Arc<dyn ParticipantRepository>,
        messages: Arc<dyn MessageRepository>,
    ) -> (Arc<PresenceRegistry>, Arc<MessageLedger>) {
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(datetime!(2024-05-01 09:15:30 UTC)));
        let registry = Arc::new(PresenceRegistry::new(PresenceRegistryDependencies {
            participant_repository: participants,
            clock: clock.clone(),
        }));
        let ledger = Arc::new(MessageLedger::new(MessageLedgerDependencies {
            message_repository: messages,
            presence: registry.clone(),
            clock,
        }));
        (registry, ledger)
    }

    fn services() -> (Arc<PresenceRegistry>, Arc<MessageLedger>, MemoryStore) {
        let store = MemoryStore::new();
        let (registry, ledger) = wire(Arc::new(store.clone()), Arc::new(store.clone()));
        (registry, ledger, store)
    }

    fn request(to: &str, text: &str, kind: &str) -> SendMessageRequest {
        SendMessageRequest {
            to: RawField::Text(to.to_string()),
            text: RawField::Text(text.to_string()),
            kind: RawField::Text(kind.to_string()),
        }
    }

    async fn message_count(store: &MemoryStore) -> usize {
        store.list_all().await.unwrap().len()
    }

    #[tokio::test]
    async fn join_then_broadcast_scenario() {
        let (registry, ledger, _) = services();

        registry.join("alice").await.unwrap();
        assert!(matches!(
            registry.join("alice").await,
            Err(ApplicationError::Domain(DomainError::ParticipantAlreadyExists { .. }))
        ));
        ledger
            .send(Some("alice"), request(EVERYONE, "hi", "message"))
            .await
            .unwrap();

        let feed = ledger
            .query_visible(Some("bob"), FeedLimit::unbounded())
            .await
            .unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, MessageKind::Status);
        assert_eq!(feed[0].from, "alice");
        assert_eq!(feed[1].kind, MessageKind::Broadcast);
        assert_eq!(feed[1].text, "hi");
        assert_eq!(feed[1].time, "09:15:30");
    }

    #[tokio::test]
    async fn invalid_send_appends_nothing_and_reports_all_violations() {
        let (registry, ledger, store) = services();
        registry.join("alice").await.unwrap();
        let before = message_count(&store).await;

        let err = ledger
            .send(Some("alice"), request("", "", "shout"))
            .await
            .unwrap_err();

        match err {
            ApplicationError::Domain(DomainError::InvalidMessage { violations }) => {
                assert_eq!(violations.len(), 3);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(message_count(&store).await, before);
    }

    #[tokio::test]
    async fn validation_wins_over_unknown_sender() {
        let (_, ledger, store) = services();

        let err = ledger
            .send(Some("ghost"), SendMessageRequest::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidMessage { .. })
        ));
        assert_eq!(message_count(&store).await, 0);
    }

    #[tokio::test]
    async fn unknown_sender_is_rejected() {
        let (registry, ledger, store) = services();
        registry.join("bob").await.unwrap();

        let err = ledger
            .send(Some("mallory"), request(EVERYONE, "hello", "message"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::UnknownSender { .. })
        ));

        let err = ledger
            .send(None, request(EVERYONE, "hello", "message"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::UnknownSender { .. })
        ));
        assert_eq!(message_count(&store).await, 1);
    }

    #[tokio::test]
    async fn private_message_requires_registered_recipient() {
        let (registry, ledger, store) = services();
        registry.join("alice").await.unwrap();

        let err = ledger
            .send(Some("alice"), request("nobody", "psst", "private_message"))
            .await
            .unwrap_err();

        match err {
            ApplicationError::Domain(DomainError::InvalidMessage { violations }) => {
                assert_eq!(violations, vec![UNKNOWN_RECIPIENT.to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(message_count(&store).await, 1);
    }

    #[tokio::test]
    async fn private_message_visibility() {
        let (registry, ledger, _) = services();
        for name in ["alice", "bob", "carol"] {
            registry.join(name).await.unwrap();
        }
        ledger
            .send(Some("alice"), request("bob", "secret", "private_message"))
            .await
            .unwrap();

        let sees_secret = |feed: &[MessageRecord]| feed.iter().any(|r| r.text == "secret");
        for (viewer, expected) in [("alice", true), ("bob", true), ("carol", false)] {
            let feed = ledger
                .query_visible(Some(viewer), FeedLimit::unbounded())
                .await
                .unwrap();
            assert_eq!(sees_secret(feed.as_slice()), expected, "viewer {viewer}");
        }
    }

    #[tokio::test]
    async fn limit_returns_most_recent_records() {
        let (registry, ledger, _) = services();
        registry.join("alice").await.unwrap();
        for text in ["one", "two", "three"] {
            ledger
                .send(Some("alice"), request(EVERYONE, text, "message"))
                .await
                .unwrap();
        }

        let feed = ledger
            .query_visible(Some("alice"), FeedLimit::last(2))
            .await
            .unwrap();
        let texts: Vec<&str> = feed.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three"]);

        let all = ledger
            .query_visible(Some("alice"), FeedLimit::last(10))
            .await
            .unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn broadcast_to_a_single_participant_is_rejected() {
        let (registry, ledger, store) = services();
        registry.join("alice").await.unwrap();
        registry.join("bob").await.unwrap();

        let err = ledger
            .send(Some("alice"), request("bob", "hi", "message"))
            .await
            .unwrap_err();

        match err {
            ApplicationError::Domain(DomainError::InvalidMessage { violations }) => {
                assert_eq!(violations, vec!["\"to\" must be [Todos]".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records
            .iter()
            .filter(|r| r.kind != MessageKind::Private)
            .all(|r| r.to == EVERYONE));
    }

    #[tokio::test]
    async fn invalid_send_does_not_touch_the_store() {
        let mut participants = MockParticipantRepository::new();
        participants.expect_find_by_name().never();
        let (_, ledger) = wire(Arc::new(participants), Arc::new(MemoryStore::new()));

        let err = ledger
            .send(Some("alice"), request("bob", "", "private_message"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Domain(DomainError::InvalidMessage { .. })
        ));
    }

    #[tokio::test]
    async fn recipient_lookup_failure_surfaces_as_repository_error() {
        let mut participants = MockParticipantRepository::new();
        participants
            .expect_find_by_name()
            .returning(|_| Box::pin(async { Err(RepositoryError::storage("timeout")) }));
        let (_, ledger) = wire(Arc::new(participants), Arc::new(MemoryStore::new()));

        let err = ledger
            .send(Some("alice"), request("bob", "psst", "private_message"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApplicationError::Repository(RepositoryError::Storage { .. })
        ));
    }
}
