//! 内存实现的存储（默认后端，也用于测试）
//!
//! 参与者与消息各自由一把读写锁保护。需要同时持有两把锁时，总是先锁参与者再锁消息；
//! 检查并插入、追加都在写锁临界区内完成，读取返回锁内的快照副本。

use std::sync::Arc;

use domain::{
    MessageRecord, MessageRepository, NewMessage, Participant, ParticipantRepository,
    RepositoryFuture,
};
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct MemoryStore {
    participants: Arc<RwLock<Vec<Participant>>>,
    messages: Arc<RwLock<Vec<MessageRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn push_record(messages: &mut Vec<MessageRecord>, message: NewMessage) -> MessageRecord {
    let seq = messages.last().map_or(1, |last| last.seq + 1);
    let record = message.into_record(seq);
    messages.push(record.clone());
    record
}

impl ParticipantRepository for MemoryStore {
    fn insert_if_absent(
        &self,
        participant: Participant,
        announcement: NewMessage,
    ) -> RepositoryFuture<Option<MessageRecord>> {
        let participants = self.participants.clone();
        let messages = self.messages.clone();
        Box::pin(async move {
            let mut participants = participants.write().await;
            if participants.iter().any(|p| p.name == participant.name) {
                return Ok(None);
            }
            let mut messages = messages.write().await;
            let record = push_record(&mut messages, announcement);
            participants.push(participant);
            Ok(Some(record))
        })
    }

    fn find_by_name(&self, name: String) -> RepositoryFuture<Option<Participant>> {
        let participants = self.participants.clone();
        Box::pin(async move {
            let participants = participants.read().await;
            Ok(participants
                .iter()
                .find(|p| p.name.as_str() == name)
                .cloned())
        })
    }

    fn list(&self) -> RepositoryFuture<Vec<Participant>> {
        let participants = self.participants.clone();
        Box::pin(async move { Ok(participants.read().await.clone()) })
    }
}

impl MessageRepository for MemoryStore {
    fn append(&self, message: NewMessage) -> RepositoryFuture<MessageRecord> {
        let messages = self.messages.clone();
        Box::pin(async move { Ok(push_record(&mut *messages.write().await, message)) })
    }

    fn list_all(&self) -> RepositoryFuture<Vec<MessageRecord>> {
        let messages = self.messages.clone();
        Box::pin(async move { Ok(messages.read().await.clone()) })
    }
}
