//! 在线名单（参与者注册表）
//!
//! 维护当前已知的参与者名称及其最后活跃时间，保证名称唯一。注册与“加入”状态记录由
//! 存储在同一次操作中写入，调用方不会观察到只完成了一半的加入。

use std::sync::Arc;

use domain::{
    DomainError, NewMessage, Participant, ParticipantName, ParticipantRepository,
    RepositoryError,
};

use crate::{clock::Clock, error::ApplicationError};

pub struct PresenceRegistryDependencies {
    pub participant_repository: Arc<dyn ParticipantRepository>,
    pub clock: Arc<dyn Clock>,
}

pub struct PresenceRegistry {
    deps: PresenceRegistryDependencies,
}

impl PresenceRegistry {
    pub fn new(deps: PresenceRegistryDependencies) -> Self {
        Self { deps }
    }

    pub async fn join(&self, name: &str) -> Result<Participant, ApplicationError> {
        let name = ParticipantName::parse(name)?;
        let now = self.deps.clock.now();
        let participant = Participant::register(name.clone(), now);
        let announcement = NewMessage::joined(&name, now);

        match self
            .deps
            .participant_repository
            .insert_if_absent(participant.clone(), announcement)
            .await
        {
            Ok(Some(record)) => {
                tracing::info!(name = %name, seq = record.seq, "participant joined");
                Ok(participant)
            }
            Ok(None) | Err(RepositoryError::Conflict) => {
                tracing::info!(name = %name, "join rejected: name already taken");
                Err(DomainError::participant_already_exists(name.as_str()).into())
            }
            Err(err) => {
                tracing::error!(name = %name, error = %err, "failed to register participant");
                Err(err.into())
            }
        }
    }

    pub async fn list(&self) -> Result<Vec<Participant>, ApplicationError> {
        Ok(self.deps.participant_repository.list().await?)
    }

    /// 按名称精确查找已注册的参与者。
    pub async fn find(&self, name: &str) -> Result<Option<Participant>, ApplicationError> {
        Ok(self
            .deps
            .participant_repository
            .find_by_name(name.to_owned())
            .await?)
    }

    pub async fn is_active(&self, name: &str) -> Result<bool, ApplicationError> {
        Ok(self.find(name).await?.is_some())
    }
}
