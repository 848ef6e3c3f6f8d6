//! 领域模型错误定义
//!
//! 定义了参与者注册、消息发送以及存储访问中可能出现的错误类型。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 单字段校验失败
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 消息请求校验失败，收集了全部违反的规则
    #[error("invalid message: {}", violations.join("; "))]
    InvalidMessage { violations: Vec<String> },

    /// 同名参与者已存在
    #[error("participant {name} already exists")]
    ParticipantAlreadyExists { name: String },

    /// 发送者未注册
    #[error("unknown sender {name:?}")]
    UnknownSender { name: String },
}

impl DomainError {
    /// 创建单字段校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// 创建消息校验错误
    pub fn invalid_message(violations: Vec<String>) -> Self {
        Self::InvalidMessage { violations }
    }

    pub fn participant_already_exists(name: impl Into<String>) -> Self {
        Self::ParticipantAlreadyExists { name: name.into() }
    }

    pub fn unknown_sender(name: impl Into<String>) -> Self {
        Self::UnknownSender { name: name.into() }
    }

    /// 面向调用方的违规描述列表
    pub fn violations(&self) -> Vec<String> {
        match self {
            Self::InvalidMessage { violations } => violations.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// 仓储（存储适配器）错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// 唯一键冲突
    #[error("unique key conflict")]
    Conflict,

    /// 底层存储不可用或返回了无法解析的数据
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
