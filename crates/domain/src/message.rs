use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{clock_time, ParticipantName, Timestamp, EVERYONE, JOIN_TEXT};

/// 消息类型。线上格式沿用 `status` / `message` / `private_message`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "message")]
    Broadcast,
    #[serde(rename = "private_message")]
    Private,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Status => "status",
            MessageKind::Broadcast => "message",
            MessageKind::Private => "private_message",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "status" => Ok(MessageKind::Status),
            "message" | "broadcast" => Ok(MessageKind::Broadcast),
            "private_message" | "private" => Ok(MessageKind::Private),
            other => Err(DomainError::invalid_argument(
                "type",
                format!("unknown message type {other:?}"),
            )),
        }
    }
}

/// 已写入账本的消息记录，写入后不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    /// 存储分配的插入序号，严格递增
    pub seq: u64,
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
    pub time: String,
}

/// 尚未分配序号的待追加消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
    pub time: String,
}

impl NewMessage {
    /// 参与者加入时的状态记录。
    pub fn joined(name: &ParticipantName, at: Timestamp) -> Self {
        Self {
            from: name.as_str().to_owned(),
            to: EVERYONE.to_owned(),
            text: JOIN_TEXT.to_owned(),
            kind: MessageKind::Status,
            time: clock_time(at),
        }
    }

    pub fn outgoing(sender: &ParticipantName, message: OutgoingMessage, at: Timestamp) -> Self {
        Self {
            from: sender.as_str().to_owned(),
            to: message.to,
            text: message.text,
            kind: message.kind,
            time: clock_time(at),
        }
    }

    pub fn into_record(self, seq: u64) -> MessageRecord {
        MessageRecord {
            seq,
            from: self.from,
            to: self.to,
            text: self.text,
            kind: self.kind,
            time: self.time,
        }
    }
}

/// 请求中某个字段的原始取值。
///
/// 传输层负责把线上数据映射成三种情况，字段规则统一在 [`OutgoingMessage::validate`] 中判断。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawField {
    #[default]
    Missing,
    Text(String),
    /// 存在但不是字符串（数字、布尔、null、数组或对象）
    NotText,
}

impl From<Option<&str>> for RawField {
    fn from(value: Option<&str>) -> Self {
        value.map_or(RawField::Missing, |v| RawField::Text(v.to_owned()))
    }
}

impl From<Option<String>> for RawField {
    fn from(value: Option<String>) -> Self {
        value.map_or(RawField::Missing, RawField::Text)
    }
}

/// 通过字段校验的用户消息（广播或私聊）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
}

impl OutgoingMessage {
    /// 校验原始请求字段，一次性收集所有违反的规则。
    ///
    /// 广播的收件人必须是 [`EVERYONE`]；私聊收件人是否已注册由账本另行确认。
    pub fn validate(to: &RawField, text: &RawField, kind: &RawField) -> Result<Self, Vec<String>> {
        let mut violations = Vec::new();

        let to = required_text("to", to, &mut violations);
        let text = required_text("text", text, &mut violations);
        let kind = match kind {
            RawField::Missing => {
                violations.push("\"type\" is required".to_string());
                None
            }
            RawField::NotText => {
                violations.push("\"type\" must be a string".to_string());
                None
            }
            RawField::Text(raw) => match raw.parse::<MessageKind>() {
                Ok(kind) if kind != MessageKind::Status => Some(kind),
                _ => {
                    violations.push("\"type\" must be one of [message, private_message]".to_string());
                    None
                }
            },
        };

        if let (Some(to), Some(MessageKind::Broadcast)) = (to, kind) {
            if to != EVERYONE {
                violations.push(format!("\"to\" must be [{EVERYONE}]"));
            }
        }

        match (to, text, kind) {
            (Some(to), Some(text), Some(kind)) if violations.is_empty() => Ok(Self {
                to: to.to_owned(),
                text: text.to_owned(),
                kind,
            }),
            _ => Err(violations),
        }
    }
}

fn required_text<'a>(
    field: &str,
    value: &'a RawField,
    violations: &mut Vec<String>,
) -> Option<&'a str> {
    match value {
        RawField::Missing => {
            violations.push(format!("\"{field}\" is required"));
            None
        }
        RawField::NotText => {
            violations.push(format!("\"{field}\" must be a string"));
            None
        }
        RawField::Text(value) if value.is_empty() => {
            violations.push(format!("\"{field}\" is not allowed to be empty"));
            None
        }
        RawField::Text(value) => Some(value),
    }
}
