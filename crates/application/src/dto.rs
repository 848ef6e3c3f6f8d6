use domain::{unix_millis, MessageKind, MessageRecord, Participant};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDto {
    pub name: String,
    /// Unix 毫秒
    #[serde(rename = "lastSeen")]
    pub last_seen: i64,
}

impl From<&Participant> for ParticipantDto {
    fn from(participant: &Participant) -> Self {
        Self {
            name: participant.name.as_str().to_owned(),
            last_seen: unix_millis(participant.last_seen),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub from: String,
    pub to: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub time: String,
}

impl From<&MessageRecord> for MessageDto {
    fn from(record: &MessageRecord) -> Self {
        Self {
            from: record.from.clone(),
            to: record.to.clone(),
            text: record.text.clone(),
            kind: record.kind,
            time: record.time.clone(),
        }
    }
}
