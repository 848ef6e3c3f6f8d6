//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务：参与者注册（在线名单）与消息账本，
//! 负责输入校验、原子性边界，以及对存储适配器和时钟的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod presence;

pub use clock::{Clock, SystemClock};
pub use dto::{MessageDto, ParticipantDto};
pub use error::ApplicationError;
pub use ledger::{MessageLedger, MessageLedgerDependencies, SendMessageRequest};
pub use memory::MemoryStore;
pub use presence::{PresenceRegistry, PresenceRegistryDependencies};
