//! 聊天室系统核心领域模型
//!
//! 包含参与者、消息记录、可见性过滤规则，以及存储层需要实现的仓储接口。

pub mod errors;
pub mod message;
pub mod participant;
pub mod repository;
pub mod value_objects;
pub mod visibility;

// 重新导出常用类型
pub use errors::*;
pub use message::*;
pub use participant::*;
pub use repository::*;
pub use value_objects::*;
pub use visibility::*;
