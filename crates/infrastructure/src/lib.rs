//! 基础设施层实现。
//!
//! 提供 PostgreSQL 仓储与内嵌迁移，并根据配置装配存储后端，实现领域层定义的仓储接口。

pub mod builder;
pub mod migrations;
pub mod repository;

pub use builder::{Infrastructure, InfrastructureError};
pub use migrations::MIGRATOR;
pub use repository::{create_pg_pool, PgMessageRepository, PgParticipantRepository, PgStorage};
