//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的在线名单与消息账本服务。

mod error;
mod identity;
mod payload;
mod routes;
mod state;

pub use error::{ApiError, ErrorBody};
pub use identity::{caller_identity, USER_HEADER};
pub use routes::router;
pub use state::AppState;
