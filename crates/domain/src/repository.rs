//! 仓储接口
//!
//! 存储是外部协作者。核心只依赖以下能力：不存在时插入（连同加入记录）、按键查找、
//! 追加、全量读取。

use futures::future::BoxFuture;

use crate::errors::RepositoryError;
use crate::message::{MessageRecord, NewMessage};
use crate::participant::Participant;

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ParticipantRepository: Send + Sync {
    /// 原子地检查并插入参与者，同时把 `announcement` 追加到账本。
    ///
    /// 名称已存在时返回 `None` 且两边都不修改；失败时同样不留下任何一半的写入。
    /// 其他读者要么同时看到参与者和加入记录，要么都看不到。
    fn insert_if_absent(
        &self,
        participant: Participant,
        announcement: NewMessage,
    ) -> RepositoryFuture<Option<MessageRecord>>;
    fn find_by_name(&self, name: String) -> RepositoryFuture<Option<Participant>>;
    /// 按注册顺序返回全部参与者。
    fn list(&self) -> RepositoryFuture<Vec<Participant>>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait MessageRepository: Send + Sync {
    /// 追加一条记录并分配下一个序号。
    fn append(&self, message: NewMessage) -> RepositoryFuture<MessageRecord>;
    /// 按插入顺序返回全部记录。
    fn list_all(&self) -> RepositoryFuture<Vec<MessageRecord>>;
}
