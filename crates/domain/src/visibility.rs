//! 可见性过滤
//!
//! 根据查看者身份，从完整账本中挑选其有权读取的记录，并可按条数截取最近的部分。

use std::num::NonZeroUsize;

use crate::message::{MessageKind, MessageRecord};
use crate::value_objects::EVERYONE;

/// 查询条数上限。只有正整数才构成上限，其余输入一律视为不限。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedLimit(Option<NonZeroUsize>);

impl FeedLimit {
    pub fn unbounded() -> Self {
        Self(None)
    }

    pub fn last(count: usize) -> Self {
        Self(NonZeroUsize::new(count))
    }

    /// 解析查询参数中的 `limit`：缺失、为零、负数或非数字都返回不限。
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<usize>().ok())
            .map(Self::last)
            .unwrap_or_default()
    }

    pub fn get(&self) -> Option<usize> {
        self.0.map(NonZeroUsize::get)
    }
}

/// 判断一条记录对查看者是否可见。
///
/// 四个条件全部保留：收件人为所有人、收件人是查看者、发送者是查看者、或类型为广播。
/// 广播类型的条件与“所有人”条件目前重叠，但两者是独立的规则。
pub fn is_visible_to(record: &MessageRecord, viewer: Option<&str>) -> bool {
    record.to == EVERYONE
        || viewer.is_some_and(|viewer| record.to == viewer || record.from == viewer)
        || record.kind == MessageKind::Broadcast
}

/// 按插入顺序过滤出查看者可见的记录，再按上限保留最后的若干条。
pub fn visible_feed(
    records: impl IntoIterator<Item = MessageRecord>,
    viewer: Option<&str>,
    limit: FeedLimit,
) -> Vec<MessageRecord> {
    let mut visible: Vec<MessageRecord> = records
        .into_iter()
        .filter(|record| is_visible_to(record, viewer))
        .collect();

    if let Some(limit) = limit.get() {
        if visible.len() > limit {
            visible.drain(..visible.len() - limit);
        }
    }

    visible
}
