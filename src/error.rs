//! 错误类型定义
//!
//! 核心操作只有两类失败：被拒绝的请求（返回给调用方）和存储层 I/O 错误。
//! 持久化数据损坏在网关内部以默认值恢复，不会出现在这里。

use thiserror::Error;

use crate::storage::StorageError;

/// 测验核心操作错误
#[derive(Error, Debug)]
pub enum QuizError {
    #[error("词库不可用: {0}")]
    DataUnavailable(String),

    #[error("无效的重玩范围: {0}")]
    InvalidRange(String),

    #[error("范围 {from}..={to} 内没有题目")]
    EmptyRange { from: u32, to: u32 },

    #[error("当前没有可作答的题目")]
    NoActiveQuestion,

    #[error("上一题的过渡尚未完成")]
    TransitionPending,

    #[error("{0} 模式不支持跳过")]
    SkipUnsupported(&'static str),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type QuizResult<T> = Result<T, QuizError>;
