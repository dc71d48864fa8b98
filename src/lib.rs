//! Kuis Kosakata - 本地优先的单词测验核心
//!
//! 模块：
//! - `rank`: 段位与等级推导
//! - `vocabulary`: 只读词库
//! - `progress`: 关卡、经验、错题本与订正记录
//! - `session`: 顺序、复习、区间重玩三种会话控制器
//! - `storage`: 键值存储与进度持久化网关
//! - `app`: 面向界面层的应用上下文

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod progress;
pub mod rank;
pub mod session;
pub mod storage;
pub mod vocabulary;

pub use app::{ProgressSummary, QuizApp};
pub use error::{QuizError, QuizResult};
pub use progress::{HistoryEntry, ProgressState};
pub use rank::RankTier;
pub use session::{AnswerOutcome, Pacing, Screen, SessionMode};
pub use storage::{KeyValueStore, MemoryStore, NameChange, ProgressGateway, SqliteStore};
pub use vocabulary::{QuestionRecord, VocabularyStore};
