use std::path::PathBuf;
use std::time::Duration;

use crate::session::Pacing;

const APP_DIR: &str = "kuis-kosakata";

/// 使用内存存储的特殊路径
pub const IN_MEMORY_DB: &str = ":memory:";

#[derive(Debug, Clone)]
pub struct Config {
    pub vocab_path: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    /// 额外写入的日志文件，未设置时只写 stderr
    pub log_file: Option<PathBuf>,
    pub pacing: Pacing,
}

impl Config {
    pub fn from_env() -> Self {
        let vocab_path = std::env::var("KUIS_VOCAB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/vocab_a.json"));

        let db_path = std::env::var("KUIS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_file = std::env::var("KUIS_LOG_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        let defaults = Pacing::default();
        let pacing = Pacing {
            advance_delay: millis_from_env("KUIS_ADVANCE_DELAY_MS")
                .unwrap_or(defaults.advance_delay),
            replay_delay: millis_from_env("KUIS_REPLAY_DELAY_MS").unwrap_or(defaults.replay_delay),
            review_exit_delay: millis_from_env("KUIS_REVIEW_EXIT_DELAY_MS")
                .unwrap_or(defaults.review_exit_delay),
        };

        Self {
            vocab_path,
            db_path,
            log_level,
            log_file,
            pacing,
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_DB
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("progress.db")
}

fn millis_from_env(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
}
