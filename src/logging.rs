//! 日志初始化
//!
//! 题目与状态占用 stdout，日志一律写 stderr。配置了 `KUIS_LOG_FILE` 时
//! 再以无 ANSI 的格式追加写入该文件。

use std::io;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

const FALLBACK_DIRECTIVE: &str = "info";

/// 安装全局 subscriber
///
/// 返回的 guard 必须持有到进程退出，否则文件日志的尾部会丢失。
pub fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let (file_layer, guard) = match config.log_file.as_deref().map(file_writer) {
        Some(Ok((writer, guard))) => {
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Some(Err(err)) => {
            eprintln!("log file disabled: {err}");
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.log_level))
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// 不滚动的单文件写入器，目录不存在时先创建
fn file_writer(path: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file path", path.display()),
        )
    })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
