//! 日志工具模块
//!
//! tracing 初始化与日志文件头写入

use std::fs;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅器
///
/// 默认 info 级别，可用 RUST_LOG 覆盖；重复初始化被忽略。
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

/// 初始化日志文件（写入带时间戳的文件头）
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n每日发布日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 截断长文本用于日志显示
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_text("가나다라마", 3), "가나다...");
        assert_eq!(truncate_text("short", 10), "short");
    }
}
