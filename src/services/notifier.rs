//! Telegram 通知服务 - 业务能力层
//!
//! 只负责"把一条消息推送出去"能力。投递失败只记日志，
//! 永远不会升级为发布失败。

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, warn};

use crate::config::Config;

/// Telegram 通知服务
///
/// 职责：
/// - 调用 Bot API sendMessage 推送消息
/// - 未配置 Token/ChatId 时静默降级（返回未投递）
/// - 不关心消息内容的含义
pub struct TelegramNotifier {
    client: reqwest::Client,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("无法创建 HTTP 客户端")?;

        Ok(Self {
            client,
            bot_token: config.telegram_bot_token.clone(),
            chat_id: config.telegram_chat_id.clone(),
        })
    }

    /// 是否已配置通知通道
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    /// 推送一条消息，返回是否投递成功
    ///
    /// 任何错误（未配置、网络失败、API 拒绝）都只产生告警日志。
    pub async fn send(&self, message: &str) -> bool {
        if !self.is_configured() {
            warn!("⚠️ Telegram 未配置 (TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID)，跳过通知");
            return false;
        }

        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let payload = json!({
            "chat_id": self.chat_id,
            "text": message,
        });

        match self.client.post(&url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                debug!("✓ Telegram 通知已投递");
                true
            }
            Ok(response) => {
                warn!("⚠️ Telegram API 拒绝: HTTP {}", response.status());
                false
            }
            Err(e) => {
                warn!("⚠️ Telegram 通知发送失败: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(token: &str, chat: &str) -> Config {
        Config {
            telegram_bot_token: token.to_string(),
            telegram_chat_id: chat.to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn unconfigured_channel_is_detected() {
        let notifier = TelegramNotifier::new(&config_with("", "")).unwrap();
        assert!(!notifier.is_configured());

        let notifier = TelegramNotifier::new(&config_with("token", "")).unwrap();
        assert!(!notifier.is_configured());

        let notifier = TelegramNotifier::new(&config_with("token", "42")).unwrap();
        assert!(notifier.is_configured());
    }

    #[tokio::test]
    async fn send_without_configuration_returns_false() {
        let notifier = TelegramNotifier::new(&config_with("", "")).unwrap();
        assert!(!notifier.send("hello").await);
    }
}
