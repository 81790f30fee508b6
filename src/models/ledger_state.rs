use serde::{Deserialize, Serialize};

use crate::models::Episode;

/// 单次发布尝试的记录（只追加，不修改）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicationRecord {
    /// 回目序号
    pub episode: u32,
    /// 尝试时刻（RFC3339）
    pub timestamp: String,
    /// 是否成功
    pub success: bool,
    /// 文章 URL（成功时尽力提取，可能缺失）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// 失败原因（仅失败记录携带）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 台账状态 — "已发布到哪"的唯一事实来源
///
/// `last_published_sequence` 单调不减，只有成功记录落盘后才会前进。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerState {
    pub last_published_sequence: u32,
    #[serde(default)]
    pub history: Vec<PublicationRecord>,
}

impl LedgerState {
    /// 初始状态（台账文件缺失或损坏时使用）
    pub fn initial(start_sequence: u32) -> Self {
        Self {
            last_published_sequence: start_sequence,
            history: Vec::new(),
        }
    }

    /// 追加一条成功记录并推进计数器
    ///
    /// 计数器取 max，保证手动补发旧回目时不会倒退。
    pub fn with_success(mut self, episode: &Episode, url: Option<String>) -> Self {
        self.history.push(PublicationRecord {
            episode: episode.sequence,
            timestamp: chrono::Local::now().to_rfc3339(),
            success: true,
            url,
            error: None,
        });
        self.last_published_sequence = self.last_published_sequence.max(episode.sequence);
        self
    }

    /// 追加一条失败记录，计数器不变
    pub fn with_failure(mut self, episode: &Episode, error: &str) -> Self {
        self.history.push(PublicationRecord {
            episode: episode.sequence,
            timestamp: chrono::Local::now().to_rfc3339(),
            success: false,
            url: None,
            error: Some(error.to_string()),
        });
        self
    }
}
