//! 发布上下文
//!
//! 封装"我正在发布第几回"这一信息

use std::fmt::Display;

/// 发布上下文
///
/// 包含发布单个回目所需的标识信息，只用于日志和通知文案。
#[derive(Debug, Clone)]
pub struct PublishCtx {
    /// 回目序号
    pub sequence: u32,

    /// 系列总回数
    pub total: u32,

    /// 正文文件名（仅用于日志显示）
    pub content_file: String,
}

impl PublishCtx {
    pub fn new(sequence: u32, total: u32, content_file: String) -> Self {
        Self {
            sequence,
            total,
            content_file,
        }
    }

    /// 是否还有后续回目
    pub fn has_next(&self) -> bool {
        self.sequence < self.total
    }
}

impl Display for PublishCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[第 {}/{} 回]", self.sequence, self.total)
    }
}
