use std::fmt;

/// 发布过程错误分类
///
/// 自动化执行器的每一种终态失败都对应这里的一个变体，
/// 台账中的失败记录以及 Telegram 通知都使用它的 Display 文本。
#[derive(Debug)]
pub enum PublishError {
    /// 登录等待超时（允许人工处理验证码的窗口用尽）
    LoginTimeout {
        waited_secs: u64,
    },
    /// 会话中途失效（二次跳回登录页）
    AuthLost,
    /// 目标元素定位失败（候选选择器与坐标兜底全部用尽）
    TargetNotFound {
        target: String,
    },
    /// 页面导航超时
    NavigationTimeout {
        url: String,
    },
    /// 图片上传失败（非致命，降级为无图发布）
    UploadFailure {
        detail: String,
    },
    /// 未分类的自动化错误（兜底，携带原始错误文本）
    Unclassified {
        detail: String,
    },
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishError::LoginTimeout { waited_secs } => {
                write!(f, "登录超时: 等待 {} 秒后仍未通过登录页", waited_secs)
            }
            PublishError::AuthLost => {
                write!(f, "会话失效: 重新登录后仍被跳回登录页")
            }
            PublishError::TargetNotFound { target } => {
                write!(f, "目标定位失败: {}", target)
            }
            PublishError::NavigationTimeout { url } => {
                write!(f, "导航超时: {}", url)
            }
            PublishError::UploadFailure { detail } => {
                write!(f, "图片上传失败: {}", detail)
            }
            PublishError::Unclassified { detail } => {
                write!(f, "自动化错误: {}", detail)
            }
        }
    }
}

impl std::error::Error for PublishError {}

impl PublishError {
    /// 判断该错误是否致命（致命错误使本次发布终态为 Aborted）
    ///
    /// 图片上传失败是唯一的非致命变体，调用方降级为无图发布。
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PublishError::UploadFailure { .. })
    }

    /// 包装第三方错误为未分类错误
    pub fn unclassified(err: impl fmt::Display) -> Self {
        PublishError::Unclassified {
            detail: err.to_string(),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for PublishError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        PublishError::Unclassified {
            detail: err.to_string(),
        }
    }
}

/// 台账持久化错误
///
/// 只覆盖写入路径：读取路径永远回退到初始状态，不会产生错误。
#[derive(Debug)]
pub enum LedgerError {
    /// 状态序列化失败
    SerializeFailed {
        source: serde_json::Error,
    },
    /// 临时文件写入失败
    WriteFailed {
        path: String,
        source: std::io::Error,
    },
    /// 原子替换（rename）失败
    ReplaceFailed {
        path: String,
        source: std::io::Error,
    },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::SerializeFailed { source } => {
                write!(f, "台账序列化失败: {}", source)
            }
            LedgerError::WriteFailed { path, source } => {
                write!(f, "台账写入失败 ({}): {}", path, source)
            }
            LedgerError::ReplaceFailed { path, source } => {
                write!(f, "台账替换失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for LedgerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LedgerError::SerializeFailed { source } => Some(source),
            LedgerError::WriteFailed { source, .. } | LedgerError::ReplaceFailed { source, .. } => {
                Some(source)
            }
        }
    }
}

/// 配置错误
///
/// 凭证类配置没有内置默认值，首次用到时缺失即报此错误。
#[derive(Debug)]
pub enum ConfigError {
    /// 必需的机密环境变量未设置
    MissingSecret {
        var_name: String,
    },
    /// 调度时刻非法（小时/分钟超出范围）
    InvalidFireTime {
        hour: u32,
        minute: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingSecret { var_name } => {
                write!(f, "环境变量 {} 未设置", var_name)
            }
            ConfigError::InvalidFireTime { hour, minute } => {
                write!(f, "调度时刻非法: {:02}:{:02}", hour, minute)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_failure_is_not_fatal() {
        let err = PublishError::UploadFailure {
            detail: "x".to_string(),
        };
        assert!(!err.is_fatal());

        let err = PublishError::LoginTimeout { waited_secs: 180 };
        assert!(err.is_fatal());
    }

    #[test]
    fn target_not_found_carries_target_name() {
        let err = PublishError::TargetNotFound {
            target: "标题输入框".to_string(),
        };
        assert!(err.to_string().contains("标题输入框"));
    }
}
