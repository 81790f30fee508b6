//! 选择器解析策略
//!
//! 每个逻辑目标（标题框、发布按钮……）配置一组按优先级排列的
//! 候选选择器，外加可选的坐标兜底。页面结构漂移时只需增删候选，
//! 不改控制流。

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::PublishError;
use crate::infrastructure::PageDriver;

/// 可见性探测能力
///
/// 解析策略只依赖这一个能力，便于在没有浏览器的环境下测试。
#[allow(async_fn_in_trait)]
pub trait VisibilityProbe {
    /// 有界等待选择器对应元素可见
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> bool;
}

/// PageDriver 的探测适配器（携带轮询间隔配置）
pub struct DriverProbe<'a> {
    pub driver: &'a PageDriver,
    pub poll: Duration,
}

impl VisibilityProbe for DriverProbe<'_> {
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> bool {
        self.driver.wait_visible(selector, timeout, self.poll).await
    }
}

/// 一个逻辑 UI 目标的声明式定位配置
#[derive(Debug, Clone)]
pub struct UiTarget {
    /// 目标名称（用于日志与 TargetNotFound 错误）
    pub name: &'static str,
    /// 候选选择器，按优先级排列
    pub candidates: Vec<String>,
    /// 坐标兜底（仅对布局宽容的主输入区域配置）
    pub fallback: Option<(f64, f64)>,
}

impl UiTarget {
    pub fn new(name: &'static str, candidates: &[&str]) -> Self {
        Self {
            name,
            candidates: candidates.iter().map(|s| s.to_string()).collect(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, x: f64, y: f64) -> Self {
        self.fallback = Some((x, y));
        self
    }
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// 命中候选选择器
    Selector(String),
    /// 全部候选落空，使用坐标兜底
    Point(f64, f64),
}

/// 解析一个逻辑目标
///
/// 依次尝试候选选择器（每个候选一次有界可见性等待），第一个可见者
/// 胜出；全部落空且配置了坐标兜底时返回坐标；否则 TargetNotFound。
pub async fn resolve(
    target: &UiTarget,
    probe: &impl VisibilityProbe,
    per_candidate_wait: Duration,
) -> Result<Resolved, PublishError> {
    for candidate in &target.candidates {
        if probe.wait_visible(candidate, per_candidate_wait).await {
            debug!("✓ 目标 {} 命中候选: {}", target.name, candidate);
            return Ok(Resolved::Selector(candidate.clone()));
        }
    }

    if let Some((x, y)) = target.fallback {
        warn!("⚠️ 目标 {} 候选全部落空，使用坐标兜底 ({}, {})", target.name, x, y);
        return Ok(Resolved::Point(x, y));
    }

    Err(PublishError::TargetNotFound {
        target: target.name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// 测试桩：固定集合内的选择器立即可见，其余永不可见
    struct StubProbe {
        present: HashSet<String>,
    }

    impl StubProbe {
        fn with(present: &[&str]) -> Self {
            Self {
                present: present.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl VisibilityProbe for StubProbe {
        async fn wait_visible(&self, selector: &str, _timeout: Duration) -> bool {
            self.present.contains(selector)
        }
    }

    const WAIT: Duration = Duration::from_millis(10);

    #[tokio::test]
    async fn third_candidate_wins_without_fallback() {
        let target = UiTarget::new("标题输入框", &["#a", "#b", "#c"]).with_fallback(400.0, 250.0);
        let probe = StubProbe::with(&["#c"]);

        let resolved = resolve(&target, &probe, WAIT).await.unwrap();
        assert_eq!(resolved, Resolved::Selector("#c".to_string()));
    }

    #[tokio::test]
    async fn earlier_candidate_has_priority() {
        let target = UiTarget::new("标题输入框", &["#a", "#b"]);
        let probe = StubProbe::with(&["#a", "#b"]);

        let resolved = resolve(&target, &probe, WAIT).await.unwrap();
        assert_eq!(resolved, Resolved::Selector("#a".to_string()));
    }

    #[tokio::test]
    async fn exhaustion_without_fallback_is_target_not_found() {
        let target = UiTarget::new("发布按钮", &["#a", "#b"]);
        let probe = StubProbe::with(&[]);

        let err = resolve(&target, &probe, WAIT).await.unwrap_err();
        match err {
            PublishError::TargetNotFound { target } => assert_eq!(target, "发布按钮"),
            other => panic!("意外的错误类型: {:?}", other),
        }
    }

    #[tokio::test]
    async fn exhaustion_with_fallback_yields_point() {
        let target = UiTarget::new("正文区域", &["#a"]).with_fallback(400.0, 400.0);
        let probe = StubProbe::with(&[]);

        let resolved = resolve(&target, &probe, WAIT).await.unwrap();
        assert_eq!(resolved, Resolved::Point(400.0, 400.0));
    }
}
