//! 自动化层
//!
//! ## 模块划分
//!
//! ### `executor` - 自动化执行器
//! - 驱动一次完整的发布交互（状态机）
//! - 独占并释放浏览器会话
//!
//! ### `selector` - 选择器解析策略
//! - 候选选择器按优先级解析 + 坐标兜底
//!
//! ### `targets` - 目标定位表
//! - NAVER 编辑器各逻辑目标的声明式配置

pub mod executor;
pub mod selector;
pub mod targets;

pub use executor::{AutomationExecutor, PublishJob, PublishPhase, PublishReport};
pub use selector::{resolve, Resolved, UiTarget, VisibilityProbe};
pub use targets::EditorTargets;
