//! # Daily Blog Publish
//!
//! 一个用于 NAVER 博客系列文章每日自动发布的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（Page），只暴露能力
//! - `PageDriver` - 唯一的 page owner，提供 eval / 交互 / 截图能力
//! - `browser/` - 浏览器会话的启动与释放（持久化用户数据目录）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个回目
//! - `ContentTransformer` - markdown → 博客排版转换能力
//! - `PublicationLedger` - 发布台账能力（唯一提交点）
//! - `TelegramNotifier` - 通知推送能力
//!
//! ### ③ 流程层（Workflow / Automation）
//! - `workflow/` - 定义"一个回目"的完整发布流程
//! - `PublishCtx` - 上下文封装（第几回 / 共几回）
//! - `PublishFlow` - 流程编排（转换 → 执行 → 落盘 → 通知）
//! - `automation/` - 自动化执行器（状态机）与选择器解析策略
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 每日调度循环与手动入口，持有互斥边界
//! - `orchestrator/scheduler` - 触发时刻计算
//!
//! ## 模块结构

pub mod automation;
pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use automation::{AutomationExecutor, PublishJob, PublishPhase, PublishReport};
pub use browser::BrowserSession;
pub use config::Config;
pub use error::{ConfigError, LedgerError, PublishError};
pub use infrastructure::PageDriver;
pub use models::{Episode, EpisodeCatalog, LedgerState, PublicationRecord};
pub use orchestrator::App;
pub use services::{ContentTransformer, PublicationLedger, TelegramNotifier};
pub use workflow::{PublishCtx, PublishFlow, PublishOutcome};
