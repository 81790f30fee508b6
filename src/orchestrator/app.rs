//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、回目清单、发布流程
//! 2. **每日调度**：按配置时刻触发 publish_next，回调执行完才进入下一轮
//! 3. **互斥边界**：调度触发与手动触发共用同一把锁，
//!    同一时刻至多一次发布在途，台账与浏览器会话不会被并发共享
//! 4. **手动入口**：立即发布指定回目 / 查看台账状态

use anyhow::{Context, Result};
use chrono::Local;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::config::Config;
use crate::models::load_catalog;
use crate::orchestrator::scheduler;
use crate::utils::logging;
use crate::workflow::{PublishFlow, PublishOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    /// 发布流程的互斥边界：所有发布入口都必须先拿到这把锁
    flow: Mutex<PublishFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;
        log_startup(&config);

        info!("📁 正在加载回目清单...");
        let catalog = load_catalog(&config.catalog_file).await?;

        let flow = PublishFlow::new(&config, catalog)?;

        Ok(Self {
            config,
            flow: Mutex::new(flow),
        })
    }

    /// 调度模式：每天在配置时刻发布下一回
    pub async fn run_scheduler(&self) -> Result<()> {
        {
            let flow = self.flow.lock().await;
            let state = flow.ledger().load();
            let total = flow.catalog().last_sequence();

            log_progress(state.last_published_sequence, total);

            if state.last_published_sequence >= total {
                info!("🎉 全部回目已发布，无需调度");
                return Ok(());
            }

            log_schedule(&self.config, state.last_published_sequence, total)?;
        }

        loop {
            let now = Local::now();
            let fire_at =
                scheduler::next_fire_at(now, self.config.publish_hour, self.config.publish_minute)?;
            let wait = (fire_at - now).to_std().unwrap_or_default();
            info!(
                "⏰ 下一次发布: {} （{} 秒后）",
                fire_at.format("%Y-%m-%d %H:%M"),
                wait.as_secs()
            );

            tokio::time::sleep(wait).await;

            // 拿到锁才开始发布；回调执行完才会进入下一轮等待
            let flow = self.flow.lock().await;
            match flow.publish_next().await {
                Ok(PublishOutcome::SeriesComplete) => {
                    info!("🎉 系列完结，调度器退出");
                    return Ok(());
                }
                Ok(PublishOutcome::Published { episode, .. }) => {
                    info!("✅ 第 {} 回发布完成，等待明日调度", episode);
                }
                Ok(PublishOutcome::Failed { episode, .. }) => {
                    // 不在本轮内重试：失败的回目保持待发布，明日再试
                    info!("❌ 第 {} 回发布失败，明日重试", episode);
                }
                Err(e) => {
                    error!("❌ 调度发布出错: {}", e);
                }
            }
        }
    }

    /// 手动模式：立即发布指定回目
    pub async fn publish_now(&self, sequence: u32) -> Result<PublishOutcome> {
        let flow = self.flow.lock().await;
        flow.publish_specific(sequence).await
    }

    /// 手动模式：查看台账状态
    pub async fn status(&self) -> Result<()> {
        let flow = self.flow.lock().await;
        let state = flow.ledger().load();
        let total = flow.catalog().last_sequence();

        log_progress(state.last_published_sequence, total);
        info!("历史记录: {} 条", state.history.len());

        let json = serde_json::to_string_pretty(&state).context("台账状态序列化失败")?;
        println!("{}", json);
        Ok(())
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 每日自动发布模式");
    info!("📌 目标博客: {}", config.blog_url());
    info!("⏰ 发布时刻: 每天 {:02}:{:02}", config.publish_hour, config.publish_minute);
    info!("{}", "=".repeat(60));
}

fn log_progress(last_published: u32, total: u32) {
    info!("当前状态: 已发布至第 {}/{} 回", last_published, total);
    info!("剩余回目: {} 个", total.saturating_sub(last_published));
}

fn log_schedule(config: &Config, last_published: u32, total: u32) -> Result<()> {
    let schedule = scheduler::remaining_schedule(
        Local::now(),
        last_published,
        total,
        config.publish_hour,
        config.publish_minute,
    )?;

    info!("预定发布排期:");
    for (sequence, date) in schedule {
        info!("  - {}: 第 {} 回", date.format("%m/%d"), sequence);
    }
    Ok(())
}
