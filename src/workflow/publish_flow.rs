//! 发布流程 - 流程层
//!
//! 核心职责：定义"一个回目"的完整发布流程
//!
//! 流程顺序：
//! 1. 台账查询 → 正文转换 → 自动化执行
//! 2. 结果分类 → 台账落盘（唯一提交点）
//! 3. 通知（每次尝试恰好一条，落盘之后才发出）

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::automation::{AutomationExecutor, PublishJob};
use crate::config::Config;
use crate::error::PublishError;
use crate::models::{Episode, EpisodeCatalog, LedgerState};
use crate::services::{ContentTransformer, PublicationLedger, TelegramNotifier};
use crate::workflow::publish_ctx::PublishCtx;

/// 一次发布尝试的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// 发布成功（URL 尽力提取）
    Published {
        episode: u32,
        url: Option<String>,
    },
    /// 发布失败（台账已记录失败原因）
    Failed {
        episode: u32,
        reason: String,
    },
    /// 系列已完结，本次什么都没做
    SeriesComplete,
}

/// 发布流程
///
/// - 编排完整的单回目发布流程
/// - 决定何时转换、何时驱动浏览器、何时落盘、何时通知
/// - 不持有浏览器资源（会话由执行器按次创建和释放）
pub struct PublishFlow {
    config: Config,
    catalog: EpisodeCatalog,
    transformer: ContentTransformer,
    ledger: PublicationLedger,
    notifier: TelegramNotifier,
    executor: AutomationExecutor,
}

impl PublishFlow {
    pub fn new(config: &Config, catalog: EpisodeCatalog) -> Result<Self> {
        Ok(Self {
            catalog,
            transformer: ContentTransformer::new()?,
            ledger: PublicationLedger::new(&config.status_file, config.start_sequence),
            notifier: TelegramNotifier::new(config)?,
            executor: AutomationExecutor::new(config),
            config: config.clone(),
        })
    }

    pub fn catalog(&self) -> &EpisodeCatalog {
        &self.catalog
    }

    pub fn ledger(&self) -> &PublicationLedger {
        &self.ledger
    }

    /// 发布下一个待发布回目
    ///
    /// 系列完结时不触碰台账、不启动浏览器、不发通知。
    pub async fn publish_next(&self) -> Result<PublishOutcome> {
        let state = self.ledger.load();

        match self.ledger.next_eligible(&state, &self.catalog) {
            Some(episode) => {
                let episode = episode.clone();
                self.publish_episode(state, &episode).await
            }
            None => {
                info!("🎉 全部回目已发布，系列完结");
                Ok(PublishOutcome::SeriesComplete)
            }
        }
    }

    /// 手动发布指定回目（绕过"下一个待发布"查询）
    ///
    /// 台账更新与通知契约和 publish_next 完全相同；
    /// 补发旧回目时计数器不会倒退。
    pub async fn publish_specific(&self, sequence: u32) -> Result<PublishOutcome> {
        let state = self.ledger.load();

        let episode = self
            .catalog
            .get(sequence)
            .with_context(|| format!("回目 {} 不在清单中", sequence))?
            .clone();

        self.publish_episode(state, &episode).await
    }

    /// 发布单个回目：执行 → 分类 → 落盘 → 通知
    async fn publish_episode(
        &self,
        state: LedgerState,
        episode: &Episode,
    ) -> Result<PublishOutcome> {
        let ctx = PublishCtx::new(
            episode.sequence,
            self.catalog.last_sequence(),
            episode.content.clone(),
        );

        info!("{}", "=".repeat(50));
        info!("📢 {} 开始发布: {}", ctx, ctx.content_file);
        info!("{}", "=".repeat(50));

        match self.attempt(&ctx, episode).await {
            Ok(report) => {
                // 先落盘，后通知 — 落盘是唯一提交点
                self.ledger
                    .record_success(state, episode, report.url.clone())
                    .context("成功记录落盘失败")?;

                let message = self.success_message(&ctx, &report.url);
                if !self.notifier.send(&message).await {
                    warn!("⚠️ {} 成功通知未投递", ctx);
                }

                info!("✅ {} 发布完成", ctx);
                if !report.image_attached && episode.image.is_some() {
                    info!("{} 本次为无图降级发布", ctx);
                }

                Ok(PublishOutcome::Published {
                    episode: episode.sequence,
                    url: report.url,
                })
            }
            Err(e) => {
                error!("❌ {} 发布失败: {}", ctx, e);

                self.ledger
                    .record_failure(state, episode, &e.to_string())
                    .context("失败记录落盘失败")?;

                let message = self.failure_message(&ctx, &e);
                if !self.notifier.send(&message).await {
                    warn!("⚠️ {} 失败通知未投递", ctx);
                }

                Ok(PublishOutcome::Failed {
                    episode: episode.sequence,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// 内容准备 + 自动化执行
    ///
    /// 正文文件读取失败也折叠进 PublishError，保证任何失败
    /// 都走同一条"落盘 + 通知"路径。
    async fn attempt(
        &self,
        ctx: &PublishCtx,
        episode: &Episode,
    ) -> Result<crate::automation::PublishReport, PublishError> {
        let content_path = episode.content_path(&self.config.posts_dir);
        let markdown = tokio::fs::read_to_string(&content_path)
            .await
            .map_err(|e| {
                PublishError::unclassified(format!("读取正文失败 ({}): {}", content_path.display(), e))
            })?;

        let content = self.transformer.convert(&markdown);
        info!("{} 标题: {}", ctx, crate::utils::logging::truncate_text(&content.title, 40));
        info!("{} 正文长度: {} 字", ctx, content.body.chars().count());

        // 配图缺失时直接降级，不让自动化层白跑一趟
        let image_path = match episode.image_path(&self.config.posts_dir) {
            Some(path) if path.exists() => Some(path),
            Some(path) => {
                warn!("⚠️ {} 配图文件不存在: {}，无图发布", ctx, path.display());
                None
            }
            None => None,
        };

        let job = PublishJob {
            sequence: episode.sequence,
            title: content.title,
            body: content.body,
            image_path,
        };

        self.executor.publish(&job).await
    }

    // ========== 通知文案 ==========

    fn success_message(&self, ctx: &PublishCtx, url: &Option<String>) -> String {
        let link = url.clone().unwrap_or_else(|| self.config.blog_url());
        let next = if ctx.has_next() {
            format!(
                "Episode {} tomorrow {:02}:{:02}",
                ctx.sequence + 1,
                self.config.publish_hour,
                self.config.publish_minute
            )
        } else {
            "Series Complete!".to_string()
        };

        format!(
            "[Blog Published] Episode {}/{}\n\nFile: {}\nPost: {}\n\nNext: {}",
            ctx.sequence, ctx.total, ctx.content_file, link, next
        )
    }

    fn failure_message(&self, ctx: &PublishCtx, error: &PublishError) -> String {
        format!(
            "[Blog FAILED] Episode {}\n\nError: {}\n\nPlease check manually!",
            ctx.sequence, error
        )
    }
}
