//! 浏览器会话管理
//!
//! 每次发布尝试启动一个会话，结束后必须关闭（成功或失败都一样），
//! 不允许泄漏自动化会话。用户数据目录持久化，登录态跨次复用。

use std::path::Path;

use anyhow::Result;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::Config;

/// 一次发布尝试独占的浏览器会话
///
/// 持有 Browser、初始 Page 和后台事件处理任务，
/// `close()` 是唯一的释放路径。
pub struct BrowserSession {
    browser: Browser,
    page: Page,
    event_task: JoinHandle<()>,
}

impl BrowserSession {
    /// 启动浏览器并打开空白页
    ///
    /// 使用持久化用户数据目录，已有的登录会话得以复用。
    pub async fn launch(config: &Config) -> Result<Self> {
        info!("🚀 启动浏览器会话...");
        debug!("用户数据目录: {}", config.user_data_dir);

        let mut builder = BrowserConfig::builder();
        builder = if config.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        if let Some(exe) = &config.chrome_executable {
            builder = builder.chrome_executable(Path::new(exe));
        }

        let browser_config = builder
            .user_data_dir(&config.user_data_dir)
            .window_size(1280, 800)
            .args(vec![
                "--disable-gpu",           // Windows 无头模式必须禁用 GPU
                "--no-sandbox",            // 禁用沙盒，防止权限问题导致的崩溃
                "--disable-dev-shm-usage", // 防止共享内存不足
            ])
            .build()
            .map_err(|e| {
                error!("配置浏览器失败: {}", e);
                anyhow::anyhow!("配置浏览器失败: {}", e)
            })?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            error!("启动浏览器失败: {}", e);
            anyhow::anyhow!("启动浏览器失败: {}", e)
        })?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let event_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        // 添加短暂延迟以等待浏览器状态同步
        sleep(tokio::time::Duration::from_millis(300)).await;

        let page = browser.new_page("about:blank").await.map_err(|e| {
            error!("创建页面失败: {}", e);
            anyhow::anyhow!("创建页面失败: {}", e)
        })?;

        info!("✓ 浏览器会话就绪");
        Ok(Self {
            browser,
            page,
            event_task,
        })
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 关闭会话并回收后台任务
    ///
    /// 消费 self，确保每个会话只被关闭一次。
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("⚠️ 关闭浏览器失败: {}", e);
        }
        self.event_task.abort();
        debug!("浏览器会话已关闭");
    }
}
