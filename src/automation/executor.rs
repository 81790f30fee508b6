//! 自动化执行器 - 驱动外部 UI 完成一次发布
//!
//! 状态机：
//! `Idle → SessionReady → Navigated → TitleSet → [ImageAttached] →
//! BodySet → Submitted → Confirmed | Aborted`
//!
//! 每次发布独占一个浏览器会话，无论成功失败都在返回前释放；
//! 任何致命错误都先尽力抓一张诊断截图再向上抛。

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::automation::selector::{resolve, DriverProbe, Resolved, UiTarget, VisibilityProbe};
use crate::automation::targets::{EditorTargets, FILE_INPUT};
use crate::browser::BrowserSession;
use crate::config::Config;
use crate::error::{ConfigError, PublishError};
use crate::infrastructure::PageDriver;

/// NAVER 登录页
const LOGIN_URL: &str = "https://nid.naver.com/nidlogin.login";

/// 发布状态机的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishPhase {
    Idle,
    SessionReady,
    Navigated,
    TitleSet,
    ImageAttached,
    BodySet,
    Submitted,
    Confirmed,
}

impl PublishPhase {
    /// 截图文件名用的短标识
    pub fn slug(&self) -> &'static str {
        match self {
            PublishPhase::Idle => "idle",
            PublishPhase::SessionReady => "session-ready",
            PublishPhase::Navigated => "navigated",
            PublishPhase::TitleSet => "title-set",
            PublishPhase::ImageAttached => "image-attached",
            PublishPhase::BodySet => "body-set",
            PublishPhase::Submitted => "submitted",
            PublishPhase::Confirmed => "confirmed",
        }
    }
}

impl fmt::Display for PublishPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublishPhase::Idle => "待机",
            PublishPhase::SessionReady => "会话就绪",
            PublishPhase::Navigated => "已进入写作页",
            PublishPhase::TitleSet => "标题已输入",
            PublishPhase::ImageAttached => "配图已上传",
            PublishPhase::BodySet => "正文已输入",
            PublishPhase::Submitted => "已提交",
            PublishPhase::Confirmed => "已确认",
        };
        write!(f, "{}", name)
    }
}

/// 一次发布任务的输入
#[derive(Debug, Clone)]
pub struct PublishJob {
    pub sequence: u32,
    pub title: String,
    pub body: String,
    pub image_path: Option<PathBuf>,
}

/// 发布成功的报告
#[derive(Debug, Clone)]
pub struct PublishReport {
    /// 文章 URL（尽力提取，缺失不降级）
    pub url: Option<String>,
    /// 配图是否真正上传成功
    pub image_attached: bool,
}

/// 自动化执行器
///
/// 职责：
/// - 会话准备（复用登录态，必要时走登录子流程）
/// - 按状态机次序驱动写作页
/// - 失败时抓诊断截图
/// - 不读写台账，不发通知
pub struct AutomationExecutor {
    config: Config,
    targets: EditorTargets,
}

impl AutomationExecutor {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            targets: EditorTargets::naver_defaults(),
        }
    }

    /// 为一个回目执行完整的发布交互
    pub async fn publish(&self, job: &PublishJob) -> Result<PublishReport, PublishError> {
        let session = BrowserSession::launch(&self.config)
            .await
            .map_err(PublishError::unclassified)?;
        let driver = PageDriver::new(session.page().clone());

        let mut phase = PublishPhase::Idle;
        let result = self.drive(&driver, job, &mut phase).await;

        if result.is_err() {
            self.capture_diagnostics(&driver, job, phase).await;
        }

        // 成功失败都释放会话，不泄漏
        session.close().await;
        result
    }

    /// 状态机主干
    async fn drive(
        &self,
        driver: &PageDriver,
        job: &PublishJob,
        phase: &mut PublishPhase,
    ) -> Result<PublishReport, PublishError> {
        self.ensure_session(driver).await?;
        self.advance(phase, PublishPhase::SessionReady);

        self.open_editor(driver).await?;
        self.advance(phase, PublishPhase::Navigated);

        self.dismiss_help_panel(driver).await;

        info!("📝 输入标题中...");
        self.fill_target(driver, &self.targets.title, &job.title).await?;
        self.advance(phase, PublishPhase::TitleSet);

        let image_attached = match &job.image_path {
            Some(path) => match self.attach_image(driver, path).await {
                Ok(()) => {
                    self.advance(phase, PublishPhase::ImageAttached);
                    true
                }
                Err(e) => {
                    // 非致命：降级为无图发布
                    warn!("⚠️ {}，继续无图发布", e);
                    false
                }
            },
            None => false,
        };

        info!("📝 输入正文中...");
        self.fill_body(driver, &job.body).await?;
        self.advance(phase, PublishPhase::BodySet);

        info!("🚀 触发发布...");
        self.click_target(driver, &self.targets.publish_button).await?;
        self.advance(phase, PublishPhase::Submitted);

        self.confirm_if_present(driver).await;

        // 提交后的固定沉降间隔，等待目标站点完成跳转
        sleep(Duration::from_secs(self.config.settle_secs)).await;

        let url = self.extract_post_url(driver).await;
        self.advance(phase, PublishPhase::Confirmed);

        Ok(PublishReport { url, image_attached })
    }

    // ========== 会话与导航 ==========

    /// 准备已登录的会话
    ///
    /// 持久化用户数据目录通常能直接复用登录态；被跳到登录页时
    /// 走一次登录子流程，再次被跳回即认定会话不可恢复。
    async fn ensure_session(&self, driver: &PageDriver) -> Result<(), PublishError> {
        let editor_url = self.config.editor_url();
        self.goto_bounded(driver, &editor_url).await?;

        if is_login_surface(&self.current_url(driver).await?) {
            info!("🔐 检测到登录墙，进入登录子流程");
            self.login(driver).await?;

            self.goto_bounded(driver, &editor_url).await?;
            if is_login_surface(&self.current_url(driver).await?) {
                return Err(PublishError::AuthLost);
            }
        }

        Ok(())
    }

    /// 登录子流程
    ///
    /// 填入凭证并提交后进入有界等待：窗口内每隔几秒检查一次是否已
    /// 离开登录页。窗口拉得很长，留给人工处理验证码的余地。
    async fn login(&self, driver: &PageDriver) -> Result<(), PublishError> {
        if self.config.naver_id.is_empty() || self.config.naver_password.is_empty() {
            return Err(PublishError::unclassified(ConfigError::MissingSecret {
                var_name: "NAVER_LOGIN_ID / NAVER_LOGIN_PASSWORD".to_string(),
            }));
        }

        if !is_login_surface(&self.current_url(driver).await?) {
            self.goto_bounded(driver, LOGIN_URL).await?;
        }

        let id_sel = self.resolve_selector(driver, &self.targets.login_id).await?;
        let pw_sel = self.resolve_selector(driver, &self.targets.login_password).await?;
        driver
            .type_into(&id_sel, &self.config.naver_id)
            .await
            .map_err(PublishError::unclassified)?;
        driver
            .type_into(&pw_sel, &self.config.naver_password)
            .await
            .map_err(PublishError::unclassified)?;

        self.click_target(driver, &self.targets.login_submit).await?;

        let waited = Duration::from_secs(self.config.login_timeout_secs);
        let poll = Duration::from_secs(self.config.login_poll_secs.max(1));
        let deadline = tokio::time::Instant::now() + waited;

        info!(
            "⏳ 等待登录完成（最长 {} 秒，可人工处理验证码）...",
            self.config.login_timeout_secs
        );
        loop {
            if !is_login_surface(&self.current_url(driver).await?) {
                info!("✓ 登录完成");
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(PublishError::LoginTimeout {
                    waited_secs: self.config.login_timeout_secs,
                });
            }
            sleep(poll).await;
        }
    }

    /// 打开写作页并等编辑器就位
    async fn open_editor(&self, driver: &PageDriver) -> Result<(), PublishError> {
        let editor_url = self.config.editor_url();
        let current = self.current_url(driver).await?;
        if !current.starts_with(&editor_url) {
            self.goto_bounded(driver, &editor_url).await?;
        }

        // 编辑器渲染完成的观测条件：标题目标的任一候选可见
        let probe = self.probe(driver);
        let editor_wait = Duration::from_secs(self.config.nav_timeout_secs);
        let per_candidate = editor_wait / self.targets.title.candidates.len().max(1) as u32;
        for candidate in &self.targets.title.candidates {
            if probe.wait_visible(candidate, per_candidate).await {
                info!("✓ 写作页就绪");
                return Ok(());
            }
        }

        // 候选全部未出现也继续走（坐标兜底仍可能成功），只记告警
        warn!("⚠️ 未观测到编辑器渲染完成，继续尝试");
        Ok(())
    }

    /// 有界导航
    async fn goto_bounded(&self, driver: &PageDriver, url: &str) -> Result<(), PublishError> {
        let timeout = Duration::from_secs(self.config.nav_timeout_secs);
        match tokio::time::timeout(timeout, driver.goto(url)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PublishError::unclassified(e)),
            Err(_) => Err(PublishError::NavigationTimeout {
                url: url.to_string(),
            }),
        }
    }

    // ========== 字段填充 ==========

    /// 帮助面板只在首次进入时出现，关不掉也无妨
    async fn dismiss_help_panel(&self, driver: &PageDriver) {
        let probe = self.probe(driver);
        let short_wait = Duration::from_millis(self.config.candidate_wait_ms);
        match resolve(&self.targets.help_close, &probe, short_wait).await {
            Ok(Resolved::Selector(sel)) => {
                if driver.click(&sel).await.is_ok() {
                    debug!("✓ 帮助面板已关闭");
                }
            }
            Ok(Resolved::Point(_, _)) | Err(_) => {
                debug!("未检测到帮助面板");
            }
        }
    }

    /// 解析目标并填入单行文本（标题等）
    async fn fill_target(
        &self,
        driver: &PageDriver,
        target: &UiTarget,
        text: &str,
    ) -> Result<(), PublishError> {
        self.activate_target(driver, target).await?;
        driver
            .insert_text(text)
            .await
            .map_err(PublishError::unclassified)?;
        Ok(())
    }

    /// 正文逐行输入，行间回车（编辑器把回车当作换段）
    async fn fill_body(&self, driver: &PageDriver, body: &str) -> Result<(), PublishError> {
        self.activate_target(driver, &self.targets.body).await?;

        let lines: Vec<&str> = body.split('\n').collect();
        let total = lines.len();
        for (i, line) in lines.iter().enumerate() {
            if !line.trim().is_empty() {
                driver
                    .insert_text(line)
                    .await
                    .map_err(PublishError::unclassified)?;
            }
            if i < total - 1 {
                driver
                    .press_enter()
                    .await
                    .map_err(PublishError::unclassified)?;
            }
        }
        Ok(())
    }

    /// 解析目标并点击激活（选择器命中则点元素，否则点坐标）
    async fn activate_target(
        &self,
        driver: &PageDriver,
        target: &UiTarget,
    ) -> Result<(), PublishError> {
        let probe = self.probe(driver);
        let wait = Duration::from_millis(self.config.candidate_wait_ms);
        match resolve(target, &probe, wait).await? {
            Resolved::Selector(sel) => driver.click(&sel).await.map_err(PublishError::unclassified)?,
            Resolved::Point(x, y) => driver.click_at(x, y).await.map_err(PublishError::unclassified)?,
        }
        // 焦点落位的短暂沉降
        sleep(Duration::from_millis(300)).await;
        Ok(())
    }

    /// 解析目标并点击（不要求后续输入焦点）
    async fn click_target(
        &self,
        driver: &PageDriver,
        target: &UiTarget,
    ) -> Result<(), PublishError> {
        let probe = self.probe(driver);
        let wait = Duration::from_millis(self.config.candidate_wait_ms);
        match resolve(target, &probe, wait).await? {
            Resolved::Selector(sel) => driver.click(&sel).await.map_err(PublishError::unclassified)?,
            Resolved::Point(x, y) => driver.click_at(x, y).await.map_err(PublishError::unclassified)?,
        }
        Ok(())
    }

    /// 只接受选择器命中的解析（输入框不适用坐标兜底）
    async fn resolve_selector(
        &self,
        driver: &PageDriver,
        target: &UiTarget,
    ) -> Result<String, PublishError> {
        let probe = self.probe(driver);
        let wait = Duration::from_millis(self.config.candidate_wait_ms);
        match resolve(target, &probe, wait).await? {
            Resolved::Selector(sel) => Ok(sel),
            Resolved::Point(_, _) => Err(PublishError::TargetNotFound {
                target: target.name.to_string(),
            }),
        }
    }

    // ========== 图片上传（非致命） ==========

    /// 上传配图
    ///
    /// 任何一步失败都折叠为 UploadFailure，由调用方降级为无图发布。
    async fn attach_image(&self, driver: &PageDriver, path: &Path) -> Result<(), PublishError> {
        info!("🖼️ 上传配图: {}", path.display());

        self.click_target(driver, &self.targets.photo_button)
            .await
            .map_err(|e| PublishError::UploadFailure {
                detail: e.to_string(),
            })?;
        sleep(Duration::from_millis(500)).await;

        driver
            .attach_file(FILE_INPUT, path)
            .await
            .map_err(|e| PublishError::UploadFailure {
                detail: e.to_string(),
            })?;

        // 上传完成的观测条件：编辑器里出现图片组件
        let uploaded = driver
            .wait_visible(
                ".se-main-container img, .se-component.se-image",
                Duration::from_secs(self.config.upload_wait_secs),
                Duration::from_millis(self.config.visibility_poll_ms),
            )
            .await;
        if !uploaded {
            return Err(PublishError::UploadFailure {
                detail: format!("{} 秒内未观测到图片组件", self.config.upload_wait_secs),
            });
        }

        info!("✓ 配图上传完成");
        Ok(())
    }

    // ========== 提交与确认 ==========

    /// 二次确认步骤只在部分编辑器形态出现，未检测到就跳过
    async fn confirm_if_present(&self, driver: &PageDriver) {
        let probe = self.probe(driver);
        let wait = Duration::from_millis(self.config.candidate_wait_ms);
        match resolve(&self.targets.confirm_button, &probe, wait).await {
            Ok(Resolved::Selector(sel)) => {
                if driver.click(&sel).await.is_ok() {
                    info!("✓ 最终确认按钮已点击 ({})", sel);
                }
            }
            Ok(Resolved::Point(_, _)) | Err(_) => {
                debug!("未检测到二次确认按钮");
            }
        }
    }

    /// 尽力提取发布后的文章 URL（缺失不降级）
    async fn extract_post_url(&self, driver: &PageDriver) -> Option<String> {
        let url = self.current_url(driver).await.ok()?;
        if is_post_url(&url, &self.config.blog_id) {
            info!("🔗 文章地址: {}", url);
            Some(url)
        } else {
            info!("文章地址未能提取（不影响发布结果）");
            None
        }
    }

    // ========== 辅助 ==========

    fn probe<'a>(&self, driver: &'a PageDriver) -> DriverProbe<'a> {
        DriverProbe {
            driver,
            poll: Duration::from_millis(self.config.visibility_poll_ms),
        }
    }

    async fn current_url(&self, driver: &PageDriver) -> Result<String, PublishError> {
        driver.current_url().await.map_err(PublishError::unclassified)
    }

    fn advance(&self, phase: &mut PublishPhase, next: PublishPhase) {
        debug!("状态迁移: {} → {}", phase, next);
        *phase = next;
    }

    /// 失败诊断截图（纯副作用，不影响结果分类）
    async fn capture_diagnostics(&self, driver: &PageDriver, job: &PublishJob, phase: PublishPhase) {
        if let Err(e) = std::fs::create_dir_all(&self.config.screenshot_dir) {
            warn!("⚠️ 无法创建截图目录: {}", e);
            return;
        }

        let file_name = format!(
            "ep{:02}-{}-{}.png",
            job.sequence,
            phase.slug(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        let path = Path::new(&self.config.screenshot_dir).join(file_name);

        match driver.save_screenshot(&path).await {
            Ok(()) => info!("📸 诊断截图已保存: {}", path.display()),
            Err(e) => warn!("⚠️ 诊断截图失败: {}", e),
        }
    }
}

/// 是否处于登录页（含登录墙跳转）
fn is_login_surface(url: &str) -> bool {
    url.contains("nid.naver.com")
}

/// 是否是一篇已发布文章的 URL
fn is_post_url(url: &str, blog_id: &str) -> bool {
    if !url.contains(blog_id) || url.contains("postwrite") {
        return false;
    }
    if url.contains("logNo=") {
        return true;
    }
    // 路径式地址：https://blog.naver.com/<blog_id>/<数字>
    url.rsplit('/')
        .next()
        .map(|tail| !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
