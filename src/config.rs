/// 程序配置
///
/// 凭证类字段（NAVER 账号、Telegram Token）没有内置默认值，
/// 必须通过环境变量在进程启动时注入。
#[derive(Clone, Debug)]
pub struct Config {
    // --- 目标博客 ---
    /// 博客 ID（blog.naver.com/<blog_id>）
    pub blog_id: String,
    /// 文章目录（markdown 与 images/ 子目录所在位置）
    pub posts_dir: String,
    /// 回目清单文件（TOML）
    pub catalog_file: String,
    /// 发布台账文件（JSON）
    pub status_file: String,
    /// 台账初始序号（默认 0，即从第 1 回开始）
    pub start_sequence: u32,
    // --- 浏览器 ---
    /// 是否无头运行（默认显示窗口，便于人工处理验证码）
    pub headless: bool,
    /// 浏览器可执行文件路径（为空则使用 chromiumoxide 自动探测）
    pub chrome_executable: Option<String>,
    /// 持久化用户数据目录（复用已登录会话的关键）
    pub user_data_dir: String,
    // --- 凭证（无默认值） ---
    pub naver_id: String,
    pub naver_password: String,
    // --- 调度 ---
    /// 每日发布时刻（小时，本地时间）
    pub publish_hour: u32,
    /// 每日发布时刻（分钟）
    pub publish_minute: u32,
    // --- 超时与轮询 ---
    /// 单次导航超时（秒）
    pub nav_timeout_secs: u64,
    /// 登录等待窗口（秒），窗口内每隔 login_poll_secs 轮询一次
    pub login_timeout_secs: u64,
    pub login_poll_secs: u64,
    /// 单个候选选择器的可见性等待（毫秒）
    pub candidate_wait_ms: u64,
    /// 可见性轮询间隔（毫秒）
    pub visibility_poll_ms: u64,
    /// 发布提交后的固定沉降间隔（秒），之后尝试提取文章 URL
    pub settle_secs: u64,
    /// 图片上传完成的等待上限（秒）
    pub upload_wait_secs: u64,
    // --- 通知（Token 无默认值） ---
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    // --- 诊断 ---
    /// 失败截图输出目录
    pub screenshot_dir: String,
    /// 运行日志文件
    pub output_log_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            blog_id: "smartrupy".to_string(),
            posts_dir: "posts/special-small-business-marketing".to_string(),
            catalog_file: "posts/special-small-business-marketing/episodes.toml".to_string(),
            status_file: "posts/special-small-business-marketing/publish-status.json".to_string(),
            start_sequence: 0,
            headless: false,
            chrome_executable: None,
            user_data_dir: ".browser-profile".to_string(),
            naver_id: String::new(),
            naver_password: String::new(),
            publish_hour: 9,
            publish_minute: 0,
            nav_timeout_secs: 30,
            login_timeout_secs: 180,
            login_poll_secs: 2,
            candidate_wait_ms: 2000,
            visibility_poll_ms: 200,
            settle_secs: 5,
            upload_wait_secs: 10,
            telegram_bot_token: String::new(),
            telegram_chat_id: String::new(),
            screenshot_dir: "screenshots".to_string(),
            output_log_file: "output.txt".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            blog_id: std::env::var("NAVER_BLOG_ID").unwrap_or(default.blog_id),
            posts_dir: std::env::var("POSTS_DIR").unwrap_or(default.posts_dir),
            catalog_file: std::env::var("CATALOG_FILE").unwrap_or(default.catalog_file),
            status_file: std::env::var("STATUS_FILE").unwrap_or(default.status_file),
            start_sequence: std::env::var("START_SEQUENCE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.start_sequence),
            headless: std::env::var("HEADLESS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.headless),
            chrome_executable: std::env::var("CHROME_EXECUTABLE").ok(),
            user_data_dir: std::env::var("USER_DATA_DIR").unwrap_or(default.user_data_dir),
            naver_id: std::env::var("NAVER_LOGIN_ID").unwrap_or_default(),
            naver_password: std::env::var("NAVER_LOGIN_PASSWORD").unwrap_or_default(),
            publish_hour: std::env::var("PUBLISH_HOUR").ok().and_then(|v| v.parse().ok()).unwrap_or(default.publish_hour),
            publish_minute: std::env::var("PUBLISH_MINUTE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.publish_minute),
            nav_timeout_secs: std::env::var("NAV_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.nav_timeout_secs),
            login_timeout_secs: std::env::var("LOGIN_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.login_timeout_secs),
            login_poll_secs: std::env::var("LOGIN_POLL_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.login_poll_secs),
            candidate_wait_ms: std::env::var("CANDIDATE_WAIT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.candidate_wait_ms),
            visibility_poll_ms: std::env::var("VISIBILITY_POLL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.visibility_poll_ms),
            settle_secs: std::env::var("SETTLE_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.settle_secs),
            upload_wait_secs: std::env::var("UPLOAD_WAIT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.upload_wait_secs),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").unwrap_or_default(),
            screenshot_dir: std::env::var("SCREENSHOT_DIR").unwrap_or(default.screenshot_dir),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 写作页 URL
    pub fn editor_url(&self) -> String {
        format!("https://blog.naver.com/{}/postwrite", self.blog_id)
    }

    /// 博客首页 URL（通知中 URL 提取失败时的兜底链接）
    pub fn blog_url(&self) -> String {
        format!("https://blog.naver.com/{}", self.blog_id)
    }
}
