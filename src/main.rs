use anyhow::{Context, Result};
use daily_blog_publish::orchestrator::App;
use daily_blog_publish::utils::logging;
use daily_blog_publish::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化应用
    let app = App::initialize(config).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        // 立即发布指定回目: daily_blog_publish now 2
        [cmd, episode] if cmd == "now" => {
            let sequence: u32 = episode.parse().context("回目序号必须是数字")?;
            app.publish_now(sequence).await?;
        }
        // 查看台账状态
        [cmd] if cmd == "status" => {
            app.status().await?;
        }
        // 默认：启动每日调度
        [] => {
            app.run_scheduler().await?;
        }
        _ => {
            eprintln!("用法: daily_blog_publish [now <回目序号> | status]");
            std::process::exit(1);
        }
    }

    Ok(())
}
