use daily_blog_publish::browser::BrowserSession;
use daily_blog_publish::models::{Episode, EpisodeCatalog};
use daily_blog_publish::services::{ContentTransformer, PublicationLedger};
use daily_blog_publish::utils::logging;
use daily_blog_publish::Config;

fn episode(sequence: u32) -> Episode {
    Episode {
        sequence,
        content: format!("ep{:02}-test.md", sequence),
        image: Some(format!("ep{:02}-test.jpg", sequence)),
    }
}

fn ten_episode_catalog() -> EpisodeCatalog {
    EpisodeCatalog::new((1..=10).map(episode).collect()).unwrap()
}

/// 台账场景：已发布至第 3 回 → 下一个待发布是第 4 回，
/// 第 4 回成功后计数器推进且历史记录携带 URL
#[test]
fn ledger_scenario_episode_four_success() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = PublicationLedger::new(dir.path().join("publish-status.json"), 0);
    let catalog = ten_episode_catalog();

    // 先把前 3 回发布完
    let mut state = ledger.load();
    for seq in 1..=3 {
        let ep = catalog.get(seq).unwrap();
        state = ledger.record_success(state, ep, None).unwrap();
    }
    assert_eq!(state.last_published_sequence, 3);

    // 下一个待发布回目
    let next = ledger.next_eligible(&state, &catalog).unwrap().clone();
    assert_eq!(next.sequence, 4);

    // 第 4 回发布成功
    let state = ledger
        .record_success(state, &next, Some("https://example.com/post/99".to_string()))
        .unwrap();
    assert_eq!(state.last_published_sequence, 4);

    let last = state.history.last().unwrap();
    assert_eq!(last.episode, 4);
    assert!(last.success);
    assert_eq!(last.url.as_deref(), Some("https://example.com/post/99"));

    // 重启后仍然一致
    let reloaded = ledger.load();
    assert_eq!(reloaded.last_published_sequence, 4);
    assert_eq!(reloaded.history.len(), 4);
}

/// 失败后计数器不动，同一回目保持待发布（下一轮调度重试）
#[test]
fn ledger_scenario_failure_keeps_episode_eligible() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = PublicationLedger::new(dir.path().join("publish-status.json"), 3);
    let catalog = ten_episode_catalog();

    let state = ledger.load();
    let next = ledger.next_eligible(&state, &catalog).unwrap().clone();
    assert_eq!(next.sequence, 4);

    let state = ledger
        .record_failure(state, &next, "登录超时: 等待 180 秒后仍未通过登录页")
        .unwrap();

    assert_eq!(state.last_published_sequence, 3);
    assert_eq!(ledger.next_eligible(&state, &catalog).unwrap().sequence, 4);
}

/// 系列完结：计数器到达清单末尾后不再有待发布回目
#[test]
fn ledger_scenario_series_complete() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = PublicationLedger::new(dir.path().join("publish-status.json"), 10);
    let catalog = ten_episode_catalog();

    let state = ledger.load();
    assert!(ledger.next_eligible(&state, &catalog).is_none());
}

/// 正文转换：标题、标签、排版符号一次到位
#[test]
fn transformer_end_to_end() {
    let transformer = ContentTransformer::new().unwrap();
    let markdown = "# 1회차: AI 마케팅 시작하기\n\n\
                    ## 왜 지금인가\n\n\
                    - 비용 절감\n\
                    - **시간** 절약\n\n\
                    자세한 내용은 [여기](https://example.com)를 참고하세요.\n\n\
                    *#소상공인 #AI마케팅*";

    let content = transformer.convert(markdown);

    assert_eq!(content.title, "1회차: AI 마케팅 시작하기");
    assert!(content.body.contains("■ 왜 지금인가"));
    assert!(content.body.contains("• 비용 절감"));
    assert!(content.body.contains("시간 절약"));
    assert!(content.body.contains("여기 (https://example.com)"));
    assert!(content.body.ends_with("#소상공인 #AI마케팅"));
    assert!(!content.body.contains("# 1회차"));
}

#[tokio::test]
#[ignore] // 默认忽略，需要本机浏览器：cargo test -- --ignored
async fn test_browser_session_launch() {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 启动并关闭一次会话，验证没有资源泄漏
    let session = BrowserSession::launch(&config)
        .await
        .expect("启动浏览器失败");
    session.close().await;
}

#[tokio::test]
#[ignore] // 需要浏览器 + NAVER 凭证 + 真实文章目录
async fn test_publish_specific_episode() {
    use daily_blog_publish::orchestrator::App;

    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    let app = App::initialize(config).await.expect("初始化应用失败");

    // 注意：请根据实际情况修改回目序号
    let outcome = app.publish_now(1).await.expect("发布失败");
    println!("发布结果: {:?}", outcome);
}
