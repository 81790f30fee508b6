//! 发布台账服务 - 业务能力层
//!
//! 只负责"记录发布进度"能力：加载、查询下一回目、落盘成功/失败记录。
//! 持久化是唯一的提交点 — 记录未落盘之前，下游（通知）一律视为未发生。

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::models::{Episode, EpisodeCatalog, LedgerState};

/// 发布台账服务
///
/// 职责：
/// - 加载/持久化 LedgerState（完整替换写，不产生半成品文件）
/// - 计算下一个待发布回目
/// - 不驱动浏览器，不发通知
pub struct PublicationLedger {
    status_file: PathBuf,
    start_sequence: u32,
}

impl PublicationLedger {
    pub fn new(status_file: impl Into<PathBuf>, start_sequence: u32) -> Self {
        Self {
            status_file: status_file.into(),
            start_sequence,
        }
    }

    /// 加载台账
    ///
    /// 永不硬失败：文件缺失或损坏时回退到初始状态并告警，
    /// 绝不让调度器因为台账问题崩溃。
    pub fn load(&self) -> LedgerState {
        match fs::read_to_string(&self.status_file) {
            Ok(content) => match serde_json::from_str::<LedgerState>(&content) {
                Ok(state) => {
                    debug!(
                        "台账已加载: 已发布至第 {} 回, 历史 {} 条",
                        state.last_published_sequence,
                        state.history.len()
                    );
                    state
                }
                Err(e) => {
                    warn!(
                        "⚠️ 台账文件损坏，回退到初始状态 ({}): {}",
                        self.status_file.display(),
                        e
                    );
                    LedgerState::initial(self.start_sequence)
                }
            },
            Err(_) => {
                debug!("台账文件不存在，使用初始状态");
                LedgerState::initial(self.start_sequence)
            }
        }
    }

    /// 下一个待发布回目
    ///
    /// 返回序号等于 `last_published_sequence + 1` 的回目；
    /// 不存在即系列完结。
    pub fn next_eligible<'a>(
        &self,
        state: &LedgerState,
        catalog: &'a EpisodeCatalog,
    ) -> Option<&'a Episode> {
        catalog.get(state.last_published_sequence + 1)
    }

    /// 落盘一条成功记录并推进计数器，返回新状态
    pub fn record_success(
        &self,
        state: LedgerState,
        episode: &Episode,
        url: Option<String>,
    ) -> Result<LedgerState, LedgerError> {
        let state = state.with_success(episode, url);
        self.persist(&state)?;
        Ok(state)
    }

    /// 落盘一条失败记录，计数器不变，返回新状态
    pub fn record_failure(
        &self,
        state: LedgerState,
        episode: &Episode,
        error: &str,
    ) -> Result<LedgerState, LedgerError> {
        let state = state.with_failure(episode, error);
        self.persist(&state)?;
        Ok(state)
    }

    /// 原子持久化：先写临时文件，再 rename 替换
    ///
    /// 读者要么看到旧的完整文件，要么看到新的完整文件。
    fn persist(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|source| LedgerError::SerializeFailed { source })?;

        let tmp_path = self.status_file.with_extension("json.tmp");

        fs::write(&tmp_path, json).map_err(|source| LedgerError::WriteFailed {
            path: tmp_path.display().to_string(),
            source,
        })?;

        fs::rename(&tmp_path, &self.status_file).map_err(|source| LedgerError::ReplaceFailed {
            path: self.status_file.display().to_string(),
            source,
        })?;

        debug!("台账已落盘: {}", self.status_file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(sequence: u32) -> Episode {
        Episode {
            sequence,
            content: format!("ep{:02}.md", sequence),
            image: None,
        }
    }

    fn catalog(n: u32) -> EpisodeCatalog {
        EpisodeCatalog::new((1..=n).map(episode).collect()).unwrap()
    }

    fn temp_ledger(start: u32) -> (tempfile::TempDir, PublicationLedger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = PublicationLedger::new(dir.path().join("publish-status.json"), start);
        (dir, ledger)
    }

    #[test]
    fn missing_file_falls_back_to_initial_state() {
        let (_dir, ledger) = temp_ledger(0);
        let state = ledger.load();
        assert_eq!(state.last_published_sequence, 0);
        assert!(state.history.is_empty());
    }

    #[test]
    fn corrupt_file_falls_back_to_initial_state() {
        let (dir, ledger) = temp_ledger(2);
        fs::write(dir.path().join("publish-status.json"), "{ not json !!").unwrap();

        let state = ledger.load();
        assert_eq!(state.last_published_sequence, 2);
        assert!(state.history.is_empty());
    }

    #[test]
    fn next_eligible_returns_episode_after_counter() {
        let (_dir, ledger) = temp_ledger(0);
        let catalog = catalog(10);

        let mut state = ledger.load();
        state.last_published_sequence = 3;

        let next = ledger.next_eligible(&state, &catalog).unwrap();
        assert_eq!(next.sequence, 4);
    }

    #[test]
    fn next_eligible_is_none_when_series_complete() {
        let (_dir, ledger) = temp_ledger(0);
        let catalog = catalog(10);

        let mut state = ledger.load();
        state.last_published_sequence = 10;

        assert!(ledger.next_eligible(&state, &catalog).is_none());
    }

    #[test]
    fn record_success_persists_and_survives_reload() {
        let (_dir, ledger) = temp_ledger(3);
        let state = ledger.load();

        let state = ledger
            .record_success(
                state,
                &episode(4),
                Some("https://example.com/post/99".to_string()),
            )
            .unwrap();
        assert_eq!(state.last_published_sequence, 4);

        // 模拟进程重启：从磁盘重新加载
        let reloaded = ledger.load();
        assert_eq!(reloaded.last_published_sequence, 4);
        assert_eq!(reloaded.history.len(), 1);
        assert_eq!(
            reloaded.history[0].url.as_deref(),
            Some("https://example.com/post/99")
        );
    }

    #[test]
    fn record_failure_persists_without_advancing() {
        let (_dir, ledger) = temp_ledger(3);
        let state = ledger.load();

        ledger.record_failure(state, &episode(4), "登录超时").unwrap();

        let reloaded = ledger.load();
        assert_eq!(reloaded.last_published_sequence, 3);
        assert_eq!(reloaded.history.len(), 1);
        assert!(!reloaded.history[0].success);

        // 失败的回目仍是下一个待发布回目
        let catalog = catalog(10);
        assert_eq!(ledger.next_eligible(&reloaded, &catalog).unwrap().sequence, 4);
    }

    #[test]
    fn counter_is_monotonic_across_operations() {
        let (_dir, ledger) = temp_ledger(0);
        let mut state = ledger.load();

        for seq in 1..=3 {
            state = ledger.record_success(state, &episode(seq), None).unwrap();
            assert_eq!(state.last_published_sequence, seq);
            // 每一步都从磁盘验证
            assert_eq!(ledger.load().last_published_sequence, seq);
        }

        // 手动补发旧回目不会倒退
        state = ledger.record_success(state, &episode(1), None).unwrap();
        assert_eq!(state.last_published_sequence, 3);
        assert_eq!(ledger.load().last_published_sequence, 3);
        assert_eq!(state.history.len(), 4);
    }

    #[test]
    fn persist_leaves_no_temp_residue() {
        let (dir, ledger) = temp_ledger(0);
        let state = ledger.load();
        ledger.record_success(state, &episode(1), None).unwrap();

        assert!(dir.path().join("publish-status.json").exists());
        assert!(!dir.path().join("publish-status.json.tmp").exists());
    }
}
