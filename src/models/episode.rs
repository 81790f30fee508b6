use std::path::PathBuf;

use anyhow::Result;
use serde::Deserialize;

/// 单个回目（系列中的一期内容）
///
/// 程序启动时从回目清单加载，进程生命周期内只读。
#[derive(Debug, Clone, Deserialize)]
pub struct Episode {
    /// 序号（1..N，唯一且全序）
    pub sequence: u32,
    /// 正文 markdown 文件名（相对文章目录）
    pub content: String,
    /// 配图文件名（相对文章目录下的 images/，可选）
    pub image: Option<String>,
}

impl Episode {
    /// 正文文件完整路径
    pub fn content_path(&self, posts_dir: &str) -> PathBuf {
        PathBuf::from(posts_dir).join(&self.content)
    }

    /// 配图文件完整路径（未配置配图时为 None）
    pub fn image_path(&self, posts_dir: &str) -> Option<PathBuf> {
        self.image
            .as_ref()
            .map(|img| PathBuf::from(posts_dir).join("images").join(img))
    }
}

/// 回目清单
///
/// 内部按序号升序排列，序号必须唯一。
#[derive(Debug, Clone)]
pub struct EpisodeCatalog {
    episodes: Vec<Episode>,
}

impl EpisodeCatalog {
    /// 从回目列表构建清单，校验序号唯一并排序
    pub fn new(mut episodes: Vec<Episode>) -> Result<Self> {
        episodes.sort_by_key(|e| e.sequence);

        for pair in episodes.windows(2) {
            if pair[0].sequence == pair[1].sequence {
                anyhow::bail!("回目序号重复: {}", pair[0].sequence);
            }
        }

        Ok(Self { episodes })
    }

    /// 按序号查找回目
    pub fn get(&self, sequence: u32) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.sequence == sequence)
    }

    /// 回目总数
    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    /// 最大序号（空清单为 0）
    pub fn last_sequence(&self) -> u32 {
        self.episodes.last().map(|e| e.sequence).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Episode> {
        self.episodes.iter()
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

    #[test]
    fn catalog_sorts_by_sequence() {
        let catalog = EpisodeCatalog::new(vec![episode(3), episode(1), episode(2)]).unwrap();
        let sequences: Vec<u32> = catalog.iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2, 3]);
        assert_eq!(catalog.last_sequence(), 3);
    }

    #[test]
    fn catalog_rejects_duplicate_sequence() {
        let result = EpisodeCatalog::new(vec![episode(1), episode(1)]);
        assert!(result.is_err());
    }

    #[test]
    fn image_path_is_under_images_dir() {
        let ep = Episode {
            sequence: 1,
            content: "ep01-intro.md".to_string(),
            image: Some("ep01-intro.jpg".to_string()),
        };
        let path = ep.image_path("posts").unwrap();
        assert!(path.ends_with("images/ep01-intro.jpg"));
        assert!(episode(2).image_path("posts").is_none());
    }
}
