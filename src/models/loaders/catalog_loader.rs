use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::fs;

use crate::models::{Episode, EpisodeCatalog};

/// 回目清单文件结构
///
/// ```toml
/// [[episodes]]
/// sequence = 1
/// content = "ep01-intro.md"
/// image = "ep01-intro.jpg"
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    episodes: Vec<Episode>,
}

/// 从 TOML 文件加载回目清单
pub async fn load_catalog(catalog_path: impl AsRef<Path>) -> Result<EpisodeCatalog> {
    let path = catalog_path.as_ref();

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取回目清单: {}", path.display()))?;

    let file: CatalogFile = toml::from_str(&content)
        .with_context(|| format!("无法解析回目清单: {}", path.display()))?;

    if file.episodes.is_empty() {
        anyhow::bail!("回目清单为空: {}", path.display());
    }

    let catalog = EpisodeCatalog::new(file.episodes)?;
    tracing::info!("✓ 已加载 {} 个回目", catalog.len());

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn loads_catalog_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[[episodes]]
sequence = 2
content = "ep02-tools.md"
image = "ep02-tools.jpg"

[[episodes]]
sequence = 1
content = "ep01-intro.md"
"#
        )
        .unwrap();

        let catalog = load_catalog(file.path()).await.unwrap();
        assert_eq!(catalog.len(), 2);
        // 乱序写入也按序号排列
        assert_eq!(catalog.iter().next().unwrap().sequence, 1);
        assert_eq!(catalog.get(2).unwrap().image.as_deref(), Some("ep02-tools.jpg"));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let result = load_catalog("no-such-catalog.toml").await;
        assert!(result.is_err());
    }
}
