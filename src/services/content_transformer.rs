//! 正文转换服务 - 业务能力层
//!
//! 将 markdown 原文转换为博客编辑器可直接输入的纯文本格式。
//! 纯函数能力：同样的输入永远得到同样的输出，不访问网络和浏览器。

use anyhow::{Context, Result};
use regex::Regex;

/// 转换结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent {
    pub title: String,
    pub body: String,
}

/// 无法从正文提取标题时使用的占位标题
const FALLBACK_TITLE: &str = "제목 없음";

/// 正文转换服务
///
/// 职责：
/// - 提取标题（第一个 `# ` 一级标题）
/// - 提取文末 `*#标签*` 行并移到正文末尾
/// - 将 markdown 标记改写为博客排版符号（■ / •）
/// - 对任意输入都不报错（格式不合法时退化为占位标题）
pub struct ContentTransformer {
    title_re: Regex,
    hashtag_re: Regex,
    h2_re: Regex,
    h3_re: Regex,
    dash_list_re: Regex,
    star_list_re: Regex,
    bold_re: Regex,
    code_block_re: Regex,
    inline_code_re: Regex,
    link_re: Regex,
    rule_re: Regex,
    blank_re: Regex,
}

impl ContentTransformer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            title_re: Regex::new(r"(?m)^# (.+)$").context("标题正则编译失败")?,
            hashtag_re: Regex::new(r"(?m)^\*#.+\*\s*$").context("标签正则编译失败")?,
            h3_re: Regex::new(r"(?m)^### (.*)$").context("小标题正则编译失败")?,
            h2_re: Regex::new(r"(?m)^## (.*)$").context("小标题正则编译失败")?,
            dash_list_re: Regex::new(r"(?m)^- (.*)$").context("列表正则编译失败")?,
            star_list_re: Regex::new(r"(?m)^\* (.*)$").context("列表正则编译失败")?,
            bold_re: Regex::new(r"\*\*(.*?)\*\*").context("粗体正则编译失败")?,
            code_block_re: Regex::new(r"(?s)```.*?```").context("代码块正则编译失败")?,
            inline_code_re: Regex::new(r"`([^`]+)`").context("行内代码正则编译失败")?,
            link_re: Regex::new(r"\[(.*?)\]\((.*?)\)").context("链接正则编译失败")?,
            rule_re: Regex::new(r"(?m)^---$").context("分隔线正则编译失败")?,
            blank_re: Regex::new(r"\n{3,}").context("空行正则编译失败")?,
        })
    }

    /// markdown → {标题, 正文}
    pub fn convert(&self, markdown: &str) -> PostContent {
        let mut text = markdown.to_string();

        // 标题：第一个一级标题，缺失时用占位标题
        let title = self
            .title_re
            .captures(&text)
            .map(|caps| caps[1].trim().to_string())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        text = self.title_re.replace(&text, "").trim().to_string();

        // 文末标签行：先摘出，最后追加到正文末尾
        let hashtags = self
            .hashtag_re
            .find(&text)
            .map(|m| m.as_str().replace('*', "").trim().to_string());
        text = self.hashtag_re.replace(&text, "").trim().to_string();

        // 标记改写
        text = self.h3_re.replace_all(&text, "■ $1").to_string();
        text = self.h2_re.replace_all(&text, "■ $1").to_string();
        text = self.dash_list_re.replace_all(&text, "• $1").to_string();
        text = self.star_list_re.replace_all(&text, "• $1").to_string();
        text = self.bold_re.replace_all(&text, "$1").to_string();
        // 代码块只去掉围栏，保留内容
        text = self
            .code_block_re
            .replace_all(&text, |caps: &regex::Captures<'_>| {
                caps[0].replace("```", "").trim().to_string()
            })
            .to_string();
        text = self.inline_code_re.replace_all(&text, "$1").to_string();
        text = self.link_re.replace_all(&text, "$1 ($2)").to_string();
        text = self.rule_re.replace_all(&text, "").to_string();
        text = self.blank_re.replace_all(&text, "\n\n").trim().to_string();

        if let Some(tags) = hashtags {
            text.push_str("\n\n");
            text.push_str(&tags);
        }

        PostContent { title, body: text }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transformer() -> ContentTransformer {
        ContentTransformer::new().unwrap()
    }

    #[test]
    fn extracts_first_h1_as_title() {
        let content = transformer().convert("# 소상공인을 위한 AI 마케팅\n\n본문입니다.");
        assert_eq!(content.title, "소상공인을 위한 AI 마케팅");
        assert_eq!(content.body, "본문입니다.");
    }

    #[test]
    fn falls_back_to_placeholder_title() {
        let content = transformer().convert("본문만 있는 문서");
        assert_eq!(content.title, "제목 없음");
        assert_eq!(content.body, "본문만 있는 문서");
    }

    #[test]
    fn moves_hashtag_line_to_tail() {
        let content = transformer().convert("# 제목\n\n본문\n\n*#마케팅 #AI*");
        assert!(content.body.ends_with("#마케팅 #AI"));
        assert!(!content.body.contains('*'));
    }

    #[test]
    fn rewrites_headings_and_lists() {
        let md = "# 제목\n\n## 소제목\n\n### 더 작은 제목\n\n- 항목 하나\n* 항목 둘";
        let content = transformer().convert(md);
        assert!(content.body.contains("■ 소제목"));
        assert!(content.body.contains("■ 더 작은 제목"));
        assert!(content.body.contains("• 항목 하나"));
        assert!(content.body.contains("• 항목 둘"));
    }

    #[test]
    fn strips_bold_code_and_rewrites_links() {
        let md = "# t\n\n**굵게** 그리고 `코드` 그리고 [네이버](https://naver.com)";
        let content = transformer().convert(md);
        assert_eq!(content.body, "굵게 그리고 코드 그리고 네이버 (https://naver.com)");
    }

    #[test]
    fn unwraps_fenced_code_blocks() {
        let md = "# t\n\n```\nlet x = 1;\n```";
        let content = transformer().convert(md);
        assert!(content.body.contains("let x = 1;"));
        assert!(!content.body.contains("```"));
    }

    #[test]
    fn removes_rules_and_collapses_blank_lines() {
        let md = "# t\n\n첫 줄\n\n---\n\n\n\n둘째 줄";
        let content = transformer().convert(md);
        assert!(!content.body.contains("---"));
        assert!(!content.body.contains("\n\n\n"));
        assert!(content.body.contains("첫 줄"));
        assert!(content.body.contains("둘째 줄"));
    }

    #[test]
    fn conversion_is_deterministic() {
        let t = transformer();
        let md = "# 제목\n\n## 절\n\n- 하나\n\n*#태그*";
        assert_eq!(t.convert(md), t.convert(md));
    }
}
