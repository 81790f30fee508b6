//! NAVER 博客编辑器的目标定位表
//!
//! 编辑器（SmartEditor ONE）的 DOM 结构随版本漂移，历史上出现过的
//! 形态都以候选选择器的形式保留在这里。新形态出现时在对应目标
//! 追加候选即可。

use crate::automation::selector::UiTarget;

/// 隐藏的文件输入框（不走可见性探测）
pub const FILE_INPUT: &str = "input[type=file]";

/// 写作页与登录页的全部逻辑目标
#[derive(Debug, Clone)]
pub struct EditorTargets {
    pub title: UiTarget,
    pub body: UiTarget,
    pub photo_button: UiTarget,
    pub publish_button: UiTarget,
    pub confirm_button: UiTarget,
    pub help_close: UiTarget,
    pub login_id: UiTarget,
    pub login_password: UiTarget,
    pub login_submit: UiTarget,
}

impl EditorTargets {
    pub fn naver_defaults() -> Self {
        Self {
            title: UiTarget::new(
                "标题输入框",
                &[
                    ".se-section-documentTitle .se-text-paragraph",
                    ".se-documentTitle .se-text-paragraph",
                    "textarea.se_editable",
                ],
            )
            .with_fallback(400.0, 250.0),
            body: UiTarget::new(
                "正文区域",
                &[
                    ".se-component.se-text .se-text-paragraph",
                    ".se-main-container .se-text-paragraph",
                    ".se_editArea",
                ],
            )
            .with_fallback(400.0, 400.0),
            photo_button: UiTarget::new(
                "照片按钮",
                &[
                    "button.se-image-toolbar-button",
                    "button[data-name=image]",
                    "button[data-log=\"dot.photo\"]",
                ],
            )
            .with_fallback(35.0, 75.0),
            publish_button: UiTarget::new(
                "发布按钮",
                &[
                    "button[class*=publish_btn]",
                    ".btn_publish",
                    "[class*=publish] button",
                ],
            )
            .with_fallback(1200.0, 25.0),
            confirm_button: UiTarget::new(
                "最终确认按钮",
                &[
                    "[data-testid=seOnePublishBtn]",
                    "[class*=confirm_btn]",
                    ".btn_ok",
                    ".btn_confirm",
                ],
            ),
            help_close: UiTarget::new(
                "帮助面板关闭按钮",
                &[
                    "button.se-help-panel-close-button",
                    "[aria-label=\"닫기\"]",
                    "button[class*=close]",
                ],
            ),
            login_id: UiTarget::new("登录账号输入框", &["#id", "input[name=id]"]),
            login_password: UiTarget::new("登录密码输入框", &["#pw", "input[name=pw]"]),
            login_submit: UiTarget::new(
                "登录按钮",
                &[".btn_login", "#log\\.login", "button[type=submit]"],
            ),
        }
    }
}
