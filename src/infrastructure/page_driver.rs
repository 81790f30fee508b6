//! 页面驱动器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"操作页面"的能力：
//! 执行 JS、导航、点击、输入、截图。
//! 不认识 Episode / Ledger，不处理业务流程。

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::cdp::browser_protocol::dom::SetFileInputFilesParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams, DispatchMouseEventType,
    InsertTextParams, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// 页面驱动器
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 暴露 eval / 导航 / 交互 / 截图能力
/// - 所有等待都是有界轮询，不挂死
pub struct PageDriver {
    page: Page,
}

impl PageDriver {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 执行 JS 代码并反序列化为指定类型
    pub async fn eval_as<T: DeserializeOwned>(&self, js_code: impl Into<String>) -> Result<T> {
        let json_value = self.eval(js_code).await?;
        let typed_value = serde_json::from_value(json_value)?;
        Ok(typed_value)
    }

    /// 导航到指定 URL（调用方负责加超时界限）
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    /// 当前页面 URL（取不到时返回空串）
    pub async fn current_url(&self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    /// 判断选择器对应元素当前是否可见
    pub async fn is_visible(&self, selector: &str) -> Result<bool> {
        let js_code = format!(
            r#"
            (() => {{
                const el = document.querySelector({});
                if (!el) return false;
                const rect = el.getBoundingClientRect();
                const style = window.getComputedStyle(el);
                return rect.width > 0 && rect.height > 0
                    && style.visibility !== 'hidden'
                    && style.display !== 'none';
            }})()
            "#,
            serde_json::to_string(selector)?
        );
        self.eval_as::<bool>(js_code).await
    }

    /// 有界等待元素可见
    ///
    /// 在 `timeout` 窗口内每隔 `poll` 检查一次；超时返回 false，
    /// 检查过程中的错误按不可见处理。
    pub async fn wait_visible(&self, selector: &str, timeout: Duration, poll: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_visible(selector).await.unwrap_or(false) {
                return true;
            }
            if Instant::now() >= deadline {
                debug!("元素在 {:?} 内未出现: {}", timeout, selector);
                return false;
            }
            sleep(poll).await;
        }
    }

    /// 点击选择器对应的元素
    pub async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("找不到元素: {}", selector))?;
        element
            .click()
            .await
            .with_context(|| format!("点击元素失败: {}", selector))?;
        Ok(())
    }

    /// 点击元素并逐键输入文本（用于登录表单等普通输入框）
    pub async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("找不到元素: {}", selector))?;
        element.click().await?;
        element
            .type_str(text)
            .await
            .with_context(|| format!("向元素输入文本失败: {}", selector))?;
        Ok(())
    }

    /// 在指定坐标执行一次鼠标点击（坐标兜底交互）
    pub async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        let press = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MousePressed)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(anyhow::Error::msg)?;
        let release = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseReleased)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(anyhow::Error::msg)?;

        self.page.execute(press).await?;
        self.page.execute(release).await?;
        Ok(())
    }

    /// 向当前焦点位置插入文本（编辑器正文输入）
    pub async fn insert_text(&self, text: &str) -> Result<()> {
        self.page
            .execute(InsertTextParams {
                text: text.to_string(),
            })
            .await
            .context("插入文本失败")?;
        Ok(())
    }

    /// 向当前焦点位置发送一次回车
    pub async fn press_enter(&self) -> Result<()> {
        let down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key("Enter")
            .code("Enter")
            .text("\r")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .build()
            .map_err(anyhow::Error::msg)?;
        let up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .build()
            .map_err(anyhow::Error::msg)?;

        self.page.execute(down).await?;
        self.page.execute(up).await?;
        Ok(())
    }

    /// 为文件输入框设置待上传文件
    ///
    /// 文件输入框通常是隐藏元素，这里不做可见性等待。
    pub async fn attach_file(&self, selector: &str, file_path: &Path) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .with_context(|| format!("找不到文件输入框: {}", selector))?;

        self.page
            .execute(SetFileInputFilesParams {
                files: vec![file_path.display().to_string()],
                node_id: None,
                backend_node_id: Some(element.backend_node_id),
                object_id: None,
            })
            .await
            .with_context(|| format!("设置上传文件失败: {}", file_path.display()))?;
        Ok(())
    }

    /// 保存整页截图
    pub async fn save_screenshot(&self, output_path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page
            .save_screenshot(params, output_path)
            .await
            .with_context(|| format!("保存截图失败: {}", output_path.display()))?;
        Ok(())
    }
}
