//! # 宿主能力接口
//!
//! ## 设计思路
//!
//! 控制器不继承任何面板基类，而是通过 `HostPanel` 这一窄接口使用宿主能力：
//! 读写隐藏字段、弹出提示、标记表单已修改、刷新预览、打开编辑器。
//!
//! 隐藏字段或预览元素可能尚未渲染，因此读写接口返回 `Option` / `bool`，
//! 控制器据此静默跳过依赖它们的操作。

use super::EditorRequest;
use super::editor::Viewport;

/// 媒体浏览器打开参数。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserRequest {
    pub source: u32,
    /// 浏览器初始定位目录（当前图片所在目录）。
    pub open_to: String,
    pub allowed_file_types: String,
}

/// 控制器依赖的宿主能力。
pub trait HostPanel {
    /// 读取隐藏字段当前值；字段不存在时返回 `None`。
    fn read_field(&self) -> Option<String>;

    /// 写入隐藏字段；字段不存在时返回 `false`。
    fn write_field(&mut self, value: &str) -> bool;

    /// 通知宿主表单数据已变更。
    fn mark_dirty(&mut self);

    /// 向用户弹出提示。
    fn alert(&mut self, title: &str, message: &str);

    /// 更新浏览器输入框显示的文件名。
    fn set_browser_label(&mut self, label: &str);

    /// 排期刷新预览图；`None` 表示隐藏预览。
    ///
    /// 宿主可以延迟执行（等待布局稳定），后一次排期直接覆盖前一次。
    fn schedule_preview(&mut self, url: Option<String>);

    /// 打开裁剪编辑器。
    fn open_editor(&mut self, request: EditorRequest);

    /// 当前视口尺寸，用于计算编辑器缩放比例。
    fn viewport(&self) -> Viewport;
}
