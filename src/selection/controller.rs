//! # 选图控制器
//!
//! ## 设计思路
//!
//! `SelectionController` 是整个组件唯一的状态所有者，负责把外部事件
//! （浏览器选图、编辑器确认裁剪、表单重置、清空、alt 文本修改、真实尺寸回填）
//! 串行地应用到 `ImageSelection` 上，并决定何时持久化、何时刷新预览、何时打开编辑器。
//!
//! 状态机：
//!
//! ```text
//!            select(通过校验)             edit()/新图片
//!   Empty ───────────────────▶ Selected ───────────────▶ Editing
//!     ▲                           ▲  ▲                      │
//!     │ reset()/clear()/          │  └── update_crop() ─────┤
//!     │ 首次选图被拒绝             │      cancel_edit()  ─────┘
//!     └───────────────────────────┘ select(被拒绝) → 回滚到上一张
//! ```
//!
//! ## 实现思路
//!
//! - 宿主能力通过 `HostPanel` 注入，控制器本身不依赖任何界面框架。
//! - 选新图前先记下“上一张有效图 + 裁剪框”快照，校验失败时原子回滚。
//! - 持久化前与字段当前值做规范化比较，值未变或源图为空时不写字段、不标脏。
//! - 真实尺寸回填带票据校验：票据代次或路径不匹配的结果直接丢弃。

use super::host::{BrowserRequest, HostPanel};
use super::resolver::{DimensionRequest, DimensionTicket};
use super::thumbnail::thumbnail_url;
use super::{
    CropRect, EditorRequest, ImageSelection, SelectedItem, SourceImage, TargetConstraints,
    ValueCodec, initial_crop, validator,
};
use crate::config::{InputOptions, ManagerConfig, WidgetConfig};

const TOO_SMALL_TITLE: &str = "Image too small";
const TOO_SMALL_MESSAGE: &str =
    "The selected image is too small to be used here. Please select a different image";

/// 控制器状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    /// 没有源图。
    Empty,
    /// 已选中并通过校验。
    Selected,
    /// 裁剪编辑器已打开。
    Editing,
}

/// `select` 的处理结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// 新图被接受；若浏览器尺寸可能不准，附带一个尺寸拉取请求。
    Accepted {
        dimension_request: Option<DimensionRequest>,
    },
    /// 新图尺寸不足，已回滚。
    Rejected,
}

/// 图片选择与裁剪控制器。
pub struct SelectionController<H: HostPanel> {
    host: H,
    options: InputOptions,
    manager: ManagerConfig,
    codec: ValueCodec,
    selection: ImageSelection,
    editor_open: bool,
    last_file_label: String,
    resolution_generation: u64,
}

impl<H: HostPanel> SelectionController<H> {
    /// 根据字段当前值构建控制器。
    ///
    /// 隐藏字段不存在时按空值处理。
    pub fn new(config: WidgetConfig, host: H) -> Self {
        let WidgetConfig { options, manager } = config;
        let codec = ValueCodec::new(&options);
        let stored = host.read_field().unwrap_or_default();
        let selection = codec.decode(&stored);
        let last_file_label = selection.source_path().to_string();

        log::debug!(
            "🧩 初始化选图控制器 - tvId: {} 当前图片: {:?}",
            options.tv_id,
            selection.source_path()
        );

        Self {
            host,
            options,
            manager,
            codec,
            selection,
            editor_open: false,
            last_file_label,
            resolution_generation: 0,
        }
    }

    pub fn state(&self) -> SelectionState {
        if self.selection.is_empty() {
            SelectionState::Empty
        } else if self.editor_open {
            SelectionState::Editing
        } else {
            SelectionState::Selected
        }
    }

    pub fn selection(&self) -> &ImageSelection {
        &self.selection
    }

    pub fn constraints(&self) -> TargetConstraints {
        self.options.constraints()
    }

    pub fn field_id(&self) -> &str {
        &self.options.tv_id
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// 首次渲染完成后调用：刷新预览并按需写回规范化的字段值。
    pub fn on_after_render(&mut self) {
        self.update_display();
    }

    /// 媒体浏览器选中图片。
    pub fn select(&mut self, item: SelectedItem) -> SelectOutcome {
        let identity_changed = self.selection.source_path() != item.relative_url;

        self.selection.remember_current();
        let source = SourceImage {
            path: item.relative_url,
            width: item.image_width,
            height: item.image_height,
            source_id: self.options.media_source,
        };

        if identity_changed {
            self.selection.crop = initial_crop(&source, &self.options.constraints());
        }
        let probably_truncated = source.dimensions_probably_truncated();
        self.selection.source = Some(source);

        if !self.update_display() {
            return SelectOutcome::Rejected;
        }

        log::info!(
            "🖼️ 已选中图片 - {} ({}x{}) 裁剪框: {:?}",
            self.selection.source_path(),
            item.image_width,
            item.image_height,
            self.selection.crop
        );

        let dimension_request = if probably_truncated {
            self.issue_dimension_request()
        } else {
            None
        };

        if identity_changed {
            self.edit();
        }

        SelectOutcome::Accepted { dimension_request }
    }

    /// 编辑器确认了新的裁剪框。
    pub fn update_crop(&mut self, crop: CropRect) {
        let crop = match &self.selection.source {
            Some(source) => crop.clamped_to(source),
            None => crop,
        };
        self.selection.crop = crop;

        let current_path = self.selection.source_path().to_string();
        match self.selection.previous_valid.as_mut() {
            Some(snapshot)
                if snapshot.source.as_ref().map(|s| s.path.as_str()) == Some(current_path.as_str()) =>
            {
                snapshot.crop = crop;
            }
            // 快照属于上一张图时保持不动，新图的裁剪框不能套到旧图上
            Some(_) => {}
            None => self.selection.remember_current(),
        }

        self.editor_open = false;
        log::info!("✂️ 裁剪框已更新: {:?}", crop);
        self.update_display();
    }

    /// 打开裁剪编辑器；已打开或没有源图时忽略。
    pub fn edit(&mut self) {
        if self.editor_open {
            return;
        }
        let Some(source) = self.selection.source.clone().filter(|s| !s.path.is_empty()) else {
            return;
        };

        let viewport = self.host.viewport();
        let request = EditorRequest::new(
            source,
            self.selection.crop,
            self.options.constraints(),
            viewport,
        );
        self.editor_open = true;
        self.host.open_editor(request);
    }

    /// 编辑器被关闭且未确认修改。
    pub fn cancel_edit(&mut self) {
        self.editor_open = false;
    }

    /// 宿主表单对本字段执行“恢复保存值”。
    pub fn reset(&mut self) {
        self.selection.source = None;
        self.selection.crop = CropRect::default();
        self.editor_open = false;
        self.invalidate_pending_resolution();
        self.host.set_browser_label("");
        self.schedule_preview();
        log::info!("↩️ 字段已重置 - tvId: {}", self.options.tv_id);
    }

    /// 按广播里的字段标识过滤后再重置。返回是否命中本字段。
    pub fn handle_reset_event(&mut self, field_id: &str) -> bool {
        if field_id != self.options.tv_id {
            return false;
        }
        self.reset();
        true
    }

    /// 用户主动清空图片。alt 文本本身保留。
    pub fn clear(&mut self) {
        self.selection.source = None;
        self.selection.previous_valid = None;
        self.editor_open = false;
        self.last_file_label.clear();
        self.invalidate_pending_resolution();

        self.host.schedule_preview(None);
        if !self.host.write_field("") {
            log::debug!("隐藏字段不存在，跳过清空写入");
        }
        self.host.set_browser_label("");
        self.host.mark_dirty();
        log::info!("🗑️ 已清空图片 - tvId: {}", self.options.tv_id);
    }

    /// alt 文本修改。
    pub fn change_alt_text(&mut self, text: impl Into<String>) {
        self.selection.alt_text = text.into();
        self.persist();
    }

    /// 回填真实尺寸。票据过期（之后又选了别的图、重置或清空）时忽略并返回 `false`。
    pub fn apply_resolved_dimensions(
        &mut self,
        ticket: &DimensionTicket,
        width: u32,
        height: u32,
    ) -> bool {
        let current = self.selection.source_path();
        if ticket.generation != self.resolution_generation || ticket.path != current {
            log::debug!(
                "⏭️ 丢弃过期的尺寸结果 - 请求: {} 当前: {}",
                ticket.path,
                current
            );
            return false;
        }

        if let Some(source) = self.selection.source.as_mut() {
            source.width = width;
            source.height = height;
        }

        if !self.update_display() {
            return true;
        }
        if !self.selection.crop.is_set() {
            self.edit();
        }
        true
    }

    /// 媒体浏览器打开参数。
    pub fn browser_request(&self) -> BrowserRequest {
        BrowserRequest {
            source: self.options.media_source,
            open_to: self
                .selection
                .source
                .as_ref()
                .map(|s| s.directory().to_string())
                .unwrap_or_default(),
            allowed_file_types: self.options.allowed_file_types.clone(),
        }
    }

    /// 当前预览地址；预览应隐藏时返回 `None`。
    pub fn preview_url(&self) -> Option<String> {
        match thumbnail_url(&self.selection, &self.options, &self.manager) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("⚠️ 预览地址生成失败: {}", err);
                None
            }
        }
    }

    /// 校验当前源图；通过则刷新预览并持久化，失败则回滚并提示。
    fn update_display(&mut self) -> bool {
        let constraints = self.options.constraints();
        let check = match &self.selection.source {
            Some(source) => validator::check(source, &constraints),
            None => Ok(()),
        };

        if let Err(err) = check {
            log::warn!("⚠️ 图片未通过尺寸校验，回滚到上一张: {}", err);
            self.editor_open = false;
            self.invalidate_pending_resolution();
            if self.selection.roll_back() {
                self.last_file_label = self.selection.source_path().to_string();
                let label = self.last_file_label.clone();
                self.host.set_browser_label(&label);
                // 被拒绝的图片可能已经写入字段（尺寸回填后才发现过小），用回滚后的值覆盖
                self.persist();
            } else {
                self.last_file_label.clear();
                self.host.set_browser_label("");
                self.clear_persisted_field();
            }
            self.schedule_preview();
            self.host.alert(TOO_SMALL_TITLE, TOO_SMALL_MESSAGE);
            return false;
        }

        self.last_file_label = self.selection.source_path().to_string();
        self.schedule_preview();
        self.persist();
        true
    }

    fn schedule_preview(&mut self) {
        let url = self.preview_url();
        self.host.schedule_preview(url);
    }

    /// 写回隐藏字段。值未变化、源图为空或字段不存在时跳过。
    fn persist(&mut self) {
        if self.selection.is_empty() {
            log::debug!("源图为空，跳过持久化");
            return;
        }

        let Some(current) = self.host.read_field() else {
            log::debug!("隐藏字段不存在，跳过持久化");
            return;
        };

        let encoded = self.codec.encode(&self.selection);
        if !ValueCodec::has_changed(&encoded, &current) {
            return;
        }

        if !self.host.write_field(&encoded) {
            log::debug!("隐藏字段写入失败，跳过标脏");
            return;
        }
        self.host.mark_dirty();
        log::debug!("💾 字段值已更新 - tvId: {}", self.options.tv_id);
    }

    /// 回滚到空状态时，若字段里仍保存着某张图片则清空并标脏。
    fn clear_persisted_field(&mut self) {
        let Some(current) = self.host.read_field() else {
            return;
        };
        if self.codec.decode(&current).is_empty() {
            return;
        }
        if self.host.write_field("") {
            self.host.mark_dirty();
            log::debug!("💾 回滚后清空字段值 - tvId: {}", self.options.tv_id);
        }
    }

    fn issue_dimension_request(&mut self) -> Option<DimensionRequest> {
        let source = self.selection.source.as_ref()?;

        self.resolution_generation = self.resolution_generation.wrapping_add(1);
        let location = match self.manager.source_base_url(source.source_id) {
            Some(base) => format!("{}{}", base, source.path),
            None => {
                log::warn!(
                    "⚠️ 媒体源 {} 未配置根地址，按原始路径拉取尺寸",
                    source.source_id
                );
                source.path.clone()
            }
        };

        Some(DimensionRequest {
            ticket: DimensionTicket {
                path: source.path.clone(),
                generation: self.resolution_generation,
            },
            location,
        })
    }

    fn invalidate_pending_resolution(&mut self) {
        self.resolution_generation = self.resolution_generation.wrapping_add(1);
    }
}
