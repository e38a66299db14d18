//! # 选图数据模型
//!
//! ## 设计思路
//!
//! 将“外部事件载荷”和“组件内部状态”解耦：
//! - `SelectedItem` 表示媒体浏览器回传的选中项（字段名保持浏览器约定）
//! - `SourceImage` / `CropRect` 表示已接受的源图与裁剪框
//! - `ImageSelection` 是控制器唯一持有的可变状态，附带一份回滚快照

use serde::Deserialize;

use crate::lenient;

/// 宽或高达到该阈值时，浏览器返回的尺寸可能被截断，需要重新拉取真实尺寸。
pub const PROBABLY_TRUNCATED_WIDTH: u32 = 800;
pub const PROBABLY_TRUNCATED_HEIGHT: u32 = 600;

/// 媒体浏览器的选中事件。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectedItem {
    #[serde(rename = "relativeUrl")]
    pub relative_url: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub image_width: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub image_height: u32,
}

impl SelectedItem {
    pub fn new(relative_url: impl Into<String>, image_width: u32, image_height: u32) -> Self {
        Self {
            relative_url: relative_url.into(),
            image_width,
            image_height,
        }
    }
}

/// 已选中的源图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// 相对媒体源根目录的路径，同时作为图片身份标识。
    pub path: String,
    /// 宽度（像素），0 表示未知。
    pub width: u32,
    /// 高度（像素），0 表示未知。
    pub height: u32,
    /// 所属媒体源 ID。
    pub source_id: u32,
}

impl SourceImage {
    pub fn has_known_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// 浏览器元数据在大尺寸下可能不准确。
    pub fn dimensions_probably_truncated(&self) -> bool {
        self.width >= PROBABLY_TRUNCATED_WIDTH || self.height >= PROBABLY_TRUNCATED_HEIGHT
    }

    /// 路径所在目录，媒体浏览器据此定位初始目录。
    pub fn directory(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }
}

/// 裁剪框（源图像素坐标）。宽或高为 0 表示尚未设置。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn full(image: &SourceImage) -> Self {
        Self::new(0, 0, image.width, image.height)
    }

    pub fn is_set(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// 将裁剪框收敛到源图范围内；源图尺寸未知时原样返回。
    pub fn clamped_to(self, image: &SourceImage) -> Self {
        if !image.has_known_dimensions() {
            return self;
        }
        let x = self.x.min(image.width);
        let y = self.y.min(image.height);
        Self {
            x,
            y,
            width: self.width.min(image.width - x),
            height: self.height.min(image.height - y),
        }
    }

    pub fn fits_within(&self, image: &SourceImage) -> bool {
        !image.has_known_dimensions()
            || (self.x as u64 + self.width as u64 <= image.width as u64
                && self.y as u64 + self.height as u64 <= image.height as u64)
    }
}

/// 字段级尺寸约束（只读配置）。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetConstraints {
    /// 最小宽度，0 表示不限制。
    pub target_width: u32,
    /// 最小高度，0 表示不限制。
    pub target_height: u32,
    /// 裁剪框默认宽高比。
    pub target_ratio: Option<f64>,
}

impl TargetConstraints {
    pub fn unconstrained() -> Self {
        Self::default()
    }
}

/// 最近一次通过校验的源图及其裁剪框，用于拒绝新图时回滚。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub source: Option<SourceImage>,
    pub crop: CropRect,
}

/// 组件持有的选图状态。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSelection {
    pub source: Option<SourceImage>,
    pub crop: CropRect,
    pub alt_text: String,
    pub(crate) previous_valid: Option<SelectionSnapshot>,
}

impl ImageSelection {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_source(source: SourceImage, crop: CropRect, alt_text: impl Into<String>) -> Self {
        Self {
            source: Some(source),
            crop,
            alt_text: alt_text.into(),
            previous_valid: None,
        }
    }

    pub fn source_path(&self) -> &str {
        self.source.as_ref().map(|s| s.path.as_str()).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.source_path().is_empty()
    }

    pub fn previous_valid(&self) -> Option<&SelectionSnapshot> {
        self.previous_valid.as_ref()
    }

    /// 将当前源图与裁剪框记为回滚快照。
    pub(crate) fn remember_current(&mut self) {
        self.previous_valid = Some(SelectionSnapshot {
            source: self.source.clone(),
            crop: self.crop,
        });
    }

    /// 回滚到快照；没有快照或快照为空时回到空状态。返回是否回到了某张图。
    pub(crate) fn roll_back(&mut self) -> bool {
        match self.previous_valid.clone() {
            Some(SelectionSnapshot {
                source: Some(source),
                crop,
            }) => {
                self.crop = crop.clamped_to(&source);
                self.source = Some(source);
                true
            }
            _ => {
                self.source = None;
                self.crop = CropRect::default();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> SourceImage {
        SourceImage {
            path: "assets/photos/cat.jpg".to_string(),
            width,
            height,
            source_id: 1,
        }
    }

    #[test]
    fn truncation_threshold_is_inclusive() {
        assert!(image(800, 10).dimensions_probably_truncated());
        assert!(image(10, 600).dimensions_probably_truncated());
        assert!(!image(799, 599).dimensions_probably_truncated());
    }

    #[test]
    fn directory_strips_file_name() {
        assert_eq!(image(1, 1).directory(), "assets/photos");
        let bare = SourceImage {
            path: "cat.jpg".to_string(),
            ..image(1, 1)
        };
        assert_eq!(bare.directory(), "");
    }

    #[test]
    fn clamp_keeps_crop_inside_image() {
        let crop = CropRect::new(150, 20, 100, 500).clamped_to(&image(200, 300));
        assert_eq!(crop, CropRect::new(150, 20, 50, 280));
        assert!(crop.fits_within(&image(200, 300)));
    }

    #[test]
    fn clamp_ignores_unknown_dimensions() {
        let crop = CropRect::new(5, 5, 900, 900);
        assert_eq!(crop.clamped_to(&image(0, 0)), crop);
    }

    #[test]
    fn roll_back_without_snapshot_empties_selection() {
        let mut selection = ImageSelection::with_source(image(10, 10), CropRect::new(0, 0, 10, 10), "");
        assert!(!selection.roll_back());
        assert!(selection.source.is_none());
        assert_eq!(selection.crop, CropRect::default());
    }

    #[test]
    fn roll_back_restores_source_and_crop() {
        let mut selection =
            ImageSelection::with_source(image(200, 200), CropRect::new(10, 10, 100, 100), "alt");
        selection.remember_current();
        selection.source = Some(image(50, 50));
        selection.crop = CropRect::new(0, 0, 50, 50);

        assert!(selection.roll_back());
        assert_eq!(selection.source, Some(image(200, 200)));
        assert_eq!(selection.crop, CropRect::new(10, 10, 100, 100));
        assert_eq!(selection.alt_text, "alt");
    }

    #[test]
    fn roll_back_clamps_crop_to_restored_source() {
        let mut selection =
            ImageSelection::with_source(image(200, 100), CropRect::new(0, 0, 200, 100), "");
        selection.remember_current();
        if let Some(snapshot) = selection.previous_valid.as_mut() {
            snapshot.crop = CropRect::new(100, 0, 900, 700);
        }

        assert!(selection.roll_back());
        assert_eq!(selection.crop, CropRect::new(100, 0, 100, 100));
        assert!(selection.crop.fits_within(&image(200, 100)));
    }
}
