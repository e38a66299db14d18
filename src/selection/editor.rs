//! 裁剪编辑器布局计算
//!
//! 编辑器窗口需要把整张源图放进视口：高度最多占视口 70%，宽度最多占 90%。
//! 这里只算缩放比例与窗口尺寸，拖拽/缩放交互由宿主的编辑器组件负责。

use super::{CropRect, SourceImage, TargetConstraints};

const MAX_VIEWPORT_HEIGHT_SHARE: f64 = 0.7;
const MAX_VIEWPORT_WIDTH_SHARE: f64 = 0.9;
/// 窗口内边距（左右合计 / 上下合计）。
const WINDOW_PADDING: f64 = 20.0;
/// 标题栏与按钮栏高度。
const WINDOW_CHROME_HEIGHT: f64 = 84.0;

/// 宿主视口尺寸（逻辑像素）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 打开裁剪编辑器所需的全部参数。
#[derive(Debug, Clone, PartialEq)]
pub struct EditorRequest {
    pub source: SourceImage,
    pub crop: CropRect,
    pub constraints: TargetConstraints,
    /// 源图像素到屏幕像素的缩放比例（≤ 1）。
    pub display_ratio: f64,
    pub window_width: f64,
    pub window_height: f64,
}

impl EditorRequest {
    pub fn new(
        source: SourceImage,
        crop: CropRect,
        constraints: TargetConstraints,
        viewport: Viewport,
    ) -> Self {
        let display_ratio = display_ratio(source.width, source.height, viewport);
        let window_width = source.width as f64 * display_ratio + WINDOW_PADDING;
        let window_height =
            source.height as f64 * display_ratio + WINDOW_PADDING + WINDOW_CHROME_HEIGHT;
        Self {
            source,
            crop,
            constraints,
            display_ratio,
            window_width,
            window_height,
        }
    }
}

/// 计算让图片完整放入视口的缩放比例。
///
/// 先按高度收敛，收敛后若宽度仍超限再按宽度收敛；不放大图片。
pub fn display_ratio(image_width: u32, image_height: u32, viewport: Viewport) -> f64 {
    let width = image_width as f64;
    let height = image_height as f64;
    let max_height = viewport.height * MAX_VIEWPORT_HEIGHT_SHARE;
    let max_width = viewport.width * MAX_VIEWPORT_WIDTH_SHARE;

    if height > max_height {
        let ratio = max_height / height;
        if width * ratio > max_width {
            return max_width / width;
        }
        return ratio;
    }

    if width > max_width {
        return max_width / width;
    }

    1.0
}
