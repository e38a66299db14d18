//! # 初始裁剪框计算
//!
//! ## 设计思路
//!
//! 新选中一张不同的图片时，按字段配置的宽高比计算一个“尽量大”的初始裁剪框：
//! - 未配置比例：整张图
//! - 图片相对目标比例更“高”（`w / h < ratio`）：保留整宽，高度取 `w / ratio`
//! - 否则（更“宽”或恰好相等）：保留整高，宽度取 `h * ratio`
//!
//! 起点始终为 `(0, 0)`。结果四舍五入后收敛到图片范围内，保证不越界。
//!
//! 重新选中同一张图片不会调用这里，已有裁剪框保持不变（由控制器保证）。

use super::{CropRect, SourceImage, TargetConstraints};

/// 计算新图片的初始裁剪框。
///
/// # 示例
/// ```
/// use imageplus_input::selection::{initial_crop, CropRect, SourceImage, TargetConstraints};
///
/// let image = SourceImage { path: "b.jpg".into(), width: 1000, height: 1000, source_id: 1 };
/// let constraints = TargetConstraints { target_ratio: Some(2.0), ..Default::default() };
/// assert_eq!(initial_crop(&image, &constraints), CropRect::new(0, 0, 1000, 500));
/// ```
pub fn initial_crop(image: &SourceImage, constraints: &TargetConstraints) -> CropRect {
    let Some(ratio) = constraints.target_ratio.filter(|r| r.is_finite() && *r > 0.0) else {
        return CropRect::full(image);
    };

    // 尺寸未知时无法按比例推算，等真实尺寸回来后由编辑器补齐
    if !image.has_known_dimensions() {
        return CropRect::full(image);
    }

    let width = image.width as f64;
    let height = image.height as f64;

    if width / height < ratio {
        CropRect::new(0, 0, image.width, scaled(width / ratio, image.height))
    } else {
        CropRect::new(0, 0, scaled(height * ratio, image.width), image.height)
    }
}

fn scaled(value: f64, limit: u32) -> u32 {
    (value.round() as u32).clamp(1, limit)
}
