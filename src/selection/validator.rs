//! 尺寸约束校验
//!
//! 纯函数：只看源图尺寸与字段约束，不产生任何副作用。
//! 源图宽或高未知（0）时对应维度暂时放行，等真实尺寸拉取完成后再校验一次。

use super::{SelectionError, SourceImage, TargetConstraints};

/// 判断源图是否满足最小目标尺寸。
pub fn accepts(image: &SourceImage, constraints: &TargetConstraints) -> bool {
    check(image, constraints).is_ok()
}

/// 同 [`accepts`]，但拒绝时返回携带尺寸信息的错误，便于日志与提示。
pub fn check(image: &SourceImage, constraints: &TargetConstraints) -> Result<(), SelectionError> {
    let too_narrow = constraints.target_width > 0
        && image.width > 0
        && constraints.target_width > image.width;
    let too_short = constraints.target_height > 0
        && image.height > 0
        && constraints.target_height > image.height;

    if too_narrow || too_short {
        return Err(SelectionError::Rejected {
            width: image.width,
            height: image.height,
            target_width: constraints.target_width,
            target_height: constraints.target_height,
        });
    }

    Ok(())
}
