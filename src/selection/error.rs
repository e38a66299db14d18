//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载选图链路中的所有错误来源（尺寸拉取、格式识别、约束校验）。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 注意：存储值解析失败不走这里，`ValueCodec` 会直接回退到旧版纯路径格式。

/// 选图链路统一错误类型。
///
/// 该类型会在 crate 入口被上转为 `AppError`。
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("网络错误：{0}")]
    Network(String),

    #[error("超时错误：{0}")]
    Timeout(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    /// 图片小于字段要求的目标尺寸。
    #[error("图片尺寸过小：{width}x{height}（要求至少 {target_width}x{target_height}）")]
    Rejected {
        width: u32,
        height: u32,
        target_width: u32,
        target_height: u32,
    },
}
