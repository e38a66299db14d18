//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义 crate 级统一的 `AppError` 枚举，宿主适配层（表单面板、命令行）
//! 统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `SelectionError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于透传给宿主前端。

use serde::Serialize;

use crate::selection::SelectionError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 选图 / 尺寸拉取链路错误
    #[error("{0}")]
    Selection(#[from] SelectionError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 配置缺失或格式错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 宿主 IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_error_serializes_as_message() {
        let err = AppError::Config("缺少 tvId".to_string());
        let json = serde_json::to_string(&err).expect("serialize failed");
        assert_eq!(json, "\"配置错误: 缺少 tvId\"");
    }

    #[test]
    fn selection_error_converts_transparently() {
        let err: AppError = SelectionError::Network("连接被拒绝".to_string()).into();
        assert_eq!(err.to_string(), "网络错误：连接被拒绝");
    }
}
