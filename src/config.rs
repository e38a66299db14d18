//! # 配置模块
//!
//! ## 设计思路
//!
//! 字段实例配置（目标尺寸、比例、媒体源）与管理端全局配置（连接器地址、媒体源 URL）
//! 都以显式结构体的形式在构造时注入控制器与编解码器，不依赖任何全局可变对象。
//!
//! ## 实现思路
//!
//! - JSON 字段名保持宿主约定的 camelCase。
//! - 数值类字段走宽松解析：宿主模板变量经常以字符串形式下发。
//! - `WidgetConfig::load_from_path` 读取 JSON 文件，供命令行与集成测试使用。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;
use crate::lenient;
use crate::selection::TargetConstraints;

const DEFAULT_MEDIA_SOURCE: u32 = 1;
const DEFAULT_THUMBNAIL_WIDTH: u32 = 400;
const DEFAULT_CONNECTORS_URL: &str = "/connectors/";

/// 单个字段实例的配置。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputOptions {
    /// 字段标识，用于过滤宿主的重置广播。
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub tv_id: String,
    /// 最小目标宽度（0 表示不限制）。
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub target_width: u32,
    /// 最小目标高度（0 表示不限制）。
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub target_height: u32,
    /// 裁剪框默认宽高比（宽 / 高）。
    #[serde(default, deserialize_with = "lenient::positive_ratio")]
    pub target_ratio: Option<f64>,
    /// 媒体源 ID。
    #[serde(
        default = "default_media_source",
        deserialize_with = "lenient::u32_or_zero"
    )]
    pub media_source: u32,
    /// 预览缩略图宽度。
    #[serde(
        default = "default_thumbnail_width",
        deserialize_with = "lenient::u32_or_zero"
    )]
    pub thumbnail_width: u32,
    /// 是否显示 alt 文本输入框。
    #[serde(default, deserialize_with = "lenient::bool_flag")]
    pub alt_tag_on: bool,
    /// 媒体浏览器允许的文件扩展名（逗号分隔）。
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    pub allowed_file_types: String,
}

fn default_media_source() -> u32 {
    DEFAULT_MEDIA_SOURCE
}

fn default_thumbnail_width() -> u32 {
    DEFAULT_THUMBNAIL_WIDTH
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            tv_id: String::new(),
            target_width: 0,
            target_height: 0,
            target_ratio: None,
            media_source: DEFAULT_MEDIA_SOURCE,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            alt_tag_on: false,
            allowed_file_types: String::new(),
        }
    }
}

impl InputOptions {
    /// 提取尺寸/比例约束。
    pub fn constraints(&self) -> TargetConstraints {
        TargetConstraints {
            target_width: self.target_width,
            target_height: self.target_height,
            target_ratio: self.target_ratio,
        }
    }
}

/// 媒体源信息。
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSourceInfo {
    /// 媒体源根地址，图片相对路径拼接在其后即为完整地址。
    pub url: String,
}

/// 管理端全局配置。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerConfig {
    #[serde(default = "default_connectors_url")]
    pub connectors_url: String,
    #[serde(default)]
    pub sources: HashMap<u32, MediaSourceInfo>,
}

fn default_connectors_url() -> String {
    DEFAULT_CONNECTORS_URL.to_string()
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            connectors_url: default_connectors_url(),
            sources: HashMap::new(),
        }
    }
}

impl ManagerConfig {
    /// 媒体源根地址；未配置的媒体源返回 `None`。
    pub fn source_base_url(&self, source_id: u32) -> Option<&str> {
        self.sources.get(&source_id).map(|info| info.url.as_str())
    }
}

/// 组件完整配置：字段实例配置 + 管理端配置。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WidgetConfig {
    #[serde(default)]
    pub options: InputOptions,
    #[serde(default)]
    pub manager: ManagerConfig,
}

impl WidgetConfig {
    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content).map_err(|e| AppError::Config(format!("解析配置失败: {}", e)))
    }

    /// 从 JSON 文件加载配置。
    ///
    /// # 返回
    /// - `Ok(WidgetConfig)` — 解析成功
    /// - `Err(AppError::Io)` — 文件无法读取
    /// - `Err(AppError::Config)` — 内容不是合法配置
    pub fn load_from_path(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        log::debug!(
            "⚙️ 已加载字段配置 - tvId: {} 目标尺寸: {}x{} 比例: {:?}",
            config.options.tv_id,
            config.options.target_width,
            config.options.target_height,
            config.options.target_ratio
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn options_accept_string_numbers_from_template_variables() {
        let options: InputOptions = serde_json::from_str(
            r#"{"tvId":"12","targetWidth":"800","targetHeight":"","targetRatio":"1.5","mediaSource":"2","altTagOn":"1"}"#,
        )
        .expect("parse options failed");

        assert_eq!(options.tv_id, "12");
        assert_eq!(options.target_width, 800);
        assert_eq!(options.target_height, 0);
        assert_eq!(options.target_ratio, Some(1.5));
        assert_eq!(options.media_source, 2);
        assert!(options.alt_tag_on);
        assert_eq!(options.thumbnail_width, DEFAULT_THUMBNAIL_WIDTH);
    }

    #[test]
    fn non_positive_ratio_means_unset() {
        let options: InputOptions =
            serde_json::from_str(r#"{"targetRatio":0}"#).expect("parse options failed");
        assert_eq!(options.target_ratio, None);

        let options: InputOptions =
            serde_json::from_str(r#"{"targetRatio":""}"#).expect("parse options failed");
        assert_eq!(options.target_ratio, None);
    }

    #[test]
    fn manager_config_resolves_source_urls() {
        let config = WidgetConfig::from_json_str(
            r#"{"manager":{"connectorsUrl":"/manager/connectors/","sources":{"1":{"url":"https://cdn.example.com/"}}}}"#,
        )
        .expect("parse config failed");

        assert_eq!(config.manager.connectors_url, "/manager/connectors/");
        assert_eq!(
            config.manager.source_base_url(1),
            Some("https://cdn.example.com/")
        );
        assert_eq!(config.manager.source_base_url(7), None);
        assert_eq!(config.options.media_source, DEFAULT_MEDIA_SOURCE);
    }

    #[test]
    fn load_from_path_reports_invalid_json() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("imageplus_config_{nanos}.json"));
        std::fs::write(&path, "{not json").expect("write temp config failed");

        let result = WidgetConfig::load_from_path(&path);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn load_from_path_reports_missing_file() {
        let path = std::env::temp_dir().join("imageplus_config_does_not_exist.json");
        assert!(matches!(
            WidgetConfig::load_from_path(&path),
            Err(AppError::Io(_))
        ));
    }
}
