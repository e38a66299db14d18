//! 预览缩略图地址
//!
//! 预览图由宿主的缩略图端点按裁剪参数实时生成，这里只负责拼出请求地址。
//! 参数顺序固定为 `wctx, w, source, src, sw, sh, sx, sy`，`src` 做 URL 编码。
//!
//! 连接器地址通常是站内相对路径（如 `/manager/connectors/`），
//! 此时借助占位主机完成解析，输出时只保留路径与查询串。

use reqwest::Url;

use super::{ImageSelection, SelectionError};
use crate::config::{InputOptions, ManagerConfig};

const THUMBNAIL_ENDPOINT: &str = "system/phpthumb.php";
const PLACEHOLDER_HOST: &str = "manager.invalid";
const PLACEHOLDER_BASE: &str = "http://manager.invalid/";

/// 生成当前选择的预览地址。
///
/// 没有源图或裁剪框宽度为 0 时返回 `Ok(None)`，表示预览应隐藏。
pub fn thumbnail_url(
    selection: &ImageSelection,
    options: &InputOptions,
    manager: &ManagerConfig,
) -> Result<Option<String>, SelectionError> {
    let Some(source) = selection.source.as_ref().filter(|s| !s.path.is_empty()) else {
        return Ok(None);
    };
    if selection.crop.width == 0 {
        return Ok(None);
    }

    let placeholder = Url::parse(PLACEHOLDER_BASE)
        .map_err(|e| SelectionError::InvalidFormat(format!("占位地址解析失败：{}", e)))?;
    let connectors = placeholder
        .join(&manager.connectors_url)
        .map_err(|e| SelectionError::InvalidFormat(format!("连接器地址无效：{}", e)))?;
    let mut url = connectors
        .join(THUMBNAIL_ENDPOINT)
        .map_err(|e| SelectionError::InvalidFormat(format!("缩略图地址无效：{}", e)))?;

    let crop = selection.crop;
    url.query_pairs_mut()
        .append_pair("imageplus", "1")
        .append_pair("wctx", "mgr")
        .append_pair("w", &options.thumbnail_width.to_string())
        .append_pair("source", &source.source_id.to_string())
        .append_pair("src", &source.path)
        .append_pair("sw", &crop.width.to_string())
        .append_pair("sh", &crop.height.to_string())
        .append_pair("sx", &crop.x.to_string())
        .append_pair("sy", &crop.y.to_string());

    if url.host_str() == Some(PLACEHOLDER_HOST) {
        let query = url.query().map(|q| format!("?{q}")).unwrap_or_default();
        let path = url.path();
        // 页面相对地址（如 `connectors/`）保持相对，不补根路径
        let path = if manager.connectors_url.starts_with('/') {
            path
        } else {
            path.strip_prefix('/').unwrap_or(path)
        };
        return Ok(Some(format!("{}{}", path, query)));
    }

    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{CropRect, SourceImage};

    fn selection(crop: CropRect) -> ImageSelection {
        ImageSelection::with_source(
            SourceImage {
                path: "assets/my photo.jpg".to_string(),
                width: 1000,
                height: 800,
                source_id: 2,
            },
            crop,
            "",
        )
    }

    fn options() -> InputOptions {
        InputOptions {
            thumbnail_width: 250,
            ..InputOptions::default()
        }
    }

    #[test]
    fn relative_connectors_url_stays_relative() {
        let manager = ManagerConfig {
            connectors_url: "/manager/connectors/".to_string(),
            ..ManagerConfig::default()
        };
        let url = thumbnail_url(&selection(CropRect::new(5, 6, 300, 200)), &options(), &manager)
            .expect("url build failed")
            .expect("preview should be visible");

        assert_eq!(
            url,
            "/manager/connectors/system/phpthumb.php?imageplus=1&wctx=mgr&w=250&source=2&src=assets%2Fmy+photo.jpg&sw=300&sh=200&sx=5&sy=6"
        );
    }

    #[test]
    fn page_relative_connectors_url_is_not_rooted() {
        let manager = ManagerConfig {
            connectors_url: "connectors/".to_string(),
            ..ManagerConfig::default()
        };
        let url = thumbnail_url(&selection(CropRect::new(0, 0, 10, 10)), &options(), &manager)
            .expect("url build failed")
            .expect("preview should be visible");

        assert!(url.starts_with("connectors/system/phpthumb.php?imageplus=1&"));
    }

    #[test]
    fn absolute_connectors_url_is_kept() {
        let manager = ManagerConfig {
            connectors_url: "https://cms.example.com/connectors/".to_string(),
            ..ManagerConfig::default()
        };
        let url = thumbnail_url(&selection(CropRect::new(0, 0, 10, 10)), &options(), &manager)
            .expect("url build failed")
            .expect("preview should be visible");

        assert!(url.starts_with("https://cms.example.com/connectors/system/phpthumb.php?imageplus=1&"));
    }

    #[test]
    fn zero_width_crop_hides_preview() {
        let result = thumbnail_url(
            &selection(CropRect::default()),
            &options(),
            &ManagerConfig::default(),
        )
        .expect("url build failed");
        assert_eq!(result, None);
    }

    #[test]
    fn empty_selection_hides_preview() {
        let result = thumbnail_url(&ImageSelection::empty(), &options(), &ManagerConfig::default())
            .expect("url build failed");
        assert_eq!(result, None);
    }
}
