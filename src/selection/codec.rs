//! # 字段值编解码
//!
//! ## 设计思路
//!
//! 宿主表单只保存一个字符串字段，这里负责它与 `ImageSelection` 之间的双向转换：
//! - 结构化格式：`{ sourceImg, crop, targetWidth, targetHeight, altTag }`，2 空格缩进
//! - 旧版格式：字段里只有一个图片路径（早期版本保存的纯路径值）
//!
//! ## 实现思路
//!
//! - 编码统一经过 `serde_json::Value` 再输出，键顺序由 `Value` 决定，
//!   与“重新解析旧值再输出”走同一条路径，保证规范化结果可直接做字符串比较。
//! - 解码先判定是否为 JSON 对象，否则整体按旧版纯路径处理，解析失败从不向上报错。
//! - 数值字段走宽松解析，兼容早期编辑器写入的浮点与字符串。

use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use super::{CropRect, ImageSelection, SourceImage, TargetConstraints};
use crate::config::InputOptions;
use crate::lenient;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredValue {
    #[serde(default, deserialize_with = "object_or_none")]
    source_img: Option<StoredSource>,
    #[serde(default, deserialize_with = "object_or_none")]
    crop: Option<StoredCrop>,
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    alt_tag: String,
}

#[derive(Debug, Deserialize)]
struct StoredSource {
    #[serde(default, deserialize_with = "lenient::string_or_empty")]
    src: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    width: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    height: u32,
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    source: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct StoredCrop {
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    x: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    y: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    width: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    height: u32,
}

/// `sourceImg` 在重置过的旧值里可能是 `null` / `false`，统一视为缺省。
fn object_or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

/// 字段值编解码器。
///
/// 构造时注入字段约束与默认媒体源，编码时写入目标尺寸，旧版解码时补齐媒体源。
#[derive(Debug, Clone)]
pub struct ValueCodec {
    constraints: TargetConstraints,
    default_source: u32,
}

impl ValueCodec {
    pub fn new(options: &InputOptions) -> Self {
        Self {
            constraints: options.constraints(),
            default_source: options.media_source,
        }
    }

    pub fn with_constraints(constraints: TargetConstraints, default_source: u32) -> Self {
        Self {
            constraints,
            default_source,
        }
    }

    /// 解析宿主字段中保存的值。
    ///
    /// - 空值 → 空选择
    /// - JSON 对象 → 结构化解析
    /// - 其他任何内容 → 旧版纯路径（宽高、裁剪框均为 0）
    pub fn decode(&self, raw: &str) -> ImageSelection {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ImageSelection::empty();
        }

        match serde_json::from_str::<Value>(trimmed) {
            Ok(value @ Value::Object(_)) => match serde_json::from_value::<StoredValue>(value) {
                Ok(stored) => self.from_stored(stored),
                Err(err) => {
                    log::debug!("字段值结构不完整，按旧版路径处理: {}", err);
                    self.legacy(trimmed)
                }
            },
            _ => self.legacy(trimmed),
        }
    }

    fn from_stored(&self, stored: StoredValue) -> ImageSelection {
        let source = stored
            .source_img
            .filter(|s| !s.src.is_empty())
            .map(|s| SourceImage {
                path: s.src,
                width: s.width,
                height: s.height,
                source_id: s.source.unwrap_or(self.default_source),
            });
        let crop = stored
            .crop
            .map(|c| CropRect::new(c.x, c.y, c.width, c.height))
            .unwrap_or_default();

        ImageSelection {
            source,
            crop,
            alt_text: stored.alt_tag,
            previous_valid: None,
        }
    }

    fn legacy(&self, path: &str) -> ImageSelection {
        log::debug!("📄 字段值不是结构化数据，按旧版纯路径解析: {}", path);
        ImageSelection::with_source(
            SourceImage {
                path: path.to_string(),
                width: 0,
                height: 0,
                source_id: self.default_source,
            },
            CropRect::default(),
            "",
        )
    }

    /// 输出规范化的结构化字段值。
    pub fn encode(&self, selection: &ImageSelection) -> String {
        let source_img = match &selection.source {
            Some(source) => json!({
                "src": source.path,
                "width": source.width,
                "height": source.height,
                "source": source.source_id,
            }),
            None => Value::Null,
        };
        let value = json!({
            "sourceImg": source_img,
            "crop": {
                "x": selection.crop.x,
                "y": selection.crop.y,
                "width": selection.crop.width,
                "height": selection.crop.height,
            },
            "targetWidth": self.constraints.target_width,
            "targetHeight": self.constraints.target_height,
            "altTag": selection.alt_text,
        });
        pretty(&value)
    }

    /// 重新解析并输出，使格式差异（缩进、空白、键顺序）不影响比较。
    ///
    /// 非 JSON 内容返回 `None`。
    pub fn normalize(raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        serde_json::from_str::<Value>(trimmed).ok().map(|v| pretty(&v))
    }

    /// 新值与当前保存值是否实质不同。
    ///
    /// 当前值为空或不是 JSON 时按空串参与比较。
    pub fn has_changed(new_encoded: &str, current_stored: &str) -> bool {
        let new_value = Self::normalize(new_encoded).unwrap_or_else(|| new_encoded.to_string());
        let current = Self::normalize(current_stored).unwrap_or_default();
        new_value != current
    }
}

/// `Value` 的 `{:#}` 输出即 2 空格缩进的 pretty JSON。
fn pretty(value: &Value) -> String {
    format!("{:#}", value)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn codec() -> ValueCodec {
        ValueCodec::with_constraints(
            TargetConstraints {
                target_width: 300,
                target_height: 200,
                target_ratio: Some(1.5),
            },
            3,
        )
    }

    fn sample() -> ImageSelection {
        ImageSelection::with_source(
            SourceImage {
                path: "assets/a.jpg".to_string(),
                width: 1200,
                height: 800,
                source_id: 2,
            },
            CropRect::new(10, 20, 600, 400),
            "A cat",
        )
    }

    #[test]
    fn legacy_bare_path_is_decoded() {
        let selection = codec().decode("/images/foo.jpg");

        let source = selection.source.expect("legacy path should produce a source");
        assert_eq!(source.path, "/images/foo.jpg");
        assert_eq!((source.width, source.height), (0, 0));
        assert_eq!(source.source_id, 3);
        assert_eq!(selection.crop, CropRect::new(0, 0, 0, 0));
        assert_eq!(selection.alt_text, "");
    }

    #[test]
    fn empty_value_decodes_to_empty_selection() {
        assert!(codec().decode("   ").is_empty());
        assert!(codec().decode("").source.is_none());
    }

    #[test]
    fn non_object_json_is_treated_as_legacy_path() {
        let selection = codec().decode("12345");
        assert_eq!(selection.source_path(), "12345");
    }

    #[test]
    fn structured_value_is_decoded() {
        let raw = r#"{"sourceImg":{"src":"assets/a.jpg","width":1200,"height":800,"source":2},
                      "crop":{"x":10,"y":20,"width":600,"height":400},
                      "targetWidth":300,"targetHeight":200,"altTag":"A cat"}"#;
        assert_eq!(codec().decode(raw), sample());
    }

    #[test]
    fn lenient_numbers_from_old_editor_are_accepted() {
        let raw = r#"{"sourceImg":{"src":"b.png","width":"1000","height":1000},
                      "crop":{"x":0,"y":0,"width":1000,"height":333.3333}}"#;
        let selection = codec().decode(raw);

        assert_eq!(selection.crop, CropRect::new(0, 0, 1000, 333));
        let source = selection.source.expect("source should be decoded");
        assert_eq!(source.width, 1000);
        assert_eq!(source.source_id, 3);
    }

    #[test]
    fn false_source_image_decodes_to_empty() {
        let raw = r#"{"sourceImg":false,"crop":null,"altTag":"kept"}"#;
        let selection = codec().decode(raw);

        assert!(selection.source.is_none());
        assert_eq!(selection.crop, CropRect::default());
        assert_eq!(selection.alt_text, "kept");
    }

    #[test]
    fn encode_writes_targets_and_two_space_indent() {
        let encoded = codec().encode(&sample());

        assert!(encoded.contains("\n  \"altTag\": \"A cat\""));
        assert!(encoded.contains("\"targetWidth\": 300"));
        assert!(encoded.contains("\"targetHeight\": 200"));
        assert!(encoded.contains("\"src\": \"assets/a.jpg\""));
    }

    #[test]
    fn whitespace_only_difference_is_not_a_change() {
        let encoded = codec().encode(&sample());
        let compact = serde_json::to_string(
            &serde_json::from_str::<Value>(&encoded).expect("encoded value must be json"),
        )
        .expect("compact serialization failed");
        let reindented = encoded.replace("  ", "    ");

        assert!(!ValueCodec::has_changed(&encoded, &compact));
        assert!(!ValueCodec::has_changed(&encoded, &reindented));
    }

    #[test]
    fn key_order_difference_is_not_a_change() {
        let encoded = codec().encode(&sample());
        let reordered = r#"{"altTag":"A cat","targetHeight":200,"targetWidth":300,
            "crop":{"height":400,"width":600,"y":20,"x":10},
            "sourceImg":{"source":2,"height":800,"width":1200,"src":"assets/a.jpg"}}"#;

        assert!(!ValueCodec::has_changed(&encoded, reordered));
    }

    #[test]
    fn legacy_or_empty_stored_value_counts_as_changed() {
        let encoded = codec().encode(&sample());
        assert!(ValueCodec::has_changed(&encoded, ""));
        assert!(ValueCodec::has_changed(&encoded, "/images/foo.jpg"));
    }

    #[test]
    fn real_change_is_detected() {
        let mut changed = sample();
        changed.crop.x = 11;
        assert!(ValueCodec::has_changed(
            &codec().encode(&changed),
            &codec().encode(&sample())
        ));
    }

    fn arb_selection() -> impl Strategy<Value = ImageSelection> {
        (
            "[a-z]{1,8}(/[a-z0-9_]{1,8}){0,3}\\.(jpg|png)",
            0u32..10_000,
            0u32..10_000,
            0u32..10,
            (0u32..5000, 0u32..5000, 0u32..5000, 0u32..5000),
            ".{0,20}",
        )
            .prop_map(|(path, width, height, source_id, (x, y, w, h), alt)| {
                ImageSelection::with_source(
                    SourceImage {
                        path,
                        width,
                        height,
                        source_id,
                    },
                    CropRect::new(x, y, w, h),
                    alt,
                )
            })
    }

    proptest! {
        #[test]
        fn encode_decode_is_idempotent(selection in arb_selection()) {
            let codec = codec();
            let once = codec.encode(&codec.decode(&codec.encode(&selection)));
            let twice = codec.encode(&codec.decode(&once));
            prop_assert_eq!(&once, &twice);
            prop_assert_eq!(codec.decode(&once), selection);
        }

        #[test]
        fn encoded_value_is_already_normalized(selection in arb_selection()) {
            let encoded = codec().encode(&selection);
            prop_assert_eq!(ValueCodec::normalize(&encoded), Some(encoded.clone()));
            prop_assert!(!ValueCodec::has_changed(&encoded, &encoded));
        }
    }
}
