//! 宽松数值解析
//!
//! 宿主表单保存过的旧值与字段配置里，数值可能是整数、浮点（早期编辑器按比例计算后未取整）
//! 或数字字符串。这里统一收敛成非负整数 / 正比例，无法识别时回落为默认值而不是报错。

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 将任意 JSON 值解析为 `u32`。负数、非数字返回 `None`，浮点四舍五入，超限饱和。
pub(crate) fn value_to_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .map(saturate_u64)
            .or_else(|| number.as_f64().and_then(float_to_u32)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<u64>()
                .ok()
                .map(saturate_u64)
                .or_else(|| text.parse::<f64>().ok().and_then(float_to_u32))
        }
        _ => None,
    }
}

fn saturate_u64(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}

fn float_to_u32(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    Some(value.round().min(u32::MAX as f64) as u32)
}

pub(crate) fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u32(&value).unwrap_or(0))
}

pub(crate) fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_u32(&value))
}

/// 目标宽高比：缺省、空串、0 或负数均视为“未设置”。
pub(crate) fn positive_ratio<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let ratio = match &value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(ratio.filter(|r| r.is_finite() && *r > 0.0))
}

pub(crate) fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

/// 开关类配置：`true` / 非零数字 / `"1"`、`"true"`、`"yes"`。
pub(crate) fn bool_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(flag) => flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => matches!(
            text.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    })
}
