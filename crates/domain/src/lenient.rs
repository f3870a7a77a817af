//! # 寛容なフィールドデコード
//!
//! ドキュメントのフィールドは書き込み元（顧客向けフォーム、管理画面、古いデータ）によって
//! 型が揺れる。`#[serde(deserialize_with = ...)]` で使うヘルパーを集め、
//! 想定外の型は `None` に落としてデコード全体を失敗させない。

use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::Value;

/// 文字列として扱えるものを取り出す（数値・真偽値は文字列化、空文字は `None`）
pub(crate) fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_string))
}

/// 数値、または数値として解釈できる文字列を取り出す
pub(crate) fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_f64))
}

/// 非負整数を取り出す（小数は切り捨て）
pub(crate) fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_to_f64)
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n.min(f64::from(u32::MAX)) as u32))
}

/// 真偽値を取り出す（それ以外は `None`）
pub(crate) fn opt_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_bool()))
}

/// 配列の各要素を寛容にデコードする
///
/// 配列でなければ `None`。デコードできない要素は既定値で置き換える。
/// 要素数を保つことで、明細の並びとログ上の位置が一致する。
pub(crate) fn opt_items<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

/// オブジェクトをデコードする。失敗時は `None`
pub(crate) fn opt_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// 住所オブジェクトの連結順。ここに無いキーは末尾にキー名順で続ける
const ADDRESS_KEYS: &[&str] = &["line1", "line2", "city", "state", "pincode"];

/// 住所を 1 行の文字列にする
///
/// フォームによって文字列で保存される場合と、`{line1, city, pincode}` のような
/// オブジェクトで保存される場合がある。オブジェクトは [`ADDRESS_KEYS`] の順に
/// 空でない値をカンマで連結する。
pub(crate) fn opt_address<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => {
            let known = ADDRESS_KEYS.iter().filter_map(|key| map.get(*key));
            let rest = map
                .iter()
                .filter(|(key, _)| !ADDRESS_KEYS.contains(&key.as_str()))
                .map(|(_, value)| value);
            let parts: Vec<String> = known.chain(rest).filter_map(value_to_string).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        Some(other) => value_to_string(&other),
        None => None,
    })
}

pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
