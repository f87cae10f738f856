/*
[INPUT]:  Loosely typed JSON values (numbers, strings, empty objects)
[OUTPUT]: Decimal and optional field (de)serializers for the models
[POS]:    Data layer - serde helpers shared by models and responses
[UPDATE]: When the broker changes how numeric fields are encoded
*/

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use std::str::FromStr;

fn decimal_from_value<E: serde::de::Error>(value: &Value) -> Result<Option<Decimal>, E> {
    if value.is_null() {
        return Ok(None);
    }

    if let Some(raw) = value.as_str() {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        return Decimal::from_str(raw).map(Some).map_err(E::custom);
    }

    if value.is_number() {
        // Scientific notation shows up for tiny pip values
        let raw = value.to_string();
        return Decimal::from_str(&raw)
            .or_else(|_| Decimal::from_scientific(&raw))
            .map(Some)
            .map_err(E::custom);
    }

    Err(E::custom("invalid decimal value"))
}

pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value)?.ok_or_else(|| serde::de::Error::custom("missing decimal value"))
}

pub fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(decimal_from_value(&value)?.unwrap_or(Decimal::ZERO))
}

pub fn deserialize_decimal_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    decimal_from_value(&value)
}

pub fn serialize_decimal<S>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn serialize_decimal_opt<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(value) => serializer.serialize_str(&value.to_string()),
        None => serializer.serialize_none(),
    }
}

/// The broker sends `{}` where it means "nothing"
pub fn empty_object_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let is_empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if is_empty {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(serde::de::Error::custom)
}
