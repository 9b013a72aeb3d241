//! Lenient field decoders. The backend is not consistent about sending
//! numbers as JSON numbers, so numeric fields also accept numeric strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Reads a JSON number or numeric string.
pub fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number))
}

/// Explicit `null` decodes like an absent field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn opt_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(opt_f64(deserializer)?
        .filter(|n| *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Amounts {
        #[serde(default, deserialize_with = "opt_f64")]
        amount: Option<f64>,
        #[serde(default, deserialize_with = "opt_u32")]
        age: Option<u32>,
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let p: Amounts = serde_json::from_str(r#"{"amount": "12.5", "age": 31}"#).unwrap();
        assert_eq!(p.amount, Some(12.5));
        assert_eq!(p.age, Some(31));

        let p: Amounts = serde_json::from_str(r#"{"amount": null, "age": "abc"}"#).unwrap();
        assert_eq!(p.amount, None);
        assert_eq!(p.age, None);

        let p: Amounts = serde_json::from_str("{}").unwrap();
        assert_eq!(p.amount, None);
    }

    #[derive(Deserialize)]
    struct Labelled {
        #[serde(default, deserialize_with = "null_as_default")]
        label: String,
    }

    #[test]
    fn null_reads_as_default() {
        let l: Labelled = serde_json::from_str(r#"{"label": null}"#).unwrap();
        assert_eq!(l.label, "");

        let l: Labelled = serde_json::from_str(r#"{"label": "x"}"#).unwrap();
        assert_eq!(l.label, "x");
    }
}
