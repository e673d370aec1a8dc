//! Serde helpers that keep NUMERIC columns as JSON numbers.
//!
//! A price stored as `12.50` must serialize as `12.5`, and payloads may send
//! prices as either numbers or numeric strings.

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use serde::{de, Deserialize, Deserializer, Serializer};
use std::str::FromStr;

pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    match value.to_f64() {
        Some(value) => serializer.serialize_f64(value),
        None => Err(serde::ser::Error::custom("Decimal is out of f64 range")),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

impl NumberOrString {
    fn into_decimal<E: de::Error>(self) -> Result<BigDecimal, E> {
        match self {
            NumberOrString::Number(value) => {
                BigDecimal::from_f64(value).ok_or_else(|| de::Error::custom("Invalid decimal"))
            }
            NumberOrString::String(value) => BigDecimal::from_str(value.as_str())
                .map_err(|err| de::Error::custom(format!("Invalid decimal: {}", err))),
        }
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    NumberOrString::deserialize(deserializer)?.into_decimal()
}

pub mod option {
    use super::NumberOrString;
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<BigDecimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigDecimal>, D::Error> {
        Option::<NumberOrString>::deserialize(deserializer)?
            .map(NumberOrString::into_decimal)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::str::FromStr;

    #[derive(Serialize, Deserialize)]
    struct Price {
        #[serde(with = "crate::utils::decimal")]
        amount: BigDecimal,
        #[serde(with = "crate::utils::decimal::option")]
        modifier: Option<BigDecimal>,
    }

    #[test]
    fn stored_decimal_serializes_as_number() {
        let price = Price {
            amount: BigDecimal::from_str("12.50").unwrap(),
            modifier: None,
        };

        let value = serde_json::to_value(&price).unwrap();
        assert_eq!(value, json!({ "amount": 12.5, "modifier": null }));
    }

    #[test]
    fn deserializes_from_number_or_string() {
        let from_number: Price = serde_json::from_value(json!({
            "amount": 12.5,
            "modifier": -1.25
        }))
        .unwrap();
        assert_eq!(from_number.amount, BigDecimal::from_str("12.5").unwrap());
        assert_eq!(
            from_number.modifier,
            Some(BigDecimal::from_str("-1.25").unwrap())
        );

        let from_string: Price = serde_json::from_value(json!({
            "amount": "12.50",
            "modifier": null
        }))
        .unwrap();
        assert_eq!(from_string.amount, BigDecimal::from_str("12.50").unwrap());
        assert_eq!(from_string.modifier, None);
    }
}
