use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map($name)
            }
        }
    };
}

id_newtype!(OrderId);
id_newtype!(StatusId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid monetary amount '{0}'")]
pub struct InvalidAmount(pub String);

/// Monetary amount in cents. The backend serializes decimals either as JSON
/// numbers or as strings like `"1234.50"`; both are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    cents: i64,
}

impl Money {
    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    pub const fn cents(self) -> i64 {
        self.cents
    }

    /// Parses a decimal literal, rounding half away from zero to two places.
    pub fn from_decimal_str(raw: &str) -> Result<Self, InvalidAmount> {
        let invalid = || InvalidAmount(raw.to_string());
        let text = raw.trim();
        if text.contains(|c: char| c == 'e' || c == 'E') {
            let value: f64 = text.parse().map_err(|_| invalid())?;
            let cents = (value * 100.0).round();
            if !cents.is_finite() || cents.abs() > i64::MAX as f64 {
                return Err(invalid());
            }
            return Ok(Self::from_cents(cents as i64));
        }

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let mut digits = frac.bytes().map(|b| i64::from(b - b'0'));
        let tenths = digits.next().unwrap_or(0);
        let hundredths = digits.next().unwrap_or(0);
        let round_up = digits.next().is_some_and(|d| d >= 5);

        let cents = whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(tenths * 10 + hundredths + i64::from(round_up)))
            .ok_or_else(invalid)?;
        Ok(Self::from_cents(if negative { -cents } else { cents }))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let abs = self.cents.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl FromStr for Money {
    type Err = InvalidAmount;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Money::from_decimal_str(&text).map_err(de::Error::custom)
    }
}

/// Backend timestamps: RFC 3339, or ISO 8601 without an offset read as UTC.
pub mod backend_timestamp {
    use chrono::{DateTime, FixedOffset, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw).or_else(|rfc_err| {
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
                .map(|naive| naive.and_utc().fixed_offset())
                .ok_or(rfc_err)
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<FixedOffset>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(|err| de::Error::custom(format!("invalid timestamp '{raw}': {err}")))
    }

    pub fn deserialize_option<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<FixedOffset>>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) => parse(&raw).map(Some).map_err(|err| {
                de::Error::custom(format!("invalid timestamp '{raw}': {err}"))
            }),
            None => Ok(None),
        }
    }
}

/// One row of the orders table as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    #[serde(rename = "numero_pedido")]
    pub order_number: i64,
    #[serde(rename = "nome_cliente")]
    pub customer_name: String,
    #[serde(rename = "nome_produto", default)]
    pub product_name: String,
    #[serde(rename = "quantidade", default)]
    pub quantity: i64,
    #[serde(rename = "valor_pedido")]
    pub amount: Money,
    #[serde(rename = "status_nome", default)]
    pub status_name: String,
    #[serde(rename = "status_cor", default)]
    pub status_color: Option<String>,
    #[serde(rename = "criado_em", deserialize_with = "backend_timestamp::deserialize")]
    pub created_at: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusOption {
    pub id: StatusId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "cor_css", default)]
    pub css_color: Option<String>,
    #[serde(rename = "ordem", default)]
    pub position: Option<i64>,
    #[serde(rename = "ativo", default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: OrderId,
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "numero_pedido")]
    pub order_number: i64,
    #[serde(rename = "nome_cliente")]
    pub customer_name: String,
    #[serde(rename = "documento_cliente", default)]
    pub customer_document: String,
    #[serde(rename = "email_cliente", default)]
    pub customer_email: String,
    #[serde(rename = "valor_pedido")]
    pub amount: Money,
    #[serde(rename = "custo_envio", default)]
    pub shipping_cost: Option<Money>,
    #[serde(rename = "etiqueta_envio", default)]
    pub shipping_label_url: Option<String>,
    #[serde(rename = "metodo_envio", default)]
    pub shipping_method: Option<i64>,
    pub status: StatusOption,
    #[serde(rename = "criado_em", deserialize_with = "backend_timestamp::deserialize")]
    pub created_at: DateTime<FixedOffset>,
    #[serde(
        rename = "atualizado_em",
        default,
        deserialize_with = "backend_timestamp::deserialize_option"
    )]
    pub updated_at: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
