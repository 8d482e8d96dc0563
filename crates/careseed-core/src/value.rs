//! PostgreSQL literal rendering for generated values.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifier::Identifier;

const DATE_FORMAT: &str = "%Y-%m-%d";
/// Layout of timestamp literals, also used inside JSON payloads.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Column names that must be double-quoted in an insert column list.
const RESERVED_COLUMNS: &[&str] = &["check", "default", "group", "order", "references", "user"];

/// Exact monetary amount in pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_pence(pence: i64) -> Self {
        Self(pence)
    }

    pub fn pence(self) -> i64 {
        self.0
    }

    /// `self * rate`, rounded half away from zero to the nearest penny.
    pub fn apply_rate(self, rate: f64) -> Money {
        Money((self.0 as f64 * rate).round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// Value of one column in a generated record.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Money(Money),
    Text(String),
    Uuid(Identifier),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Json(Value),
    UuidArray(Vec<Identifier>),
}

impl SqlValue {
    /// Encode any serializable value as a JSON column.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<SqlValue> {
        serde_json::to_value(value).map(SqlValue::Json).map_err(|err| {
            Error::Serialization(format!("value is not representable as JSON: {err}"))
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_money(&self) -> Option<Money> {
        match self {
            SqlValue::Money(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }


    /// Render as a PostgreSQL literal.
    pub fn render(&self) -> Result<String> {
        match self {
            SqlValue::Null => Ok("NULL".to_string()),
            SqlValue::Bool(value) => Ok(if *value { "true" } else { "false" }.to_string()),
            SqlValue::Int(value) => Ok(value.to_string()),
            SqlValue::Float(value) => {
                if !value.is_finite() {
                    return Err(Error::Serialization(format!(
                        "non-finite float {value} has no SQL literal"
                    )));
                }
                Ok(value.to_string())
            }
            SqlValue::Money(value) => Ok(value.to_string()),
            SqlValue::Text(value) => Ok(quote(value)),
            SqlValue::Uuid(value) => Ok(quote(&value.to_string())),
            SqlValue::Date(value) => Ok(quote(&value.format(DATE_FORMAT).to_string())),
            SqlValue::Timestamp(value) => Ok(quote(&value.format(TIMESTAMP_FORMAT).to_string())),
            SqlValue::Json(value) => {
                let encoded = serde_json::to_string(value)
                    .map_err(|err| Error::Serialization(err.to_string()))?;
                Ok(format!("{}::jsonb", quote(&encoded)))
            }
            SqlValue::UuidArray(values) => {
                let items: Vec<String> = values.iter().map(|id| quote(&id.to_string())).collect();
                Ok(format!("ARRAY[{}]::uuid[]", items.join(", ")))
            }
        }
    }
}

/// Double every single quote.
pub fn escape_text(value: &str) -> String {
    value.replace('\'', "''")
}

/// Inverse of [`escape_text`].
pub fn unescape_text(value: &str) -> String {
    value.replace("''", "'")
}

/// Column name as it must appear in an insert column list.
pub fn quote_column(name: &str) -> String {
    if RESERVED_COLUMNS.contains(&name) {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", escape_text(value))
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<u32> for SqlValue {
    fn from(value: u32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<Money> for SqlValue {
    fn from(value: Money) -> Self {
        SqlValue::Money(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Identifier> for SqlValue {
    fn from(value: Identifier) -> Self {
        SqlValue::Uuid(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        SqlValue::Date(value)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl From<Value> for SqlValue {
    fn from(value: Value) -> Self {
        SqlValue::Json(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_scalars_in_postgres_syntax() {
        assert_eq!(SqlValue::Null.render().unwrap(), "NULL");
        assert_eq!(SqlValue::Bool(true).render().unwrap(), "true");
        assert_eq!(SqlValue::Bool(false).render().unwrap(), "false");
        assert_eq!(SqlValue::Int(42).render().unwrap(), "42");
        assert_eq!(SqlValue::Float(4.5).render().unwrap(), "4.5");
        assert_eq!(
            SqlValue::Money(Money::from_pence(-5000)).render().unwrap(),
            "-50.00"
        );
        assert_eq!(
            SqlValue::Money(Money::from_pence(100_005)).render().unwrap(),
            "1000.05"
        );
    }

    #[test]
    fn doubles_single_quotes_in_text() {
        let rendered = SqlValue::from("O'Brien's note").render().unwrap();
        assert_eq!(rendered, "'O''Brien''s note'");

        let inner = &rendered[1..rendered.len() - 1];
        assert_eq!(unescape_text(inner), "O'Brien's note");
    }

    #[test]
    fn escapes_json_literals_too() {
        let value = SqlValue::Json(json!({"name": "St Mary's"}));
        assert_eq!(
            value.render().unwrap(),
            r#"'{"name":"St Mary''s"}'::jsonb"#
        );
    }

    #[test]
    fn renders_dates_and_timestamps_quoted() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let ts = date.and_hms_opt(8, 5, 0).unwrap();
        assert_eq!(SqlValue::Date(date).render().unwrap(), "'2024-03-09'");
        assert_eq!(
            SqlValue::Timestamp(ts).render().unwrap(),
            "'2024-03-09T08:05:00'"
        );
    }

    #[test]
    fn renders_uuid_arrays_with_cast() {
        let id: Identifier = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(
            SqlValue::UuidArray(vec![id]).render().unwrap(),
            "ARRAY['67e55044-10b1-426f-9247-bb680e5fe0c8']::uuid[]"
        );
        assert_eq!(
            SqlValue::UuidArray(Vec::new()).render().unwrap(),
            "ARRAY[]::uuid[]"
        );
    }

    #[test]
    fn non_finite_floats_fail_fast() {
        let err = SqlValue::Float(f64::NAN).render().expect_err("nan");
        assert!(matches!(err, Error::Serialization(_)));
        assert!(SqlValue::Float(f64::INFINITY).render().is_err());
    }

    #[test]
    fn json_rejects_unrepresentable_values() {
        let mut map = std::collections::HashMap::new();
        map.insert((1, 2), "tuple keys");
        assert!(matches!(SqlValue::json(&map), Err(Error::Serialization(_))));
    }

    #[test]
    fn option_maps_none_to_null() {
        let none: Option<Identifier> = None;
        assert!(SqlValue::from(none).is_null());
    }

    #[test]
    fn money_rate_rounds_to_nearest_penny() {
        assert_eq!(Money::from_pence(12_345).apply_rate(0.20), Money::from_pence(2_469));
        assert_eq!(Money::from_pence(100_000).apply_rate(0.12), Money::from_pence(12_000));
    }

    #[test]
    fn reserved_columns_are_quoted() {
        assert_eq!(quote_column("references"), "\"references\"");
        assert_eq!(quote_column("agency_id"), "agency_id");
    }
}
