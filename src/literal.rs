use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::functions::ODataVersion;

/// A constant captured into the tree. Complex shapes produced by eager
/// constant evaluation land in `Collection`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
    Guid(Uuid),
    Binary(Vec<u8>),
    Enum { type_name: String, value: String },
    Collection(Vec<Literal>),
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}
impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}
impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}
impl From<i32> for Literal {
    fn from(n: i32) -> Self {
        Literal::Integer(n.into())
    }
}
impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Integer(n)
    }
}
impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Double(n)
    }
}
impl From<DateTime<Utc>> for Literal {
    fn from(t: DateTime<Utc>) -> Self {
        Literal::DateTime(t)
    }
}
impl From<NaiveDate> for Literal {
    fn from(d: NaiveDate) -> Self {
        Literal::Date(d)
    }
}
impl From<Uuid> for Literal {
    fn from(id: Uuid) -> Self {
        Literal::Guid(id)
    }
}

/// Protocol-correct encoding of constants is a boundary concern: the
/// formatter decides *that* a value position needs literal formatting and
/// hands the value here. `escaped` is set for filter-clause formatting and
/// doubles embedded single quotes.
pub trait LiteralFormatter {
    fn format_literal(&self, value: &Literal, escaped: bool) -> String;
}

/// Default formatter covering the wire-format generations: V3 wraps GUIDs,
/// datetimes, and binary data in typed quote forms; V4 uses the bare forms.
#[derive(Debug, Clone, Copy)]
pub struct DefaultLiteralFormatter {
    pub version: ODataVersion,
}

impl DefaultLiteralFormatter {
    pub fn new(version: ODataVersion) -> Self {
        Self { version }
    }

    fn quote(s: &str, escaped: bool) -> String {
        if escaped {
            format!("'{}'", s.replace('\'', "''"))
        } else {
            format!("'{s}'")
        }
    }
}

impl LiteralFormatter for DefaultLiteralFormatter {
    fn format_literal(&self, value: &Literal, escaped: bool) -> String {
        match value {
            Literal::Null => "null".to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Integer(n) => n.to_string(),
            Literal::Double(n) => {
                let s = n.to_string();
                if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
                    s
                } else {
                    format!("{s}.0")
                }
            }
            Literal::String(s) => Self::quote(s, escaped),
            Literal::DateTime(t) => match self.version {
                ODataVersion::V3 => {
                    format!("datetime'{}'", t.format("%Y-%m-%dT%H:%M:%S"))
                }
                ODataVersion::V4 => t.to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            Literal::Date(d) => match self.version {
                ODataVersion::V3 => format!("datetime'{}T00:00:00'", d.format("%Y-%m-%d")),
                ODataVersion::V4 => d.format("%Y-%m-%d").to_string(),
            },
            Literal::Guid(id) => match self.version {
                ODataVersion::V3 => format!("guid'{id}'"),
                ODataVersion::V4 => id.to_string(),
            },
            Literal::Binary(bytes) => match self.version {
                ODataVersion::V3 => {
                    let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                    format!("binary'{hex}'")
                }
                ODataVersion::V4 => format!("binary'{}'", BASE64.encode(bytes)),
            },
            Literal::Enum { type_name, value } => {
                format!("{type_name}'{value}'")
            }
            Literal::Collection(items) => {
                let parts: Vec<String> = items
                    .iter()
                    .map(|item| self.format_literal(item, escaped))
                    .collect();
                format!("({})", parts.join(","))
            }
        }
    }
}
