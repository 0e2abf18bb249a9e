// used for timestamps in the store
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat};
// used for decimal numbers
use bigdecimal::BigDecimal;
// used to recognize the lexical forms of literals
use lazy_static::lazy_static;
use regex::Regex;

// used when parsing a string to a typed value
use std::str::FromStr;
// used for tag-scoped comparisons
use std::cmp::Ordering;
// used to print out readable forms of a data type
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::construct::Thing;
use crate::error::{OverlapError, Result};

lazy_static! {
    static ref DATE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    static ref ZONED: Regex = Regex::new(r"(Z|[+-]\d{2}:\d{2})$").unwrap();
}

pub trait DataType: fmt::Display + Eq + Send + Sync {
    // static stuff which needs to be implemented downstream
    const DATA_TYPE: &'static str;
    // the XML Schema datatype used when the value travels as a literal
    const XSD: &'static str;
    // instance callable with pre-made implementation
    fn data_type(&self) -> &'static str {
        Self::DATA_TYPE
    }
}

// ------------- Data Types --------------
impl DataType for Thing {
    const DATA_TYPE: &'static str = "Identifier";
    const XSD: &'static str = "xsd:anyURI";
}
impl DataType for String {
    const DATA_TYPE: &'static str = "Text";
    const XSD: &'static str = "xsd:string";
}
impl DataType for Time {
    const DATA_TYPE: &'static str = "Timestamp";
    const XSD: &'static str = "xsd:dateTime";
}
impl DataType for Decimal {
    const DATA_TYPE: &'static str = "Number";
    const XSD: &'static str = "xsd:decimal";
}

/// A timestamp. Equality, ordering and hashing go by the instant alone, so
/// `10:00:00Z` and `11:00:00+01:00` are the same value; printing gives back
/// the lexical form it was parsed from.
#[derive(Debug, Clone)]
pub struct Time {
    moment: DateTime<FixedOffset>,
    lexical: String,
}
impl Time {
    pub fn new(moment: DateTime<FixedOffset>) -> Time {
        Time {
            moment,
            lexical: moment.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }
}
impl PartialEq for Time {
    fn eq(&self, other: &Time) -> bool {
        self.moment == other.moment
    }
}
impl Eq for Time {}
impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Time) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Time {
    fn cmp(&self, other: &Time) -> Ordering {
        self.moment.cmp(&other.moment)
    }
}
impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.moment.hash(state);
    }
}
impl FromStr for Time {
    type Err = OverlapError;
    // Accepts RFC 3339, naive date-times (read as UTC) and plain dates (midnight UTC).
    fn from_str(s: &str) -> Result<Time> {
        let s = s.trim();
        let moment = if DATE.is_match(s) {
            NaiveDate::from_str(s)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|d| d.and_utc().fixed_offset())
        } else if ZONED.is_match(s) {
            DateTime::parse_from_rfc3339(s).ok()
        } else {
            NaiveDateTime::from_str(s).ok().map(|d| d.and_utc().fixed_offset())
        };
        match moment {
            Some(moment) => Ok(Time {
                moment,
                lexical: s.to_owned(),
            }),
            None => Err(OverlapError::Parse {
                message: format!("'{}' is not a timestamp", s),
            }),
        }
    }
}
impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.lexical)
    }
}

#[derive(Eq, PartialEq, Hash, PartialOrd, Ord, Clone, Debug)]
pub struct Decimal(BigDecimal);

impl FromStr for Decimal {
    type Err = OverlapError;
    fn from_str(s: &str) -> Result<Decimal> {
        BigDecimal::from_str(s.trim())
            .map(Decimal)
            .map_err(|_| OverlapError::Parse {
                message: format!("'{}' is not a number", s),
            })
    }
}
impl From<i64> for Decimal {
    fn from(n: i64) -> Decimal {
        Decimal(BigDecimal::from(n))
    }
}
impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ------------- Value -------------
// The closed set of things that may sit in the object slot of a fact.
// Equality is structural; ordering only exists within a tag.
#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub enum Value {
    Identifier(Thing),
    Text(String),
    Timestamp(Time),
    Number(Decimal),
}
impl Value {
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Identifier(t) => t.data_type(),
            Value::Text(s) => s.data_type(),
            Value::Timestamp(t) => t.data_type(),
            Value::Number(n) => n.data_type(),
        }
    }
    pub fn xsd(&self) -> &'static str {
        match self {
            Value::Identifier(_) => Thing::XSD,
            Value::Text(_) => String::XSD,
            Value::Timestamp(_) => Time::XSD,
            Value::Number(_) => Decimal::XSD,
        }
    }
    /// Tag-scoped comparison. Values of different tags are never coerced.
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Identifier(a), Value::Identifier(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Ok(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => Ok(a.cmp(b)),
            (a, b) => Err(OverlapError::TypeMismatch {
                left: a.tag(),
                right: b.tag(),
            }),
        }
    }
    pub fn thing(&self) -> Option<Thing> {
        match self {
            Value::Identifier(t) => Some(*t),
            _ => None,
        }
    }
    pub fn timestamp(s: &str) -> Result<Value> {
        Ok(Value::Timestamp(Time::from_str(s)?))
    }
    pub fn number(s: &str) -> Result<Value> {
        Ok(Value::Number(Decimal::from_str(s)?))
    }
    pub fn text(s: &str) -> Value {
        Value::Text(s.to_owned())
    }
}
impl From<Thing> for Value {
    fn from(t: Thing) -> Value {
        Value::Identifier(t)
    }
}
impl From<Time> for Value {
    fn from(t: Time) -> Value {
        Value::Timestamp(t)
    }
}
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Identifier(t) => write!(f, "#{}", t),
            Value::Text(s) => write!(f, "{}", s),
            Value::Timestamp(t) => write!(f, "{}", t),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}
