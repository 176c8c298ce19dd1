use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

use crate::error::RecordError;

/// Default boundary between Small (below) and Big (at or above)
pub const DEFAULT_BIG_THRESHOLD: u8 = 5;

/// Binary category of a draw number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    Big,
    Small,
}

impl Size {
    /// Classify a number with the default boundary (`Small` iff `0 <= n <= 4`)
    pub fn of(number: u8) -> Self {
        Self::classify(number, DEFAULT_BIG_THRESHOLD)
    }

    /// Classify a number against an explicit boundary
    pub fn classify(number: u8, big_threshold: u8) -> Self {
        if number < big_threshold {
            Size::Small
        } else {
            Size::Big
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Size::Big => "Big",
            Size::Small => "Small",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue identifier of a draw (period number)
///
/// Purely numeric ids compare numerically, anything else compares lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

impl IssueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }

    /// Decimal value of the final character, if it is a digit
    pub fn last_digit(&self) -> Option<u8> {
        self.0
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
    }

    /// The identifier of the following period.
    ///
    /// Increments the trailing digit run with carry and keeps its width unless
    /// every digit was a nine. Ids without trailing digits get a `1` appended.
    pub fn next(&self) -> IssueId {
        let bytes = self.0.as_bytes();
        let digits_start = bytes
            .iter()
            .rposition(|b| !b.is_ascii_digit())
            .map(|i| i + 1)
            .unwrap_or(0);

        if digits_start == bytes.len() {
            return IssueId(format!("{}1", self.0));
        }

        let (prefix, digits) = self.0.split_at(digits_start);
        let mut out: Vec<u8> = digits.bytes().collect();
        let mut carry = true;
        for b in out.iter_mut().rev() {
            if !carry {
                break;
            }
            if *b == b'9' {
                *b = b'0';
            } else {
                *b += 1;
                carry = false;
            }
        }

        let mut next = String::with_capacity(self.0.len() + 1);
        next.push_str(prefix);
        if carry {
            next.push('1');
        }
        // Only ASCII digits were written back
        next.extend(out.into_iter().map(char::from));
        IssueId(next)
    }
}

impl Ord for IssueId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_numeric(), other.is_numeric()) {
            (true, true) => {
                let a = self.0.trim_start_matches('0');
                let b = other.0.trim_start_matches('0');
                a.len()
                    .cmp(&b.len())
                    .then_with(|| a.cmp(b))
                    .then_with(|| self.0.len().cmp(&other.0.len()))
            }
            // Numeric ids sort before free-form ones to keep the order total
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for IssueId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueId {
    fn from(s: &str) -> Self {
        IssueId::new(s)
    }
}

/// One resolved draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRecord {
    #[serde(rename = "issueNumber")]
    pub issue: IssueId,
    pub number: u8,
    /// Color label, or a comma-joined label set such as `red,violet`
    pub color: String,
}

impl DrawRecord {
    pub fn new(issue: impl Into<String>, number: u8, color: impl Into<String>) -> Self {
        Self {
            issue: IssueId::new(issue),
            number,
            color: color.into(),
        }
    }

    pub fn size(&self) -> Size {
        Size::of(self.number)
    }
}

/// Loosely typed draw entry as it appears on the wire or on disk
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDraw {
    #[serde(rename = "issueNumber", default)]
    pub issue_number: Option<Value>,
    #[serde(default)]
    pub number: Option<Value>,
    #[serde(default)]
    pub color: Option<Value>,
}

impl TryFrom<RawDraw> for DrawRecord {
    type Error = RecordError;

    fn try_from(raw: RawDraw) -> Result<Self, Self::Error> {
        let issue = match raw.issue_number {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(RecordError::MissingField { field: "issueNumber" }),
        };

        let number = match raw.number {
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| RecordError::NonNumeric {
                value: n.to_string(),
            })?,
            Some(Value::String(s)) => {
                s.trim()
                    .parse::<i64>()
                    .map_err(|_| RecordError::NonNumeric { value: s.clone() })?
            }
            Some(other) => {
                return Err(RecordError::NonNumeric {
                    value: other.to_string(),
                })
            }
            None => return Err(RecordError::MissingField { field: "number" }),
        };
        if !(0..=9).contains(&number) {
            return Err(RecordError::OutOfRange { value: number });
        }

        let color = match raw.color {
            Some(Value::String(c)) if !c.trim().is_empty() => c.trim().to_string(),
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(RecordError::MissingField { field: "color" })
            }
            Some(other) => {
                return Err(RecordError::InvalidColor {
                    value: other.to_string(),
                })
            }
        };

        Ok(DrawRecord {
            issue: IssueId::new(issue),
            number: number as u8,
            color,
        })
    }
}

impl TryFrom<Value> for DrawRecord {
    type Error = RecordError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            return Err(RecordError::NotAnObject {
                value: value.to_string(),
            });
        }
        let raw: RawDraw =
            serde_json::from_value(value).map_err(|e| RecordError::NotAnObject {
                value: e.to_string(),
            })?;
        DrawRecord::try_from(raw)
    }
}
