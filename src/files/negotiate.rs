//! Response representation chosen from a client preference.
//!
//! The preference string is matched by substring against `text/plain`,
//! `application/xml` and `application/json`, in that order. Anything else
//! falls back to JSON of the full payload instead of the summary.

use std::fmt;

use anyhow::Context;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::Result;

/// Used when neither an explicit nor an implicit preference was given.
pub const DEFAULT_PREFERENCE: &str = "application/json";

const XML_ROOT: &str = "response";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i64),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(n) => write!(f, "{n}"),
            Value::Null => Ok(()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(s) => serializer.serialize_str(s),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Null => serializer.serialize_none(),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Data handed to the negotiator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A single named value. Plain text renders it as `key:value`.
    Scalar { key: &'static str, value: Value },
    /// Several named values in order. Plain text renders `key: value` lines.
    Record(Vec<(&'static str, Value)>),
}

impl Payload {
    pub fn scalar(key: &'static str, value: impl Into<Value>) -> Self {
        Payload::Scalar {
            key,
            value: value.into(),
        }
    }

    fn fields(&self) -> Vec<(&'static str, &Value)> {
        match self {
            Payload::Scalar { key, value } => vec![(*key, value)],
            Payload::Record(fields) => fields.iter().map(|(k, v)| (*k, v)).collect(),
        }
    }

    pub fn to_plain_text(&self) -> String {
        match self {
            Payload::Scalar { key, value } => format!("{key}:{value}"),
            Payload::Record(fields) => fields
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self).context("Failed to serialize JSON response")?)
    }

    /// One element per key under a `<response>` root, without type attributes.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .context("Failed to write XML declaration")?;
        writer
            .write_event(Event::Start(BytesStart::new(XML_ROOT)))
            .context("Failed to write XML root")?;
        for (key, value) in self.fields() {
            writer
                .write_event(Event::Start(BytesStart::new(key)))
                .context("Failed to write XML element")?;
            let text = value.to_string();
            if !text.is_empty() {
                writer
                    .write_event(Event::Text(BytesText::new(&text)))
                    .context("Failed to write XML text")?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(key)))
                .context("Failed to write XML element")?;
        }
        writer
            .write_event(Event::End(BytesEnd::new(XML_ROOT)))
            .context("Failed to write XML root")?;
        Ok(String::from_utf8(writer.into_inner()).context("XML output is not UTF-8")?)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = self.fields();
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    PlainText,
    Xml,
    Json,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlainText => "text/plain",
            Self::Xml => "application/xml",
            Self::Json => "application/json",
        }
    }

    /// First canonical token contained in `preference`.
    pub fn from_preference(preference: &str) -> Option<Self> {
        [Self::PlainText, Self::Xml, Self::Json]
            .into_iter()
            .find(|media| preference.contains(media.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub body: String,
    pub media_type: MediaType,
}

/// The explicit preference wins unless it is missing or empty.
pub fn resolve_preference<'a>(explicit: Option<&'a str>, implicit: Option<&'a str>) -> &'a str {
    explicit
        .filter(|p| !p.is_empty())
        .or(implicit)
        .unwrap_or(DEFAULT_PREFERENCE)
}

/// Render `summary` in the preferred media type, or `full` as JSON when the
/// preference names none of the supported types.
pub fn negotiate(
    summary: &Payload,
    full: &Payload,
    explicit: Option<&str>,
    implicit: Option<&str>,
) -> Result<Rendered> {
    let preference = resolve_preference(explicit, implicit);
    let rendered = match MediaType::from_preference(preference) {
        Some(MediaType::PlainText) => Rendered {
            body: summary.to_plain_text(),
            media_type: MediaType::PlainText,
        },
        Some(MediaType::Xml) => Rendered {
            body: summary.to_xml()?,
            media_type: MediaType::Xml,
        },
        Some(MediaType::Json) => Rendered {
            body: summary.to_json()?,
            media_type: MediaType::Json,
        },
        None => Rendered {
            body: full.to_json()?,
            media_type: MediaType::Json,
        },
    };
    Ok(rendered)
}
