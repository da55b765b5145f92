use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::utils::helpers::take_json_field;

/// Status document returned by the submit call or by each poll.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub id: String,
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalyzeOutput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

/// Lifecycle of a long-running analysis. Matching is case-insensitive and
/// values the client does not know are kept as-is.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum OperationStatus {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Canceled,
    Other(String),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OperationError {
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<OperationError>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOutput {
    #[serde(default)]
    pub analyzer_id: String,
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Value>,
    #[serde(default)]
    pub contents: Vec<ContentItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_page_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, FieldValue>>,
}

/// An extracted value: its declared type, at most one populated value slot,
/// and the service's confidence in `[0, 1]`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldValue {
    #[serde(flatten)]
    pub data: FieldData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// The typed value slot of a [`FieldValue`], keyed on the wire by `type`
/// plus one `value<Type>` property.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldData {
    String { value: Option<String> },
    Date { value: Option<String> },
    Time { value: Option<String> },
    Number { value: Option<f64> },
    Integer { value: Option<i64> },
    Boolean { value: Option<bool> },
    Array { value: Vec<FieldValue> },
    Object { value: BTreeMap<String, FieldValue> },
    /// A type this client does not model, kept with its remaining keys.
    Unknown {
        type_name: String,
        rest: Map<String, Value>,
    },
}

impl Serialize for FieldData {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::String { value } => {
                map.serialize_entry("type", "string")?;
                if let Some(value) = value {
                    map.serialize_entry("valueString", value)?;
                }
            }
            Self::Date { value } => {
                map.serialize_entry("type", "date")?;
                if let Some(value) = value {
                    map.serialize_entry("valueDate", value)?;
                }
            }
            Self::Time { value } => {
                map.serialize_entry("type", "time")?;
                if let Some(value) = value {
                    map.serialize_entry("valueTime", value)?;
                }
            }
            Self::Number { value } => {
                map.serialize_entry("type", "number")?;
                if let Some(value) = value {
                    map.serialize_entry("valueNumber", value)?;
                }
            }
            Self::Integer { value } => {
                map.serialize_entry("type", "integer")?;
                if let Some(value) = value {
                    map.serialize_entry("valueInteger", value)?;
                }
            }
            Self::Boolean { value } => {
                map.serialize_entry("type", "boolean")?;
                if let Some(value) = value {
                    map.serialize_entry("valueBoolean", value)?;
                }
            }
            Self::Array { value } => {
                map.serialize_entry("type", "array")?;
                if !value.is_empty() {
                    map.serialize_entry("valueArray", value)?;
                }
            }
            Self::Object { value } => {
                map.serialize_entry("type", "object")?;
                if !value.is_empty() {
                    map.serialize_entry("valueObject", value)?;
                }
            }
            Self::Unknown { type_name, rest } => {
                map.serialize_entry("type", type_name)?;
                for (key, value) in rest {
                    map.serialize_entry(key, value)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldData {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(D::Error::custom)
    }
}

impl FieldData {
    fn from_raw(mut raw: Map<String, Value>) -> serde_json::Result<Self> {
        let type_name: String = take_json_field(&mut raw, "type")?
            .ok_or_else(|| serde_json::Error::missing_field("type"))?;

        Ok(match type_name.as_str() {
            "string" => Self::String {
                value: take_json_field(&mut raw, "valueString")?,
            },
            "date" => Self::Date {
                value: take_json_field(&mut raw, "valueDate")?,
            },
            "time" => Self::Time {
                value: take_json_field(&mut raw, "valueTime")?,
            },
            "number" => Self::Number {
                value: take_json_field(&mut raw, "valueNumber")?,
            },
            "integer" => Self::Integer {
                value: take_json_field(&mut raw, "valueInteger")?,
            },
            "boolean" => Self::Boolean {
                value: take_json_field(&mut raw, "valueBoolean")?,
            },
            "array" => Self::Array {
                value: take_json_field(&mut raw, "valueArray")?.unwrap_or_default(),
            },
            "object" => Self::Object {
                value: take_json_field(&mut raw, "valueObject")?.unwrap_or_default(),
            },
            _ => Self::Unknown {
                type_name,
                rest: raw,
            },
        })
    }
}

impl OperationStatus {
    /// Succeeded, Failed and Canceled end the polling loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::Running => "Running",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for OperationStatus {
    fn from(raw: String) -> Self {
        const KNOWN: [(&str, OperationStatus); 5] = [
            ("notstarted", OperationStatus::NotStarted),
            ("running", OperationStatus::Running),
            ("succeeded", OperationStatus::Succeeded),
            ("failed", OperationStatus::Failed),
            ("canceled", OperationStatus::Canceled),
        ];
        let lowered = raw.to_ascii_lowercase();
        KNOWN
            .into_iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, status)| status)
            .unwrap_or(OperationStatus::Other(raw))
    }
}

impl From<OperationStatus> for String {
    fn from(status: OperationStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnalyzeResult {
    pub fn is_succeeded(&self) -> bool {
        self.status == OperationStatus::Succeeded
    }

    /// Content items of a succeeded result, empty otherwise.
    pub fn contents(&self) -> &[ContentItem] {
        self.result
            .as_ref()
            .map(|output| output.contents.as_slice())
            .unwrap_or_default()
    }
}

impl ContentItem {
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.as_ref()?.get(name)
    }
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match &self.data {
            FieldData::String { value } | FieldData::Date { value } | FieldData::Time { value } => {
                value.as_deref()
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match &self.data {
            FieldData::Number { value } => *value,
            FieldData::Integer { value } => value.map(|v| v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self.data {
            FieldData::Boolean { value } => *value,
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match &self.data {
            FieldData::Array { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match &self.data {
            FieldData::Object { value } => Some(value),
            _ => None,
        }
    }
}
