use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{ContentUnderstandingError, Result};
use crate::utils::helpers::take_json_field;

const REF_KEY: &str = "$ref";
const DEFINITIONS_PREFIX: &str = "#/$defs/";

/// Describes what a custom analyzer extracts.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FieldSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub definitions: BTreeMap<String, FieldDefinition>,
}

/// One node of the recursive schema.
///
/// The shape lives in [`FieldKind`], so an array always carries `items`
/// and an object always carries `properties`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldDefinition {
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<FieldMethod>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// The `type` of a field plus whatever that type requires.
///
/// Serialized by hand: `$ref` nodes carry no `type`, and types this client
/// does not model keep their remaining keys.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    String,
    Date,
    Time,
    Number,
    Integer,
    Boolean,
    Array {
        items: Box<FieldDefinition>,
    },
    Object {
        properties: BTreeMap<String, FieldDefinition>,
    },
    /// `{"$ref": "#/$defs/Name"}`, resolved against [`FieldSchema::definitions`].
    Ref {
        reference: String,
    },
    Other {
        type_name: String,
        rest: Map<String, Value>,
    },
}

impl Serialize for FieldKind {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::String => map.serialize_entry("type", "string")?,
            Self::Date => map.serialize_entry("type", "date")?,
            Self::Time => map.serialize_entry("type", "time")?,
            Self::Number => map.serialize_entry("type", "number")?,
            Self::Integer => map.serialize_entry("type", "integer")?,
            Self::Boolean => map.serialize_entry("type", "boolean")?,
            Self::Array { items } => {
                map.serialize_entry("type", "array")?;
                map.serialize_entry("items", items)?;
            }
            Self::Object { properties } => {
                map.serialize_entry("type", "object")?;
                map.serialize_entry("properties", properties)?;
            }
            Self::Ref { reference } => map.serialize_entry(REF_KEY, reference)?,
            Self::Other { type_name, rest } => {
                map.serialize_entry("type", type_name)?;
                for (key, value) in rest {
                    map.serialize_entry(key, value)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldKind {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        Self::from_raw(raw).map_err(D::Error::custom)
    }
}

impl FieldKind {
    fn from_raw(mut raw: Map<String, Value>) -> serde_json::Result<Self> {
        if let Some(reference) = take_json_field(&mut raw, REF_KEY)? {
            return Ok(Self::Ref { reference });
        }
        let type_name: String = take_json_field(&mut raw, "type")?
            .ok_or_else(|| serde_json::Error::missing_field("type"))?;

        Ok(match type_name.as_str() {
            "string" => Self::String,
            "date" => Self::Date,
            "time" => Self::Time,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "array" => Self::Array {
                items: take_json_field(&mut raw, "items")?
                    .ok_or_else(|| serde_json::Error::missing_field("items"))?,
            },
            "object" => Self::Object {
                properties: take_json_field(&mut raw, "properties")?
                    .ok_or_else(|| serde_json::Error::missing_field("properties"))?,
            },
            _ => Self::Other {
                type_name,
                rest: raw,
            },
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FieldMethod {
    Extract,
    Classify,
    Generate,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Adds a shared definition that fields can point at with
    /// [`FieldDefinition::reference`].
    pub fn with_definition(mut self, name: impl Into<String>, field: FieldDefinition) -> Self {
        self.definitions.insert(name.into(), field);
        self
    }

    /// Checks the rules serde cannot express: non-blank field names at every
    /// level, an `enum` list on every `classify` field and `#/$defs/` references
    /// that resolve.
    pub fn validate(&self) -> Result<()> {
        for (name, field) in self.fields.iter().chain(self.definitions.iter()) {
            check_name(name, "fieldSchema")?;
            field.validate(name, &self.definitions)?;
        }
        Ok(())
    }
}

impl FieldDefinition {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            description: None,
            method: None,
            enum_values: None,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::of(FieldKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn date() -> Self {
        Self::of(FieldKind::Date)
    }

    pub fn time() -> Self {
        Self::of(FieldKind::Time)
    }

    pub fn array(items: FieldDefinition) -> Self {
        Self::of(FieldKind::Array {
            items: Box::new(items),
        })
    }

    pub fn object<I, K>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, FieldDefinition)>,
        K: Into<String>,
    {
        Self::of(FieldKind::Object {
            properties: properties
                .into_iter()
                .map(|(name, field)| (name.into(), field))
                .collect(),
        })
    }

    /// Points at the schema definition called `name`.
    pub fn reference(name: &str) -> Self {
        Self::of(FieldKind::Ref {
            reference: format!("{DEFINITIONS_PREFIX}{name}"),
        })
    }

    /// A string field whose value is chosen from `values`.
    pub fn classify<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Some(FieldMethod::Classify),
            enum_values: Some(values.into_iter().map(Into::into).collect()),
            ..Self::string()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_method(mut self, method: FieldMethod) -> Self {
        self.method = Some(method);
        self
    }

    fn validate(&self, path: &str, definitions: &BTreeMap<String, FieldDefinition>) -> Result<()> {
        if self.method == Some(FieldMethod::Classify)
            && self.enum_values.as_ref().is_none_or(|values| values.is_empty())
        {
            return Err(ContentUnderstandingError::validation(format!(
                "field '{path}' uses method 'classify' but declares no enum values"
            )));
        }
        match &self.kind {
            FieldKind::Array { items } => items.validate(&format!("{path}[]"), definitions),
            FieldKind::Object { properties } => {
                for (name, field) in properties {
                    check_name(name, path)?;
                    field.validate(&format!("{path}.{name}"), definitions)?;
                }
                Ok(())
            }
            FieldKind::Ref { reference } => check_reference(reference, path, definitions),
            _ => Ok(()),
        }
    }
}

/// Only local `#/$defs/` targets are checked; other references are passed
/// through to the service.
fn check_reference(
    reference: &str,
    path: &str,
    definitions: &BTreeMap<String, FieldDefinition>,
) -> Result<()> {
    if reference.trim().is_empty() {
        return Err(ContentUnderstandingError::validation(format!(
            "field '{path}' has a blank $ref"
        )));
    }
    match reference.strip_prefix(DEFINITIONS_PREFIX) {
        Some(name) if !definitions.contains_key(name) => {
            Err(ContentUnderstandingError::validation(format!(
                "field '{path}' references undefined definition '{name}'"
            )))
        }
        _ => Ok(()),
    }
}

fn check_name(name: &str, parent: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ContentUnderstandingError::validation(format!(
            "blank field name under '{parent}'"
        )));
    }
    Ok(())
}
