use serde::{Deserialize, Serialize};

use crate::models::field_schema::FieldSchema;

/// Caller-supplied configuration for a custom analyzer, sent verbatim on
/// create/replace.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_schema: Option<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AnalyzerConfig>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_details: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_face: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_ocr: Option<bool>,
}

/// What the service echoes back for an analyzer, plus the fields it assigns.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_schema: Option<FieldSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<AnalyzerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_date_time: Option<String>,
}

/// One page of `GET /contentunderstanding/analyzers`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerList {
    #[serde(default)]
    pub value: Vec<AnalyzerResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl AnalyzerDefinition {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn with_scenario(mut self, scenario: impl Into<String>) -> Self {
        self.scenario = Some(scenario.into());
        self
    }

    pub fn with_field_schema(mut self, schema: FieldSchema) -> Self {
        self.field_schema = Some(schema);
        self
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = Some(config);
        self
    }
}
