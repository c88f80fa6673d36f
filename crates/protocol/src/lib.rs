use anyhow::Result;
use geojson::FeatureCollection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const BUFFER_TOOL_NAME: &str = "buffer_analysis";

const BUFFER_TOOL_DESCRIPTION: &str = "Find features from one layer that are within a certain \
distance of features in another layer. Example: 'schools within 1 mile of pipelines'";

/// Distance units accepted by the buffer analysis.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Miles,
    Kilometers,
    Meters,
    Feet,
}

impl DistanceUnit {
    pub const ALL: [DistanceUnit; 4] = [
        DistanceUnit::Miles,
        DistanceUnit::Kilometers,
        DistanceUnit::Meters,
        DistanceUnit::Feet,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Meters => "meters",
            DistanceUnit::Feet => "feet",
        }
    }

    /// Exact, case-sensitive lookup. Collaborators are expected to send the
    /// lowercase names listed in the tool declaration.
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|unit| unit.as_str() == raw)
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four structured fields a collaborator supplies for a proximity question.
///
/// `unit` stays a raw string: an unknown unit is reported back to the user
/// instead of failing deserialization.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct QueryParams {
    pub target_layer: String,
    pub buffer_layer: String,
    pub distance: f64,
    pub unit: String,
}

impl QueryParams {
    pub fn new(
        target_layer: impl Into<String>,
        buffer_layer: impl Into<String>,
        distance: f64,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            target_layer: target_layer.into(),
            buffer_layer: buffer_layer.into(),
            distance,
            unit: unit.into(),
        }
    }
}

/// Arguments of the `buffer_analysis` tool as advertised to the collaborator.
#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct BufferToolArgs {
    /// The layer to search (e.g., 'schools', 'hospitals')
    pub target_layer: String,
    /// The layer to create a buffer around (e.g., 'pipelines', 'roads')
    pub buffer_layer: String,
    /// The buffer distance as a number (e.g., 1, 2.5)
    pub distance: f64,
    /// The unit of distance
    pub unit: DistanceUnit,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

pub fn buffer_tool_declaration() -> Result<ToolDeclaration> {
    let schema = schemars::schema_for!(BufferToolArgs);
    Ok(ToolDeclaration {
        name: BUFFER_TOOL_NAME.to_string(),
        description: BUFFER_TOOL_DESCRIPTION.to_string(),
        parameters: serde_json::to_value(schema)?,
    })
}

/// Count plus echoed parameters: everything a summarizer needs, no geometry.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResultSummary {
    pub count: usize,
    pub params: QueryParams,
}

/// The externally consumed answer to one question.
///
/// Message-only responses (validation failures, non-spatial replies) leave
/// every other field empty.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ChatResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features_geojson: Option<FeatureCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buffer_geojson: Option<FeatureCollection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<QueryParams>,
}

impl ChatResponse {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn is_message_only(&self) -> bool {
        self.count.is_none()
            && self.features_geojson.is_none()
            && self.buffer_geojson.is_none()
            && self.params.is_none()
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}
