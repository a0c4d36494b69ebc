use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

pub const QUERY: &str = "query";
pub const TABLE_NAME: &str = "table_name";
pub const TILE_STYLE: &str = "tile_style";
pub const SQL_WRAP: &str = "sql_wrap";
pub const STYLE_PROPERTIES: &str = "style_properties";
pub const SOURCE: &str = "source";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayerKindError {
    #[error("unknown layer kind: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LayerKind {
    Carto,
    Torque,
    Tiled,
    Background,
    Gmapsbase,
    Wms,
}

impl LayerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Carto => "carto",
            Self::Torque => "torque",
            Self::Tiled => "tiled",
            Self::Background => "background",
            Self::Gmapsbase => "gmapsbase",
            Self::Wms => "wms",
        }
    }

    /// Layers rendered from a SQL query against user tables.
    pub fn is_data_layer(self) -> bool {
        matches!(self, Self::Carto | Self::Torque)
    }

    pub fn is_base_layer(self) -> bool {
        matches!(
            self,
            Self::Tiled | Self::Background | Self::Gmapsbase | Self::Wms
        )
    }
}

impl FromStr for LayerKind {
    type Err = LayerKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "carto" => Ok(Self::Carto),
            "torque" => Ok(Self::Torque),
            "tiled" => Ok(Self::Tiled),
            "background" => Ok(Self::Background),
            "gmapsbase" => Ok(Self::Gmapsbase),
            "wms" => Ok(Self::Wms),
            other => Err(LayerKindError::Unknown(other.to_string())),
        }
    }
}

impl TryFrom<String> for LayerKind {
    type Error = LayerKindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LayerKind> for String {
    fn from(kind: LayerKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(Uuid);

impl LayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A map layer as held in memory by the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<LayerId>,
    pub kind: LayerKind,
    #[serde(default)]
    pub options: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl Layer {
    pub fn new(kind: LayerKind) -> Self {
        Self {
            id: None,
            kind,
            options: Map::new(),
            order: None,
        }
    }

    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// String-valued option; `None` when absent, null or not a string.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    pub fn set_option_str(&mut self, key: &str, value: String) {
        self.options.insert(key.to_string(), Value::String(value));
    }

    pub fn query(&self) -> Option<&str> {
        self.option_str(QUERY)
    }

    pub fn table_name(&self) -> Option<&str> {
        self.option_str(TABLE_NAME)
    }

    pub fn tile_style(&self) -> Option<&str> {
        self.option_str(TILE_STYLE)
    }

    pub fn is_data_layer(&self) -> bool {
        self.kind.is_data_layer()
    }

    pub fn is_base_layer(&self) -> bool {
        self.kind.is_base_layer()
    }

    /// Same kind and options, detached from any stored row.
    pub fn copy(&self) -> Self {
        Self {
            id: None,
            kind: self.kind,
            options: self.options.clone(),
            order: None,
        }
    }

    /// Styling snapshot for layers fed by an analysis source node.
    pub fn node_style(&self) -> Option<LayerNodeStyle> {
        let source_id = self.option_str(SOURCE)?.to_string();
        Some(LayerNodeStyle {
            source_id,
            tile_style: self.options.get(TILE_STYLE).cloned(),
            sql_wrap: self.options.get(SQL_WRAP).cloned(),
            style_properties: self.options.get(STYLE_PROPERTIES).cloned(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerNodeStyle {
    pub source_id: String,
    pub tile_style: Option<Value>,
    pub sql_wrap: Option<Value>,
    pub style_properties: Option<Value>,
}
