//! Canonical node type descriptors
//!
//! A [`NodeDefinition`] is the registry-facing description of a node type:
//! its ordered input and output ports and its editable parameters. The same
//! shape is produced by the DSL synthesizer, shipped to editors as JSON, and
//! loaded from YAML node libraries.
//!
//! # Example
//!
//! ```yaml
//! type: Threshold
//! category: filters
//! description: Binarize an image
//! inputs:
//!   - name: in
//!     type: image
//!     displayName: In
//!     description: Source image
//! outputs:
//!   - name: out
//!     type: image
//!     displayName: Out
//!     description: Thresholded image
//! parameters:
//!   - name: level
//!     type: slider
//!     displayName: Level
//!     description: Cut-off level
//!     defaultValue: 128
//!     min: 0
//!     max: 255
//!     step: 1
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::{Error, Result};

/// Data type carried by a port
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Image buffer
    Image,
    /// Scalar number
    Number,
    /// Raw bytes
    Binary,
    /// Ordered collection
    Array,
    /// Structured record
    Object,
    /// Accepts anything
    #[default]
    Any,
}

impl PortType {
    /// Match a declared type name, case-insensitively. Unknown names map to `Any`.
    pub fn from_dsl(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "image" => PortType::Image,
            "number" => PortType::Number,
            "binary" => PortType::Binary,
            "array" => PortType::Array,
            "object" => PortType::Object,
            _ => PortType::Any,
        }
    }
}

/// Kind of editable control backing a parameter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// Free text
    #[default]
    Text,
    /// Bounded number input
    Number,
    /// Bounded slider
    Slider,
    /// Closed set of options
    Dropdown,
}

impl ParameterKind {
    /// Match a declared kind name, case-insensitively. Unknown names map to `Text`.
    pub fn from_dsl(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "number" => ParameterKind::Number,
            "slider" => ParameterKind::Slider,
            "dropdown" => ParameterKind::Dropdown,
            _ => ParameterKind::Text,
        }
    }

    /// Whether the kind carries min/max/step bounds
    pub fn is_numeric(&self) -> bool {
        matches!(self, ParameterKind::Number | ParameterKind::Slider)
    }
}

/// A named, typed connection point on a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortDefinition {
    /// Port name (unique among the inputs, or among the outputs, of a type)
    pub name: String,

    /// Data type tag
    #[serde(rename = "type", default)]
    pub data_type: PortType,

    /// User-facing name
    pub display_name: String,

    /// Description
    #[serde(default)]
    pub description: String,
}

/// An editable parameter of a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Parameter name (unique within a type)
    pub name: String,

    /// Control kind
    #[serde(rename = "type", default)]
    pub kind: ParameterKind,

    /// User-facing name
    pub display_name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Constraint literals as declared
    #[serde(default)]
    pub constraints: Vec<Value>,

    /// Value used when an instance supplies none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Lower bound (number and slider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    /// Upper bound (number and slider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    /// Increment (number and slider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,

    /// Allowed values (dropdown)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl ParameterDefinition {
    /// Create a parameter with no constraints, bounds or default
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            description: String::new(),
            name,
            kind,
            constraints: Vec::new(),
            default_value: None,
            min: None,
            max: None,
            step: None,
            options: None,
        }
    }
}

/// Canonical description of a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    /// Registry key
    #[serde(rename = "type")]
    pub type_key: String,

    /// Palette category
    pub category: String,

    /// Description of what the node does
    #[serde(default)]
    pub description: String,

    /// Optional icon identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Ordered input ports
    #[serde(default)]
    pub inputs: Vec<PortDefinition>,

    /// Ordered output ports
    #[serde(default)]
    pub outputs: Vec<PortDefinition>,

    /// Ordered parameters
    #[serde(default)]
    pub parameters: Vec<ParameterDefinition>,
}

impl NodeDefinition {
    /// Look up a parameter by name
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check the descriptor invariants: non-empty type key and names, unique
    /// port names per direction, unique parameter names.
    ///
    /// Used for descriptors that arrive from outside the compiler (node
    /// libraries); the DSL synthesizer runs its own, looser validation.
    pub fn validate(&self) -> Result<()> {
        if self.type_key.trim().is_empty() {
            return Err(self.invalid("type key must not be empty"));
        }

        check_unique(self, "input port", self.inputs.iter().map(|p| p.name.as_str()))?;
        check_unique(self, "output port", self.outputs.iter().map(|p| p.name.as_str()))?;
        check_unique(
            self,
            "parameter",
            self.parameters.iter().map(|p| p.name.as_str()),
        )?;

        Ok(())
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::InvalidDefinition {
            type_key: self.type_key.clone(),
            message: message.into(),
        }
    }
}

fn check_unique<'a>(
    def: &NodeDefinition,
    what: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if name.is_empty() {
            return Err(def.invalid(format!("{} name must not be empty", what)));
        }
        if !seen.insert(name) {
            return Err(def.invalid(format!("duplicate {} '{}'", what, name)));
        }
    }
    Ok(())
}

/// Convert a literal value to a number the way the editor does: numbers pass
/// through, strings are parsed after trimming, anything else has no numeric
/// value.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Stringify a literal value without JSON quoting
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
