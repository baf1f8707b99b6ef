//! Actions offered in a turn prompt, and their parameter schemas.
//!
//! The backend describes each action the way it describes a tool to a
//! language model:
//!
//! ```json
//! {
//!   "type": "function",
//!   "function": {
//!     "name": "move",
//!     "description": "Move through a portal",
//!     "parameters": {
//!       "type": "object",
//!       "properties": { "direction": { "type": "string" } }
//!     }
//!   }
//! }
//! ```
//!
//! We also accept the flat form `{name, description, parameters}` where
//! `parameters` maps names straight to parameters. Both decode into the
//! same [`Action`].

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Parameter
// ---------------------------------------------------------------------------

/// One parameter of an action, tagged by its `type`.
///
/// `#[serde(other)]` sends any type we don't understand (`array`,
/// `object`, ...) to [`Parameter::Unknown`] instead of failing the whole
/// prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Parameter {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<String>,
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        options: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(alias = "integer")]
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<f64>,
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        options: Option<Vec<f64>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Boolean {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<bool>,
        #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
        options: Option<Vec<bool>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

impl Parameter {
    /// A plain string parameter with no default and no enum.
    pub fn string() -> Self {
        Self::String {
            default: None,
            options: None,
            description: None,
        }
    }

    /// A plain number parameter with no default and no enum.
    pub fn number() -> Self {
        Self::Number {
            default: None,
            options: None,
            description: None,
        }
    }

    /// A plain boolean parameter with no default.
    pub fn boolean() -> Self {
        Self::Boolean {
            default: None,
            options: None,
            description: None,
        }
    }

    /// The wire name of this parameter's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Number { .. } => "number",
            Self::Boolean { .. } => "boolean",
            Self::Unknown => "unknown",
        }
    }

    /// The declared default, or the type's zero value when none is given:
    /// `false`, `0`, or the empty string. `None` for unknown types.
    pub fn default_value(&self) -> Option<ParameterValue> {
        match self {
            Self::String { default, .. } => Some(ParameterValue::String(
                default.clone().unwrap_or_default(),
            )),
            Self::Number { default, .. } => {
                Some(ParameterValue::Number(default.unwrap_or(0.0)))
            }
            Self::Boolean { default, .. } => {
                Some(ParameterValue::Boolean(default.unwrap_or(false)))
            }
            Self::Unknown => None,
        }
    }

    /// The enumerated domain, if the parameter declares one.
    pub fn domain(&self) -> Option<Vec<ParameterValue>> {
        match self {
            Self::String { options, .. } => options.as_ref().map(|values| {
                values.iter().cloned().map(ParameterValue::String).collect()
            }),
            Self::Number { options, .. } => options.as_ref().map(|values| {
                values.iter().copied().map(ParameterValue::Number).collect()
            }),
            Self::Boolean { options, .. } => options.as_ref().map(|values| {
                values.iter().copied().map(ParameterValue::Boolean).collect()
            }),
            Self::Unknown => None,
        }
    }
}

// ---------------------------------------------------------------------------
// ParameterValue
// ---------------------------------------------------------------------------

/// A concrete value chosen for a parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ParameterValue {
    /// Returns `true` if this value has the shape `parameter` expects.
    pub fn fits(&self, parameter: &Parameter) -> bool {
        matches!(
            (self, parameter),
            (Self::Boolean(_), Parameter::Boolean { .. })
                | (Self::Number(_), Parameter::Number { .. })
                | (Self::String(_), Parameter::String { .. })
        )
    }
}

/// Formats the value the way it appears in an action token: `true`,
/// `3`, `2.5`, or the bare string.
impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

// ---------------------------------------------------------------------------
// ParameterSchema
// ---------------------------------------------------------------------------

/// An ordered mapping from parameter name to [`Parameter`].
///
/// Declaration order is significant (it fixes the key order of the
/// encoded action token), so this is a `Vec` of pairs rather than a hash
/// map. It (de)serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema(Vec<(String, Parameter)>);

impl ParameterSchema {
    /// Iterates `(name, parameter)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.0.iter().map(|(name, parameter)| (name.as_str(), parameter))
    }

    /// Looks up a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, parameter)| parameter)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Parameter)> for ParameterSchema {
    fn from_iter<I: IntoIterator<Item = (N, Parameter)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, parameter)| (name.into(), parameter))
                .collect(),
        )
    }
}

impl Serialize for ParameterSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, parameter) in &self.0 {
            map.serialize_entry(name, parameter)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ParameterSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SchemaVisitor;

        impl<'de> Visitor<'de> for SchemaVisitor {
            type Value = ParameterSchema;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of parameter names to parameters")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, parameter)) = access.next_entry::<String, Parameter>()? {
                    entries.push((name, parameter));
                }
                Ok(ParameterSchema(entries))
            }
        }

        deserializer.deserialize_map(SchemaVisitor)
    }
}

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// An action the player may take this turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ActionWire")]
pub struct Action {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// The two accepted wire layouts of an action.
#[derive(Deserialize)]
#[serde(untagged)]
enum ActionWire {
    Tool { function: ActionBody },
    Flat(ActionBody),
}

#[derive(Deserialize)]
struct ActionBody {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    parameters: SchemaWire,
}

/// `parameters` is either a JSON-schema object wrapper or the bare map.
#[derive(Deserialize)]
#[serde(untagged)]
enum SchemaWire {
    Object { properties: ParameterSchema },
    Flat(ParameterSchema),
}

impl Default for SchemaWire {
    fn default() -> Self {
        Self::Flat(ParameterSchema::default())
    }
}

impl From<ActionWire> for Action {
    fn from(wire: ActionWire) -> Self {
        let (ActionWire::Tool { function: body } | ActionWire::Flat(body)) = wire;
        let parameters = match body.parameters {
            SchemaWire::Object { properties } => properties,
            SchemaWire::Flat(schema) => schema,
        };
        Self {
            name: body.name,
            description: body.description,
            parameters,
        }
    }
}
