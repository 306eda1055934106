//! JSON model for argforge argument constructors.
//!
//! The types here mirror [`argforge::ArgSpec`] and [`argforge::Options`] and
//! are used for:
//! - loading an `argforge.json` schema into an [`ArgConstructor`]
//! - converting JSON value objects into a [`ValueSet`] for rendering
//! - dumping a registered constructor back out as normalized JSON

use argforge::{
    Action, ArgConstructor, ArgSpec, ConfigError, Options, Scalar, Value, ValueKind, ValueSet,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Current `format-version` of the schema file.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema format-version {found} (expected {})", FORMAT_VERSION)]
    UnsupportedVersion { found: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKindDef {
    #[default]
    String,
    Integer,
    Float,
    Bool,
}

impl From<ValueKindDef> for ValueKind {
    fn from(kind: ValueKindDef) -> Self {
        match kind {
            ValueKindDef::String => Self::String,
            ValueKindDef::Integer => Self::Integer,
            ValueKindDef::Float => Self::Float,
            ValueKindDef::Bool => Self::Bool,
        }
    }
}

impl From<ValueKind> for ValueKindDef {
    fn from(kind: ValueKind) -> Self {
        match kind {
            ValueKind::String => Self::String,
            ValueKind::Integer => Self::Integer,
            ValueKind::Float => Self::Float,
            ValueKind::Bool => Self::Bool,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionDef {
    #[default]
    Append,
    Repeat,
}

impl From<ActionDef> for Action {
    fn from(action: ActionDef) -> Self {
        match action {
            ActionDef::Append => Self::Append,
            ActionDef::Repeat => Self::Repeat,
        }
    }
}

impl From<Action> for ActionDef {
    fn from(action: Action) -> Self {
        match action {
            Action::Append => Self::Append,
            Action::Repeat => Self::Repeat,
        }
    }
}

fn default_separator() -> String {
    " ".to_string()
}

fn default_true() -> bool {
    true
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

fn is_space(s: &str) -> bool {
    s == " "
}

fn is_default<T: Default + PartialEq>(v: &T) -> bool {
    *v == T::default()
}

/// One argument in a schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ArgSchema {
    pub name: String,
    #[serde(default)]
    pub flag: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub help: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub min_args: usize,
    /// Omitted means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_args: Option<usize>,
    #[serde(default = "default_separator", skip_serializing_if = "is_space")]
    pub flag_separator: String,
    #[serde(default = "default_separator", skip_serializing_if = "is_space")]
    pub values_separator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_by: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<String>,
    #[serde(default, skip_serializing_if = "is_default")]
    pub value_kind: ValueKindDef,
    #[serde(default, skip_serializing_if = "is_default")]
    pub action: ActionDef,
}

impl ArgSchema {
    pub fn new(name: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: flag.into(),
            help: String::new(),
            mandatory: false,
            default: None,
            min_args: 0,
            max_args: None,
            flag_separator: default_separator(),
            values_separator: default_separator(),
            choices: None,
            requires: Vec::new(),
            required_by: Vec::new(),
            conflicts_with: Vec::new(),
            value_kind: ValueKindDef::default(),
            action: ActionDef::default(),
        }
    }

    pub fn to_spec(&self) -> SchemaResult<ArgSpec> {
        let mut spec = ArgSpec::new(&self.name, &self.flag)
            .help(&self.help)
            .mandatory(self.mandatory)
            .args(self.min_args, self.max_args)
            .flag_separator(&self.flag_separator)
            .values_separator(&self.values_separator)
            .requires(&self.requires)
            .required_by(&self.required_by)
            .conflicts_with(&self.conflicts_with)
            .value_kind(self.value_kind.into())
            .action(self.action.into());
        if let Some(default) = &self.default {
            spec = spec.default_value(value_from_json(&self.name, default)?);
        }
        if let Some(choices) = &self.choices {
            let choices = choices
                .iter()
                .map(|c| scalar_from_json(&self.name, c))
                .collect::<SchemaResult<Vec<_>>>()?;
            spec = spec.choices(choices);
        }
        Ok(spec)
    }

    pub fn from_spec(spec: &ArgSpec) -> Self {
        let cardinality = spec.cardinality();
        Self {
            name: spec.name().to_string(),
            flag: spec.flag().to_string(),
            help: spec.get_help().to_string(),
            mandatory: spec.is_mandatory(),
            default: spec.get_default().map(value_to_json),
            min_args: cardinality.min,
            max_args: cardinality.max,
            flag_separator: spec.get_flag_separator().to_string(),
            values_separator: spec.get_values_separator().to_string(),
            choices: spec
                .get_choices()
                .map(|c| c.iter().cloned().map(serde_json::Value::String).collect()),
            requires: spec.get_requires().iter().cloned().collect(),
            required_by: spec.get_required_by().iter().cloned().collect(),
            conflicts_with: spec.get_conflicts_with().iter().cloned().collect(),
            value_kind: spec.get_value_kind().into(),
            action: spec.get_action().into(),
        }
    }
}

/// Top-level schema file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConstructorSchema {
    #[serde(default = "default_format_version")]
    pub format_version: u32,
    #[serde(default = "default_separator")]
    pub parameters_separator: String,
    #[serde(default = "default_true")]
    pub strict: bool,
    #[serde(default)]
    pub args: Vec<ArgSchema>,
}

impl Default for ConstructorSchema {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION,
            parameters_separator: default_separator(),
            strict: true,
            args: Vec::new(),
        }
    }
}

impl ConstructorSchema {
    pub fn from_json_str(s: &str) -> SchemaResult<Self> {
        let schema: Self = serde_json::from_str(s)?;
        if schema.format_version != FORMAT_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: schema.format_version,
            });
        }
        Ok(schema)
    }

    pub fn from_file(path: &Path) -> SchemaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn options(&self) -> Options {
        Options::default()
            .parameters_separator(&self.parameters_separator)
            .strict(self.strict)
    }

    /// Register every arg in file order, then check that all relations name
    /// registered args.
    pub fn build(&self) -> SchemaResult<ArgConstructor> {
        let mut constructor = ArgConstructor::with_options(self.options());
        for arg in &self.args {
            constructor.register(arg.to_spec()?)?;
        }
        constructor.check_relations()?;
        Ok(constructor)
    }

    pub fn from_constructor(constructor: &ArgConstructor) -> Self {
        let options = constructor.options();
        Self {
            format_version: FORMAT_VERSION,
            parameters_separator: options.parameters_separator.clone(),
            strict: options.strict,
            args: constructor
                .registry()
                .iter()
                .map(ArgSchema::from_spec)
                .collect(),
        }
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::InvalidValue {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn scalar_from_json(name: &str, json: &serde_json::Value) -> SchemaResult<Scalar> {
    match json {
        serde_json::Value::String(s) => Ok(Scalar::Str(s.clone())),
        serde_json::Value::Bool(b) => Ok(Scalar::Bool(*b)),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(Scalar::Int(i)),
            None => n
                .as_f64()
                .map(Scalar::Float)
                .ok_or_else(|| invalid(name, format!("unrepresentable number {n}"))),
        },
        serde_json::Value::Null => Err(invalid(name, "expected a scalar, got null")),
        serde_json::Value::Array(_) => Err(invalid(name, "nested arrays are not supported")),
        serde_json::Value::Object(_) => Err(invalid(name, "objects are not supported")),
    }
}

/// Convert a JSON value into an argument value.
///
/// `null` is absent, an array becomes a list whose `null` items are
/// placeholders, anything else must be a scalar.
pub fn value_from_json(name: &str, json: &serde_json::Value) -> SchemaResult<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Absent),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::Null => Ok(None),
                other => scalar_from_json(name, other).map(Some),
            })
            .collect::<SchemaResult<Vec<_>>>()
            .map(Value::List),
        other => scalar_from_json(name, other).map(Value::Scalar),
    }
}

pub fn values_from_json(object: &Map<String, serde_json::Value>) -> SchemaResult<ValueSet> {
    let mut values = ValueSet::new();
    for (name, json) in object {
        values.insert(name.as_str(), value_from_json(name, json)?);
    }
    Ok(values)
}

/// Parse a JSON object of `name -> value` pairs.
pub fn values_from_json_str(s: &str) -> SchemaResult<ValueSet> {
    let object: Map<String, serde_json::Value> = serde_json::from_str(s)?;
    values_from_json(&object)
}

fn scalar_to_json(scalar: &Scalar) -> serde_json::Value {
    match scalar {
        Scalar::Str(s) => serde_json::Value::String(s.clone()),
        Scalar::Int(i) => serde_json::Value::Number((*i).into()),
        Scalar::Float(x) => Number::from_f64(*x)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| serde_json::Value::String(x.to_string())),
        Scalar::Bool(b) => serde_json::Value::Bool(*b),
    }
}

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Absent => serde_json::Value::Null,
        Value::Scalar(s) => scalar_to_json(s),
        Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(|i| i.as_ref().map_or(serde_json::Value::Null, scalar_to_json))
                .collect(),
        ),
    }
}
