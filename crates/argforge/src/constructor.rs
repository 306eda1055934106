use std::collections::{HashMap, HashSet};

use crate::error::{ConfigError, RenderError};
use crate::registry::Registry;
use crate::spec::{Action, ArgSpec};
use crate::value::{Scalar, Value, ValueSet};

/// Constructor-wide rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Joins the rendered tokens of all arguments.
    pub parameters_separator: String,
    /// Reject supplied names that are not registered. When `false` they are
    /// silently dropped.
    pub strict: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parameters_separator: " ".to_string(),
            strict: true,
        }
    }
}

impl Options {
    pub fn parameters_separator(mut self, sep: impl Into<String>) -> Self {
        self.parameters_separator = sep.into();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Registry of argument specs plus the render algorithm.
///
/// Rendering only reads the registry, so one constructor can serve
/// concurrent render calls from several threads.
#[derive(Debug, Clone, Default)]
pub struct ArgConstructor {
    registry: Registry,
    options: Options,
}

impl ArgConstructor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self {
            registry: Registry::new(),
            options,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn register(&mut self, spec: ArgSpec) -> Result<(), ConfigError> {
        self.registry.insert(spec)
    }

    /// See [`Registry::check_relations`].
    pub fn check_relations(&self) -> Result<(), ConfigError> {
        self.registry.check_relations()
    }

    /// Validate `values` and render them into a single argument string.
    pub fn render(&self, values: &ValueSet) -> Result<String, RenderError> {
        let tokens = self.render_tokens(values)?;
        Ok(tokens.join(&self.options.parameters_separator))
    }

    /// Like [`render`](Self::render) but returns the tokens before joining.
    ///
    /// An argument using [`Action::Repeat`] contributes one token per value.
    pub fn render_tokens(&self, values: &ValueSet) -> Result<Vec<String>, RenderError> {
        let supplied = self.supplied(values)?;
        let elevated = self.check_dependencies(&supplied)?;
        self.check_conflicts(&supplied, &elevated)?;

        let mut tokens = Vec::new();
        for spec in self.registry.iter() {
            let name = spec.name();
            let value = match supplied.get(name) {
                Some(value) => *value,
                None if spec.is_mandatory() || elevated.contains(name) => spec
                    .get_default()
                    .ok_or_else(|| RenderError::MissingMandatory {
                        name: name.to_string(),
                    })?,
                None => continue,
            };
            if is_unset(spec, value) {
                continue;
            }
            tokens.extend(render_arg(spec, value)?);
        }

        tracing::debug!(
            supplied = supplied.len(),
            implied = elevated.len(),
            tokens = tokens.len(),
            "rendered arguments"
        );
        Ok(tokens)
    }

    /// Supplied values keyed by registered name, with "not supplied" entries
    /// dropped.
    fn supplied<'a>(
        &'a self,
        values: &'a ValueSet,
    ) -> Result<HashMap<&'a str, &'a Value>, RenderError> {
        let mut supplied = HashMap::with_capacity(values.len());
        for (name, value) in values.iter() {
            if value.is_absent() {
                continue;
            }
            let Some(spec) = self.registry.get(name) else {
                if self.options.strict {
                    return Err(RenderError::UnknownArgument {
                        name: name.to_string(),
                    });
                }
                tracing::trace!(name, "dropping unknown argument");
                continue;
            };
            if is_unset(spec, value) {
                continue;
            }
            supplied.insert(spec.name(), value);
        }
        Ok(supplied)
    }

    /// Check every supplied argument's predecessors. Returns the arguments
    /// that must be rendered from their defaults for this call only.
    fn check_dependencies<'a>(
        &'a self,
        supplied: &HashMap<&'a str, &'a Value>,
    ) -> Result<HashSet<&'a str>, RenderError> {
        let mut elevated = HashSet::new();
        for spec in self.supplied_specs(supplied) {
            for dependency in self.registry.predecessors(spec.name()) {
                if supplied.contains_key(dependency) {
                    continue;
                }
                match self.registry.get(dependency) {
                    Some(dep) if dep.get_default().is_some() => {
                        tracing::trace!(
                            name = spec.name(),
                            dependency,
                            "using default for required argument"
                        );
                        elevated.insert(dep.name());
                    }
                    _ => {
                        return Err(RenderError::MissingDependency {
                            name: spec.name().to_string(),
                            dependency: dependency.to_string(),
                        });
                    }
                }
            }
        }
        Ok(elevated)
    }

    fn check_conflicts(
        &self,
        supplied: &HashMap<&str, &Value>,
        elevated: &HashSet<&str>,
    ) -> Result<(), RenderError> {
        for spec in self.supplied_specs(supplied) {
            for other in spec.get_conflicts_with() {
                let other = other.as_str();
                if supplied.contains_key(other) || elevated.contains(other) {
                    return Err(RenderError::ConflictingArguments {
                        name: spec.name().to_string(),
                        other: other.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    // Registration order keeps error reporting independent of input order.
    fn supplied_specs<'s>(
        &'s self,
        supplied: &'s HashMap<&str, &Value>,
    ) -> impl Iterator<Item = &'s ArgSpec> {
        self.registry
            .iter()
            .filter(move |spec| supplied.contains_key(spec.name()))
    }
}

fn is_unset(spec: &ArgSpec, value: &Value) -> bool {
    match value {
        Value::Absent => true,
        Value::Scalar(Scalar::Bool(false)) => spec.cardinality().is_flag_only(),
        _ => false,
    }
}

fn render_arg(spec: &ArgSpec, value: &Value) -> Result<Vec<String>, RenderError> {
    let cardinality = spec.cardinality();
    if cardinality.is_flag_only() {
        return Ok(bare_flag(spec));
    }

    let items = value.items();
    if !cardinality.contains(items.len()) {
        return Err(RenderError::CardinalityViolation {
            name: spec.name().to_string(),
            got: items.len(),
            expected: cardinality,
        });
    }

    // Placeholders are exempt from choice and type checks.
    for item in items.iter().flatten() {
        if let Some(choices) = spec.get_choices()
            && !choices.contains(item)
        {
            return Err(RenderError::InvalidChoice {
                name: spec.name().to_string(),
                value: item.clone(),
                choices: choices.iter().cloned().collect(),
            });
        }
        let kind = spec.get_value_kind();
        if !kind.accepts(item) {
            return Err(RenderError::InvalidType {
                name: spec.name().to_string(),
                value: item.clone(),
                expected: kind,
            });
        }
    }

    if items.is_empty() {
        return Ok(bare_flag(spec));
    }
    let items: Vec<&str> = items.iter().map(|i| i.as_deref().unwrap_or("")).collect();
    let tokens = match spec.get_action() {
        Action::Append => vec![with_flag(spec, &items.join(spec.get_values_separator()))],
        Action::Repeat => items.iter().map(|item| with_flag(spec, item)).collect(),
    };
    Ok(tokens)
}

// A positional argument with nothing to show emits no token at all.
fn bare_flag(spec: &ArgSpec) -> Vec<String> {
    if spec.flag().is_empty() {
        Vec::new()
    } else {
        vec![spec.flag().to_string()]
    }
}

fn with_flag(spec: &ArgSpec, values: &str) -> String {
    if spec.flag().is_empty() {
        values.to_string()
    } else {
        format!("{}{}{}", spec.flag(), spec.get_flag_separator(), values)
    }
}
