use indexmap::IndexSet;
use std::fmt;

use crate::value::{Scalar, Value};

/// Permitted number of values for an argument. `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cardinality {
    pub min: usize,
    pub max: Option<usize>,
}

impl Cardinality {
    pub const FLAG_ONLY: Self = Self {
        min: 0,
        max: Some(0),
    };

    pub const ANY: Self = Self { min: 0, max: None };

    pub fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// `(0, 0)`: the argument renders as its bare flag.
    pub fn is_flag_only(&self) -> bool {
        *self == Self::FLAG_ONLY
    }

    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::ANY
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {max}"),
            Some(max) => write!(f, "{}..={max}", self.min),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// Type every rendered item must parse as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    #[default]
    String,
    Integer,
    Float,
    Bool,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }

    pub fn accepts(&self, item: &str) -> bool {
        match self {
            Self::String => true,
            Self::Integer => item.parse::<i64>().is_ok(),
            Self::Float => item.parse::<f64>().is_ok(),
            Self::Bool => matches!(item, "true" | "false"),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an argument with several values is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// One flag followed by all values (`-I a b`).
    #[default]
    Append,
    /// The flag is repeated before every value (`-I a -I b`).
    Repeat,
}

/// Immutable description of one registered argument.
///
/// Built with chained setters; validated when passed to
/// [`ArgConstructor::register`](crate::ArgConstructor::register).
#[derive(Debug, Clone)]
pub struct ArgSpec {
    name: String,
    flag: String,
    help: String,
    mandatory: bool,
    default: Option<Value>,
    cardinality: Cardinality,
    flag_separator: String,
    values_separator: String,
    choices: Option<IndexSet<String>>,
    requires: IndexSet<String>,
    required_by: IndexSet<String>,
    conflicts_with: IndexSet<String>,
    value_kind: ValueKind,
    action: Action,
}

impl ArgSpec {
    /// An optional argument taking any number of values, separated by spaces.
    ///
    /// An empty `flag` renders the values alone (a positional argument).
    pub fn new(name: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flag: flag.into(),
            help: String::new(),
            mandatory: false,
            default: None,
            cardinality: Cardinality::ANY,
            flag_separator: " ".to_string(),
            values_separator: " ".to_string(),
            choices: None,
            requires: IndexSet::new(),
            required_by: IndexSet::new(),
            conflicts_with: IndexSet::new(),
            value_kind: ValueKind::String,
            action: Action::Append,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    /// Value substituted when the argument is mandatory (or required by a
    /// supplied argument) but not supplied. `Value::Absent` clears it.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default = (!value.is_absent()).then_some(value);
        self
    }

    pub fn args(mut self, min: usize, max: Option<usize>) -> Self {
        self.cardinality = Cardinality::new(min, max);
        self
    }

    pub fn min_args(mut self, min: usize) -> Self {
        self.cardinality.min = min;
        self
    }

    pub fn max_args(mut self, max: usize) -> Self {
        self.cardinality.max = Some(max);
        self
    }

    /// Shorthand for `args(0, Some(0))`.
    pub fn flag_only(self) -> Self {
        self.args(0, Some(0))
    }

    pub fn flag_separator(mut self, sep: impl Into<String>) -> Self {
        self.flag_separator = sep.into();
        self
    }

    pub fn values_separator(mut self, sep: impl Into<String>) -> Self {
        self.values_separator = sep.into();
        self
    }

    /// Restrict each value to this set, compared by canonical string form.
    pub fn choices<I, T>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        self.choices = Some(
            choices
                .into_iter()
                .map(|c| Into::<Scalar>::into(c).to_string())
                .collect(),
        );
        self
    }

    pub fn requires<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requires.extend(names.into_iter().map(Into::into));
        self
    }

    /// Arguments that, when supplied, require this one.
    pub fn required_by<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_by.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn conflicts_with<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflicts_with.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = kind;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }
}

impl ArgSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flag(&self) -> &str {
        &self.flag
    }

    pub fn get_help(&self) -> &str {
        &self.help
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn get_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn get_flag_separator(&self) -> &str {
        &self.flag_separator
    }

    pub fn get_values_separator(&self) -> &str {
        &self.values_separator
    }

    pub fn get_choices(&self) -> Option<&IndexSet<String>> {
        self.choices.as_ref()
    }

    pub fn get_requires(&self) -> &IndexSet<String> {
        &self.requires
    }

    pub fn get_required_by(&self) -> &IndexSet<String> {
        &self.required_by
    }

    pub fn get_conflicts_with(&self) -> &IndexSet<String> {
        &self.conflicts_with
    }

    pub fn get_value_kind(&self) -> ValueKind {
        self.value_kind
    }

    pub fn get_action(&self) -> Action {
        self.action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cardinality_bounds() {
        let c = Cardinality::new(1, Some(2));
        assert!(!c.contains(0));
        assert!(c.contains(1));
        assert!(c.contains(2));
        assert!(!c.contains(3));
        assert!(Cardinality::ANY.contains(100));
        assert!(Cardinality::FLAG_ONLY.is_flag_only());
    }

    #[test]
    fn cardinality_display() {
        assert_eq!(Cardinality::new(1, Some(1)).to_string(), "exactly 1");
        assert_eq!(Cardinality::new(1, Some(3)).to_string(), "1..=3");
        assert_eq!(Cardinality::new(2, None).to_string(), "at least 2");
    }

    #[test]
    fn value_kind_accepts() {
        assert!(ValueKind::Integer.accepts("-3"));
        assert!(!ValueKind::Integer.accepts("3.5"));
        assert!(ValueKind::Float.accepts("3.5"));
        assert!(ValueKind::Bool.accepts("false"));
        assert!(!ValueKind::Bool.accepts("yes"));
        assert!(ValueKind::String.accepts(""));
    }

    #[test]
    fn choices_are_canonical_strings() {
        let spec = ArgSpec::new("n", "-n").choices([1, 2]);
        let choices = spec.get_choices().unwrap();
        assert!(choices.contains("1"));
        assert!(choices.contains("2"));
    }

    #[test]
    fn absent_default_clears() {
        let spec = ArgSpec::new("n", "-n")
            .default_value("x")
            .default_value(Value::Absent);
        assert!(spec.get_default().is_none());
    }
}
