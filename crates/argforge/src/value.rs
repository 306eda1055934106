use indexmap::IndexMap;
use std::fmt;

/// A single supplied value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            // Integral floats keep their decimal point: `2.0`, not `2`.
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Scalar {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Scalar {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Scalar {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// The value supplied for one argument in a render call.
///
/// `Absent` means "not supplied". A `List` keeps its items in order; `None`
/// items are positional placeholders and render as empty strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Scalar(Scalar),
    List(Vec<Option<Scalar>>),
}

impl Value {
    /// Build a list value from anything convertible to scalars.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        Self::List(items.into_iter().map(|i| Some(i.into())).collect())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Canonical string items, in order. A lone scalar becomes one item.
    pub(crate) fn items(&self) -> Vec<Option<String>> {
        match self {
            Self::Absent => Vec::new(),
            Self::Scalar(s) => vec![Some(s.to_string())],
            Self::List(items) => items
                .iter()
                .map(|i| i.as_ref().map(|s| s.to_string()))
                .collect(),
        }
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => Self::Scalar(v.into()),
            None => Self::Absent,
        }
    }
}

impl From<Scalar> for Value {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(s.into())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Scalar(i.into())
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Scalar(i.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Scalar(x.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(b.into())
    }
}

impl From<Vec<&str>> for Value {
    fn from(v: Vec<&str>) -> Self {
        Self::list(v)
    }
}

impl From<Vec<String>> for Value {
    fn from(v: Vec<String>) -> Self {
        Self::list(v)
    }
}

impl From<Vec<Option<Scalar>>> for Value {
    fn from(v: Vec<Option<Scalar>>) -> Self {
        Self::List(v)
    }
}

/// Values supplied to a single render call, keyed by argument name.
///
/// Insertion order is kept but carries no meaning for rendering: output
/// always follows registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSet {
    values: IndexMap<String, Value>,
}

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chainable insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace the value for `name`, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_render_canonically() {
        assert_eq!(Scalar::from("x").to_string(), "x");
        assert_eq!(Scalar::from(42).to_string(), "42");
        assert_eq!(Scalar::from(0.5).to_string(), "0.5");
        assert_eq!(Scalar::from(true).to_string(), "true");
    }

    #[test]
    fn integral_floats_stay_floats() {
        assert_eq!(Scalar::from(2.0).to_string(), "2.0");
        assert_eq!(Scalar::from(-3.0).to_string(), "-3.0");
        assert_eq!(Scalar::from(1e20).to_string(), "100000000000000000000.0");
        assert_eq!(Scalar::from(f64::INFINITY).to_string(), "inf");
        assert_ne!(Scalar::from(2.0).to_string(), Scalar::from(2).to_string());
    }

    #[test]
    fn lone_scalar_becomes_single_item() {
        assert_eq!(Value::from("a").items(), vec![Some("a".to_string())]);
        assert!(Value::Absent.items().is_empty());
    }

    #[test]
    fn list_keeps_placeholders_in_position() {
        let v = Value::List(vec![Some("a".into()), None, Some(3.into())]);
        assert_eq!(
            v.items(),
            vec![Some("a".to_string()), None, Some("3".to_string())]
        );
    }

    #[test]
    fn none_option_is_absent() {
        assert!(Value::from(None::<&str>).is_absent());
        assert!(!Value::from(Some("x")).is_absent());
    }

    #[test]
    fn value_set_insert_replaces() {
        let mut set = ValueSet::new().with("a", 1);
        let prev = set.insert("a", 2);
        assert_eq!(prev, Some(Value::from(1)));
        assert_eq!(set.get("a"), Some(&Value::from(2)));
        assert_eq!(set.len(), 1);
    }
}
