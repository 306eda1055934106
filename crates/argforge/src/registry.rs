use indexmap::{IndexMap, IndexSet};

use crate::error::{ConfigError, Relation};
use crate::spec::ArgSpec;

/// Ordered set of argument specs, keyed by name.
///
/// Iteration follows registration order, which is also the order arguments
/// are emitted in. `required-by` entries are inverted into a per-name index
/// as specs are inserted, so they may name arguments registered later.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: IndexMap<String, ArgSpec>,
    // name -> arguments that list `name` in their `required-by`
    implied_by: IndexMap<String, IndexSet<String>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append `spec`.
    pub fn insert(&mut self, spec: ArgSpec) -> Result<(), ConfigError> {
        let name = spec.name().to_string();
        if self.specs.contains_key(&name) {
            return Err(ConfigError::DuplicateName { name });
        }
        let cardinality = spec.cardinality();
        if let Some(max) = cardinality.max
            && max < cardinality.min
        {
            return Err(ConfigError::InvalidCardinality {
                name,
                min: cardinality.min,
                max,
            });
        }
        if spec.get_choices().is_some_and(|c| c.is_empty()) {
            return Err(ConfigError::EmptyChoices { name });
        }

        for dependent in spec.get_required_by() {
            self.implied_by
                .entry(dependent.clone())
                .or_default()
                .insert(name.clone());
        }

        tracing::trace!(name = %name, flag = spec.flag(), "registered argument");
        self.specs.insert(name, spec);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ArgSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Specs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ArgSpec> {
        self.specs.values()
    }

    /// Arguments that must be present whenever `name` is.
    ///
    /// Yields the spec's own `requires` first, in declaration order, then
    /// every argument that lists `name` in `required-by`, in registration
    /// order. A name found in both is yielded once.
    pub fn predecessors<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let requires = self.specs.get(name).map(ArgSpec::get_requires);
        let implied = self
            .implied_by
            .get(name)
            .into_iter()
            .flatten()
            .filter(move |n| !requires.is_some_and(|r| r.contains(n.as_str())));
        requires
            .into_iter()
            .flatten()
            .chain(implied)
            .map(String::as_str)
    }

    /// Check that every relation names a registered argument.
    pub fn check_relations(&self) -> Result<(), ConfigError> {
        for spec in self.iter() {
            let relations = [
                (Relation::Requires, spec.get_requires()),
                (Relation::RequiredBy, spec.get_required_by()),
                (Relation::ConflictsWith, spec.get_conflicts_with()),
            ];
            for (relation, names) in relations {
                if let Some(other) = names.iter().find(|n| !self.contains(n)) {
                    return Err(ConfigError::UnknownRelation {
                        name: spec.name().to_string(),
                        relation,
                        other: other.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(r: &Registry, name: &str) -> Vec<String> {
        r.predecessors(name).map(str::to_string).collect()
    }

    #[test]
    fn keeps_registration_order() {
        let mut r = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            r.insert(ArgSpec::new(name, format!("--{name}"))).unwrap();
        }
        let names: Vec<_> = r.iter().map(|s| s.name()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn rejects_duplicate_name() {
        let mut r = Registry::new();
        r.insert(ArgSpec::new("a", "-a")).unwrap();
        let err = r.insert(ArgSpec::new("a", "--other")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateName {
                name: "a".to_string()
            }
        );
        assert_eq!(r.len(), 1);
        assert_eq!(r.get("a").unwrap().flag(), "-a");
    }

    #[test]
    fn rejects_inverted_cardinality() {
        let mut r = Registry::new();
        let err = r.insert(ArgSpec::new("a", "-a").args(3, Some(1))).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidCardinality { min: 3, max: 1, .. }
        ));
        assert!(r.is_empty());
    }

    #[test]
    fn rejects_empty_choices() {
        let mut r = Registry::new();
        let err = r
            .insert(ArgSpec::new("a", "-a").choices(Vec::<&str>::new()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyChoices { .. }));
    }

    #[test]
    fn required_by_folds_into_predecessors() {
        let mut r = Registry::new();
        r.insert(ArgSpec::new("a", "-a").requires(["b"])).unwrap();
        // Declared before "c" exists.
        r.insert(ArgSpec::new("b", "-b").required_by(["a", "c"]))
            .unwrap();
        r.insert(ArgSpec::new("c", "-c")).unwrap();

        assert_eq!(preds(&r, "a"), ["b"]);
        assert_eq!(preds(&r, "c"), ["b"]);
        assert!(preds(&r, "b").is_empty());
    }

    #[test]
    fn own_requires_come_before_required_by() {
        let mut r = Registry::new();
        r.insert(ArgSpec::new("b", "-b").required_by(["a"])).unwrap();
        r.insert(ArgSpec::new("a", "-a").requires(["c", "b"])).unwrap();
        r.insert(ArgSpec::new("c", "-c")).unwrap();
        r.insert(ArgSpec::new("d", "-d").required_by(["a"])).unwrap();

        assert_eq!(preds(&r, "a"), ["c", "b", "d"]);
    }

    #[test]
    fn failed_insert_leaves_relations_untouched() {
        let mut r = Registry::new();
        r.insert(ArgSpec::new("b", "-b")).unwrap();
        r.insert(ArgSpec::new("b", "-b").required_by(["a"]))
            .unwrap_err();
        assert!(preds(&r, "a").is_empty());
    }

    #[test]
    fn check_relations_reports_unknown_names() {
        let mut r = Registry::new();
        r.insert(ArgSpec::new("a", "-a").conflicts_with(["ghost"]))
            .unwrap();
        let err = r.check_relations().unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownRelation {
                name: "a".to_string(),
                relation: Relation::ConflictsWith,
                other: "ghost".to_string(),
            }
        );

        r.insert(ArgSpec::new("ghost", "-g")).unwrap();
        r.check_relations().unwrap();
    }
}
