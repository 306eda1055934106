use anyhow::{Context, Result, bail};
use argforge::{Value, ValueSet};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::fs;
use std::path::Path;

pub fn read_values_file(path: &Path) -> Result<ValueSet> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read values file: {}", path.display()))?;
    argforge_schema::values_from_json_str(&contents)
        .with_context(|| format!("failed to parse values file: {}", path.display()))
}

/// Fold `--set` pairs into `values`.
///
/// `NAME=VALUE` sets a string; repeating a name collects a list in the order
/// given. A bare `NAME` sets boolean `true` and cannot be mixed with
/// `NAME=VALUE` for the same name. Names given here replace values loaded
/// from a file.
pub fn apply_sets(values: &mut ValueSet, sets: &[String]) -> Result<()> {
    let mut collected: IndexMap<&str, Option<Vec<&str>>> = IndexMap::new();
    for raw in sets {
        let (name, value) = match raw.split_once('=') {
            Some((name, value)) => (name.trim(), Some(value)),
            None => (raw.trim(), None),
        };
        if name.is_empty() {
            bail!("--set expects NAME or NAME=VALUE (got '{raw}')");
        }
        match collected.entry(name) {
            Entry::Vacant(e) => {
                e.insert(value.map(|v| vec![v]));
            }
            Entry::Occupied(mut e) => match (e.get_mut(), value) {
                (Some(items), Some(v)) => items.push(v),
                (None, None) => {}
                _ => bail!("--set {name} cannot be given both with and without a value"),
            },
        }
    }

    for (name, items) in collected {
        let value = match items {
            None => Value::from(true),
            Some(items) if items.len() == 1 => Value::from(items[0]),
            Some(items) => Value::from(items),
        };
        values.insert(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sets(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn single_repeated_and_bare_sets() {
        let mut values = ValueSet::new();
        apply_sets(
            &mut values,
            &sets(&["out=a.txt", "inc=x", "verbose", "inc=y", "empty="]),
        )
        .unwrap();
        assert_eq!(values.get("out"), Some(&Value::from("a.txt")));
        assert_eq!(values.get("inc"), Some(&Value::from(vec!["x", "y"])));
        assert_eq!(values.get("verbose"), Some(&Value::from(true)));
        assert_eq!(values.get("empty"), Some(&Value::from("")));
    }

    #[test]
    fn sets_override_file_values() {
        let mut values = ValueSet::new().with("out", "file.txt").with("keep", "1");
        apply_sets(&mut values, &sets(&["out=cli.txt"])).unwrap();
        assert_eq!(values.get("out"), Some(&Value::from("cli.txt")));
        assert_eq!(values.get("keep"), Some(&Value::from("1")));
    }

    #[test]
    fn rejects_mixed_bare_and_valued() {
        let mut values = ValueSet::new();
        let err = apply_sets(&mut values, &sets(&["v", "v=1"])).unwrap_err();
        assert!(err.to_string().contains("both with and without"));

        let err = apply_sets(&mut values, &sets(&["=1"])).unwrap_err();
        assert!(err.to_string().contains("NAME or NAME=VALUE"));
    }
}
