use anyhow::{Context, Result, bail};
use argforge_schema::{ActionDef, ArgSchema, ConstructorSchema, ValueKindDef};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA_NAME: &str = "argforge.json";

/// Environment variable naming the schema file when `--schema` is not given.
pub const SCHEMA_ENV: &str = "ARGFORGE_SCHEMA";

#[derive(Debug, Clone)]
pub struct LoadedSchema {
    pub path: PathBuf,
    pub schema: ConstructorSchema,
}

/// Resolve the schema path: `--schema`, then `$ARGFORGE_SCHEMA`, then
/// `./argforge.json`. Relative paths resolve against the current directory.
pub fn resolve_schema_path(explicit: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let from_env = std::env::var_os(SCHEMA_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);
    let path = match (explicit, from_env) {
        (Some(p), _) => resolve_against(&cwd, p),
        (None, Some(p)) => resolve_against(&cwd, &p),
        (None, None) => cwd.join(DEFAULT_SCHEMA_NAME),
    };
    Ok(path)
}

pub fn load_schema(explicit: Option<&Path>) -> Result<LoadedSchema> {
    let path = resolve_schema_path(explicit)?;
    if !path.exists() {
        bail!(
            "schema not found: {} (run `argforge init` to create one)",
            path.display()
        );
    }
    tracing::debug!(path = %path.display(), "loading schema");
    let schema = ConstructorSchema::from_file(&path)
        .with_context(|| format!("failed to load schema: {}", path.display()))?;
    Ok(LoadedSchema { path, schema })
}

/// Schema written by `argforge init`.
pub fn sample_schema() -> ConstructorSchema {
    ConstructorSchema {
        args: vec![
            ArgSchema {
                help: "Verbose output".to_string(),
                max_args: Some(0),
                ..ArgSchema::new("verbose", "-v")
            },
            ArgSchema {
                help: "Log level".to_string(),
                default: Some("info".into()),
                max_args: Some(1),
                choices: Some(vec!["debug".into(), "info".into(), "warn".into()]),
                ..ArgSchema::new("level", "--level")
            },
            ArgSchema {
                help: "Worker count".to_string(),
                min_args: 1,
                max_args: Some(1),
                value_kind: ValueKindDef::Integer,
                requires: vec!["level".to_string()],
                ..ArgSchema::new("jobs", "-j")
            },
            ArgSchema {
                help: "Include directory (repeatable)".to_string(),
                action: ActionDef::Repeat,
                ..ArgSchema::new("include", "-I")
            },
            ArgSchema {
                help: "Output file".to_string(),
                mandatory: true,
                min_args: 1,
                max_args: Some(1),
                ..ArgSchema::new("output", "-o")
            },
        ],
        ..Default::default()
    }
}

pub fn write_sample_schema(dir: &Path) -> Result<PathBuf> {
    let dest = dir.join(DEFAULT_SCHEMA_NAME);
    if dest.exists() {
        bail!("{} already exists in {}", DEFAULT_SCHEMA_NAME, dir.display());
    }

    let mut out = sample_schema()
        .to_json_pretty()
        .context("failed to serialize schema")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argforge::ValueSet;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn make_temp_dir(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("argforge-{prefix}-{pid}-{nanos}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn sample_schema_builds_and_renders() {
        let c = sample_schema().build().unwrap();
        let values = ValueSet::new()
            .with("jobs", 2)
            .with("output", "out.txt")
            .with("verbose", true);
        assert_eq!(
            c.render(&values).unwrap(),
            "-v --level info -j 2 -o out.txt"
        );
    }

    #[test]
    fn write_sample_schema_refuses_overwrite() {
        let dir = make_temp_dir("sample");
        let dest = write_sample_schema(&dir).unwrap();
        let loaded = ConstructorSchema::from_file(&dest).unwrap();
        assert_eq!(loaded, sample_schema());

        let err = write_sample_schema(&dir).unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn resolve_against_keeps_absolute_paths() {
        let base = Path::new("/base");
        assert_eq!(
            resolve_against(base, Path::new("/abs/s.json")),
            PathBuf::from("/abs/s.json")
        );
        assert_eq!(
            resolve_against(base, Path::new("rel.json")),
            PathBuf::from("/base/rel.json")
        );
    }
}
