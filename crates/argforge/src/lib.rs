//! Declarative builder for command-line argument strings.
//!
//! Arguments are registered once as [`ArgSpec`]s on an [`ArgConstructor`];
//! each call to [`ArgConstructor::render`] validates a [`ValueSet`] against
//! the registered dependency and conflict rules and renders the arguments,
//! in registration order, into a single string.
//!
//! # Example
//!
//! ```rust
//! use argforge::{ArgConstructor, ArgSpec, ValueSet};
//!
//! let mut args = ArgConstructor::new();
//! args.register(ArgSpec::new("verbose", "-v").flag_only()).unwrap();
//! args.register(ArgSpec::new("out", "-o").mandatory(true).args(1, Some(1))).unwrap();
//!
//! let values = ValueSet::new().with("verbose", true).with("out", "file.txt");
//! assert_eq!(args.render(&values).unwrap(), "-v -o file.txt");
//! ```
//!
//! The crate is intentionally free of I/O and serialization so it can be
//! embedded anywhere; `argforge-schema` layers a JSON model on top.

mod constructor;
mod error;
mod registry;
mod spec;
mod value;

pub use constructor::{ArgConstructor, Options};
pub use error::{ConfigError, Relation, RenderError};
pub use registry::Registry;
pub use spec::{Action, ArgSpec, Cardinality, ValueKind};
pub use value::{Scalar, Value, ValueSet};
