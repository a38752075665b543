//! Build a specification tree from a TOML document.
//!
//! The resolver itself only consumes an already-loaded [`ConfigTree`];
//! this module maps the common on-disk shape onto it. Each top-level
//! table is one spec key, named by its (quoted) path; inside it, the
//! reserved name `value` sets the key's own value and every other entry
//! is metadata, named exactly as the resolver reads it:
//!
//! ```toml
//! ["verbose"]
//! opt = "v"
//! "opt/long" = "verbose"
//! "opt/arg" = "none"
//! description = "explain what is being done"
//!
//! ["items/#"]
//! opt = ["i", ""]
//! "opt/#1/long" = "item"
//! ```
//!
//! Metadata values must be strings. As the one ergonomic extension, `opt`
//! and `env` accept an array of strings, which expands into the array
//! convention (`opt = ["i", ""]` becomes `opt = "#1"`, `opt/#0 = "i"`,
//! `opt/#1 = ""`).
//!
//! Unknown metadata names are rejected so that a typo like `opt/lang`
//! fails at load time instead of silently declaring nothing. No I/O
//! happens here; callers hand in file contents.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::SpecoptsError;
use crate::tree::{ConfigTree, Key, Namespace, array_index_label};

#[derive(Deserialize)]
struct RawKey {
    value: Option<String>,
    #[serde(flatten)]
    meta: BTreeMap<String, toml::Value>,
}

/// Parse a TOML spec document into a tree of spec-namespace keys.
pub fn spec_from_toml(content: &str) -> Result<ConfigTree, SpecoptsError> {
    let doc: BTreeMap<String, RawKey> =
        toml::from_str(content).map_err(|e| SpecoptsError::SpecParse { source: e })?;

    let mut tree = ConfigTree::new();
    for (path, raw) in doc {
        let mut key = Key::new(Namespace::Spec, path);
        if let Some(value) = raw.value {
            key.set_value(value);
        }
        for (name, value) in raw.meta {
            if !is_recognized_metadata(&name) {
                return Err(SpecoptsError::UnknownMetadata {
                    key: key.full_name(),
                    name,
                });
            }
            match value {
                toml::Value::String(value) => key.set_meta(name, value),
                toml::Value::Array(items) if name == "opt" || name == "env" => {
                    expand_array(&mut key, &name, items)?;
                }
                _ => {
                    return Err(SpecoptsError::InvalidMetadataValue {
                        key: key.full_name(),
                        name,
                        reason: "expected a string".to_string(),
                    });
                }
            }
        }
        tree.insert(key);
    }
    Ok(tree)
}

/// Expand `opt = [...]` / `env = [...]` into indexed metadata.
fn expand_array(
    key: &mut Key,
    name: &str,
    items: Vec<toml::Value>,
) -> Result<(), SpecoptsError> {
    if items.is_empty() {
        return Err(SpecoptsError::InvalidMetadataValue {
            key: key.full_name(),
            name: name.to_string(),
            reason: "array must not be empty".to_string(),
        });
    }

    let mut values = Vec::with_capacity(items.len());
    for item in items {
        match item {
            toml::Value::String(value) => values.push(value),
            _ => {
                return Err(SpecoptsError::InvalidMetadataValue {
                    key: key.full_name(),
                    name: name.to_string(),
                    reason: "array elements must be strings".to_string(),
                });
            }
        }
    }

    key.set_meta(name, array_index_label(values.len() - 1));
    for (index, value) in values.into_iter().enumerate() {
        key.set_meta(format!("{name}/#{index}"), value);
    }
    Ok(())
}

/// Whether `name` is one of the annotations the compiler reads.
fn is_recognized_metadata(name: &str) -> bool {
    matches!(
        name,
        "description"
            | "opt"
            | "opt/long"
            | "opt/arg"
            | "opt/arg/help"
            | "opt/flagvalue"
            | "opt/help"
            | "opt/nohelp"
            | "env"
            | "env/nohelp"
            | "args"
    ) || is_indexed_slot(name)
}

/// Match indexed slot names: `opt/#N`, `opt/#N/long`, ..., `env/#N`.
fn is_indexed_slot(name: &str) -> bool {
    const OPT_SUFFIXES: &[&str] = &["", "/long", "/arg", "/arg/help", "/flagvalue", "/nohelp"];
    const ENV_SUFFIXES: &[&str] = &[""];

    for (prefix, suffixes) in [("opt/#", OPT_SUFFIXES), ("env/#", ENV_SUFFIXES)] {
        if let Some(rest) = name.strip_prefix(prefix) {
            let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            if digits == 0 {
                return false;
            }
            return suffixes.contains(&&rest[digits..]);
        }
    }
    false
}
