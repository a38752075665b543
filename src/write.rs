//! Value writer: apply each plan entry, pick one source by precedence, and
//! write the result into the `proc` namespace of the target tree.
//!
//! Precedence per spec key: short option, then long option, then
//! environment variable, then (for `args=remaining` keys) the positional
//! list. A short occurrence shadows the long form bound to the same key;
//! any other pair of contributing sources for one key is a usage error,
//! enforced by refusing to overwrite a destination that already has a
//! non-empty value.
//!
//! Array-key destinations are written as `.../#0`, `.../#1`, ... elements
//! in source order, with the array parent set to the last index label.

use std::collections::HashMap;

use crate::args::ParsedArgs;
use crate::env::split_path_value;
use crate::error::SpecoptsError;
use crate::spec::{CompiledSpec, PlanEntry};
use crate::tree::{
    ConfigTree, Key, Namespace, array_element, array_index_label, array_parent, is_array_path,
};

enum WriteOutcome {
    Written,
    Conflict,
}

/// Apply the whole plan to `tree`. Entries are processed in plan order;
/// within an entry at most one source contributes.
pub(crate) fn write_resolved(
    tree: &mut ConfigTree,
    compiled: &CompiledSpec,
    parsed: &ParsedArgs,
    env: &HashMap<String, String>,
) -> Result<(), SpecoptsError> {
    for entry in &compiled.plan {
        if write_option_values(tree, entry, parsed)? {
            continue;
        }
        if write_env_values(tree, entry, env)? {
            continue;
        }
        write_args_values(tree, entry, &parsed.positionals);
    }
    Ok(())
}

/// Write values from option occurrences. Returns whether any option
/// contributed.
fn write_option_values(
    tree: &mut ConfigTree,
    entry: &PlanEntry,
    parsed: &ParsedArgs,
) -> Result<bool, SpecoptsError> {
    let mut value_found = false;
    let mut short_found = false;

    // Visit short references before long ones so that a short occurrence
    // wins over (rather than conflicts with) the key's long form.
    let shorts = entry.options.iter().filter(|o| o.is_short());
    let longs = entry.options.iter().filter(|o| !o.is_short());
    for option in shorts.chain(longs) {
        if short_found && !option.is_short() {
            continue;
        }
        let Some(occurrence) = parsed.occurrences.get(option) else {
            continue;
        };

        match write_proc_value(tree, &entry.spec_path, &occurrence.values) {
            WriteOutcome::Written => {
                value_found = true;
                if occurrence.short {
                    short_found = true;
                }
            }
            WriteOutcome::Conflict => {
                return Err(SpecoptsError::OptionAlreadyUsed {
                    option: option.to_string(),
                    key: Namespace::Spec.qualify(&entry.spec_path),
                });
            }
        }
    }

    Ok(value_found)
}

/// Write values from environment variables. Returns whether any variable
/// contributed.
fn write_env_values(
    tree: &mut ConfigTree,
    entry: &PlanEntry,
    env: &HashMap<String, String>,
) -> Result<bool, SpecoptsError> {
    let mut value_found = false;

    for var in &entry.env_vars {
        let Some(raw) = env.get(var) else {
            continue;
        };
        // Array destinations get PATH-style splitting; scalar destinations
        // take the raw value verbatim.
        let values = if is_array_path(&entry.spec_path) {
            split_path_value(raw)
        } else {
            vec![raw.clone()]
        };

        match write_proc_value(tree, &entry.spec_path, &values) {
            WriteOutcome::Written => value_found = true,
            WriteOutcome::Conflict => {
                return Err(SpecoptsError::EnvVarAlreadyUsed {
                    var: var.clone(),
                    key: Namespace::Spec.qualify(&entry.spec_path),
                });
            }
        }
    }

    Ok(value_found)
}

/// Copy the positional list into an `args = remaining` key.
fn write_args_values(tree: &mut ConfigTree, entry: &PlanEntry, positionals: &[String]) {
    if !entry.remaining_args {
        return;
    }

    // The compiler guarantees the spec key is an array key.
    let parent = array_parent(&entry.spec_path);
    for (index, value) in positionals.iter().enumerate() {
        tree.insert(Key::new(Namespace::Proc, array_element(parent, index)).with_value(value));
    }
    let label = match positionals.len() {
        0 => "#".to_string(),
        n => array_index_label(n - 1),
    };
    tree.insert(Key::new(Namespace::Proc, parent).with_value(label));
}

/// Write `values` to the `proc` destination derived from `spec_path`,
/// refusing to overwrite a non-empty destination.
fn write_proc_value(tree: &mut ConfigTree, spec_path: &str, values: &[String]) -> WriteOutcome {
    debug_assert!(!values.is_empty());

    if is_array_path(spec_path) {
        let parent = array_parent(spec_path);
        if has_nonempty_value(tree, parent) {
            return WriteOutcome::Conflict;
        }
        let mut last = 0;
        for (index, value) in values.iter().enumerate() {
            tree.insert(Key::new(Namespace::Proc, array_element(parent, index)).with_value(value));
            last = index;
        }
        tree.insert(Key::new(Namespace::Proc, parent).with_value(array_index_label(last)));
    } else {
        if has_nonempty_value(tree, spec_path) {
            return WriteOutcome::Conflict;
        }
        let value = values.last().cloned().unwrap_or_default();
        tree.insert(Key::new(Namespace::Proc, spec_path).with_value(value));
    }

    WriteOutcome::Written
}

fn has_nonempty_value(tree: &ConfigTree, proc_path: &str) -> bool {
    tree.get(&Namespace::Proc.qualify(proc_path))
        .is_some_and(|key| !key.value().is_empty())
}
