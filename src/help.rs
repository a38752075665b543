//! Help rendering: the usage line and the options block, both derived from
//! the compiled specification so they can never drift from parsing
//! behavior.
//!
//! When help is requested the resolver stores both strings as metadata on
//! the caller's error key (`internal/libopts/help/usage` and
//! `internal/libopts/help/options`). [`help_message`] assembles the final
//! text from those channels, honoring the caller's `help/usage` override
//! and `help/prefix` insert.

use crate::spec::PlanEntry;
use crate::tree::Key;

/// Metadata name the rendered usage line is stored under.
pub(crate) const USAGE_META: &str = "internal/libopts/help/usage";
/// Metadata name the rendered options block is stored under.
pub(crate) const OPTIONS_META: &str = "internal/libopts/help/options";

/// Render the usage line, e.g. `"Usage: prog [OPTION]... [ARG]...\n"`.
///
/// The two suffix segments appear only when the spec declares at least one
/// visible option or an `args = remaining` key, respectively.
pub(crate) fn usage_line(progname: &str, has_opts: bool, has_args: bool) -> String {
    format!(
        "Usage: {progname}{}{}\n",
        if has_opts { " [OPTION]..." } else { "" },
        if has_args { " [ARG]..." } else { "" },
    )
}

/// Render the options block: the literal `OPTIONS` followed by one help
/// line per plan entry, in plan order. Entries without a help line (hidden
/// or unbound) are skipped; if nothing is visible the block is empty.
pub(crate) fn options_list(plan: &[PlanEntry]) -> String {
    let mut block = String::new();
    for line in plan.iter().filter_map(|entry| entry.help_line.as_deref()) {
        if block.is_empty() {
            block.push_str("OPTIONS");
        }
        block.push('\n');
        block.push_str(line);
    }
    if !block.is_empty() {
        block.push('\n');
    }
    block
}

/// Assemble the full help message from the metadata on `error_key`.
///
/// The usage line comes from the `help/usage` metadata if the caller set
/// one, otherwise from the line the resolver stored; if neither is present
/// (help was never requested) this returns `None`. A `help/prefix`
/// metadata value is inserted between the usage line and the options
/// block.
pub fn help_message(error_key: &Key) -> Option<String> {
    let usage = error_key
        .meta_str("help/usage")
        .or_else(|| error_key.meta_str(USAGE_META))?;
    let prefix = error_key.meta_str("help/prefix").unwrap_or("");
    let options = error_key.meta_str(OPTIONS_META).unwrap_or("");
    Some(format!("{usage}{prefix}{options}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{error_key, spec_key, spec_tree};
    use crate::spec::compile;

    #[test]
    fn usage_with_options_and_args() {
        assert_eq!(
            usage_line("prog", true, true),
            "Usage: prog [OPTION]... [ARG]...\n"
        );
    }

    #[test]
    fn usage_with_options_only() {
        assert_eq!(usage_line("prog", true, false), "Usage: prog [OPTION]...\n");
    }

    #[test]
    fn usage_bare() {
        assert_eq!(usage_line("prog", false, false), "Usage: prog\n");
    }

    #[test]
    fn options_block_lists_plan_entries_in_order() {
        let tree = spec_tree(vec![
            spec_key(
                "alpha",
                &[("opt", "a"), ("opt/arg", "none"), ("description", "first")],
            ),
            spec_key(
                "beta",
                &[("opt", "b"), ("opt/arg", "none"), ("description", "second")],
            ),
        ]);
        let compiled = compile(&tree).unwrap();
        let block = options_list(&compiled.plan);
        assert!(block.starts_with("OPTIONS\n"));
        assert!(block.ends_with('\n'));
        let alpha = block.find("first").unwrap();
        let beta = block.find("second").unwrap();
        assert!(alpha < beta);
    }

    #[test]
    fn options_block_empty_without_visible_options() {
        let tree = spec_tree(vec![spec_key("files/#", &[("args", "remaining")])]);
        let compiled = compile(&tree).unwrap();
        assert_eq!(options_list(&compiled.plan), "");
    }

    #[test]
    fn hidden_entries_are_skipped() {
        let tree = spec_tree(vec![spec_key(
            "secret",
            &[("opt", "s"), ("opt/nohelp", "1")],
        )]);
        let compiled = compile(&tree).unwrap();
        assert_eq!(options_list(&compiled.plan), "");
    }

    #[test]
    fn help_message_requires_stored_usage() {
        assert_eq!(help_message(&error_key()), None);
    }

    #[test]
    fn help_message_concatenates_channels() {
        let mut key = error_key();
        key.set_meta(USAGE_META, "Usage: prog [OPTION]...\n");
        key.set_meta(OPTIONS_META, "OPTIONS\n  -x\n");
        assert_eq!(
            help_message(&key).unwrap(),
            "Usage: prog [OPTION]...\nOPTIONS\n  -x\n"
        );
    }

    #[test]
    fn help_message_inserts_prefix() {
        let mut key = error_key();
        key.set_meta(USAGE_META, "Usage: prog\n");
        key.set_meta(OPTIONS_META, "OPTIONS\n  -x\n");
        key.set_meta("help/prefix", "\nA fine tool.\n");
        assert_eq!(
            help_message(&key).unwrap(),
            "Usage: prog\n\nA fine tool.\nOPTIONS\n  -x\n"
        );
    }

    #[test]
    fn help_message_honors_usage_override() {
        let mut key = error_key();
        key.set_meta(USAGE_META, "Usage: prog\n");
        key.set_meta("help/usage", "usage: prog [flags]\n");
        assert_eq!(help_message(&key).unwrap(), "usage: prog [flags]\n");
    }
}
