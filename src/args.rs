//! Argument parser: scan `argv` against the compiled option table.
//!
//! Produces one [`Occurrence`] per option that appeared, plus the ordered
//! list of positional arguments. Grammar:
//!
//! - `--` ends option processing; everything after it is positional.
//! - `--name`, `--name=value`, `--name value` are long options.
//! - `-x`, `-xvalue`, `-x value` are short options; `-xyz` is a cluster of
//!   shorts, processed left to right until one of them takes an argument.
//! - `-` alone is positional.
//! - In POSIX mode the first positional also ends option processing.
//!
//! A `single` option may occur at most once; an `array` option accumulates
//! its values in order of appearance.

use std::collections::HashMap;

use crate::error::SpecoptsError;
use crate::spec::{ArgMode, OptionEntry, OptionKey, OptionKind};

/// All appearances of one option in `argv`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Occurrence {
    /// Values in order of appearance; a `single` option has exactly one.
    pub values: Vec<String>,
    /// Whether any appearance used the short form. The writer uses this to
    /// let a short occurrence shadow the long form bound to the same key.
    pub short: bool,
}

/// Parser output: occurrences keyed by option, and the residual
/// positionals in order.
#[derive(Debug, Default)]
pub(crate) struct ParsedArgs {
    pub occurrences: HashMap<OptionKey, Occurrence>,
    pub positionals: Vec<String>,
}

/// Parse `argv[1..]` against the option table. `posixly` makes the first
/// positional argument end option processing.
pub(crate) fn parse_args<S: AsRef<str>>(
    options: &HashMap<OptionKey, OptionEntry>,
    argv: &[S],
    posixly: bool,
) -> Result<ParsedArgs, SpecoptsError> {
    let mut parsed = ParsedArgs::default();

    let mut i = 1;
    while i < argv.len() {
        let token = argv[i].as_ref();
        if token == "--" {
            i += 1;
            break;
        }
        if let Some(rest) = token.strip_prefix("--") {
            i = parse_long(options, &mut parsed.occurrences, argv, i, rest)?;
        } else if token.len() > 1 && token.starts_with('-') {
            i = parse_cluster(options, &mut parsed.occurrences, argv, i, &token[1..])?;
        } else {
            // Not an option. This includes a bare "-".
            if posixly {
                break;
            }
            parsed.positionals.push(token.to_string());
        }
        i += 1;
    }

    // Everything after "--" (or after the first positional in POSIX mode).
    while i < argv.len() {
        parsed.positionals.push(argv[i].as_ref().to_string());
        i += 1;
    }

    Ok(parsed)
}

/// Parse one long-option token (without the leading `--`). Returns the
/// index of the last `argv` element consumed.
fn parse_long<S: AsRef<str>>(
    options: &HashMap<OptionKey, OptionEntry>,
    occurrences: &mut HashMap<OptionKey, Occurrence>,
    argv: &[S],
    mut i: usize,
    rest: &str,
) -> Result<usize, SpecoptsError> {
    let (name, attached) = match rest.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (rest, None),
    };

    let key = OptionKey::Long(name.to_string());
    let Some(entry) = options.get(&key) else {
        return Err(SpecoptsError::UnknownOption {
            option: format!("--{name}"),
        });
    };
    if entry.kind == OptionKind::Single && occurrences.contains_key(&key) {
        return Err(SpecoptsError::RepeatedOption {
            option: key.to_string(),
        });
    }

    let value = match entry.has_arg {
        ArgMode::Required => match attached {
            Some(value) => value.to_string(),
            None => {
                i += 1;
                next_token(argv, i, &key)?
            }
        },
        // An omitted optional argument falls back to the flag value; the
        // next token is never consumed.
        ArgMode::Optional => match attached {
            Some(value) => value.to_string(),
            None => entry.flag_value.clone(),
        },
        ArgMode::None => {
            if attached.is_some() {
                return Err(SpecoptsError::UnexpectedArgument {
                    option: key.to_string(),
                });
            }
            entry.flag_value.clone()
        }
    };

    record(occurrences, key, &value, false);
    Ok(i)
}

/// Parse one short-option cluster (the token without the leading `-`).
/// Returns the index of the last `argv` element consumed.
fn parse_cluster<S: AsRef<str>>(
    options: &HashMap<OptionKey, OptionEntry>,
    occurrences: &mut HashMap<OptionKey, Occurrence>,
    argv: &[S],
    mut i: usize,
    cluster: &str,
) -> Result<usize, SpecoptsError> {
    for (pos, c) in cluster.char_indices() {
        let key = OptionKey::Short(c);
        let Some(entry) = options.get(&key) else {
            return Err(SpecoptsError::UnknownOption {
                option: format!("-{c}"),
            });
        };
        if entry.kind == OptionKind::Single && occurrences.contains_key(&key) {
            return Err(SpecoptsError::RepeatedOption {
                option: key.to_string(),
            });
        }

        if entry.has_arg == ArgMode::Required {
            let attached = &cluster[pos + c.len_utf8()..];
            let value = if attached.is_empty() {
                i += 1;
                next_token(argv, i, &key)?
            } else {
                attached.to_string()
            };
            record(occurrences, key, &value, true);
            // The argument swallows the rest of the token.
            return Ok(i);
        }

        // `optional` has no syntax in short form; it behaves like `none`.
        let value = entry.flag_value.clone();
        record(occurrences, key, &value, true);
    }

    Ok(i)
}

fn next_token<S: AsRef<str>>(
    argv: &[S],
    i: usize,
    option: &OptionKey,
) -> Result<String, SpecoptsError> {
    argv.get(i)
        .map(|t| t.as_ref().to_string())
        .ok_or_else(|| SpecoptsError::MissingArgument {
            option: option.to_string(),
        })
}

fn record(
    occurrences: &mut HashMap<OptionKey, Occurrence>,
    key: OptionKey,
    value: &str,
    is_short: bool,
) {
    let occurrence = occurrences.entry(key).or_default();
    occurrence.values.push(value.to_string());
    if is_short {
        occurrence.short = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{argv, spec_key, spec_tree};
    use crate::spec::compile;

    /// Option table: -o/--out (required arg), -v/--verbose (flag),
    /// -i/--item (array, required arg), --color (optional, flagvalue
    /// "auto").
    fn table() -> HashMap<OptionKey, OptionEntry> {
        let tree = spec_tree(vec![
            spec_key("out", &[("opt", "o"), ("opt/long", "out")]),
            spec_key(
                "verbose",
                &[("opt", "v"), ("opt/long", "verbose"), ("opt/arg", "none")],
            ),
            spec_key("items/#", &[("opt", "i"), ("opt/long", "item")]),
            spec_key(
                "color",
                &[
                    ("opt/long", "color"),
                    ("opt/arg", "optional"),
                    ("opt/flagvalue", "auto"),
                ],
            ),
        ]);
        compile(&tree).unwrap().options
    }

    fn values(parsed: &ParsedArgs, key: &OptionKey) -> Vec<String> {
        parsed.occurrences.get(key).expect("no occurrence").values.clone()
    }

    #[test]
    fn long_with_attached_value() {
        let parsed = parse_args(&table(), &argv(&["prog", "--out=file"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("out".into())), ["file"]);
    }

    #[test]
    fn long_with_detached_value() {
        let parsed = parse_args(&table(), &argv(&["prog", "--out", "file"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("out".into())), ["file"]);
        assert!(parsed.positionals.is_empty());
    }

    #[test]
    fn long_with_empty_attached_value() {
        let parsed = parse_args(&table(), &argv(&["prog", "--out="]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("out".into())), [""]);
    }

    #[test]
    fn long_missing_required_argument() {
        let err = parse_args(&table(), &argv(&["prog", "--out"]), false).unwrap_err();
        assert!(matches!(err, SpecoptsError::MissingArgument { .. }));
        assert!(err.to_string().contains("--out"));
    }

    #[test]
    fn optional_long_without_value_takes_flagvalue() {
        let parsed = parse_args(&table(), &argv(&["prog", "--color"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("color".into())), ["auto"]);
    }

    #[test]
    fn optional_long_does_not_consume_next_token() {
        let parsed = parse_args(&table(), &argv(&["prog", "--color", "red"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("color".into())), ["auto"]);
        assert_eq!(parsed.positionals, ["red"]);
    }

    #[test]
    fn optional_long_with_empty_attached_value_is_empty() {
        let parsed = parse_args(&table(), &argv(&["prog", "--color="]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("color".into())), [""]);
    }

    #[test]
    fn flag_long_rejects_attached_value() {
        let err = parse_args(&table(), &argv(&["prog", "--verbose=yes"]), false).unwrap_err();
        assert!(matches!(err, SpecoptsError::UnexpectedArgument { .. }));
    }

    #[test]
    fn unknown_long_option() {
        let err = parse_args(&table(), &argv(&["prog", "--bogus"]), false).unwrap_err();
        assert!(matches!(
            err,
            SpecoptsError::UnknownOption { ref option } if option == "--bogus"
        ));
    }

    #[test]
    fn single_long_cannot_repeat() {
        let err =
            parse_args(&table(), &argv(&["prog", "--out=a", "--out=b"]), false).unwrap_err();
        assert!(matches!(err, SpecoptsError::RepeatedOption { .. }));
    }

    #[test]
    fn array_long_accumulates() {
        let parsed = parse_args(
            &table(),
            &argv(&["prog", "--item=a", "--item", "b"]),
            false,
        )
        .unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("item".into())), ["a", "b"]);
    }

    #[test]
    fn short_with_attached_value() {
        let parsed = parse_args(&table(), &argv(&["prog", "-ofile"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Short('o')), ["file"]);
    }

    #[test]
    fn short_with_detached_value() {
        let parsed = parse_args(&table(), &argv(&["prog", "-o", "file"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Short('o')), ["file"]);
    }

    #[test]
    fn short_missing_required_argument() {
        let err = parse_args(&table(), &argv(&["prog", "-o"]), false).unwrap_err();
        assert!(matches!(err, SpecoptsError::MissingArgument { .. }));
    }

    #[test]
    fn unknown_short_option() {
        let err = parse_args(&table(), &argv(&["prog", "-z"]), false).unwrap_err();
        assert!(matches!(
            err,
            SpecoptsError::UnknownOption { ref option } if option == "-z"
        ));
    }

    #[test]
    fn cluster_of_flags_then_argument_taker() {
        let parsed = parse_args(&table(), &argv(&["prog", "-vofile"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Short('v')), ["1"]);
        assert_eq!(values(&parsed, &OptionKey::Short('o')), ["file"]);
    }

    #[test]
    fn repeated_single_flag_in_cluster() {
        let err = parse_args(&table(), &argv(&["prog", "-vvv"]), false).unwrap_err();
        assert!(matches!(
            err,
            SpecoptsError::RepeatedOption { ref option } if option == "-v"
        ));
    }

    #[test]
    fn array_short_repeats_across_tokens() {
        let parsed = parse_args(&table(), &argv(&["prog", "-i", "a", "-i", "b"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Short('i')), ["a", "b"]);
    }

    #[test]
    fn occurrence_marks_short_use() {
        let parsed = parse_args(&table(), &argv(&["prog", "-v", "--out=x"]), false).unwrap();
        assert!(parsed.occurrences[&OptionKey::Short('v')].short);
        assert!(!parsed.occurrences[&OptionKey::Long("out".into())].short);
    }

    #[test]
    fn bare_dash_is_positional() {
        let parsed = parse_args(&table(), &argv(&["prog", "-", "file"]), false).unwrap();
        assert_eq!(parsed.positionals, ["-", "file"]);
    }

    #[test]
    fn double_dash_ends_option_processing() {
        let parsed =
            parse_args(&table(), &argv(&["prog", "--", "-v", "--out=x"]), false).unwrap();
        assert!(parsed.occurrences.is_empty());
        assert_eq!(parsed.positionals, ["-v", "--out=x"]);
    }

    #[test]
    fn second_double_dash_is_positional() {
        let parsed = parse_args(&table(), &argv(&["prog", "--", "--"]), false).unwrap();
        assert_eq!(parsed.positionals, ["--"]);
    }

    #[test]
    fn posix_mode_stops_at_first_positional() {
        let parsed = parse_args(&table(), &argv(&["prog", "-v", "stop", "-o", "x"]), true).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Short('v')), ["1"]);
        assert!(!parsed.occurrences.contains_key(&OptionKey::Short('o')));
        assert_eq!(parsed.positionals, ["stop", "-o", "x"]);
    }

    #[test]
    fn options_and_positionals_interleave_by_default() {
        let parsed =
            parse_args(&table(), &argv(&["prog", "a", "-v", "b", "--out=x", "c"]), false).unwrap();
        assert_eq!(parsed.positionals, ["a", "b", "c"]);
        assert!(parsed.occurrences.contains_key(&OptionKey::Short('v')));
        assert!(parsed.occurrences.contains_key(&OptionKey::Long("out".into())));
    }

    #[test]
    fn help_options_are_always_parsable() {
        let parsed = parse_args(&table(), &argv(&["prog", "--help"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Long("help".into())), ["1"]);
        let parsed = parse_args(&table(), &argv(&["prog", "-h"]), false).unwrap();
        assert_eq!(values(&parsed, &OptionKey::Short('h')), ["1"]);
    }

    #[test]
    fn argv_with_only_program_name() {
        let parsed = parse_args(&table(), &argv(&["prog"]), false).unwrap();
        assert!(parsed.occurrences.is_empty());
        assert!(parsed.positionals.is_empty());
    }
}
