//! Core resolution pipeline: compile the specification, parse the inputs,
//! and materialize resolved values into the target tree.
//!
//! Operates on pre-captured data (argv and envp slices) with no I/O,
//! making the full pipeline testable with synthetic inputs. Steps:
//!
//! 1. Compile the spec-namespace keys into the option table and plan
//! 2. Parse `argv` against the option table
//! 3. If `-h`/`--help` occurred, render help onto the error key and stop
//! 4. Parse `envp` into the env table
//! 5. Apply the plan, writing resolved values into the `proc` namespace
//!
//! Every container built along the way (option table, plan, occurrences,
//! env table) lives only for the duration of the call; the target tree is
//! the sole side-effect channel.

use crate::args;
use crate::env;
use crate::error::SpecoptsError;
use crate::help;
use crate::spec::{self, OptionKey};
use crate::tree::{ConfigTree, Key};
use crate::write;

/// How a successful invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Values were resolved and written into the `proc` namespace.
    Resolved,
    /// `-h` or `--help` was given: the tree is untouched and the rendered
    /// help is stored on the error key (see [`help_message`]).
    ///
    /// [`help_message`]: crate::help_message
    HelpRequested,
}

/// Resolve program options against the specification in `tree`.
///
/// `argv` is the full argument vector including the program name at index
/// 0; `envp` is a list of `NAME=VALUE` strings. `error_key` carries the
/// optional `posixly` metadata in, and receives the rendered help channels
/// when help is requested.
///
/// On success, one `proc`-namespace key (or element array) is written per
/// spec key for which a source was present.
pub fn resolve<A, E>(
    tree: &mut ConfigTree,
    argv: &[A],
    envp: &[E],
    error_key: &mut Key,
) -> Result<Outcome, SpecoptsError>
where
    A: AsRef<str>,
    E: AsRef<str>,
{
    let compiled = spec::compile(tree)?;

    let posixly = error_key.meta_str("posixly") == Some("1");
    let parsed = args::parse_args(&compiled.options, argv, posixly)?;

    if help_requested(&compiled, &parsed) {
        let progname = progname(argv);
        error_key.set_meta(
            help::USAGE_META,
            help::usage_line(progname, compiled.has_opts, compiled.has_args),
        );
        error_key.set_meta(help::OPTIONS_META, help::options_list(&compiled.plan));
        return Ok(Outcome::HelpRequested);
    }

    let env_values = env::parse_envp(envp);
    write::write_resolved(tree, &compiled, &parsed, &env_values)?;

    Ok(Outcome::Resolved)
}

/// Whether `-h` or its long alias occurred.
fn help_requested(compiled: &spec::CompiledSpec, parsed: &args::ParsedArgs) -> bool {
    let short_help = OptionKey::Short('h');
    if parsed.occurrences.contains_key(&short_help) {
        return true;
    }
    compiled
        .options
        .get(&short_help)
        .and_then(|entry| entry.alias.as_ref())
        .is_some_and(|alias| parsed.occurrences.contains_key(alias))
}

/// `argv[0]` with everything up to and including the last `/` stripped.
fn progname<A: AsRef<str>>(argv: &[A]) -> &str {
    let raw = argv.first().map(A::as_ref).unwrap_or("");
    match raw.rsplit_once('/') {
        Some((_, base)) => base,
        None => raw,
    }
}
