//! Declarative program-options resolution for configuration trees. Annotate
//! your spec keys, hand over `argv` and the environment, and go.
//!
//! Specopts reads a *specification*: keys in the `spec` namespace of a
//! [`ConfigTree`] whose metadata declare command-line options and
//! environment variables. [`resolve`] compiles that specification, parses
//! the argument vector and environment against it, and writes each resolved
//! value to the matching key in the `proc` namespace — one namespaced tree
//! in, resolved values out, no callback wiring per option.
//!
//! ```ignore
//! let mut error_key = Key::new(Namespace::Cascading, "");
//! match specopts::resolve(&mut tree, &argv, &envp, &mut error_key)? {
//!     Outcome::HelpRequested => print!("{}", help_message(&error_key).unwrap()),
//!     Outcome::Resolved => run(&tree),
//! }
//! ```
//!
//! # Declaring options
//!
//! Everything is metadata on a spec key. The recognized annotations:
//!
//! | Metadata | Meaning |
//! |----------|---------|
//! | `opt` | Short option character |
//! | `opt/long` | Long option name |
//! | `opt/arg` | `none`, `optional` or `required` (default `required`) |
//! | `opt/flagvalue` | Value recorded when no argument is given (default `"1"`) |
//! | `opt/arg/help` | Argument placeholder in help (default `ARG`) |
//! | `opt/help` | Help text; falls back to `description` |
//! | `opt/nohelp` | `"1"` hides the option from help |
//! | `env` | Environment variable name |
//! | `args` | `remaining` collects all positionals (array keys only) |
//!
//! A key with `spec/verbose` carrying `opt = "v"`, `opt/long = "verbose"`
//! and `opt/arg = "none"` accepts `-v` and `--verbose` and resolves to
//! `proc/verbose = "1"`.
//!
//! `optional` arguments exist only in the `--name=value` syntax of long
//! options; the short form of the same key behaves as if `opt/arg` were
//! `none`. A key may carry several options by switching `opt` to the array
//! convention (`opt = "#1"`, `opt/#0 = ...`, `opt/#1 = ...`), each slot
//! with its own argument mode and flag value. The same convention works
//! for `env`.
//!
//! # Array keys and repetition
//!
//! A spec key whose last path segment is `#` holds an ordered sequence.
//! Its options may be repeated — every occurrence becomes an element
//! `proc/.../#0`, `#1`, ... and the array parent stores the last index
//! label. Options of scalar keys cannot be repeated. Environment variables
//! bound to array keys are split like `PATH` at [`PATH_SEPARATOR`] (`;` on
//! Windows, `:` elsewhere); bound to scalar keys they are taken verbatim.
//!
//! An array key with `args = "remaining"` receives every non-option
//! argument, in order.
//!
//! # Precedence
//!
//! At most one source may produce a key's value:
//!
//! ```text
//! Short option          -v
//!        ↑ wins over
//! Long option           --verbose
//!        ↑ wins over
//! Environment           VERBOSE
//!        ↑ wins over
//! Positionals           args = "remaining"
//! ```
//!
//! The short and long form of the *same* key shadow each other silently;
//! any other pair of sources feeding one key is a usage error. Sources
//! that bind different keys compose freely.
//!
//! # Help
//!
//! `-h` and `--help` are reserved. When either is given, [`resolve`]
//! leaves the tree untouched, stores a usage line and an options block as
//! metadata on the error key, and returns [`Outcome::HelpRequested`];
//! [`help_message`] assembles the final text. The caller can override the
//! usage line (`help/usage` metadata) or insert text between usage and
//! options (`help/prefix`). Everything in the help output is derived from
//! the same compiled specification the parser uses, so the two cannot
//! disagree.
//!
//! # Argument syntax
//!
//! The grammar follows `getopt_long(3)`: `-x value`, `-xvalue`, clustered
//! `-xyz`, `--name value`, `--name=value`, and `--` to end option
//! processing. A bare `-` is positional. By default option processing
//! continues after positionals; set `posixly = "1"` on the error key to
//! stop at the first positional.
//!
//! # Loading specifications
//!
//! [`resolve`] consumes an already-built tree. For the common case of a
//! spec kept in a file, [`spec_from_toml`] maps a TOML document onto spec
//! keys:
//!
//! ```toml
//! ["verbose"]
//! opt = "v"
//! "opt/long" = "verbose"
//! "opt/arg" = "none"
//! description = "explain what is being done"
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`SpecoptsError`]. Errors come in two
//! kinds (see [`ErrorKind`]): *illegal specification* (duplicate or
//! reserved bindings, misplaced annotations), detected while compiling,
//! before any argument is inspected; and *illegal use* (unknown options,
//! missing arguments, forbidden repetition), detected while parsing and
//! writing. Messages are user-facing and name the offending option and
//! spec key.

pub mod error;
pub mod tree;

mod args;
mod env;
mod help;
mod load;
mod resolve;
mod spec;
mod write;

#[cfg(test)]
mod fixtures;

pub use env::PATH_SEPARATOR;
pub use error::{ErrorKind, SpecoptsError};
pub use help::help_message;
pub use load::spec_from_toml;
pub use resolve::{Outcome, resolve};
pub use tree::{ConfigTree, Key, Namespace};
