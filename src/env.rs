//! Environment variable reading.
//!
//! The host hands the resolver a raw `NAME=VALUE` vector (the same shape as
//! the C `envp`). [`parse_envp`] turns it into a lookup table; the plan
//! decides which names matter, so unknown names are kept.
//!
//! Variables bound to array keys are treated like `PATH`: the raw value is
//! split at [`PATH_SEPARATOR`] into an ordered list. The separator is a
//! compile-time choice, `;` on Windows and `:` everywhere else.

use std::collections::HashMap;

/// Separator for `PATH`-style environment values.
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
/// Separator for `PATH`-style environment values.
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Build a name-to-value table from `NAME=VALUE` entries.
///
/// The first `=` delimits the name; any further `=` are part of the value.
/// Entries without a `=` are skipped. If a name appears more than once, the
/// last entry wins.
pub(crate) fn parse_envp<S: AsRef<str>>(envp: &[S]) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for entry in envp {
        if let Some((name, value)) = entry.as_ref().split_once('=') {
            vars.insert(name.to_string(), value.to_string());
        }
    }
    vars
}

/// Split a `PATH`-style value into its segments.
///
/// Every segment between separators becomes an element, empty ones
/// included, so `"/a:/b:"` yields `["/a", "/b", ""]`. A value without a
/// separator yields a single element.
pub(crate) fn split_path_value(raw: &str) -> Vec<String> {
    raw.split(PATH_SEPARATOR).map(str::to_string).collect()
}
