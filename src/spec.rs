//! Specification compiler: turn per-key option metadata into a typed option
//! table and a per-key resolution plan.
//!
//! Operates on an already-loaded spec tree with no I/O. For every key in
//! the `spec` namespace the compiler reads the annotations described in the
//! crate docs (`opt`, `opt/long`, `opt/arg`, `env`, `args`, ...), validates
//! them, and produces:
//!
//! 1. an option table mapping [`OptionKey`] (short char or long name) to
//!    its compiled [`OptionEntry`],
//! 2. a plan: one [`PlanEntry`] per spec key with at least one binding,
//!    listing its options, env vars and args flag in precedence order,
//! 3. the pre-rendered help line for each plan entry.
//!
//! Metadata strings are parsed here exactly once; the parser and writer
//! only ever see the typed representation. The table is seeded with the
//! reserved help options `-h`/`--help` before the spec is walked, which is
//! why neither may be declared by a spec key.

use std::collections::HashMap;
use std::fmt;

use crate::error::SpecoptsError;
use crate::tree::{ConfigTree, Key, Namespace, parse_array_index};

/// Whether an option expects an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArgMode {
    None,
    Optional,
    Required,
}

/// Whether repeated occurrences collect into an array or are an error.
///
/// An option is `Array` exactly when its owning spec key is an array key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OptionKind {
    Single,
    Array,
}

/// Identity of a usable option: a short character or a long name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum OptionKey {
    Short(char),
    Long(String),
}

impl OptionKey {
    pub(crate) fn is_short(&self) -> bool {
        matches!(self, OptionKey::Short(_))
    }
}

impl fmt::Display for OptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKey::Short(c) => write!(f, "-{c}"),
            OptionKey::Long(name) => write!(f, "--{name}"),
        }
    }
}

/// A compiled option: everything the argument parser needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OptionEntry {
    /// Path of the owning spec key. `None` for the preregistered help
    /// options, which have no plan entry.
    pub spec_path: Option<String>,
    pub has_arg: ArgMode,
    pub kind: OptionKind,
    /// Value recorded when the option is present without an argument.
    pub flag_value: String,
    /// Equivalent option under another key (`-h` aliases `--help`).
    pub alias: Option<OptionKey>,
}

/// Resolution plan for one spec key: the sources that may produce its
/// value, in precedence order, plus its rendered help line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanEntry {
    pub spec_path: String,
    /// Option references in slot order, short before long within a slot.
    pub options: Vec<OptionKey>,
    pub env_vars: Vec<String>,
    pub remaining_args: bool,
    pub help_line: Option<String>,
}

impl PlanEntry {
    fn new(spec_path: &str) -> Self {
        PlanEntry {
            spec_path: spec_path.to_string(),
            options: Vec::new(),
            env_vars: Vec::new(),
            remaining_args: false,
            help_line: None,
        }
    }
}

/// Output of the compiler, consumed by the parser, writer and help
/// renderer. Scoped to a single resolver invocation.
#[derive(Debug)]
pub(crate) struct CompiledSpec {
    pub options: HashMap<OptionKey, OptionEntry>,
    pub plan: Vec<PlanEntry>,
    pub has_opts: bool,
    pub has_args: bool,
}

/// One option slot as read from metadata, before table insertion.
struct SlotData {
    short: Option<char>,
    long: Option<String>,
    has_arg: ArgMode,
    flag_value: String,
    arg_name: Option<String>,
    hidden: bool,
}

/// Width the option prefix is padded to when it fits; longer prefixes wrap
/// and the help text is indented on the next line.
const HELP_COLUMN: usize = 28;

/// Compile the spec-namespace keys of `tree` into an option table and a
/// resolution plan. Deterministic: the output is a function of the
/// specification alone.
pub(crate) fn compile(tree: &ConfigTree) -> Result<CompiledSpec, SpecoptsError> {
    let mut compiler = Compiler {
        options: preregistered_help_options(),
        plan: Vec::new(),
        used_env: HashMap::new(),
        has_opts: false,
        has_args: false,
    };

    for key in tree.iter().filter(|k| k.namespace() == Namespace::Spec) {
        compiler.compile_key(key)?;
    }

    Ok(CompiledSpec {
        options: compiler.options,
        plan: compiler.plan,
        has_opts: compiler.has_opts,
        has_args: compiler.has_args,
    })
}

/// The reserved help options, present in every option table.
fn preregistered_help_options() -> HashMap<OptionKey, OptionEntry> {
    let long = OptionKey::Long("help".to_string());
    let mut options = HashMap::new();
    options.insert(
        OptionKey::Short('h'),
        OptionEntry {
            spec_path: None,
            has_arg: ArgMode::None,
            kind: OptionKind::Single,
            flag_value: "1".to_string(),
            alias: Some(long.clone()),
        },
    );
    options.insert(
        long,
        OptionEntry {
            spec_path: None,
            has_arg: ArgMode::None,
            kind: OptionKind::Single,
            flag_value: "1".to_string(),
            alias: None,
        },
    );
    options
}

struct Compiler {
    options: HashMap<OptionKey, OptionEntry>,
    plan: Vec<PlanEntry>,
    /// Env var name to the spec path that claimed it.
    used_env: HashMap<String, String>,
    has_opts: bool,
    has_args: bool,
}

impl Compiler {
    fn compile_key(&mut self, key: &Key) -> Result<(), SpecoptsError> {
        let mut entry: Option<PlanEntry> = None;

        self.process_options(key, &mut entry)?;
        self.process_env_vars(key, &mut entry)?;
        self.process_args(key, &mut entry)?;

        if let Some(entry) = entry {
            self.plan.push(entry);
        }
        Ok(())
    }

    fn process_options(
        &mut self,
        key: &Key,
        entry: &mut Option<PlanEntry>,
    ) -> Result<(), SpecoptsError> {
        let mut slots = meta_slots(key, "opt");
        if slots.is_empty() {
            if key.meta_str("opt/long").is_none() {
                return Ok(());
            }
            // A key may declare only `opt/long`; treat it as a single
            // long-only slot.
            slots.push("opt".to_string());
        }

        let mut short_parts: Vec<String> = Vec::new();
        let mut long_parts: Vec<String> = Vec::new();

        for slot in &slots {
            let data = read_slot(key, slot)?;
            if data.short.is_none() && data.long.is_none() {
                return Err(SpecoptsError::EmptyOptionSlot {
                    key: key.full_name(),
                });
            }
            self.process_short_slot(key, &data, entry, &mut short_parts)?;
            self.process_long_slot(key, &data, entry, &mut long_parts)?;
        }

        if entry.is_some() {
            let prefix = match (short_parts.is_empty(), long_parts.is_empty()) {
                (false, false) => format!("{}, {}", short_parts.join(", "), long_parts.join(", ")),
                (false, true) => short_parts.join(", "),
                (true, false) => long_parts.join(", "),
                (true, true) => String::new(),
            };
            if !prefix.is_empty() {
                let help = key
                    .meta_str("opt/help")
                    .or_else(|| key.meta_str("description"))
                    .unwrap_or("");
                let line = if prefix.chars().count() <= HELP_COLUMN {
                    format!("  {prefix:<HELP_COLUMN$}{help}")
                } else {
                    format!("  {prefix}\n  {:30}{help}", "")
                };
                if let Some(entry) = entry {
                    entry.help_line = Some(line);
                }
            }
        }

        Ok(())
    }

    fn process_short_slot(
        &mut self,
        key: &Key,
        data: &SlotData,
        entry: &mut Option<PlanEntry>,
        short_parts: &mut Vec<String>,
    ) -> Result<(), SpecoptsError> {
        let Some(short) = data.short else {
            return Ok(());
        };

        if short == '-' {
            return Err(SpecoptsError::ReservedShortDash {
                key: key.full_name(),
            });
        }
        if short == 'h' {
            return Err(SpecoptsError::ReservedShortHelp {
                key: key.full_name(),
            });
        }

        let option = OptionKey::Short(short);
        self.insert_option(key, data, option.clone())?;

        entry
            .get_or_insert_with(|| PlanEntry::new(key.path()))
            .options
            .push(option);

        if !data.hidden {
            short_parts.push(format!("-{short}"));
            self.has_opts = true;
        }
        Ok(())
    }

    fn process_long_slot(
        &mut self,
        key: &Key,
        data: &SlotData,
        entry: &mut Option<PlanEntry>,
        long_parts: &mut Vec<String>,
    ) -> Result<(), SpecoptsError> {
        let Some(long) = &data.long else {
            return Ok(());
        };

        if long == "help" {
            return Err(SpecoptsError::ReservedLongHelp {
                key: key.full_name(),
            });
        }

        let option = OptionKey::Long(long.clone());
        self.insert_option(key, data, option.clone())?;

        entry
            .get_or_insert_with(|| PlanEntry::new(key.path()))
            .options
            .push(option);

        if !data.hidden {
            let arg_name = data.arg_name.as_deref().unwrap_or("ARG");
            let placeholder = match data.has_arg {
                ArgMode::Required => format!("={arg_name}"),
                ArgMode::Optional => format!("=[{arg_name}]"),
                ArgMode::None => String::new(),
            };
            long_parts.push(format!("--{long}{placeholder}"));
            self.has_opts = true;
        }
        Ok(())
    }

    fn insert_option(
        &mut self,
        key: &Key,
        data: &SlotData,
        option: OptionKey,
    ) -> Result<(), SpecoptsError> {
        if let Some(existing) = self.options.get(&option) {
            let existing = existing
                .spec_path
                .clone()
                .map(|p| Namespace::Spec.qualify(&p))
                .unwrap_or_else(|| "help".to_string());
            return Err(SpecoptsError::DuplicateOption {
                option: option.to_string(),
                existing,
                additional: key.full_name(),
            });
        }

        let kind = if key.is_array() {
            OptionKind::Array
        } else {
            OptionKind::Single
        };
        self.options.insert(
            option,
            OptionEntry {
                spec_path: Some(key.path().to_string()),
                has_arg: data.has_arg,
                kind,
                flag_value: data.flag_value.clone(),
                alias: None,
            },
        );
        Ok(())
    }

    fn process_env_vars(
        &mut self,
        key: &Key,
        entry: &mut Option<PlanEntry>,
    ) -> Result<(), SpecoptsError> {
        for slot in meta_slots(key, "env") {
            let Some(var) = key.meta_str(&slot) else {
                continue;
            };

            if let Some(existing) = self.used_env.get(var) {
                return Err(SpecoptsError::DuplicateEnvVar {
                    var: var.to_string(),
                    existing: Namespace::Spec.qualify(existing),
                    additional: key.full_name(),
                });
            }
            self.used_env.insert(var.to_string(), key.path().to_string());

            entry
                .get_or_insert_with(|| PlanEntry::new(key.path()))
                .env_vars
                .push(var.to_string());
        }
        Ok(())
    }

    fn process_args(
        &mut self,
        key: &Key,
        entry: &mut Option<PlanEntry>,
    ) -> Result<(), SpecoptsError> {
        if key.meta_str("args") != Some("remaining") {
            return Ok(());
        }
        if !key.is_array() {
            return Err(SpecoptsError::RemainingArgsOnNonArrayKey {
                key: key.full_name(),
            });
        }

        entry
            .get_or_insert_with(|| PlanEntry::new(key.path()))
            .remaining_args = true;
        self.has_args = true;
        Ok(())
    }
}

/// Read one option slot's metadata from `key`. `slot` is `"opt"`,
/// `"opt/#3"`, or similar; sub-annotations live under it (`{slot}/arg`,
/// `{slot}/flagvalue`, ...).
fn read_slot(key: &Key, slot: &str) -> Result<SlotData, SpecoptsError> {
    let has_arg = match key.meta_str(&format!("{slot}/arg")) {
        None | Some("required") => ArgMode::Required,
        Some("optional") => ArgMode::Optional,
        Some("none") => ArgMode::None,
        Some(other) => {
            return Err(SpecoptsError::InvalidArgMode {
                key: key.full_name(),
                value: other.to_string(),
            });
        }
    };

    let flag_value = match key.meta_str(&format!("{slot}/flagvalue")) {
        Some(value) => {
            if has_arg == ArgMode::Required {
                return Err(SpecoptsError::FlagValueNotAllowed {
                    key: key.full_name(),
                });
            }
            value.to_string()
        }
        None => "1".to_string(),
    };

    Ok(SlotData {
        // NUL can never be an option character.
        short: key
            .meta_raw(slot)
            .and_then(|s| s.chars().next())
            .filter(|c| *c != '\0'),
        long: key.meta_str(&format!("{slot}/long")).map(str::to_string),
        has_arg,
        flag_value,
        arg_name: key
            .meta_str(&format!("{slot}/arg/help"))
            .map(str::to_string),
        hidden: key.meta_str(&format!("{slot}/nohelp")) == Some("1"),
    })
}

/// Expand a metadata name into its slot names, following the array
/// convention: if the value of `name` is an index label `#n` and the
/// corresponding `{name}/#n` metadata exists, the slots are `{name}/#0`
/// through `{name}/#n`; otherwise `name` itself is the single slot.
fn meta_slots(key: &Key, name: &str) -> Vec<String> {
    let Some(value) = key.meta_raw(name) else {
        return Vec::new();
    };
    if let Some(last) = parse_array_index(value)
        && key.meta_raw(&format!("{name}/{value}")).is_some()
    {
        return (0..=last).map(|i| format!("{name}/#{i}")).collect();
    }
    vec![name.to_string()]
}
