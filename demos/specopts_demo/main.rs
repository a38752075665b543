//! # specopts demo application
//!
//! A sample CLI tool that showcases how to drive
//! [specopts](https://docs.rs/specopts) from a real `main`. This is **not**
//! a real app — it exists purely to demonstrate and manually verify the
//! resolver's features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example specopts_demo -- -v --out report.txt a b c
//! cargo run --example specopts_demo -- --help
//! GREP_COLORS=ms=01:mc=01 cargo run --example specopts_demo
//! ```
//!
//! | Feature            | How to exercise it                                  |
//! |--------------------|-----------------------------------------------------|
//! | Flag option        | `-v` / `--verbose`                                  |
//! | Option argument    | `--out report.txt`, `-o report.txt`, `-oreport.txt` |
//! | Repeated option    | `-i one -i two`                                     |
//! | Optional argument  | `--color` vs `--color=always`                       |
//! | PATH-style env var | `GREP_COLORS=a:b:c`                                 |
//! | Remaining args     | anything after the options, or after `--`           |
//! | Help               | `-h` / `--help`                                     |

use std::process::ExitCode;

use specopts::{Key, Namespace, Outcome, help_message, resolve, spec_from_toml};

const SPEC: &str = r#"
["verbose"]
opt = "v"
"opt/long" = "verbose"
"opt/arg" = "none"
description = "explain what is being done"

["out"]
opt = "o"
"opt/long" = "out"
"opt/arg/help" = "FILE"
description = "write the report to FILE"

["color"]
"opt/long" = "color"
"opt/arg" = "optional"
"opt/flagvalue" = "always"
"opt/arg/help" = "WHEN"
description = "colorize the output"

["items/#"]
opt = "i"
"opt/long" = "item"
description = "an item to process (repeatable)"

["palette/#"]
env = "GREP_COLORS"
description = "color palette, PATH-style"

["files/#"]
args = "remaining"
description = "input files"
"#;

fn main() -> ExitCode {
    let argv: Vec<String> = std::env::args().collect();
    let envp: Vec<String> = std::env::vars()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();

    let mut tree = match spec_from_toml(SPEC) {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("spec error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut error_key = Key::new(Namespace::Cascading, "");
    error_key.set_meta("help/prefix", "\nA specopts showcase.\n");

    match resolve(&mut tree, &argv, &envp, &mut error_key) {
        Ok(Outcome::HelpRequested) => {
            if let Some(message) = help_message(&error_key) {
                print!("{message}");
            }
            ExitCode::SUCCESS
        }
        Ok(Outcome::Resolved) => {
            for key in tree.iter().filter(|k| k.namespace() == Namespace::Proc) {
                println!("{} = {:?}", key.full_name(), key.value());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
