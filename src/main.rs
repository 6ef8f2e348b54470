//! nebula-repository CLI entry point
//!
//! `main` only parses arguments and dispatches to a CLI command; it
//! never touches a subsystem directly.

use std::process;

use nebula_repository::cli::{run_command, Cli};

fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run_command(cli.command) {
        // Print error JSON and exit non-zero
        let error_json = serde_json::json!({
            "status": "error",
            "code": e.code_str(),
            "message": e.message()
        });
        
        eprintln!("{}", error_json);
        process::exit(1);
    }
}
