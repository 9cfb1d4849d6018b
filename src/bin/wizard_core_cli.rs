use std::process;

// Tracing is installed by the shell once settings (and their log filter) are loaded.
fn main() {
    if let Err(err) = wizard_core::cli::run_cli() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}
