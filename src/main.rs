//! vaultsync binary entry point.
//!
//! Thin wrapper: parse, dispatch, report.

fn main() {
    if let Err(e) = vaultsync::cli::run() {
        vaultsync::ui::output::error(format!("{:#}", e));
        std::process::exit(1);
    }
}
