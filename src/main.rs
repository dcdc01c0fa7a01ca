mod cli;
mod config;
mod error;
mod logging;
mod migrator;
mod schema;
mod store;

use cli::Cli;
use config::Config;
use log::{debug, error};

fn main() {
    let config = Config::load();

    // Logging is best effort; a failed logger must not block the migration.
    // Set RUST_LOG to override the configured level:
    // ERROR → WARN → INFO → DEBUG → TRACE
    let logger = match logging::init(&config.logging) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("Failed to start logger: {}", err);
            None
        }
    };
    debug!("Command-line args: {:?}", std::env::args_os().collect::<Vec<_>>());

    if let Err(err) = Cli::handle_command_line(&config) {
        error!("{:?}", err);
        eprintln!("{}", err);
        if let Some(handle) = &logger {
            handle.flush();
        }
        std::process::exit(1);
    }
}
