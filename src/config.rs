// ABOUTME: Crate-wide constants for the CLI and REPL banner

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_BANNER: &str = "plox";

pub const HISTORY_FILE: &str = ".plox_history";
