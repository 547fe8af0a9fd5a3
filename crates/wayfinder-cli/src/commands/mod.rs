// Handlers for the CLI subcommands. main.rs parses arguments and dispatches
// to one of these.

pub mod directions;
pub mod fit;
pub mod landmarks;
