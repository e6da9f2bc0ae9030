//! Clap command tree definition.

use clap::{Arg, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("kwest")
        .about("Inspect and reset kwest persisted state")
        .subcommand_required(true)
        .arg(
            Arg::new("dir")
                .long("dir")
                .help("Data directory (default: .kwest)")
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("Config file (default: <dir>/kwest.toml)")
                .global(true),
        )
        .arg(
            Arg::new("key")
                .long("key")
                .help("Local key of the store (default from config)")
                .global(true),
        )
        .subcommand(Command::new("show").about("Print the committed state as JSON"))
        .subcommand(
            Command::new("hello")
                .about("Dispatch HELLO_WORLD")
                .arg(Arg::new("message").help("Message to show (default: Hello World!)")),
        )
        .subcommand(
            Command::new("dispatch")
                .about("Dispatch a raw action by integer code")
                .arg(
                    Arg::new("code")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(clap::value_parser!(i64))
                        .help("Action code"),
                )
                .arg(Arg::new("payload").help("Payload as JSON (default: null)")),
        )
        .subcommand(Command::new("keys").about("List stores persisted in the namespace"))
        .subcommand(Command::new("actions").about("List registered action codes"))
        .subcommand(Command::new("clear-state").about("Delete every key in the namespace"))
        .subcommand(Command::new("clear-cache").about("Delete every named cache"))
        .subcommand(Command::new("init").about("Write a default kwest.toml if missing"))
}
