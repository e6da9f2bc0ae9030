//! kwest CLI: inspect and reset persisted state from a terminal.
//!
//! ```text
//! kwest show                    # committed state of the default store
//! kwest --key drafts hello Hi   # dispatch HELLO_WORLD to another store
//! kwest dispatch 0 '"Hi"'       # raw dispatch by action code
//! kwest clear-state             # wipe the namespace
//! ```

mod commands;
mod session;

use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use kwest_core::{Error, RawAction, ACTION_TYPES};
use kwest_engine::{KwestConfig, CONFIG_FILE_NAME, HELLO_WORLD_MESSAGE};

use commands::build_cli;
use session::Session;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let dir = matches
        .get_one::<String>("dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".kwest"));
    let config_path = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.join(CONFIG_FILE_NAME));

    let Some((name, sub)) = matches.subcommand() else {
        eprintln!("no command given");
        process::exit(2);
    };

    if name == "init" {
        exit_on_error(init(&dir, &config_path));
        return;
    }

    let config = if config_path.exists() {
        exit_on_error(KwestConfig::from_file(&config_path))
    } else {
        KwestConfig::default()
    };
    let local_key = matches
        .get_one::<String>("key")
        .cloned()
        .unwrap_or_else(|| config.local_key.clone());
    tracing::debug!(
        target: "kwest::cli",
        command = name,
        dir = %dir.display(),
        local_key = %local_key,
        "Running command"
    );
    let session = Session::new(dir, config, local_key);

    let result = match name {
        "show" => session.show(),
        "hello" => {
            let message = sub
                .get_one::<String>("message")
                .cloned()
                .unwrap_or_else(|| HELLO_WORLD_MESSAGE.to_string());
            session.hello(message)
        }
        "dispatch" => {
            let code = sub.get_one::<i64>("code").copied().unwrap_or_default();
            let payload = match sub.get_one::<String>("payload") {
                Some(text) => exit_on_error(
                    serde_json::from_str(text)
                        .map_err(|e| format!("payload is not valid JSON: {}", e)),
                ),
                None => serde_json::Value::Null,
            };
            session.dispatch(RawAction::new(code, payload))
        }
        "keys" => session.keys(),
        "actions" => {
            for (name, code) in ACTION_TYPES.iter() {
                println!("{}\t{}", code, name);
            }
            Ok(())
        }
        "clear-state" => session.clear_state(),
        "clear-cache" => session.clear_cache(),
        other => unreachable!("clap rejects unknown subcommand '{}'", other),
    };
    if let Err(e) = result {
        eprintln!("{}", format_error(&e));
        process::exit(1);
    }
}

fn format_error(err: &Error) -> String {
    format!("(error) {}", err)
}

fn init(dir: &std::path::Path, config_path: &std::path::Path) -> kwest_core::Result<()> {
    std::fs::create_dir_all(dir)?;
    KwestConfig::write_default_if_missing(config_path)?;
    println!("{}", config_path.display());
    Ok(())
}

fn exit_on_error<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("(error) {}", e);
            process::exit(1);
        }
    }
}
