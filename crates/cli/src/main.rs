mod config_commands;
mod key_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "strongbox", about = "Strongbox: encryption under rotatable keys")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Key file to use (overrides discovery and STRONGBOX_KEYS).
    #[arg(long, global = true, env = "STRONGBOX_KEYS_FILE")]
    keys_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt stdin and print a base64 envelope.
    Encrypt {
        /// Key identifier.
        #[arg(short, long)]
        key: String,
        /// Associated data item; repeat in order.
        #[arg(long)]
        extra: Vec<String>,
    },
    /// Decrypt a base64 envelope from stdin.
    Decrypt {
        /// Key identifier.
        #[arg(short, long)]
        key: String,
        /// Associated data item; must match what was used to encrypt.
        #[arg(long)]
        extra: Vec<String>,
    },
    /// Key inspection.
    Keys {
        #[command(subcommand)]
        action: key_commands::KeysAction,
    },
    /// Key file validation.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
    /// Keep a key ring loaded and reload it whenever the key file changes.
    Watch,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout stays clean for ciphertext and plaintext.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "strongbox starting");

    let keys_file = cli.keys_file.as_deref();
    match cli.command {
        Commands::Encrypt { key, extra } => key_commands::encrypt(keys_file, &key, &extra),
        Commands::Decrypt { key, extra } => key_commands::decrypt(keys_file, &key, &extra),
        Commands::Keys { action } => key_commands::handle_keys(keys_file, action),
        Commands::Config { action } => config_commands::handle_config(keys_file, action),
        Commands::Watch => key_commands::watch(keys_file).await,
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_extra_keeps_order() {
        let cli = Cli::try_parse_from([
            "strongbox", "encrypt", "--key", "test", "--extra", "aa", "--extra", "bb",
        ])
        .unwrap();
        match cli.command {
            Commands::Encrypt { key, extra } => {
                assert_eq!(key, "test");
                assert_eq!(extra, ["aa", "bb"]);
            },
            _ => panic!("expected encrypt"),
        }
    }

    #[test]
    fn keys_file_is_global() {
        let cli = Cli::try_parse_from(["strongbox", "keys", "list", "--keys-file", "k.toml"])
            .unwrap();
        assert_eq!(cli.keys_file, Some(PathBuf::from("k.toml")));
    }
}
