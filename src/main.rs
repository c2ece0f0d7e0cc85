use tracing::{error, info};

use snailmail::{Config, Context, InMemory};

fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = snailmail::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        snailmail::logging::init_console_only(&config.logging.level);
    }

    info!("Snail Mail datastore");
    info!(
        "Credential storage: {}",
        config.datastore.credential_storage
    );

    let store = InMemory::from_config(&config.datastore);
    match store.stats(&Context::new()) {
        Ok(stats) => info!(
            users = stats.users,
            mail = stats.mail,
            mailboxes = stats.mailboxes,
            "Datastore ready"
        ),
        Err(e) => error!("Failed to read datastore stats: {e}"),
    }
}
