use clap::Parser;
use teleview::cli::{Cli, Commands};
use teleview::config::Config;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("teleview=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run {
        duration: None,
        json: false,
    }) {
        Commands::Run { duration, json } => {
            let config = Config::load(cli.config.as_deref())?;
            tracing::info!("Starting teleview");
            teleview::commands::run(&config, duration, json)
        }
        Commands::InitConfig { path, force } => {
            teleview::commands::init_config(path.or_else(Config::platform_path), force)
        }
        Commands::ShowConfig => {
            let config = Config::load(cli.config.as_deref())?;
            teleview::commands::show_config(&config)
        }
    }
}
