use clap::Parser;
use envlock::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = std::env::var("ENVLOCK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Init => envlock::cli::commands::init::execute(&cli),
        Commands::Add {
            key,
            value,
            env,
            description,
            tags,
        } => envlock::cli::commands::add::execute(&cli, key, value.as_deref(), env, description.as_deref(), tags),
        Commands::Get { key, env } => envlock::cli::commands::get::execute(&cli, key, env),
        Commands::List { env } => envlock::cli::commands::list::execute(&cli, env.as_deref()),
        Commands::Update {
            key,
            value,
            env,
            description,
        } => envlock::cli::commands::update::execute(&cli, key, value.as_deref(), env, description.as_deref()),
        Commands::Delete { key, env, force } => {
            envlock::cli::commands::delete::execute(&cli, key, env.as_deref(), *force)
        }
        Commands::Rotate { key, value, exclude } => {
            envlock::cli::commands::rotate::execute(&cli, key, value.as_deref(), exclude)
        }
        Commands::Lock => envlock::cli::commands::lock::execute(&cli),
        Commands::Unlock => envlock::cli::commands::unlock::execute(&cli),
        Commands::ChangePassword => envlock::cli::commands::change_password::execute(&cli),
        Commands::Sync { env } => envlock::cli::commands::sync::execute(&cli, env),
        Commands::Run { env, command } => envlock::cli::commands::run::execute(&cli, env, command),
        Commands::Audit { key, last } => envlock::cli::commands::audit::execute(&cli, key.as_deref(), *last),
        Commands::Health => envlock::cli::commands::health::execute(&cli),
        Commands::Backup { output, encrypt } => {
            envlock::cli::commands::backup::execute(&cli, output.as_deref(), *encrypt)
        }
        Commands::Restore { file, encrypted } => {
            envlock::cli::commands::restore::execute(&cli, file, *encrypted)
        }
        Commands::Export { output } => envlock::cli::commands::export::execute(&cli, output),
        Commands::Import { file } => envlock::cli::commands::import::execute(&cli, file),
        Commands::Project { action } => envlock::cli::commands::project::execute(&cli, action),
    };

    if let Err(e) = result {
        envlock::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
