use clap::Parser;
use model_router::cli::{
    handle_completions, handle_config_init, handle_providers, handle_route, handle_validate, Cli,
    Commands, ConfigCommands,
};
use model_router::config::RouterConfig;

fn main() {
    let cli = Cli::parse();

    // Logging level and format only come from the environment here; the
    // commands read their own config file.
    let logging = RouterConfig::default().with_env_overrides().logging;
    if let Err(e) = model_router::logging::init_tracing(&logging) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let result = match cli.command {
        Commands::Providers(args) => handle_providers(&args).map(|output| println!("{}", output)),
        Commands::Validate(args) => handle_validate(&args).map(|output| println!("{}", output)),
        Commands::Route(args) => handle_route(&args).map(|output| println!("{}", output)),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => {
                handle_config_init(&args).map(|output| println!("{}", output))
            }
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
