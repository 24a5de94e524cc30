use clap::Parser;
use lockstep::cli::{check, inspect, replay, CheckCommand, Cli, Commands};

fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Replay(args) => replay::execute(args),
        Commands::Inspect(args) => inspect::execute(args),
        Commands::Check(check_command) => match check_command {
            CheckCommand::Config(args) => check::execute_config(&args.config),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
