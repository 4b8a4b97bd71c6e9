use clap::{ArgMatches, CommandFactory, FromArgMatches, Parser, Subcommand};
use std::process;
use std::sync::Arc;
use tracewise::config::Config;
use tracewise::letters::ReferenceStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra reference letters (`letter,path,x,y` CSV), merged over the built-ins.
    #[arg(global = true, short, long)]
    letters: Option<String>,

    /// JSON config file; flags given on the command line still win.
    #[arg(global = true, short, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Replay(cmd::replay::ReplayArgs),
    Demo(cmd::demo::DemoArgs),
    Letters,
    Evaluate(cmd::evaluate::EvaluateArgs),
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// File config (if any) with explicit command-line flags layered on top.
fn resolve_config(cli: &Cli, flags: &Config, sub_matches: Option<&ArgMatches>) -> Config {
    let config = match &cli.config {
        Some(path) => {
            info!("⚖️  Loading config from: {}", path);
            let mut config = Config::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            });
            if let Some(m) = sub_matches {
                config.merge_from_cli(flags, m);
            }
            config
        }
        None => flags.clone(),
    };
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(1);
    }
    config
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    init_logging(cli.debug);
    info!("🚀 Initializing Tracewise...");

    let mut store = ReferenceStore::builtin();
    if let Some(path) = &cli.letters {
        match ReferenceStore::load_from_file(path) {
            Ok(extra) => store = store.merge(extra),
            Err(e) => {
                error!("{}", e);
                process::exit(1);
            }
        }
    }
    let store = Arc::new(store);

    let result = match &cli.command {
        Commands::Replay(args) => {
            let config = resolve_config(&cli, &args.config, matches.subcommand_matches("replay"));
            cmd::replay::run(args, config, store)
        }
        Commands::Demo(args) => {
            let config = resolve_config(&cli, &args.config, matches.subcommand_matches("demo"));
            cmd::demo::run(args, config, store)
        }
        Commands::Letters => {
            cmd::letters::run(&store);
            Ok(())
        }
        Commands::Evaluate(args) => cmd::evaluate::run(args, &store),
    };

    if let Err(e) = result {
        error!("❌ {}", e);
        process::exit(1);
    }
}
