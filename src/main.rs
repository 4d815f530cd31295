use rag_optimizer::cli::commands::{CliArgs, Commands};
use rag_optimizer::cli::handlers::{handle_config, handle_health, handle_report, handle_run};
use rag_optimizer::util::logging::{init_logging, parse_level, LoggingConfig};
use rag_optimizer::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("rag-optimizer v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let api_url = args.api_url.as_deref();
    let exit_code = match &args.command {
        Commands::Run(run_args) => handle_run(run_args, api_url, args.quiet).await,
        Commands::Health(health_args) => handle_health(health_args, api_url).await,
        Commands::Report(report_args) => handle_report(report_args),
        Commands::Config(config_args) => handle_config(config_args, api_url),
    };

    std::process::exit(exit_code);
}

/// Command-line flags win over `RAG_OPTIMIZER_LOG_LEVEL`
fn init_logging_from_args(args: &CliArgs) {
    let mut config = LoggingConfig::from_env();

    if let Some(level_str) = &args.log_level {
        config.level = parse_level(level_str);
    } else if args.verbose {
        config.level = Level::DEBUG;
    } else if args.quiet {
        config.level = Level::ERROR;
    }

    init_logging(config);
}
