use audio_extractor::{
    AudioExtractor, Cli, ExtractorError, OutputFormatter, OutputMode, UserFriendlyError,
};
use clap::Parser;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();
    setup_logging(cli.verbosity_level());
    tracing::debug!("{}", audio_extractor::build_info());

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let extractor = match AudioExtractor::from_cli(&cli) {
        Ok(extractor) => extractor,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    let request = match cli.to_request(extractor.config()) {
        Ok(request) => request,
        Err(e) => {
            extractor.handle_error(&e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&extractor, &request);
    }

    match extractor.extract(&request).await {
        Ok(result) => {
            extractor.output_formatter().print_extraction_summary(&result);
            0
        }
        Err(e) => {
            extractor.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "audio-extractor.toml".to_string());

    match AudioExtractor::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  audio-extractor <input> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(extractor: &AudioExtractor, request: &audio_extractor::ExtractionRequest) -> i32 {
    let formatter = extractor.output_formatter();

    formatter.info("DRY RUN MODE - ffmpeg will not be started");
    formatter.print_separator();

    match request.plan() {
        Ok(plan) => formatter.print_extraction_plan(&plan),
        Err(e) => {
            extractor.handle_error(&e);
            return e.exit_code();
        }
    }

    match extractor.dry_run(request) {
        Ok(command) => {
            formatter.print_command(&command);
            formatter.print_separator();
            formatter.success("Dry run completed successfully");
            formatter.info("Run without --dry-run to perform the extraction");
            0
        }
        Err(e) => {
            extractor.handle_error(&e);
            e.exit_code()
        }
    }
}

fn print_startup_error(error: &ExtractorError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `-v` level.
fn setup_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "audio_extractor=warn",
        1 => "audio_extractor=info",
        _ => "audio_extractor=debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
