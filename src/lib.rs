pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod format;
pub mod processor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, DefaultsConfig, ProcessorConfig};
pub use error::{ExtractorError, Result, UserFriendlyError};
pub use format::AudioFormat;

// Core functionality re-exports
pub use extractor::{ExtractionPlan, ExtractionRequest, ProcessResult};
pub use processor::{
    ExtractionCommand, FixedPathLocator, NullProgressSink, ProcessRunner, ProcessorLocator,
    ProgressEvent, ProgressSink, RecordingProgressSink, SearchPathLocator,
};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager, TerminalProgressSink};

use std::path::{Path, PathBuf};
use std::time::Instant;

/// Main library interface for audio extraction
pub struct AudioExtractor {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    locator: Box<dyn ProcessorLocator>,
}

impl AudioExtractor {
    /// Create a new instance and install the Ctrl+C handler
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Create an instance without registering a signal handler
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(
            config,
            output_mode,
            verbose,
            quiet,
            GracefulShutdown::new_for_test(),
        )
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet);
        let locator = Self::locator_for(&config);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
            locator,
        }
    }

    /// Replace the processor lookup strategy
    pub fn with_locator(mut self, locator: Box<dyn ProcessorLocator>) -> Self {
        self.locator = locator;
        self
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbose, cli_args.quiet)
    }

    /// An explicit `processor.path` wins over the PATH search.
    pub fn locator_for(config: &Config) -> Box<dyn ProcessorLocator> {
        match config.processor.path {
            Some(ref path) => Box::new(FixedPathLocator::new(path)),
            None => Box::new(SearchPathLocator::new()),
        }
    }

    /// Find ffmpeg and confirm it runs. Returns its path and version banner.
    pub async fn locate_processor(&self) -> Result<(PathBuf, String)> {
        let program = self.locator.locate()?;
        let version = processor::probe_processor(&program).await?;
        tracing::debug!("Using {} ({})", program.display(), version);
        Ok((program, version))
    }

    pub fn build_command(&self, plan: &ExtractionPlan, program: &Path) -> ExtractionCommand {
        ExtractionCommand::new(program, &plan.input, &plan.output, plan.format)
            .with_quality(plan.quality.clone())
            .with_compression_level(self.config.processor.compression_level)
            .with_stats(plan.show_progress)
    }

    /// Extract audio, rendering progress on the terminal
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ProcessResult> {
        let mut sink = TerminalProgressSink::new(&self.progress_manager);
        self.extract_with_sink(request, &mut sink).await
    }

    /// Extract audio, reporting progress to `sink` when the request asks for it
    pub async fn extract_with_sink(
        &self,
        request: &ExtractionRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<ProcessResult> {
        let start_time = Instant::now();
        self.shutdown.check_shutdown()?;

        // Step 1: Validate input and resolve the output path
        let plan = request.plan()?;
        self.output_formatter.print_extraction_plan(&plan);
        self.warn_if_overwriting(&plan);

        // Step 2: Find a working ffmpeg
        let (program, version) = self.locate_processor().await?;
        self.output_formatter.debug(&format!("Using {}", version));

        // Step 3: Run it
        let command = self.build_command(&plan, &program);
        self.output_formatter
            .debug(&format!("Command: {}", command.display_line()));
        self.output_formatter.start_operation("Extracting audio");

        let mut silent = NullProgressSink;
        let sink: &mut dyn ProgressSink = if plan.show_progress {
            sink
        } else {
            &mut silent
        };

        let outcome = ProcessRunner::new(&self.shutdown).run(&command, sink).await?;

        if !outcome.success {
            return Err(ExtractorError::ExternalProcessor {
                code: outcome.exit_code,
                diagnostics: outcome.diagnostics,
                output: plan.output,
            });
        }

        tracing::info!("Extracted audio to {}", plan.output.display());
        Ok(ProcessResult::from_outcome(
            outcome,
            plan.output,
            start_time.elapsed(),
            version,
        ))
    }

    /// Resolve everything an extraction would use without starting ffmpeg.
    pub fn dry_run(&self, request: &ExtractionRequest) -> Result<ExtractionCommand> {
        let plan = request.plan()?;
        self.warn_if_overwriting(&plan);
        let program = self.locator.locate()?;
        Ok(self.build_command(&plan, &program))
    }

    fn warn_if_overwriting(&self, plan: &ExtractionPlan) {
        if plan.output.exists() {
            self.output_formatter.warning(&format!(
                "{} already exists and will be overwritten",
                plan.output.display()
            ));
        }
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &ExtractorError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get build information
pub fn build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown"),
        build_date: option_env!("BUILD_DATE").unwrap_or("unknown"),
        target: std::env::consts::ARCH.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_date: &'static str,
    pub target: String,
}

impl std::fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "audio-extractor {} ({}) built on {} for {}",
            self.version, self.git_hash, self.build_date, self.target
        )
    }
}
