use crate::error::{ExtractorError, UserFriendlyError};
use crate::extractor::{ExtractionPlan, ProcessResult};
use crate::processor::ExtractionCommand;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static MUSIC: Emoji = Emoji("🎵 ", "> ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => eprintln!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", MUSIC, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &ExtractorError) {
        let user_message = error.user_message();

        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "error",
                    "kind": error_kind(error),
                    "exit_code": error.exit_code(),
                    "message": user_message,
                    "suggestion": error.suggestion(),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                }));
            }
            _ => {
                self.error(&user_message);

                if let Some(suggestion) = error.suggestion() {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
            }
        }
    }

    /// What is about to happen: input, output, format and quality.
    pub fn print_extraction_plan(&self, plan: &ExtractionPlan) {
        if self.quiet {
            return;
        }

        let quality = describe_quality(plan);

        match self.mode {
            OutputMode::Human => {
                println!("Input file:    {}", plan.input.display());
                println!("Input size:    {}", format_bytes(plan.input_size));
                println!("Output file:   {}", plan.output.display());
                println!("Audio format:  {}", plan.format.as_str().to_uppercase());
                println!("Audio quality: {}", quality);
                self.print_separator();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "plan",
                    "input": plan.input.display().to_string(),
                    "input_size": plan.input_size,
                    "output": plan.output.display().to_string(),
                    "output_derived": plan.output_derived,
                    "format": plan.format.as_str(),
                    "codec": plan.format.codec(),
                    "quality": plan.quality,
                    "bitrate": plan.bitrate(),
                }));
            }
            OutputMode::Plain => {
                println!("INPUT: {}", plan.input.display());
                println!("INPUT_SIZE: {}", plan.input_size);
                println!("OUTPUT: {}", plan.output.display());
                println!("FORMAT: {}", plan.format);
                println!("QUALITY: {}", quality);
            }
        }
    }

    pub fn print_command(&self, command: &ExtractionCommand) {
        match self.mode {
            OutputMode::Json => {
                let args: Vec<String> = command
                    .args()
                    .iter()
                    .map(|a| a.to_string_lossy().to_string())
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "command",
                    "program": command.program().display().to_string(),
                    "args": args,
                }));
            }
            OutputMode::Plain => println!("COMMAND: {}", command.display_line()),
            OutputMode::Human => println!("Command:       {}", command.display_line()),
        }
    }

    // Summary and reporting
    pub fn print_extraction_summary(&self, result: &ProcessResult) {
        match self.mode {
            OutputMode::Human => self.print_human_summary(result),
            OutputMode::Json => self.print_json_summary(result),
            OutputMode::Plain => self.print_plain_summary(result),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(50)).dim());
                } else {
                    println!("{}", "-".repeat(50));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(50));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error | MessageType::Warning => {
                    eprintln!("{}{}", emoji, color_fn(message))
                }
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error | MessageType::Warning => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, result: &ProcessResult) {
        if self.quiet {
            println!("{}", result.output_path.display());
            return;
        }

        println!();
        self.print_separator();

        if self.use_colors {
            println!(
                "{}{}",
                CHECKMARK,
                style("Audio extraction completed successfully!").green().bold()
            );
        } else {
            println!("✓ Audio extraction completed successfully!");
        }

        println!("  Output file: {}", result.output_path.display());
        if let Some(size) = result.output_size {
            println!("  Output size: {}", format_bytes(size));
        }
        println!("  Time taken:  {}", format_duration(result.elapsed));

        self.print_separator();
    }

    fn print_json_summary(&self, result: &ProcessResult) {
        let summary = serde_json::json!({
            "type": "summary",
            "success": result.success,
            "exit_code": result.exit_code,
            "output": result.output_path.display().to_string(),
            "output_size": result.output_size,
            "duration_ms": result.elapsed.as_millis() as u64,
            "progress_updates": result.progress_updates,
            "processor": result.processor_version,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        self.print_json_object(&summary);
    }

    fn print_plain_summary(&self, result: &ProcessResult) {
        println!("SUCCESS: Extracted audio to {}", result.output_path.display());
        if let Some(size) = result.output_size {
            println!("OUTPUT_SIZE: {}", size);
        }
        println!("DURATION_MS: {}", result.elapsed.as_millis());
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn describe_quality(plan: &ExtractionPlan) -> String {
    match plan.bitrate() {
        Some(bitrate) => bitrate.to_string(),
        None => format!("lossless ({} ignored)", plan.quality),
    }
}

fn error_kind(error: &ExtractorError) -> &'static str {
    match error {
        ExtractorError::InputNotFound { .. } => "input_not_found",
        ExtractorError::UnsupportedFormat { .. } => "unsupported_format",
        ExtractorError::ProcessorNotFound { .. } => "processor_not_found",
        ExtractorError::OutputPathInvalid { .. } => "output_path_invalid",
        ExtractorError::ExternalProcessor { .. } => "external_processor_error",
        ExtractorError::Interrupted => "interrupted",
        ExtractorError::Io(_) => "io",
        ExtractorError::Config { .. } => "config",
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.2} {}", size, UNITS[unit_index])
    }
}
