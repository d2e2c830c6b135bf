pub mod command;
pub mod locator;
pub mod progress;
pub mod runner;

pub use command::ExtractionCommand;
pub use locator::{probe_processor, FixedPathLocator, ProcessorLocator, SearchPathLocator};
pub use progress::{NullProgressSink, ProgressEvent, ProgressParser, ProgressSink, RecordingProgressSink};
pub use runner::{ProcessRunner, RunOutcome};
