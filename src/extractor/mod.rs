pub mod report;
pub mod request;

pub use report::ProcessResult;
pub use request::{derive_output_path, validate_input, ExtractionPlan, ExtractionRequest};
