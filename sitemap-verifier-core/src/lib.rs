pub mod error;
pub mod report;
pub mod verify;

pub use error::VerifyError;
pub use report::{ReportSummary, generate_summary, output_filename, output_path, save_json_report};
pub use verify::{VerifyOptions, execute_verification};
