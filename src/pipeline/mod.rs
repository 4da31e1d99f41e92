pub mod batch;
pub mod convert;

pub use batch::{output_path_for, run_batch};
pub use convert::{ConversionRequest, ConversionResult, Outcome, run_conversion};
