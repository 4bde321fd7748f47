pub mod constants;
pub mod filename;
pub mod format;
pub mod progress;

pub use constants::*;
pub use filename::{combined_filename, is_gzip_path, parse_part_filename, temp_path_for, PartName};
pub use format::{format_float, parse_float};
pub use progress::ProgressReporter;
