pub mod input;
pub mod long_reader;

pub use input::{open_csv, open_input};
pub use long_reader::LongReader;
