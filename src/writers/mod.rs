pub mod atomic;
pub mod output;

pub use atomic::AtomicOutput;
pub use output::{csv_writer, finish_csv, OutputStream};
