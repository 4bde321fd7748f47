pub mod aggregation;
pub mod bucket;
pub mod records;
pub mod schema;

pub use aggregation::{Aggregation, CombinedKey};
pub use bucket::YearBucket;
pub use records::LongRecord;
pub use schema::{ColumnRole, LongHeader, SelectedColumn, WideSchema};
