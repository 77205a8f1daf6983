//! Tabular claims data: loading, cleaning, and the in-memory frame

mod clean;
mod frame;
mod loader;
mod value;

pub use clean::{clean, median, CleanOptions};
pub use frame::{Column, Dataset};
pub use loader::{load_claims, load_claims_from_reader, Delimiter, LoaderOptions};
pub use value::{ColumnType, Value};
