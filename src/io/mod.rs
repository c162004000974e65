//! Input and output formats

pub mod nelist;
pub mod table;

pub use nelist::{open_source, GraphSource, NelReader, ReadMode, SupportInfo};
pub use table::{Delim, TableReader, TableWriter};
