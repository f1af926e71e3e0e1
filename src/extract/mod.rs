//! Text-level extraction: from yearbook page text to station records.

pub mod assembler;
pub mod coordinates;
pub mod csv_codec;
pub mod fields;
pub mod locator;
pub mod monthly;
pub mod numeric;

pub use assembler::{
    year_from_file_name, RecordAssembler, StationPageParser, YearbookExtraction,
    DEFAULT_HEADER_WINDOW,
};
pub use csv_codec::{read_records, to_csv_string, write_records};
