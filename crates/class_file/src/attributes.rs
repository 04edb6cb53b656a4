//! Names of the attributes the decoder interprets. Every other attribute is
//! skipped by its declared length.

pub const CODE: &str = "Code";
pub const LINE_NUMBER_TABLE: &str = "LineNumberTable";

/// Size of one `exception_table` entry of a `Code` attribute: `start_pc`,
/// `end_pc`, `handler_pc` and `catch_type`.
pub const EXCEPTION_TABLE_ENTRY_SIZE: u64 = 8;

/// Size of one `line_number_table` entry: `start_pc` and `line_number`.
pub const LINE_NUMBER_TABLE_ENTRY_SIZE: u64 = 4;
