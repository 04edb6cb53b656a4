// https://docs.oracle.com/javase/specs/jvms/se19/html/jvms-4.html

mod access_flags;
pub mod attributes;
#[macro_use]
pub mod constant_pool;
pub mod descriptor;
mod error;
mod method_table;
mod modified_utf8;
mod parser;
mod position;

use std::io::Read;

pub use access_flags::MethodAccessFlags;
pub use constant_pool::ConstantPool;
pub use descriptor::{format_signature, parse_method_descriptor, MethodDescriptor};
pub use error::{ClassFileError, ErrorKind};
pub use method_table::{MethodEntry, MethodPositions, MethodTable};
pub use parser::Parser;
pub use position::{SourcePosition, NO_POSITION};

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

/// Decodes a class file and maps every method signature to the position of
/// its code. Nothing is returned unless the whole file decodes.
pub fn extract_method_positions(bytes: &[u8]) -> Result<MethodPositions> {
    let table = MethodTable::parse(bytes)?;
    let positions = table.positions();
    log::debug!(
        "{} methods mapped to {} signatures",
        table.methods.len(),
        positions.len()
    );
    Ok(positions)
}

/// Like `extract_method_positions`, reading the class file from `r` first.
pub fn read_method_positions(mut r: impl Read) -> Result<MethodPositions> {
    let mut bytes = Vec::new();
    r.read_to_end(&mut bytes)?;
    extract_method_positions(&bytes)
}
