use thiserror::Error;

use crate::constant_pool::Tag;

#[derive(Error, Debug)]
pub enum ClassFileError {
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    #[error("Invalid magic identifier: 0x{0:X}")]
    InvalidMagicIdentifier(u32),
    #[error("Invalid cp info tag {tag} at constant pool index {index}")]
    InvalidCpInfoTag { tag: u8, index: u16 },
    #[error("Constant pool index {index} is out of bounds (constant_pool_count is {count})")]
    ConstantPoolIndexOutOfBounds { index: u16, count: u16 },
    #[error("Constant pool index {0} is not populated")]
    EmptyConstantPoolSlot(u16),
    #[error("Constant pool index {0} is unusable, it follows an 8-byte constant")]
    UnusableConstantPoolSlot(u16),
    #[error("Expected {expected} at constant pool index {index}, found {found:?}")]
    UnexpectedConstantPoolEntry {
        index: u16,
        expected: &'static str,
        found: Tag,
    },
    #[error("Malformed modified UTF-8 at byte {offset} of constant pool entry {index}")]
    InvalidModifiedUtf8 { index: u16, offset: usize },
    #[error("Unbalanced parentheses in method descriptor {0:?}")]
    UnbalancedMethodDescriptor(String),
    #[error("Missing ';' after object type in descriptor {0:?}")]
    UnterminatedObjectType(String),
    #[error("void used outside of return type position in descriptor {0:?}")]
    VoidParameter(String),
    #[error("Invalid type character {character:?} in descriptor {descriptor:?}")]
    InvalidTypeCharacter { character: char, descriptor: String },
    #[error("Missing type in descriptor {0:?}")]
    IncompleteType(String),
    #[error("Trailing characters after return type in descriptor {0:?}")]
    TrailingCharacters(String),
    #[error("Unexpected end of class file at offset {offset}: {needed} bytes needed, {remaining} remaining")]
    Truncated {
        offset: u64,
        needed: u64,
        remaining: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a well-formed class file.
    Format,
    /// The input ends before a declared length or count is satisfied.
    Truncation,
    /// The underlying reader failed before decoding started.
    Io,
}

impl ClassFileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassFileError::IOError(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                ErrorKind::Truncation
            }
            ClassFileError::IOError(_) => ErrorKind::Io,
            ClassFileError::Truncated { .. } => ErrorKind::Truncation,
            _ => ErrorKind::Format,
        }
    }

    pub fn is_format(&self) -> bool {
        self.kind() == ErrorKind::Format
    }

    pub fn is_truncation(&self) -> bool {
        self.kind() == ErrorKind::Truncation
    }
}
