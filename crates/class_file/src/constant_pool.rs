use std::convert::TryFrom;

use crate::{ClassFileError, Result};

#[macro_export]
macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index) {
            Ok($crate::constant_pool::CpInfo::$i(n)) => Ok(n),
            Ok(c) => Err($crate::ClassFileError::UnexpectedConstantPoolEntry {
                index: $index,
                expected: stringify!($i),
                found: c.tag(),
            }),
            Err(e) => Err(e),
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    FieldRef,
    MethodRef,
    InterfaceMethodRef,
    NameAndType,
    MethodHandle,
    MethodType,
    InvokeDynamic,
}
impl Tag {
    /// Number of constant pool slots taken by an entry with this tag.
    pub fn slot_size(self) -> usize {
        match self {
            Tag::Long | Tag::Double => 2,
            _ => 1,
        }
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Tag::Utf8),
            3 => Ok(Tag::Integer),
            4 => Ok(Tag::Float),
            5 => Ok(Tag::Long),
            6 => Ok(Tag::Double),
            7 => Ok(Tag::Class),
            8 => Ok(Tag::String),
            9 => Ok(Tag::FieldRef),
            10 => Ok(Tag::MethodRef),
            11 => Ok(Tag::InterfaceMethodRef),
            12 => Ok(Tag::NameAndType),
            15 => Ok(Tag::MethodHandle),
            16 => Ok(Tag::MethodType),
            18 => Ok(Tag::InvokeDynamic),
            _ => Err(value),
        }
    }
}

/// A 1-indexed constant pool. Slots whose entries are consumed but not
/// retained (`Class`, `FieldRef`, numeric constants, `InvokeDynamic`) stay
/// empty, and the slot after a `Long` or `Double` holds `CpInfo::Unusable`.
#[derive(Debug, Default)]
pub struct ConstantPool {
    cp_infos: Vec<Option<CpInfo>>,
}
impl ConstantPool {
    /// `cp_infos[0]` stands for the never-populated slot 0.
    pub fn new(cp_infos: Vec<Option<CpInfo>>) -> Self {
        Self { cp_infos }
    }

    /// The `constant_pool_count` this pool was read with.
    pub fn count(&self) -> u16 {
        self.cp_infos.len() as u16
    }

    pub fn get(&self, index: u16) -> Result<&CpInfo> {
        match self.cp_infos.get(index as usize) {
            None => Err(ClassFileError::ConstantPoolIndexOutOfBounds {
                index,
                count: self.count(),
            }),
            Some(None) => Err(ClassFileError::EmptyConstantPoolSlot(index)),
            Some(Some(CpInfo::Unusable)) => Err(ClassFileError::UnusableConstantPoolSlot(index)),
            Some(Some(cp_info)) => Ok(cp_info),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    pub fn string(&self, index: u16) -> Result<&str> {
        let string_index = *matches_cp_info!(self, index, String)?;
        self.utf8(string_index)
    }

    /// Resolves a `NameAndType` entry to its name and descriptor.
    pub fn name_and_type(&self, index: u16) -> Result<(&str, &str)> {
        let NameAndTypeInfo {
            name_index,
            descriptor_index,
        } = matches_cp_info!(self, index, NameAndType)?;

        Ok((self.utf8(*name_index)?, self.utf8(*descriptor_index)?))
    }

    pub fn method_type(&self, index: u16) -> Result<&str> {
        let MethodTypeInfo { descriptor_index } = matches_cp_info!(self, index, MethodType)?;
        self.utf8(*descriptor_index)
    }

    pub fn method_ref(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, MethodRef)
    }

    pub fn interface_method_ref(&self, index: u16) -> Result<&RefInfo> {
        matches_cp_info!(self, index, InterfaceMethodRef)
    }

    pub fn method_handle(&self, index: u16) -> Result<&MethodHandleInfo> {
        matches_cp_info!(self, index, MethodHandle)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    Utf8(String),
    MethodRef(RefInfo),
    InterfaceMethodRef(RefInfo),
    String(u16),
    NameAndType(NameAndTypeInfo),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Unusable,
}
impl CpInfo {
    /// The tag this entry was read from. `Unusable` reports the 8-byte
    /// constant that shadows it.
    pub fn tag(&self) -> Tag {
        match self {
            CpInfo::Utf8(_) => Tag::Utf8,
            CpInfo::MethodRef(_) => Tag::MethodRef,
            CpInfo::InterfaceMethodRef(_) => Tag::InterfaceMethodRef,
            CpInfo::String(_) => Tag::String,
            CpInfo::NameAndType(_) => Tag::NameAndType,
            CpInfo::MethodHandle(_) => Tag::MethodHandle,
            CpInfo::MethodType(_) => Tag::MethodType,
            CpInfo::Unusable => Tag::Long,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}
