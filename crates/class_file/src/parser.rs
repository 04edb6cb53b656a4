use std::{convert::TryFrom, io::Cursor};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    access_flags::MethodAccessFlags,
    attributes::{self, EXCEPTION_TABLE_ENTRY_SIZE, LINE_NUMBER_TABLE_ENTRY_SIZE},
    constant_pool::{CpInfo, MethodHandleInfo, MethodTypeInfo, NameAndTypeInfo, RefInfo, Tag},
    descriptor, modified_utf8,
    method_table::{MethodEntry, MethodTable},
    position::{SourcePosition, NO_POSITION},
    ClassFileError, ConstantPool, Result,
};

type Endian = BigEndian;

const MAGIC_IDENTIFIER: u32 = 0xCAFEBABE;

/// A single forward pass over the bytes of a class file.
pub struct Parser<'a> {
    r: Cursor<&'a [u8]>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(buf),
        }
    }

    pub fn parse(mut self) -> Result<MethodTable> {
        self.parse_magic_identifier()?;
        let _version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        log::debug!(
            "read constant pool with constant_pool_count {}",
            constant_pool.count()
        );

        let _access_flags = self.read_u16()?;
        let _this_class = self.read_u16()?;
        let _super_class = self.read_u16()?;
        self.skip_interfaces()?;

        let fields_count = self.read_u16()?;
        for _ in 0..fields_count {
            self.skip_field_info()?;
        }

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|order| self.parse_method_info(order, &constant_pool))
            .collect::<Result<Vec<_>>>()?;

        let attributes_count = self.read_u16()?;
        for _ in 0..attributes_count {
            let name = constant_pool.utf8(self.read_u16()?)?;
            log::trace!("skipping class attribute {}", name);
            self.skip_attribute()?;
        }

        log::debug!(
            "read {} fields and {} methods, stopped at offset {} of {}",
            fields_count,
            methods.len(),
            self.r.position(),
            self.r.get_ref().len()
        );

        Ok(MethodTable { methods })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC_IDENTIFIER => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?.max(1) as usize;
        // Every entry starts with a tag byte.
        self.ensure_remaining(constant_pool_count as u64 - 1)?;

        let mut cp_infos = Vec::with_capacity(constant_pool_count);
        cp_infos.push(None);
        while cp_infos.len() < constant_pool_count {
            let index = cp_infos.len() as u16;
            let tag = self.read_u8()?;
            let tag =
                Tag::try_from(tag).map_err(|tag| ClassFileError::InvalidCpInfoTag { tag, index })?;

            cp_infos.push(self.parse_cp_info(tag, index)?);
            if tag.slot_size() == 2 && cp_infos.len() < constant_pool_count {
                cp_infos.push(Some(CpInfo::Unusable));
            }
        }

        Ok(ConstantPool::new(cp_infos))
    }

    /// Reads the payload of one entry. Entries the decoder never looks up
    /// are consumed and yield `None`.
    fn parse_cp_info(&mut self, tag: Tag, index: u16) -> Result<Option<CpInfo>> {
        let cp_info = match tag {
            Tag::Utf8 => self.parse_utf8(index)?,
            Tag::MethodRef => CpInfo::MethodRef(self.parse_ref_info()?),
            Tag::InterfaceMethodRef => CpInfo::InterfaceMethodRef(self.parse_ref_info()?),
            Tag::String => CpInfo::String(self.read_u16()?),
            Tag::NameAndType => self.parse_name_and_type_info()?,
            Tag::MethodHandle => self.parse_method_handle()?,
            Tag::MethodType => CpInfo::MethodType(MethodTypeInfo {
                descriptor_index: self.read_u16()?,
            }),
            // name_index
            Tag::Class => return self.skip(2).map(|_| None),
            // class_index, name_and_type_index
            Tag::FieldRef => return self.skip(4).map(|_| None),
            // bytes
            Tag::Integer | Tag::Float => return self.skip(4).map(|_| None),
            // high_bytes, low_bytes
            Tag::Long | Tag::Double => return self.skip(8).map(|_| None),
            // bootstrap_method_attr_index, name_and_type_index
            Tag::InvokeDynamic => return self.skip(4).map(|_| None),
        };

        Ok(Some(cp_info))
    }

    fn parse_utf8(&mut self, index: u16) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let bytes = self.read_bytes(length as u64)?;
        let s = modified_utf8::decode(bytes)
            .map_err(|offset| ClassFileError::InvalidModifiedUtf8 { index, offset })?;

        Ok(CpInfo::Utf8(s))
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_ref_info(&mut self) -> Result<RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn skip_interfaces(&mut self) -> Result<()> {
        let interfaces_count = self.read_u16()?;
        self.skip(interfaces_count as u64 * 2)
    }

    fn skip_field_info(&mut self) -> Result<()> {
        let _access_flags = self.read_u16()?;
        let _name_index = self.read_u16()?;
        let _descriptor_index = self.read_u16()?;
        let attributes_count = self.read_u16()?;
        for _ in 0..attributes_count {
            let _attribute_name_index = self.read_u16()?;
            self.skip_attribute()?;
        }
        Ok(())
    }

    fn parse_method_info(
        &mut self,
        order: u16,
        constant_pool: &ConstantPool,
    ) -> Result<MethodEntry> {
        let access_flags = MethodAccessFlags::from_bits_truncate(self.read_u16()?);
        let name = constant_pool.utf8(self.read_u16()?)?;
        let descriptor = constant_pool.utf8(self.read_u16()?)?;
        let signature = descriptor::parse_method_descriptor(name, descriptor)?;

        let mut position = NO_POSITION;
        let attributes_count = self.read_u16()?;
        for _ in 0..attributes_count {
            match constant_pool.utf8(self.read_u16()?)? {
                attributes::CODE => {
                    position = self.parse_code_attribute(order as i32, constant_pool)?
                }
                name => {
                    log::trace!("skipping method attribute {} of {}", name, signature);
                    self.skip_attribute()?
                }
            }
        }
        if position == NO_POSITION && access_flags.has_code() {
            log::debug!("method {} is neither abstract nor native but has no Code", signature);
        }
        log::trace!("method #{} {}: {}", order, signature, position);

        Ok(MethodEntry {
            order: order as i32,
            access_flags,
            name: name.to_owned(),
            descriptor: descriptor.to_owned(),
            signature,
            position,
        })
    }

    /// Reads the `Code` attribute following its name index and reduces its
    /// `LineNumberTable` to a single position.
    pub(crate) fn parse_code_attribute(
        &mut self,
        order: i32,
        constant_pool: &ConstantPool,
    ) -> Result<SourcePosition> {
        let attribute_length = self.read_u32()?;
        let start = self.r.position();

        let _max_stack = self.read_u16()?;
        let _max_locals = self.read_u16()?;
        let code_length = self.read_u32()?;
        let _code = self.read_bytes(code_length as u64)?;
        let exception_table_length = self.read_u16()?;
        self.skip(exception_table_length as u64 * EXCEPTION_TABLE_ENTRY_SIZE)?;

        let mut position = SourcePosition::unpositioned(order);
        let attributes_count = self.read_u16()?;
        for _ in 0..attributes_count {
            match constant_pool.utf8(self.read_u16()?)? {
                attributes::LINE_NUMBER_TABLE => position = self.parse_line_number_table(order)?,
                _ => self.skip_attribute()?,
            }
        }

        let consumed = self.r.position() - start;
        if consumed != attribute_length as u64 {
            log::warn!(
                "Code attribute declares {} bytes but its contents span {}",
                attribute_length,
                consumed
            );
        }

        Ok(position)
    }

    /// Reads a `LineNumberTable` attribute following its name index.
    pub(crate) fn parse_line_number_table(&mut self, order: i32) -> Result<SourcePosition> {
        let _attribute_length = self.read_u32()?;
        let line_number_table_length = self.read_u16()?;
        self.ensure_remaining(line_number_table_length as u64 * LINE_NUMBER_TABLE_ENTRY_SIZE)?;

        let mut min_line = None;
        for _ in 0..line_number_table_length {
            let _start_pc = self.read_u16()?;
            let line_number = self.read_u16()?;
            min_line = Some(min_line.map_or(line_number, |min: u16| min.min(line_number)));
        }

        Ok(match min_line {
            Some(line) => SourcePosition::new(line as i32, order),
            None => SourcePosition::unpositioned(order),
        })
    }

    /// Skips an attribute of any kind, with the cursor just past its name
    /// index.
    pub(crate) fn skip_attribute(&mut self) -> Result<()> {
        let attribute_length = self.read_u32()?;
        self.skip(attribute_length as u64)
    }

    fn remaining(&self) -> u64 {
        (self.r.get_ref().len() as u64).saturating_sub(self.r.position())
    }

    fn ensure_remaining(&self, needed: u64) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(ClassFileError::Truncated {
                offset: self.r.position(),
                needed,
                remaining,
            });
        }
        Ok(())
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        self.ensure_remaining(n)?;
        self.r.set_position(self.r.position() + n);
        Ok(())
    }

    fn read_bytes(&mut self, n: u64) -> Result<&'a [u8]> {
        self.ensure_remaining(n)?;
        let buf: &'a [u8] = *self.r.get_ref();
        let start = self.r.position() as usize;
        let end = start + n as usize;
        self.r.set_position(end as u64);
        Ok(&buf[start..end])
    }

    fn read_u32(&mut self) -> Result<u32> {
        self.ensure_remaining(4)?;
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        self.ensure_remaining(2)?;
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.ensure_remaining(1)?;
        Ok(self.r.read_u8()?)
    }
}
