//! Assembles class file images in memory.

#![allow(dead_code)]

use std::collections::HashMap;

use byteorder::{BigEndian, WriteBytesExt};

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_ABSTRACT: u16 = 0x0400;

pub struct Attribute {
    name_index: u16,
    info: Vec<u8>,
}
impl Attribute {
    fn write(&self, out: &mut Vec<u8>) {
        out.write_u16::<BigEndian>(self.name_index).unwrap();
        out.write_u32::<BigEndian>(self.info.len() as u32).unwrap();
        out.extend_from_slice(&self.info);
    }
}

pub struct ClassFileBuilder {
    magic: u32,
    next_index: u16,
    constant_pool: Vec<u8>,
    utf8s: HashMap<String, u16>,
    interfaces: Vec<u16>,
    fields: Vec<u8>,
    fields_count: u16,
    methods: Vec<u8>,
    methods_count: u16,
    attributes: Vec<Attribute>,
}

impl Default for ClassFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassFileBuilder {
    pub fn new() -> Self {
        let _ = pretty_env_logger::try_init();

        Self {
            magic: 0xCAFEBABE,
            next_index: 1,
            constant_pool: Vec::new(),
            utf8s: HashMap::new(),
            interfaces: Vec::new(),
            fields: Vec::new(),
            fields_count: 0,
            methods: Vec::new(),
            methods_count: 0,
            attributes: Vec::new(),
        }
    }

    pub fn magic(&mut self, magic: u32) -> &mut Self {
        self.magic = magic;
        self
    }

    /// Appends a constant pool entry and returns its index.
    pub fn cp_entry(&mut self, tag: u8, payload: &[u8]) -> u16 {
        let index = self.next_index;
        self.constant_pool.push(tag);
        self.constant_pool.extend_from_slice(payload);
        self.next_index += if tag == 5 || tag == 6 { 2 } else { 1 };
        index
    }

    pub fn utf8(&mut self, s: &str) -> u16 {
        if let Some(index) = self.utf8s.get(s) {
            return *index;
        }
        let mut payload = Vec::new();
        payload.write_u16::<BigEndian>(s.len() as u16).unwrap();
        payload.extend_from_slice(s.as_bytes());
        let index = self.cp_entry(1, &payload);
        self.utf8s.insert(s.to_owned(), index);
        index
    }

    pub fn integer(&mut self, value: i32) -> u16 {
        self.cp_entry(3, &value.to_be_bytes())
    }

    pub fn float(&mut self, value: f32) -> u16 {
        self.cp_entry(4, &value.to_bits().to_be_bytes())
    }

    pub fn long(&mut self, value: i64) -> u16 {
        self.cp_entry(5, &value.to_be_bytes())
    }

    pub fn double(&mut self, value: f64) -> u16 {
        self.cp_entry(6, &value.to_bits().to_be_bytes())
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.cp_entry(7, &name_index.to_be_bytes())
    }

    pub fn string(&mut self, value: &str) -> u16 {
        let string_index = self.utf8(value);
        self.cp_entry(8, &string_index.to_be_bytes())
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.cp_entry(12, &index_pair(name_index, descriptor_index))
    }

    fn ref_entry(&mut self, tag: u8, class: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(class);
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.cp_entry(tag, &index_pair(class_index, name_and_type_index))
    }

    pub fn field_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.ref_entry(9, class, name, descriptor)
    }

    pub fn method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.ref_entry(10, class, name, descriptor)
    }

    pub fn interface_method_ref(&mut self, class: &str, name: &str, descriptor: &str) -> u16 {
        self.ref_entry(11, class, name, descriptor)
    }

    pub fn method_handle(&mut self, reference_kind: u8, reference_index: u16) -> u16 {
        let [hi, lo] = reference_index.to_be_bytes();
        self.cp_entry(15, &[reference_kind, hi, lo])
    }

    pub fn method_type(&mut self, descriptor: &str) -> u16 {
        let descriptor_index = self.utf8(descriptor);
        self.cp_entry(16, &descriptor_index.to_be_bytes())
    }

    pub fn invoke_dynamic(
        &mut self,
        bootstrap_method_attr_index: u16,
        name: &str,
        descriptor: &str,
    ) -> u16 {
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.cp_entry(18, &index_pair(bootstrap_method_attr_index, name_and_type_index))
    }

    pub fn interface(&mut self, name: &str) -> &mut Self {
        let index = self.class(name);
        self.interfaces.push(index);
        self
    }

    pub fn attribute(&mut self, name: &str, info: &[u8]) -> Attribute {
        Attribute {
            name_index: self.utf8(name),
            info: info.to_vec(),
        }
    }

    pub fn line_number_table(&mut self, entries: &[(u16, u16)]) -> Attribute {
        let mut info = Vec::new();
        info.write_u16::<BigEndian>(entries.len() as u16).unwrap();
        for (start_pc, line_number) in entries {
            info.write_u16::<BigEndian>(*start_pc).unwrap();
            info.write_u16::<BigEndian>(*line_number).unwrap();
        }
        self.attribute("LineNumberTable", &info)
    }

    /// A `Code` attribute around `code`, with `exception_table_length`
    /// catch-all handlers covering the whole body.
    pub fn code(
        &mut self,
        code: &[u8],
        exception_table_length: u16,
        attributes: Vec<Attribute>,
    ) -> Attribute {
        let mut info = Vec::new();
        info.write_u16::<BigEndian>(2).unwrap(); // max_stack
        info.write_u16::<BigEndian>(1).unwrap(); // max_locals
        info.write_u32::<BigEndian>(code.len() as u32).unwrap();
        info.extend_from_slice(code);
        info.write_u16::<BigEndian>(exception_table_length).unwrap();
        for _ in 0..exception_table_length {
            info.write_u16::<BigEndian>(0).unwrap();
            info.write_u16::<BigEndian>(code.len() as u16).unwrap();
            info.write_u16::<BigEndian>(0).unwrap();
            info.write_u16::<BigEndian>(0).unwrap();
        }
        write_attributes(&mut info, &attributes);
        self.attribute("Code", &info)
    }

    /// A `Code` attribute whose `LineNumberTable` holds `entries`.
    pub fn code_with_lines(&mut self, entries: &[(u16, u16)]) -> Attribute {
        let line_number_table = self.line_number_table(entries);
        self.code(&[0x2a, 0xb7, 0x00, 0x01, 0xb1], 0, vec![line_number_table])
    }

    pub fn field(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        write_member(&mut self.fields, access_flags, name_index, descriptor_index, &attributes);
        self.fields_count += 1;
        self
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.method_with_indices(access_flags, name_index, descriptor_index, attributes)
    }

    pub fn method_with_indices(
        &mut self,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: Vec<Attribute>,
    ) -> &mut Self {
        write_member(&mut self.methods, access_flags, name_index, descriptor_index, &attributes);
        self.methods_count += 1;
        self
    }

    pub fn class_attribute(&mut self, attribute: Attribute) -> &mut Self {
        self.attributes.push(attribute);
        self
    }

    pub fn build(&mut self) -> Vec<u8> {
        let this_class = self.class("my/MyClass");
        let super_class = self.class("java/lang/Object");

        let mut out = Vec::new();
        out.write_u32::<BigEndian>(self.magic).unwrap();
        out.write_u16::<BigEndian>(0).unwrap(); // minor_version
        out.write_u16::<BigEndian>(52).unwrap(); // major_version
        out.write_u16::<BigEndian>(self.next_index).unwrap();
        out.extend_from_slice(&self.constant_pool);
        out.write_u16::<BigEndian>(ACC_PUBLIC | 0x0020).unwrap();
        out.write_u16::<BigEndian>(this_class).unwrap();
        out.write_u16::<BigEndian>(super_class).unwrap();
        out.write_u16::<BigEndian>(self.interfaces.len() as u16).unwrap();
        for interface in &self.interfaces {
            out.write_u16::<BigEndian>(*interface).unwrap();
        }
        out.write_u16::<BigEndian>(self.fields_count).unwrap();
        out.extend_from_slice(&self.fields);
        out.write_u16::<BigEndian>(self.methods_count).unwrap();
        out.extend_from_slice(&self.methods);
        write_attributes(&mut out, &self.attributes);
        out
    }
}

fn index_pair(a: u16, b: u16) -> [u8; 4] {
    let [a0, a1] = a.to_be_bytes();
    let [b0, b1] = b.to_be_bytes();
    [a0, a1, b0, b1]
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[Attribute]) {
    out.write_u16::<BigEndian>(attributes.len() as u16).unwrap();
    for attribute in attributes {
        attribute.write(out);
    }
}

fn write_member(
    out: &mut Vec<u8>,
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: &[Attribute],
) {
    out.write_u16::<BigEndian>(access_flags).unwrap();
    out.write_u16::<BigEndian>(name_index).unwrap();
    out.write_u16::<BigEndian>(descriptor_index).unwrap();
    write_attributes(out, attributes);
}
