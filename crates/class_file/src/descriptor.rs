//! Field and method descriptors (§4.3), rendered as source-level type names.

use std::fmt;

use crate::{ClassFileError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
}
impl BaseType {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            b'B' => Some(BaseType::Byte),
            b'C' => Some(BaseType::Char),
            b'D' => Some(BaseType::Double),
            b'F' => Some(BaseType::Float),
            b'I' => Some(BaseType::Int),
            b'J' => Some(BaseType::Long),
            b'S' => Some(BaseType::Short),
            b'Z' => Some(BaseType::Boolean),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseType::Byte => "byte",
            BaseType::Char => "char",
            BaseType::Double => "double",
            BaseType::Float => "float",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Short => "short",
            BaseType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Base(BaseType),
    /// A class or interface, with `.` separated binary name.
    Object(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub element: ElementType,
    pub dimensions: usize,
}
impl FieldType {
    /// Parses a descriptor consisting of exactly one field type.
    pub fn parse(descriptor: &str) -> Result<FieldType> {
        let mut parser = DescriptorParser::new(descriptor, descriptor);
        let field_type = parser
            .parse_field_type()?
            .ok_or_else(|| ClassFileError::IncompleteType(descriptor.to_owned()))?;
        parser.expect_end()?;
        Ok(field_type)
    }
}
impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            ElementType::Base(base) => f.write_str(base.name())?,
            ElementType::Object(name) => f.write_str(name)?,
        }
        for _ in 0..self.dimensions {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnType {
    Void,
    Field(FieldType),
}
impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("void"),
            ReturnType::Field(field_type) => write!(f, "{}", field_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameters: Vec<FieldType>,
    pub return_type: ReturnType,
}
impl MethodDescriptor {
    pub fn parse(descriptor: &str) -> Result<MethodDescriptor> {
        let unbalanced = || ClassFileError::UnbalancedMethodDescriptor(descriptor.to_owned());
        let open = descriptor.find('(').ok_or_else(unbalanced)?;
        let close = descriptor.rfind(')').ok_or_else(unbalanced)?;
        if open != 0 || open >= close {
            return Err(unbalanced());
        }

        let mut parser = DescriptorParser::new(&descriptor[open + 1..close], descriptor);
        let mut parameters = Vec::new();
        while let Some(parameter) = parser.parse_field_type()? {
            parameters.push(parameter);
        }

        let mut parser = DescriptorParser::new(&descriptor[close + 1..], descriptor);
        let return_type = parser.parse_return_type()?;
        parser.expect_end()?;

        Ok(MethodDescriptor {
            parameters,
            return_type,
        })
    }

    /// Renders `"<return type> <name>(<param>,<param>,...)"`.
    pub fn signature(&self, name: &str) -> String {
        format_signature(&self.return_type, name, &self.parameters[..])
    }
}

/// Builds a method signature from already resolved type names.
pub fn format_signature<R, P>(return_type: R, name: &str, parameters: &[P]) -> String
where
    R: fmt::Display,
    P: fmt::Display,
{
    let parameters = parameters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");

    format!("{} {}({})", return_type, name, parameters)
}

/// Parses `descriptor` and renders the signature of a method called `name`,
/// e.g. `run` with `(I[Ljava/lang/String;)V` gives
/// `void run(int,java.lang.String[])`.
pub fn parse_method_descriptor(name: &str, descriptor: &str) -> Result<String> {
    Ok(MethodDescriptor::parse(descriptor)?.signature(name))
}

struct DescriptorParser<'a> {
    input: &'a str,
    pos: usize,
    // The full descriptor, for error reporting.
    descriptor: &'a str,
}

impl<'a> DescriptorParser<'a> {
    fn new(input: &'a str, descriptor: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            descriptor,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect_end(&self) -> Result<()> {
        if self.pos < self.input.len() {
            return Err(ClassFileError::TrailingCharacters(self.descriptor.to_owned()));
        }
        Ok(())
    }

    fn parse_return_type(&mut self) -> Result<ReturnType> {
        if self.peek() == Some(b'V') {
            self.pos += 1;
            return Ok(ReturnType::Void);
        }

        match self.parse_field_type()? {
            Some(field_type) => Ok(ReturnType::Field(field_type)),
            None => Err(ClassFileError::IncompleteType(self.descriptor.to_owned())),
        }
    }

    /// Returns `None` at the end of input.
    fn parse_field_type(&mut self) -> Result<Option<FieldType>> {
        let mut dimensions = 0;
        while self.peek() == Some(b'[') {
            dimensions += 1;
            self.pos += 1;
        }

        let element = match self.peek() {
            None if dimensions == 0 => return Ok(None),
            None => return Err(ClassFileError::IncompleteType(self.descriptor.to_owned())),
            Some(b'L') => self.parse_object_type()?,
            Some(b'V') => return Err(ClassFileError::VoidParameter(self.descriptor.to_owned())),
            Some(code) => match BaseType::from_code(code) {
                Some(base) => {
                    self.pos += 1;
                    ElementType::Base(base)
                }
                None => {
                    return Err(ClassFileError::InvalidTypeCharacter {
                        character: self.input[self.pos..].chars().next().unwrap_or_default(),
                        descriptor: self.descriptor.to_owned(),
                    })
                }
            },
        };

        Ok(Some(FieldType {
            element,
            dimensions,
        }))
    }

    fn parse_object_type(&mut self) -> Result<ElementType> {
        let start = self.pos + 1;
        let end = self.input[start..]
            .find(';')
            .map(|i| start + i)
            .ok_or_else(|| ClassFileError::UnterminatedObjectType(self.descriptor.to_owned()))?;
        self.pos = end + 1;

        Ok(ElementType::Object(self.input[start..end].replace('/', ".")))
    }
}
