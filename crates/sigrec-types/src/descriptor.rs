//! JVM field and method descriptors (`(ILjava/lang/String;)[J`).
//!
//! Host members carry their erased shape as a descriptor; the override locator compares these
//! against the erasure of reconciled signatures.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid descriptor `{descriptor}`: {reason}")]
    Invalid {
        descriptor: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
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
        Some(match code {
            b'B' => BaseType::Byte,
            b'C' => BaseType::Char,
            b'D' => BaseType::Double,
            b'F' => BaseType::Float,
            b'I' => BaseType::Int,
            b'J' => BaseType::Long,
            b'S' => BaseType::Short,
            b'Z' => BaseType::Boolean,
            _ => return None,
        })
    }

    pub fn code(self) -> char {
        match self {
            BaseType::Byte => 'B',
            BaseType::Char => 'C',
            BaseType::Double => 'D',
            BaseType::Float => 'F',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Short => 'S',
            BaseType::Boolean => 'Z',
        }
    }

    /// Host keyword, e.g. `int`.
    pub fn keyword(self) -> &'static str {
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

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Base(BaseType),
    /// Internal name with `/` separators, e.g. `java/util/Map$Entry`.
    Object(String),
    Array(Box<FieldType>),
}

impl FieldType {
    pub fn object(binary_name: &str) -> Self {
        FieldType::Object(binary_name.replace('.', "/"))
    }

    pub fn array_of(component: FieldType) -> Self {
        FieldType::Array(Box::new(component))
    }

    /// Dotted binary name of an object type (`java.util.Map$Entry`).
    pub fn binary_name(&self) -> Option<String> {
        match self {
            FieldType::Object(internal) => Some(internal.replace('/', ".")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    Void,
    Type(FieldType),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodDescriptor {
    pub params: Vec<FieldType>,
    pub return_type: ReturnType,
}

pub fn parse_field_descriptor(desc: &str) -> Result<FieldType, DescriptorError> {
    let mut cursor = Cursor::new(desc);
    let ty = cursor.field_type()?;
    cursor.finish()?;
    Ok(ty)
}

pub fn parse_method_descriptor(desc: &str) -> Result<MethodDescriptor, DescriptorError> {
    let mut cursor = Cursor::new(desc);
    cursor.expect(b'(', "expected `(`")?;

    let mut params = Vec::new();
    while cursor.peek() != Some(b')') {
        if cursor.peek().is_none() {
            return Err(cursor.error("unterminated parameter list"));
        }
        params.push(cursor.field_type()?);
    }
    cursor.expect(b')', "expected `)`")?;

    let return_type = if cursor.peek() == Some(b'V') {
        cursor.pos += 1;
        ReturnType::Void
    } else {
        ReturnType::Type(cursor.field_type()?)
    };
    cursor.finish()?;

    Ok(MethodDescriptor {
        params,
        return_type,
    })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn error(&self, reason: &'static str) -> DescriptorError {
        DescriptorError::Invalid {
            descriptor: self.input.to_string(),
            reason,
        }
    }

    fn expect(&mut self, byte: u8, reason: &'static str) -> Result<(), DescriptorError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(reason))
        }
    }

    fn finish(&self) -> Result<(), DescriptorError> {
        if self.pos == self.input.len() {
            Ok(())
        } else {
            Err(self.error("trailing characters"))
        }
    }

    fn field_type(&mut self) -> Result<FieldType, DescriptorError> {
        let Some(code) = self.peek() else {
            return Err(self.error("unexpected end of descriptor"));
        };
        self.pos += 1;

        if let Some(base) = BaseType::from_code(code) {
            return Ok(FieldType::Base(base));
        }
        match code {
            b'L' => {
                let rest = &self.input[self.pos..];
                let Some(len) = rest.find(';') else {
                    return Err(self.error("unterminated class name"));
                };
                if len == 0 {
                    return Err(self.error("empty class name"));
                }
                let name = rest[..len].to_string();
                self.pos += len + 1;
                Ok(FieldType::Object(name))
            }
            b'[' => Ok(FieldType::array_of(self.field_type()?)),
            _ => Err(self.error("unknown type code")),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => write!(f, "{}", base.code()),
            FieldType::Object(name) => write!(f, "L{name};"),
            FieldType::Array(component) => write!(f, "[{component}"),
        }
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnType::Void => f.write_str("V"),
            ReturnType::Type(ty) => write!(f, "{ty}"),
        }
    }
}

impl fmt::Display for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for param in &self.params {
            write!(f, "{param}")?;
        }
        write!(f, "){}", self.return_type)
    }
}
