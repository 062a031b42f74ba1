//! The DEX field type lattice: primitives, class references, and arrays.
//!
//! Types are carried on field definitions and field references and are parsed
//! from DEX type descriptors (`I`, `Z`, `Ljava/lang/String;`, `[I`, ...).
//! The optimization passes only distinguish primitive from reference types and
//! wide (64-bit) from narrow primitives; the full shape is kept so references
//! can be matched exactly during resolution.

use std::fmt;
use std::sync::Arc;

use crate::Result;

/// A field or value type in the class bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DexType {
    /// `Z` - single-bit truth value
    Boolean,
    /// `B` - signed 8-bit integer
    Byte,
    /// `S` - signed 16-bit integer
    Short,
    /// `C` - unsigned 16-bit code unit
    Char,
    /// `I` - signed 32-bit integer
    Int,
    /// `J` - signed 64-bit integer
    Long,
    /// `F` - 32-bit IEEE 754 value
    Float,
    /// `D` - 64-bit IEEE 754 value
    Double,
    /// `L...;` - reference to a class, by descriptor
    Object(Arc<str>),
    /// `[...` - array of an element type
    Array(Box<DexType>),
}

impl DexType {
    /// Parses a DEX field type descriptor.
    ///
    /// # Arguments
    ///
    /// * `descriptor` - The descriptor string, e.g. `I` or `Ljava/lang/String;`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if the descriptor is empty, truncated,
    /// or uses a shorty code that does not describe a field type.
    pub fn parse(descriptor: &str) -> Result<DexType> {
        let mut chars = descriptor.chars();
        let ty = match chars.next() {
            Some('Z') => DexType::Boolean,
            Some('B') => DexType::Byte,
            Some('S') => DexType::Short,
            Some('C') => DexType::Char,
            Some('I') => DexType::Int,
            Some('J') => DexType::Long,
            Some('F') => DexType::Float,
            Some('D') => DexType::Double,
            Some('L') => {
                if !descriptor.ends_with(';') || descriptor.len() < 3 {
                    return Err(malformed_error!(
                        "Truncated class descriptor '{}'",
                        descriptor
                    ));
                }
                return Ok(DexType::Object(Arc::from(descriptor)));
            }
            Some('[') => {
                let element = DexType::parse(&descriptor[1..])?;
                return Ok(DexType::Array(Box::new(element)));
            }
            Some(other) => {
                return Err(malformed_error!(
                    "'{}' is not a field type descriptor",
                    other
                ))
            }
            None => return Err(malformed_error!("Empty type descriptor")),
        };

        if chars.next().is_some() {
            return Err(malformed_error!(
                "Trailing characters in descriptor '{}'",
                descriptor
            ));
        }
        Ok(ty)
    }

    /// Returns true for the eight primitive kinds.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(self, DexType::Object(_) | DexType::Array(_))
    }

    /// Returns true for 64-bit primitives, which occupy a register pair.
    #[must_use]
    pub fn is_wide(&self) -> bool {
        matches!(self, DexType::Long | DexType::Double)
    }

    /// Renders the DEX descriptor for this type.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            DexType::Boolean => "Z".to_string(),
            DexType::Byte => "B".to_string(),
            DexType::Short => "S".to_string(),
            DexType::Char => "C".to_string(),
            DexType::Int => "I".to_string(),
            DexType::Long => "J".to_string(),
            DexType::Float => "F".to_string(),
            DexType::Double => "D".to_string(),
            DexType::Object(name) => name.to_string(),
            DexType::Array(element) => format!("[{}", element.descriptor()),
        }
    }
}

impl fmt::Display for DexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor())
    }
}
