//! Static field definitions and symbolic field references.

use std::fmt;
use std::sync::Arc;

use crate::metadata::{
    access::AccessFlags, token::Token, types::DexType, value::EncodedValue,
};

/// A static field definition owned by a class in the scope.
pub struct Field {
    /// Token assigned by the scope on insertion
    pub token: Token,
    /// Descriptor of the declaring class, e.g. `LFoo;`
    pub class: Arc<str>,
    /// Member name
    pub name: String,
    /// Declared value type
    pub ty: DexType,
    /// Access bits; `STATIC` is always set for fields in this model
    pub access: AccessFlags,
    /// Encoded default, if the container carries one.
    ///
    /// Absent for reference fields defaulting to null and for fields whose
    /// value only exists as initialiser code.
    pub default: Option<EncodedValue>,
    /// Whether the surrounding environment (keep rules, reflection analysis)
    /// permits deleting this field. Supplied by the host.
    pub deletable: bool,
}

impl Field {
    /// Replaces the field's access bits and encoded default in one step.
    ///
    /// This is how a pass turns initialiser code into container data: the
    /// value observed in the instruction stream becomes the field's default.
    pub fn make_concrete(&mut self, access: AccessFlags, value: EncodedValue) {
        self.access = access;
        self.default = Some(value);
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.class, self.name, self.ty)
    }
}

/// A symbolic reference to a field, as carried by an instruction.
///
/// References name a class, member, and type; they are resolved to concrete
/// definitions through a [`crate::metadata::resolver::FieldResolver`]. A
/// reference to a class outside the scope simply never resolves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Descriptor of the class named by the reference
    pub class: Arc<str>,
    /// Member name
    pub name: String,
    /// Referenced value type
    pub ty: DexType,
}

impl FieldRef {
    /// Creates a field reference.
    ///
    /// # Arguments
    ///
    /// * `class` - Descriptor of the declaring class, e.g. `LFoo;`
    /// * `name` - Member name
    /// * `ty` - Declared value type
    #[must_use]
    pub fn new(class: &str, name: &str, ty: DexType) -> Self {
        FieldRef {
            class: Arc::from(class),
            name: name.to_string(),
            ty,
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}:{}", self.class, self.name, self.ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_field() -> Field {
        Field {
            token: Token::new(0x0400_0001),
            class: Arc::from("LFoo;"),
            name: "BAR".to_string(),
            ty: DexType::Int,
            access: AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL,
            default: None,
            deletable: true,
        }
    }

    #[test]
    fn test_make_concrete_sets_default() {
        let mut field = test_field();
        assert!(field.default.is_none());

        let mut value = EncodedValue::zero_for(&field.ty);
        value.set_raw(7);
        field.make_concrete(field.access, value);

        assert_eq!(field.default, Some(EncodedValue::Int(7)));
    }

    #[test]
    fn test_display_format() {
        let field = test_field();
        assert_eq!(format!("{}", field), "LFoo;->BAR:I");

        let fref = FieldRef::new("LFoo;", "BAR", DexType::Int);
        assert_eq!(format!("{}", fref), "LFoo;->BAR:I");
    }
}
