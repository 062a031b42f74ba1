//! Class definitions: the owned aggregates a scope is made of.

use std::fmt;
use std::sync::Arc;

use crate::metadata::{
    access::AccessFlags, field::Field, method::Method, token::Token, types::DexType,
};

/// A class definition in the scope.
///
/// A class bears its static fields and its methods; the static initialiser,
/// when present, lives in the method list under its `<clinit>` name and is
/// found through [`DexClass::clinit`]. Instance fields are not modelled; the
/// passes never touch them.
pub struct DexClass {
    /// Token assigned by the scope on insertion
    pub token: Token,
    /// Type descriptor, e.g. `Lcom/example/Foo;`
    pub name: Arc<str>,
    /// Descriptor of the superclass, absent only for the root of a hierarchy
    pub super_name: Option<Arc<str>>,
    /// Access bits
    pub access: AccessFlags,
    /// Static field definitions, in declaration order
    pub sfields: Vec<Field>,
    /// Method definitions, static initialiser included
    pub methods: Vec<Method>,
    /// Whether the surrounding environment permits deleting this class and
    /// its members. Supplied by the host.
    pub deletable: bool,
}

impl DexClass {
    /// Returns the static initialiser, if the class has one.
    #[must_use]
    pub fn clinit(&self) -> Option<&Method> {
        self.methods.iter().find(|m| m.is_clinit())
    }

    /// Returns the static initialiser mutably, if the class has one.
    pub fn clinit_mut(&mut self) -> Option<&mut Method> {
        self.methods.iter_mut().find(|m| m.is_clinit())
    }

    /// Removes the static initialiser from the method list.
    ///
    /// Returns true if an initialiser was present and removed.
    pub fn remove_clinit(&mut self) -> bool {
        let before = self.methods.len();
        self.methods.retain(|m| !m.is_clinit());
        self.methods.len() != before
    }

    /// Looks up a static field by name and type.
    #[must_use]
    pub fn sfield(&self, name: &str, ty: &DexType) -> Option<&Field> {
        self.sfields.iter().find(|f| f.name == name && &f.ty == ty)
    }
}

impl fmt::Display for DexClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::stream::InstructionStream;
    use crate::metadata::method::CLINIT_NAME;

    fn empty_class() -> DexClass {
        DexClass {
            token: Token::new(0x0200_0001),
            name: Arc::from("LFoo;"),
            super_name: Some(Arc::from("Ljava/lang/Object;")),
            access: AccessFlags::PUBLIC,
            sfields: Vec::new(),
            methods: Vec::new(),
            deletable: true,
        }
    }

    #[test]
    fn test_clinit_lookup_and_removal() {
        let mut class = empty_class();
        assert!(class.clinit().is_none());

        class.methods.push(Method {
            token: Token::new(0x0500_0001),
            class: class.name.clone(),
            name: CLINIT_NAME.to_string(),
            access: AccessFlags::STATIC | AccessFlags::CONSTRUCTOR,
            code: InstructionStream::new(Vec::new()),
        });
        class.methods.push(Method {
            token: Token::new(0x0500_0002),
            class: class.name.clone(),
            name: "bar".to_string(),
            access: AccessFlags::PUBLIC,
            code: InstructionStream::new(Vec::new()),
        });

        assert!(class.clinit().is_some());
        assert!(class.remove_clinit());
        assert!(class.clinit().is_none());
        assert_eq!(class.methods.len(), 1);
        assert!(!class.remove_clinit());
    }
}
