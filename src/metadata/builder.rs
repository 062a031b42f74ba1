//! Builders for assembling the in-memory class model.
//!
//! The optimizer consumes classes the host already parsed out of a container;
//! these builders are the programmatic way to produce that model, both for
//! hosts embedding the crate and for tests. Tokens are left null and assigned
//! when the class enters a [`crate::metadata::scope::Scope`].
//!
//! # Examples
//!
//! ```rust
//! use dexlift::prelude::*;
//!
//! let class = ClassBuilder::new("Lcom/example/Flags;")
//!     .sfield("ENABLED", DexType::Boolean, |f| {
//!         f.static_final().value(EncodedValue::Boolean(true))
//!     })
//!     .clinit(vec![Instruction::return_void()])
//!     .build();
//!
//! let mut scope = Scope::new();
//! scope.add_class(class)?;
//! # Ok::<(), dexlift::Error>(())
//! ```

use std::sync::Arc;

use crate::assembly::{instruction::Instruction, stream::InstructionStream};
use crate::metadata::{
    access::AccessFlags,
    class::DexClass,
    field::Field,
    method::{Method, CLINIT_NAME},
    token::Token,
    types::DexType,
    value::EncodedValue,
};

/// Builds a [`DexClass`] ready for scope insertion.
pub struct ClassBuilder {
    name: Arc<str>,
    super_name: Option<Arc<str>>,
    access: AccessFlags,
    sfields: Vec<Field>,
    methods: Vec<Method>,
    deletable: bool,
}

impl ClassBuilder {
    /// Starts a class with the given type descriptor.
    #[must_use]
    pub fn new(name: &str) -> Self {
        ClassBuilder {
            name: Arc::from(name),
            super_name: Some(Arc::from("Ljava/lang/Object;")),
            access: AccessFlags::PUBLIC,
            sfields: Vec::new(),
            methods: Vec::new(),
            deletable: false,
        }
    }

    /// Sets the superclass descriptor.
    #[must_use]
    pub fn extends(mut self, super_name: &str) -> Self {
        self.super_name = Some(Arc::from(super_name));
        self
    }

    /// Replaces the access flags.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Marks the class as deletable by the environment.
    #[must_use]
    pub fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }

    /// Adds a static field, configured through a [`FieldBuilder`] closure.
    #[must_use]
    pub fn sfield<F>(mut self, name: &str, ty: DexType, configure: F) -> Self
    where
        F: FnOnce(FieldBuilder) -> FieldBuilder,
    {
        let builder = configure(FieldBuilder::new(name, ty));
        self.sfields.push(builder.into_field(self.name.clone()));
        self
    }

    /// Adds a method, configured through a [`MethodBuilder`] closure.
    #[must_use]
    pub fn method<F>(mut self, name: &str, configure: F) -> Self
    where
        F: FnOnce(MethodBuilder) -> MethodBuilder,
    {
        let builder = configure(MethodBuilder::new(name));
        self.methods.push(builder.into_method(self.name.clone()));
        self
    }

    /// Adds a static initialiser with the canonical access bits.
    #[must_use]
    pub fn clinit(self, code: Vec<Instruction>) -> Self {
        self.method(CLINIT_NAME, |m| {
            m.access(AccessFlags::STATIC | AccessFlags::CONSTRUCTOR)
                .code(code)
        })
    }

    /// Finishes the class.
    #[must_use]
    pub fn build(self) -> DexClass {
        DexClass {
            token: Token::new(0),
            name: self.name,
            super_name: self.super_name,
            access: self.access,
            sfields: self.sfields,
            methods: self.methods,
            deletable: self.deletable,
        }
    }
}

/// Builds one static field of a class under construction.
pub struct FieldBuilder {
    name: String,
    ty: DexType,
    access: AccessFlags,
    default: Option<EncodedValue>,
    deletable: bool,
}

impl FieldBuilder {
    fn new(name: &str, ty: DexType) -> Self {
        FieldBuilder {
            name: name.to_string(),
            ty,
            access: AccessFlags::PUBLIC | AccessFlags::STATIC,
            default: None,
            deletable: false,
        }
    }

    /// Adds the `FINAL` bit; the `STATIC` bit is always present.
    #[must_use]
    pub fn static_final(mut self) -> Self {
        self.access |= AccessFlags::FINAL;
        self
    }

    /// Replaces the access flags wholesale.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Sets the encoded default value.
    #[must_use]
    pub fn value(mut self, value: EncodedValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Marks the field as deletable by the environment.
    #[must_use]
    pub fn deletable(mut self) -> Self {
        self.deletable = true;
        self
    }

    fn into_field(self, class: Arc<str>) -> Field {
        Field {
            token: Token::new(0),
            class,
            name: self.name,
            ty: self.ty,
            access: self.access,
            default: self.default,
            deletable: self.deletable,
        }
    }
}

/// Builds one method of a class under construction.
pub struct MethodBuilder {
    name: String,
    access: AccessFlags,
    code: Vec<Instruction>,
}

impl MethodBuilder {
    fn new(name: &str) -> Self {
        MethodBuilder {
            name: name.to_string(),
            access: AccessFlags::PUBLIC,
            code: Vec::new(),
        }
    }

    /// Replaces the access flags.
    #[must_use]
    pub fn access(mut self, access: AccessFlags) -> Self {
        self.access = access;
        self
    }

    /// Sets the method body.
    #[must_use]
    pub fn code(mut self, code: Vec<Instruction>) -> Self {
        self.code = code;
        self
    }

    fn into_method(self, class: Arc<str>) -> Method {
        Method {
            token: Token::new(0),
            class,
            name: self.name,
            access: self.access,
            code: InstructionStream::new(self.code),
        }
    }
}
