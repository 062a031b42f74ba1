//! Method definitions and symbolic method references.

use std::fmt;
use std::sync::Arc;

use crate::assembly::stream::InstructionStream;
use crate::metadata::{access::AccessFlags, token::Token};

/// Name every static initialiser carries in the container format.
pub const CLINIT_NAME: &str = "<clinit>";

/// A method definition: a register-based code body plus metadata.
///
/// The model keeps only what the optimization passes consume. Prototypes,
/// debug info, and try/catch regions live with the host's full container
/// representation.
pub struct Method {
    /// Token assigned by the scope on insertion
    pub token: Token,
    /// Descriptor of the declaring class
    pub class: Arc<str>,
    /// Member name; `<clinit>` marks the static initialiser
    pub name: String,
    /// Access bits
    pub access: AccessFlags,
    /// The instruction stream of the method body
    pub code: InstructionStream,
}

impl Method {
    /// Returns true if this method is a class's static initialiser.
    #[must_use]
    pub fn is_clinit(&self) -> bool {
        self.name == CLINIT_NAME
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.class, self.name)
    }
}

/// A symbolic reference to a method, as carried by invoke instructions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Descriptor of the class named by the reference
    pub class: Arc<str>,
    /// Member name
    pub name: String,
}

impl MethodRef {
    /// Creates a method reference.
    #[must_use]
    pub fn new(class: &str, name: &str) -> Self {
        MethodRef {
            class: Arc::from(class),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.class, self.name)
    }
}
