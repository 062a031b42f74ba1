//! DEX access flags for classes, fields, and methods.
//!
//! One shared bit set covers all three definition kinds; the bits mirror the
//! `access_flags` encoding of the DEX format. Only a handful of bits drive the
//! optimization passes (`STATIC`, `FINAL`, `CONSTRUCTOR`), the rest are carried
//! through untouched so a host can round-trip definitions through the model.

use bitflags::bitflags;

bitflags! {
    /// Access and property flags of a class, field, or method definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AccessFlags: u32 {
        /// Visible everywhere
        const PUBLIC = 0x0001;
        /// Visible only to the defining class
        const PRIVATE = 0x0002;
        /// Visible to package and subclasses
        const PROTECTED = 0x0004;
        /// Per-class rather than per-instance storage
        const STATIC = 0x0008;
        /// Not subclassable / not mutable after construction
        const FINAL = 0x0010;
        /// Associated lock acquired around method body
        const SYNCHRONIZED = 0x0020;
        /// Special treatment of field accesses under a memory model
        const VOLATILE = 0x0040;
        /// Method bridges a generic signature mismatch
        const BRIDGE = 0x0040;
        /// Not saved by default serialization
        const TRANSIENT = 0x0080;
        /// Final argument is treated as a "rest" argument
        const VARARGS = 0x0080;
        /// Implemented outside the bytecode
        const NATIVE = 0x0100;
        /// Abstract collection of methods
        const INTERFACE = 0x0200;
        /// Not directly instantiable
        const ABSTRACT = 0x0400;
        /// Strict floating point arithmetic
        const STRICT = 0x0800;
        /// Not present in the source
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation type
        const ANNOTATION = 0x2000;
        /// Declared as an enumerated type
        const ENUM = 0x4000;
        /// Constructor method (class or instance initialiser)
        const CONSTRUCTOR = 0x10000;
        /// Declared synchronized, for reflection
        const DECLARED_SYNCHRONIZED = 0x20000;
    }
}

impl AccessFlags {
    /// Returns true if the `STATIC` bit is set.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    /// Returns true if the `FINAL` bit is set.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    /// Returns true if the `CONSTRUCTOR` bit is set.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.contains(AccessFlags::CONSTRUCTOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_final_predicates() {
        let flags = AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL;
        assert!(flags.is_static());
        assert!(flags.is_final());
        assert!(!flags.is_constructor());
    }

    #[test]
    fn test_clinit_bits() {
        let flags = AccessFlags::STATIC | AccessFlags::CONSTRUCTOR;
        assert!(flags.is_static());
        assert!(flags.is_constructor());
    }

    #[test]
    fn test_raw_roundtrip() {
        let flags = AccessFlags::from_bits_truncate(0x0019);
        assert_eq!(
            flags,
            AccessFlags::PUBLIC | AccessFlags::STATIC | AccessFlags::FINAL
        );
        assert_eq!(flags.bits(), 0x0019);
    }
}
