//! Opcodes and the classification predicates the passes are built on.
//!
//! The enum covers the register-based instruction subset the optimizer
//! inspects or emits, plus enough neighbouring opcodes to express the method
//! shapes it must refuse (branches, invokes). Mnemonics follow the DEX
//! assembler syntax.

use strum::{Display, EnumIter};

/// An instruction opcode.
#[derive(Debug, Display, EnumIter, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// No operation
    #[strum(serialize = "nop")]
    Nop,
    /// Register-to-register move
    #[strum(serialize = "move")]
    Move,
    /// Load a 4-bit sign-extended literal
    #[strum(serialize = "const/4")]
    Const4,
    /// Load a 16-bit sign-extended literal
    #[strum(serialize = "const/16")]
    Const16,
    /// Load a full 32-bit literal
    #[strum(serialize = "const")]
    Const,
    /// Load the 16 high bits of a 32-bit value
    #[strum(serialize = "const/high16")]
    ConstHigh16,
    /// Load a 16-bit sign-extended literal into a register pair
    #[strum(serialize = "const-wide/16")]
    ConstWide16,
    /// Read a 32-bit static field
    #[strum(serialize = "sget")]
    Sget,
    /// Read a 64-bit static field
    #[strum(serialize = "sget-wide")]
    SgetWide,
    /// Read a reference static field
    #[strum(serialize = "sget-object")]
    SgetObject,
    /// Read a boolean static field
    #[strum(serialize = "sget-boolean")]
    SgetBoolean,
    /// Read a byte static field
    #[strum(serialize = "sget-byte")]
    SgetByte,
    /// Read a char static field
    #[strum(serialize = "sget-char")]
    SgetChar,
    /// Read a short static field
    #[strum(serialize = "sget-short")]
    SgetShort,
    /// Write a 32-bit static field
    #[strum(serialize = "sput")]
    Sput,
    /// Write a 64-bit static field
    #[strum(serialize = "sput-wide")]
    SputWide,
    /// Write a reference static field
    #[strum(serialize = "sput-object")]
    SputObject,
    /// Write a boolean static field
    #[strum(serialize = "sput-boolean")]
    SputBoolean,
    /// Write a byte static field
    #[strum(serialize = "sput-byte")]
    SputByte,
    /// Write a char static field
    #[strum(serialize = "sput-char")]
    SputChar,
    /// Write a short static field
    #[strum(serialize = "sput-short")]
    SputShort,
    /// Invoke a static method
    #[strum(serialize = "invoke-static")]
    InvokeStatic,
    /// Unconditional branch
    #[strum(serialize = "goto")]
    Goto,
    /// Return from a void method
    #[strum(serialize = "return-void")]
    ReturnVoid,
}

impl Opcode {
    /// Returns true for every constant-load opcode.
    #[must_use]
    pub fn is_const(&self) -> bool {
        matches!(
            self,
            Opcode::Const4
                | Opcode::Const16
                | Opcode::Const
                | Opcode::ConstHigh16
                | Opcode::ConstWide16
        )
    }

    /// Returns true for the whole sget family.
    #[must_use]
    pub fn is_sget(&self) -> bool {
        matches!(
            self,
            Opcode::Sget
                | Opcode::SgetWide
                | Opcode::SgetObject
                | Opcode::SgetBoolean
                | Opcode::SgetByte
                | Opcode::SgetChar
                | Opcode::SgetShort
        )
    }

    /// Returns true for the whole sput family.
    #[must_use]
    pub fn is_sput(&self) -> bool {
        matches!(
            self,
            Opcode::Sput
                | Opcode::SputWide
                | Opcode::SputObject
                | Opcode::SputBoolean
                | Opcode::SputByte
                | Opcode::SputChar
                | Opcode::SputShort
        )
    }

    /// Returns true for any static field access, read or write.
    #[must_use]
    pub fn is_static_field_op(&self) -> bool {
        self.is_sget() || self.is_sput()
    }

    /// Returns true for the sget variants whose value fits one register.
    ///
    /// `sget-object` is excluded: reference values are never inlined.
    /// `sget-wide` is excluded as well; callers that reject it for a field
    /// with a known value count it as an unhandled inline.
    #[must_use]
    pub fn is_narrow_sget(&self) -> bool {
        matches!(
            self,
            Opcode::Sget
                | Opcode::SgetBoolean
                | Opcode::SgetByte
                | Opcode::SgetChar
                | Opcode::SgetShort
        )
    }
}

/// Returns true if `v` is encodable by `const/16`.
///
/// The check is on the unsigned 32-bit view: exactly the values whose upper
/// bits are clear survive the opcode's sign-extending decode unchanged.
#[must_use]
pub fn fits_const16(v: u64) -> bool {
    v & 0xFFFF == v
}

/// Returns true if `v` is encodable by `const/high16`.
#[must_use]
pub fn fits_const_high16(v: u64) -> bool {
    v & 0xFFFF_0000 == v
}

/// Picks the narrowest constant-load opcode that encodes `v`.
///
/// `const/16` wins over `const/high16` where both fit (only at zero); values
/// fitting neither take the full-width `const`.
#[must_use]
pub fn choose_const_opcode(v: u64) -> Opcode {
    if fits_const16(v) {
        Opcode::Const16
    } else if fits_const_high16(v) {
        Opcode::ConstHigh16
    } else {
        Opcode::Const
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_sget_families() {
        assert!(Opcode::Sget.is_narrow_sget());
        assert!(Opcode::SgetShort.is_narrow_sget());
        assert!(!Opcode::SgetWide.is_narrow_sget());
        assert!(!Opcode::SgetObject.is_narrow_sget());
        assert!(!Opcode::Sput.is_narrow_sget());
        assert!(Opcode::SgetWide.is_sget());
        assert!(Opcode::SputObject.is_sput());
    }

    #[test]
    fn test_static_field_op_covers_both_families() {
        for op in Opcode::iter() {
            assert_eq!(op.is_static_field_op(), op.is_sget() || op.is_sput());
        }
    }

    #[test]
    fn test_narrow_sget_implies_sget() {
        for op in Opcode::iter() {
            if op.is_narrow_sget() {
                assert!(op.is_sget());
                assert_ne!(op, Opcode::SgetWide);
            }
        }
    }

    #[test]
    fn test_fits_const16() {
        assert!(fits_const16(0));
        assert!(fits_const16(7));
        assert!(fits_const16(0xFFFF));
        assert!(!fits_const16(0x1_0000));
        assert!(!fits_const16(0xFFFF_FFFF));
    }

    #[test]
    fn test_fits_const_high16() {
        assert!(fits_const_high16(0));
        assert!(fits_const_high16(0x1000_0000));
        assert!(fits_const_high16(0xFFFF_0000));
        assert!(!fits_const_high16(0x1234_5678));
        assert!(!fits_const_high16(7));
    }

    #[test]
    fn test_choose_narrowest() {
        assert_eq!(choose_const_opcode(0), Opcode::Const16);
        assert_eq!(choose_const_opcode(7), Opcode::Const16);
        assert_eq!(choose_const_opcode(0x1000_0000), Opcode::ConstHigh16);
        assert_eq!(choose_const_opcode(0x1234_5678), Opcode::Const);
    }

    #[test]
    fn test_mnemonics() {
        assert_eq!(Opcode::Const16.to_string(), "const/16");
        assert_eq!(Opcode::SgetObject.to_string(), "sget-object");
        assert_eq!(Opcode::ReturnVoid.to_string(), "return-void");
    }
}
