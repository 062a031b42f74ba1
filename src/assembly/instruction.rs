//! The instruction representation: one tagged variant per opcode payload.

use std::fmt;

use crate::assembly::opcode::Opcode;
use crate::metadata::{field::FieldRef, method::MethodRef};

/// A register number.
///
/// Registers are method-local; wide values occupy the named register and its
/// successor, which the passes never need to model.
pub type Reg = u16;

/// Opcode-specific payload of an instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No payload
    None,
    /// A constant-load literal, sign-extended to 64 bits at decode
    Literal(i64),
    /// A symbolic field reference
    Field(FieldRef),
    /// A symbolic method reference
    Method(MethodRef),
    /// A relative branch offset
    Branch(i32),
}

/// A single decoded instruction.
///
/// Everything is owned; rewriting an instruction replaces the whole value in
/// its stream slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// The opcode tag
    pub opcode: Opcode,
    /// Destination register, if the opcode writes one
    pub dest: Option<Reg>,
    /// Source registers, in operand order
    pub srcs: Vec<Reg>,
    /// Opcode-specific payload
    pub payload: Payload,
}

impl Instruction {
    /// Creates a `nop`.
    #[must_use]
    pub fn nop() -> Self {
        Instruction {
            opcode: Opcode::Nop,
            dest: None,
            srcs: Vec::new(),
            payload: Payload::None,
        }
    }

    /// Creates a register move.
    #[must_use]
    pub fn mov(dest: Reg, src: Reg) -> Self {
        Instruction {
            opcode: Opcode::Move,
            dest: Some(dest),
            srcs: vec![src],
            payload: Payload::None,
        }
    }

    /// Creates a constant load with the given opcode.
    ///
    /// # Arguments
    ///
    /// * `opcode` - One of the `const` family
    /// * `dest` - Destination register
    /// * `literal` - The literal, already sign-extended as the decoder would
    #[must_use]
    pub fn const_load(opcode: Opcode, dest: Reg, literal: i64) -> Self {
        debug_assert!(opcode.is_const());
        Instruction {
            opcode,
            dest: Some(dest),
            srcs: Vec::new(),
            payload: Payload::Literal(literal),
        }
    }

    /// Creates a `const/4`.
    #[must_use]
    pub fn const4(dest: Reg, literal: i64) -> Self {
        Self::const_load(Opcode::Const4, dest, literal)
    }

    /// Creates a `const/16`.
    #[must_use]
    pub fn const16(dest: Reg, literal: i64) -> Self {
        Self::const_load(Opcode::Const16, dest, literal)
    }

    /// Creates a full-width `const`.
    #[must_use]
    pub fn const32(dest: Reg, literal: i64) -> Self {
        Self::const_load(Opcode::Const, dest, literal)
    }

    /// Creates a static read with the given sget opcode.
    #[must_use]
    pub fn sget_op(opcode: Opcode, dest: Reg, field: FieldRef) -> Self {
        debug_assert!(opcode.is_sget());
        Instruction {
            opcode,
            dest: Some(dest),
            srcs: Vec::new(),
            payload: Payload::Field(field),
        }
    }

    /// Creates a plain 32-bit `sget`.
    #[must_use]
    pub fn sget(dest: Reg, field: FieldRef) -> Self {
        Self::sget_op(Opcode::Sget, dest, field)
    }

    /// Creates a static write with the given sput opcode.
    #[must_use]
    pub fn sput_op(opcode: Opcode, src: Reg, field: FieldRef) -> Self {
        debug_assert!(opcode.is_sput());
        Instruction {
            opcode,
            dest: None,
            srcs: vec![src],
            payload: Payload::Field(field),
        }
    }

    /// Creates a plain 32-bit `sput`.
    #[must_use]
    pub fn sput(src: Reg, field: FieldRef) -> Self {
        Self::sput_op(Opcode::Sput, src, field)
    }

    /// Creates an `invoke-static`.
    #[must_use]
    pub fn invoke_static(args: Vec<Reg>, method: MethodRef) -> Self {
        Instruction {
            opcode: Opcode::InvokeStatic,
            dest: None,
            srcs: args,
            payload: Payload::Method(method),
        }
    }

    /// Creates a `goto`.
    #[must_use]
    pub fn goto(offset: i32) -> Self {
        Instruction {
            opcode: Opcode::Goto,
            dest: None,
            srcs: Vec::new(),
            payload: Payload::Branch(offset),
        }
    }

    /// Creates a `return-void`.
    #[must_use]
    pub fn return_void() -> Self {
        Instruction {
            opcode: Opcode::ReturnVoid,
            dest: None,
            srcs: Vec::new(),
            payload: Payload::None,
        }
    }

    /// Returns the field reference, if this instruction carries one.
    #[must_use]
    pub fn field(&self) -> Option<&FieldRef> {
        match &self.payload {
            Payload::Field(fref) => Some(fref),
            _ => None,
        }
    }

    /// Returns true if the payload is a field reference.
    #[must_use]
    pub fn has_field(&self) -> bool {
        matches!(self.payload, Payload::Field(_))
    }

    /// Returns the literal, if this instruction carries one.
    #[must_use]
    pub fn literal(&self) -> Option<i64> {
        match self.payload {
            Payload::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// Returns true if the instruction reads `reg` as a source.
    #[must_use]
    pub fn reads_reg(&self, reg: Reg) -> bool {
        self.srcs.contains(&reg)
    }

    /// Returns true if the instruction writes `reg`.
    #[must_use]
    pub fn writes_reg(&self, reg: Reg) -> bool {
        self.dest == Some(reg)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        let mut sep = " ";
        if let Some(dest) = self.dest {
            write!(f, "{}v{}", sep, dest)?;
            sep = ", ";
        }
        for src in &self.srcs {
            write!(f, "{}v{}", sep, src)?;
            sep = ", ";
        }
        match &self.payload {
            Payload::None => Ok(()),
            Payload::Literal(v) => write!(f, "{}#{}", sep, v),
            Payload::Field(fref) => write!(f, "{}{}", sep, fref),
            Payload::Method(mref) => write!(f, "{}{}", sep, mref),
            Payload::Branch(offset) => write!(f, "{}{:+}", sep, offset),
        }
    }
}
