//! Convenient re-exports of the most commonly used types.
//!
//! ```rust
//! use dexlift::prelude::*;
//!
//! let mut scope = Scope::new();
//! let pass = FinalInlinePass::new(FinalInlineConfig::default());
//! let result = pass.run(&mut scope)?;
//! println!("{}", result.summary());
//! # Ok::<(), dexlift::Error>(())
//! ```

pub use crate::assembly::{
    choose_const_opcode, fits_const16, fits_const_high16, Instruction, InstructionStream, Opcode,
    Payload, Reg,
};
pub use crate::metadata::{
    access::AccessFlags,
    builder::{ClassBuilder, FieldBuilder, MethodBuilder},
    class::DexClass,
    field::{Field, FieldRef},
    method::{Method, MethodRef},
    resolver::{FieldResolver, HierarchyResolver},
    scope::Scope,
    token::{Token, TokenPool},
    types::DexType,
    value::EncodedValue,
};
pub use crate::optimization::{
    Event, EventKind, EventLog, FinalInlineConfig, FinalInlinePass, FinalInlineResult, PassMetrics,
};
pub use crate::{Error, Result};
