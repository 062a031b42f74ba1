#![deny(missing_docs)]
#![allow(dead_code)]

//! # dexlift
//!
//! Post-link optimization of Android-style DEX class bundles. `dexlift`
//! consumes an already-parsed in-memory class representation and rewrites it
//! in place; parsing and re-serialising the container format stay with the
//! host.
//!
//! # Architecture
//!
//! The library is organized into layers that mirror the life of a bundle
//! inside the optimizer:
//!
//! - **Metadata Layer**: Classes, static fields, methods, encoded defaults,
//!   token identity, and field reference resolution
//! - **Assembly Layer**: Register-based instructions, opcode classification,
//!   and instruction streams with batched mutation
//! - **Optimization Layer**: The pass infrastructure and the final-inline
//!   pass: encodable-clinit replacement, transitive constant propagation,
//!   use-site inlining, and dead-field removal
//!
//! ## Key Components
//!
//! - [`Scope`] - The mutable, ordered collection of classes a pass runs over
//! - [`metadata::builder::ClassBuilder`] - Programmatic model construction
//! - [`metadata::resolver::FieldResolver`] - Injected reference resolution
//! - [`FinalInlinePass`] - The pass entry point
//! - [`prelude`] - Convenient re-exports of the commonly used types
//! - [`Error`] and [`Result`] - Error handling
//!
//! # Usage Examples
//!
//! ```rust
//! use dexlift::prelude::*;
//!
//! // Build the model the host would normally produce from a parsed bundle.
//! let mut scope = Scope::new();
//! scope.add_class(
//!     ClassBuilder::new("Lcom/example/Config;")
//!         .sfield("LIMIT", DexType::Int, |f| f.static_final())
//!         .clinit(vec![
//!             Instruction::const16(0, 64),
//!             Instruction::sput(0, FieldRef::new("Lcom/example/Config;", "LIMIT", DexType::Int)),
//!             Instruction::return_void(),
//!         ])
//!         .build(),
//! )?;
//!
//! // Run the pass; the initialiser becomes an encoded default and vanishes.
//! let pass = FinalInlinePass::new(FinalInlineConfig::default());
//! let result = pass.run(&mut scope)?;
//!
//! assert_eq!(result.metrics.get("encodable_clinits_replaced"), 1);
//! assert!(scope.class("Lcom/example/Config;").unwrap().clinit().is_none());
//! # Ok::<(), dexlift::Error>(())
//! ```

#[macro_use]
pub(crate) mod error;
pub(crate) mod utils;

pub mod assembly;
pub mod metadata;
pub mod optimization;
pub mod prelude;

pub use error::Error;
pub use metadata::scope::Scope;
pub use optimization::{FinalInlineConfig, FinalInlinePass, FinalInlineResult, PassMetrics};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
