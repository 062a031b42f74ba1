//! The in-memory model of an Android-style class bundle.
//!
//! This module owns everything the optimizer knows about a bundle once the
//! host has parsed it: classes with their static fields and methods, typed
//! encoded defaults, access flags, token identities, and the resolution of
//! symbolic field references to concrete definitions.
//!
//! # Key Types
//! - [`scope::Scope`] - The ordered, mutable collection of classes
//! - [`class::DexClass`] / [`field::Field`] / [`method::Method`] - Definitions
//! - [`field::FieldRef`] - Symbolic references as carried by instructions
//! - [`value::EncodedValue`] - Typed constant defaults on field definitions
//! - [`resolver::FieldResolver`] - Reference-to-definition resolution
//! - [`builder::ClassBuilder`] - Programmatic model construction

pub mod access;
pub mod builder;
pub mod class;
pub mod field;
pub mod method;
pub mod resolver;
pub mod scope;
/// Compact identities for classes, fields, and methods within a scope.
pub mod token;
pub mod types;
pub mod value;
