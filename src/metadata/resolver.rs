//! Resolution of symbolic field references to concrete definitions.
//!
//! Instructions carry [`FieldRef`]s; the passes need the definition actually
//! denoted, if the scope contains one. Resolution is an injected capability
//! so hosts can substitute their own lookup (and tests can stub it), with
//! [`HierarchyResolver`] as the default: search the named class, then walk
//! the superclass chain, within the scope only.

use dashmap::DashMap;

use crate::metadata::{field::FieldRef, scope::Scope, token::Token};

/// Superclass hops after which a hierarchy walk gives up.
///
/// A chain this deep is a malformed hierarchy (or a cycle); treating it as
/// unresolvable keeps resolution total.
const MAX_HIERARCHY_DEPTH: usize = 256;

/// Maps a symbolic static field reference to its concrete definition.
///
/// Implementations must be thread-safe: discovery phases resolve references
/// from parallel per-class scans.
pub trait FieldResolver: Send + Sync {
    /// Resolves `fref` against the static fields of the scope.
    ///
    /// # Returns
    ///
    /// The token of the definition, or `None` when the reference points
    /// outside the scope or at no known member. Resolution failure is never
    /// an error; unresolved references are simply left alone.
    fn resolve_static(&self, scope: &Scope, fref: &FieldRef) -> Option<Token>;
}

/// The default resolver: declaring class first, then the superclass chain.
///
/// Results (hits and misses both) are memoised in a concurrent map, keyed by
/// the full reference. The cache assumes the scope's class and field
/// structure does not change between queries; the optimization passes only
/// delete fields after their final resolution, so a per-run resolver is
/// always safe.
#[derive(Default)]
pub struct HierarchyResolver {
    cache: DashMap<FieldRef, Option<Token>>,
}

impl HierarchyResolver {
    /// Creates a resolver with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn walk(scope: &Scope, fref: &FieldRef) -> Option<Token> {
        let mut current = Some(fref.class.clone());
        for _ in 0..MAX_HIERARCHY_DEPTH {
            let class = scope.class(current.as_deref()?)?;
            if let Some(field) = class.sfield(&fref.name, &fref.ty) {
                if field.access.is_static() {
                    return Some(field.token);
                }
                return None;
            }
            current = class.super_name.clone();
        }
        None
    }
}

impl FieldResolver for HierarchyResolver {
    fn resolve_static(&self, scope: &Scope, fref: &FieldRef) -> Option<Token> {
        if let Some(cached) = self.cache.get(fref) {
            return *cached;
        }
        let resolved = Self::walk(scope, fref);
        self.cache.insert(fref.clone(), resolved);
        resolved
    }
}
