//! The class scope: the ordered collection of classes a pass operates over.
//!
//! The scope owns every class and assigns [`Token`] identities on insertion.
//! Alongside the class list it maintains a descriptor index for hierarchy
//! walks and a token-ordered field index so passes can go from a resolved
//! token back to the definition without rescanning the bundle.

use std::sync::Arc;

use crossbeam_skiplist::SkipMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::metadata::{
    class::DexClass,
    field::Field,
    method::Method,
    token::{Token, TokenPool},
};
use crate::Result;

/// Location of a field definition inside the class list.
#[derive(Debug, Clone, Copy)]
struct FieldSlot {
    class: usize,
    field: usize,
}

/// A mutable, ordered collection of class definitions.
///
/// Ownership is exclusive: a pass holds the scope mutably for its duration
/// and no external reader observes intermediate state. Construction goes
/// through [`Scope::add_class`], which hands out tokens.
pub struct Scope {
    classes: Vec<DexClass>,
    class_index: FxHashMap<Arc<str>, usize>,
    field_index: SkipMap<Token, FieldSlot>,
    next_type: u32,
    next_field: u32,
    next_method: u32,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Scope {
            classes: Vec::new(),
            class_index: FxHashMap::default(),
            field_index: SkipMap::new(),
            next_type: 1,
            next_field: 1,
            next_method: 1,
        }
    }

    /// Adds a class, assigning tokens to it and all its members.
    ///
    /// # Arguments
    ///
    /// * `class` - The class to add; any tokens it carries are overwritten.
    ///
    /// # Returns
    ///
    /// The token assigned to the class.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if a class with the same
    /// descriptor is already present.
    pub fn add_class(&mut self, mut class: DexClass) -> Result<Token> {
        if self.class_index.contains_key(&class.name) {
            return Err(malformed_error!(
                "Class {} is already present in the scope",
                class.name
            ));
        }

        class.token = Token::from_pool(TokenPool::Type, self.next_type);
        self.next_type += 1;

        let class_idx = self.classes.len();
        for (field_idx, field) in class.sfields.iter_mut().enumerate() {
            field.token = Token::from_pool(TokenPool::Field, self.next_field);
            self.next_field += 1;
            field.class = class.name.clone();
            self.field_index.insert(
                field.token,
                FieldSlot {
                    class: class_idx,
                    field: field_idx,
                },
            );
        }
        for method in &mut class.methods {
            method.token = Token::from_pool(TokenPool::Method, self.next_method);
            self.next_method += 1;
            method.class = class.name.clone();
        }

        let token = class.token;
        self.class_index.insert(class.name.clone(), class_idx);
        self.classes.push(class);
        Ok(token)
    }

    /// Returns the number of classes.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Iterates the classes in scope order.
    pub fn classes(&self) -> impl Iterator<Item = &DexClass> {
        self.classes.iter()
    }

    /// Iterates the classes mutably, in scope order.
    pub fn classes_mut(&mut self) -> impl Iterator<Item = &mut DexClass> {
        self.classes.iter_mut()
    }

    /// Looks up a class by type descriptor.
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&DexClass> {
        self.class_index.get(name).map(|&idx| &self.classes[idx])
    }

    /// Returns the class at a scope position.
    pub(crate) fn class_at(&self, index: usize) -> &DexClass {
        &self.classes[index]
    }

    /// Returns the class at a scope position, mutably.
    pub(crate) fn class_at_mut(&mut self, index: usize) -> &mut DexClass {
        &mut self.classes[index]
    }

    /// Looks up a field definition by token.
    #[must_use]
    pub fn field(&self, token: Token) -> Option<&Field> {
        let slot = *self.field_index.get(&token)?.value();
        self.classes
            .get(slot.class)
            .and_then(|c| c.sfields.get(slot.field))
    }

    /// Looks up a field definition by token, mutably.
    pub fn field_mut(&mut self, token: Token) -> Option<&mut Field> {
        let slot = *self.field_index.get(&token)?.value();
        self.classes
            .get_mut(slot.class)
            .and_then(|c| c.sfields.get_mut(slot.field))
    }

    /// Iterates every method of every class, static initialisers included.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.classes.iter().flat_map(|c| c.methods.iter())
    }

    /// Removes the given field definitions from their classes.
    ///
    /// Returns the number of fields removed. The token-to-definition index is
    /// rebuilt, so tokens of removed fields stop resolving.
    pub fn remove_fields(&mut self, dead: &FxHashSet<Token>) -> usize {
        if dead.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for class in &mut self.classes {
            let before = class.sfields.len();
            class.sfields.retain(|f| !dead.contains(&f.token));
            removed += before - class.sfields.len();
        }

        if removed > 0 {
            self.rebuild_field_index();
        }
        removed
    }

    fn rebuild_field_index(&mut self) {
        let index = SkipMap::new();
        for (class_idx, class) in self.classes.iter().enumerate() {
            for (field_idx, field) in class.sfields.iter().enumerate() {
                index.insert(
                    field.token,
                    FieldSlot {
                        class: class_idx,
                        field: field_idx,
                    },
                );
            }
        }
        self.field_index = index;
    }
}
