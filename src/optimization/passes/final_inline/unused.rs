//! Removal of moved-out static finals nothing references anymore.

use rustc_hash::FxHashSet;

use crate::metadata::{scope::Scope, token::Token};
use crate::optimization::config::FinalInlineConfig;
use crate::optimization::events::EventKind;
use crate::optimization::passes::final_inline::PassContext;
use crate::Result;

/// How a class became eligible to lose members.
#[derive(Clone, Copy, PartialEq)]
enum Eligibility {
    /// The environment marks the class deletable
    Environment,
    /// Only a configured name prefix matched
    NamePrefix,
    /// Not eligible
    No,
}

fn class_eligibility(
    class_name: &str,
    deletable: bool,
    config: &FinalInlineConfig,
) -> Eligibility {
    if deletable {
        return Eligibility::Environment;
    }
    if config
        .remove_class_member_prefixes
        .iter()
        .any(|prefix| class_name.contains(prefix.as_str()))
    {
        return Eligibility::NamePrefix;
    }
    Eligibility::No
}

/// Collects the removal candidates: static finals on eligible classes.
///
/// A field only qualifies with both `static` and `final` set and a value the
/// container can express without it (a non-null encoded default, or any
/// primitive type). Members named in the keep list never qualify, and a
/// class eligible only through a name prefix contributes a field only if the
/// field itself is independently deletable.
fn collect_moveable(scope: &Scope, config: &FinalInlineConfig) -> FxHashSet<Token> {
    let mut moveable = FxHashSet::default();
    for class in scope.classes() {
        let eligibility = class_eligibility(&class.name, class.deletable, config);
        if eligibility == Eligibility::No {
            continue;
        }
        for field in &class.sfields {
            if config.keep_class_members.iter().any(|k| k == &field.name) {
                continue;
            }
            if !(field.access.is_static() && field.access.is_final()) {
                continue;
            }
            if field.default.is_none() && !field.ty.is_primitive() {
                continue;
            }
            if eligibility == Eligibility::NamePrefix && !field.deletable {
                continue;
            }
            moveable.insert(field.token);
        }
    }
    moveable
}

/// Collects every field definition still referenced from any method body.
fn collect_used(scope: &Scope, ctx: &PassContext<'_>) -> FxHashSet<Token> {
    let mut used = FxHashSet::default();
    for method in scope.methods() {
        for (_, insn) in method.code.iter() {
            let Some(fref) = insn.field() else { continue };
            if let Some(token) = ctx.resolver.resolve_static(scope, fref) {
                used.insert(token);
            }
        }
    }
    used
}

/// Removes moveable fields that no surviving code references.
///
/// Method bodies are untouched here; the use-site inliner already erased the
/// reads whose targets become removable.
///
/// # Returns
///
/// The number of field definitions removed.
pub(super) fn remove_unused_fields(
    scope: &mut Scope,
    config: &FinalInlineConfig,
    ctx: &PassContext<'_>,
) -> Result<usize> {
    let moveable = collect_moveable(scope, config);
    if moveable.is_empty() {
        return Ok(0);
    }
    let used = collect_used(scope, ctx);

    let mut dead = FxHashSet::default();
    for token in moveable {
        if !used.contains(&token) {
            if let Some(field) = scope.field(token) {
                ctx.events
                    .record(EventKind::FieldRemoved, token, field.to_string());
            }
            dead.insert(token);
        }
    }

    Ok(scope.remove_fields(&dead))
}
