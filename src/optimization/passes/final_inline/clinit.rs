//! Static initialiser analysis: blank-static detection and replacement of
//! constant-only initialisers by encoded field defaults.

use rustc_hash::FxHashSet;

use crate::assembly::{Instruction, Opcode};
use crate::metadata::{class::DexClass, scope::Scope, token::Token, value::EncodedValue};
use crate::optimization::events::EventKind;
use crate::optimization::passes::final_inline::PassContext;
use crate::Result;

/// Finds the fields of `class` written by its own static initialiser.
///
/// There is no marker distinguishing a blank final from one with a stable
/// encoded default, so the initialiser's code is the ground truth: any field
/// of this class it writes has its default (if any) masked at run time.
/// Writes that resolve to another class, or not at all, are ignored.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] if the initialiser is present but
/// lacks the `static` and constructor access bits.
pub(super) fn blank_statics(
    scope: &Scope,
    class: &DexClass,
    ctx: &PassContext<'_>,
) -> Result<FxHashSet<Token>> {
    let mut blank = FxHashSet::default();
    let Some(clinit) = class.clinit() else {
        return Ok(blank);
    };
    if !(clinit.access.is_static() && clinit.access.is_constructor()) {
        return Err(malformed_error!(
            "Static initialiser of {} doesn't have the proper access bits set",
            class.name
        ));
    }

    for (_, insn) in clinit.code.iter() {
        if !(insn.has_field() && insn.opcode.is_sput()) {
            continue;
        }
        let Some(fref) = insn.field() else { continue };
        let Some(token) = ctx.resolver.resolve_static(scope, fref) else {
            continue;
        };
        let Some(field) = scope.field(token) else {
            continue;
        };
        if field.class != class.name {
            continue;
        }
        blank.insert(token);
    }
    Ok(blank)
}

/// A matched (constant load, static write) pair of an encodable initialiser.
struct ConstSput {
    literal: i64,
    target: Token,
}

/// Checks that a constant load's literal can become an encoded value.
///
/// `const/high16` is not in the accepted set: initialisers emitted for
/// constant fields load with `const/4`, `const/16`, or the full-width
/// `const`.
fn valid_const_for_encoding(insn: &Instruction) -> bool {
    matches!(
        insn.opcode,
        Opcode::Const4 | Opcode::Const16 | Opcode::Const
    )
}

/// Resolves a static write to a field declared in `class`, if it is one.
fn sput_target_in_class(
    scope: &Scope,
    class: &DexClass,
    insn: &Instruction,
    ctx: &PassContext<'_>,
) -> Option<Token> {
    if !(insn.has_field() && insn.opcode.is_sput()) {
        return None;
    }
    let token = ctx.resolver.resolve_static(scope, insn.field()?)?;
    let field = scope.field(token)?;
    if field.class != class.name {
        return None;
    }
    Some(token)
}

/// Matches the encodable shape: (const, sput) pairs, then `return-void`.
///
/// Returns the matched pairs in stream order, or `None` when any part of the
/// body deviates from the shape.
fn match_encodable_clinit(
    scope: &Scope,
    class: &DexClass,
    ctx: &PassContext<'_>,
) -> Option<Vec<ConstSput>> {
    let clinit = class.clinit()?;
    let mut pairs = Vec::new();
    let mut cursor = clinit.code.cursor();

    loop {
        let Some((_, first)) = cursor.next() else {
            break;
        };
        let Some((_, second)) = cursor.next() else {
            // An odd-length body is only the trailing terminator.
            if first.opcode == Opcode::ReturnVoid {
                break;
            }
            return None;
        };

        if !valid_const_for_encoding(first) {
            return None;
        }
        let literal = first.literal()?;
        let target = sput_target_in_class(scope, class, second, ctx)?;
        if first.dest.is_none() || first.dest != second.srcs.first().copied() {
            return None;
        }
        pairs.push(ConstSput { literal, target });
    }

    Some(pairs)
}

/// Replaces every encodable static initialiser in the scope.
///
/// For each class, either the initialiser's constants are hoisted into
/// encoded field defaults and the initialiser is removed, or class and
/// initialiser are left untouched. A field written more than once ends up
/// with the last value, as it would at run time.
///
/// # Returns
///
/// The number of initialisers replaced.
pub(super) fn replace_encodable_clinits(
    scope: &mut Scope,
    ctx: &PassContext<'_>,
) -> Result<usize> {
    let mut replaced = 0;

    for class_idx in 0..scope.class_count() {
        let Some(pairs) = ({
            let class = scope.class_at(class_idx);
            if class.clinit().is_none() {
                continue;
            }
            match_encodable_clinit(scope, class, ctx)
        }) else {
            continue;
        };

        for pair in &pairs {
            let Some(field) = scope.field_mut(pair.target) else {
                return Err(crate::Error::FieldNotFound(pair.target));
            };
            let mut value = EncodedValue::zero_for(&field.ty);
            value.set_raw(pair.literal as u64);
            field.make_concrete(field.access, value);
        }

        let class = scope.class_at_mut(class_idx);
        class.remove_clinit();
        ctx.events.record(
            EventKind::ClinitReplaced,
            class.token,
            format!("{} ({} encoded values)", class.name, pairs.len()),
        );
        replaced += 1;
    }

    Ok(replaced)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::metadata::builder::ClassBuilder;
    use crate::metadata::field::FieldRef;
    use crate::metadata::resolver::HierarchyResolver;
    use crate::metadata::types::DexType;
    use crate::optimization::events::EventLog;

    fn run_replacement(scope: &mut Scope) -> Result<usize> {
        let resolver = HierarchyResolver::new();
        let events = EventLog::new();
        let unhandled = AtomicUsize::new(0);
        let ctx = PassContext {
            resolver: &resolver,
            events: &events,
            unhandled: &unhandled,
        };
        replace_encodable_clinits(scope, &ctx)
    }

    fn x_ref() -> FieldRef {
        FieldRef::new("LA;", "X", DexType::Int)
    }

    #[test]
    fn test_single_pair_hoisted() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .clinit(vec![
                        Instruction::const16(0, 7),
                        Instruction::sput(0, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 1);

        let class = scope.class("LA;").unwrap();
        assert!(class.clinit().is_none());
        assert_eq!(class.sfields[0].default, Some(EncodedValue::Int(7)));
    }

    #[test]
    fn test_return_only_clinit_removed() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .clinit(vec![Instruction::return_void()])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 1);
        assert!(scope.class("LA;").unwrap().clinit().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .clinit(vec![
                        Instruction::const16(0, 1),
                        Instruction::sput(0, x_ref()),
                        Instruction::const16(0, 2),
                        Instruction::sput(0, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 1);
        let class = scope.class("LA;").unwrap();
        assert_eq!(class.sfields[0].default, Some(EncodedValue::Int(2)));
    }

    #[test]
    fn test_register_mismatch_rejected() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .clinit(vec![
                        Instruction::const16(0, 7),
                        Instruction::sput(1, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 0);
        let class = scope.class("LA;").unwrap();
        assert!(class.clinit().is_some());
        assert!(class.sfields[0].default.is_none());
    }

    #[test]
    fn test_invoke_makes_clinit_ineligible() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .clinit(vec![
                        Instruction::invoke_static(
                            Vec::new(),
                            crate::metadata::method::MethodRef::new("LB;", "init"),
                        ),
                        Instruction::const16(0, 7),
                        Instruction::sput(0, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 0);
        assert!(scope.class("LA;").unwrap().clinit().is_some());
    }

    #[test]
    fn test_write_to_other_class_rejected() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .build(),
            )
            .unwrap();
        scope
            .add_class(
                ClassBuilder::new("LB;")
                    .clinit(vec![
                        Instruction::const16(0, 7),
                        Instruction::sput(0, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 0);
        assert!(scope.class("LB;").unwrap().clinit().is_some());
    }

    #[test]
    fn test_high16_load_rejected_for_encoding() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .clinit(vec![
                        Instruction::const_load(Opcode::ConstHigh16, 0, 0x10000),
                        Instruction::sput(0, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        assert_eq!(run_replacement(&mut scope).unwrap(), 0);
    }

    #[test]
    fn test_blank_statics_reports_own_class_writes() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.static_final())
                    .sfield("Y", DexType::Int, |f| f.static_final())
                    .clinit(vec![
                        Instruction::const16(0, 7),
                        Instruction::sput(0, x_ref()),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();

        let resolver = HierarchyResolver::new();
        let events = EventLog::new();
        let unhandled = AtomicUsize::new(0);
        let ctx = PassContext {
            resolver: &resolver,
            events: &events,
            unhandled: &unhandled,
        };

        let class = scope.class("LA;").unwrap();
        let blank = blank_statics(&scope, class, &ctx).unwrap();
        let x = class.sfield("X", &DexType::Int).unwrap().token;
        let y = class.sfield("Y", &DexType::Int).unwrap().token;
        assert!(blank.contains(&x));
        assert!(!blank.contains(&y));
    }

    #[test]
    fn test_blank_statics_rejects_bad_access_bits() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .method("<clinit>", |m| {
                        m.access(crate::metadata::access::AccessFlags::STATIC)
                            .code(vec![Instruction::return_void()])
                    })
                    .build(),
            )
            .unwrap();

        let resolver = HierarchyResolver::new();
        let events = EventLog::new();
        let unhandled = AtomicUsize::new(0);
        let ctx = PassContext {
            resolver: &resolver,
            events: &events,
            unhandled: &unhandled,
        };

        let class = scope.class("LA;").unwrap();
        assert!(blank_statics(&scope, class, &ctx).is_err());
    }
}
