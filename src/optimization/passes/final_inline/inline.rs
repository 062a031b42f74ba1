//! Use-site inlining: rewriting static reads of known constants.

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::assembly::{choose_const_opcode, fits_const16, fits_const_high16, Instruction, Opcode};
use crate::metadata::{scope::Scope, token::Token};
use crate::optimization::events::EventKind;
use crate::optimization::passes::final_inline::{clinit, PassContext};
use crate::Result;

/// A queued rewrite of one static read.
struct Rewrite {
    class_idx: usize,
    method_idx: usize,
    instr_idx: usize,
    target: Token,
    /// Fits a narrow constant encoding
    cheap: bool,
}

/// The fields whose reads may be replaced by constants.
struct InlinableFields {
    inlinable: FxHashSet<Token>,
    cheap: FxHashSet<Token>,
}

/// Collects every static final with a known primitive value.
///
/// A field overwritten by its own initialiser has no stable value and is
/// excluded; so is anything with a reference-typed default. A primitive
/// field without an explicit default has the value zero.
fn collect_inlinable(scope: &Scope, ctx: &PassContext<'_>) -> Result<InlinableFields> {
    let mut fields = InlinableFields {
        inlinable: FxHashSet::default(),
        cheap: FxHashSet::default(),
    };

    for class in scope.classes() {
        let blank = clinit::blank_statics(scope, class, ctx)?;
        for field in &class.sfields {
            if !(field.access.is_static() && field.access.is_final())
                || blank.contains(&field.token)
            {
                continue;
            }
            match &field.default {
                None if !field.ty.is_primitive() => continue,
                Some(value) if !value.is_primitive() => continue,
                _ => {}
            }

            let v = field.default.as_ref().map_or(0, |value| value.raw());
            if fits_const16(v) || fits_const_high16(v) {
                fields.cheap.insert(field.token);
            }
            fields.inlinable.insert(field.token);
        }
    }
    Ok(fields)
}

/// Scans one class's methods for reads of inlinable fields.
fn scan_class(
    scope: &Scope,
    class_idx: usize,
    fields: &InlinableFields,
    ctx: &PassContext<'_>,
) -> Vec<Rewrite> {
    let mut rewrites = Vec::new();
    let class = scope.class_at(class_idx);
    for (method_idx, method) in class.methods.iter().enumerate() {
        for (instr_idx, insn) in method.code.iter() {
            if !(insn.has_field() && insn.opcode.is_static_field_op()) {
                continue;
            }
            let Some(target) = insn
                .field()
                .and_then(|fref| ctx.resolver.resolve_static(scope, fref))
            else {
                continue;
            };
            if !fields.inlinable.contains(&target) {
                continue;
            }
            rewrites.push(Rewrite {
                class_idx,
                method_idx,
                instr_idx,
                target,
                cheap: fields.cheap.contains(&target),
            });
        }
    }
    rewrites
}

/// Triages a queued static op before rewriting.
///
/// Narrow reads go ahead. A wide read is an unhandled inline: counted,
/// preserved, never rewritten. Anything else contradicts what the scan
/// already established about the target field and is input corruption.
fn validate_sget(
    scope: &Scope,
    rewrite: &Rewrite,
    insn: &Instruction,
    ctx: &PassContext<'_>,
) -> Result<bool> {
    if insn.opcode == Opcode::SgetWide {
        ctx.unhandled
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        return Ok(false);
    }
    if insn.opcode.is_narrow_sget() {
        return Ok(true);
    }

    let class = scope.class_at(rewrite.class_idx);
    let method = &class.methods[rewrite.method_idx];
    let field_display = scope
        .field(rewrite.target)
        .map_or_else(|| rewrite.target.to_string(), |f| f.to_string());
    Err(malformed_error!(
        "Unexpected static field op '{}' targeting constant field {} in method {}",
        insn,
        field_display,
        method
    ))
}

/// Rewrites reads of constant-valued static finals to constant loads.
///
/// The scan fans out per class and only collects; rewriting happens
/// afterwards, in source order, so the traversal never observes its own
/// edits. Replacement preserves the destination register and touches no
/// other instruction.
///
/// # Returns
///
/// The number of cheap (narrow-encoding) and simple (full-width) rewrites.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] on corrupt input; see
/// [`validate_sget`].
pub(super) fn inline_field_values(
    scope: &mut Scope,
    ctx: &PassContext<'_>,
) -> Result<(usize, usize)> {
    let fields = collect_inlinable(scope, ctx)?;

    let per_class: Vec<Vec<Rewrite>> = (0..scope.class_count())
        .into_par_iter()
        .map(|class_idx| scan_class(scope, class_idx, &fields, ctx))
        .collect();

    let mut cheap_count = 0;
    let mut simple_count = 0;
    for rewrite in per_class.into_iter().flatten() {
        let Some(field) = scope.field(rewrite.target) else {
            return Err(crate::Error::FieldNotFound(rewrite.target));
        };
        let v = field.default.as_ref().map_or(0, |value| value.raw());
        let field_token = field.token;

        let class = scope.class_at(rewrite.class_idx);
        let insn = match class.methods[rewrite.method_idx].code.get(rewrite.instr_idx) {
            Some(insn) => insn,
            None => continue,
        };
        if !validate_sget(scope, &rewrite, insn, ctx)? {
            continue;
        }
        let Some(dest) = insn.dest else {
            return Err(malformed_error!(
                "Static read '{}' in {} carries no destination register",
                insn,
                class.methods[rewrite.method_idx]
            ));
        };

        let literal = i64::from(v as u32);
        let replacement = if rewrite.cheap {
            let opcode = choose_const_opcode(literal as u64);
            if opcode == Opcode::Const {
                return Err(malformed_error!(
                    "Cheap rewrite queued for {} but {:#x} fits neither const/16 nor const/high16",
                    field_token,
                    v
                ));
            }
            cheap_count += 1;
            Instruction::const_load(opcode, dest, literal)
        } else {
            simple_count += 1;
            Instruction::const32(dest, literal)
        };

        ctx.events.record(
            EventKind::SgetInlined,
            field_token,
            format!("{} -> '{}'", insn, replacement),
        );
        scope
            .class_at_mut(rewrite.class_idx)
            .methods[rewrite.method_idx]
            .code
            .replace(rewrite.instr_idx, replacement);
    }

    Ok((cheap_count, simple_count))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::metadata::builder::ClassBuilder;
    use crate::metadata::field::FieldRef;
    use crate::metadata::resolver::HierarchyResolver;
    use crate::metadata::types::DexType;
    use crate::metadata::value::EncodedValue;
    use crate::optimization::events::EventLog;

    struct Harness {
        resolver: HierarchyResolver,
        events: EventLog,
        unhandled: AtomicUsize,
    }

    impl Harness {
        fn new() -> Self {
            Harness {
                resolver: HierarchyResolver::new(),
                events: EventLog::new(),
                unhandled: AtomicUsize::new(0),
            }
        }

        fn run(&self, scope: &mut Scope) -> Result<(usize, usize)> {
            let ctx = PassContext {
                resolver: &self.resolver,
                events: &self.events,
                unhandled: &self.unhandled,
            };
            inline_field_values(scope, &ctx)
        }
    }

    /// `LA;` declaring one constant, `LUser;` reading it into v2.
    fn scope_with_reader(value: EncodedValue, ty: DexType, read_op: Opcode) -> Scope {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", ty.clone(), |f| f.static_final().value(value))
                    .build(),
            )
            .unwrap();
        scope
            .add_class(
                ClassBuilder::new("LUser;")
                    .method("read", |m| {
                        m.code(vec![
                            Instruction::sget_op(read_op, 2, FieldRef::new("LA;", "X", ty)),
                            Instruction::return_void(),
                        ])
                    })
                    .build(),
            )
            .unwrap();
        scope
    }

    fn rewritten(scope: &Scope) -> Instruction {
        scope.class("LUser;").unwrap().methods[0]
            .code
            .get(0)
            .unwrap()
            .clone()
    }

    #[test]
    fn test_small_value_uses_const16() {
        let mut scope = scope_with_reader(EncodedValue::Int(7), DexType::Int, Opcode::Sget);
        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (1, 0));

        let insn = rewritten(&scope);
        assert_eq!(insn.opcode, Opcode::Const16);
        assert_eq!(insn.dest, Some(2));
        assert_eq!(insn.literal(), Some(7));
    }

    #[test]
    fn test_high_value_uses_const_high16() {
        let mut scope = scope_with_reader(
            EncodedValue::Int(0x1000_0000),
            DexType::Int,
            Opcode::Sget,
        );
        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (1, 0));

        let insn = rewritten(&scope);
        assert_eq!(insn.opcode, Opcode::ConstHigh16);
        assert_eq!(insn.literal(), Some(0x1000_0000));
    }

    #[test]
    fn test_full_width_value_uses_const() {
        let mut scope = scope_with_reader(
            EncodedValue::Int(0x1234_5678),
            DexType::Int,
            Opcode::Sget,
        );
        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (0, 1));

        let insn = rewritten(&scope);
        assert_eq!(insn.opcode, Opcode::Const);
        assert_eq!(insn.literal(), Some(0x1234_5678));
    }

    #[test]
    fn test_missing_default_inlines_zero() {
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
                ClassBuilder::new("LUser;")
                    .method("read", |m| {
                        m.code(vec![
                            Instruction::sget(0, FieldRef::new("LA;", "X", DexType::Int)),
                            Instruction::return_void(),
                        ])
                    })
                    .build(),
            )
            .unwrap();

        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (1, 0));
        assert_eq!(rewritten(&scope).literal(), Some(0));
    }

    #[test]
    fn test_wide_sget_left_alone() {
        let mut scope = scope_with_reader(
            EncodedValue::Long(7),
            DexType::Long,
            Opcode::SgetWide,
        );
        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (0, 0));
        assert_eq!(harness.unhandled.load(Ordering::Relaxed), 1);
        assert_eq!(rewritten(&scope).opcode, Opcode::SgetWide);
    }

    #[test]
    fn test_blank_static_not_inlined() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| {
                        f.static_final().value(EncodedValue::Int(7))
                    })
                    .clinit(vec![
                        Instruction::const16(0, 9),
                        Instruction::sput(0, FieldRef::new("LA;", "X", DexType::Int)),
                        Instruction::return_void(),
                    ])
                    .build(),
            )
            .unwrap();
        scope
            .add_class(
                ClassBuilder::new("LUser;")
                    .method("read", |m| {
                        m.code(vec![
                            Instruction::sget(0, FieldRef::new("LA;", "X", DexType::Int)),
                            Instruction::return_void(),
                        ])
                    })
                    .build(),
            )
            .unwrap();

        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (0, 0));
        assert_eq!(rewritten(&scope).opcode, Opcode::Sget);
    }

    #[test]
    fn test_non_final_not_inlined() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| f.value(EncodedValue::Int(7)))
                    .build(),
            )
            .unwrap();
        scope
            .add_class(
                ClassBuilder::new("LUser;")
                    .method("read", |m| {
                        m.code(vec![
                            Instruction::sget(0, FieldRef::new("LA;", "X", DexType::Int)),
                            Instruction::return_void(),
                        ])
                    })
                    .build(),
            )
            .unwrap();

        let harness = Harness::new();
        assert_eq!(harness.run(&mut scope).unwrap(), (0, 0));
    }

    #[test]
    fn test_cross_class_write_is_corruption() {
        let mut scope = Scope::new();
        scope
            .add_class(
                ClassBuilder::new("LA;")
                    .sfield("X", DexType::Int, |f| {
                        f.static_final().value(EncodedValue::Int(7))
                    })
                    .build(),
            )
            .unwrap();
        scope
            .add_class(
                ClassBuilder::new("LEvil;")
                    .method("poke", |m| {
                        m.code(vec![
                            Instruction::const16(0, 1),
                            Instruction::sput(0, FieldRef::new("LA;", "X", DexType::Int)),
                            Instruction::return_void(),
                        ])
                    })
                    .build(),
            )
            .unwrap();

        let harness = Harness::new();
        assert!(harness.run(&mut scope).is_err());
    }
}
