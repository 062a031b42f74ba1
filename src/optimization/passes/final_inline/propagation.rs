//! Transitive constant propagation across static initialisers.
//!
//! Cross-compilation freezing can leave chains like `A.f = B.g` where both
//! sides are `static final` but the source compiler could not see the final
//! value. The chains only exist as (sget, sput) pairs in initialiser code;
//! this stage discovers them, then resolves the resulting dependency graph
//! from the fields whose values are already known.

use std::collections::VecDeque;

use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::assembly::{Instruction, InstructionStream, Opcode, Reg};
use crate::metadata::{scope::Scope, token::Token};
use crate::optimization::events::EventKind;
use crate::optimization::passes::final_inline::{clinit, PassContext};
use crate::Result;

/// One discovered initialiser assignment `src -> dst`.
///
/// Carries the stream positions of the (sget, sput) pair so resolution can
/// delete it without rescanning.
struct FieldDependency {
    class_idx: usize,
    sget_idx: usize,
    sput_idx: usize,
    dst: Token,
}

/// Classifies a static read for propagation.
///
/// Narrow reads qualify; a wide read is counted as an unhandled inline and
/// everything else (including `sget-object`) is silently skipped.
fn check_sget(insn: &Instruction, ctx: &PassContext<'_>) -> bool {
    if insn.opcode == Opcode::SgetWide {
        ctx.unhandled
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        return false;
    }
    insn.opcode.is_narrow_sget()
}

/// Decides whether the pair's register can be dropped from the stream.
///
/// The value loaded by the sget lives in a register that later code might
/// still read; removing the pair is only sound when every instruction after
/// the sput either overwrites the register before reading it or never touches
/// it. An instruction that both reads and writes the register reads the old
/// value, so the read rejects first.
fn src_reg_reused(stream: &InstructionStream, after: usize, reg: Reg) -> bool {
    for (_, later) in stream.iter_from(after) {
        if later.reads_reg(reg) {
            return true;
        }
        if later.writes_reg(reg) {
            return false;
        }
    }
    false
}

/// Scans one class's initialiser for dependency edges.
fn discover_in_class(
    scope: &Scope,
    class_idx: usize,
    ctx: &PassContext<'_>,
) -> Vec<(Token, FieldDependency)> {
    let class = scope.class_at(class_idx);
    let Some(initialiser) = class.clinit() else {
        return Vec::new();
    };

    let mut edges = Vec::new();
    let mut cursor = initialiser.code.cursor();
    while let Some((sget_idx, insn)) = cursor.next() {
        if !(insn.has_field() && check_sget(insn, ctx)) {
            continue;
        }
        let Some(src) = insn
            .field()
            .and_then(|fref| ctx.resolver.resolve_static(scope, fref))
        else {
            continue;
        };
        let Some(src_field) = scope.field(src) else {
            continue;
        };
        if !(src_field.access.is_static() && src_field.access.is_final()) {
            continue;
        }

        let Some((sput_idx, next)) = cursor.peek() else {
            break;
        };
        if !(next.has_field() && next.opcode.is_sput()) {
            continue;
        }
        let Some(dst) = next
            .field()
            .and_then(|fref| ctx.resolver.resolve_static(scope, fref))
        else {
            continue;
        };
        let Some(dst_field) = scope.field(dst) else {
            continue;
        };
        if dst_field.class != class.name
            || !(dst_field.access.is_static() && dst_field.access.is_final())
        {
            continue;
        }

        let Some(reg) = insn.dest else { continue };
        if Some(reg) != next.srcs.first().copied() {
            continue;
        }

        if src_reg_reused(&initialiser.code, sput_idx + 1, reg) {
            ctx.events.record(
                EventKind::PropagationRejected,
                dst,
                format!("{} -> {}: source register reused", src_field, dst_field),
            );
            continue;
        }

        ctx.events.record(
            EventKind::DependencyFound,
            dst,
            format!("{} depends on {}", dst_field, src_field),
        );
        edges.push((
            src,
            FieldDependency {
                class_idx,
                sget_idx,
                sput_idx,
                dst,
            },
        ));
    }
    edges
}

/// Propagates constants along initialiser dependencies.
///
/// Discovery is a read-only per-class scan and fans out; resolution runs the
/// worklist serially. Fields in a dependency cycle are never reachable from
/// the seed set and stay unresolved, which is the intended behaviour.
///
/// # Returns
///
/// The number of fields made concrete.
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`] when an initialiser carries invalid
/// access bits, or when a field on the resolved worklist has lost the value
/// the algorithm already established it must have.
pub(super) fn propagate_constants(scope: &mut Scope, ctx: &PassContext<'_>) -> Result<usize> {
    // Build the dependency map (static -> statics that depend on it).
    let per_class: Vec<Vec<(Token, FieldDependency)>> = (0..scope.class_count())
        .into_par_iter()
        .map(|class_idx| discover_in_class(scope, class_idx, ctx))
        .collect();

    let mut deps: FxHashMap<Token, Vec<FieldDependency>> = FxHashMap::default();
    for (src, dep) in per_class.into_iter().flatten() {
        deps.entry(src).or_default().push(dep);
    }

    // Collect the static finals whose values are already known. These seed
    // the resolution worklist.
    let mut resolved: VecDeque<Token> = VecDeque::new();
    for class in scope.classes() {
        let blank = clinit::blank_statics(scope, class, ctx)?;
        for field in &class.sfields {
            if !(field.access.is_static() && field.access.is_final())
                || blank.contains(&field.token)
                || field.default.is_none()
            {
                continue;
            }
            resolved.push_back(field.token);
        }
    }

    // Resolve dependents in topological order.
    let mut visited: FxHashSet<Token> = FxHashSet::default();
    let mut nresolved = 0;
    while let Some(cur) = resolved.pop_front() {
        let Some(dependents) = deps.remove(&cur) else {
            continue;
        };
        let value = match scope.field(cur).and_then(|f| f.default.clone()) {
            Some(value) => value,
            None => {
                return Err(malformed_error!(
                    "Field {} is on the resolved worklist but has no encoded value",
                    cur
                ))
            }
        };

        for dep in dependents {
            if !visited.insert(dep.dst) {
                // Already made concrete through another source; its pair
                // stays in place and keeps the field blank.
                continue;
            }
            {
                let Some(dst_field) = scope.field_mut(dep.dst) else {
                    return Err(crate::Error::FieldNotFound(dep.dst));
                };
                dst_field.make_concrete(dst_field.access, value.clone());
            }
            if let Some(initialiser) = scope.class_at_mut(dep.class_idx).clinit_mut() {
                initialiser.code.remove(dep.sget_idx);
                initialiser.code.remove(dep.sput_idx);
            }
            nresolved += 1;
            ctx.events.record(
                EventKind::FieldResolved,
                dep.dst,
                format!("= {}", value),
            );
            resolved.push_back(dep.dst);
        }
    }

    // Sweep the tombstones left by pair removal.
    for class in scope.classes_mut() {
        if let Some(initialiser) = class.clinit_mut() {
            initialiser.code.compact();
        }
    }

    Ok(nresolved)
}
