//! Final static field inlining and constant propagation.
//!
//! The pass runs four transformations over one shared view of the scope, in
//! an order chosen so each stage exposes work to the next:
//!
//! 1. **Encodable-clinit replacement** - static initialisers whose body is a
//!    sequence of (constant load, static write) pairs become encoded field
//!    defaults and are deleted.
//! 2. **Constant propagation** - values flow along `static final` to
//!    `static final` initialiser assignments, resolved in dependency order.
//! 3. **Encodable-clinit replacement, again** - propagation empties or
//!    simplifies initialisers, making more of them encodable.
//! 4. **Use-site inlining** - reads of fields with known constant values are
//!    rewritten to the narrowest fitting constant load.
//! 5. **Dead-field removal** - fields nothing references anymore are dropped.
//!
//! The transformations are single-threaded in effect; dependency discovery
//! and the use-site scan internally fan out per class and batch their edits,
//! which are then applied serially in source order.

mod clinit;
mod inline;
mod propagation;
mod unused;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::metadata::{
    resolver::{FieldResolver, HierarchyResolver},
    scope::Scope,
};
use crate::optimization::{config::FinalInlineConfig, events::EventLog, metrics::PassMetrics};
use crate::Result;

/// Shared state the pass stages operate against.
pub(crate) struct PassContext<'a> {
    /// Reference-to-definition resolution, injected by the host
    pub resolver: &'a dyn FieldResolver,
    /// Diagnostic event sink
    pub events: &'a EventLog,
    /// Count of wide static reads the pass refused to inline
    pub unhandled: &'a AtomicUsize,
}

/// Outcome of one pass run: the counter mapping plus the event log.
#[derive(Debug)]
pub struct FinalInlineResult {
    /// Counters, at minimum `encodable_clinits_replaced` and
    /// `static_finals_resolved`
    pub metrics: PassMetrics,
    /// Everything the run did and declined to do
    pub events: EventLog,
}

impl FinalInlineResult {
    /// Renders a one-line digest of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        self.metrics.summary()
    }
}

/// The final-inline pass.
///
/// # Examples
///
/// ```rust
/// use dexlift::prelude::*;
///
/// let mut scope = Scope::new();
/// scope.add_class(
///     ClassBuilder::new("LA;")
///         .sfield("X", DexType::Int, |f| f.static_final())
///         .clinit(vec![
///             Instruction::const16(0, 7),
///             Instruction::sput(0, FieldRef::new("LA;", "X", DexType::Int)),
///             Instruction::return_void(),
///         ])
///         .build(),
/// )?;
///
/// let pass = FinalInlinePass::new(FinalInlineConfig::default());
/// let result = pass.run(&mut scope)?;
/// assert_eq!(result.metrics.get("encodable_clinits_replaced"), 1);
/// # Ok::<(), dexlift::Error>(())
/// ```
pub struct FinalInlinePass {
    config: FinalInlineConfig,
    resolver: Arc<dyn FieldResolver>,
}

impl FinalInlinePass {
    /// Creates the pass with the default hierarchy resolver.
    #[must_use]
    pub fn new(config: FinalInlineConfig) -> Self {
        Self::with_resolver(config, Arc::new(HierarchyResolver::new()))
    }

    /// Creates the pass with a host-supplied resolver.
    #[must_use]
    pub fn with_resolver(config: FinalInlineConfig, resolver: Arc<dyn FieldResolver>) -> Self {
        FinalInlinePass { config, resolver }
    }

    /// Runs the pass over the scope, mutating it in place.
    ///
    /// # Returns
    ///
    /// The metrics and event log of the run.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] on corrupt input: a static
    /// initialiser without the `static` and constructor access bits, or a
    /// static field op the inliner has established must be a narrow read but
    /// is not. The scope may be partially transformed when this happens;
    /// every applied transformation is still semantics-preserving.
    pub fn run(&self, scope: &mut Scope) -> Result<FinalInlineResult> {
        let events = EventLog::new();
        let unhandled = AtomicUsize::new(0);
        let mut metrics = PassMetrics::new();

        {
            let ctx = PassContext {
                resolver: &*self.resolver,
                events: &events,
                unhandled: &unhandled,
            };

            if self.config.replace_encodable_clinits {
                let replaced = clinit::replace_encodable_clinits(scope, &ctx)?;
                metrics.incr("encodable_clinits_replaced", replaced);
            }

            if self.config.propagate_static_finals {
                let resolved = propagation::propagate_constants(scope, &ctx)?;
                metrics.incr("static_finals_resolved", resolved);
            }

            // Propagation may resolve statics that were initialised via the
            // clinit, leaving (potentially empty) initialisers that are now
            // encodable. Run the replacement again to pick those up.
            if self.config.replace_encodable_clinits {
                let replaced = clinit::replace_encodable_clinits(scope, &ctx)?;
                metrics.incr("encodable_clinits_replaced", replaced);
            }

            let (cheap, simple) = inline::inline_field_values(scope, &ctx)?;
            metrics.incr("sgets_inlined_cheap", cheap);
            metrics.incr("sgets_inlined_simple", simple);

            let removed = unused::remove_unused_fields(scope, &self.config, &ctx)?;
            metrics.incr("unused_fields_removed", removed);
        }

        metrics.incr("unhandled_wide_sgets", unhandled.load(Ordering::Relaxed));
        Ok(FinalInlineResult { metrics, events })
    }
}
