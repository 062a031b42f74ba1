//! The optimization passes.
//!
//! Each pass is a self-contained transformation over the scope. There is one
//! today; the module layout leaves room for the rest of the post-link
//! pipeline to land beside it.

pub mod final_inline;

pub use final_inline::{FinalInlinePass, FinalInlineResult};
