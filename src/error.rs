use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, covering every failure this library can surface.
///
/// The optimization passes treat their input as an already-verified class
/// bundle. Conditions that contradict that assumption (an initialiser without
/// the `static` and constructor bits, a static op queued for rewriting whose
/// shape the inliner cannot handle) are input corruption and abort the pass;
/// everything else is at worst a missed optimization and never an error.
///
/// # Examples
///
/// ```rust
/// use dexlift::{Error, FinalInlineConfig, FinalInlinePass, Scope};
///
/// let mut scope = Scope::new();
/// let pass = FinalInlinePass::new(FinalInlineConfig::default());
/// match pass.run(&mut scope) {
///     Ok(result) => println!("{}", result.metrics.summary()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("corrupt input: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class bundle is corrupt and the pass cannot continue.
    ///
    /// Carries the source location where the corruption was detected, plus a
    /// message naming the offending class, method, or field.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A token did not resolve to a definition the scope knows about.
    ///
    /// Raised when a pass holds a token it previously resolved and the
    /// definition has since vanished, which only happens on corrupt input or
    /// a bug in the caller's scope construction.
    #[error("Failed to find field definition in scope - {0}")]
    FieldNotFound(Token),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}
