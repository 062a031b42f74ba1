//! Configuration for the final-inline pass.

/// Controls which transformations the pass applies and which members the
/// dead-field sweep may touch.
///
/// The two booleans gate whole transformations; the member lists refine field
/// removal eligibility the same way the host's keep-rule environment does.
#[derive(Debug, Clone)]
pub struct FinalInlineConfig {
    /// Replace constant-only static initialisers with encoded field defaults
    /// (default: true).
    pub replace_encodable_clinits: bool,

    /// Propagate values along static-final-to-static-final initialiser
    /// assignments (default: true).
    pub propagate_static_finals: bool,

    /// Class-name substrings whose classes contribute removal candidates even
    /// when the environment does not mark them deletable.
    pub remove_class_member_prefixes: Vec<String>,

    /// Member names that are never removed, regardless of eligibility.
    pub keep_class_members: Vec<String>,
}

impl Default for FinalInlineConfig {
    fn default() -> Self {
        Self {
            replace_encodable_clinits: true,
            propagate_static_finals: true,
            remove_class_member_prefixes: Vec::new(),
            keep_class_members: Vec::new(),
        }
    }
}

impl FinalInlineConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables encodable-clinit replacement.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_replace_encodable_clinits(mut self, enable: bool) -> Self {
        self.replace_encodable_clinits = enable;
        self
    }

    /// Enables or disables static-final constant propagation.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_propagate_static_finals(mut self, enable: bool) -> Self {
        self.propagate_static_finals = enable;
        self
    }

    /// Sets the class-name substrings that open classes up for member removal.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_remove_class_member_prefixes(
        mut self,
        prefixes: Vec<String>,
    ) -> Self {
        self.remove_class_member_prefixes = prefixes;
        self
    }

    /// Sets the member names that must survive the dead-field sweep.
    ///
    /// # Returns
    ///
    /// The modified configuration (builder pattern).
    #[must_use]
    pub fn with_keep_class_members(mut self, members: Vec<String>) -> Self {
        self.keep_class_members = members;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FinalInlineConfig::default();
        assert!(config.replace_encodable_clinits);
        assert!(config.propagate_static_finals);
        assert!(config.remove_class_member_prefixes.is_empty());
        assert!(config.keep_class_members.is_empty());
    }

    #[test]
    fn test_builder_pattern() {
        let config = FinalInlineConfig::new()
            .with_replace_encodable_clinits(false)
            .with_keep_class_members(vec!["SERIAL_VERSION".to_string()]);

        assert!(!config.replace_encodable_clinits);
        assert!(config.propagate_static_finals);
        assert_eq!(config.keep_class_members, vec!["SERIAL_VERSION"]);
    }
}
