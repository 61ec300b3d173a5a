//! Session configuration.

/// Limits and policies of an analysis session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// Nested instantiations (and default-argument normalizations) allowed
    /// before a request becomes `RecursionLimit`.
    pub max_instantiation_depth: u32,
    /// Nested expression evaluations and deductions allowed on one thread.
    pub max_deduction_depth: u32,
    /// Base-class levels searched by member lookup and derived-to-base
    /// conversions.
    pub max_inheritance_depth: u16,
    /// Prefer a non-template over an equally good template.
    pub prefer_non_templates: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_instantiation_depth: 64,
            max_deduction_depth: 512,
            max_inheritance_depth: 32,
            prefer_non_templates: true,
        }
    }
}

impl SessionConfig {
    #[must_use]
    pub fn with_max_instantiation_depth(mut self, depth: u32) -> Self {
        self.max_instantiation_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_deduction_depth(mut self, depth: u32) -> Self {
        self.max_deduction_depth = depth;
        self
    }

    #[must_use]
    pub fn with_max_inheritance_depth(mut self, depth: u16) -> Self {
        self.max_inheritance_depth = depth;
        self
    }

    #[must_use]
    pub fn with_prefer_non_templates(mut self, prefer: bool) -> Self {
        self.prefer_non_templates = prefer;
        self
    }
}
