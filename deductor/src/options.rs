/// Settings for constructing a model
///
/// Defaults: 5% relative tolerance, validation enabled, and a pass ceiling far
/// above what any real schema needs.
#[derive(Debug, Clone, PartialEq)]
pub struct DeductionOptions {
    /// Relative tolerance below which two values of the same name agree
    pub rel_tolerance: f64,

    /// Run the schema validators after deduction
    pub validate: bool,

    /// Maximum number of full passes over the rule list
    /// A finite schema converges in at most one pass per name plus one.
    pub max_passes: usize,
}

impl Default for DeductionOptions {
    fn default() -> Self {
        Self {
            rel_tolerance: 0.05,
            validate: true,
            max_passes: 1000,
        }
    }
}

impl DeductionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, rel_tolerance: f64) -> Self {
        self.rel_tolerance = rel_tolerance;
        self
    }

    pub fn without_validation(mut self) -> Self {
        self.validate = false;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }
}
