/// Errors raised while configuring an operator algebra.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum AlgebraError {
    #[error("[DOP001] generator name '{name}' is not an identifier")]
    InvalidGeneratorName { name: String },
    #[error("[DOP002] base variable and derivation are both named '{name}'")]
    GeneratorNameClash { name: String },
}

impl AlgebraError {
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidGeneratorName { .. } => "DOP001",
            Self::GeneratorNameClash { .. } => "DOP002",
        }
    }
}
