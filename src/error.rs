use thiserror::Error;

/// Every way a probability call can fail. All of them are caused by the
/// caller's input, none of them are retried internally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbError {
    /// A numeric probability outside of [0, 1], or a whole number other than 0 or 1.
    #[error("{0}")]
    Range(String),
    /// A malformed or unsupported probability string.
    #[error("{0}")]
    TypeFormat(String),
    /// The repeat count is not a positive integer.
    #[error("{0}")]
    Count(String),
    /// No expression was given and no constant is available.
    #[error("{0}")]
    NoValue(String),
    /// The constant is not a number in [0, 1] or a string holding '%' or '/',
    /// or an operation needs a constant that is unset.
    #[error("{0}")]
    Constant(String),
    /// The constant was frozen before and cannot be set again.
    #[error("{0}")]
    ImmutableConstant(String),
    /// A selector string not among the accepted ones.
    #[error("{0}")]
    InvalidParameterValue(String),
    /// Counting the last outcomes before anything was sampled.
    #[error("{0}")]
    NotUsed(String),
}

impl ProbError {
    pub(crate) fn range() -> Self {
        ProbError::Range("The probability of an event must be between 0 and 1.".to_string())
    }

    pub(crate) fn type_format(input: &str) -> Self {
        ProbError::TypeFormat(format!(
            "Unsupported probability format \"{input}\": the value must be an int, a float, or a str like \"n%\" or \"a/b\"."
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::ProbError;

    #[test]
    fn test_message() {
        assert_eq!(
            ProbError::range().to_string(),
            "The probability of an event must be between 0 and 1."
        );
        assert!(ProbError::type_format("3/4%").to_string().contains("\"3/4%\""));
    }
}
