use std::fmt;

/// A probability as the caller wrote it: a whole number (0 or 1), a real
/// number in [0, 1], or a string like `"3/4"`, `"25%"` or `"%25"`.
///
/// The stateful sampler also uses the (normalized) expression as the key of
/// its history, so two expressions are the same key only if they are equal
/// variant by variant: `Int(1)` and `Real(1.0)` are different keys.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Int(i64),
    Real(f64),
    Text(String),
}

impl Expression {
    /// Trims the whitespace around the `/` or `%` separator of a string
    /// expression, so `" 3 / 4 "` and `"3/4"` are the same history key.
    /// Numeric expressions are returned untouched.
    pub fn normalize(self) -> Self {
        let Expression::Text(text) = self else {
            return self;
        };

        let separator = if text.contains('/') {
            '/'
        } else if text.contains('%') {
            '%'
        } else {
            return Expression::Text(text);
        };

        let parts: Vec<&str> = text.trim().split(separator).map(str::trim).collect();
        Expression::Text(parts.join(&separator.to_string()))
    }

    /// Whether the expression may be stored as a constant: a number in
    /// [0, 1], or a string holding a `%` or a `/`.
    pub(crate) fn is_valid_constant(&self) -> bool {
        match self {
            Expression::Int(value) => (0..=1).contains(value),
            Expression::Real(value) => (0.0..=1.0).contains(value),
            Expression::Text(text) => text.contains('%') || text.contains('/'),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Int(value) => write!(f, "{value}"),
            Expression::Real(value) => write!(f, "{value}"),
            Expression::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::Int(value)
    }
}

impl From<i32> for Expression {
    fn from(value: i32) -> Self {
        Expression::Int(value as i64)
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Real(value)
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::Text(value.to_string())
    }
}

impl From<String> for Expression {
    fn from(value: String) -> Self {
        Expression::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Expression;

    #[test]
    fn test_normalize_ratio() {
        // given
        let expression = Expression::from("  3 /  4 ");

        // when
        let normalized = expression.normalize();

        // then
        assert_eq!(normalized, Expression::from("3/4"));
    }

    #[test]
    fn test_normalize_percent() {
        assert_eq!(Expression::from(" 50 % ").normalize(), Expression::from("50%"));
        assert_eq!(Expression::from("% 50").normalize(), Expression::from("%50"));
    }

    #[test]
    fn test_normalize_keeps_numbers() {
        assert_eq!(Expression::from(0.25).normalize(), Expression::Real(0.25));
        assert_eq!(Expression::from(1).normalize(), Expression::Int(1));
    }

    #[test]
    fn test_normalize_without_separator() {
        assert_eq!(Expression::from(" abc ").normalize(), Expression::from(" abc "));
    }

    #[test]
    fn test_valid_constant() {
        assert!(Expression::from(0).is_valid_constant());
        assert!(Expression::from(0.5).is_valid_constant());
        assert!(Expression::from("1/3").is_valid_constant());
        assert!(Expression::from("10%").is_valid_constant());

        assert!(!Expression::from(2).is_valid_constant());
        assert!(!Expression::from(-0.1).is_valid_constant());
        assert!(!Expression::from(f64::NAN).is_valid_constant());
        assert!(!Expression::from("half").is_valid_constant());
    }

    #[test]
    fn test_display() {
        assert_eq!(Expression::from(1).to_string(), "1");
        assert_eq!(Expression::from(0.25).to_string(), "0.25");
        assert_eq!(Expression::from("3/4").to_string(), "3/4");
    }
}
