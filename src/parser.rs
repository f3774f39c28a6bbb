use rand::Rng;

use crate::{error::ProbError, expression::Expression};

/// A validated probability, ready to be drawn from.
#[derive(Debug, Clone, PartialEq)]
pub enum Chance {
    /// 0 or 1: no randomness involved.
    Certain(bool),

    /// A real number strictly between 0 and 1. `digits` are the fractional
    /// digits of its shortest decimal representation, which also define the
    /// granularity of the draw.
    Decimal { value: f64, digits: Vec<u8> },

    /// `numerator` out of `denominator`.
    Ratio { numerator: u64, denominator: u64 },
}

impl Chance {
    pub fn parse(expression: &Expression) -> Result<Chance, ProbError> {
        match expression {
            Expression::Int(value) => parse_whole(*value),
            Expression::Real(value) => parse_real(*value),
            Expression::Text(text) => parse_text(text),
        }
    }

    /// Take one fresh draw and decide the outcome.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        match self {
            Chance::Certain(outcome) => *outcome,
            Chance::Decimal { digits, .. } => draw_decimal(digits, rng),
            Chance::Ratio {
                numerator,
                denominator,
            } => *numerator >= rng.random_range(1..=*denominator),
        }
    }

    /// The numeric probability, used when constants are added together.
    pub fn value(&self) -> f64 {
        match self {
            Chance::Certain(true) => 1.0,
            Chance::Certain(false) => 0.0,
            Chance::Decimal { value, .. } => *value,
            Chance::Ratio {
                numerator,
                denominator,
            } => *numerator as f64 / *denominator as f64,
        }
    }
}

/// Parse an expression and take a single draw from it.
pub fn decide<R: Rng + ?Sized>(expression: &Expression, rng: &mut R) -> Result<bool, ProbError> {
    let chance = Chance::parse(expression)?;
    Ok(chance.draw(rng))
}

fn parse_whole(value: i64) -> Result<Chance, ProbError> {
    match value {
        0 => Ok(Chance::Certain(false)),
        1 => Ok(Chance::Certain(true)),
        _ => Err(ProbError::range()),
    }
}

fn parse_real(value: f64) -> Result<Chance, ProbError> {
    if !value.is_finite() {
        return Err(ProbError::range());
    }

    if value.fract() == 0.0 {
        return parse_whole(value as i64);
    }

    if value < 0.0 || value > 1.0 {
        return Err(ProbError::range());
    }

    // `Display` for f64 prints the shortest representation that round-trips,
    // never in exponent form.
    let printed = value.to_string();
    let Some((_, fraction)) = printed.split_once('.') else {
        return Err(ProbError::range());
    };

    let digits = fraction.bytes().map(|digit| digit - b'0').collect();
    Ok(Chance::Decimal { value, digits })
}

fn parse_text(text: &str) -> Result<Chance, ProbError> {
    let has_percent = text.contains('%');
    let has_slash = text.contains('/');

    if has_percent && has_slash {
        // Combined formats are reserved.
        return Err(ProbError::type_format(text));
    }

    if has_percent {
        return parse_percent(text);
    }

    if has_slash {
        return parse_ratio(text);
    }

    Err(ProbError::type_format(text))
}

fn parse_percent(text: &str) -> Result<Chance, ProbError> {
    let trimmed = text.trim();
    let number = trimmed
        .strip_prefix('%')
        .or_else(|| trimmed.strip_suffix('%'))
        .filter(|rest| !rest.contains('%'))
        .ok_or_else(|| ProbError::type_format(text))?;

    let percent: i64 = number
        .trim()
        .parse()
        .map_err(|_| ProbError::type_format(text))?;

    parse_real(percent as f64 / 100.0)
}

fn parse_ratio(text: &str) -> Result<Chance, ProbError> {
    let Some((numerator, denominator)) = text.split_once('/') else {
        return Err(ProbError::type_format(text));
    };

    let numerator: i64 = numerator
        .trim()
        .parse()
        .map_err(|_| ProbError::type_format(text))?;
    let denominator: i64 = denominator
        .trim()
        .parse()
        .map_err(|_| ProbError::type_format(text))?;

    if numerator < 0 || denominator < 1 {
        return Err(ProbError::range());
    }

    Ok(Chance::Ratio {
        numerator: numerator as u64,
        denominator: denominator as u64,
    })
}

/// Uniformly draws `r` in [0, 10^d) one decimal digit at a time and returns
/// `r < f`, where `f` is the integer spelled by `digits`. This is the same
/// as drawing in [1, 10^d] and checking `f >= draw`, for any `d`.
fn draw_decimal<R: Rng + ?Sized>(digits: &[u8], rng: &mut R) -> bool {
    for &digit in digits {
        let drawn: u8 = rng.random_range(0..10);
        if drawn != digit {
            return drawn < digit;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::{Chance, decide};
    use crate::{error::ProbError, expression::Expression};

    fn true_rate(chance: &Chance, draws: usize) -> f64 {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let trues = (0..draws).filter(|_| chance.draw(&mut rng)).count();
        trues as f64 / draws as f64
    }

    #[test]
    fn test_whole_numbers() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        for _ in 0..100 {
            assert_eq!(decide(&Expression::from(0), &mut rng), Ok(false));
            assert_eq!(decide(&Expression::from(1), &mut rng), Ok(true));
            assert_eq!(decide(&Expression::from(0.0), &mut rng), Ok(false));
            assert_eq!(decide(&Expression::from(1.0), &mut rng), Ok(true));
        }
    }

    #[test]
    fn test_whole_numbers_out_of_range() {
        for value in [-3, -1, 2, 10, i64::MAX] {
            let err = Chance::parse(&Expression::from(value)).unwrap_err();
            assert!(matches!(err, ProbError::Range(_)));
        }

        for value in [2.0, -1.0, 1.5, -0.5, f64::NAN, f64::INFINITY] {
            let err = Chance::parse(&Expression::from(value)).unwrap_err();
            assert!(matches!(err, ProbError::Range(_)));
        }
    }

    #[test]
    fn test_decimal_digits() {
        // given
        let expressions = [(0.25, vec![2, 5]), (0.1, vec![1]), (0.10, vec![1]), (0.05, vec![0, 5])];

        for (value, expected) in expressions {
            // when
            let chance = Chance::parse(&Expression::from(value)).unwrap();

            // then
            assert_eq!(
                chance,
                Chance::Decimal {
                    value,
                    digits: expected
                }
            );
        }
    }

    #[test]
    fn test_tiny_decimal_is_exact() {
        let chance = Chance::parse(&Expression::from(1e-30)).unwrap();
        let Chance::Decimal { digits, .. } = &chance else {
            panic!("Expected a decimal chance");
        };

        assert_eq!(digits.len(), 30);
        assert_eq!(true_rate(&chance, 1000), 0.0);
    }

    #[test]
    fn test_decimal_converges() {
        for value in [0.5, 0.25, 0.9] {
            let chance = Chance::parse(&Expression::from(value)).unwrap();
            let rate = true_rate(&chance, 10_000);

            assert!((rate - value).abs() < 0.03, "rate {rate} for {value}");
        }
    }

    #[test]
    fn test_ratio_converges() {
        let chance = Chance::parse(&Expression::from("3/4")).unwrap();
        let rate = true_rate(&chance, 10_000);

        assert!((rate - 0.75).abs() < 0.03, "rate {rate}");
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(true_rate(&Chance::parse(&Expression::from("0/5")).unwrap(), 500), 0.0);
        assert_eq!(true_rate(&Chance::parse(&Expression::from("5/5")).unwrap(), 500), 1.0);
        assert_eq!(true_rate(&Chance::parse(&Expression::from("7/5")).unwrap(), 500), 1.0);

        let err = Chance::parse(&Expression::from("1/0")).unwrap_err();
        assert!(matches!(err, ProbError::Range(_)));

        let err = Chance::parse(&Expression::from("-1/4")).unwrap_err();
        assert!(matches!(err, ProbError::Range(_)));
    }

    #[test]
    fn test_percent_sign_position() {
        let trailing = Chance::parse(&Expression::from("50%")).unwrap();
        let leading = Chance::parse(&Expression::from("%50")).unwrap();

        assert_eq!(trailing, leading);
        assert_eq!(trailing.value(), 0.5);
    }

    #[test]
    fn test_percent_edges() {
        assert_eq!(
            Chance::parse(&Expression::from("0%")).unwrap(),
            Chance::Certain(false)
        );
        assert_eq!(
            Chance::parse(&Expression::from("100%")).unwrap(),
            Chance::Certain(true)
        );
        assert!(matches!(
            Chance::parse(&Expression::from("101%")).unwrap_err(),
            ProbError::Range(_)
        ));
        assert!(matches!(
            Chance::parse(&Expression::from("-5%")).unwrap_err(),
            ProbError::Range(_)
        ));
    }

    #[test]
    fn test_malformed_strings() {
        for text in ["3/4%", "%1/2", "half", "", "5%0", "%%5", "a%", "1/b", "1/2/3", "0.5"] {
            let err = Chance::parse(&Expression::from(text)).unwrap_err();
            assert!(matches!(err, ProbError::TypeFormat(_)), "{text}: {err:?}");
        }
    }

    #[test]
    fn test_value() {
        assert_eq!(Chance::parse(&Expression::from("1/4")).unwrap().value(), 0.25);
        assert_eq!(Chance::parse(&Expression::from(0.3)).unwrap().value(), 0.3);
        assert_eq!(Chance::parse(&Expression::from(1)).unwrap().value(), 1.0);
    }
}
