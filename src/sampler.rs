use rand::Rng;

use crate::{error::ProbError, expression::Expression, parser::Chance};

/// How many times each expression is drawn. Whole-valued reals are
/// accepted and coerced, anything below one is refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Count {
    Whole(i64),
    Real(f64),
}

impl Count {
    pub(crate) fn resolve(self) -> Result<usize, ProbError> {
        let whole = match self {
            Count::Whole(value) => value,
            Count::Real(value) if value.is_finite() && value.fract() == 0.0 => value as i64,
            Count::Real(_) => {
                return Err(ProbError::Count(
                    "The num parameter must be int and at least one.".to_string(),
                ));
            }
        };

        if whole < 1 {
            return Err(ProbError::Count(
                "The num parameter must be at least one.".to_string(),
            ));
        }

        usize::try_from(whole)
            .map_err(|_| ProbError::Count("The num parameter is too large.".to_string()))
    }
}

impl Default for Count {
    fn default() -> Self {
        Count::Whole(1)
    }
}

impl From<i64> for Count {
    fn from(value: i64) -> Self {
        Count::Whole(value)
    }
}

impl From<i32> for Count {
    fn from(value: i32) -> Self {
        Count::Whole(value as i64)
    }
}

impl From<usize> for Count {
    fn from(value: usize) -> Self {
        Count::Whole(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Count {
    fn from(value: f64) -> Self {
        Count::Real(value)
    }
}

/// The result of a sampling call. Its shape follows the call: a single
/// boolean for one expression drawn once, a sequence for one expression
/// drawn several times, and one result per expression otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Single(bool),
    Sequence(Vec<bool>),
    PerExpression(Vec<Outcome>),
}

impl Outcome {
    /// Shape the draws of a call, one vector of draws per expression.
    pub(crate) fn shape(mut draws: Vec<Vec<bool>>) -> Outcome {
        if draws.len() == 1 {
            return Outcome::for_expression(draws.remove(0));
        }

        Outcome::PerExpression(draws.into_iter().map(Outcome::for_expression).collect())
    }

    fn for_expression(draws: Vec<bool>) -> Outcome {
        if draws.len() == 1 {
            Outcome::Single(draws[0])
        } else {
            Outcome::Sequence(draws)
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Outcome::Single(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[bool]> {
        match self {
            Outcome::Sequence(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_per_expression(&self) -> Option<&[Outcome]> {
        match self {
            Outcome::PerExpression(outcomes) => Some(outcomes.as_slice()),
            _ => None,
        }
    }

    /// Amount of results at the top level: 1 for a single boolean, the
    /// amount of draws for a sequence, the amount of expressions otherwise.
    pub fn len(&self) -> usize {
        match self {
            Outcome::Single(_) => 1,
            Outcome::Sequence(values) => values.len(),
            Outcome::PerExpression(outcomes) => outcomes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every drawn boolean, in call order.
    pub fn flatten(&self) -> Vec<bool> {
        match self {
            Outcome::Single(value) => vec![*value],
            Outcome::Sequence(values) => values.clone(),
            Outcome::PerExpression(outcomes) => outcomes.iter().flat_map(Outcome::flatten).collect(),
        }
    }
}

/// Validate every expression up front, so a failing call draws nothing.
pub(crate) fn parse_all(expressions: &[Expression]) -> Result<Vec<Chance>, ProbError> {
    expressions.iter().map(Chance::parse).collect()
}

pub(crate) fn draw_all<R: Rng + ?Sized>(chances: &[Chance], num: usize, rng: &mut R) -> Vec<Vec<bool>> {
    chances
        .iter()
        .map(|chance| (0..num).map(|_| chance.draw(rng)).collect())
        .collect()
}

/// Decide one or more probabilities `num` times each, using the thread
/// local random generator. Nothing is remembered between calls.
///
/// ```
/// use probs::{Expression, Outcome, prob};
///
/// assert_eq!(prob([1], 1).unwrap(), Outcome::Single(true));
/// assert_eq!(prob(["0%"], 3).unwrap(), Outcome::Sequence(vec![false; 3]));
///
/// let mixed = prob([Expression::from(0), Expression::from("1/1")], 1).unwrap();
/// assert_eq!(mixed.flatten(), vec![false, true]);
/// ```
pub fn prob<E, I>(expressions: I, num: impl Into<Count>) -> Result<Outcome, ProbError>
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    prob_with(&mut rand::rng(), expressions, num)
}

/// Same as [`prob`], drawing from the given random generator.
pub fn prob_with<R, E, I>(rng: &mut R, expressions: I, num: impl Into<Count>) -> Result<Outcome, ProbError>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    let num = num.into().resolve()?;

    let expressions: Vec<Expression> = expressions.into_iter().map(Into::into).collect();
    if expressions.is_empty() {
        return Err(ProbError::NoValue("No value was given.".to_string()));
    }

    let chances = parse_all(&expressions)?;
    let draws = draw_all(&chances, num, rng);

    tracing::trace!(
        "Sampled {} expression(s) {} time(s) each",
        expressions.len(),
        num
    );

    Ok(Outcome::shape(draws))
}
