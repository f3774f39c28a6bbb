use std::{fmt, ops::Add, ops::Index, str::FromStr};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    error::ProbError,
    expression::Expression,
    history::History,
    parser::Chance,
    sampler::{Count, Outcome, draw_all, parse_all},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityOptions {
    /// Seed of the instance's random generator. A random one is picked when absent.
    pub seed: Option<u64>,
    pub constant: Option<Expression>,
    pub mutable: bool,
}

impl Default for ProbabilityOptions {
    fn default() -> Self {
        ProbabilityOptions {
            seed: None,
            constant: None,
            mutable: true,
        }
    }
}

impl ProbabilityOptions {
    pub fn parse(&self) -> Result<ProbabilityConfig, ProbError> {
        if let Some(constant) = &self.constant {
            validate_constant(constant)?;
        } else if !self.mutable {
            return Err(ProbError::Constant(
                "An immutable constant must be given a value.".to_string(),
            ));
        }

        Ok(ProbabilityConfig {
            seed: self.seed.unwrap_or_else(|| rand::rng().random()),
            constant: self.constant.clone(),
            mutable: self.mutable,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityConfig {
    pub seed: u64,
    pub constant: Option<Expression>,
    pub mutable: bool,
}

/// A sampler that remembers what it drew.
///
/// Every call to [`Probability::iprob`] appends its outcomes to the
/// instance's [`History`], keyed by the normalized expression, and keeps the
/// outcomes of that call apart for [`Probability::count_values`] with `"last"`.
/// A constant can be stored and is used when no expression is given; once it
/// is set with `mutable = false` it can never change again.
///
/// An instance is not meant to be shared between threads without external
/// synchronization.
#[derive(Debug, Clone)]
pub struct Probability {
    seed: u64,

    /// The default expression used when `iprob` is called without any.
    constant: Option<Expression>,

    /// Whether the constant can still be set.
    mutable: bool,

    /// Whether the most recent `iprob` call fell back to the constant.
    used_constant: bool,

    history: History,

    /// Outcomes of the most recent `iprob` call, one vector per expression.
    /// `None` until the first call.
    last: Option<Vec<Vec<bool>>>,

    rng: ChaCha8Rng,
}

impl Probability {
    pub fn new(options: &ProbabilityOptions) -> Result<Self, ProbError> {
        let config = options.parse()?;
        Ok(Probability::from_config(config))
    }

    pub fn from_config(config: ProbabilityConfig) -> Self {
        tracing::debug!("Probability seed: {}", config.seed);

        Probability {
            seed: config.seed,
            constant: config.constant,
            mutable: config.mutable,
            used_constant: false,
            history: History::new(),
            last: None,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Probability::from_config(ProbabilityConfig {
            seed,
            constant: None,
            mutable: true,
        })
    }

    /// Decide one or more probabilities `num` times each and record the
    /// outcomes. Without expressions the constant is used.
    ///
    /// ```
    /// use probs::{Expression, Probability};
    ///
    /// let mut p = Probability::default();
    /// let outcome = p.iprob([Expression::from("1/1"), Expression::from(0)], 2).unwrap();
    ///
    /// assert_eq!(outcome.flatten(), vec![true, true, false, false]);
    /// assert_eq!(p.history().get(&Expression::from("1/1")), Some(&[true, true][..]));
    /// ```
    pub fn iprob<E, I>(&mut self, expressions: I, num: impl Into<Count>) -> Result<Outcome, ProbError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Expression>,
    {
        let mut expressions: Vec<Expression> = expressions.into_iter().map(Into::into).collect();

        let used_constant = expressions.is_empty();
        if used_constant {
            let constant = self.constant.clone().ok_or_else(|| {
                ProbError::NoValue("No value was given and no constant was set.".to_string())
            })?;
            expressions.push(constant);
        }

        let num = num.into().resolve()?;

        let keys: Vec<Expression> = expressions.into_iter().map(Expression::normalize).collect();
        let chances = parse_all(&keys)?;
        let draws = draw_all(&chances, num, &mut self.rng);

        for (key, outcomes) in keys.iter().zip(&draws) {
            self.history.append(key, outcomes);
        }

        let last: Vec<Vec<bool>> = keys
            .iter()
            .map(|key| self.history.latest(key, num).to_vec())
            .collect();

        tracing::trace!(
            "Recorded {} expression(s) {} time(s) each (constant: {})",
            keys.len(),
            num,
            used_constant
        );

        self.used_constant = used_constant;
        self.last = Some(last.clone());

        Ok(Outcome::shape(last))
    }

    /// Store a constant, used by [`Probability::iprob`] when no expression is
    /// given. With `mutable = false` the constant is frozen for good.
    pub fn set_constant(&mut self, constant: impl Into<Expression>, mutable: bool) -> Result<(), ProbError> {
        let constant = constant.into();
        validate_constant(&constant)?;

        if !self.mutable {
            tracing::warn!("Refused to replace frozen constant {:?}", self.constant);
            return Err(ProbError::ImmutableConstant(
                "The mutable parameter has been set False before. You cannot set a constant again."
                    .to_string(),
            ));
        }

        tracing::debug!("Constant set to {} (mutable: {})", constant, mutable);

        self.constant = Some(constant);
        self.mutable = mutable;

        Ok(())
    }

    /// Drop the whole history. The last outcomes and the constant are kept.
    pub fn clear(&mut self) {
        tracing::debug!("Clearing history of {} expression(s)", self.history.len());
        self.history.clear();
    }

    /// Count the true and false outcomes, either of the whole history
    /// (`"all"`) or of the most recent `iprob` call (`"last"`).
    pub fn count_values(&self, which: &str) -> Result<Tally, ProbError> {
        match which.parse::<Scope>()? {
            Scope::All => Ok(self.history.values().collect()),
            Scope::Last => {
                let last = self.last.as_ref().ok_or_else(|| {
                    ProbError::NotUsed("iprob function must be used at least 1 time before.".to_string())
                })?;

                Ok(last.iter().flatten().copied().collect())
            }
        }
    }

    /// Read the constant and/or the mutable flag. `how` is one of
    /// `"constant&mutable"`, `"mutable&constant"`, `"constant"` or `"mutable"`.
    pub fn get(&self, how: &str) -> Result<Settings, ProbError> {
        let settings = match how.parse::<Selector>()? {
            Selector::ConstantAndMutable | Selector::MutableAndConstant => Settings::Both {
                constant: self.constant.clone(),
                mutable: self.mutable,
            },
            Selector::Constant => Settings::Constant(self.constant.clone()),
            Selector::Mutable => Settings::Mutable(self.mutable),
        };

        Ok(settings)
    }

    /// The numeric value of the constant.
    pub fn value(&self) -> Result<f64, ProbError> {
        let constant = self.constant.as_ref().ok_or_else(|| {
            ProbError::Constant("The constant must be set before.".to_string())
        })?;

        Ok(Chance::parse(constant)?.value())
    }

    pub fn constant(&self) -> Option<&Expression> {
        self.constant.as_ref()
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether the most recent `iprob` call used the constant.
    pub fn used_constant(&self) -> bool {
        self.used_constant
    }
}

impl Default for Probability {
    fn default() -> Self {
        Probability::with_seed(rand::rng().random())
    }
}

fn validate_constant(constant: &Expression) -> Result<(), ProbError> {
    if constant.is_valid_constant() {
        return Ok(());
    }

    let message = match constant {
        Expression::Text(_) => "If the constant parameter was set to str, it must contain '%' or '/'.",
        _ => "The constant parameter must be between 0 and 1.",
    };
    Err(ProbError::Constant(message.to_string()))
}

impl PartialEq for Probability {
    fn eq(&self, other: &Self) -> bool {
        self.constant == other.constant && self.mutable == other.mutable
    }
}

impl fmt::Display for Probability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constant {
            Some(constant) => write!(f, "Probability(constant='{constant}', mutable={})", self.mutable),
            None => write!(f, "Probability(constant='unset', mutable={})", self.mutable),
        }
    }
}

impl TryFrom<&Probability> for f64 {
    type Error = ProbError;

    fn try_from(probability: &Probability) -> Result<Self, Self::Error> {
        probability.value()
    }
}

/// The constant's numeric value truncated toward zero, so only a constant of
/// exactly 1 gives 1.
impl TryFrom<&Probability> for i64 {
    type Error = ProbError;

    fn try_from(probability: &Probability) -> Result<Self, Self::Error> {
        Ok(probability.value()?.trunc() as i64)
    }
}

/// Combine two instances: the constants are summed (capped at 1) and the
/// result stays mutable if either side was. A real sum is rounded to the
/// decimal places of the more precise operand, so `0.1 + 0.2` gives `0.3`
/// and keeps its draw granularity.
impl Add<&Probability> for &Probability {
    type Output = Result<Probability, ProbError>;

    fn add(self, other: &Probability) -> Self::Output {
        let (Some(left), Some(right)) = (&self.constant, &other.constant) else {
            return Err(ProbError::Constant(
                "The objects' constants must be set before.".to_string(),
            ));
        };

        let sum = match (left, right) {
            (Expression::Int(left), Expression::Int(right)) => {
                Expression::Int(left.saturating_add(*right).min(1))
            }
            _ => {
                let (left, right) = (self.value()?, other.value()?);
                let places = decimal_places(left).max(decimal_places(right));
                Expression::Real(round_to(left + right, places).min(1.0))
            }
        };

        let mut result = Probability::default();
        result.set_constant(sum, self.mutable || other.mutable)?;

        Ok(result)
    }
}

fn decimal_places(value: f64) -> usize {
    value
        .to_string()
        .split_once('.')
        .map_or(0, |(_, fraction)| fraction.len())
}

fn round_to(value: f64, places: usize) -> f64 {
    format!("{value:.places$}").parse().unwrap_or(value)
}

/// The outcomes counted by [`Probability::count_values`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub trues: usize,
    pub falses: usize,
}

impl Tally {
    pub fn total(&self) -> usize {
        self.trues + self.falses
    }
}

impl FromIterator<bool> for Tally {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        let mut tally = Tally::default();
        for outcome in iter {
            if outcome {
                tally.trues += 1;
            } else {
                tally.falses += 1;
            }
        }
        tally
    }
}

impl Index<bool> for Tally {
    type Output = usize;

    fn index(&self, outcome: bool) -> &Self::Output {
        if outcome { &self.trues } else { &self.falses }
    }
}

/// What [`Probability::get`] returns.
#[derive(Debug, Clone, PartialEq)]
pub enum Settings {
    Both {
        constant: Option<Expression>,
        mutable: bool,
    },
    Constant(Option<Expression>),
    Mutable(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Selector {
    ConstantAndMutable,
    MutableAndConstant,
    Constant,
    Mutable,
}

impl FromStr for Selector {
    type Err = ProbError;

    fn from_str(how: &str) -> Result<Self, Self::Err> {
        match how {
            "constant&mutable" => Ok(Selector::ConstantAndMutable),
            "mutable&constant" => Ok(Selector::MutableAndConstant),
            "constant" => Ok(Selector::Constant),
            "mutable" => Ok(Selector::Mutable),
            _ => Err(ProbError::InvalidParameterValue(
                "The how parameter can be only 'constant&mutable', 'mutable&constant', 'constant' or 'mutable'."
                    .to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    All,
    Last,
}

impl FromStr for Scope {
    type Err = ProbError;

    fn from_str(which: &str) -> Result<Self, Self::Err> {
        match which {
            "all" => Ok(Scope::All),
            "last" => Ok(Scope::Last),
            _ => Err(ProbError::InvalidParameterValue(
                "The which parameter can be only 'all' or 'last'.".to_string(),
            )),
        }
    }
}
