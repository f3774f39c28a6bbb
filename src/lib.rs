//! Decisions based on a given probability.
//!
//! A probability is an [`Expression`]: `0` or `1`, a real number in [0, 1]
//! like `0.25`, or a string like `"3/4"`, `"25%"` or `"%25"`. Each draw
//! returns `true` with that probability.
//!
//! * [`prob`] decides one or more expressions `num` times each and keeps no state.
//! * [`Probability`] does the same through [`Probability::iprob`], but it
//!   also records every outcome in a [`History`] keyed by expression, can
//!   count the outcomes of the whole history or of its last call, and holds
//!   an optional constant used when no expression is given.
//!
//! Real numbers are drawn with the granularity of their shortest decimal
//! representation: `0.25` is decided by a uniform draw among 100 values,
//! `0.1` among 10. Strings combining `%` and `/` are reserved and refused.
//!
//! Every expression of a call is validated before anything is drawn, so a
//! failing call has no effect.

pub mod error;
pub mod expression;
pub mod history;
pub mod parser;
pub mod probability;
pub mod sampler;

pub use error::ProbError;
pub use expression::Expression;
pub use history::History;
pub use parser::{Chance, decide};
pub use probability::{Probability, ProbabilityConfig, ProbabilityOptions, Settings, Tally};
pub use sampler::{Count, Outcome, prob, prob_with};
