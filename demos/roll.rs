use clap::Parser;
use probs::{Expression, Probability, ProbabilityOptions};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Probabilities to decide, e.g. 0.25, 1, "3/4" or "25%".
    expressions: Vec<String>,

    #[arg(short, long, default_value_t = 1)]
    num: i64,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Constant used when no expression is given.
    #[arg(short, long)]
    constant: Option<String>,
}

/// Numbers are read as numbers, anything else is kept as a string expression.
fn to_expression(raw: &str) -> Expression {
    if let Ok(whole) = raw.parse::<i64>() {
        return Expression::Int(whole);
    }

    if let Ok(real) = raw.parse::<f64>() {
        return Expression::Real(real);
    }

    Expression::from(raw)
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let options = ProbabilityOptions {
        seed: args.seed,
        constant: args.constant.as_deref().map(to_expression),
        mutable: true,
    };

    let mut probability = match Probability::new(&options) {
        Ok(probability) => probability,
        Err(err) => {
            tracing::error!("Invalid options: {}", err);
            return;
        }
    };

    tracing::info!("Seed: {}", probability.seed());

    let expressions: Vec<Expression> = args.expressions.iter().map(|raw| to_expression(raw)).collect();

    match probability.iprob(expressions, args.num) {
        Ok(outcome) => println!("{outcome:?}"),
        Err(err) => {
            tracing::error!("Error while sampling: {}", err);
            return;
        }
    }

    for (expression, outcomes) in probability.history().iter() {
        println!("{expression}: {outcomes:?}");
    }

    match probability.count_values("all") {
        Ok(tally) => println!("true: {}, false: {}", tally.trues, tally.falses),
        Err(err) => tracing::error!("Error while counting: {}", err),
    }
}
