pub mod rules;
pub mod verdict;
pub mod weighted;

pub use rules::{evaluate_rules, RuleOutcome};
pub use verdict::{assemble_reasons, combine_scores, verdict_for};
pub use weighted::{score_features, WeightedScore};
