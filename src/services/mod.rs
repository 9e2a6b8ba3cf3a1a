pub mod apriori;
pub mod recommendations;
pub mod rules;
pub mod scoring;
pub mod transactions;
pub mod variants;

pub use recommendations::{RecommendationEngine, RecommendationQuery};
pub use rules::MiningSettings;
pub use scoring::ScorerSet;
pub use variants::VariantComposer;
