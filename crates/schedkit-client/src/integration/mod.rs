pub mod mapping;
pub mod matcher;

pub use mapping::parse_mapping;
pub use matcher::{
    IntegrationMatch, MappingPair, MatchConfidence, annotate_integration_items, fuzzy_score,
    match_integration_item,
};
