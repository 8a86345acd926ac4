pub mod common;
pub mod match_item;
pub mod normalize;
pub mod project;
pub mod reconcile;
