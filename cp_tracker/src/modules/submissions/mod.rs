pub mod rating;
pub mod reconciler;
pub mod synchronizer;
