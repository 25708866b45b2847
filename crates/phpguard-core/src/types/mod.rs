pub mod metadata;
pub mod violation;
