/// CLI Indexes: datasets
pub mod datasets;

/// CLI Indexes: model presets
pub mod models;

pub use datasets::Dataset;
pub use models::Model;
