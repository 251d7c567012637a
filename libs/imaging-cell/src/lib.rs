pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

/// Storage bucket all study images land in.
pub const PACS_BUCKET: &str = "pacs-images";
