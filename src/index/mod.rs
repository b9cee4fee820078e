//! Package index lookups.

pub mod client;
pub mod models;

pub use client::{IndexClient, DEFAULT_INDEX_TIMEOUT, DEFAULT_INDEX_URL};
pub use models::{IndexPackage, PackageDetails, PackageMetadata};
