//! Catalogue storage and acquisition.

/// Immutable working/master item lists with id lookup.
pub mod store;
/// File and HTTP catalogue sources.
pub mod source;

pub use source::CatalogueSource;
pub use store::Catalogue;
