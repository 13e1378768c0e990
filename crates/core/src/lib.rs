#![warn(clippy::all)]

//! Core state engines for the arcade catalogue.
//!
//! This crate hosts the catalogue model and sources, the selection,
//! view-mode and cabinet economy state machines, the deterministic scheduler
//! that drives their timed behaviour, and the controller that sequences
//! them. Presentation layers read [`AppState`] and call into [`Controller`].

pub mod catalog;
pub mod config;
pub mod controller;
pub mod economy;
pub mod error;
pub mod filter;
pub mod input;
pub mod layout;
pub mod models;
pub mod scheduler;
pub mod selection;
pub mod state;
pub mod view;

pub use catalog::{Catalogue, CatalogueSource};
pub use config::AppConfig;
pub use controller::{Controller, Launcher, PlayOutcome, Prompter};
pub use error::{LoadError, PlayError};
pub use models::Item;
pub use state::{AppState, DisplayState};
pub use view::ViewMode;
