//! Exploration of decision trees extracted from document pages.
//!
//! A page's tree arrives once as a [`tree::Graph`]. The user walks it
//! through [`explore::Command`]s, which mutate that page's
//! [`explore::ExplorationState`] and its archive of abandoned branches.
//! Renderers read [`explore::PathView`] and never mutate state themselves.

pub mod config;
pub mod document;
pub mod explore;
pub mod extract;
pub mod tree;
pub mod walker;
