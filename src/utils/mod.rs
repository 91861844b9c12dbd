//! Project-specific utilities live here.

pub mod slug;

pub use slug::generate_slug;
