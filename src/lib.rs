//! pass.in application library
//!
//! Event registration modules, the admission guards they share, demo seed
//! data and the composition root used by the `passin` binaries.

pub mod admission;
pub mod bootstrap;
pub mod modules;
pub mod seed;
pub mod utils;

pub use admission::AdmissionController;
