//! Pkg-ABIdiff library
//!
//! Drives external ABI tools over the shared objects of two package releases:
//! packages are classified and unpacked, descriptors are dumped (and cached),
//! old objects are matched to new ones, pairs are compared and the results are
//! aggregated into package-wide compatibility rates.

pub mod cache;
pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod objects;
pub mod packages;
pub mod pipeline;
pub mod reporters;
pub mod scoring;
pub mod tools;
pub mod workspace;

pub use error::{AbidiffError, AbidiffResult};
