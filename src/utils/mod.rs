//! Utils Module - Constants & Contract Interfaces

pub mod abi;
pub mod constants;

pub use constants::*;
