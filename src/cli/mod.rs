//! Command-line interface utilities and display functions

#![cfg(feature = "std")]

pub mod interface;

pub use interface::*;
