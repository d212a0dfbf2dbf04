//! Bearer-token types shared by Akeshya crates.
//!
//! Provides JWT issuing and validation plus the `Identity` extractor.

pub mod identity;
pub mod token;
