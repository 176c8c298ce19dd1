//! Strategy module
//!
//! Derives Big/Small signals from the rolling draw history.
//!
//! Four independent rules vote, each with a configurable weight:
//! - color cycle over the last three colors
//! - Big/Small alternation over the last three sizes
//! - parity of the newest issue id
//! - mean absolute gap between consecutive numbers

pub mod scorer;

pub use scorer::{validate, TrendScorer};
