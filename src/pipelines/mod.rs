//! Render pipeline definitions.
//!
//! - `basic` is the single colored-mesh pipeline every body is drawn with

pub mod basic;
