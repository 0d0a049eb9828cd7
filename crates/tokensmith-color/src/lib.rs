//! # tokensmith-color
//!
//! Color math used by the token pipeline when it has to invent palettes.
//!
//! This crate provides:
//! - `Rgb` parsing from hex and `rgb()`/`rgba()` notation
//! - Euclidean RGB distance for closeness matching
//! - `Hsl` conversion for hue bucketing
//! - `HueFamily` buckets and evocative family names
//!
//! It knows nothing about tokens. The kernel decides which colors to compare
//! and which names are already taken.

pub mod family;
pub mod hsl;
pub mod rgb;

pub use family::{FamilyName, HueFamily, LightnessTier, family_name};
pub use hsl::Hsl;
pub use rgb::{ColorParseError, Rgb};
