//! # Model Architectures
//!
//! This module aggregates the core components of the PixelNet architecture:
//!
//! - `attention`: the global-context attention block.
//! - `fusion`: the multi-branch fusion head.
//! - `pixelnet`: the main `PixelNet` model wiring a shallow backbone,
//!   parallel attention branches and the fusion head together.

pub mod attention;
pub mod fusion;
pub mod pixelnet;

pub use attention::{AttentionBlock, AttentionBlockConfig};
pub use fusion::{Fusion, FusionConfig};
pub use pixelnet::{PixelNet, PixelNetConfig, PixelNetRecord};
