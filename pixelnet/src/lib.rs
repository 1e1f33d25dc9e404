mod error;
mod models;
#[cfg(test)]
mod tests;

pub use backbones::BackboneKind;
pub use error::{PixelNetError, PixelNetResult};
pub use models::{
    AttentionBlock, AttentionBlockConfig, Fusion, FusionConfig, PixelNet, PixelNetConfig,
    PixelNetRecord,
};
