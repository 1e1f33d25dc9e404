//! # PixelNet Model Implementation
//!
//! This module defines the main `PixelNet` model: a frozen shallow backbone,
//! N independent global-context attention branches reading the same base
//! feature map, and a fusion head projecting the concatenated branches back
//! into a residual that is added onto the base.
//!
//! ## Core Components
//!
//! - `PixelNetConfig`: A configuration struct to initialize the `PixelNet` model.
//! - `PixelNet`: The main model struct, which orchestrates the forward pass
//!   through the backbone, the attention branches and the fusion head.
//!
//! Because the fusion head's batch norm is zero-initialized, a freshly
//! constructed variant without a base projection reproduces its backbone
//! output exactly.

use backbones::{create_backbone, BackboneKind, BackboneWrapper, ShallowBackbone};
use burn::{
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
};

use super::{AttentionBlock, AttentionBlockConfig, Fusion, FusionConfig};
use crate::error::{PixelNetError, PixelNetResult};

/// Configuration for the `PixelNet` model.
#[derive(Config, Debug)]
pub struct PixelNetConfig {
    /// Backbone truncation providing the base feature map.
    #[config(default = "BackboneKind::Resnet50")]
    pub backbone: BackboneKind,
    /// Number of parallel attention branches.
    #[config(default = "2")]
    pub branches: usize,
    /// Channel count of the fused output.
    #[config(default = "256")]
    pub fused_channels: usize,
}

impl PixelNetConfig {
    /// Largest supported branch count.
    pub const MAX_BRANCHES: usize = 4;

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err(PixelNetError::InvalidConfiguration)` if the branch count
    /// is outside `1..=4`.
    pub fn validate(&self) -> PixelNetResult<()> {
        if self.branches == 0 || self.branches > Self::MAX_BRANCHES {
            return Err(PixelNetError::InvalidConfiguration {
                reason: format!(
                    "branches must be in 1..={}, got {}",
                    Self::MAX_BRANCHES,
                    self.branches
                ),
            });
        }

        Ok(())
    }

    /// Initializes a `PixelNet` model with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `device` - The device to create the model on.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> PixelNetResult<PixelNet<B>> {
        self.validate()?;

        let backbone = create_backbone(&self.backbone, device);
        let channels = self.backbone.out_channels();

        // Same in_channels, no parameter sharing between branches.
        let blocks = (0..self.branches)
            .map(|_| AttentionBlockConfig::new(channels).init(device))
            .collect();

        let fusion = FusionConfig::new(channels, self.branches)
            .with_out_channels(self.fused_channels)
            .init(device);

        // When the fused channel count differs from the backbone's, the base
        // feature map is routed through a learned 1x1 projection before the
        // residual add (the AlexNet-embedded variant).
        let proj = (channels != self.fused_channels)
            .then(|| Conv2dConfig::new([channels, self.fused_channels], [1, 1]).init(device));

        Ok(PixelNet {
            backbone,
            blocks,
            fusion,
            proj,
        })
    }
}

/// The main PixelNet model.
#[derive(Module, Debug)]
pub struct PixelNet<B: Backend> {
    /// The frozen backbone producing the base feature map.
    backbone: BackboneWrapper<B>,
    /// The parallel attention branches.
    blocks: Vec<AttentionBlock<B>>,
    /// The fusion head over the concatenated branches.
    fusion: Fusion<B>,
    /// Base projection for variants whose fused channel count differs from
    /// the backbone's.
    proj: Option<Conv2d<B>>,
}

impl<B: Backend> PixelNet<B> {
    /// Forward pass through the backbone only.
    pub fn forward_backbone(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.backbone.forward(x)
    }

    /// The main forward pass for the `PixelNet` model.
    ///
    /// # Arguments
    ///
    /// * `x` - The input tensor of shape `[B, C, H, W]`.
    ///
    /// # Returns
    ///
    /// A result containing the refined feature map.
    pub fn forward(&self, x: Tensor<B, 4>) -> PixelNetResult<Tensor<B, 4>> {
        let base = self.backbone.forward(x);

        // Each branch is an independent read of the same base feature map;
        // the fusion is the only synchronization point.
        let branches = self
            .blocks
            .iter()
            .map(|block| block.forward(base.clone()))
            .collect::<PixelNetResult<Vec<_>>>()?;

        let fused = self.fusion.forward(Tensor::cat(branches, 1))?;

        Ok(match &self.proj {
            Some(proj) => proj.forward(base) + fused,
            None => base + fused,
        })
    }
}

#[cfg(feature = "pretrained")]
impl<B: Backend> PixelNet<B> {
    /// Replace the backbone parameters with pretrained torchvision weights
    /// loaded from `checkpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`PixelNetError::WeightLoadingFailed`] if the checkpoint
    /// cannot be read or remapped onto the backbone record.
    pub fn with_pretrained_backbone(
        mut self,
        checkpoint: impl Into<std::path::PathBuf>,
        device: &Device<B>,
    ) -> PixelNetResult<Self> {
        self.backbone = match self.backbone {
            BackboneWrapper::AlexNet(backbone) => {
                let record = backbones::load_alexnet_weights::<B>(checkpoint, device).map_err(
                    |err| PixelNetError::WeightLoadingFailed {
                        reason: err.to_string(),
                    },
                )?;
                BackboneWrapper::AlexNet(backbone.load_record(record))
            }
            BackboneWrapper::ResNet50(backbone) => {
                let record =
                    backbones::load_resnet50_weights::<B>(checkpoint, backbone.has_stem(), device)
                        .map_err(|err| PixelNetError::WeightLoadingFailed {
                            reason: err.to_string(),
                        })?;
                BackboneWrapper::ResNet50(backbone.load_record(record))
            }
        };

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn resnet_variants_reproduce_backbone_at_initialization() {
        let device = Default::default();

        let input = Tensor::<TestBackend, 4>::random(
            [1, 3, 32, 32],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        for branches in 1..=4 {
            let model = PixelNetConfig::new()
                .with_backbone(BackboneKind::Resnet50)
                .with_branches(branches)
                .init::<TestBackend>(&device)
                .unwrap();

            let base = model.forward_backbone(input.clone());
            let output = model.forward(input.clone()).unwrap();

            assert_eq!(output.dims(), [1, 256, 8, 8]);
            // Attention branches and fusion are zero-initialized residuals.
            assert_eq!(output.into_data(), base.into_data());
        }
    }

    #[test]
    fn alexnet_variant_projects_base_to_fused_channels() {
        let device = Default::default();

        let model = PixelNetConfig::new()
            .with_backbone(BackboneKind::Alexnet)
            .with_branches(2)
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::random(
            [1, 3, 127, 127],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let output = model.forward(input).unwrap();

        // The 384-channel AlexNet base is projected down to 256.
        assert_eq!(output.dims(), [1, 256, 7, 7]);
    }

    #[test]
    fn no_stem_ablation_variant_forward() {
        let device = Default::default();

        let model = PixelNetConfig::new()
            .with_backbone(BackboneKind::Resnet50NoStem)
            .with_branches(2)
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::random(
            [1, 64, 16, 16],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );

        let base = model.forward_backbone(input.clone());
        let output = model.forward(input).unwrap();

        assert_eq!(output.dims(), [1, 256, 16, 16]);
        assert_eq!(output.into_data(), base.into_data());
    }
}
