//! Shallow backbone implementations for PixelNet
//!
//! This crate provides a unified interface over the truncated feature
//! extractors PixelNet attaches its attention branches to: the first three
//! convolutional stages of AlexNet and a three-convolution slice of ResNet50.
//! Both are deterministic, parameter-frozen functions at inference time;
//! freezing is enforced by the training driver, not here.

use burn::prelude::*;

pub use alexnet::{ShallowAlexNet, ALEXNET_OUT_CHANNELS};
pub use resnet::{ShallowResNet50, StemBlock, RESNET50_OUT_CHANNELS};

#[cfg(feature = "pretrained")]
mod weights;
#[cfg(feature = "pretrained")]
pub use weights::{load_alexnet_weights, load_resnet50_weights, WeightError};

/// Unified interface over the shallow feature extractors.
pub trait ShallowBackbone<B: Backend> {
    /// Forward pass through the backbone
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape `[batch_size, channels, height, width]`
    ///
    /// # Returns
    /// A single spatial feature map
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4>;

    /// Channel count of the produced feature map
    fn out_channels(&self) -> usize;
}

impl<B: Backend> ShallowBackbone<B> for ShallowAlexNet<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.forward(input)
    }

    fn out_channels(&self) -> usize {
        ALEXNET_OUT_CHANNELS
    }
}

impl<B: Backend> ShallowBackbone<B> for ShallowResNet50<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        self.forward(input)
    }

    fn out_channels(&self) -> usize {
        RESNET50_OUT_CHANNELS
    }
}

/// Enumeration of supported backbone truncations
#[derive(Config, Debug, PartialEq, Eq)]
pub enum BackboneKind {
    /// AlexNet `features[:8]`
    Alexnet,
    /// ResNet50 stem + first/third conv of the first bottleneck
    Resnet50,
    /// Stem-less ResNet50 slice (ablation; expects a 64-channel input)
    Resnet50NoStem,
}

impl BackboneKind {
    /// Channel count of the feature map this backbone produces.
    pub const fn out_channels(&self) -> usize {
        match self {
            Self::Alexnet => ALEXNET_OUT_CHANNELS,
            Self::Resnet50 | Self::Resnet50NoStem => RESNET50_OUT_CHANNELS,
        }
    }

    /// Channel count the backbone expects at its input.
    pub const fn in_channels(&self) -> usize {
        match self {
            Self::Alexnet | Self::Resnet50 => 3,
            Self::Resnet50NoStem => 64,
        }
    }
}

/// Enum to wrap the backbone implementations
#[derive(Module, Debug)]
pub enum BackboneWrapper<B: Backend> {
    /// AlexNet-derived backbone
    AlexNet(ShallowAlexNet<B>),
    /// ResNet50-derived backbone
    ResNet50(ShallowResNet50<B>),
}

impl<B: Backend> ShallowBackbone<B> for BackboneWrapper<B> {
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        match self {
            Self::AlexNet(backbone) => backbone.forward(input),
            Self::ResNet50(backbone) => backbone.forward(input),
        }
    }

    fn out_channels(&self) -> usize {
        match self {
            Self::AlexNet(_) => ALEXNET_OUT_CHANNELS,
            Self::ResNet50(_) => RESNET50_OUT_CHANNELS,
        }
    }
}

/// Factory function to create backbones
pub fn create_backbone<B: Backend>(kind: &BackboneKind, device: &Device<B>) -> BackboneWrapper<B> {
    match kind {
        BackboneKind::Alexnet => BackboneWrapper::AlexNet(ShallowAlexNet::new(device)),
        BackboneKind::Resnet50 => BackboneWrapper::ResNet50(ShallowResNet50::new(device)),
        BackboneKind::Resnet50NoStem => {
            BackboneWrapper::ResNet50(ShallowResNet50::without_stem(device))
        }
    }
}
