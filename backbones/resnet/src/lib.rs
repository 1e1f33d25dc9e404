//! Shallow ResNet50 feature extractor for PixelNet.
//!
//! This crate provides a three-convolution truncation of a standard ResNet50:
//! the stem (conv1 + bn1 + relu + maxpool), followed by the first and third
//! convolutions of the first bottleneck block of `layer1`, each with its
//! batch norm. The middle 3x3 convolution and the bottleneck's own skip-add
//! are intentionally skipped. Parameter layout follows torchvision so that
//! pretrained weights can be remapped onto the record.
//!
//! The implementation is derived from the official torchvision ResNet.

use core::f64::consts::SQRT_2;

use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    pool::{MaxPool2d, MaxPool2dConfig},
    BatchNorm, BatchNormConfig, Initializer, PaddingConfig2d, Relu,
};
use burn::prelude::*;

/// Channel count of the feature map produced by [`ShallowResNet50`].
pub const RESNET50_OUT_CHANNELS: usize = 256;

/// ResNet stem: conv1 + bn1 + relu + maxpool.
#[derive(Module, Debug)]
pub struct StemBlock<B: Backend> {
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
    relu: Relu,
    maxpool: MaxPool2d,
}

impl<B: Backend> StemBlock<B> {
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = self.conv.forward(input);
        let out = self.bn.forward(out);
        let out = self.relu.forward(out);
        self.maxpool.forward(out)
    }

    /// Create a new StemBlock.
    pub fn new(in_channels: usize, out_channels: usize, device: &Device<B>) -> Self {
        let initializer = Initializer::KaimingNormal {
            gain: SQRT_2,
            fan_out_only: true,
        };

        // 7x7 conv, stride=2, padding=3
        let conv = Conv2dConfig::new([in_channels, out_channels], [7, 7])
            .with_stride([2, 2])
            .with_padding(PaddingConfig2d::Explicit(3, 3))
            .with_bias(false)
            .with_initializer(initializer)
            .init(device);

        let bn = BatchNormConfig::new(out_channels).init(device);

        // 3x3 maxpool, stride=2, padding=1
        let maxpool = MaxPool2dConfig::new([3, 3])
            .with_strides([2, 2])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init();

        Self {
            conv,
            bn,
            relu: Relu::new(),
            maxpool,
        }
    }
}

/// Truncated ResNet50: optional stem, then `layer1[0].conv1 + bn1` and
/// `layer1[0].conv3 + bn3`.
///
/// The stem-less form is an ablation variant whose input is a 64-channel
/// feature map rather than an RGB image.
#[derive(Module, Debug)]
pub struct ShallowResNet50<B: Backend> {
    stem: Option<StemBlock<B>>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    conv3: Conv2d<B>,
    bn3: BatchNorm<B, 2>,
}

impl<B: Backend> ShallowResNet50<B> {
    /// Create the full variant. Input is an RGB image tensor `[batch, 3, h, w]`.
    pub fn new(device: &Device<B>) -> Self {
        Self::init(true, device)
    }

    /// Create the stem-less ablation variant. Input must already be a
    /// 64-channel feature map.
    pub fn without_stem(device: &Device<B>) -> Self {
        Self::init(false, device)
    }

    fn init(with_stem: bool, device: &Device<B>) -> Self {
        let initializer = Initializer::KaimingNormal {
            gain: SQRT_2,
            fan_out_only: true,
        };

        let stem = with_stem.then(|| StemBlock::new(3, 64, device));

        // layer1[0].conv1: 1x1, 64 -> 64
        let conv2 = Conv2dConfig::new([64, 64], [1, 1])
            .with_bias(false)
            .with_initializer(initializer.clone())
            .init(device);
        let bn2 = BatchNormConfig::new(64).init(device);

        // layer1[0].conv3: 1x1, 64 -> 256
        let conv3 = Conv2dConfig::new([64, RESNET50_OUT_CHANNELS], [1, 1])
            .with_bias(false)
            .with_initializer(initializer)
            .init(device);
        let bn3 = BatchNormConfig::new(RESNET50_OUT_CHANNELS).init(device);

        Self {
            stem,
            conv2,
            bn2,
            conv3,
            bn3,
        }
    }

    /// Forward pass producing a `[batch, 256, h, w]` feature map.
    ///
    /// No activation between the two conv+bn pairs; this is the truncation,
    /// not a full bottleneck block.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = match &self.stem {
            Some(stem) => stem.forward(input),
            None => input,
        };
        let out = self.bn2.forward(self.conv2.forward(out));
        self.bn3.forward(self.conv3.forward(out))
    }

    /// Whether this instance includes the stem.
    pub const fn has_stem(&self) -> bool {
        self.stem.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_shallow_resnet50_forward() {
        let device = Default::default();
        let model = ShallowResNet50::<TestBackend>::new(&device);
        assert!(model.has_stem());

        let input = Tensor::<TestBackend, 4>::random(
            [1, 3, 224, 224],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let output = model.forward(input);

        // Stem downsamples by 4, the 1x1 convolutions keep the resolution.
        assert_eq!(output.dims(), [1, 256, 56, 56]);
    }

    #[test]
    fn test_shallow_resnet50_without_stem_forward() {
        let device = Default::default();
        let model = ShallowResNet50::<TestBackend>::without_stem(&device);
        assert!(!model.has_stem());

        let input = Tensor::<TestBackend, 4>::random(
            [1, 64, 56, 56],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let output = model.forward(input);

        assert_eq!(output.dims(), [1, 256, 56, 56]);
    }
}
