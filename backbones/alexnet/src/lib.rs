//! Shallow AlexNet feature extractor for PixelNet.
//!
//! This crate provides the first three convolutional stages of a standard
//! AlexNet classifier (the first 8 entries of torchvision's
//! `alexnet.features`), used as a frozen feature extractor. The parameters
//! are expected to come from a pretrained checkpoint; freezing is the
//! responsibility of the training driver, which excludes them from the
//! optimizer.

use burn::nn::{
    conv::{Conv2d, Conv2dConfig},
    pool::{MaxPool2d, MaxPool2dConfig},
    PaddingConfig2d, Relu,
};
use burn::prelude::*;

/// Channel count of the feature map produced by [`ShallowAlexNet`].
pub const ALEXNET_OUT_CHANNELS: usize = 384;

/// Truncated AlexNet feature stack: conv1+relu, maxpool, conv2+relu,
/// maxpool, conv3+relu.
///
/// Derived from torchvision.models.alexnet, `features[:8]`.
#[derive(Module, Debug)]
pub struct ShallowAlexNet<B: Backend> {
    conv1: Conv2d<B>,
    pool1: MaxPool2d,
    conv2: Conv2d<B>,
    pool2: MaxPool2d,
    conv3: Conv2d<B>,
    relu: Relu,
}

impl<B: Backend> ShallowAlexNet<B> {
    /// Create a new shallow AlexNet with randomly initialized parameters.
    pub fn new(device: &Device<B>) -> Self {
        // 11x11 conv, stride=4, padding=2
        let conv1 = Conv2dConfig::new([3, 64], [11, 11])
            .with_stride([4, 4])
            .with_padding(PaddingConfig2d::Explicit(2, 2))
            .init(device);

        // 3x3 maxpool, stride=2, no padding
        let pool1 = MaxPool2dConfig::new([3, 3]).with_strides([2, 2]).init();

        // 5x5 conv, padding=2
        let conv2 = Conv2dConfig::new([64, 192], [5, 5])
            .with_padding(PaddingConfig2d::Explicit(2, 2))
            .init(device);

        let pool2 = MaxPool2dConfig::new([3, 3]).with_strides([2, 2]).init();

        // 3x3 conv, padding=1
        let conv3 = Conv2dConfig::new([192, ALEXNET_OUT_CHANNELS], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);

        Self {
            conv1,
            pool1,
            conv2,
            pool2,
            conv3,
            relu: Relu::new(),
        }
    }

    /// Forward pass producing a `[batch, 384, h, w]` feature map from a
    /// `[batch, 3, h0, w0]` image tensor.
    pub fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4> {
        let out = self.relu.forward(self.conv1.forward(input));
        let out = self.pool1.forward(out);

        let out = self.relu.forward(self.conv2.forward(out));
        let out = self.pool2.forward(out);

        self.relu.forward(self.conv3.forward(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_shallow_alexnet_forward() {
        let device = Default::default();
        let model = ShallowAlexNet::<TestBackend>::new(&device);

        let input = Tensor::<TestBackend, 4>::random(
            [1, 3, 127, 127],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let output = model.forward(input);

        // 127 -> 31 (conv1, s4) -> 15 (pool) -> 15 (conv2) -> 7 (pool) -> 7 (conv3)
        assert_eq!(output.dims(), [1, 384, 7, 7]);
    }

    #[test]
    fn test_shallow_alexnet_forward_batched() {
        let device = Default::default();
        let model = ShallowAlexNet::<TestBackend>::new(&device);

        let input = Tensor::<TestBackend, 4>::random(
            [2, 3, 63, 63],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 384, 3, 3]);
    }
}
