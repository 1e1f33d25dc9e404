//! # Global-Context Attention Block
//!
//! Derived from GCNet's context block. A query-free attention over spatial
//! positions pools the feature map into a single per-channel context vector;
//! a small channel transform turns that vector into an additive correction
//! which is broadcast back to every spatial location. The transform's final
//! convolution is zero-initialized, so a freshly constructed block is an
//! exact identity.

use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        LayerNorm, LayerNormConfig, Relu,
    },
    prelude::*,
    tensor::activation::softmax,
};

use crate::error::{PixelNetError, PixelNetResult};

/// Configuration for the [`AttentionBlock`] module.
#[derive(Config, Debug)]
pub struct AttentionBlockConfig {
    /// Channel count of the feature maps this block operates on.
    in_channels: usize,
}

impl AttentionBlockConfig {
    /// Initializes a new `AttentionBlock`.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> AttentionBlock<B> {
        let conv = Conv2dConfig::new([self.in_channels, 1], [1, 1]).init(device);

        let proj_in = Conv2dConfig::new([self.in_channels, self.in_channels], [1, 1]).init(device);
        let norm = LayerNormConfig::new(self.in_channels).init(device);

        // Zero-initialized so the block starts as an identity residual.
        let mut proj_out =
            Conv2dConfig::new([self.in_channels, self.in_channels], [1, 1]).init(device);
        proj_out.weight = Param::from_tensor(proj_out.weight.val().zeros_like());
        proj_out.bias = proj_out
            .bias
            .map(|bias| Param::from_tensor(bias.val().zeros_like()));

        AttentionBlock {
            in_channels: self.in_channels,
            conv,
            proj_in,
            norm,
            relu: Relu::new(),
            proj_out,
        }
    }
}

/// Attention block adding a content-derived per-channel correction to every
/// spatial position of its input.
#[derive(Module, Debug)]
pub struct AttentionBlock<B: Backend> {
    in_channels: usize,
    /// Produces one attention logit per spatial position.
    conv: Conv2d<B>,
    proj_in: Conv2d<B>,
    norm: LayerNorm<B>,
    relu: Relu,
    proj_out: Conv2d<B>,
}

impl<B: Backend> AttentionBlock<B> {
    /// Softmax-normalized attention weights over spatial positions, shape
    /// `[batch, 1, h * w]`. For each batch element the weights sum to 1.
    pub fn spatial_weights(&self, x: Tensor<B, 4>) -> Tensor<B, 3> {
        let [batch, _, height, width] = x.dims();
        // [N, 1, H, W] -> [N, 1, H * W]
        let logits = self.conv.forward(x).reshape([batch, 1, height * width]);
        softmax(logits, 2)
    }

    /// Attention-weighted global pooling of `x`, shape `[batch, c, 1, 1]`.
    ///
    /// Not a uniform average: the pooling weights depend on the learned
    /// per-position logits.
    fn global_context(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, height, width] = x.dims();
        // [N, C, H * W]
        let values = x.clone().reshape([batch, channels, height * width]);
        // [N, H * W, 1]
        let weights = self.spatial_weights(x).swap_dims(1, 2);
        // [N, C, 1] -> [N, C, 1, 1]
        values.matmul(weights).reshape([batch, channels, 1, 1])
    }

    /// Channel transform of the context vector: 1x1 conv, layer norm over
    /// channels, relu, zero-initialized 1x1 conv.
    fn transform(&self, context: Tensor<B, 4>) -> Tensor<B, 4> {
        let [batch, channels, _, _] = context.dims();
        let out = self.proj_in.forward(context);
        // PyTorch's LayerNorm([C, 1, 1]) normalizes over the channel axis.
        let out = self.norm.forward(out.reshape([batch, channels]));
        let out = self.relu.forward(out);
        self.proj_out.forward(out.reshape([batch, channels, 1, 1]))
    }

    /// Forward pass. Output shape equals input shape exactly.
    ///
    /// # Errors
    ///
    /// Returns [`PixelNetError::InvalidTensorShape`] if the channel count
    /// differs from the configured `in_channels` or the spatial extent is
    /// empty (softmax over zero positions is undefined).
    pub fn forward(&self, x: Tensor<B, 4>) -> PixelNetResult<Tensor<B, 4>> {
        let [_, channels, height, width] = x.dims();
        if channels != self.in_channels {
            return Err(PixelNetError::InvalidTensorShape {
                expected: format!("[_, {}, _, _]", self.in_channels),
                actual: format!("{:?}", x.dims()),
            });
        }
        if height * width == 0 {
            return Err(PixelNetError::InvalidTensorShape {
                expected: "a non-empty spatial extent".to_owned(),
                actual: format!("{:?}", x.dims()),
            });
        }

        let fine_grained = self.transform(self.global_context(x.clone()));

        // [N, C, 1, 1] broadcast over H x W.
        Ok(x + fine_grained)
    }
}
