//! Branch fusion head: 1x1 projection of the concatenated attention branches
//! followed by batch norm with zero-initialized affine parameters, so the
//! fused residual contributes exactly zero at initialization.

use burn::{
    module::Param,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        BatchNorm, BatchNormConfig,
    },
    prelude::*,
};

use crate::error::{PixelNetError, PixelNetResult};

/// Configuration for the [`Fusion`] module.
#[derive(Config, Debug)]
pub struct FusionConfig {
    /// Channel count of each incoming branch.
    in_channels: usize,
    /// Number of concatenated branches.
    branches: usize,
    /// Channel count after fusion.
    #[config(default = "256")]
    out_channels: usize,
}

impl FusionConfig {
    /// Initializes a new `Fusion` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> Fusion<B> {
        let conv = Conv2dConfig::new([self.in_channels * self.branches, self.out_channels], [1, 1])
            .init(device);

        let mut bn = BatchNormConfig::new(self.out_channels).init(device);
        bn.gamma = Param::from_tensor(bn.gamma.val().zeros_like());
        bn.beta = Param::from_tensor(bn.beta.val().zeros_like());

        Fusion {
            in_channels: self.in_channels,
            branches: self.branches,
            conv,
            bn,
        }
    }
}

/// Learned projection reducing concatenated multi-branch features back to a
/// single feature map.
#[derive(Module, Debug)]
pub struct Fusion<B: Backend> {
    in_channels: usize,
    branches: usize,
    conv: Conv2d<B>,
    bn: BatchNorm<B, 2>,
}

impl<B: Backend> Fusion<B> {
    /// Forward pass over the channel-concatenated branches.
    ///
    /// # Errors
    ///
    /// Returns [`PixelNetError::InvalidTensorShape`] if the input channel
    /// count is not `branches * in_channels`.
    pub fn forward(&self, x: Tensor<B, 4>) -> PixelNetResult<Tensor<B, 4>> {
        let [_, channels, _, _] = x.dims();
        if channels != self.in_channels * self.branches {
            return Err(PixelNetError::InvalidTensorShape {
                expected: format!("[_, {}, _, _]", self.in_channels * self.branches),
                actual: format!("{:?}", x.dims()),
            });
        }

        Ok(self.bn.forward(self.conv.forward(x)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn output_channels_independent_of_branch_count() {
        let device = Default::default();

        for branches in 1..=4 {
            let fusion = FusionConfig::new(64, branches).init::<TestBackend>(&device);
            let input = Tensor::<TestBackend, 4>::random(
                [1, 64 * branches, 7, 7],
                burn::tensor::Distribution::Normal(0.0, 1.0),
                &device,
            );
            let output = fusion.forward(input).unwrap();
            assert_eq!(output.dims(), [1, 256, 7, 7]);
        }
    }

    #[test]
    fn zero_at_initialization() {
        let device = Default::default();
        let fusion = FusionConfig::new(32, 2).init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 4>::random(
            [2, 64, 5, 5],
            burn::tensor::Distribution::Normal(0.0, 1.0),
            &device,
        );
        let output = fusion.forward(input).unwrap();

        assert_eq!(
            output.clone().into_data(),
            output.zeros_like().into_data()
        );
    }

    #[test]
    fn channel_mismatch_is_rejected() {
        let device = Default::default();
        let fusion = FusionConfig::new(32, 2).init::<TestBackend>(&device);

        let input = Tensor::<TestBackend, 4>::zeros([1, 32, 5, 5], &device);
        match fusion.forward(input) {
            Err(PixelNetError::InvalidTensorShape { expected, .. }) => {
                assert!(expected.contains("64"));
            }
            _ => panic!("Expected InvalidTensorShape error"),
        }
    }
}
