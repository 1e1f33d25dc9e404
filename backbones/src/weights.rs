//! Pretrained torchvision weight loading.
//!
//! Remaps the relevant entries of a torchvision `.pth` checkpoint onto the
//! shallow backbone records. Checkpoint acquisition (downloading) is left to
//! the caller; entries outside the truncation are ignored.

use std::path::PathBuf;

use alexnet::ShallowAlexNetRecord;
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, Recorder},
};
use burn_import::pytorch::{LoadArgs, PyTorchFileRecorder};
use resnet::ShallowResNet50Record;
use thiserror::Error;

/// Errors raised while mapping a checkpoint onto a backbone record.
#[derive(Debug, Error)]
pub enum WeightError {
    /// The checkpoint could not be read or did not contain the expected keys.
    #[error("failed to load pretrained weights: {0}")]
    Record(#[from] burn::record::RecorderError),
}

/// Load torchvision AlexNet weights into a [`ShallowAlexNetRecord`].
///
/// Only `features.0`, `features.3` and `features.6` are used.
pub fn load_alexnet_weights<B: Backend>(
    path: impl Into<PathBuf>,
    device: &Device<B>,
) -> Result<ShallowAlexNetRecord<B>, WeightError> {
    let args = LoadArgs::new(path.into())
        .with_key_remap(r"^features\.0\.(.+)", "conv1.$1")
        .with_key_remap(r"^features\.3\.(.+)", "conv2.$1")
        .with_key_remap(r"^features\.6\.(.+)", "conv3.$1");

    Ok(PyTorchFileRecorder::<FullPrecisionSettings>::new().load(args, device)?)
}

/// Load torchvision ResNet50 weights into a [`ShallowResNet50Record`].
///
/// Uses the stem (`conv1`/`bn1`, only when `with_stem`) and the first and
/// third convolutions of `layer1[0]`.
pub fn load_resnet50_weights<B: Backend>(
    path: impl Into<PathBuf>,
    with_stem: bool,
    device: &Device<B>,
) -> Result<ShallowResNet50Record<B>, WeightError> {
    let mut args = LoadArgs::new(path.into())
        .with_key_remap(r"^layer1\.0\.conv1\.(.+)", "conv2.$1")
        .with_key_remap(r"^layer1\.0\.bn1\.(.+)", "bn2.$1")
        .with_key_remap(r"^layer1\.0\.conv3\.(.+)", "conv3.$1")
        .with_key_remap(r"^layer1\.0\.bn3\.(.+)", "bn3.$1");

    if with_stem {
        args = args
            .with_key_remap(r"^conv1\.(.+)", "stem.conv.$1")
            .with_key_remap(r"^bn1\.(.+)", "stem.bn.$1");
    }

    Ok(PyTorchFileRecorder::<FullPrecisionSettings>::new().load(args, device)?)
}
