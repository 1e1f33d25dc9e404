//! PixelNet Forward-Pass Demo
//!
//! Builds a PixelNet variant and runs a single forward pass on a random
//! input, printing the output shape and timing.
//!
//! ## Usage
//!
//! ```bash
//! # ResNet50-embedded variant with two attention branches
//! cargo run --bin forward -- --backbone resnet50 --branches 2
//!
//! # AlexNet-embedded variant on a tracking-template-sized input
//! cargo run --bin forward -- --backbone alexnet --branches 2 --height 127 --width 127
//!
//! # Load pretrained torchvision weights into the backbone
//! cargo run --features pretrained --bin forward -- --weights resnet50.pth
//! ```

use std::time::Instant;

use anyhow::Result;
use burn::prelude::*;
use clap::{Parser, ValueEnum};
use pixelnet_burn::{BackboneKind, PixelNetConfig};

cfg_if::cfg_if! {
    if #[cfg(feature = "wgpu")] {
        type SelectedBackend = burn::backend::Wgpu;
    } else if #[cfg(feature = "cuda")] {
        type SelectedBackend = burn::backend::Cuda;
    } else {
        type SelectedBackend = burn::backend::NdArray<f32>;
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum BackboneArg {
    Alexnet,
    Resnet50,
    Resnet50NoStem,
}

impl From<BackboneArg> for BackboneKind {
    fn from(value: BackboneArg) -> Self {
        match value {
            BackboneArg::Alexnet => Self::Alexnet,
            BackboneArg::Resnet50 => Self::Resnet50,
            BackboneArg::Resnet50NoStem => Self::Resnet50NoStem,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Backbone truncation
    #[arg(long, value_enum, default_value = "resnet50")]
    backbone: BackboneArg,

    /// Number of attention branches (1-4)
    #[arg(long, default_value = "2")]
    branches: usize,

    /// Input height
    #[arg(long, default_value = "255")]
    height: usize,

    /// Input width
    #[arg(long, default_value = "255")]
    width: usize,

    /// Batch size
    #[arg(long, default_value = "1")]
    batch: usize,

    /// Path to a torchvision checkpoint for the backbone
    #[cfg(feature = "pretrained")]
    #[arg(long)]
    weights: Option<std::path::PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let device = Default::default();

    let backbone: BackboneKind = args.backbone.clone().into();
    let in_channels = backbone.in_channels();

    let model = PixelNetConfig::new()
        .with_backbone(backbone)
        .with_branches(args.branches)
        .init::<SelectedBackend>(&device)?;

    #[cfg(feature = "pretrained")]
    let model = match &args.weights {
        Some(weights) => model.with_pretrained_backbone(weights.clone(), &device)?,
        None => model,
    };

    let input = Tensor::<SelectedBackend, 4>::random(
        [args.batch, in_channels, args.height, args.width],
        burn::tensor::Distribution::Normal(0.0, 1.0),
        &device,
    );

    println!(
        "running {:?} with {} attention branch(es) on a {:?} input",
        args.backbone,
        args.branches,
        input.dims()
    );

    let start = Instant::now();
    let output = model.forward(input)?;
    let elapsed = start.elapsed();

    println!("output shape: {:?}", output.dims());
    println!("forward pass took {elapsed:?}");

    Ok(())
}
