//! Basic usage of the liquid-cfc crate
//!
//! This example demonstrates how to create and use a CfC (Closed-form
//! Continuous-time) recurrent neural network for sequence processing.

use burn::backend::NdArray;
use burn::tensor::Tensor;
use liquid_cfc::cells::{CfcCellConfig, CfcMode};
use liquid_cfc::error::Result;
use liquid_cfc::rnn::CfcConfig;
use ndarray::Array2;

fn main() -> Result<()> {
    println!("=== liquid-cfc Basic Example ===\n");

    // Use the NdArray backend (CPU)
    type Backend = NdArray<f32>;
    let device = Default::default();

    // Example 1: Simple CfC runner (batch-first by default)
    println!("Example 1: Batch-first sequence");
    let cfc = CfcConfig::new(CfcCellConfig::new(20, 50)).init::<Backend>(&device)?;

    println!("Created CfC network:");
    println!("  Input size: {}", cfc.input_size());
    println!("  Hidden size: {}", cfc.hidden_size());
    println!();

    // Input shape: [batch=4, seq=10, features=20]
    let input = Tensor::<Backend, 3>::random(
        [4, 10, 20],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (output, state) = cfc.forward(input, None, None)?;

    println!("  Input shape:  [4, 10, 20]");
    println!("  Output shape: {:?}", output.dims());
    println!("  State shape:  {:?}", state.dims());
    println!();

    // Example 2: Irregularly-sampled sequence
    println!("Example 2: Per-step elapsed times");
    let input_irregular = Tensor::<Backend, 3>::random(
        [4, 10, 20],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let timespans = Tensor::<Backend, 2>::random(
        [4, 10],
        burn::tensor::Distribution::Uniform(0.1, 2.0),
        &device,
    );

    let (output_irregular, _) = cfc.forward(input_irregular, None, Some(timespans))?;

    println!("  Input shape:  [4, 10, 20]");
    println!("  Output shape: {:?}", output_irregular.dims());
    println!("  Each step advanced by its own elapsed time");
    println!();

    // Example 3: Sequence-first processing
    println!("Example 3: Sequence-first processing");
    let cfc_seq = CfcConfig::new(CfcCellConfig::new(20, 32))
        .with_batch_first(false)
        .init::<Backend>(&device)?;

    // Input shape: [seq=10, batch=2, features=20]
    let input_seq = Tensor::<Backend, 3>::random(
        [10, 2, 20],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (output_seq, _) = cfc_seq.forward(input_seq, None, None)?;

    println!("  Input shape:  [10, 2, 20]");
    println!("  Output shape: {:?} (always batch-first)", output_seq.dims());
    println!();

    // Example 4: Return only last timestep
    println!("Example 4: Last timestep only");
    let cfc_last = CfcConfig::new(CfcCellConfig::new(20, 40))
        .with_return_sequences(false)
        .init::<Backend>(&device)?;

    let (output_last, _) = cfc_last.forward(
        Tensor::<Backend, 3>::random(
            [4, 10, 20],
            burn::tensor::Distribution::Uniform(-1.0, 1.0),
            &device,
        ),
        None,
        None,
    )?;

    println!("  Input shape:  [4, 10, 20]");
    println!("  Output shape: {:?}", output_last.dims());
    println!("  Only the last timestep is returned");
    println!();

    // Example 5: Pure mode with time-constant diagnostics
    println!("Example 5: Pure mode diagnostics");
    let pure = CfcCellConfig::new(8, 16)
        .with_mode(CfcMode::Pure)
        .init::<Backend>(&device)?;

    let step_input = Tensor::<Backend, 2>::random(
        [4, 8],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let hidden = Tensor::<Backend, 2>::zeros([4, 16], &device);
    let step = pure.step(step_input, hidden, 0.5)?;

    println!("  Hidden shape: {:?}", step.hidden.dims());
    if let Some(diagnostics) = step.diagnostics {
        let mean_tau = diagnostics.tau_system.mean().into_scalar();
        println!("  Mean time constant: {:.4}", mean_tau);
    }
    println!();

    // Example 6: Sparse connectivity via a sparsity mask
    println!("Example 6: Sparsity mask");
    let cell = CfcCellConfig::new(20, 32)
        .with_backbone_layers(0)
        .init::<Backend>(&device)?;

    // Rows are hidden units, columns the concatenated [input, hidden] features.
    // Disconnect every second hidden unit entirely.
    let mask = Array2::from_shape_fn((32, 52), |(row, _)| if row % 2 == 0 { 1.0 } else { 0.0 });
    let cell = cell.with_sparsity_mask(mask, &device)?;

    let step_input = Tensor::<Backend, 2>::random(
        [2, 20],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let hidden = Tensor::<Backend, 2>::zeros([2, 32], &device);
    let (masked_out, _) = cell.forward(step_input, hidden, 1.0)?;

    println!("  Mask applied: {}", cell.has_sparsity_mask());
    println!("  Output shape: {:?}", masked_out.dims());
    println!();

    println!("=== Examples completed successfully! ===");
    Ok(())
}
