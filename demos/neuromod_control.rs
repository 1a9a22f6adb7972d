//! Neuromodulated CfC cells
//!
//! This example demonstrates the neuromodulated mode, where an auxiliary
//! signal steers the decay rate of the closed-form solution, and shows how
//! the modulation network can be swapped at runtime.

use burn::backend::NdArray;
use burn::tensor::Tensor;
use liquid_cfc::cells::{CfcCellConfig, CfcMode, NeuromodConfig};
use liquid_cfc::error::Result;
use liquid_cfc::rnn::CfcConfig;

fn main() -> Result<()> {
    println!("=== liquid-cfc Neuromodulation Example ===\n");

    type Backend = NdArray<f32>;
    let device = Default::default();

    // A neuromodulated cell: 12 policy features, 24 hidden units, and a
    // two-layer modulation network reading a 4-wide auxiliary signal.
    println!("Example 1: Stepping a neuromodulated cell");
    let cell = CfcCellConfig::new(12, 24)
        .with_mode(CfcMode::Neuromodulated)
        .with_neuromod(Some(NeuromodConfig::new(vec![4, 16, 24])))
        .init::<Backend>(&device)?;

    println!("Created neuromodulated cell:");
    println!("  Mode: {}", cell.mode());
    println!("  Input size: {}", cell.input_size());
    println!("  Hidden size: {}", cell.hidden_size());
    println!();

    let policy = Tensor::<Backend, 2>::random(
        [2, 12],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let hidden = Tensor::<Backend, 2>::zeros([2, 24], &device);

    // The same policy input under a quiet and a loud auxiliary signal.
    let quiet = Tensor::<Backend, 2>::zeros([2, 4], &device) + 0.05;
    let loud = Tensor::<Backend, 2>::zeros([2, 4], &device) + 3.0;

    let quiet_step = cell.step((policy.clone(), quiet), hidden.clone(), 1.0)?;
    let loud_step = cell.step((policy, loud), hidden, 1.0)?;

    println!("  Hidden shape: {:?}", quiet_step.hidden.dims());
    if let (Some(quiet_diag), Some(loud_diag)) = (quiet_step.diagnostics, loud_step.diagnostics) {
        println!(
            "  Mean time constant, quiet signal: {:.4}",
            quiet_diag.tau_system.mean().into_scalar()
        );
        println!(
            "  Mean time constant, loud signal:  {:.4}",
            loud_diag.tau_system.mean().into_scalar()
        );
        println!("  Stronger modulation means faster decay (smaller tau)");
    }
    println!();

    // Example 2: Whole sequences of (policy, neuromod) pairs
    println!("Example 2: Neuromodulated sequences");
    let cell_config = CfcCellConfig::new(12, 24)
        .with_mode(CfcMode::Neuromodulated)
        .with_neuromod(Some(NeuromodConfig::new(vec![4, 24])));
    let mut cfc = CfcConfig::new(cell_config).init::<Backend>(&device)?;

    let policy_seq = Tensor::<Backend, 3>::random(
        [2, 6, 12],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );
    let aux_seq = Tensor::<Backend, 3>::random(
        [2, 6, 4],
        burn::tensor::Distribution::Uniform(-1.0, 1.0),
        &device,
    );

    let (output, state) = cfc.forward((policy_seq.clone(), aux_seq.clone()), None, None)?;

    println!("  Policy shape:  [2, 6, 12]");
    println!("  Aux shape:     [2, 6, 4]");
    println!("  Output shape:  {:?}", output.dims());
    println!("  State shape:   {:?}", state.dims());
    println!();

    // Example 3: Hot-swapping the modulation network
    println!("Example 3: Replacing the modulation network");
    let replacement = NeuromodConfig::new(vec![4, 32, 24]).init::<Backend>(&device)?;
    cfc.cell_mut().replace_neuromod_network(replacement)?;

    let (swapped_output, _) = cfc.forward((policy_seq, aux_seq), None, None)?;
    println!("  Replacement accepted (same boundary widths, deeper stack)");
    println!("  Output shape:  {:?}", swapped_output.dims());

    // A mismatched candidate is rejected and the current network stays.
    let bad = NeuromodConfig::new(vec![4, 10]).init::<Backend>(&device)?;
    match cfc.cell_mut().replace_neuromod_network(bad) {
        Err(err) => println!("  Mismatched candidate rejected: {err}"),
        Ok(()) => println!("  Unexpectedly accepted"),
    }
    println!();

    println!("=== Examples completed successfully! ===");
    Ok(())
}
