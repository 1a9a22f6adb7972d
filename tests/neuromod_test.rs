#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use burn::tensor::{Distribution, Tensor};
    use liquid_cfc::cells::{CfcCellConfig, CfcMode, NeuromodConfig};
    use liquid_cfc::error::CfcError;
    use liquid_cfc::rnn::CfcConfig;

    type Backend = NdArray<f32>;

    fn neuromodulated_cell() -> liquid_cfc::cells::CfcCell<Backend> {
        let device = Default::default();
        CfcCellConfig::new(6, 8)
            .with_mode(CfcMode::Neuromodulated)
            .with_neuromod(Some(NeuromodConfig::new(vec![4, 8])))
            .init::<Backend>(&device)
            .unwrap()
    }

    #[test]
    fn test_replace_rejected_for_plain_modes() {
        let device = Default::default();
        let mut cell = CfcCellConfig::new(6, 8).init::<Backend>(&device).unwrap();

        let network = NeuromodConfig::new(vec![4, 8])
            .init::<Backend>(&device)
            .unwrap();
        let result = cell.replace_neuromod_network(network);

        assert!(matches!(result, Err(CfcError::InvalidOperation(_))));
    }

    #[test]
    fn test_replace_rejects_wrong_input_size() {
        let device = Default::default();
        let mut cell = neuromodulated_cell();

        // Current network reads 4 features, the candidate reads 5.
        let network = NeuromodConfig::new(vec![5, 8])
            .init::<Backend>(&device)
            .unwrap();
        let result = cell.replace_neuromod_network(network);

        assert!(matches!(result, Err(CfcError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_failed_replace_keeps_old_network() {
        let device = Default::default();
        let mut cell = neuromodulated_cell();

        let policy = Tensor::<Backend, 2>::random([2, 6], Distribution::Default, &device);
        let aux = Tensor::<Backend, 2>::random([2, 4], Distribution::Default, &device);
        let hx = Tensor::<Backend, 2>::zeros([2, 8], &device);

        let (before, _) = cell
            .forward((policy.clone(), aux.clone()), hx.clone(), 1.0)
            .unwrap();

        // Right input width, wrong output width: rejected by the probe run.
        let network = NeuromodConfig::new(vec![4, 6])
            .init::<Backend>(&device)
            .unwrap();
        let result = cell.replace_neuromod_network(network);
        assert!(matches!(result, Err(CfcError::InvalidConfiguration(_))));

        // The cell still evaluates exactly as before the failed swap.
        let (after, _) = cell.forward((policy, aux), hx, 1.0).unwrap();
        assert_eq!(before.into_data(), after.into_data());
    }

    #[test]
    fn test_replace_with_matching_network() {
        let device = Default::default();
        let mut cell = neuromodulated_cell();

        let policy = Tensor::<Backend, 2>::random([2, 6], Distribution::Default, &device);
        let aux = Tensor::<Backend, 2>::random([2, 4], Distribution::Default, &device);
        let hx = Tensor::<Backend, 2>::zeros([2, 8], &device);

        let (before, _) = cell
            .forward((policy.clone(), aux.clone()), hx.clone(), 1.0)
            .unwrap();

        // Deeper network, same boundary widths.
        let network = NeuromodConfig::new(vec![4, 12, 8])
            .init::<Backend>(&device)
            .unwrap();
        cell.replace_neuromod_network(network).unwrap();

        let (after, _) = cell.forward((policy, aux), hx, 1.0).unwrap();
        assert_eq!(after.dims(), [2, 8]);

        // Fresh weights should actually change the dynamics.
        let diff = (before - after).abs().sum().into_scalar();
        assert!(diff > 1e-7, "replacement network should alter the outputs");
    }

    #[test]
    fn test_replace_through_runner() {
        let device = Default::default();
        let cell = CfcCellConfig::new(6, 8)
            .with_mode(CfcMode::Neuromodulated)
            .with_neuromod(Some(NeuromodConfig::new(vec![4, 8])));
        let mut cfc = CfcConfig::new(cell).init::<Backend>(&device).unwrap();

        let network = NeuromodConfig::new(vec![4, 8])
            .init::<Backend>(&device)
            .unwrap();
        cfc.cell_mut().replace_neuromod_network(network).unwrap();

        let policy = Tensor::<Backend, 3>::random([2, 5, 6], Distribution::Default, &device);
        let aux = Tensor::<Backend, 3>::random([2, 5, 4], Distribution::Default, &device);
        let (output, state) = cfc.forward((policy, aux), None, None).unwrap();

        assert_eq!(output.dims(), [2, 5, 8]);
        assert_eq!(state.dims(), [2, 8]);
    }
}
