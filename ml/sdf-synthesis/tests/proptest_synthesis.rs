//! Property tests for latent combination, selection and the ledger.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sdf_synthesis::{
    LatentCode, SynthesisKind, SynthesisLedger, candidates, interpolate, select_for_arithmetic,
    select_for_interpolation,
};

fn code_strategy(dim: usize) -> impl Strategy<Value = LatentCode> {
    prop::collection::vec(-10.0f32..10.0, dim).prop_map(LatentCode::new)
}

/// Grow a ledger with random draws, `steps` times.
fn grown_ledger(trained: usize, steps: usize, seed: u64) -> SynthesisLedger {
    let mut ledger = SynthesisLedger::seed((0..trained).map(|i| LatentCode::new(vec![i as f32; 3])));
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for step in 0..steps {
        if step % 2 == 0 {
            let draw = select_for_arithmetic(&ledger, trained, 0.5, &mut rng).unwrap();
            ledger
                .append(draw.file_name(), SynthesisKind::Arithmetic, draw.parents.clone(), draw.code)
                .unwrap();
        } else {
            let draw = select_for_interpolation(&ledger, trained, 0.5, [0.25, 0.75], &mut rng).unwrap();
            ledger
                .append(
                    draw.file_name(),
                    SynthesisKind::Interpolation,
                    draw.parents.to_vec(),
                    draw.code,
                )
                .unwrap();
        }
    }
    ledger
}

proptest! {
    #[test]
    fn interpolation_endpoints(a in code_strategy(5), b in code_strategy(5)) {
        prop_assert_eq!(interpolate(&[a.clone(), b.clone()], &[0.0]).unwrap(), a.clone());
        let at_one = interpolate(&[a.clone(), b.clone()], &[1.0]).unwrap();
        for (x, y) in at_one.as_slice().iter().zip(b.as_slice()) {
            prop_assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn interpolation_stays_between(a in code_strategy(4), b in code_strategy(4), t in 0.0f32..=1.0) {
        let mid = interpolate(&[a.clone(), b.clone()], &[t]).unwrap();
        for ((m, x), y) in mid.as_slice().iter().zip(a.as_slice()).zip(b.as_slice()) {
            prop_assert!(*m >= x.min(*y) - 1e-4 && *m <= x.max(*y) + 1e-4);
        }
    }

    #[test]
    fn factor_count_is_checked(n in 1usize..6, extra in 1usize..3) {
        let codes = vec![LatentCode::zeros(2); n];
        let factors = vec![0.5f32; n - 1 + extra];
        prop_assert!(interpolate(&codes, &factors).unwrap_err().is_config_error());
    }

    #[test]
    fn grown_ledger_keeps_invariants(trained in 3usize..6, steps in 0usize..20, seed in any::<u64>()) {
        let ledger = grown_ledger(trained, steps, seed);
        prop_assert_eq!(ledger.len(), trained + steps);
        prop_assert!(ledger.validate().is_ok());
        for (position, record) in ledger.records().iter().enumerate() {
            prop_assert_eq!(record.index, position);
            prop_assert_eq!(record.is_initial(), position < trained);
            prop_assert!(record.parents.iter().all(|&p| p < position));
        }
    }

    #[test]
    fn selection_pools_exclude_other_kind(trained in 3usize..6, steps in 0usize..20, seed in any::<u64>()) {
        let ledger = grown_ledger(trained, steps, seed);
        for restrict in [false, true] {
            let for_interp = candidates(&ledger, trained, restrict, SynthesisKind::Arithmetic);
            prop_assert!(for_interp.iter().all(|r| r.synthesis_type != SynthesisKind::Arithmetic));
            let for_arith = candidates(&ledger, trained, restrict, SynthesisKind::Interpolation);
            prop_assert!(for_arith.iter().all(|r| r.synthesis_type != SynthesisKind::Interpolation));
            if restrict {
                prop_assert!(for_arith.iter().all(|r| r.index < trained));
            }
        }
    }

    #[test]
    fn draws_have_distinct_parents(trained in 3usize..6, seed in any::<u64>()) {
        let ledger = grown_ledger(trained, 6, seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ 0x5eed);
        let interp = select_for_interpolation(&ledger, trained, 0.5, [0.25, 0.75], &mut rng).unwrap();
        prop_assert_ne!(interp.parents[0], interp.parents[1]);
        prop_assert!((0.25..=0.75).contains(&interp.factor));
        let arith = select_for_arithmetic(&ledger, trained, 0.5, &mut rng).unwrap();
        let mut parents = arith.parents.clone();
        parents.sort_unstable();
        parents.dedup();
        prop_assert_eq!(parents.len(), 3);
    }
}
