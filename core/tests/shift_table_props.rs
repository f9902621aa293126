use dedispcore::prelude::{ChannelOrder, DedispersionConfig, ReferenceFrequency};
use dedispcore::processing::{DedispersionEngine, TrialShiftTable};
use ndarray::Array2;
use proptest::prelude::*;
use std::sync::Arc;

fn reference_from(index: u8) -> ReferenceFrequency {
    match index % 3 {
        0 => ReferenceFrequency::HighestChannel,
        1 => ReferenceFrequency::TopEdge,
        _ => ReferenceFrequency::Center,
    }
}

prop_compose! {
    fn any_config()(
        vec_length in 1usize..64,
        num_dms in 1usize..16,
        f_obs in 100.0f64..2000.0,
        bw_fraction in 0.01f64..0.9,
        t_int in 1e-5f64..1e-2,
        dm_step in 0.1f64..500.0,
        reference in 0u8..3,
        descending in any::<bool>(),
        a in 0usize..64,
        b in 0usize..64,
    ) -> DedispersionConfig {
        let start = a % vec_length;
        let end = start + 1 + b % (vec_length - start);
        DedispersionConfig {
            vec_length,
            num_dms,
            f_obs,
            bandwidth: f_obs * bw_fraction,
            t_int,
            samples_per_call: 64,
            sub_band_start: start,
            sub_band_end: end,
            dm_step,
            reference: reference_from(reference),
            channel_order: if descending {
                ChannelOrder::Descending
            } else {
                ChannelOrder::Ascending
            },
        }
    }
}

prop_compose! {
    // Kept small enough that max_shift stays in the low thousands.
    fn modest_config()(
        vec_length in 1usize..24,
        num_dms in 1usize..8,
        f_obs in 400.0f64..1500.0,
        bw_fraction in 0.01f64..0.25,
        t_int in 1e-3f64..1e-2,
        dm_step in 1.0f64..50.0,
        reference in 0u8..3,
    ) -> DedispersionConfig {
        DedispersionConfig {
            vec_length,
            num_dms,
            f_obs,
            bandwidth: f_obs * bw_fraction,
            t_int,
            samples_per_call: 32,
            sub_band_start: 0,
            sub_band_end: vec_length,
            dm_step,
            reference: reference_from(reference),
            channel_order: ChannelOrder::Ascending,
        }
    }
}

proptest! {
    #[test]
    fn zero_dm_trial_never_shifts(config in any_config()) {
        let table = TrialShiftTable::build(&config).unwrap();
        for channel in config.sub_band() {
            prop_assert_eq!(table.shift(0, channel), Some(0));
        }
    }

    #[test]
    fn shifts_grow_with_dm(config in any_config()) {
        let table = TrialShiftTable::build(&config).unwrap();
        for channel in config.sub_band() {
            for trial in 1..config.num_dms {
                let lower = table.shift(trial - 1, channel).unwrap();
                let higher = table.shift(trial, channel).unwrap();
                prop_assert!(lower <= higher);
            }
        }
    }

    #[test]
    fn higher_frequencies_shift_less(config in any_config()) {
        let table = TrialShiftTable::build(&config).unwrap();
        let freqs = table.frequencies();
        for trial in 0..config.num_dms {
            for c1 in config.sub_band() {
                for c2 in config.sub_band() {
                    if freqs.frequency(c1).unwrap() > freqs.frequency(c2).unwrap() {
                        prop_assert!(
                            table.shift(trial, c1).unwrap() <= table.shift(trial, c2).unwrap()
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn max_shift_bounds_every_entry(config in any_config()) {
        let table = TrialShiftTable::build(&config).unwrap();
        let mut largest = 0;
        for trial in 0..config.num_dms {
            for &shift in table.trial_shifts(trial) {
                largest = largest.max(shift);
            }
        }
        prop_assert_eq!(table.max_shift(), largest);
    }

    #[test]
    fn aligned_impulse_peaks_at_channel_count(
        config in modest_config(),
        trial_seed in 0usize..8,
        t0 in 0usize..32,
    ) {
        let table = Arc::new(TrialShiftTable::build(&config).unwrap());
        let engine = DedispersionEngine::new(table.clone());
        let trial = trial_seed % config.num_dms;
        let history = table.max_shift();
        let produced = 32;

        let mut window = Array2::<f32>::zeros((history + produced, config.vec_length));
        for channel in config.sub_band() {
            let shift = table.shift(trial, channel).unwrap();
            window[[t0 + history - shift, channel]] = 1.0;
        }

        let out = engine.dedisperse(window.view(), history).unwrap();
        let peak = table.channel_count() as f32;
        prop_assert_eq!(out[[trial, t0]], peak);
        prop_assert!(out.iter().all(|&v| v <= peak));
    }
}
