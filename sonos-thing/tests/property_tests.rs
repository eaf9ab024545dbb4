//! Property-based tests for play mode encoding, seeking and interpolation

use proptest::prelude::*;
use sonos_session::PlayMode;
use sonos_thing::play_mode::{decode, encode};
use sonos_thing::synchronizer::seek_target;
use sonos_thing::{ProgressInterpolator, Repeat};
use std::time::Duration;

fn repeat_strategy() -> impl Strategy<Value = Repeat> {
    prop::sample::select(Repeat::ALL.to_vec())
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn decode_then_encode_is_identity(mode in prop::sample::select(PlayMode::ALL.to_vec())) {
        let state = decode(mode);
        prop_assert_eq!(encode(state.shuffle, state.repeat), mode);
    }

    #[test]
    fn encode_then_decode_is_identity(shuffle in any::<bool>(), repeat in repeat_strategy()) {
        let state = decode(encode(shuffle, repeat));
        prop_assert_eq!(state.shuffle, shuffle);
        prop_assert_eq!(state.repeat, repeat);
    }

    #[test]
    fn seek_target_stays_within_track(percent in 0.0f64..=100.0, duration in 1u64..100_000) {
        let target = seek_target(percent, duration).unwrap();
        prop_assert!(target <= duration);
        prop_assert_eq!(target, (percent / 100.0 * duration as f64).floor() as u64);
    }

    #[test]
    fn seek_target_rejects_out_of_range(percent in prop_oneof![-1000.0f64..-0.001, 100.001f64..1000.0]) {
        prop_assert!(seek_target(percent, 300).is_err());
    }

    #[test]
    fn progress_stays_bounded(duration in 1u64..600, position in 0u64..700, ticks in 0usize..800) {
        let rt = runtime();
        let _guard = rt.enter();

        let mut interpolator = ProgressInterpolator::new(Duration::from_secs(1));
        interpolator.resync(duration, position);
        interpolator.start();

        let mut last = interpolator.progress();
        prop_assert!((0.0..=100.0).contains(&last));
        for _ in 0..ticks {
            let progress = interpolator.tick().unwrap();
            prop_assert!((0.0..=100.0).contains(&progress));
            prop_assert!(progress >= last);
            last = progress;
        }
    }
}
