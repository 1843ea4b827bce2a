use flux_timer::mapper::{DurationMapper, MAX_MINUTES};
use proptest::prelude::*;

proptest! {
    #[test]
    fn minutes_never_decrease_with_distance(a in -100.0f64..6000.0, b in -100.0f64..6000.0) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        let mut mapper = DurationMapper::default();
        let near_minutes = mapper.minutes_for_distance(near).minutes;
        let far_minutes = mapper.minutes_for_distance(far).minutes;
        prop_assert!(near_minutes <= far_minutes);
    }

    #[test]
    fn minutes_stay_in_range(distance in prop::num::f64::ANY) {
        let mut mapper = DurationMapper::default();
        let reading = mapper.minutes_for_distance(distance);
        prop_assert!(reading.minutes <= MAX_MINUTES);
    }

    #[test]
    fn inverse_round_trips_whole_minutes(minutes in 0i64..=999) {
        let mut mapper = DurationMapper::default();
        let distance = mapper.distance_for_minutes(minutes);
        prop_assert_eq!(i64::from(mapper.minutes_for_distance(distance).minutes), minutes);
    }

    #[test]
    fn inverse_clamps_out_of_range(minutes in prop::num::i64::ANY) {
        let mapper = DurationMapper::default();
        let distance = mapper.distance_for_minutes(minutes);
        prop_assert!(distance >= 0.0);
        prop_assert!(distance <= mapper.distance_for_minutes(999));
    }

    #[test]
    fn snapped_readings_land_on_targets(distance in 0.0f64..800.0) {
        let mut mapper = DurationMapper::default();
        let reading = mapper.minutes_for_distance(distance);
        if let Some(target) = reading.snapped {
            prop_assert_eq!(reading.minutes, target);
            prop_assert!(mapper.config().snap_targets.contains(&target));
        }
    }

    #[test]
    fn feedback_fires_once_per_plateau(offset in -0.8f64..0.8, steps in 2usize..20) {
        let mut mapper = DurationMapper::default();
        let distance = mapper.distance_for_minutes(30) + offset;
        let feedback: usize = (0..steps)
            .filter(|_| mapper.minutes_for_distance(distance).feedback.is_some())
            .count();
        prop_assert_eq!(feedback, 1);
    }
}
