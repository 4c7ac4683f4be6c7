use crossfilter::{FilterSet, FilteringEngine, RangeSlider, Record, Value};
use proptest::prelude::*;

const LETTERS: [&str; 3] = ["x", "y", "z"];

fn build(rows: &[(i32, usize, i32)]) -> Vec<Record> {
    rows.iter()
        .map(|(a, b, c)| {
            Record::from_pairs([
                ("A", Value::from(*a)),
                ("B", Value::from(LETTERS[*b])),
                ("Count", Value::from(*c)),
            ])
        })
        .collect()
}

fn filters(a: &[i32], b: &[usize]) -> FilterSet {
    let mut filters = FilterSet::new();
    filters.upsert_selections("A", a.iter().map(|v| Value::from(*v)));
    filters.upsert_selections("B", b.iter().map(|v| Value::from(LETTERS[*v])));
    filters
}

fn dataset_rows() -> impl Strategy<Value = Vec<(i32, usize, i32)>> {
    proptest::collection::vec((0i32..5, 0usize..3, 1i32..10), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn filtering_is_idempotent(
        rows in dataset_rows(),
        a in proptest::collection::vec(0i32..5, 0..3),
        b in proptest::collection::vec(0usize..3, 0..3),
    ) {
        let records = build(&rows);
        let filters = filters(&a, &b);
        let engine = FilteringEngine::default();

        let once = engine.filter(&records, &filters, &[]);
        let twice = engine.filter(once.iter().copied(), &filters, &[]);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn filtering_is_and_across_or_within(
        rows in dataset_rows(),
        a in proptest::collection::vec(0i32..5, 0..3),
        b in proptest::collection::vec(0usize..3, 0..3),
    ) {
        let records = build(&rows);
        let engine = FilteringEngine::default();
        let kept = engine.filter(&records, &filters(&a, &b), &[]).len();

        let expected = rows
            .iter()
            .filter(|(ra, rb, _)| (a.is_empty() || a.contains(ra)) && (b.is_empty() || b.contains(rb)))
            .count();
        prop_assert_eq!(kept, expected);
    }

    #[test]
    fn ignoring_a_dimension_drops_its_criterion(
        rows in dataset_rows(),
        a in proptest::collection::vec(0i32..5, 1..3),
        b in proptest::collection::vec(0usize..3, 0..3),
    ) {
        let records = build(&rows);
        let engine = FilteringEngine::default();
        let ignored = engine.filter(&records, &filters(&a, &b), &["A"]);
        let without = engine.filter(&records, &filters(&[], &b), &[]);
        prop_assert_eq!(ignored, without);
    }

    #[test]
    fn cloned_filters_are_independent(
        a in proptest::collection::vec(0i32..5, 0..4),
        b in proptest::collection::vec(0usize..3, 0..3),
        extra in 5i32..100,
    ) {
        let original = filters(&a, &b);
        let snapshot = original.clone();
        prop_assert_eq!(&original, &snapshot);

        let mut copy = original.clone();
        copy.upsert_selections("A", vec![Value::from(extra)]);
        copy.toggle_single("B", Value::from("w"), false);
        copy.upsert_selections("C", vec![Value::from(1)]);

        prop_assert_eq!(&original, &snapshot);
        prop_assert_ne!(&copy, &original);
    }

    #[test]
    fn playback_stops_on_the_last_position(
        max in 1usize..400,
        begin in 0usize..400,
        width in 0usize..50,
    ) {
        let begin = begin.min(max);
        let end = (begin + width).min(max);
        let mut slider = RangeSlider::new(0, max);
        slider.set_range(begin, end);
        slider.start_playing(None);

        let mut ticks = 0;
        while slider.is_playing() {
            let range = slider.tick().expect("playing slider ticks");
            prop_assert!(range.end <= max);
            prop_assert!(range.begin <= range.end);
            ticks += 1;
            prop_assert!(ticks <= max + 1, "playback never stopped");
        }
        prop_assert_eq!(slider.range().end, max);
    }
}
