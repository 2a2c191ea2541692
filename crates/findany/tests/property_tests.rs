// Property tests: every matcher agrees with a naive scan
//
// Needles and haystacks are drawn from a small alphabet so that matches are
// frequent. The alphabet mixes ASCII letters, punctuation, Latin-1 and Latin
// Extended letters, a letter whose uppercase is ASCII, the Kelvin sign and a
// Deseret pair, which covers every case mode and the surrogate paths.

use findany::{ByteSearchValues, CharSearchValues, Isa, MatchMode, SearchValues, StringSearchValues};
use findany_match_mode::fold_utf16;
use proptest::prelude::*;

const ALPHABET: &[char] = &[
    'a', 'b', 'c', 'A', 'B', 'k', ' ', '-', '\u{e9}', '\u{c9}', '\u{142}', '\u{131}', '\u{212a}',
    '\u{20ac}', '\u{10400}', '\u{10428}',
];

fn text(max: usize) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(prop::sample::select(ALPHABET), 0..max)
        .prop_map(|chars| chars.into_iter().collect::<String>().encode_utf16().collect())
}

fn needle() -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(prop::sample::select(ALPHABET), 1..5)
        .prop_map(|chars| chars.into_iter().collect::<String>().encode_utf16().collect())
}

fn needles(max: usize) -> impl Strategy<Value = Vec<Vec<u16>>> {
    prop::collection::vec(needle(), 0..max)
}

/// Code units biased towards ASCII and one Cyrillic block, plus anything.
fn unit() -> impl Strategy<Value = u16> {
    prop_oneof![0x20u16..0x7F, 0x400u16..0x460, any::<u16>()]
}

fn prepare(needles: &[Vec<u16>], haystack: &[u16], ignore_case: bool) -> (Vec<Vec<u16>>, Vec<u16>) {
    if ignore_case {
        (needles.iter().map(|n| fold_utf16(n)).collect(), fold_utf16(haystack))
    } else {
        (needles.to_vec(), haystack.to_vec())
    }
}

/// Shortest needle at `start`, lowest index on ties.
fn needle_at(needles: &[Vec<u16>], haystack: &[u16], start: usize) -> Option<usize> {
    (0..needles.len())
        .filter(|&i| haystack[start..].starts_with(&needles[i]))
        .min_by_key(|&i| (needles[i].len(), i))
}

fn naive_first(needles: &[Vec<u16>], haystack: &[u16], ignore_case: bool) -> Option<(usize, usize)> {
    let (needles, haystack) = prepare(needles, haystack, ignore_case);
    (0..=haystack.len()).find_map(|start| needle_at(&needles, &haystack, start).map(|i| (i, start)))
}

fn naive_last(needles: &[Vec<u16>], haystack: &[u16], ignore_case: bool) -> Option<(usize, usize)> {
    let (needles, haystack) = prepare(needles, haystack, ignore_case);
    (0..=haystack.len())
        .rev()
        .find_map(|start| needle_at(&needles, &haystack, start).map(|i| (i, start)))
}

fn build(needles: &[Vec<u16>], ignore_case: bool) -> StringSearchValues {
    StringSearchValues::from_utf16(needles, MatchMode::from_ignore_case(ignore_case))
        .expect("needles from valid strings always build")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Leftmost match and the reporting needle agree with a naive scan
    #[test]
    fn find_matches_naive(needles in needles(6), haystack in text(300), ignore_case in any::<bool>()) {
        let set = build(&needles, ignore_case);
        let found = set.find(&haystack).map(|m| (m.needle(), m.start()));
        prop_assert_eq!(found, naive_first(&needles, &haystack, ignore_case), "strategy {}", set.strategy_name());
        prop_assert_eq!(set.contains_any(&haystack), found.is_some());
        if let Some(m) = set.find(&haystack) {
            prop_assert_eq!(m.len(), set.needle(m.needle()).len());
        }
    }

    /// Greatest-start match agrees with a naive scan
    #[test]
    fn rfind_matches_naive(needles in needles(6), haystack in text(300), ignore_case in any::<bool>()) {
        let set = build(&needles, ignore_case);
        let found = set.rfind(&haystack).map(|m| (m.needle(), m.start()));
        prop_assert_eq!(found, naive_last(&needles, &haystack, ignore_case), "strategy {}", set.strategy_name());
    }

    /// Many needles force the automaton path, with and without Rabin-Karp
    #[test]
    fn large_sets_match_naive(needles in needles(80), haystack in text(400), ignore_case in any::<bool>()) {
        let set = build(&needles, ignore_case);
        prop_assert_eq!(
            set.find(&haystack).map(|m| (m.needle(), m.start())),
            naive_first(&needles, &haystack, ignore_case)
        );
        prop_assert_eq!(
            set.last_index_of_any(&haystack),
            naive_last(&needles, &haystack, ignore_case).map(|(_, start)| start)
        );
    }

    /// Positions do not depend on the order needles were supplied in
    #[test]
    fn order_independent(needles in needles(6), haystack in text(120), ignore_case in any::<bool>()) {
        let forward = build(&needles, ignore_case);
        let reversed: Vec<Vec<u16>> = needles.iter().rev().cloned().collect();
        let backward = build(&reversed, ignore_case);
        prop_assert_eq!(forward.index_of_any(&haystack), backward.index_of_any(&haystack));
        prop_assert_eq!(forward.last_index_of_any(&haystack), backward.last_index_of_any(&haystack));
    }

    /// Last match never starts before the first one
    #[test]
    fn last_not_before_first(needles in needles(6), haystack in text(120)) {
        let set = build(&needles, false);
        match (set.index_of_any(&haystack), set.last_index_of_any(&haystack)) {
            (Some(first), Some(last)) => prop_assert!(first <= last),
            (None, None) => {}
            other => prop_assert!(false, "first/last disagree: {:?}", other),
        }
    }

    /// The portable kernels and the detected ones give identical answers
    #[test]
    fn portable_agrees_with_detected(needles in needles(6), haystack in text(300), ignore_case in any::<bool>()) {
        let portable = SearchValues::builder()
            .ignore_case(ignore_case)
            .isa(Isa::Portable)
            .build_utf16(&needles)
            .unwrap();
        let detected = SearchValues::builder()
            .ignore_case(ignore_case)
            .build_utf16(&needles)
            .unwrap();
        prop_assert_eq!(portable.strategy_name(), detected.strategy_name());
        prop_assert_eq!(
            portable.find(&haystack).map(|m| (m.needle(), m.start())),
            detected.find(&haystack).map(|m| (m.needle(), m.start()))
        );
        prop_assert_eq!(portable.last_index_of_any(&haystack), detected.last_index_of_any(&haystack));
    }

    /// Character sets of every size agree with a membership scan
    #[test]
    fn char_set_matches_naive(
        values in prop::collection::vec(unit(), 0..120),
        haystack in prop::collection::vec(unit(), 0..200),
    ) {
        for isa in [Isa::Portable, Isa::detect()] {
            let set = SearchValues::builder().isa(isa).build_chars(&values).unwrap();
            let member = |u: &u16| values.contains(u);
            prop_assert_eq!(set.index_of_any(&haystack), haystack.iter().position(member));
            prop_assert_eq!(set.last_index_of_any(&haystack), haystack.iter().rposition(member));
            prop_assert_eq!(set.index_of_any_except(&haystack), haystack.iter().position(|u| !member(u)));
            prop_assert_eq!(
                set.last_index_of_any_except(&haystack),
                haystack.iter().rposition(|u| !member(u))
            );
            prop_assert_eq!(set.contains_any(&haystack), haystack.iter().any(member));
        }
    }

    /// Byte sets agree with a membership scan
    #[test]
    fn byte_set_matches_naive(
        values in prop::collection::vec(any::<u8>(), 0..40),
        haystack in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let set = ByteSearchValues::new(&values);
        let member = |b: &u8| values.contains(b);
        prop_assert_eq!(set.index_of_any(&haystack), haystack.iter().position(member));
        prop_assert_eq!(set.last_index_of_any(&haystack), haystack.iter().rposition(member));
        prop_assert_eq!(set.index_of_any_except(&haystack), haystack.iter().position(|b| !member(b)));
        prop_assert_eq!(
            set.last_index_of_any_except(&haystack),
            haystack.iter().rposition(|b| !member(b))
        );
    }

}

proptest! {
    // Expanding a non-ASCII case class scans the whole BMP.
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// A case-insensitive character set is the union of case classes
    #[test]
    fn char_set_ignore_case(values in prop::collection::vec(unit(), 0..4), haystack in text(80)) {
        let set = CharSearchValues::new_ignore_case(&values);
        let folded: Vec<u16> = values.iter().map(|&v| fold_utf16(&[v])[0]).collect();
        let expected = haystack.iter().position(|&u| folded.contains(&fold_utf16(&[u])[0]));
        prop_assert_eq!(set.index_of_any(&haystack), expected);
    }
}
