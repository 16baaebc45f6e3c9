//! Property-based tests for ambiguous and recursive grammars
//!
//! The grammar under test segments a line into words from a small
//! vocabulary where one word is the concatenation of two others:
//!
//! - WORD := "a" | "b" | "ab"
//! - S    := WORD | WORD S
//!
//! so the number of full matches can be counted independently.

use polyparse_core::{full_match, literal, named, Alternation, Grammar};
use proptest::prelude::*;

const VOCABULARY: [&str; 3] = ["a", "b", "ab"];

fn vocabulary() -> Grammar {
    VOCABULARY
        .iter()
        .map(|word| named("word", literal(word).unwrap()))
        .reduce(|acc, word| acc | word)
        .unwrap()
}

fn segmenter() -> Grammar {
    let word = vocabulary();
    let s = Grammar::new(Alternation::new([word.clone()]));
    s.add_alternative(word + s.clone()).unwrap();
    full_match(s)
}

/// Reference count of segmentations, by direct recursion.
fn count_segmentations(input: &str) -> usize {
    if input.is_empty() {
        return 1;
    }
    VOCABULARY
        .iter()
        .filter(|word| input.starts_with(*word))
        .map(|word| count_segmentations(&input[word.len()..]))
        .sum()
}

fn input_strategy() -> impl Strategy<Value = String> {
    "[ab]{1,8}"
}

proptest! {
    #[test]
    fn segmentation_count_matches_reference(input in input_strategy()) {
        let found = segmenter().parse_all(input.as_str()).map_or(0, |v| v.len());
        prop_assert_eq!(found, count_segmentations(&input));
    }

    #[test]
    fn full_matches_cover_the_input(input in input_strategy()) {
        for variant in segmenter().parse_all(input.as_str()).unwrap() {
            prop_assert!(variant.is_complete());
            prop_assert_eq!(variant.state.text(), input.clone());

            let words: String = variant
                .state
                .captures()
                .into_iter()
                .map(|(_, state)| state.text())
                .collect();
            prop_assert_eq!(words, input.clone());
        }
    }

    #[test]
    fn repeated_parses_are_identical(input in "[abc]{0,8}") {
        let grammar = segmenter();
        let first = grammar.parse_all(input.as_str());
        let second = grammar.parse_all(input.as_str());
        let fresh = segmenter().parse_all(input.as_str());
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &fresh);
    }

    #[test]
    fn memoized_and_direct_alternation_agree(input in "[abc]{0,4}") {
        let alt = vocabulary();
        let direct = alt.as_alternation().unwrap().parse_direct(input.as_str()).ok();
        let memoized = alt.parse_all(input.as_str()).ok();
        prop_assert_eq!(direct, memoized);
    }
}
