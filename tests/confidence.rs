//! Confidence Scoring Integration Tests
//!
//! End-to-end scenarios and property tests for match confidence.

use groundcheck::domain::{PatternMatcher, RegexMatcher, TextMatch, Token};
use groundcheck::evidence::{match_confidence, match_confidence_with, Attribution};
use proptest::prelude::*;

fn id_tokens() -> Vec<Token> {
    vec![
        Token::new("The", -0.1),
        Token::new(" id", -0.2),
        Token::new(" is", -0.05),
        Token::new(" abc-123", -2.3),
    ]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_identifier_in_final_token() {
    let tokens = id_tokens();
    let matches = vec![TextMatch::new("abc-123", 10, 17)];

    let scored = match_confidence(&matches, Some(&tokens));
    assert_eq!(scored.len(), 1);
    assert_eq!(scored[0].text, "abc-123");
    assert!(approx(scored[0].confidence, (-2.3f64).exp()));
    assert!((scored[0].confidence - 0.100).abs() < 1e-3);
}

#[test]
fn test_absent_identifier_is_omitted() {
    let tokens = id_tokens();
    let matches = vec![TextMatch::new("xyz-999", 100, 107)];

    assert!(match_confidence(&matches, Some(&tokens)).is_empty());
}

#[test]
fn test_adjacent_matches_scored_independently() {
    let tokens = vec![
        Token::new("aa", -0.5),
        Token::new("-1", -0.5),
        Token::new(" ", -0.01),
        Token::new("bb", -1.0),
        Token::new("-2", -3.0),
    ];
    let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
    let matcher = RegexMatcher::new(r"[a-z]{2}-\d", false).unwrap();
    let matches = matcher.find_matches(&text);
    assert_eq!(matches.len(), 2);

    for attribution in [Attribution::AllOverlapping, Attribution::CurrentMatch] {
        let scored = match_confidence_with(&matches, Some(&tokens), attribution);
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].text, "aa-1");
        assert!(approx(scored[0].confidence, (-0.5f64).exp()));
        assert_eq!(scored[1].text, "bb-2");
        assert!(approx(scored[1].confidence, (-2.0f64).exp()));
    }
}

#[test]
fn test_missing_token_stream() {
    let matches = vec![TextMatch::new("abc-123", 10, 17)];
    assert!(match_confidence(&matches, None).is_empty());
    assert!(match_confidence(&matches, Some(&[])).is_empty());
}

#[test]
fn test_match_spanning_two_tokens() {
    let tokens = vec![Token::new("abc", -0.0), Token::new("-123", -4.0)];
    let matches = vec![TextMatch::new("abc-123", 0, 7)];

    let scored = match_confidence(&matches, Some(&tokens));
    assert_eq!(scored.len(), 1);
    assert!(approx(scored[0].confidence, (-2.0f64).exp()));
    assert!((scored[0].confidence - 0.135).abs() < 1e-3);
}

#[test]
fn test_multibyte_text_uses_byte_offsets() {
    let tokens = vec![
        Token::new("Café", -0.3),
        Token::new(" ", -0.1),
        Token::new("abc-123", -0.7),
    ];
    let text: String = tokens.iter().map(|t| t.text.as_str()).collect();
    let matches = RegexMatcher::new(r"abc-\d+", false)
        .unwrap()
        .find_matches(&text);

    let scored = match_confidence(&matches, Some(&tokens));
    assert_eq!(scored.len(), 1);
    assert!(approx(scored[0].confidence, (-0.7f64).exp()));
}

#[test]
fn test_straddling_token_attribution_modes() {
    // "-1e" ends the first id and starts the second
    let tokens = vec![
        Token::new("d", -0.1),
        Token::new("-1e", -0.2),
        Token::new("-2", -0.3),
    ];
    let matches = vec![TextMatch::new("d-1", 0, 3), TextMatch::new("e-2", 3, 6)];

    let current = match_confidence_with(&matches, Some(&tokens), Attribution::CurrentMatch);
    assert_eq!(current.len(), 2);
    assert!(approx(current[1].confidence, (-0.3f64).exp()));

    let all = match_confidence_with(&matches, Some(&tokens), Attribution::AllOverlapping);
    assert_eq!(all.len(), 2);
    assert!(approx(all[0].confidence, (-0.15f64).exp()));
    assert!(approx(all[1].confidence, (-0.25f64).exp()));
}

// ============================================================================
// Properties
// ============================================================================

/// Tokens of 1-4 ASCII letters with log-probabilities in [-10, 0]
fn token_stream() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(("[a-z ]{1,4}", -10.0f64..=0.0), 1..40)
        .prop_map(|parts| parts.into_iter().map(|(t, lp)| Token::new(t, lp)).collect())
}

/// Sorted, non-overlapping matches labelled m0, m1, ... (may run past the text)
fn match_list() -> impl Strategy<Value = Vec<TextMatch>> {
    prop::collection::vec((0usize..6, 1usize..8), 0..10).prop_map(|layout| {
        let mut offset = 0;
        layout
            .into_iter()
            .enumerate()
            .map(|(i, (gap, len))| {
                let start = offset + gap;
                offset = start + len;
                TextMatch::new(format!("m{}", i), start, offset)
            })
            .collect()
    })
}

fn label_index(text: &str) -> usize {
    text[1..].parse().unwrap()
}

proptest! {
    #[test]
    fn prop_no_matches_no_output(tokens in token_stream()) {
        prop_assert!(match_confidence(&[], Some(&tokens)).is_empty());
    }

    #[test]
    fn prop_no_tokens_no_output(matches in match_list()) {
        prop_assert!(match_confidence(&matches, Some(&[])).is_empty());
        prop_assert!(match_confidence(&matches, None).is_empty());
    }

    #[test]
    fn prop_exact_cover_is_geometric_mean(
        tokens in token_stream(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>()
    ) {
        let (i, j) = {
            let (x, y) = (a.index(tokens.len()), b.index(tokens.len()));
            (x.min(y), x.max(y))
        };
        let start: usize = tokens[..i].iter().map(|t| t.len()).sum();
        let end: usize = start + tokens[i..=j].iter().map(|t| t.len()).sum::<usize>();
        let matches = vec![TextMatch::new("m0", start, end)];

        let covered: Vec<f64> = tokens[i..=j].iter().map(|t| t.logprob).collect();
        let expected = (covered.iter().sum::<f64>() / covered.len() as f64).exp();

        for attribution in [Attribution::AllOverlapping, Attribution::CurrentMatch] {
            let scored = match_confidence_with(&matches, Some(&tokens), attribution);
            prop_assert_eq!(scored.len(), 1);
            prop_assert!((scored[0].confidence - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_confidence_in_unit_interval(tokens in token_stream(), matches in match_list()) {
        for attribution in [Attribution::AllOverlapping, Attribution::CurrentMatch] {
            for scored in match_confidence_with(&matches, Some(&tokens), attribution) {
                prop_assert!(scored.confidence > 0.0);
                prop_assert!(scored.confidence <= 1.0);
            }
        }
    }

    #[test]
    fn prop_matches_past_text_are_omitted(tokens in token_stream(), matches in match_list()) {
        let text_len: usize = tokens.iter().map(|t| t.len()).sum();
        let scored = match_confidence(&matches, Some(&tokens));

        for s in &scored {
            let m = &matches[label_index(&s.text)];
            prop_assert!(m.start < text_len);
        }
        let in_range = matches.iter().filter(|m| m.start < text_len).count();
        prop_assert_eq!(scored.len(), in_range);
    }

    #[test]
    fn prop_output_preserves_match_order(tokens in token_stream(), matches in match_list()) {
        for attribution in [Attribution::AllOverlapping, Attribution::CurrentMatch] {
            let indices: Vec<usize> = match_confidence_with(&matches, Some(&tokens), attribution)
                .iter()
                .map(|s| label_index(&s.text))
                .collect();
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
