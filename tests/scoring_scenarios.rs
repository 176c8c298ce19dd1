use wingo::config::ScoringConfig;
use wingo::domain::HintRule;
use wingo::{validate, DrawRecord, Outcome, Prediction, Size, TrendScorer};

/// Newest-first history from oldest-first `(issue, number, color)` triples
fn newest_first(draws: &[(&str, u8, &str)]) -> Vec<DrawRecord> {
    draws
        .iter()
        .rev()
        .map(|(issue, n, c)| DrawRecord::new(*issue, *n, *c))
        .collect()
}

fn rules(prediction: &Prediction) -> Vec<HintRule> {
    prediction.hints.iter().map(|h| h.rule).collect()
}

#[test]
fn number_boundary() {
    assert_eq!(Size::of(4), Size::Small);
    assert_eq!(Size::of(5), Size::Big);
    assert_eq!(Size::of(0), Size::Small);
    assert_eq!(Size::of(9), Size::Big);
}

#[test]
fn red_green_green_votes_small() {
    // Issue ids without a trailing digit keep the parity rule quiet
    let history = newest_first(&[
        ("P-1a", 6, "green"),
        ("P-2a", 1, "red"),
        ("P-3a", 2, "green"),
        ("P-4a", 1, "green"),
    ]);
    let prediction = TrendScorer::default().predict(&history).unwrap();

    assert_eq!(prediction.signal, Size::Small);
    assert!(rules(&prediction).contains(&HintRule::ColorCycle));
    assert!(!rules(&prediction).contains(&HintRule::IssueParity));
    let color = &prediction.hints[0];
    assert_eq!(color.rule, HintRule::ColorCycle);
    assert_eq!(color.weight, 2);
}

#[test]
fn green_green_green_votes_big() {
    let history = newest_first(&[("10a", 9, "green"), ("11a", 0, "green"), ("12a", 9, "green")]);
    let prediction = TrendScorer::default().predict(&history).unwrap();
    assert_eq!(prediction.signal, Size::Big);
    assert_eq!(rules(&prediction), vec![HintRule::ColorCycle, HintRule::Gap]);
}

#[test]
fn odd_issue_parity_dominates_flat_numbers() {
    let history = newest_first(&[
        ("20240101100010000", 2, "red"),
        ("20240101100010001", 2, "red"),
        ("20240101100010002", 2, "red"),
        ("20240101100010003", 2, "red"),
    ]);
    let prediction = TrendScorer::default().predict(&history).unwrap();

    assert_eq!(prediction.signal, Size::Small);
    assert_eq!(rules(&prediction), vec![HintRule::IssueParity, HintRule::Gap]);
    assert_eq!(prediction.period.as_str(), "20240101100010004");
}

#[test]
fn even_issue_outweighs_small_gap() {
    // Parity Big (2) against gap Small (1) -> Big
    let history = newest_first(&[("100", 2, "red"), ("101", 3, "green"), ("102", 2, "red")]);
    let prediction = TrendScorer::default().predict(&history).unwrap();
    assert_eq!(prediction.signal, Size::Big);
}

#[test]
fn empty_history_yields_no_prediction() {
    assert!(TrendScorer::default().predict(&[]).is_none());
}

#[test]
fn single_free_form_draw_defaults_to_big() {
    let history = newest_first(&[("first", 1, "red")]);
    let prediction = TrendScorer::default().predict(&history).unwrap();
    assert!(prediction.hints.is_empty());
    assert_eq!(prediction.signal, Size::Big);
    assert_eq!(prediction.period.as_str(), "first1");
}

#[test]
fn prediction_is_deterministic() {
    let history = newest_first(&[
        ("901", 8, "red"),
        ("902", 1, "green"),
        ("903", 7, "red"),
        ("904", 0, "red,violet"),
        ("905", 5, "green,violet"),
    ]);
    let scorer = TrendScorer::default();
    let first = scorer.predict(&history).unwrap();
    for _ in 0..5 {
        assert_eq!(scorer.predict(&history).unwrap(), first);
    }
}

#[test]
fn weights_are_configurable() {
    let history = newest_first(&[
        ("20240101100010000", 2, "red"),
        ("20240101100010001", 2, "red"),
    ]);
    let mut config = ScoringConfig::default();
    config.weights.issue_parity = 0;
    let prediction = TrendScorer::new(config).predict(&history).unwrap();
    // Parity still reported but carries no weight; gap Small (1) wins
    assert_eq!(prediction.hints.len(), 2);
    assert_eq!(prediction.signal, Size::Small);
}

#[test]
fn validation_outcomes() {
    let prediction = Prediction {
        period: "5".into(),
        signal: Size::Big,
        hints: Vec::new(),
    };

    let win = validate(&prediction, &DrawRecord::new("5", 7, "green"));
    assert_eq!(win.outcome, Outcome::Win);
    assert_eq!(win.winning_number, 7);

    let loss = validate(&prediction, &DrawRecord::new("5", 3, "green"));
    assert_eq!(loss.outcome, Outcome::Loss);
    assert_eq!(loss.signal, Size::Big);
}
