use tracing::debug;

use crate::config::{HintWeights, ScoringConfig};
use crate::domain::{
    DrawRecord, Hint, HintRule, Outcome, Prediction, Size, Validation, DEFAULT_BIG_THRESHOLD,
};

/// Rule-based Big/Small scorer over the most recent draws
#[derive(Debug, Clone)]
pub struct TrendScorer {
    config: ScoringConfig,
}

impl Default for TrendScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

impl TrendScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn classify(&self, number: u8) -> Size {
        Size::classify(number, self.config.big_threshold)
    }

    /// Predict the next period from a newest-first history.
    ///
    /// Returns `None` for an empty history. Only the newest `window` draws are
    /// considered; the result depends on nothing but that slice.
    pub fn predict(&self, history: &[DrawRecord]) -> Option<Prediction> {
        let newest = history.first()?;

        // Oldest to newest within the window
        let window: Vec<&DrawRecord> = history
            .iter()
            .take(self.config.window.max(1))
            .rev()
            .collect();

        let colors: Vec<String> = window
            .iter()
            .map(|r| r.color.trim().to_lowercase())
            .collect();
        let types: Vec<Size> = window.iter().map(|r| self.classify(r.number)).collect();
        let numbers: Vec<u8> = window.iter().map(|r| r.number).collect();

        let HintWeights {
            color_cycle,
            alternation,
            issue_parity,
            gap,
        } = self.config.weights;

        let mut hints = Vec::new();
        if let Some((signal, rationale)) = color_cycle_hint(&colors) {
            hints.push(hint(HintRule::ColorCycle, signal, color_cycle, rationale));
        }
        if let Some((signal, rationale)) =
            alternation_hint(&types, self.config.alternation_min_records)
        {
            hints.push(hint(HintRule::Alternation, signal, alternation, rationale));
        }
        if let Some((signal, rationale)) = issue_parity_hint(newest) {
            hints.push(hint(HintRule::IssueParity, signal, issue_parity, rationale));
        }
        if let Some((signal, rationale)) = gap_hint(&numbers, self.config.gap_threshold) {
            hints.push(hint(HintRule::Gap, signal, gap, rationale));
        }

        let (big, small) = hints.iter().fold((0u32, 0u32), |(big, small), h| match h.signal {
            Size::Big => (big + h.weight, small),
            Size::Small => (big, small + h.weight),
        });
        // Ties and an empty tally go to Big
        let signal = if small > big { Size::Small } else { Size::Big };

        let period = newest.issue.next();
        debug!(
            period = %period,
            signal = %signal,
            big,
            small,
            hints = hints.len(),
            "scored next period"
        );

        Some(Prediction {
            period,
            signal,
            hints,
        })
    }

    /// Compare a prediction with the draw that resolved it
    pub fn validate(&self, prediction: &Prediction, resolved: &DrawRecord) -> Validation {
        validate_with(prediction, resolved, self.config.big_threshold)
    }
}

/// Validate with the default number boundary
pub fn validate(prediction: &Prediction, resolved: &DrawRecord) -> Validation {
    validate_with(prediction, resolved, DEFAULT_BIG_THRESHOLD)
}

fn validate_with(prediction: &Prediction, resolved: &DrawRecord, big_threshold: u8) -> Validation {
    let actual = Size::classify(resolved.number, big_threshold);
    Validation {
        period: resolved.issue.clone(),
        signal: prediction.signal,
        outcome: if actual == prediction.signal {
            Outcome::Win
        } else {
            Outcome::Loss
        },
        winning_number: resolved.number,
    }
}

fn hint(rule: HintRule, signal: Size, weight: u32, rationale: String) -> Hint {
    Hint {
        rule,
        signal,
        weight,
        rationale,
    }
}

/// Last three colors, oldest first
fn color_cycle_hint(colors: &[String]) -> Option<(Size, String)> {
    let [a, b, c] = colors.get(colors.len().checked_sub(3)?..)? else {
        return None;
    };
    let signal = match (a.as_str(), b.as_str(), c.as_str()) {
        ("red", "green", "green") => Size::Small,
        ("green", "green", "green") => Size::Big,
        _ => return None,
    };
    Some((signal, format!("colors {a} -> {b} -> {c}")))
}

fn alternation_hint(types: &[Size], min_records: usize) -> Option<(Size, String)> {
    if types.len() < min_records.max(3) {
        return None;
    }
    let last = &types[types.len() - 3..];
    let signal = match last {
        [Size::Big, Size::Small, Size::Big] => Size::Small,
        [Size::Small, Size::Big, Size::Small] => Size::Big,
        _ => return None,
    };
    Some((
        signal,
        format!("sizes {} -> {} -> {}", last[0], last[1], last[2]),
    ))
}

fn issue_parity_hint(newest: &DrawRecord) -> Option<(Size, String)> {
    let digit = newest.issue.last_digit()?;
    if digit % 2 == 0 {
        Some((Size::Big, format!("issue ends in even digit {digit}")))
    } else {
        Some((Size::Small, format!("issue ends in odd digit {digit}")))
    }
}

fn gap_hint(numbers: &[u8], threshold: f64) -> Option<(Size, String)> {
    if numbers.len() < 2 {
        return None;
    }
    let total: u32 = numbers
        .windows(2)
        .map(|w| u32::from(w[0].abs_diff(w[1])))
        .sum();
    let mean = f64::from(total) / (numbers.len() - 1) as f64;
    let signal = if mean >= threshold {
        Size::Big
    } else {
        Size::Small
    };
    Some((signal, format!("mean gap {mean:.2} over {} draws", numbers.len())))
}
