use serde::{Deserialize, Serialize};
use std::fmt;

use super::draw::{IssueId, Size};

/// Heuristic rule that produced a hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintRule {
    ColorCycle,
    Alternation,
    IssueParity,
    Gap,
}

impl HintRule {
    pub fn label(&self) -> &'static str {
        match self {
            HintRule::ColorCycle => "Color Cycle",
            HintRule::Alternation => "Alternation",
            HintRule::IssueParity => "Issue Parity",
            HintRule::Gap => "Gap Analysis",
        }
    }
}

/// One rule's vote plus its rationale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub rule: HintRule,
    pub signal: Size,
    pub weight: u32,
    pub rationale: String,
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.rule.label(), self.signal, self.rationale)
    }
}

/// Predicted category for the next period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Issue id of the period being predicted
    pub period: IssueId,
    pub signal: Size,
    /// Every firing rule, in evaluation order
    pub hints: Vec<Hint>,
}

impl Prediction {
    /// Human-readable rationale lines
    pub fn rationale(&self) -> Vec<String> {
        self.hints.iter().map(|h| h.to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn is_win(&self) -> bool {
        matches!(self, Outcome::Win)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Win => write!(f, "WIN"),
            Outcome::Loss => write!(f, "LOSS"),
        }
    }
}

/// Result of checking a prediction against the draw that resolved it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    /// Issue id of the resolving draw
    pub period: IssueId,
    pub signal: Size,
    pub outcome: Outcome,
    pub winning_number: u8,
}

/// Running win/loss tallies across validations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub total: u64,
    pub wins: u64,
    pub losses: u64,
    pub win_streak: u32,
    pub loss_streak: u32,
    pub max_win_streak: u32,
    pub max_loss_streak: u32,
}

impl Scoreboard {
    /// Fold one validation into the tallies
    pub fn record(&mut self, outcome: Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Win => {
                self.wins += 1;
                self.win_streak += 1;
                self.loss_streak = 0;
                self.max_win_streak = self.max_win_streak.max(self.win_streak);
            }
            Outcome::Loss => {
                self.losses += 1;
                self.loss_streak += 1;
                self.win_streak = 0;
                self.max_loss_streak = self.max_loss_streak.max(self.loss_streak);
            }
        }
    }

    /// Fraction of validations won, 0.0 before the first one
    pub fn win_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.wins as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_streaks() {
        let mut board = Scoreboard::default();
        assert_eq!(board.win_rate(), 0.0);

        for outcome in [Outcome::Win, Outcome::Win, Outcome::Loss, Outcome::Win] {
            board.record(outcome);
        }

        assert_eq!(board.total, 4);
        assert_eq!(board.wins, 3);
        assert_eq!(board.losses, 1);
        assert_eq!(board.win_streak, 1);
        assert_eq!(board.loss_streak, 0);
        assert_eq!(board.max_win_streak, 2);
        assert_eq!(board.max_loss_streak, 1);
        assert!((board.win_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hint_display() {
        let hint = Hint {
            rule: HintRule::IssueParity,
            signal: Size::Small,
            weight: 2,
            rationale: "issue ends in odd digit 3".to_string(),
        };
        assert_eq!(hint.to_string(), "Issue Parity: Small (issue ends in odd digit 3)");
    }
}
