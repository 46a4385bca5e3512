//! Ready-made reward functions over log lines.

use droidlern_core::{LogLines, Reward};
use serde::{Deserialize, Serialize};

/// Pays `reward` for every log line that contains `keyword`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordReward {
    pub keyword: String,
    #[serde(default = "default_keyword_reward")]
    pub reward: f32,
}

fn default_keyword_reward() -> f32 {
    1.0
}

impl KeywordReward {
    pub fn new(keyword: impl Into<String>, reward: f32) -> Self {
        Self {
            keyword: keyword.into(),
            reward,
        }
    }
}

impl Reward for KeywordReward {
    fn reward(&mut self, lines: LogLines) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let hits = lines.filter(|line| line.contains(&self.keyword)).count() as f32;
        hits * self.reward
    }
}

/// The same reward on every step, regardless of the log.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantReward(pub f32);

impl Reward for ConstantReward {
    fn reward(&mut self, _lines: LogLines) -> f32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> LogLines {
        raw.iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn keyword_reward_counts_matching_lines() {
        let mut reward = KeywordReward::new("LEVEL_COMPLETE", 2.5);
        let got = reward.reward(lines(&[
            "I/Game: LEVEL_COMPLETE 1",
            "D/Other: noise",
            "I/Game: LEVEL_COMPLETE 2",
        ]));
        assert!((got - 5.0).abs() < f32::EPSILON);
        assert!(reward.reward(lines(&[])).abs() < f32::EPSILON);
    }

    #[test]
    fn keyword_reward_defaults_to_one_per_hit() {
        let reward: KeywordReward = serde_json::from_str(r#"{"keyword":"win"}"#).unwrap();
        assert!((reward.reward - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn constant_reward_ignores_log() {
        let mut reward = ConstantReward(-0.1);
        assert!((reward.reward(lines(&["anything"])) + 0.1).abs() < f32::EPSILON);
    }
}
