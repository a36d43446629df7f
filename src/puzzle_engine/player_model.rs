//! Per-learner, per-family rolling statistics.
//!
//! The model is a plain value: [`update_model_from_attempt`] returns a new
//! model and never mutates its input. The host owns the one live instance.
//!
//! Serialised layout (one entry per family ever played):
//!
//! ```json
//! { "progression": { "attempts": 12, "correct": 9, "window": [true, false, true],
//!                    "lastTier": 2, "streak": 1, "lastPlayedMs": 1700000000000,
//!                    "lastPuzzleId": "PR-1A2B3C4D" } }
//! ```

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::puzzle_engine::{
    config::EngineConfig,
    models::{AttemptResult, LogicFamily},
    patterns,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RollingStats {
    pub attempts: u32,
    pub correct: u32,
    /// Most recent outcomes at the current tier, oldest first.
    pub window: VecDeque<bool>,
    #[serde(rename = "lastTier")]
    pub last_difficulty_tier: u8,
    /// Consecutive puzzles in this family; 0 once another family is played.
    #[serde(rename = "streak")]
    pub last_played_family_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_ms: Option<u64>,
    /// Puzzle the last attempt belonged to. Retries on it only touch the counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_puzzle_id: Option<String>,
}

impl RollingStats {
    /// Share of correct outcomes in the window, `None` when it is empty.
    pub fn rolling_accuracy(&self) -> Option<f32> {
        if self.window.is_empty() {
            return None;
        }
        let hits = self.window.iter().filter(|&&ok| ok).count();
        Some(hits as f32 / self.window.len() as f32)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerModel {
    pub per_family: BTreeMap<LogicFamily, RollingStats>,
}

impl PlayerModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stats for `family`, zero-initialised if it was never played.
    pub fn stats(&self, family: LogicFamily) -> RollingStats {
        self.per_family.get(&family).cloned().unwrap_or_default()
    }

    pub fn total_correct(&self) -> u32 {
        self.per_family.values().map(|s| s.correct).sum()
    }

    /// Overall player level, starting at 1.
    pub fn level(&self, config: &EngineConfig) -> u32 {
        1 + self.total_correct() / config.correct_per_level.max(1)
    }

    /// Families available at the player's current level, canonical order.
    pub fn unlocked_families(&self, config: &EngineConfig) -> Vec<LogicFamily> {
        let level = self.level(config);
        LogicFamily::ALL
            .into_iter()
            .filter(|f| f.unlock_level() <= level)
            .collect()
    }

    /// Whether the persisted data is internally consistent.
    pub fn is_consistent(&self) -> bool {
        self.per_family.iter().all(|(family, s)| {
            let (lo, hi) = patterns::tier_range(*family);
            s.correct <= s.attempts
                && s.window.len() as u64 <= s.attempts as u64
                && (s.last_difficulty_tier == 0 || (lo..=hi).contains(&s.last_difficulty_tier))
        })
    }

    /// Drop window entries beyond the configured size, keeping the newest.
    pub fn trim_windows(&mut self, window_size: usize) {
        for s in self.per_family.values_mut() {
            while s.window.len() > window_size {
                s.window.pop_front();
            }
        }
    }
}

/// Fold one attempt into the model.
///
/// Appends to the family's window (evicting the oldest entry when full),
/// bumps the counters and the family streak, and resets every other
/// family's streak. An attempt at a tier other than the family's last tier
/// starts a fresh window.
///
/// A second attempt at the same puzzle only bumps `attempts`/`correct`: the
/// window and the streak see one outcome per puzzle, the first one.
pub fn update_model_from_attempt(
    model: &PlayerModel,
    result: &AttemptResult,
    config: &EngineConfig,
) -> PlayerModel {
    let mut next = model.clone();
    for (family, stats) in next.per_family.iter_mut() {
        if *family != result.family {
            stats.last_played_family_streak = 0;
        }
    }

    let stats = next.per_family.entry(result.family).or_default();
    stats.attempts += 1;
    if result.correct {
        stats.correct += 1;
    }
    stats.last_played_ms = Some(result.timestamp_ms);
    if stats.last_puzzle_id.as_deref() == Some(result.puzzle_id.as_str()) {
        return next;
    }
    stats.last_puzzle_id = Some(result.puzzle_id.clone());

    if stats.last_difficulty_tier != result.tier {
        stats.window.clear();
        stats.last_difficulty_tier = result.tier;
    }
    stats.window.push_back(result.correct);
    while stats.window.len() > config.rolling_window_size {
        stats.window.pop_front();
    }
    stats.last_played_family_streak += 1;
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attempt(family: LogicFamily, tier: u8, correct: bool, ts: u64) -> AttemptResult {
        AttemptResult {
            puzzle_id: format!("T-{ts}"),
            family,
            tier,
            correct,
            chosen_element_id: "o0".into(),
            error_type: None,
            timestamp_ms: ts,
        }
    }

    #[test]
    fn unseen_family_is_zero() {
        let m = PlayerModel::new();
        let s = m.stats(LogicFamily::Rotation);
        assert_eq!(s.attempts, 0);
        assert_eq!(s.rolling_accuracy(), None);
    }

    #[test]
    fn window_evicts_oldest() {
        let config = EngineConfig { rolling_window_size: 3, min_samples_for_adjustment: 1, ..Default::default() };
        let mut m = PlayerModel::new();
        for (i, ok) in [false, true, true, true].into_iter().enumerate() {
            m = update_model_from_attempt(&m, &attempt(LogicFamily::Progression, 1, ok, i as u64), &config);
        }
        let s = m.stats(LogicFamily::Progression);
        assert_eq!(s.window, VecDeque::from(vec![true, true, true]));
        assert_eq!(s.attempts, 4);
        assert_eq!(s.correct, 3);
        assert_eq!(s.rolling_accuracy(), Some(1.0));
    }

    #[test]
    fn update_is_functional() {
        let config = EngineConfig::default();
        let before = PlayerModel::new();
        let after = update_model_from_attempt(&before, &attempt(LogicFamily::Repetition, 1, true, 5), &config);
        assert!(before.per_family.is_empty());
        assert_eq!(after.stats(LogicFamily::Repetition).attempts, 1);
    }

    #[test]
    fn streak_resets_when_family_changes() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        m = update_model_from_attempt(&m, &attempt(LogicFamily::Repetition, 1, true, 1), &config);
        m = update_model_from_attempt(&m, &attempt(LogicFamily::Repetition, 1, true, 2), &config);
        assert_eq!(m.stats(LogicFamily::Repetition).last_played_family_streak, 2);
        m = update_model_from_attempt(&m, &attempt(LogicFamily::Progression, 1, true, 3), &config);
        assert_eq!(m.stats(LogicFamily::Repetition).last_played_family_streak, 0);
        assert_eq!(m.stats(LogicFamily::Progression).last_played_family_streak, 1);
    }

    #[test]
    fn retries_on_one_puzzle_count_once_for_window_and_streak() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        let retry = |correct, ts| AttemptResult { puzzle_id: "PR-0000000A".into(), ..attempt(LogicFamily::Progression, 1, correct, ts) };
        m = update_model_from_attempt(&m, &retry(false, 1), &config);
        m = update_model_from_attempt(&m, &retry(false, 2), &config);
        m = update_model_from_attempt(&m, &retry(true, 3), &config);
        let s = m.stats(LogicFamily::Progression);
        assert_eq!(s.window, VecDeque::from(vec![false]));
        assert_eq!(s.last_played_family_streak, 1);
        assert_eq!((s.attempts, s.correct), (3, 1));
        assert_eq!(s.last_played_ms, Some(3));

        m = update_model_from_attempt(&m, &attempt(LogicFamily::Progression, 1, true, 4), &config);
        assert_eq!(m.stats(LogicFamily::Progression).last_played_family_streak, 2);
    }

    #[test]
    fn tier_change_restarts_window_but_keeps_counters() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        m = update_model_from_attempt(&m, &attempt(LogicFamily::Rotation, 1, false, 1), &config);
        m = update_model_from_attempt(&m, &attempt(LogicFamily::Rotation, 2, true, 2), &config);
        let s = m.stats(LogicFamily::Rotation);
        assert_eq!(s.window, VecDeque::from(vec![true]));
        assert_eq!(s.attempts, 2);
        assert_eq!(s.last_difficulty_tier, 2);
    }

    #[test]
    fn level_unlocks_families() {
        let config = EngineConfig { correct_per_level: 2, ..Default::default() };
        let mut m = PlayerModel::new();
        assert_eq!(m.unlocked_families(&config), vec![LogicFamily::Repetition, LogicFamily::Progression]);
        for ts in 0..4 {
            m = update_model_from_attempt(&m, &attempt(LogicFamily::Progression, 1, true, ts), &config);
        }
        assert_eq!(m.level(&config), 3);
        assert_eq!(m.unlocked_families(&config).len(), 5);
    }

    #[test]
    fn serialises_to_the_persisted_layout() {
        let config = EngineConfig::default();
        let m = update_model_from_attempt(&PlayerModel::new(), &attempt(LogicFamily::SizeScaling, 2, true, 9), &config);
        let json = serde_json::to_value(&m).unwrap();
        let entry = &json["size_scaling"];
        assert_eq!(entry["attempts"], 1);
        assert_eq!(entry["correct"], 1);
        assert_eq!(entry["window"], serde_json::json!([true]));
        assert_eq!(entry["lastTier"], 2);
        let back: PlayerModel = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }
}
