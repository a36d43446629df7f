//! Difficulty controller: picks the next family and tier from the player
//! model.
//!
//! Pure function of the model, the config and the caller's RNG. The RNG is
//! only touched when the anti-repeat rule forces a weighted fallback, so a
//! seeded RNG makes selection fully reproducible.

use std::cmp::Ordering;
use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::puzzle_engine::{
    config::EngineConfig,
    models::LogicFamily,
    patterns,
    player_model::{PlayerModel, RollingStats},
};

/// Floor on fallback weights so strong families stay reachable.
const MIN_FALLBACK_WEIGHT: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionReason {
    /// Lowest rolling accuracy among unlocked families.
    WeakestFamily,
    /// The weakest family hit the anti-repeat limit; picked by weighted draw.
    AntiRepeatFallback,
    /// Only one family is unlocked.
    OnlyFamily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TierChange {
    /// Family never played; starts at its lowest tier.
    Initial,
    Promoted,
    Demoted,
    Held,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rationale {
    pub reason: SelectionReason,
    pub tier_change: TierChange,
    /// Rolling accuracy of the chosen family, if it has any samples.
    pub accuracy: Option<f32>,
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self.reason {
            SelectionReason::WeakestFamily      => "weakest family",
            SelectionReason::AntiRepeatFallback => "anti-repeat fallback",
            SelectionReason::OnlyFamily         => "only unlocked family",
        };
        let tier = match self.tier_change {
            TierChange::Initial  => "initial tier",
            TierChange::Promoted => "promoted",
            TierChange::Demoted  => "demoted",
            TierChange::Held     => "tier held",
        };
        match self.accuracy {
            Some(a) => write!(f, "{reason}, {tier} (accuracy {:.0}%)", a * 100.0),
            None => write!(f, "{reason}, {tier}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultySelection {
    pub family: LogicFamily,
    pub tier: u8,
    pub rationale: Rationale,
}

fn accuracy_or_zero(stats: &RollingStats) -> f32 {
    stats.rolling_accuracy().unwrap_or(0.0)
}

/// Lowest accuracy first; ties go to the least recently played (never played
/// first), then to canonical order.
fn weaker(model: &PlayerModel, a: LogicFamily, b: LogicFamily) -> Ordering {
    let (sa, sb) = (model.stats(a), model.stats(b));
    accuracy_or_zero(&sa)
        .total_cmp(&accuracy_or_zero(&sb))
        .then(sa.last_played_ms.unwrap_or(0).cmp(&sb.last_played_ms.unwrap_or(0)))
        .then(a.cmp(&b))
}

/// Next tier for `family` given its stats.
pub fn next_tier(family: LogicFamily, stats: &RollingStats, config: &EngineConfig) -> (u8, TierChange) {
    let (lo, hi) = patterns::tier_range(family);
    if stats.attempts == 0 || stats.last_difficulty_tier == 0 {
        return (lo, TierChange::Initial);
    }
    let last = stats.last_difficulty_tier.clamp(lo, hi);
    let Some(accuracy) = stats.rolling_accuracy() else {
        return (last, TierChange::Held);
    };
    if stats.window.len() < config.min_samples_for_adjustment {
        return (last, TierChange::Held);
    }
    if accuracy >= config.promote_threshold && last < hi {
        info!(%family, from = last, to = last + 1, accuracy, "Promoting tier");
        (last + 1, TierChange::Promoted)
    } else if accuracy <= config.demote_threshold && last > lo {
        info!(%family, from = last, to = last - 1, accuracy, "Demoting tier");
        (last - 1, TierChange::Demoted)
    } else {
        (last, TierChange::Held)
    }
}

/// Select among the families unlocked at the player's level.
pub fn select_next_difficulty<R: Rng + ?Sized>(
    model: &PlayerModel,
    config: &EngineConfig,
    rng: &mut R,
) -> DifficultySelection {
    let unlocked = model.unlocked_families(config);
    select_next_difficulty_among(model, config, &unlocked, rng)
}

/// Select among an explicit set of unlocked families.
///
/// An empty set is treated as every family being unlocked.
pub fn select_next_difficulty_among<R: Rng + ?Sized>(
    model: &PlayerModel,
    config: &EngineConfig,
    unlocked: &[LogicFamily],
    rng: &mut R,
) -> DifficultySelection {
    let mut pool: Vec<LogicFamily> = if unlocked.is_empty() {
        LogicFamily::ALL.to_vec()
    } else {
        unlocked.to_vec()
    };
    pool.sort();
    pool.dedup();
    pool.sort_by(|a, b| weaker(model, *a, *b));

    let weakest = pool[0];
    let (family, reason) = if pool.len() == 1 {
        (weakest, SelectionReason::OnlyFamily)
    } else if model.stats(weakest).last_played_family_streak >= config.anti_repeat_limit {
        (weighted_fallback(model, &pool[1..], rng), SelectionReason::AntiRepeatFallback)
    } else {
        (weakest, SelectionReason::WeakestFamily)
    };

    let stats = model.stats(family);
    let (tier, tier_change) = next_tier(family, &stats, config);
    DifficultySelection {
        family,
        tier,
        rationale: Rationale { reason, tier_change, accuracy: stats.rolling_accuracy() },
    }
}

/// Weaker families are more likely.
fn weighted_fallback<R: Rng + ?Sized>(model: &PlayerModel, others: &[LogicFamily], rng: &mut R) -> LogicFamily {
    let weights: Vec<f32> = others
        .iter()
        .map(|f| (1.0 - accuracy_or_zero(&model.stats(*f))).max(0.0) + MIN_FALLBACK_WEIGHT)
        .collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => others[dist.sample(rng)],
        Err(_) => others[0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_engine::models::AttemptResult;
    use crate::puzzle_engine::player_model::update_model_from_attempt;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn play(model: &PlayerModel, family: LogicFamily, tier: u8, correct: bool, ts: u64, config: &EngineConfig) -> PlayerModel {
        let result = AttemptResult {
            puzzle_id: format!("P-{ts}"),
            family,
            tier,
            correct,
            chosen_element_id: "x".into(),
            error_type: None,
            timestamp_ms: ts,
        };
        update_model_from_attempt(model, &result, config)
    }

    #[test]
    fn fresh_model_starts_at_tier_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let sel = select_next_difficulty(&PlayerModel::new(), &EngineConfig::default(), &mut rng);
        assert_eq!(sel.family, LogicFamily::Repetition);
        assert_eq!(sel.tier, 1);
        assert_eq!(sel.rationale.tier_change, TierChange::Initial);
    }

    #[test]
    fn weakest_family_is_chosen() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        m = play(&m, LogicFamily::Repetition, 1, true, 1, &config);
        m = play(&m, LogicFamily::Progression, 1, false, 2, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let sel = select_next_difficulty(&m, &config, &mut rng);
        assert_eq!(sel.family, LogicFamily::Progression);
        assert_eq!(sel.rationale.reason, SelectionReason::WeakestFamily);
    }

    #[test]
    fn ties_go_to_least_recently_played() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        m = play(&m, LogicFamily::Progression, 1, false, 10, &config);
        m = play(&m, LogicFamily::Repetition, 1, false, 20, &config);
        let mut rng = StdRng::seed_from_u64(1);
        let sel = select_next_difficulty(&m, &config, &mut rng);
        assert_eq!(sel.family, LogicFamily::Progression);
    }

    #[test]
    fn mastery_promotes_and_failure_demotes() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        for ts in 0..config.rolling_window_size as u64 {
            m = play(&m, LogicFamily::Progression, 2, true, ts, &config);
        }
        let (tier, change) = next_tier(LogicFamily::Progression, &m.stats(LogicFamily::Progression), &config);
        assert_eq!((tier, change), (3, TierChange::Promoted));

        let mut m = PlayerModel::new();
        for ts in 0..config.rolling_window_size as u64 {
            m = play(&m, LogicFamily::Progression, 2, false, ts, &config);
        }
        let (tier, change) = next_tier(LogicFamily::Progression, &m.stats(LogicFamily::Progression), &config);
        assert_eq!((tier, change), (1, TierChange::Demoted));
    }

    #[test]
    fn tiers_clamp_at_the_edges() {
        let config = EngineConfig::default();
        let mut m = PlayerModel::new();
        for ts in 0..5 {
            m = play(&m, LogicFamily::Rotation, 3, true, ts, &config);
        }
        assert_eq!(next_tier(LogicFamily::Rotation, &m.stats(LogicFamily::Rotation), &config).0, 3);
    }

    #[test]
    fn too_few_samples_hold_the_tier() {
        let config = EngineConfig::default();
        let m = play(&PlayerModel::new(), LogicFamily::Rotation, 2, true, 1, &config);
        let (tier, change) = next_tier(LogicFamily::Rotation, &m.stats(LogicFamily::Rotation), &config);
        assert_eq!((tier, change), (2, TierChange::Held));
    }

    #[test]
    fn anti_repeat_forces_another_family() {
        let config = EngineConfig { anti_repeat_limit: 2, ..Default::default() };
        let unlocked = [LogicFamily::Progression, LogicFamily::Rotation];
        let mut m = PlayerModel::new();
        m = play(&m, LogicFamily::Rotation, 1, true, 1, &config);
        m = play(&m, LogicFamily::Progression, 1, false, 2, &config);
        m = play(&m, LogicFamily::Progression, 1, false, 3, &config);
        let mut rng = StdRng::seed_from_u64(9);
        let sel = select_next_difficulty_among(&m, &config, &unlocked, &mut rng);
        assert_eq!(sel.family, LogicFamily::Rotation);
        assert_eq!(sel.rationale.reason, SelectionReason::AntiRepeatFallback);
    }

    #[test]
    fn single_family_ignores_anti_repeat() {
        let config = EngineConfig { anti_repeat_limit: 1, ..Default::default() };
        let m = play(&PlayerModel::new(), LogicFamily::Rotation, 1, false, 1, &config);
        let mut rng = StdRng::seed_from_u64(9);
        let sel = select_next_difficulty_among(&m, &config, &[LogicFamily::Rotation], &mut rng);
        assert_eq!(sel.family, LogicFamily::Rotation);
        assert_eq!(sel.rationale.reason, SelectionReason::OnlyFamily);
        assert!(!sel.rationale.to_string().is_empty());
    }

    #[test]
    fn selection_is_deterministic_under_a_seed() {
        let config = EngineConfig { anti_repeat_limit: 1, correct_per_level: 1, ..Default::default() };
        let mut m = PlayerModel::new();
        for (ts, family) in LogicFamily::ALL.into_iter().enumerate() {
            m = play(&m, family, 1, ts % 2 == 0, ts as u64, &config);
        }
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            select_next_difficulty(&m, &config, &mut rng)
        };
        assert_eq!(pick(5), pick(5));
    }
}
