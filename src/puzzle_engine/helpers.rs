//! Shared builder functions used by the generator and the session.
//!
//! ## RNG ordering
//!
//! `puzzle_id()` and `assemble()` each draw from the caller's RNG. The
//! generator calls them in a fixed order after the sequence is built; moving
//! a call changes every id and option order for a given seed.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

use crate::puzzle_engine::models::{LogicFamily, PatternRule, SequenceElement, SequencePuzzle};

/// Two-letter id prefix per family (e.g. `"PR-1A2B3C4D"`).
pub fn family_prefix(family: LogicFamily) -> &'static str {
    match family {
        LogicFamily::Repetition  => "RP",
        LogicFamily::Progression => "PR",
        LogicFamily::SizeScaling => "SZ",
        LogicFamily::Rotation    => "RT",
        LogicFamily::Alternation => "AL",
    }
}

pub fn puzzle_id(family: LogicFamily, rng: &mut impl RngCore) -> String {
    format!("{}-{:08X}", family_prefix(family), rng.next_u32())
}

/// Milliseconds since the Unix epoch; 0 if the clock is before it.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Everything needed to turn a built sequence into a puzzle.
pub struct PuzzleParts {
    pub id: String,
    pub family: LogicFamily,
    pub tier: u8,
    pub pattern_id: &'static str,
    pub rule: PatternRule,
    pub full: Vec<SequenceElement>,
    pub gap: usize,
    pub distractors: Vec<SequenceElement>,
    pub seed: u64,
}

/// Assemble the final [`SequencePuzzle`].
///
/// Shown elements get ids `"{id}-s{i}"`. Options get ids `"{id}-o{k}"` where
/// `k` is the option's position in a shuffled order, so sorting options by id
/// does not reveal which one is correct.
pub fn assemble<R: Rng + ?Sized>(rng: &mut R, parts: PuzzleParts) -> SequencePuzzle {
    let PuzzleParts { id, family, tier, pattern_id, rule, mut full, gap, distractors, seed } = parts;

    let mut slots: Vec<usize> = (0..=distractors.len()).collect();
    slots.shuffle(rng);

    let mut correct_answer = full[gap].clone();
    correct_answer.id = format!("{id}-o{}", slots[0]);
    let distractors = distractors
        .into_iter()
        .zip(slots[1..].iter())
        .map(|(mut d, k)| {
            d.id = format!("{id}-o{k}");
            d
        })
        .collect();

    let sequence = full
        .iter_mut()
        .enumerate()
        .map(|(i, e)| {
            if i == gap {
                None
            } else {
                e.id = format!("{id}-s{i}");
                Some(e.clone())
            }
        })
        .collect();

    SequencePuzzle {
        id,
        family,
        difficulty_tier: tier,
        pattern_id: pattern_id.to_string(),
        rule,
        sequence,
        correct_answer,
        distractors,
        seed,
    }
}
