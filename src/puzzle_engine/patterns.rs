//! Static catalogue of pattern definitions, one per learnable rule.
//!
//! Each definition names its family and tier, the range of sequence lengths
//! it produces, and the transform that builds it. The catalogue never changes
//! at runtime.

use rand::Rng;
use serde::Serialize;

use crate::puzzle_engine::{
    error::{EngineError, Result},
    models::{Dimension, LogicFamily},
};

/// Which transform builds the sequence's key dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransformKind {
    /// Repeating motif of distinct glyphs (AB AB, ABC ABC, ...).
    Motif,
    /// Arithmetic progression on the numeric value.
    NumericStep,
    /// Size grows or shrinks one step per element.
    SizeStep,
    /// Rotation advances by a fixed increment.
    RotationStep,
    /// Period-2 flip on `params.target`.
    Alternation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransformParams {
    /// Inclusive magnitude range for step transforms.
    pub step: (i32, i32),
    /// Whether a negative step may be drawn.
    pub descending: bool,
    /// Motif length for cycle transforms.
    pub period: usize,
    /// Dimension an alternation acts on.
    pub target: Dimension,
    /// Extra cycle layered on a second dimension: `(dimension, period)`.
    pub secondary: Option<(Dimension, usize)>,
    /// Whether the gap may be placed inside the sequence.
    pub interior_gap: bool,
}

impl TransformParams {
    pub const DEFAULT: TransformParams = TransformParams {
        step: (1, 1),
        descending: false,
        period: 2,
        target: Dimension::Color,
        secondary: None,
        interior_gap: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PatternDefinition {
    pub id: &'static str,
    pub family: LogicFamily,
    pub difficulty_tier: u8,
    /// Inclusive `(min, max)` sequence length, gap included.
    pub sequence_length: (usize, usize),
    pub transform_kind: TransformKind,
    pub parameters: TransformParams,
}

const P: TransformParams = TransformParams::DEFAULT;

static CATALOGUE: [PatternDefinition; 15] = [
    // ── repetition ──────────────────────────────────────────────────────────
    PatternDefinition {
        id: "rep-ab", family: LogicFamily::Repetition, difficulty_tier: 1,
        sequence_length: (4, 6), transform_kind: TransformKind::Motif,
        parameters: TransformParams { period: 2, ..P },
    },
    PatternDefinition {
        id: "rep-abc", family: LogicFamily::Repetition, difficulty_tier: 2,
        sequence_length: (5, 7), transform_kind: TransformKind::Motif,
        parameters: TransformParams { period: 3, interior_gap: true, ..P },
    },
    PatternDefinition {
        id: "rep-abc-colors", family: LogicFamily::Repetition, difficulty_tier: 3,
        sequence_length: (6, 7), transform_kind: TransformKind::Motif,
        parameters: TransformParams {
            period: 3, secondary: Some((Dimension::Color, 2)), interior_gap: true, ..P
        },
    },
    // ── progression ─────────────────────────────────────────────────────────
    PatternDefinition {
        id: "prog-count", family: LogicFamily::Progression, difficulty_tier: 1,
        sequence_length: (4, 4), transform_kind: TransformKind::NumericStep,
        parameters: TransformParams { step: (1, 2), ..P },
    },
    PatternDefinition {
        id: "prog-skip", family: LogicFamily::Progression, difficulty_tier: 2,
        sequence_length: (4, 5), transform_kind: TransformKind::NumericStep,
        parameters: TransformParams { step: (2, 5), descending: true, interior_gap: true, ..P },
    },
    PatternDefinition {
        id: "prog-colors", family: LogicFamily::Progression, difficulty_tier: 3,
        sequence_length: (5, 6), transform_kind: TransformKind::NumericStep,
        parameters: TransformParams {
            step: (2, 6), descending: true, secondary: Some((Dimension::Color, 2)),
            interior_gap: true, ..P
        },
    },
    // ── size scaling ────────────────────────────────────────────────────────
    PatternDefinition {
        id: "size-grow", family: LogicFamily::SizeScaling, difficulty_tier: 1,
        sequence_length: (4, 4), transform_kind: TransformKind::SizeStep,
        parameters: P,
    },
    PatternDefinition {
        id: "size-both-ways", family: LogicFamily::SizeScaling, difficulty_tier: 2,
        sequence_length: (4, 5), transform_kind: TransformKind::SizeStep,
        parameters: TransformParams { descending: true, interior_gap: true, ..P },
    },
    PatternDefinition {
        id: "size-turns", family: LogicFamily::SizeScaling, difficulty_tier: 3,
        sequence_length: (4, 5), transform_kind: TransformKind::SizeStep,
        parameters: TransformParams {
            descending: true, secondary: Some((Dimension::Rotation, 2)), interior_gap: true, ..P
        },
    },
    // ── rotation ────────────────────────────────────────────────────────────
    PatternDefinition {
        id: "rot-quarter", family: LogicFamily::Rotation, difficulty_tier: 1,
        sequence_length: (4, 5), transform_kind: TransformKind::RotationStep,
        parameters: TransformParams { step: (90, 90), ..P },
    },
    PatternDefinition {
        id: "rot-eighth", family: LogicFamily::Rotation, difficulty_tier: 2,
        sequence_length: (4, 6), transform_kind: TransformKind::RotationStep,
        parameters: TransformParams { step: (45, 45), descending: true, interior_gap: true, ..P },
    },
    PatternDefinition {
        id: "rot-colors", family: LogicFamily::Rotation, difficulty_tier: 3,
        sequence_length: (5, 6), transform_kind: TransformKind::RotationStep,
        parameters: TransformParams {
            step: (45, 90), descending: true, secondary: Some((Dimension::Color, 2)),
            interior_gap: true, ..P
        },
    },
    // ── alternation ─────────────────────────────────────────────────────────
    PatternDefinition {
        id: "alt-color", family: LogicFamily::Alternation, difficulty_tier: 1,
        sequence_length: (4, 6), transform_kind: TransformKind::Alternation,
        parameters: TransformParams { target: Dimension::Color, ..P },
    },
    PatternDefinition {
        id: "alt-size", family: LogicFamily::Alternation, difficulty_tier: 2,
        sequence_length: (5, 6), transform_kind: TransformKind::Alternation,
        parameters: TransformParams { target: Dimension::Size, interior_gap: true, ..P },
    },
    PatternDefinition {
        id: "alt-lockstep", family: LogicFamily::Alternation, difficulty_tier: 3,
        sequence_length: (5, 7), transform_kind: TransformKind::Alternation,
        parameters: TransformParams {
            target: Dimension::Glyph, secondary: Some((Dimension::Color, 2)),
            interior_gap: true, ..P
        },
    },
];

/// Hand-vetted fallback: count up by one, four elements, last slot missing.
static SAFE_PATTERN: PatternDefinition = PatternDefinition {
    id: "safe-count",
    family: LogicFamily::Progression,
    difficulty_tier: 1,
    sequence_length: (4, 4),
    transform_kind: TransformKind::NumericStep,
    parameters: P,
};

/// Every pattern definition, in catalogue order.
pub fn catalogue() -> &'static [PatternDefinition] {
    &CATALOGUE
}

/// The fallback definition served after generation retries run out.
///
/// Produces only ±1 value and single-swap distractors, so it passes the
/// quality gates under the default configuration.
pub fn safe_pattern() -> &'static PatternDefinition {
    &SAFE_PATTERN
}

pub fn find_pattern(id: &str) -> Option<&'static PatternDefinition> {
    CATALOGUE.iter().chain(std::iter::once(&SAFE_PATTERN)).find(|p| p.id == id)
}

/// `(lowest, highest)` tier available for a family.
pub fn tier_range(family: LogicFamily) -> (u8, u8) {
    let tiers = CATALOGUE.iter().filter(|p| p.family == family).map(|p| p.difficulty_tier);
    let lo = tiers.clone().min().unwrap_or(1);
    let hi = tiers.max().unwrap_or(1);
    (lo, hi)
}

pub fn clamp_tier(family: LogicFamily, tier: u8) -> u8 {
    let (lo, hi) = tier_range(family);
    tier.clamp(lo, hi)
}

/// Seeded choice among the definitions for `(family, tier)`.
pub fn select_pattern<R: Rng + ?Sized>(
    rng: &mut R,
    family: LogicFamily,
    tier: u8,
) -> Result<&'static PatternDefinition> {
    let eligible: Vec<&'static PatternDefinition> = CATALOGUE
        .iter()
        .filter(|p| p.family == family && p.difficulty_tier == tier)
        .collect();
    if eligible.is_empty() {
        return Err(EngineError::config(format!(
            "no pattern definition for {family} tier {tier}"
        )));
    }
    Ok(eligible[rng.gen_range(0..eligible.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_family_covers_tiers_one_to_three() {
        for family in LogicFamily::ALL {
            assert_eq!(tier_range(family), (1, 3), "{family:?}");
            for tier in 1..=3 {
                let mut rng = StdRng::seed_from_u64(1);
                assert!(select_pattern(&mut rng, family, tier).is_ok(), "{family:?} tier {tier}");
            }
        }
    }

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<&str> = catalogue().iter().map(|p| p.id).collect();
        ids.push(safe_pattern().id);
        let n = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), n);
    }

    #[test]
    fn missing_tier_is_a_configuration_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = select_pattern(&mut rng, LogicFamily::Rotation, 9).unwrap_err();
        assert!(matches!(err, EngineError::Configuration { .. }));
        assert_eq!(clamp_tier(LogicFamily::Rotation, 9), 3);
        assert_eq!(clamp_tier(LogicFamily::Rotation, 0), 1);
    }

    #[test]
    fn lengths_leave_room_for_the_motif() {
        for p in catalogue() {
            let (lo, hi) = p.sequence_length;
            assert!(lo <= hi && lo >= 4, "{}", p.id);
            let longest_period = p.parameters.period.max(p.parameters.secondary.map_or(0, |s| s.1));
            assert!(lo > longest_period, "{} too short for its motif", p.id);
        }
    }
}
