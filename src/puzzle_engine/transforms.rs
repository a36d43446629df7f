//! Element transforms: build a full sequence from a pattern definition, check
//! a sequence against its rule, measure attribute distance, and synthesise
//! distractors.
//!
//! Everything here is a pure function of its inputs and the caller's RNG.
//! The call order on the RNG is fixed, so a seed reproduces the same output.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::puzzle_engine::{
    models::{
        Dimension, DimensionRule, PatternRule, SequenceElement, Theme, DEFAULT_SIZE, MAX_SIZE,
        MIN_SIZE, ROTATION_UNIT,
    },
    patterns::{PatternDefinition, TransformKind},
};

/// Highest per-dimension contribution of a numeric difference to the distance.
const MAX_NUMERIC_DISTANCE: f32 = 3.0;
/// Values drawn for numeric motifs and progression starts.
const VALUE_POOL: std::ops::RangeInclusive<i32> = 1..=9;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
    Glyph(String),
    Color(String),
    Size(u8),
    Rotation(u16),
    Value(i32),
}

impl Attr {
    pub fn read(element: &SequenceElement, dimension: Dimension) -> Attr {
        match dimension {
            Dimension::Glyph    => Attr::Glyph(element.glyph.clone()),
            Dimension::Color    => Attr::Color(element.color.clone()),
            Dimension::Size     => Attr::Size(element.size),
            Dimension::Rotation => Attr::Rotation(element.rotation),
            Dimension::Value    => Attr::Value(element.value),
        }
    }

    pub fn apply(&self, element: &mut SequenceElement) {
        match self {
            Attr::Glyph(g)    => element.glyph = g.clone(),
            Attr::Color(c)    => element.color = c.clone(),
            Attr::Size(s)     => element.size = *s,
            Attr::Rotation(r) => element.rotation = *r,
            Attr::Value(v)    => element.value = *v,
        }
    }
}

/// Numeric reading of a dimension, `None` for glyph and colour.
fn numeric(element: &SequenceElement, dimension: Dimension) -> Option<i32> {
    match dimension {
        Dimension::Size     => Some(element.size as i32),
        Dimension::Rotation => Some(element.rotation as i32),
        Dimension::Value    => Some(element.value),
        Dimension::Glyph | Dimension::Color => None,
    }
}

fn rotate(rotation: u16, by: i32) -> u16 {
    (rotation as i32 + by).rem_euclid(360) as u16
}

fn unique_palette(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items.iter().filter(|s| seen.insert(s.as_str())).cloned().collect()
}

/// `count` distinct values for `dimension`, in random order.
fn distinct_values<R: Rng + ?Sized>(
    rng: &mut R,
    dimension: Dimension,
    count: usize,
    theme: &Theme,
) -> Vec<Attr> {
    let mut pool: Vec<Attr> = match dimension {
        Dimension::Glyph => unique_palette(&theme.glyphs).into_iter().map(Attr::Glyph).collect(),
        Dimension::Color => unique_palette(&theme.colors).into_iter().map(Attr::Color).collect(),
        Dimension::Size => (MIN_SIZE..=MAX_SIZE).map(Attr::Size).collect(),
        Dimension::Rotation => (0..360 / ROTATION_UNIT).map(|k| Attr::Rotation(k * ROTATION_UNIT)).collect(),
        Dimension::Value => VALUE_POOL.map(Attr::Value).collect(),
    };
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

// ---------------------------------------------------------------------------
// Sequence construction
// ---------------------------------------------------------------------------

/// A complete, correct sequence (gap not yet removed) and its concrete rule.
#[derive(Debug, Clone)]
pub struct BuiltSequence {
    pub elements: Vec<SequenceElement>,
    pub rule: PatternRule,
}

fn draw_step<R: Rng + ?Sized>(rng: &mut R, def: &PatternDefinition) -> i32 {
    let (lo, hi) = def.parameters.step;
    let magnitude = rng.gen_range(lo..=hi);
    if def.parameters.descending && rng.gen_bool(0.5) {
        -magnitude
    } else {
        magnitude
    }
}

/// Build the full sequence for `def` from `theme`.
pub fn build_sequence<R: Rng + ?Sized>(
    rng: &mut R,
    def: &PatternDefinition,
    theme: &Theme,
) -> BuiltSequence {
    let (lo, hi) = def.sequence_length;
    let len = rng.gen_range(lo..=hi);

    let glyphs = unique_palette(&theme.glyphs);
    let colors = unique_palette(&theme.colors);
    let base = SequenceElement {
        id: String::new(),
        glyph: glyphs.choose(rng).cloned().unwrap_or_default(),
        color: colors.choose(rng).cloned().unwrap_or_default(),
        size: DEFAULT_SIZE,
        rotation: 0,
        value: 0,
    };
    let mut elements = vec![base; len];
    let mut varying = Vec::with_capacity(2);
    let params = def.parameters;

    match def.transform_kind {
        TransformKind::Motif => {
            apply_cycle(rng, &mut elements, Dimension::Glyph, params.period, theme);
            varying.push((Dimension::Glyph, DimensionRule::Cycle(params.period)));
        }
        TransformKind::Alternation => {
            apply_cycle(rng, &mut elements, params.target, 2, theme);
            varying.push((params.target, DimensionRule::Cycle(2)));
        }
        TransformKind::NumericStep => {
            let step = draw_step(rng, def);
            let span = step.abs() * (len as i32 - 1);
            let start = if step > 0 {
                rng.gen_range(VALUE_POOL)
            } else {
                rng.gen_range(span..=span + VALUE_POOL.end())
            };
            for (i, e) in elements.iter_mut().enumerate() {
                e.value = start + step * i as i32;
            }
            varying.push((Dimension::Value, DimensionRule::Step(step)));
        }
        TransformKind::SizeStep => {
            let step = draw_step(rng, def);
            let span = (step.abs() * (len as i32 - 1)).min((MAX_SIZE - MIN_SIZE) as i32);
            let (min, max) = (MIN_SIZE as i32, MAX_SIZE as i32);
            let start = if step > 0 {
                rng.gen_range(min..=max - span)
            } else {
                rng.gen_range(min + span..=max)
            };
            for (i, e) in elements.iter_mut().enumerate() {
                e.size = (start + step * i as i32).clamp(min, max) as u8;
            }
            varying.push((Dimension::Size, DimensionRule::Step(step)));
        }
        TransformKind::RotationStep => {
            let unit = ROTATION_UNIT as i32;
            let (lo, hi) = params.step;
            let magnitude = rng.gen_range((lo / unit).max(1)..=(hi / unit).max(1)) * unit;
            let step = if params.descending && rng.gen_bool(0.5) { -magnitude } else { magnitude };
            let start = rng.gen_range(0..360 / unit) * unit;
            for (i, e) in elements.iter_mut().enumerate() {
                e.rotation = rotate(start as u16, step * i as i32);
            }
            varying.push((Dimension::Rotation, DimensionRule::Step(step)));
        }
    }

    if let Some((dimension, period)) = params.secondary {
        apply_cycle(rng, &mut elements, dimension, period, theme);
        varying.push((dimension, DimensionRule::Cycle(period)));
    }

    BuiltSequence { elements, rule: PatternRule { varying } }
}

fn apply_cycle<R: Rng + ?Sized>(
    rng: &mut R,
    elements: &mut [SequenceElement],
    dimension: Dimension,
    period: usize,
    theme: &Theme,
) {
    let motif = distinct_values(rng, dimension, period, theme);
    if motif.is_empty() {
        return;
    }
    for (i, e) in elements.iter_mut().enumerate() {
        motif[i % motif.len()].apply(e);
    }
}

/// Whether position `index` is pinned down by the rest of the sequence.
fn gap_is_determined(rule: &PatternRule, len: usize, index: usize) -> bool {
    rule.varying.iter().all(|(_, r)| match r {
        DimensionRule::Cycle(p) => index >= *p || index + p < len,
        DimensionRule::Step(_) | DimensionRule::Constant => len >= 3,
    })
}

/// Pick the slot to remove. Tier 1 always removes the last element; higher
/// tiers may remove an interior one when the rule still determines it.
pub fn choose_gap<R: Rng + ?Sized>(
    rng: &mut R,
    def: &PatternDefinition,
    rule: &PatternRule,
    len: usize,
) -> usize {
    let last = len - 1;
    if def.difficulty_tier <= 1 || !def.parameters.interior_gap || !rng.gen_bool(0.5) {
        return last;
    }
    let interior: Vec<usize> = (1..last).filter(|&i| gap_is_determined(rule, len, i)).collect();
    interior.choose(rng).copied().unwrap_or(last)
}

// ---------------------------------------------------------------------------
// Rule evaluation
// ---------------------------------------------------------------------------

fn dimension_holds(rule: DimensionRule, dimension: Dimension, seq: &[&SequenceElement]) -> bool {
    match rule {
        DimensionRule::Constant => seq
            .windows(2)
            .all(|w| !w[0].differs_on(w[1], dimension)),
        DimensionRule::Step(step) => seq.windows(2).all(|w| {
            match (numeric(w[0], dimension), numeric(w[1], dimension)) {
                (Some(a), Some(b)) if dimension == Dimension::Rotation => {
                    (b - a).rem_euclid(360) == step.rem_euclid(360)
                }
                (Some(a), Some(b)) => b - a == step,
                _ => false,
            }
        }),
        DimensionRule::Cycle(period) => {
            if period == 0 || seq.len() < period {
                return false;
            }
            let motif_distinct = (0..period).all(|i| {
                (i + 1..period).all(|j| seq[i].differs_on(seq[j], dimension))
            });
            motif_distinct
                && (period..seq.len()).all(|i| !seq[i].differs_on(seq[i - period], dimension))
        }
    }
}

/// True when every dimension of `seq` follows `rule`.
pub fn satisfies_rule(rule: &PatternRule, seq: &[&SequenceElement]) -> bool {
    Dimension::ALL
        .iter()
        .all(|&d| dimension_holds(rule.rule_for(d), d, seq))
}

/// Dimensions whose value is not the same across `seq`.
pub fn varying_dimensions(seq: &[&SequenceElement]) -> Vec<Dimension> {
    Dimension::ALL
        .iter()
        .copied()
        .filter(|&d| seq.windows(2).any(|w| w[0].differs_on(w[1], d)))
        .collect()
}

/// Attribute-wise distance between two elements.
///
/// Glyph and colour count 1 when different; size counts its step difference;
/// rotation counts 45° units on the circle; numeric value counts multiples of
/// the rule's step, capped.
pub fn attribute_distance(a: &SequenceElement, b: &SequenceElement, rule: &PatternRule) -> f32 {
    let mut total = 0.0;
    if a.glyph != b.glyph {
        total += 1.0;
    }
    if a.color != b.color {
        total += 1.0;
    }
    total += (a.size as f32 - b.size as f32).abs();

    let diff = (a.rotation as i32 - b.rotation as i32).rem_euclid(360);
    total += diff.min(360 - diff) as f32 / ROTATION_UNIT as f32;

    if a.value != b.value {
        let unit = match rule.rule_for(Dimension::Value) {
            DimensionRule::Step(s) if s != 0 => s.abs(),
            _ => 1,
        };
        let steps = ((a.value - b.value).abs() as f32 / unit as f32).ceil();
        total += steps.clamp(1.0, MAX_NUMERIC_DISTANCE);
    }
    total
}

// ---------------------------------------------------------------------------
// Distractors
// ---------------------------------------------------------------------------

/// How many distractors a puzzle of this tier carries.
pub fn distractor_count(tier: u8) -> usize {
    if tier <= 1 { 2 } else { 3 }
}

fn with_attr(base: &SequenceElement, attr: Attr) -> SequenceElement {
    let mut e = base.clone();
    attr.apply(&mut e);
    e
}

/// Single-attribute perturbations of `correct` along one varying dimension.
fn perturbations(
    correct: &SequenceElement,
    dimension: Dimension,
    rule: DimensionRule,
    full: &[SequenceElement],
    theme: &Theme,
) -> Vec<SequenceElement> {
    let mut out = Vec::new();
    match (dimension, rule) {
        (Dimension::Value, DimensionRule::Step(s)) => {
            for v in [correct.value + s, correct.value - s, correct.value + 1, correct.value - 1] {
                if v >= 0 {
                    out.push(with_attr(correct, Attr::Value(v)));
                }
            }
        }
        (Dimension::Size, DimensionRule::Step(s)) => {
            let c = correct.size as i32;
            for v in [c + s, c - s, c + 1, c - 1] {
                if (MIN_SIZE as i32..=MAX_SIZE as i32).contains(&v) {
                    out.push(with_attr(correct, Attr::Size(v as u8)));
                }
            }
        }
        (Dimension::Rotation, DimensionRule::Step(s)) => {
            let unit = ROTATION_UNIT as i32;
            for by in [s, -s, unit, -unit] {
                out.push(with_attr(correct, Attr::Rotation(rotate(correct.rotation, by))));
            }
        }
        (_, DimensionRule::Cycle(_)) => {
            let own = Attr::read(correct, dimension);
            let mut seen = vec![own];
            for e in full {
                let a = Attr::read(e, dimension);
                if !seen.contains(&a) {
                    seen.push(a.clone());
                    out.push(with_attr(correct, a));
                }
            }
            if let Some(fresh) = fresh_value(dimension, &seen, theme) {
                out.push(with_attr(correct, fresh));
            }
        }
        _ => {}
    }
    out
}

/// First value of `dimension` not already in `taken`.
fn fresh_value(dimension: Dimension, taken: &[Attr], theme: &Theme) -> Option<Attr> {
    let pool: Vec<Attr> = match dimension {
        Dimension::Glyph => theme.glyphs.iter().cloned().map(Attr::Glyph).collect(),
        Dimension::Color => theme.colors.iter().cloned().map(Attr::Color).collect(),
        Dimension::Size => (MIN_SIZE..=MAX_SIZE).map(Attr::Size).collect(),
        Dimension::Rotation => (0..360 / ROTATION_UNIT).map(|k| Attr::Rotation(k * ROTATION_UNIT)).collect(),
        Dimension::Value => VALUE_POOL.map(Attr::Value).collect(),
    };
    pool.into_iter().find(|a| !taken.contains(a))
}

/// A change on an attribute the rule holds constant.
fn off_target(correct: &SequenceElement, rule: &PatternRule, theme: &Theme) -> Option<SequenceElement> {
    let dimension = [Dimension::Color, Dimension::Glyph, Dimension::Size]
        .into_iter()
        .find(|&d| !rule.is_varying(d))?;
    let attr = match dimension {
        Dimension::Size => Attr::Size(if correct.size < MAX_SIZE { correct.size + 1 } else { correct.size - 1 }),
        d => fresh_value(d, &[Attr::read(correct, d)], theme)?,
    };
    Some(with_attr(correct, attr))
}

/// Wrong-answer candidates for `full[gap]`.
///
/// The first distractor always perturbs the key dimension; the rest are drawn
/// from perturbations of every varying dimension plus one off-target change.
/// May return fewer than [`distractor_count`] when the candidates run out.
pub fn synthesize_distractors<R: Rng + ?Sized>(
    rng: &mut R,
    tier: u8,
    rule: &PatternRule,
    full: &[SequenceElement],
    gap: usize,
    theme: &Theme,
) -> Vec<SequenceElement> {
    let correct = &full[gap];
    let mut seen = HashSet::new();
    seen.insert(correct.attribute_key());

    let mut key_pool = Vec::new();
    let mut rest = Vec::new();
    for (i, (dimension, dim_rule)) in rule.varying.iter().enumerate() {
        for candidate in perturbations(correct, *dimension, *dim_rule, full, theme) {
            if seen.insert(candidate.attribute_key()) {
                if i == 0 { key_pool.push(candidate) } else { rest.push(candidate) }
            }
        }
    }
    if let Some(candidate) = off_target(correct, rule, theme) {
        if seen.insert(candidate.attribute_key()) {
            rest.push(candidate);
        }
    }

    let wanted = distractor_count(tier);
    let mut picked = Vec::with_capacity(wanted);
    key_pool.shuffle(rng);
    if let Some(first) = key_pool.pop() {
        picked.push(first);
    }
    rest.extend(key_pool);
    rest.shuffle(rng);
    picked.extend(rest.into_iter().take(wanted.saturating_sub(picked.len())));
    picked
}
