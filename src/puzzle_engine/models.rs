use std::fmt;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Logic families and attribute dimensions
// ---------------------------------------------------------------------------

/// A category of learnable sequence rule.
///
/// Serialised as a snake_case id (`"progression"`, `"size_scaling"`, ...),
/// which is also the key used in the persisted player model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicFamily {
    Repetition,
    Progression,
    SizeScaling,
    Rotation,
    Alternation,
}

impl LogicFamily {
    /// All families in canonical order.
    pub const ALL: [LogicFamily; 5] = [
        LogicFamily::Repetition,
        LogicFamily::Progression,
        LogicFamily::SizeScaling,
        LogicFamily::Rotation,
        LogicFamily::Alternation,
    ];

    /// Stable id used in persisted data and puzzle DTOs.
    pub fn id(self) -> &'static str {
        match self {
            LogicFamily::Repetition  => "repetition",
            LogicFamily::Progression => "progression",
            LogicFamily::SizeScaling => "size_scaling",
            LogicFamily::Rotation    => "rotation",
            LogicFamily::Alternation => "alternation",
        }
    }

    /// Player level at which this family becomes available.
    pub fn unlock_level(self) -> u32 {
        match self {
            LogicFamily::Repetition | LogicFamily::Progression => 1,
            LogicFamily::SizeScaling | LogicFamily::Alternation => 2,
            LogicFamily::Rotation => 3,
        }
    }
}

impl fmt::Display for LogicFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogicFamily::Repetition  => "Repetition",
            LogicFamily::Progression => "Progression",
            LogicFamily::SizeScaling => "Size Scaling",
            LogicFamily::Rotation    => "Rotation",
            LogicFamily::Alternation => "Alternation",
        };
        write!(f, "{}", s)
    }
}

/// One attribute axis of a [`SequenceElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Glyph,
    Color,
    Size,
    Rotation,
    Value,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Glyph,
        Dimension::Color,
        Dimension::Size,
        Dimension::Rotation,
        Dimension::Value,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Glyph    => write!(f, "shape"),
            Dimension::Color    => write!(f, "color"),
            Dimension::Size     => write!(f, "size"),
            Dimension::Rotation => write!(f, "rotation"),
            Dimension::Value    => write!(f, "number"),
        }
    }
}

/// Which part of the pattern a wrong answer appears to have missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    WrongShape,
    WrongColor,
    WrongSize,
    WrongRotation,
    WrongNumericStep,
    BrokenMotif,
    IgnoredAlternation,
    /// The chosen element differs only on attributes the rule holds fixed.
    OffTarget,
}

impl ErrorType {
    /// The per-dimension error type, ignoring family-specific refinements.
    pub fn for_dimension(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Glyph    => ErrorType::WrongShape,
            Dimension::Color    => ErrorType::WrongColor,
            Dimension::Size     => ErrorType::WrongSize,
            Dimension::Rotation => ErrorType::WrongRotation,
            Dimension::Value    => ErrorType::WrongNumericStep,
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorType::WrongShape         => "wrong shape",
            ErrorType::WrongColor         => "wrong color",
            ErrorType::WrongSize          => "wrong size",
            ErrorType::WrongRotation      => "wrong rotation",
            ErrorType::WrongNumericStep   => "wrong numeric step",
            ErrorType::BrokenMotif        => "broken motif",
            ErrorType::IgnoredAlternation => "ignored alternation",
            ErrorType::OffTarget          => "off target",
        };
        write!(f, "{}", s)
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// How one dimension behaves along a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "by")]
pub enum DimensionRule {
    /// Same value at every position.
    Constant,
    /// `next = prev + step` (rotation wraps at 360°).
    Step(i32),
    /// `x[i] == x[i - period]`, with `period` distinct values in the motif.
    Cycle(usize),
}

/// The concrete rule a puzzle was generated from.
///
/// `varying` lists the non-constant dimensions, key dimension first. Any
/// dimension not listed must stay constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub varying: Vec<(Dimension, DimensionRule)>,
}

impl PatternRule {
    /// The attribute the rule is mainly about.
    pub fn key_dimension(&self) -> Option<Dimension> {
        self.varying.first().map(|(d, _)| *d)
    }

    pub fn rule_for(&self, dimension: Dimension) -> DimensionRule {
        self.varying
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, r)| *r)
            .unwrap_or(DimensionRule::Constant)
    }

    pub fn is_varying(&self, dimension: Dimension) -> bool {
        self.rule_for(dimension) != DimensionRule::Constant
    }
}

// ---------------------------------------------------------------------------
// Elements and puzzles
// ---------------------------------------------------------------------------

/// Smallest and largest size step an element can have.
pub const MIN_SIZE: u8 = 1;
pub const MAX_SIZE: u8 = 5;
/// Resting size for families that do not scale.
pub const DEFAULT_SIZE: u8 = 3;
/// Rotations are multiples of this many degrees.
pub const ROTATION_UNIT: u16 = 45;

/// A visual/numeric unit of a sequence or an answer option.
///
/// Only the attributes relevant to the puzzle's rule vary; the rest keep
/// their base values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceElement {
    pub id: String,
    pub glyph: String,
    pub color: String,
    pub size: u8,
    /// Degrees, a multiple of [`ROTATION_UNIT`] in `0..360`.
    pub rotation: u16,
    pub value: i32,
}

/// Attribute-only identity of an element (ids excluded).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeKey {
    pub glyph: String,
    pub color: String,
    pub size: u8,
    pub rotation: u16,
    pub value: i32,
}

impl SequenceElement {
    pub fn attribute_key(&self) -> AttributeKey {
        AttributeKey {
            glyph: self.glyph.clone(),
            color: self.color.clone(),
            size: self.size,
            rotation: self.rotation,
            value: self.value,
        }
    }

    /// True when every attribute matches, regardless of id.
    pub fn same_attributes(&self, other: &SequenceElement) -> bool {
        self.glyph == other.glyph
            && self.color == other.color
            && self.size == other.size
            && self.rotation == other.rotation
            && self.value == other.value
    }

    /// Whether the two elements differ along `dimension`.
    pub fn differs_on(&self, other: &SequenceElement, dimension: Dimension) -> bool {
        match dimension {
            Dimension::Glyph    => self.glyph != other.glyph,
            Dimension::Color    => self.color != other.color,
            Dimension::Size     => self.size != other.size,
            Dimension::Rotation => self.rotation != other.rotation,
            Dimension::Value    => self.value != other.value,
        }
    }
}

/// A generated "what comes next" puzzle.
///
/// Immutable once emitted. `sequence` holds `None` at the missing slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencePuzzle {
    pub id: String,
    pub family: LogicFamily,
    pub difficulty_tier: u8,
    /// Id of the [`PatternDefinition`](super::patterns::PatternDefinition) used.
    pub pattern_id: String,
    pub rule: PatternRule,
    pub sequence: Vec<Option<SequenceElement>>,
    pub correct_answer: SequenceElement,
    pub distractors: Vec<SequenceElement>,
    pub seed: u64,
}

impl SequencePuzzle {
    /// Index of the first missing slot.
    pub fn missing_index(&self) -> Option<usize> {
        self.sequence.iter().position(|slot| slot.is_none())
    }

    /// All answer options: the correct answer followed by the distractors.
    pub fn options(&self) -> impl Iterator<Item = &SequenceElement> {
        std::iter::once(&self.correct_answer).chain(self.distractors.iter())
    }

    pub fn find_option(&self, id: &str) -> Option<&SequenceElement> {
        self.options().find(|e| e.id == id)
    }

    /// The sequence with `candidate` substituted into the missing slot.
    pub fn filled_with<'a>(&'a self, candidate: &'a SequenceElement) -> Vec<&'a SequenceElement> {
        self.sequence
            .iter()
            .map(|slot| slot.as_ref().unwrap_or(candidate))
            .collect()
    }
}

/// Outcome of one answer to one puzzle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub puzzle_id: String,
    pub family: LogicFamily,
    pub tier: u8,
    pub correct: bool,
    pub chosen_element_id: String,
    pub error_type: Option<ErrorType>,
    pub timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// Hints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintType {
    Verbal,
    Highlight,
    PartialReveal,
    FullReveal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintPayload {
    pub level: u8,
    #[serde(rename = "type")]
    pub hint_type: HintType,
    pub text: String,
    /// Ids of sequence elements / options the UI should highlight.
    pub highlighted_keys: Vec<String>,
}

// ---------------------------------------------------------------------------
// Host inputs
// ---------------------------------------------------------------------------

/// Visual vocabulary supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub glyphs: Vec<String>,
    pub colors: Vec<String>,
}

/// Minimum distinct glyphs and colours a theme must offer.
pub const MIN_PALETTE: usize = 4;

impl Default for Theme {
    fn default() -> Self {
        Theme {
            id: "default".to_string(),
            glyphs: ["arrow", "triangle", "star", "heart", "moon", "leaf"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            colors: ["red", "blue", "green", "yellow", "purple", "orange"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl Theme {
    /// True when both palettes hold at least [`MIN_PALETTE`] distinct entries.
    pub fn is_usable(&self) -> bool {
        fn distinct(items: &[String]) -> usize {
            let mut v: Vec<&String> = items.iter().collect();
            v.sort();
            v.dedup();
            v.len()
        }
        distinct(&self.glyphs) >= MIN_PALETTE && distinct(&self.colors) >= MIN_PALETTE
    }
}

/// Input to [`generate_puzzle`](super::generator::generate_puzzle).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleRequest {
    /// `None` picks a random family.
    pub family: Option<LogicFamily>,
    /// `None` uses the family's lowest tier; out-of-range tiers are clamped.
    pub tier: Option<u8>,
    /// `None` draws a fresh seed from entropy.
    pub rng_seed: Option<u64>,
}

impl PuzzleRequest {
    /// Request a puzzle for one family at its entry tier, random seed.
    pub fn new(family: LogicFamily) -> Self {
        PuzzleRequest { family: Some(family), tier: None, rng_seed: None }
    }

    pub fn tier(mut self, tier: u8) -> Self {
        self.tier = Some(tier);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}
