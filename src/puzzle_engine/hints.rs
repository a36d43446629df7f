//! Hint selection.
//!
//! Templates are keyed by `(family, error type | generic)`. Each level keeps
//! everything the previous level said and showed, then adds more:
//!
//! | Level | Type          | Adds |
//! |-------|---------------|------|
//! | 1     | Verbal        | a nudge naming the dimension to watch |
//! | 2     | Highlight     | the shown elements that pin down the gap |
//! | 3     | PartialReveal | the rule for that dimension |
//! | 4     | FullReveal    | the remaining rules and the answer itself |

use crate::puzzle_engine::models::{
    Dimension, DimensionRule, ErrorType, HintPayload, HintType, LogicFamily, SequenceElement,
    SequencePuzzle,
};

/// Highest hint level; requests above it are clamped.
pub const MAX_HINT_LEVEL: u8 = 4;

fn targeted_template(error: ErrorType) -> &'static str {
    match error {
        ErrorType::WrongShape         => "Look carefully at the shapes.",
        ErrorType::WrongColor         => "Look carefully at the colors.",
        ErrorType::WrongSize          => "Check how big each one is.",
        ErrorType::WrongRotation      => "Watch which way each one is turned.",
        ErrorType::WrongNumericStep   => "Count how much the number changes each time.",
        ErrorType::BrokenMotif        => "Find the group that keeps repeating.",
        ErrorType::IgnoredAlternation => "Something flips back and forth.",
        ErrorType::OffTarget          => "Your choice changed something that should stay the same.",
    }
}

fn generic_template(family: LogicFamily) -> &'static str {
    match family {
        LogicFamily::Repetition  => "Some pieces repeat as a group.",
        LogicFamily::Progression => "The numbers change the same way every time.",
        LogicFamily::SizeScaling => "The pieces change size in a steady way.",
        LogicFamily::Rotation    => "The pieces keep turning.",
        LogicFamily::Alternation => "Something flips back and forth.",
    }
}

/// The dimension a hint should talk about.
fn focus_dimension(puzzle: &SequencePuzzle, error: Option<ErrorType>) -> Dimension {
    let key = puzzle.rule.key_dimension().unwrap_or(Dimension::Value);
    let named = match error {
        Some(ErrorType::WrongShape)       => Some(Dimension::Glyph),
        Some(ErrorType::WrongColor)       => Some(Dimension::Color),
        Some(ErrorType::WrongSize)        => Some(Dimension::Size),
        Some(ErrorType::WrongRotation)    => Some(Dimension::Rotation),
        Some(ErrorType::WrongNumericStep) => Some(Dimension::Value),
        _ => None,
    };
    named.filter(|d| puzzle.rule.is_varying(*d)).unwrap_or(key)
}

fn plural(dimension: Dimension) -> String {
    match dimension {
        Dimension::Glyph => "shapes".to_string(),
        d => format!("{d}s"),
    }
}

fn rule_sentence(dimension: Dimension, rule: DimensionRule) -> String {
    match (dimension, rule) {
        (Dimension::Value, DimensionRule::Step(s)) if s >= 0 => {
            format!("Each number is {s} more than the one before.")
        }
        (Dimension::Value, DimensionRule::Step(s)) => {
            format!("Each number is {} less than the one before.", -s)
        }
        (Dimension::Size, DimensionRule::Step(s)) => format!(
            "Each one gets {} by {} step{}.",
            if s >= 0 { "bigger" } else { "smaller" },
            s.abs(),
            if s.abs() == 1 { "" } else { "s" }
        ),
        (Dimension::Rotation, DimensionRule::Step(s)) => format!(
            "Each one turns {}° {}.",
            s.abs(),
            if s >= 0 { "clockwise" } else { "counter-clockwise" }
        ),
        (d, DimensionRule::Cycle(2)) => format!("The {} take turns, back and forth.", plural(d)),
        (d, DimensionRule::Cycle(p)) => format!("The {} repeat every {p} pieces.", plural(d)),
        (d, _) => format!("The {d} stays the same."),
    }
}

fn describe(element: &SequenceElement, puzzle: &SequencePuzzle) -> String {
    let mut parts = Vec::new();
    for (dimension, _) in &puzzle.rule.varying {
        parts.push(match dimension {
            Dimension::Glyph    => format!("shape {}", element.glyph),
            Dimension::Color    => format!("color {}", element.color),
            Dimension::Size     => format!("size {}", element.size),
            Dimension::Rotation => format!("turned {}°", element.rotation),
            Dimension::Value    => format!("number {}", element.value),
        });
    }
    parts.join(", ")
}

/// Ids of the shown elements that determine the gap along `dimension`.
fn determining_elements(puzzle: &SequencePuzzle, dimension: Dimension) -> Vec<String> {
    let Some(gap) = puzzle.missing_index() else {
        return Vec::new();
    };
    let len = puzzle.sequence.len();
    let positions: Vec<usize> = match puzzle.rule.rule_for(dimension) {
        DimensionRule::Cycle(p) => (0..len).filter(|&i| i != gap && i % p == gap % p).collect(),
        DimensionRule::Step(_) if gap + 1 < len && gap > 0 => vec![gap - 1, gap + 1],
        DimensionRule::Step(_) if gap == 0 => vec![1, 2],
        DimensionRule::Step(_) => vec![gap.saturating_sub(2), gap - 1],
        DimensionRule::Constant => (0..len).filter(|&i| i != gap).collect(),
    };
    positions
        .into_iter()
        .filter_map(|i| puzzle.sequence.get(i).and_then(|s| s.as_ref()))
        .map(|e| e.id.clone())
        .collect()
}

/// Build the hint for `level` (clamped to `1..=MAX_HINT_LEVEL`).
///
/// The most recent entry of `recent_error_types` selects a targeted template;
/// with none, the family's generic template is used.
pub fn get_hint(puzzle: &SequencePuzzle, recent_error_types: &[ErrorType], level: u8) -> HintPayload {
    let level = level.clamp(1, MAX_HINT_LEVEL);
    let error = recent_error_types.last().copied();
    let focus = focus_dimension(puzzle, error);

    let nudge = match error {
        Some(e) => targeted_template(e),
        None => generic_template(puzzle.family),
    };
    let mut text = format!("{nudge} Pay attention to the {focus}.");
    let mut highlighted_keys = Vec::new();

    if level >= 2 {
        text.push_str(" Look at the highlighted pieces.");
        highlighted_keys = determining_elements(puzzle, focus);
    }
    if level >= 3 {
        text.push(' ');
        text.push_str(&rule_sentence(focus, puzzle.rule.rule_for(focus)));
    }
    if level >= 4 {
        for (dimension, rule) in &puzzle.rule.varying {
            if *dimension != focus {
                text.push(' ');
                text.push_str(&rule_sentence(*dimension, *rule));
            }
        }
        text.push_str(&format!(" The answer is: {}.", describe(&puzzle.correct_answer, puzzle)));
        highlighted_keys.push(puzzle.correct_answer.id.clone());
    }

    let hint_type = match level {
        1 => HintType::Verbal,
        2 => HintType::Highlight,
        3 => HintType::PartialReveal,
        _ => HintType::FullReveal,
    };

    HintPayload { level, hint_type, text, highlighted_keys }
}
