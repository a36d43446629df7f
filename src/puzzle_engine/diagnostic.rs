use crate::puzzle_engine::models::{
    Dimension, DimensionRule, ErrorType, LogicFamily, SequenceElement, SequencePuzzle,
};

/// Error type for a mismatch on a dimension the rule varies. Family-level
/// refinements only apply to the key dimension; a secondary dimension is
/// named as itself.
fn key_error(family: LogicFamily, dimension: Dimension, rule: DimensionRule, is_key: bool) -> ErrorType {
    match (family, rule) {
        (LogicFamily::Alternation, DimensionRule::Cycle(_)) if is_key => ErrorType::IgnoredAlternation,
        (LogicFamily::Repetition, DimensionRule::Cycle(_)) if is_key => ErrorType::BrokenMotif,
        _ => ErrorType::for_dimension(dimension),
    }
}

/// Classify which part of the pattern `chosen` got wrong.
///
/// Walks the rule's varying dimensions in key order and reports the first one
/// on which `chosen` differs from the correct answer. A difference only on
/// attributes the rule holds constant is [`ErrorType::OffTarget`], as is an
/// element identical to the answer.
pub fn diagnose_error(puzzle: &SequencePuzzle, chosen: &SequenceElement) -> ErrorType {
    let correct = &puzzle.correct_answer;
    let key = puzzle.rule.key_dimension();
    puzzle
        .rule
        .varying
        .iter()
        .find(|(dimension, _)| chosen.differs_on(correct, *dimension))
        .map(|(dimension, rule)| key_error(puzzle.family, *dimension, *rule, key == Some(*dimension)))
        .unwrap_or(ErrorType::OffTarget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_engine::models::PatternRule;

    fn el(glyph: &str, color: &str, value: i32) -> SequenceElement {
        SequenceElement {
            id: String::new(),
            glyph: glyph.into(),
            color: color.into(),
            size: 3,
            rotation: 0,
            value,
        }
    }

    fn puzzle(family: LogicFamily, varying: Vec<(Dimension, DimensionRule)>, answer: SequenceElement) -> SequencePuzzle {
        SequencePuzzle {
            id: "X".into(),
            family,
            difficulty_tier: 3,
            pattern_id: "test".into(),
            rule: PatternRule { varying },
            sequence: vec![None],
            correct_answer: answer,
            distractors: vec![],
            seed: 0,
        }
    }

    #[test]
    fn numeric_mismatch_is_a_wrong_step() {
        let p = puzzle(
            LogicFamily::Progression,
            vec![(Dimension::Value, DimensionRule::Step(2)), (Dimension::Color, DimensionRule::Cycle(2))],
            el("star", "red", 8),
        );
        assert_eq!(diagnose_error(&p, &el("star", "red", 9)), ErrorType::WrongNumericStep);
        assert_eq!(diagnose_error(&p, &el("star", "blue", 8)), ErrorType::WrongColor);
        // Key dimension wins when both are off.
        assert_eq!(diagnose_error(&p, &el("star", "blue", 9)), ErrorType::WrongNumericStep);
    }

    #[test]
    fn non_key_mismatch_is_off_target() {
        let p = puzzle(
            LogicFamily::Progression,
            vec![(Dimension::Value, DimensionRule::Step(1))],
            el("star", "red", 4),
        );
        assert_eq!(diagnose_error(&p, &el("moon", "red", 4)), ErrorType::OffTarget);
    }

    #[test]
    fn family_refines_cycle_errors() {
        let alt = puzzle(
            LogicFamily::Alternation,
            vec![(Dimension::Color, DimensionRule::Cycle(2))],
            el("star", "red", 0),
        );
        assert_eq!(diagnose_error(&alt, &el("star", "blue", 0)), ErrorType::IgnoredAlternation);

        let rep = puzzle(
            LogicFamily::Repetition,
            vec![(Dimension::Glyph, DimensionRule::Cycle(3))],
            el("star", "red", 0),
        );
        assert_eq!(diagnose_error(&rep, &el("moon", "red", 0)), ErrorType::BrokenMotif);
    }

    #[test]
    fn secondary_cycles_name_their_own_dimension() {
        let rep = puzzle(
            LogicFamily::Repetition,
            vec![(Dimension::Glyph, DimensionRule::Cycle(3)), (Dimension::Color, DimensionRule::Cycle(2))],
            el("star", "red", 0),
        );
        assert_eq!(diagnose_error(&rep, &el("star", "blue", 0)), ErrorType::WrongColor);
        assert_eq!(diagnose_error(&rep, &el("moon", "blue", 0)), ErrorType::BrokenMotif);

        let alt = puzzle(
            LogicFamily::Alternation,
            vec![(Dimension::Color, DimensionRule::Cycle(2)), (Dimension::Size, DimensionRule::Cycle(2))],
            el("star", "red", 0),
        );
        let mut smaller = el("star", "red", 0);
        smaller.size = 2;
        assert_eq!(diagnose_error(&alt, &smaller), ErrorType::WrongSize);
    }
}
