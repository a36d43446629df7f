//! Quality gates: screen a candidate puzzle for ambiguity, triviality and
//! difficulty mismatch before it leaves the engine.

use serde::Serialize;

use crate::puzzle_engine::{
    config::EngineConfig,
    models::{SequenceElement, SequencePuzzle},
    patterns::{self, PatternDefinition},
    transforms::{attribute_distance, distractor_count, satisfies_rule, varying_dimensions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IssueKind {
    /// More than one option satisfies the rule.
    Ambiguous,
    /// No option satisfies the rule; a generator bug.
    NoValidAnswer,
    DistractorTooClose,
    DistractorTooFar,
    /// Number of varying dimensions does not fit the tier.
    DifficultyMismatch,
    TooFewOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Warning,
    Blocking,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityIssue {
    pub kind: IssueKind,
    pub severity: Severity,
}

impl QualityIssue {
    fn blocking(kind: IssueKind) -> Self {
        QualityIssue { kind, severity: Severity::Blocking }
    }

    fn warning(kind: IssueKind) -> Self {
        QualityIssue { kind, severity: Severity::Warning }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub puzzle_id: String,
    pub passed: bool,
    pub issues: Vec<QualityIssue>,
    /// 1.0 for a clean puzzle, lowered by each issue.
    pub score: f32,
}

impl QualityReport {
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }
}

/// Options whose substitution into the gap satisfies the puzzle's rule.
pub fn satisfying_options(puzzle: &SequencePuzzle) -> Vec<&SequenceElement> {
    puzzle
        .options()
        .filter(|option| satisfies_rule(&puzzle.rule, &puzzle.filled_with(option)))
        .collect()
}

/// Whether `count` varying dimensions suits `tier`.
fn tier_accepts(tier: u8, count: usize) -> bool {
    match tier {
        0 | 1 => count == 1,
        2 => (1..=2).contains(&count),
        _ => count >= 2,
    }
}

/// Score a candidate puzzle.
pub fn score_puzzle(candidate: &SequencePuzzle, config: &EngineConfig) -> QualityReport {
    let mut issues = Vec::new();

    // Uniqueness
    match satisfying_options(candidate).len() {
        0 => issues.push(QualityIssue::blocking(IssueKind::NoValidAnswer)),
        1 => {}
        _ => issues.push(QualityIssue::blocking(IssueKind::Ambiguous)),
    }

    if candidate.distractors.len() < distractor_count(candidate.difficulty_tier) {
        issues.push(QualityIssue::blocking(IssueKind::TooFewOptions));
    }

    // Distinguishability
    for d in &candidate.distractors {
        let distance = attribute_distance(d, &candidate.correct_answer, &candidate.rule);
        if distance < config.min_distractor_distance {
            issues.push(QualityIssue::blocking(IssueKind::DistractorTooClose));
        } else if distance > config.max_distractor_distance {
            issues.push(QualityIssue::warning(IssueKind::DistractorTooFar));
        }
    }

    // Difficulty alignment
    let full = candidate.filled_with(&candidate.correct_answer);
    if !tier_accepts(candidate.difficulty_tier, varying_dimensions(&full).len()) {
        issues.push(QualityIssue::blocking(IssueKind::DifficultyMismatch));
    }

    let blocking = issues.iter().filter(|i| i.severity == Severity::Blocking).count();
    let warnings = issues.len() - blocking;
    let score = (1.0 - 0.5 * blocking as f32 - 0.1 * warnings as f32).clamp(0.0, 1.0);

    QualityReport {
        puzzle_id: candidate.id.clone(),
        passed: blocking == 0,
        issues,
        score,
    }
}

/// True iff the report carries a blocking issue.
pub fn should_regenerate_puzzle(report: &QualityReport) -> bool {
    report.issues.iter().any(|i| i.severity == Severity::Blocking)
}

/// The fixed fallback definition used after retries run out.
pub fn get_safe_pattern() -> &'static PatternDefinition {
    patterns::safe_pattern()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_engine::models::{Dimension, DimensionRule, LogicFamily, PatternRule};

    fn el(id: &str, value: i32) -> SequenceElement {
        SequenceElement {
            id: id.into(),
            glyph: "star".into(),
            color: "red".into(),
            size: 3,
            rotation: 0,
            value,
        }
    }

    fn counting(distractors: Vec<SequenceElement>) -> SequencePuzzle {
        SequencePuzzle {
            id: "PR-TEST".into(),
            family: LogicFamily::Progression,
            difficulty_tier: 1,
            pattern_id: "prog-count".into(),
            rule: PatternRule { varying: vec![(Dimension::Value, DimensionRule::Step(1))] },
            sequence: vec![Some(el("s0", 1)), Some(el("s1", 2)), Some(el("s2", 3)), None],
            correct_answer: el("o0", 4),
            distractors,
            seed: 0,
        }
    }

    #[test]
    fn clean_puzzle_passes() {
        let report = score_puzzle(&counting(vec![el("o1", 5), el("o2", 3)]), &EngineConfig::default());
        assert!(report.passed, "{report:?}");
        assert_eq!(report.score, 1.0);
        assert!(!should_regenerate_puzzle(&report));
    }

    #[test]
    fn duplicate_answer_is_ambiguous_and_too_close() {
        let report = score_puzzle(&counting(vec![el("o1", 4), el("o2", 3)]), &EngineConfig::default());
        assert!(report.has(IssueKind::Ambiguous));
        assert!(report.has(IssueKind::DistractorTooClose));
        assert!(should_regenerate_puzzle(&report));
    }

    #[test]
    fn far_distractor_is_only_a_warning() {
        let mut far = el("o2", 3);
        far.glyph = "moon".into();
        far.color = "blue".into();
        far.size = 5;
        let report = score_puzzle(&counting(vec![el("o1", 5), far]), &EngineConfig::default());
        assert!(report.has(IssueKind::DistractorTooFar));
        assert!(report.passed);
        assert!(report.score < 1.0);
    }

    #[test]
    fn missing_distractors_block() {
        let report = score_puzzle(&counting(vec![el("o1", 5)]), &EngineConfig::default());
        assert!(report.has(IssueKind::TooFewOptions));
        assert!(!report.passed);
    }

    #[test]
    fn tier_three_needs_two_varying_dimensions() {
        let mut p = counting(vec![el("o1", 5), el("o2", 3), el("o3", 6)]);
        p.difficulty_tier = 3;
        let report = score_puzzle(&p, &EngineConfig::default());
        assert!(report.has(IssueKind::DifficultyMismatch));
    }

    #[test]
    fn safe_pattern_is_tier_one_progression() {
        let safe = get_safe_pattern();
        assert_eq!(safe.family, LogicFamily::Progression);
        assert_eq!(safe.difficulty_tier, 1);
    }
}
