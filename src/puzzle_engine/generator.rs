use std::borrow::Cow;

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::{debug, error, instrument, warn};

use crate::puzzle_engine::{
    config::EngineConfig,
    diagnostic::diagnose_error,
    difficulty::{select_next_difficulty, DifficultySelection},
    error::{EngineError, Result},
    helpers::{self, PuzzleParts},
    models::{AttemptResult, LogicFamily, PuzzleRequest, SequencePuzzle, Theme},
    patterns::{self, PatternDefinition},
    player_model::PlayerModel,
    quality::{get_safe_pattern, score_puzzle, should_regenerate_puzzle, QualityReport},
    transforms,
};

/// Build one unscreened candidate from `def`.
fn build_candidate<R: Rng>(rng: &mut R, def: &'static PatternDefinition, theme: &Theme, seed: u64) -> SequencePuzzle {
    let id = helpers::puzzle_id(def.family, rng);
    let built = transforms::build_sequence(rng, def, theme);
    let gap = transforms::choose_gap(rng, def, &built.rule, built.elements.len());
    let distractors = transforms::synthesize_distractors(
        rng,
        def.difficulty_tier,
        &built.rule,
        &built.elements,
        gap,
        theme,
    );
    helpers::assemble(rng, PuzzleParts {
        id,
        family: def.family,
        tier: def.difficulty_tier,
        pattern_id: def.id,
        rule: built.rule,
        full: built.elements,
        gap,
        distractors,
        seed,
    })
}

/// Screened generation with bounded retries. Each attempt runs on its own
/// seed drawn from `rng`; `screen` decides whether a candidate is kept.
fn try_generate<F>(
    rng: &mut StdRng,
    family: LogicFamily,
    tier: u8,
    theme: &Theme,
    seed: u64,
    attempts: u32,
    mut screen: F,
) -> Result<SequencePuzzle>
where
    F: FnMut(&SequencePuzzle) -> QualityReport,
{
    for attempt in 0..attempts {
        let mut attempt_rng = StdRng::seed_from_u64(rng.next_u64());
        let def = patterns::select_pattern(&mut attempt_rng, family, tier)?;
        let candidate = build_candidate(&mut attempt_rng, def, theme, seed);
        let report = screen(&candidate);
        debug!(
            attempt,
            pattern = def.id,
            passed = report.passed,
            score = report.score,
            issues = report.issues.len(),
            "Candidate screened"
        );
        if !should_regenerate_puzzle(&report) {
            return Ok(candidate);
        }
    }
    Err(EngineError::GenerationExhausted { attempts })
}

fn usable_theme(theme: &Theme) -> Cow<'_, Theme> {
    if theme.is_usable() {
        Cow::Borrowed(theme)
    } else {
        warn!(theme = %theme.id, "Theme palette too small, using the default theme");
        Cow::Owned(Theme::default())
    }
}

/// Generate a screened puzzle. Never fails: when every attempt is rejected
/// the safe pattern is served instead.
///
/// With `rng_seed: Some(_)` the output is fully reproducible; the seed used is
/// recorded in [`SequencePuzzle::seed`] either way. Without one, the seed is
/// drawn from a fresh entropy-seeded generator.
pub fn generate_puzzle(request: PuzzleRequest, theme: &Theme, config: &EngineConfig) -> SequencePuzzle {
    generate_puzzle_with_rng(request, theme, config, &mut StdRng::from_entropy())
}

/// [`generate_puzzle`] with the default seed source supplied by the caller.
///
/// `seed_source` is read once, and only when the request carries no seed.
#[instrument(skip_all, fields(family = ?request.family, tier = ?request.tier))]
pub fn generate_puzzle_with_rng<R: RngCore + ?Sized>(
    request: PuzzleRequest,
    theme: &Theme,
    config: &EngineConfig,
    seed_source: &mut R,
) -> SequencePuzzle {
    let seed = request.rng_seed.unwrap_or_else(|| seed_source.next_u64());
    let mut rng = StdRng::seed_from_u64(seed);
    let theme = usable_theme(theme);

    let family = request
        .family
        .unwrap_or_else(|| LogicFamily::ALL[rng.gen_range(0..LogicFamily::ALL.len())]);
    let tier = patterns::clamp_tier(family, request.tier.unwrap_or(0));
    let attempts = config.max_generation_retries.saturating_add(1);

    match try_generate(&mut rng, family, tier, &theme, seed, attempts, |c| score_puzzle(c, config)) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            match &e {
                EngineError::GenerationExhausted { .. } => {
                    warn!(%family, tier, error = %e, "Serving safe pattern")
                }
                _ => error!(%family, tier, error = %e, "Pattern lookup failed, serving safe pattern"),
            }
            build_candidate(&mut rng, get_safe_pattern(), &theme, seed)
        }
    }
}

/// Check an answer, stamping it with the current time.
pub fn validate_answer(puzzle: &SequencePuzzle, chosen_element_id: &str) -> Result<AttemptResult> {
    validate_answer_at(puzzle, chosen_element_id, helpers::now_ms())
}

/// Check an answer with an explicit timestamp.
///
/// An id that is not one of the puzzle's options is rejected as invalid input.
pub fn validate_answer_at(puzzle: &SequencePuzzle, chosen_element_id: &str, timestamp_ms: u64) -> Result<AttemptResult> {
    let chosen = puzzle.find_option(chosen_element_id).ok_or_else(|| {
        EngineError::invalid_input(format!(
            "option '{chosen_element_id}' does not belong to puzzle {}",
            puzzle.id
        ))
    })?;
    let correct = chosen.id == puzzle.correct_answer.id;
    Ok(AttemptResult {
        puzzle_id: puzzle.id.clone(),
        family: puzzle.family,
        tier: puzzle.difficulty_tier,
        correct,
        chosen_element_id: chosen.id.clone(),
        error_type: if correct { None } else { Some(diagnose_error(puzzle, chosen)) },
        timestamp_ms,
    })
}

/// Close the loop: pick family and tier from the model, then generate.
pub fn next_puzzle<R: Rng + ?Sized>(
    model: &PlayerModel,
    config: &EngineConfig,
    theme: &Theme,
    rng: &mut R,
) -> (DifficultySelection, SequencePuzzle) {
    let selection = select_next_difficulty(model, config, rng);
    let request = PuzzleRequest {
        family: Some(selection.family),
        tier: Some(selection.tier),
        rng_seed: Some(rng.next_u64()),
    };
    let puzzle = generate_puzzle(request, theme, config);
    (selection, puzzle)
}
