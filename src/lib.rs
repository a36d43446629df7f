//! # sequence_puzzle_gen
//!
//! An adaptive "what comes next" sequence-puzzle engine.
//!
//! The engine generates pattern puzzles across five logic families
//! (repetition, numeric progression, size scaling, rotation, alternation),
//! screens every candidate for ambiguity before it is shown, diagnoses which
//! part of the pattern a wrong answer missed, serves levelled hints, and keeps
//! a rolling per-family model of the learner that drives the next difficulty.
//!
//! ## How it works
//!
//! 1. Load the learner's [`PlayerModel`] through a [`PlayerModelStore`] backed
//!    by the host's [`PersistenceService`].
//! 2. Call [`next_puzzle`] (or [`select_next_difficulty`] then
//!    [`generate_puzzle`]). The engine picks the weakest unlocked family,
//!    adjusts its tier, builds a sequence from a pattern definition, removes
//!    one slot, synthesises distractors, and runs the quality gates,
//!    regenerating or falling back to a safe pattern when they fail.
//! 3. Hand [`puzzle_to_sequence`] output to the UI. On an answer, call
//!    [`validate_answer`]; wrong answers carry an [`ErrorType`].
//! 4. Serve [`get_hint`] on request, fold the attempt in with
//!    [`update_model_from_attempt`], and save the model.
//!
//! ## Key features
//!
//! - **Deterministic**: `rng_seed: Some(u64)` reproduces the exact same
//!   puzzle, ids included.
//! - **Never fails to serve**: exhausted retries fall back to a vetted safe
//!   pattern; persistence failures fall back to a fresh model.
//! - **Monotonic hints**: each hint level repeats and extends the previous one.
//!
//! ## Quick start
//!
//! ```rust
//! use sequence_puzzle_gen::{
//!     generate_puzzle, get_hint, validate_answer, EngineConfig, LogicFamily, PuzzleRequest, Theme,
//! };
//!
//! let config = EngineConfig::default();
//! let theme = Theme::default();
//!
//! let puzzle = generate_puzzle(
//!     PuzzleRequest::new(LogicFamily::Progression).tier(1).seed(7),
//!     &theme,
//!     &config,
//! );
//! assert_eq!(puzzle.sequence.len(), 4);
//!
//! let wrong = &puzzle.distractors[0];
//! let attempt = validate_answer(&puzzle, &wrong.id).unwrap();
//! assert!(!attempt.correct);
//!
//! let hint = get_hint(&puzzle, &[attempt.error_type.unwrap()], 1);
//! println!("Hint: {}", hint.text);
//! ```

pub mod puzzle_engine;

// Convenience re-exports so callers can use `sequence_puzzle_gen::generate_puzzle`
// directly without reaching into `puzzle_engine::`.
pub use puzzle_engine::{
    diagnose_error, generate_puzzle, generate_puzzle_with_rng, get_hint, get_safe_pattern,
    load_player_model, next_puzzle, puzzle_to_sequence, save_player_model, score_puzzle,
    select_next_difficulty, select_next_difficulty_among, should_regenerate_puzzle,
    update_model_from_attempt, validate_answer, validate_answer_at, AttemptResult,
    DifficultySelection, Dimension, EngineConfig, EngineError, ErrorType, HintPayload, HintType,
    LogicFamily, MemoryStore, PersistenceService, PlayerModel, PlayerModelStore, PuzzleRequest,
    PuzzleSession, PuzzleState, QualityReport, Result, RollingStats, SequenceElement,
    SequencePuzzle, Theme,
};
