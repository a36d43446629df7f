//! Core puzzle engine: generation, screening, learner model, hints.
//!
//! ## Module overview
//!
//! | Module         | Purpose |
//! |----------------|---------|
//! | `models`       | Shared types: families, dimensions, elements, puzzles, attempts, hints |
//! | `patterns`     | Static pattern catalogue and the safe fallback pattern |
//! | `transforms`   | Sequence construction, rule checks, attribute distance, distractors |
//! | `quality`      | Quality gates run on every candidate puzzle |
//! | `generator`    | `generate_puzzle()`, `validate_answer()`, `next_puzzle()` |
//! | `diagnostic`   | Classifies which dimension a wrong answer missed |
//! | `hints`        | Levelled hints with monotonic disclosure |
//! | `player_model` | Rolling per-family statistics and functional updates |
//! | `store`        | Async persistence seam for the player model |
//! | `difficulty`   | Picks the next family and tier |
//! | `session`      | Lifecycle of one puzzle from generation to resolution |
//! | `ui_adapter`   | Client-facing JSON view of a puzzle |
//! | `helpers`      | Id and assembly builders shared by the generator |
//! | `config`       | `EngineConfig` tuning parameters |
//! | `error`        | `EngineError` and the `Result` alias |

pub mod config;
pub mod diagnostic;
pub mod difficulty;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod hints;
pub mod models;
pub mod patterns;
pub mod player_model;
pub mod quality;
pub mod session;
pub mod store;
pub mod transforms;
pub mod ui_adapter;

// Re-export the public API surface so callers can use
// `puzzle_engine::generate_puzzle` without reaching into sub-modules.
pub use config::EngineConfig;
pub use diagnostic::diagnose_error;
pub use difficulty::{select_next_difficulty, select_next_difficulty_among, DifficultySelection};
pub use error::{EngineError, Result};
pub use generator::{
    generate_puzzle, generate_puzzle_with_rng, next_puzzle, validate_answer, validate_answer_at,
};
pub use hints::get_hint;
pub use models::{
    AttemptResult, Dimension, ErrorType, HintPayload, HintType, LogicFamily, PuzzleRequest,
    SequenceElement, SequencePuzzle, Theme,
};
pub use player_model::{update_model_from_attempt, PlayerModel, RollingStats};
pub use quality::{get_safe_pattern, score_puzzle, should_regenerate_puzzle, QualityReport};
pub use session::{PuzzleSession, PuzzleState};
pub use store::{
    load_player_model, save_player_model, MemoryStore, PersistenceService, PlayerModelStore,
};
pub use ui_adapter::puzzle_to_sequence;
