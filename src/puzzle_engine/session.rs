//! Lifecycle of a single puzzle:
//!
//! ```text
//! generated → presented → answered-correct | answered-incorrect → [hint]* → resolved
//! ```
//!
//! Hints may also be asked for while the puzzle is presented and before the
//! first answer; they then use the family's generic template. An incorrect
//! answer may be followed by another answer. Starting a new session is the
//! only way to get a new puzzle, so hint state never leaks between puzzles.

use std::fmt;

use crate::puzzle_engine::{
    config::EngineConfig,
    error::{EngineError, Result},
    generator::validate_answer_at,
    helpers,
    hints::get_hint,
    models::{AttemptResult, ErrorType, HintPayload, SequencePuzzle},
    player_model::{update_model_from_attempt, PlayerModel},
    store::{PersistenceService, PlayerModelStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleState {
    Generated,
    Presented,
    AnsweredCorrect,
    AnsweredIncorrect,
    Resolved,
}

impl fmt::Display for PuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleState::Generated         => write!(f, "generated"),
            PuzzleState::Presented         => write!(f, "presented"),
            PuzzleState::AnsweredCorrect   => write!(f, "answered correctly"),
            PuzzleState::AnsweredIncorrect => write!(f, "answered incorrectly"),
            PuzzleState::Resolved          => write!(f, "resolved"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PuzzleSession {
    puzzle: SequencePuzzle,
    state: PuzzleState,
    attempts: Vec<AttemptResult>,
    hints: Vec<HintPayload>,
}

impl PuzzleSession {
    pub fn new(puzzle: SequencePuzzle) -> Self {
        Self { puzzle, state: PuzzleState::Generated, attempts: Vec::new(), hints: Vec::new() }
    }

    pub fn puzzle(&self) -> &SequencePuzzle {
        &self.puzzle
    }

    pub fn state(&self) -> PuzzleState {
        self.state
    }

    pub fn attempts(&self) -> &[AttemptResult] {
        &self.attempts
    }

    pub fn hints(&self) -> &[HintPayload] {
        &self.hints
    }

    /// Error types diagnosed so far, oldest first.
    pub fn recent_error_types(&self) -> Vec<ErrorType> {
        self.attempts.iter().filter_map(|a| a.error_type).collect()
    }

    fn reject(&self, action: &'static str) -> EngineError {
        EngineError::InvalidTransition { state: self.state.to_string(), action }
    }

    /// Mark the puzzle as shown to the learner.
    pub fn present(&mut self) -> Result<()> {
        if self.state != PuzzleState::Generated {
            return Err(self.reject("present"));
        }
        self.state = PuzzleState::Presented;
        Ok(())
    }

    pub fn answer(&mut self, chosen_element_id: &str) -> Result<AttemptResult> {
        self.answer_at(chosen_element_id, helpers::now_ms())
    }

    /// Record an answer. Allowed once presented, and again after a wrong one.
    pub fn answer_at(&mut self, chosen_element_id: &str, timestamp_ms: u64) -> Result<AttemptResult> {
        if !matches!(self.state, PuzzleState::Presented | PuzzleState::AnsweredIncorrect) {
            return Err(self.reject("answer"));
        }
        let result = validate_answer_at(&self.puzzle, chosen_element_id, timestamp_ms)?;
        self.state = if result.correct {
            PuzzleState::AnsweredCorrect
        } else {
            PuzzleState::AnsweredIncorrect
        };
        self.attempts.push(result.clone());
        Ok(result)
    }

    /// Serve a hint at `level`, capped by `config.max_hint_level`.
    pub fn request_hint(&mut self, level: u8, config: &EngineConfig) -> Result<HintPayload> {
        if matches!(self.state, PuzzleState::Generated | PuzzleState::Resolved) {
            return Err(self.reject("hint"));
        }
        let hint = get_hint(&self.puzzle, &self.recent_error_types(), level.min(config.max_hint_level));
        self.hints.push(hint.clone());
        Ok(hint)
    }

    /// Finish the puzzle and fold every recorded attempt into `model`.
    ///
    /// The returned model is what the host should persist.
    pub fn resolve(&mut self, model: &PlayerModel, config: &EngineConfig) -> Result<PlayerModel> {
        if !matches!(self.state, PuzzleState::AnsweredCorrect | PuzzleState::AnsweredIncorrect) {
            return Err(self.reject("resolve"));
        }
        self.state = PuzzleState::Resolved;
        Ok(self
            .attempts
            .iter()
            .fold(model.clone(), |m, result| update_model_from_attempt(&m, result, config)))
    }

    /// [`resolve`](Self::resolve), then persist the new model through `store`.
    ///
    /// A failed write is logged by the store and does not fail the call; the
    /// resolved model is returned either way.
    pub async fn resolve_and_save<S: PersistenceService>(
        &mut self,
        model: &PlayerModel,
        config: &EngineConfig,
        store: &PlayerModelStore<S>,
    ) -> Result<PlayerModel> {
        let next = self.resolve(model, config)?;
        store.save(&next).await;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_engine::{
        difficulty::{select_next_difficulty_among, SelectionReason},
        generate_puzzle,
        models::{LogicFamily, PuzzleRequest, Theme},
        store::{MemoryStore, DEFAULT_MODEL_KEY},
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session() -> PuzzleSession {
        let puzzle = generate_puzzle(
            PuzzleRequest::new(LogicFamily::Progression).tier(1).seed(7),
            &Theme::default(),
            &EngineConfig::default(),
        );
        PuzzleSession::new(puzzle)
    }

    fn session_for(family: LogicFamily, seed: u64) -> PuzzleSession {
        let puzzle = generate_puzzle(
            PuzzleRequest::new(family).tier(1).seed(seed),
            &Theme::default(),
            &EngineConfig::default(),
        );
        PuzzleSession::new(puzzle)
    }

    #[test]
    fn answer_requires_presentation() {
        let mut s = session();
        let id = s.puzzle().correct_answer.id.clone();
        assert!(s.answer_at(&id, 1).unwrap_err().is_invalid_transition());
        s.present().unwrap();
        assert!(s.answer_at(&id, 1).unwrap().correct);
        assert_eq!(s.state(), PuzzleState::AnsweredCorrect);
        assert!(s.answer_at(&id, 2).is_err());
    }

    #[test]
    fn wrong_answer_feeds_targeted_hints_and_allows_retry() {
        let config = EngineConfig::default();
        let mut s = session();
        s.present().unwrap();
        let wrong = s.puzzle().distractors[0].id.clone();
        let result = s.answer_at(&wrong, 1).unwrap();
        assert!(!result.correct);
        assert_eq!(s.recent_error_types().len(), 1);

        let hint = s.request_hint(1, &config).unwrap();
        let expected = get_hint(s.puzzle(), &s.recent_error_types(), 1);
        assert_eq!(hint, expected);

        let right = s.puzzle().correct_answer.id.clone();
        assert!(s.answer_at(&right, 2).unwrap().correct);
        assert_eq!(s.attempts().len(), 2);
    }

    #[test]
    fn resolve_folds_attempts_and_is_terminal() {
        let config = EngineConfig::default();
        let mut s = session();
        s.present().unwrap();
        assert!(s.resolve(&PlayerModel::new(), &config).is_err());
        let wrong = s.puzzle().distractors[0].id.clone();
        let right = s.puzzle().correct_answer.id.clone();
        s.answer_at(&wrong, 1).unwrap();
        s.answer_at(&right, 2).unwrap();
        let model = s.resolve(&PlayerModel::new(), &config).unwrap();
        let stats = model.stats(LogicFamily::Progression);
        assert_eq!((stats.attempts, stats.correct), (2, 1));
        assert_eq!(s.state(), PuzzleState::Resolved);
        assert!(s.request_hint(1, &config).is_err());
        assert!(s.present().is_err());
    }

    #[test]
    fn hint_level_is_capped_by_config() {
        let config = EngineConfig { max_hint_level: 2, ..Default::default() };
        let mut s = session();
        assert!(s.request_hint(1, &config).is_err());
        s.present().unwrap();
        assert_eq!(s.request_hint(4, &config).unwrap().level, 2);
        assert_eq!(s.hints().len(), 1);
    }

    #[test]
    fn unknown_option_is_invalid_input() {
        let mut s = session();
        s.present().unwrap();
        assert!(s.answer_at("nope", 1).unwrap_err().is_invalid_input());
        assert_eq!(s.state(), PuzzleState::Presented);
    }

    #[test]
    fn retries_count_as_one_selection() {
        let config = EngineConfig::default();

        let mut first = session_for(LogicFamily::Repetition, 1);
        first.present().unwrap();
        let right = first.puzzle().correct_answer.id.clone();
        first.answer_at(&right, 1).unwrap();
        let model = first.resolve(&PlayerModel::new(), &config).unwrap();

        let mut second = session_for(LogicFamily::Progression, 2);
        second.present().unwrap();
        let wrong_a = second.puzzle().distractors[0].id.clone();
        let wrong_b = second.puzzle().distractors[1].id.clone();
        let right = second.puzzle().correct_answer.id.clone();
        second.answer_at(&wrong_a, 2).unwrap();
        second.answer_at(&wrong_b, 3).unwrap();
        second.answer_at(&right, 4).unwrap();
        let model = second.resolve(&model, &config).unwrap();

        let stats = model.stats(LogicFamily::Progression);
        assert_eq!(stats.last_played_family_streak, 1);
        assert_eq!(stats.window.len(), 1);
        assert_eq!((stats.attempts, stats.correct), (3, 1));

        let mut rng = StdRng::seed_from_u64(3);
        let unlocked = [LogicFamily::Repetition, LogicFamily::Progression];
        let sel = select_next_difficulty_among(&model, &config, &unlocked, &mut rng);
        assert_eq!(sel.family, LogicFamily::Progression);
        assert_eq!(sel.rationale.reason, SelectionReason::WeakestFamily);
        assert_eq!(sel.tier, 1);
    }

    #[tokio::test]
    async fn resolve_and_save_persists_the_model() {
        let config = EngineConfig::default();
        let store = PlayerModelStore::new(MemoryStore::new(), &config);
        let mut s = session();
        s.present().unwrap();

        assert!(s.resolve_and_save(&PlayerModel::new(), &config, &store).await.is_err());
        assert_eq!(store.service().raw(DEFAULT_MODEL_KEY), None);

        let right = s.puzzle().correct_answer.id.clone();
        s.answer_at(&right, 1).unwrap();
        let model = s.resolve_and_save(&PlayerModel::new(), &config, &store).await.unwrap();
        assert!(store.service().raw(DEFAULT_MODEL_KEY).is_some());
        assert_eq!(store.load().await, model);
        assert_eq!(s.state(), PuzzleState::Resolved);
    }
}
