//! End-to-end demo of the adaptive puzzle loop.
//!
//! Run with: `cargo run --example demo`
//!
//! This example shows how `sequence_puzzle_gen` works end to end:
//!
//! 1. **One puzzle per family**: fixed seeds, so the output is deterministic
//!    and reproducible.
//!
//! 2. **Hint ladder**: the same puzzle at hint levels 1 to 4, after a wrong
//!    answer, showing how each level extends the one before.
//!
//! 3. **Adaptive loop**: a simulated learner plays twenty rounds; the
//!    controller picks family and tier, the model is saved to a
//!    `MemoryStore` and reloaded after every round.
//!
//! ## Key concepts demonstrated
//!
//! - `PuzzleRequest::new(family)` is the minimal constructor; `.tier()` and
//!   `.seed()` narrow it down.
//! - `rng_seed: Some(u64)` makes the output fully deterministic.
//! - `puzzle_to_sequence` is the JSON the client draws; it never reveals
//!   which option is correct.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sequence_puzzle_gen::{
    generate_puzzle, get_hint, next_puzzle, puzzle_to_sequence, update_model_from_attempt,
    validate_answer, EngineConfig, LogicFamily, MemoryStore, PlayerModelStore, PuzzleRequest,
    SequenceElement, SequencePuzzle, Theme,
};

fn show(e: &SequenceElement) -> String {
    format!("{} {} s{} {}° #{}", e.color, e.glyph, e.size, e.rotation, e.value)
}

/// Pretty-print one puzzle.
///
/// Shows: family, tier, pattern, id, the sequence with its gap, and every
/// option with the correct one marked.
fn print_puzzle(puzzle: &SequencePuzzle) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  [{} tier {}]  Pattern: {}  ID: {}",
        puzzle.family, puzzle.difficulty_tier, puzzle.pattern_id, puzzle.id);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for (i, slot) in puzzle.sequence.iter().enumerate() {
        match slot {
            Some(e) => println!("  {i}: {}", show(e)),
            None    => println!("  {i}: ???"),
        }
    }
    println!();
    let mut options: Vec<&SequenceElement> = puzzle.options().collect();
    options.sort_by(|a, b| a.id.cmp(&b.id));
    for option in options {
        let marker = if option.id == puzzle.correct_answer.id { "✓" } else { " " };
        println!("  [{}] {marker} {}", option.id, show(option));
    }
    println!();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = EngineConfig::default();
    let theme = Theme::default();

    // ── One puzzle per family ────────────────────────────────────────────────
    println!();
    println!("══ One puzzle per family (tier 2) ══");
    println!();
    for (family, seed) in [
        (LogicFamily::Repetition,  1001u64),
        (LogicFamily::Progression, 2002),
        (LogicFamily::SizeScaling, 3003),
        (LogicFamily::Rotation,    4004),
        (LogicFamily::Alternation, 5005),
    ] {
        let puzzle = generate_puzzle(PuzzleRequest::new(family).tier(2).seed(seed), &theme, &config);
        print_puzzle(&puzzle);
    }

    // ── Hint ladder ──────────────────────────────────────────────────────────
    println!();
    println!("══ Hint ladder after a wrong answer ══");
    println!();
    let puzzle = generate_puzzle(
        PuzzleRequest::new(LogicFamily::Progression).tier(3).seed(7),
        &theme,
        &config,
    );
    print_puzzle(&puzzle);
    let errors: Vec<_> = match validate_answer(&puzzle, &puzzle.distractors[0].id) {
        Ok(result) => {
            println!("  Chose {}: diagnosed as {:?}", result.chosen_element_id, result.error_type);
            result.error_type.into_iter().collect()
        }
        Err(e) => {
            println!("  Answer rejected: {e}");
            Vec::new()
        }
    };
    for level in 1..=config.max_hint_level {
        let hint = get_hint(&puzzle, &errors, level);
        println!("  L{} {:?}: {}", hint.level, hint.hint_type, hint.text);
    }
    println!();
    println!("  Client view: {}", puzzle_to_sequence(&puzzle));

    // ── Adaptive loop ────────────────────────────────────────────────────────
    // A learner who is right about 70% of the time.
    println!();
    println!("══ Adaptive loop: 20 rounds ══");
    println!();
    let store = PlayerModelStore::new(MemoryStore::new(), &config).with_key("demo-learner");
    let mut rng = StdRng::seed_from_u64(42);

    for round in 1..=20 {
        let model = store.load().await;
        let (selection, puzzle) = next_puzzle(&model, &config, &theme, &mut rng);
        let chosen = if rng.gen_bool(0.7) { &puzzle.correct_answer.id } else { &puzzle.distractors[0].id };
        let Ok(result) = validate_answer(&puzzle, chosen) else {
            continue;
        };
        println!("  #{round:>2} {:<12} tier {}  {}  ({})",
            selection.family.to_string(),
            selection.tier,
            if result.correct { "✓" } else { "✗" },
            selection.rationale);
        let model = update_model_from_attempt(&model, &result, &config);
        if !store.save(&model).await {
            println!("  model could not be saved");
        }
    }

    let model = store.load().await;
    println!();
    println!("  Level {}  Unlocked: {:?}", model.level(&config), model.unlocked_families(&config));
}
