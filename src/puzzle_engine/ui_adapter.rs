use serde_json::{json, Value};

use crate::puzzle_engine::models::{Dimension, SequenceElement, SequencePuzzle};

/// Render-facing view of one element. Attributes the rule never varies are
/// still sent so the client can draw the element as-is.
fn element_view(e: &SequenceElement, show_value: bool) -> Value {
    let value = if show_value { Value::from(e.value) } else { Value::Null };
    json!({
        "id": e.id,
        "glyph": e.glyph,
        "color": e.color,
        "size": e.size,
        "rotation": e.rotation,
        "value": value,
    })
}

/// Build one sequence slot: an element, or a placeholder for the gap.
fn slot_view(index: usize, slot: Option<&SequenceElement>, show_value: bool) -> Value {
    match slot {
        Some(e) => json!({ "index": index, "missing": false, "element": element_view(e, show_value) }),
        None => json!({ "index": index, "missing": true, "element": Value::Null }),
    }
}

/// Map a [`SequencePuzzle`] to the JSON object the client renders.
///
/// Drops the seed, the rule and anything that tells the correct answer apart
/// from the distractors: options are listed in id order, and ids are assigned
/// from a shuffled order at generation time.
pub fn puzzle_to_sequence(puzzle: &SequencePuzzle) -> Value {
    let show_value = puzzle.rule.is_varying(Dimension::Value);

    let sequence: Vec<Value> = puzzle
        .sequence
        .iter()
        .enumerate()
        .map(|(i, slot)| slot_view(i, slot.as_ref(), show_value))
        .collect();

    let mut options: Vec<&SequenceElement> = puzzle.options().collect();
    options.sort_by(|a, b| a.id.cmp(&b.id));
    let options: Vec<Value> = options.into_iter().map(|e| element_view(e, show_value)).collect();

    json!({
        "puzzleId": puzzle.id,
        "family": puzzle.family.id(),
        "tier": puzzle.difficulty_tier,
        "missingIndex": puzzle.missing_index(),
        "sequence": sequence,
        "options": options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle_engine::{generate_puzzle, models::{LogicFamily, PuzzleRequest, Theme}, EngineConfig};

    #[test]
    fn view_hides_internal_fields() {
        let p = generate_puzzle(
            PuzzleRequest::new(LogicFamily::Progression).tier(1).seed(7),
            &Theme::default(),
            &EngineConfig::default(),
        );
        let v = puzzle_to_sequence(&p);
        let obj = v.as_object().unwrap();
        assert!(!obj.contains_key("seed"));
        assert!(!obj.contains_key("correctAnswer"));
        assert!(!obj.contains_key("distractors"));
        assert_eq!(v["family"], "progression");
        assert_eq!(v["sequence"].as_array().unwrap().len(), 4);
        assert_eq!(v["missingIndex"], 3);
        assert_eq!(v["sequence"][3]["missing"], true);

        let ids: Vec<&str> = v["options"].as_array().unwrap().iter().map(|o| o["id"].as_str().unwrap()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(ids.len(), 1 + p.distractors.len());
        assert!(v["options"][0]["value"].is_i64());
    }

    #[test]
    fn non_numeric_puzzles_hide_the_value() {
        let p = generate_puzzle(
            PuzzleRequest::new(LogicFamily::Alternation).tier(1).seed(3),
            &Theme::default(),
            &EngineConfig::default(),
        );
        let v = puzzle_to_sequence(&p);
        assert!(v["options"][0]["value"].is_null());
    }
}
