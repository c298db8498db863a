//! Instruction vocabulary and contrastive pair expansion.
//!
//! Preference-style training wants, for each timestep, a `positive` sample
//! carrying the episode's real instruction and a `negative` twin whose
//! instruction is wrong. The wrong instructions come from the dataset's own
//! vocabulary: every distinct instruction seen across all retained episodes,
//! collected in a dedicated pre-pass before any sample is built.
//!
//! The vocabulary is an explicit immutable value threaded into the expander,
//! never ambient state, so expansion is a pure function of its inputs.

use serde::{Deserialize, Serialize};
use vlaforge_types::{ContrastivePair, Sample};

/// Negative instruction used when the vocabulary offers no alternative to a
/// sample's own goal (single-instruction datasets).
pub const FALLBACK_NEGATIVE_GOAL: &str = "this is an incorrect instruction";

// ────────────────────────────────────────────────────────────────────────────
// InstructionVocabulary
// ────────────────────────────────────────────────────────────────────────────

/// The distinct trimmed instruction strings of a dataset, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionVocabulary {
    goals: Vec<String>,
}

impl InstructionVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trimmed copy of `goal` unless it is already present.
    /// Returns `true` when the goal was new.
    pub fn insert(&mut self, goal: &str) -> bool {
        let trimmed = goal.trim();
        if self.goals.iter().any(|g| g == trimmed) {
            return false;
        }
        self.goals.push(trimmed.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.goals.iter().map(String::as_str)
    }

    /// Vocabulary entries that differ from `goal`, in insertion order.
    pub fn alternatives_to<'a>(&'a self, goal: &'a str) -> impl Iterator<Item = &'a str> {
        self.goals.iter().map(String::as_str).filter(move |g| *g != goal)
    }
}

impl FromIterator<String> for InstructionVocabulary {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut vocab = Self::new();
        for goal in iter {
            vocab.insert(&goal);
        }
        vocab
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pair expansion
// ────────────────────────────────────────────────────────────────────────────

/// Expand one sample into contrastive pairs.
///
/// One pair per vocabulary entry that differs from the sample's goal, in
/// vocabulary insertion order; the positive side is the sample unchanged and
/// the negative side is a clone with its goal overwritten. When no alternative
/// exists, exactly one pair is emitted with [`FALLBACK_NEGATIVE_GOAL`].
pub fn expand_pairs(sample: &Sample, vocabulary: &InstructionVocabulary) -> Vec<ContrastivePair> {
    let make_pair = |negative_goal: &str| {
        let mut negative = sample.clone();
        negative.lang_goal = negative_goal.to_string();
        ContrastivePair {
            positive: sample.clone(),
            negative,
        }
    };

    let pairs: Vec<ContrastivePair> = vocabulary
        .alternatives_to(&sample.lang_goal)
        .map(make_pair)
        .collect();
    if pairs.is_empty() {
        return vec![make_pair(FALLBACK_NEGATIVE_GOAL)];
    }
    pairs
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn sample(goal: &str) -> Sample {
        Sample {
            task: "task".to_string(),
            lang_goal: goal.to_string(),
            gripper_pose: [0.5; 8],
            low_dim_state: [1.0, 0.0],
            ignore_collisions: 1.0,
            views: BTreeMap::new(),
            arm_flag: None,
            current_gripper_pose: None,
        }
    }

    // ── Vocabulary ──────────────────────────────────────────────────────────

    #[test]
    fn insert_trims_and_deduplicates() {
        let mut vocab = InstructionVocabulary::new();
        assert!(vocab.insert(" pick up cup \n"));
        assert!(!vocab.insert("pick up cup"));
        assert!(vocab.insert("pour water"));
        assert_eq!(vocab.len(), 2);
        let goals: Vec<&str> = vocab.iter().collect();
        assert_eq!(goals, ["pick up cup", "pour water"]);
    }

    #[test]
    fn first_seen_order_is_preserved() {
        let vocab: InstructionVocabulary = ["b", "a", "c", "a"]
            .into_iter()
            .map(String::from)
            .collect();
        let goals: Vec<&str> = vocab.iter().collect();
        assert_eq!(goals, ["b", "a", "c"]);
    }

    #[test]
    fn alternatives_exclude_own_goal() {
        let vocab: InstructionVocabulary = ["pick up cup", "pour water", "open drawer"]
            .into_iter()
            .map(String::from)
            .collect();
        let alts: Vec<&str> = vocab.alternatives_to("pour water").collect();
        assert_eq!(alts, ["pick up cup", "open drawer"]);
    }

    // ── Expansion ───────────────────────────────────────────────────────────

    #[test]
    fn one_pair_per_alternative_goal() {
        let vocab: InstructionVocabulary = ["pick up cup", "pour water"]
            .into_iter()
            .map(String::from)
            .collect();
        let pairs = expand_pairs(&sample("pick up cup"), &vocab);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].positive.lang_goal, "pick up cup");
        assert_eq!(pairs[0].negative.lang_goal, "pour water");
    }

    #[test]
    fn many_alternatives_expand_in_vocabulary_order() {
        let vocab: InstructionVocabulary = ["a", "b", "c", "d"]
            .into_iter()
            .map(String::from)
            .collect();
        let pairs = expand_pairs(&sample("b"), &vocab);
        let negatives: Vec<&str> = pairs.iter().map(|p| p.negative.lang_goal.as_str()).collect();
        assert_eq!(negatives, ["a", "c", "d"]);
    }

    #[test]
    fn single_instruction_dataset_uses_fallback() {
        let vocab: InstructionVocabulary =
            ["pick up cup"].into_iter().map(String::from).collect();
        let pairs = expand_pairs(&sample("pick up cup"), &vocab);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].negative.lang_goal, FALLBACK_NEGATIVE_GOAL);
        assert_eq!(pairs[0].positive.lang_goal, "pick up cup");
    }

    #[test]
    fn negative_differs_only_in_goal() {
        let vocab: InstructionVocabulary = ["x", "y"].into_iter().map(String::from).collect();
        let pairs = expand_pairs(&sample("x"), &vocab);
        let (pos, neg) = (&pairs[0].positive, &pairs[0].negative);
        assert_eq!(pos.gripper_pose, neg.gripper_pose);
        assert_eq!(pos.low_dim_state, neg.low_dim_state);
        assert_eq!(pos.task, neg.task);
        assert_ne!(pos.lang_goal, neg.lang_goal);
    }

    #[test]
    fn vocabulary_serde_is_transparent() {
        let vocab: InstructionVocabulary = ["a", "b"].into_iter().map(String::from).collect();
        let json = serde_json::to_string(&vocab).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: InstructionVocabulary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vocab);
    }
}
