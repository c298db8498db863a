//! Eager dataset construction.
//!
//! [`EpisodeDataset::construct`] walks tasks → episodes → timesteps, builds
//! one [`TrainingItem`] per timestep (or one per contrastive pair) and holds
//! the whole table in memory. There is no lazy loading: every retained frame
//! and point cloud is resident for the dataset's lifetime. That trade is
//! deliberate — construction-time simplicity and O(1) `get` over memory
//! frugality — and the enumerator/builder seam is where an on-demand variant
//! would slot in if recordings outgrow RAM.
//!
//! Skip policy: a missing artifact aborts only its episode, which is dropped
//! atomically (its samples are buffered and committed on success, so a
//! half-loaded episode never reaches the table). Malformed artifacts and
//! unsupported views abort the whole build. A missing dataset root is fatal.

use tracing::{info, warn};
use uuid::Uuid;

use serde::Serialize;
use vlaforge_types::{DatasetError, TrainingItem};

use crate::builder::{self, StepContext};
use crate::config::DatasetConfig;
use crate::contrastive::{self, InstructionVocabulary};
use crate::episode::{self, EpisodeEntry, TaskEntry};
use crate::{artifact, pose_log};

// ────────────────────────────────────────────────────────────────────────────
// EpisodeDataset
// ────────────────────────────────────────────────────────────────────────────

/// A fully materialized table of training items, immutable once constructed.
#[derive(Debug)]
pub struct EpisodeDataset {
    id: Uuid,
    config: DatasetConfig,
    items: Vec<TrainingItem>,
    vocabulary: InstructionVocabulary,
    tasks: usize,
    episodes_loaded: usize,
    episodes_skipped: usize,
}

/// Counts describing one constructed dataset, serializable for reports.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub id: Uuid,
    pub tasks: usize,
    pub episodes_loaded: usize,
    pub episodes_skipped: usize,
    pub items: usize,
    pub samples: usize,
    pub pairs: usize,
    pub vocabulary_size: usize,
}

impl EpisodeDataset {
    /// Build the dataset described by `config`.
    ///
    /// Runs the instruction pre-pass first when contrastive pairing is on,
    /// then the main enumeration. Returns a fully populated table or an error
    /// naming the offending artifact; never a partial table.
    pub fn construct(config: DatasetConfig) -> Result<Self, DatasetError> {
        config.validate()?;

        let tasks = episode::enumerate_tasks(&config.root)?;
        info!(
            root = %config.root.display(),
            tasks = tasks.len(),
            ep_per_task = config.ep_per_task,
            "constructing dataset"
        );

        let vocabulary = if config.contrastive_pairs {
            let vocab = collect_instructions(&tasks, config.ep_per_task)?;
            info!(goals = vocab.len(), "collected instruction vocabulary");
            vocab
        } else {
            InstructionVocabulary::new()
        };

        let mut items = Vec::new();
        let mut episodes_loaded = 0;
        let mut episodes_skipped = 0;
        for task in &tasks {
            let episodes = episode::enumerate_episodes(&task.path, config.ep_per_task)?;
            for ep in &episodes {
                match load_episode(&config, &task.name, ep, &vocabulary) {
                    Ok(mut episode_items) => {
                        episodes_loaded += 1;
                        items.append(&mut episode_items);
                    }
                    Err(e) if e.is_not_found() => {
                        warn!(
                            task = %task.name,
                            episode = ep.index,
                            error = %e,
                            "episode is missing an artifact, skipping it"
                        );
                        episodes_skipped += 1;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        let dataset = Self {
            id: Uuid::new_v4(),
            config,
            items,
            vocabulary,
            tasks: tasks.len(),
            episodes_loaded,
            episodes_skipped,
        };
        let summary = dataset.summary();
        info!(
            id = %summary.id,
            items = summary.items,
            episodes = summary.episodes_loaded,
            skipped = summary.episodes_skipped,
            "dataset constructed"
        );
        Ok(dataset)
    }

    /// Identifier stamped on this construction run.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// O(1) random access into the table.
    pub fn get(&self, index: usize) -> Option<&TrainingItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrainingItem> {
        self.items.iter()
    }

    /// The instruction vocabulary used for pairing (empty unless contrastive
    /// pairing was enabled).
    pub fn vocabulary(&self) -> &InstructionVocabulary {
        &self.vocabulary
    }

    pub fn summary(&self) -> DatasetSummary {
        let pairs = self
            .items
            .iter()
            .filter(|i| matches!(i, TrainingItem::Pair(_)))
            .count();
        DatasetSummary {
            id: self.id,
            tasks: self.tasks,
            episodes_loaded: self.episodes_loaded,
            episodes_skipped: self.episodes_skipped,
            items: self.items.len(),
            samples: self.items.len() - pairs,
            pairs,
            vocabulary_size: self.vocabulary.len(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Instruction pre-pass
// ────────────────────────────────────────────────────────────────────────────

/// Walk every retained episode and collect its trimmed instruction.
///
/// Episodes missing their instruction artifact are skipped with a warning,
/// mirroring the main pass's skip policy; they contribute no samples later
/// either.
fn collect_instructions(
    tasks: &[TaskEntry],
    ep_per_task: usize,
) -> Result<InstructionVocabulary, DatasetError> {
    let mut vocabulary = InstructionVocabulary::new();
    for task in tasks {
        for ep in episode::enumerate_episodes(&task.path, ep_per_task)? {
            match artifact::read_text(&ep.layout.instruction()) {
                Ok(instruction) => {
                    vocabulary.insert(&instruction);
                }
                Err(e) if e.is_not_found() => {
                    warn!(
                        task = %task.name,
                        episode = ep.index,
                        "no instruction artifact, episode contributes no goal"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(vocabulary)
}

// ────────────────────────────────────────────────────────────────────────────
// Episode loading
// ────────────────────────────────────────────────────────────────────────────

/// Build every training item of one episode.
///
/// The pose log, instruction and extrinsic are read once here and shared by
/// all of the episode's steps; only the per-step frame artifacts are read
/// inside the loop.
fn load_episode(
    config: &DatasetConfig,
    task: &str,
    ep: &EpisodeEntry,
    vocabulary: &InstructionVocabulary,
) -> Result<Vec<TrainingItem>, DatasetError> {
    let layout = &ep.layout;

    let pose_text = artifact::read_text(&layout.pose_log())?;
    let lines = pose_log::parse_pose_log(&pose_text)
        .map_err(|e| DatasetError::format(layout.pose_log(), e.to_string()))?;
    let records: Vec<_> = lines.into_iter().map(|l| l.record).collect();

    let lang_goal = artifact::read_text(&layout.instruction())?.trim().to_string();
    let extrinsic = artifact::read_extrinsic(&layout.extrinsic())?;
    let num_steps = episode::count_steps(&layout.rgb_dir())?;

    // Steps 0..=num_steps-2 each need records step and step+1.
    if records.len() < num_steps {
        return Err(DatasetError::format(
            layout.pose_log(),
            format!(
                "{} pose record(s) for {num_steps} frame(s); every frame needs one",
                records.len()
            ),
        ));
    }

    let mut items = Vec::new();
    for step in 0..num_steps.saturating_sub(1) {
        let built = builder::build_step(&StepContext {
            task,
            layout,
            step,
            num_steps,
            records: &records,
            lang_goal: &lang_goal,
            extrinsic: &extrinsic,
            views: &config.cameras,
            output_arm_flag: config.output_arm_flag,
        })?;

        if config.contrastive_pairs {
            let mut pairs = contrastive::expand_pairs(&built.sample, vocabulary);
            if config.current_pose_input {
                for pair in &mut pairs {
                    builder::apply_current_pose(&mut pair.positive, built.current_pose);
                    builder::apply_current_pose(&mut pair.negative, built.current_pose);
                }
            }
            items.extend(pairs.into_iter().map(TrainingItem::Pair));
        } else {
            let mut sample = built.sample;
            if config.current_pose_input {
                builder::apply_current_pose(&mut sample, built.current_pose);
            }
            items.push(TrainingItem::Sample(sample));
        }
    }
    Ok(items)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
