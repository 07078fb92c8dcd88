//! End-to-end progression pipeline
//!
//! Logs and the active plan flow through the analyzer, the recommendation
//! engine, the regenerator, the safety rules, the validator and finally the
//! cycle generator. Every stage is pure, so independent users can be
//! processed in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::EngineConfig;
use crate::cycle::{CycleGenerator, CycleWeek};
use crate::error::{LiftRsError, Result};
use crate::metrics::{PerformanceAnalyzer, PerformanceMetrics};
use crate::models::{ExerciseLogEntry, WorkoutLogEntry, WorkoutPlan};
use crate::progression::ExerciseProgression;
use crate::recommendation::{ProgressionRecommendation, RecommendationEngine};
use crate::regenerate::{PlanRegenerator, RegeneratedPlanWorkout};
use crate::safety::{SafetyAdjustment, SafetyClamper};
use crate::validation::{PlanValidator, ValidationReport};

/// Everything the engine reads for one regeneration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionInput {
    pub plan: WorkoutPlan,

    /// Exercise history over the analysis window, keyed by exercise id
    #[serde(default)]
    pub exercise_logs: HashMap<String, Vec<ExerciseLogEntry>>,

    /// Workout sessions of the most recent window
    #[serde(default)]
    pub current_window: Vec<WorkoutLogEntry>,

    /// Workout sessions of the window before that
    #[serde(default)]
    pub previous_window: Vec<WorkoutLogEntry>,

    /// Workouts planned for the current window; defaults to the plan's weekly count
    #[serde(default)]
    pub planned_workouts: Option<u32>,
}

impl ProgressionInput {
    /// Read an input document from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn planned_workouts(&self) -> u32 {
        self.planned_workouts.unwrap_or(self.plan.workouts_per_week)
    }

    /// Structural pre-flight for input files
    ///
    /// Not part of the regeneration path; callers decide whether to stop on
    /// a failure. Rep ranges are left to the plan validator.
    pub fn check(&self) -> Result<()> {
        if self.plan.workouts.is_empty() {
            return Err(LiftRsError::Validation(format!(
                "plan '{}' has no workouts",
                self.plan.id
            )));
        }

        for workout in &self.plan.workouts {
            if let Some(exercise) = workout.exercises.iter().find(|e| e.target_sets == 0) {
                return Err(LiftRsError::Validation(format!(
                    "exercise '{}' in workout '{}' has no target sets",
                    exercise.exercise_id, workout.id
                )));
            }
        }

        Ok(())
    }
}

/// Result of one regeneration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionOutcome {
    pub plan_id: String,
    pub metrics: PerformanceMetrics,
    pub recommendation: ProgressionRecommendation,
    pub progressions: Vec<ExerciseProgression>,

    /// Final workouts after the safety rules
    pub workouts: Vec<RegeneratedPlanWorkout>,

    pub safety_adjustments: Vec<SafetyAdjustment>,
    pub deload_week: bool,
    pub validation: ValidationReport,

    /// Four-week expansion of `workouts`, when enabled
    pub cycle: Option<Vec<CycleWeek>>,
}

/// Runs the full progression pipeline
pub struct AdaptiveProgressionEngine {
    analyzer: PerformanceAnalyzer,
    regenerator: PlanRegenerator,
    clamper: SafetyClamper,
    validator: PlanValidator,
    generate_cycle: bool,
}

impl AdaptiveProgressionEngine {
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    pub fn with_config(config: &EngineConfig) -> Self {
        AdaptiveProgressionEngine {
            analyzer: PerformanceAnalyzer::with_config(config.analysis.clone()),
            regenerator: PlanRegenerator::with_config(config.regeneration.clone()),
            clamper: SafetyClamper::with_config(config.safety.clone(), config.regeneration.clone()),
            validator: PlanValidator::with_config(config.validation.clone()),
            generate_cycle: config.generate_cycle,
        }
    }

    /// Metrics and recommendation only, without touching the plan
    pub fn analyze(&self, input: &ProgressionInput) -> (PerformanceMetrics, ProgressionRecommendation) {
        let metrics = self.analyzer.analyze(
            &input.current_window,
            &input.previous_window,
            input.planned_workouts(),
        );
        let recommendation = RecommendationEngine::recommend(&metrics);
        (metrics, recommendation)
    }

    /// Regenerate the plan of one user
    pub fn regenerate(&self, input: &ProgressionInput) -> ProgressionOutcome {
        let span = tracing::info_span!(
            "engine.regenerate",
            plan_id = %input.plan.id,
            workouts = input.plan.workouts.len()
        );
        let _guard = span.enter();

        let (metrics, recommendation) = self.analyze(input);
        let regeneration = self
            .regenerator
            .regenerate(&input.plan, &input.exercise_logs, &recommendation);
        let safety = self.clamper.apply(&regeneration.workouts);
        let validation = self.validator.validate(&safety.workouts);

        let cycle = self
            .generate_cycle
            .then(|| CycleGenerator::generate(&safety.workouts, &metrics));

        tracing::debug!(
            action = %recommendation.action,
            adjustments = safety.adjustments.len(),
            warnings = validation.warnings.len(),
            "Plan regenerated"
        );

        ProgressionOutcome {
            plan_id: input.plan.id.clone(),
            metrics,
            recommendation,
            progressions: regeneration.progressions,
            workouts: safety.workouts,
            safety_adjustments: safety.adjustments,
            deload_week: safety.deload_week,
            validation,
            cycle,
        }
    }

    /// Regenerate many independent users in parallel, preserving input order
    pub fn regenerate_batch(&self, inputs: &[ProgressionInput]) -> Vec<ProgressionOutcome> {
        inputs.par_iter().map(|input| self.regenerate(input)).collect()
    }
}

impl Default for AdaptiveProgressionEngine {
    fn default() -> Self {
        Self::new()
    }
}
