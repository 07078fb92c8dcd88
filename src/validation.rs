//! Advisory sanity checks for a regenerated plan
//!
//! Validation never blocks: it reports warnings and leaves the decision to
//! persist the plan with the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::regenerate::RegeneratedPlanWorkout;

/// Bounds checked by the validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub min_workout_sets: u32,
    pub max_workout_sets: u32,
    pub max_duration_minutes: u32,
    pub max_exercise_sets: u32,
    pub min_rest_seconds: u32,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            min_workout_sets: 5,
            max_workout_sets: 30,
            max_duration_minutes: 90,
            max_exercise_sets: 8,
            min_rest_seconds: 30,
        }
    }
}

/// Non-fatal issue found in a regenerated plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    LowVolume { workout: String, sets: u32 },
    HighVolume { workout: String, sets: u32 },
    LongDuration { workout: String, minutes: u32 },
    TooManySets { workout: String, exercise: String, sets: u32 },
    InvalidRepRange { workout: String, exercise: String, reps_min: u32, reps_max: u32 },
    ShortRest { workout: String, exercise: String, rest_seconds: u32 },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::LowVolume { workout, sets } => {
                write!(f, "{}: volume of {} sets is very low, consider adding exercises", workout, sets)
            }
            PlanWarning::HighVolume { workout, sets } => {
                write!(f, "{}: volume of {} sets is very high, overtraining risk", workout, sets)
            }
            PlanWarning::LongDuration { workout, minutes } => {
                write!(f, "{}: estimated duration of {} minutes may affect adherence", workout, minutes)
            }
            PlanWarning::TooManySets { workout, exercise, sets } => {
                write!(f, "{} / {}: {} sets for a single exercise", workout, exercise, sets)
            }
            PlanWarning::InvalidRepRange { workout, exercise, reps_min, reps_max } => {
                write!(f, "{} / {}: invalid rep range {}-{}", workout, exercise, reps_min, reps_max)
            }
            PlanWarning::ShortRest { workout, exercise, rest_seconds } => {
                write!(f, "{} / {}: rest of {}s is too short", workout, exercise, rest_seconds)
            }
        }
    }
}

/// Result of validating a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Informational only; true when no warnings were raised
    pub valid: bool,
    pub warnings: Vec<PlanWarning>,
}

/// Checks regenerated workouts against the configured bounds
pub struct PlanValidator {
    config: ValidationConfig,
}

impl PlanValidator {
    pub fn new() -> Self {
        PlanValidator {
            config: ValidationConfig::default(),
        }
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        PlanValidator { config }
    }

    pub fn validate(&self, workouts: &[RegeneratedPlanWorkout]) -> ValidationReport {
        let warnings: Vec<PlanWarning> = workouts.iter().flat_map(|w| self.check_workout(w)).collect();

        for warning in &warnings {
            tracing::warn!(%warning, "Plan validation warning");
        }

        ValidationReport {
            valid: warnings.is_empty(),
            warnings,
        }
    }

    fn check_workout(&self, workout: &RegeneratedPlanWorkout) -> Vec<PlanWarning> {
        let mut warnings = Vec::new();
        let name = &workout.name;

        if workout.target_volume < self.config.min_workout_sets {
            warnings.push(PlanWarning::LowVolume {
                workout: name.clone(),
                sets: workout.target_volume,
            });
        }
        if workout.target_volume > self.config.max_workout_sets {
            warnings.push(PlanWarning::HighVolume {
                workout: name.clone(),
                sets: workout.target_volume,
            });
        }
        if workout.estimated_duration_minutes > self.config.max_duration_minutes {
            warnings.push(PlanWarning::LongDuration {
                workout: name.clone(),
                minutes: workout.estimated_duration_minutes,
            });
        }

        for exercise in &workout.exercises {
            if exercise.target_sets > self.config.max_exercise_sets {
                warnings.push(PlanWarning::TooManySets {
                    workout: name.clone(),
                    exercise: exercise.name.clone(),
                    sets: exercise.target_sets,
                });
            }
            if exercise.target_reps_max < exercise.target_reps_min {
                warnings.push(PlanWarning::InvalidRepRange {
                    workout: name.clone(),
                    exercise: exercise.name.clone(),
                    reps_min: exercise.target_reps_min,
                    reps_max: exercise.target_reps_max,
                });
            }
            if exercise.rest_seconds < self.config.min_rest_seconds {
                warnings.push(PlanWarning::ShortRest {
                    workout: name.clone(),
                    exercise: exercise.name.clone(),
                    rest_seconds: exercise.rest_seconds,
                });
            }
        }

        warnings
    }
}

impl Default for PlanValidator {
    fn default() -> Self {
        Self::new()
    }
}
