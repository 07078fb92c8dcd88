use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Outcome of a logged workout session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    Completed,
    Partial,
    Skipped,
    InProgress,
}

impl WorkoutStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, WorkoutStatus::Completed)
    }
}

/// Exercise modality as recorded by the session logger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseModality {
    Strength,
    Cardio,
    Mobility,
    #[serde(other)]
    Other,
}

impl ExerciseModality {
    pub fn is_strength(&self) -> bool {
        matches!(self, ExerciseModality::Strength)
    }
}

/// One completed or attempted workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogEntry {
    /// Unique identifier for the session
    pub id: String,

    /// Date the session took place
    pub date: NaiveDate,

    /// Completion status
    pub status: WorkoutStatus,

    /// Duration the plan prescribed, in minutes
    pub planned_duration_minutes: Option<u32>,

    /// Duration actually trained, in minutes
    pub actual_duration_minutes: Option<u32>,

    /// Number of exercises completed
    #[serde(default)]
    pub exercises_completed: u32,

    /// Number of sets completed across all exercises
    #[serde(default)]
    pub total_sets_completed: u32,

    /// Sum of weight x reps across all sets
    #[serde(default)]
    pub total_volume: Decimal,

    /// Average Rate of Perceived Exertion (1-10)
    pub average_rpe: Option<Decimal>,

    /// Self-reported difficulty (1-10)
    pub perceived_difficulty: Option<Decimal>,

    /// Self-reported energy level (1-10)
    pub energy_level: Option<Decimal>,
}

/// One exercise's performance within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseLogEntry {
    /// Exercise identifier, shared with `PlannedExercise::exercise_id`
    pub exercise_id: String,

    /// Date of the session the exercise was logged in
    pub date: NaiveDate,

    /// Sets actually completed
    pub sets_completed: u32,

    /// Sum of weight x reps for this exercise
    #[serde(default)]
    pub total_volume: Decimal,

    /// Heaviest load used, in pounds (absent for bodyweight/cardio work)
    pub max_weight: Option<Decimal>,

    /// Average RPE across sets
    pub average_rpe: Option<Decimal>,

    /// Modality of the exercise
    pub modality: ExerciseModality,
}

/// Current prescription for one exercise of a workout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedExercise {
    pub exercise_id: String,
    pub name: String,
    pub exercise_order: u32,
    pub target_sets: u32,
    pub target_reps_min: u32,
    pub target_reps_max: u32,
    pub rest_seconds: u32,
}

/// A named session within the active plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedWorkout {
    pub id: String,
    pub name: String,
    pub day_of_week: Weekday,
    pub estimated_duration_minutes: u32,

    /// Target total set count, equal to the sum of the exercises' target sets
    pub target_volume: u32,

    /// Exercises in execution order
    pub exercises: Vec<PlannedExercise>,
}

impl PlannedWorkout {
    /// Sum of the exercises' target sets
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.target_sets).sum()
    }
}

/// The active workout plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub duration_weeks: u32,
    pub workouts_per_week: u32,

    /// 1-based pointer to the week currently being trained
    pub current_week: u32,

    pub workouts: Vec<PlannedWorkout>,
}

impl WorkoutPlan {
    /// Total planned sets across every workout
    pub fn total_sets(&self) -> u32 {
        self.workouts.iter().map(|w| w.total_sets()).sum()
    }

    /// Find the planned exercise with the given identifier
    pub fn find_exercise(&self, exercise_id: &str) -> Option<&PlannedExercise> {
        self.workouts
            .iter()
            .flat_map(|w| w.exercises.iter())
            .find(|e| e.exercise_id == exercise_id)
    }
}
