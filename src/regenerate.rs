//! Plan regeneration
//!
//! Walks every workout and exercise of the active plan, applies the
//! per-exercise progression and assembles the regenerated sessions with
//! their new loads, rest periods and estimated durations.

use chrono::Weekday;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::metrics::mean;
use crate::models::{ExerciseLogEntry, PlannedExercise, PlannedWorkout, WorkoutPlan};
use crate::progression::{ExerciseProgression, ExerciseProgressionCalculator};
use crate::recommendation::ProgressionRecommendation;

/// Round half away from zero to the nearest whole number
pub(crate) fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Round to the nearest 0.5 unit (plate increments)
pub(crate) fn round_to_half(value: Decimal) -> Decimal {
    round_whole(value * dec!(2)) / dec!(2)
}

/// Settings for rest and duration adjustments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegenerationConfig {
    /// Rest added or removed per load change, in seconds
    pub rest_step_seconds: u32,

    /// Upper bound for lengthened rest
    pub max_rest_seconds: u32,

    /// Lower bound for shortened rest
    pub min_rest_seconds: u32,

    /// Load change (percent) below which rest is shortened
    pub rest_reduction_threshold_pct: Decimal,

    /// Bounds for the rescaled session duration, in minutes
    pub min_duration_minutes: u32,
    pub max_duration_minutes: u32,
}

impl Default for RegenerationConfig {
    fn default() -> Self {
        RegenerationConfig {
            rest_step_seconds: 15,
            max_rest_seconds: 300,
            min_rest_seconds: 30,
            rest_reduction_threshold_pct: dec!(-5),
            min_duration_minutes: 20,
            max_duration_minutes: 120,
        }
    }
}

/// Exercise prescription after regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegeneratedPlanExercise {
    pub exercise_id: String,
    pub name: String,
    pub exercise_order: u32,
    pub target_sets: u32,
    pub target_reps_min: u32,
    pub target_reps_max: u32,

    /// Working weight, only for logged strength exercises
    pub target_weight: Option<Decimal>,

    pub rest_seconds: u32,
    pub progression_notes: String,

    /// Sets prescribed before regeneration
    pub previous_sets: u32,

    /// Mean top weight of the log window the new weight was derived from
    pub baseline_weight: Option<Decimal>,

    /// Load adjustment in percent applied to the baseline
    pub weight_adjustment: Decimal,
}

/// Workout after regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegeneratedPlanWorkout {
    pub workout_id: String,
    pub name: String,
    pub day_of_week: Weekday,
    pub exercises: Vec<RegeneratedPlanExercise>,

    /// Total sets across the exercises
    pub target_volume: u32,

    pub estimated_duration_minutes: u32,

    /// Total sets before regeneration
    pub previous_volume: u32,

    pub previous_duration_minutes: u32,
}

impl RegeneratedPlanWorkout {
    /// Sum of the exercises' target sets
    pub fn total_sets(&self) -> u32 {
        self.exercises.iter().map(|e| e.target_sets).sum()
    }
}

/// Output of one regeneration pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regeneration {
    pub workouts: Vec<RegeneratedPlanWorkout>,
    pub progressions: Vec<ExerciseProgression>,
}

/// Regenerates a plan from exercise logs and the global recommendation
pub struct PlanRegenerator {
    config: RegenerationConfig,
}

impl PlanRegenerator {
    /// Create regenerator with default rest and duration bounds
    pub fn new() -> Self {
        PlanRegenerator {
            config: RegenerationConfig::default(),
        }
    }

    /// Create regenerator with custom configuration
    pub fn with_config(config: RegenerationConfig) -> Self {
        PlanRegenerator { config }
    }

    pub fn config(&self) -> &RegenerationConfig {
        &self.config
    }

    /// Regenerate every workout of `plan`
    pub fn regenerate(
        &self,
        plan: &WorkoutPlan,
        exercise_logs: &HashMap<String, Vec<ExerciseLogEntry>>,
        global: &ProgressionRecommendation,
    ) -> Regeneration {
        let mut progressions = Vec::new();
        let workouts = plan
            .workouts
            .iter()
            .map(|workout| self.regenerate_workout(workout, exercise_logs, global, &mut progressions))
            .collect();

        Regeneration {
            workouts,
            progressions,
        }
    }

    fn regenerate_workout(
        &self,
        workout: &PlannedWorkout,
        exercise_logs: &HashMap<String, Vec<ExerciseLogEntry>>,
        global: &ProgressionRecommendation,
        progressions: &mut Vec<ExerciseProgression>,
    ) -> RegeneratedPlanWorkout {
        let exercises: Vec<RegeneratedPlanExercise> = workout
            .exercises
            .iter()
            .map(|planned| {
                let logs = exercise_logs
                    .get(&planned.exercise_id)
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                let progression = ExerciseProgressionCalculator::calculate(logs, planned, global);
                let exercise = self.regenerate_exercise(planned, logs, &progression);
                progressions.push(progression);
                exercise
            })
            .collect();

        let target_volume = exercises.iter().map(|e| e.target_sets).sum();
        let estimated_duration_minutes = scaled_duration(
            workout.estimated_duration_minutes,
            workout.target_volume,
            target_volume,
            &self.config,
        );

        RegeneratedPlanWorkout {
            workout_id: workout.id.clone(),
            name: workout.name.clone(),
            day_of_week: workout.day_of_week,
            exercises,
            target_volume,
            estimated_duration_minutes,
            previous_volume: workout.target_volume,
            previous_duration_minutes: workout.estimated_duration_minutes,
        }
    }

    fn regenerate_exercise(
        &self,
        planned: &PlannedExercise,
        logs: &[ExerciseLogEntry],
        progression: &ExerciseProgression,
    ) -> RegeneratedPlanExercise {
        let is_strength = logs
            .iter()
            .max_by_key(|l| l.date)
            .map_or(false, |latest| latest.modality.is_strength());

        let baseline_weight = if is_strength {
            mean(logs.iter().filter_map(|l| l.max_weight))
        } else {
            None
        };
        let target_weight = baseline_weight
            .map(|w| round_to_half(w * (Decimal::ONE + progression.weight_adjustment / dec!(100))));

        RegeneratedPlanExercise {
            exercise_id: planned.exercise_id.clone(),
            name: planned.name.clone(),
            exercise_order: planned.exercise_order,
            target_sets: progression.target_sets,
            target_reps_min: progression.target_reps_min,
            target_reps_max: progression.target_reps_max,
            target_weight,
            rest_seconds: self.adjust_rest(planned.rest_seconds, progression.weight_adjustment),
            progression_notes: progression_notes(progression),
            previous_sets: planned.target_sets,
            baseline_weight,
            weight_adjustment: progression.weight_adjustment,
        }
    }

    /// Heavier loads earn longer rest; sharp load cuts shorten it
    ///
    /// The result always lies within `[min_rest_seconds, max_rest_seconds]`.
    fn adjust_rest(&self, rest_seconds: u32, weight_adjustment: Decimal) -> u32 {
        let rest = if weight_adjustment > Decimal::ZERO {
            rest_seconds.saturating_add(self.config.rest_step_seconds)
        } else if weight_adjustment < self.config.rest_reduction_threshold_pct {
            rest_seconds.saturating_sub(self.config.rest_step_seconds)
        } else {
            rest_seconds
        };
        rest.max(self.config.min_rest_seconds).min(self.config.max_rest_seconds)
    }
}

impl Default for PlanRegenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Scale a session's duration by its change in set volume
pub(crate) fn scaled_duration(
    previous_duration: u32,
    previous_volume: u32,
    new_volume: u32,
    config: &RegenerationConfig,
) -> u32 {
    let scaled = if previous_volume == 0 {
        Decimal::from(previous_duration)
    } else {
        Decimal::from(previous_duration) * Decimal::from(new_volume) / Decimal::from(previous_volume)
    };

    round_whole(scaled)
        .to_u32()
        .unwrap_or(config.max_duration_minutes)
        .max(config.min_duration_minutes)
        .min(config.max_duration_minutes)
}

fn signed(value: Decimal) -> String {
    if value > Decimal::ZERO {
        format!("+{}", value.normalize())
    } else {
        value.normalize().to_string()
    }
}

fn progression_notes(progression: &ExerciseProgression) -> String {
    format!(
        "{}: sets {:+}, reps {:+}, load {}%. {}",
        progression.recommendation.action,
        progression.sets_adjustment,
        progression.reps_adjustment,
        signed(progression.weight_adjustment),
        progression.recommendation.rationale
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ExerciseModality;
    use crate::recommendation::ProgressionAction;
    use chrono::NaiveDate;

    fn exercise(id: &str, order: u32, sets: u32, rest: u32) -> PlannedExercise {
        PlannedExercise {
            exercise_id: id.to_string(),
            name: id.replace('_', " "),
            exercise_order: order,
            target_sets: sets,
            target_reps_min: 8,
            target_reps_max: 12,
            rest_seconds: rest,
        }
    }

    fn plan() -> WorkoutPlan {
        WorkoutPlan {
            id: "plan".to_string(),
            name: "Upper Lower".to_string(),
            duration_weeks: 6,
            workouts_per_week: 2,
            current_week: 2,
            workouts: vec![PlannedWorkout {
                id: "upper".to_string(),
                name: "Upper A".to_string(),
                day_of_week: Weekday::Tue,
                estimated_duration_minutes: 60,
                target_volume: 10,
                exercises: vec![
                    exercise("bench_press", 1, 4, 120),
                    exercise("row", 2, 3, 90),
                    exercise("plank", 3, 3, 60),
                ],
            }],
        }
    }

    fn log(id: &str, weight: Option<Decimal>, modality: ExerciseModality, sets: u32) -> ExerciseLogEntry {
        ExerciseLogEntry {
            exercise_id: id.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            sets_completed: sets,
            total_volume: dec!(3000),
            max_weight: weight,
            average_rpe: Some(dec!(7.5)),
            modality,
        }
    }

    fn increase() -> ProgressionRecommendation {
        ProgressionRecommendation {
            action: ProgressionAction::Increase,
            volume_adjustment: dec!(5),
            intensity_adjustment: dec!(2.5),
            rationale: "Ready for progressive overload.".to_string(),
            confidence: dec!(88),
        }
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_to_half(dec!(102.24)), dec!(102));
        assert_eq!(round_to_half(dec!(102.25)), dec!(102.5));
        assert_eq!(round_to_half(dec!(102.8)), dec!(103));
        assert_eq!(round_whole(dec!(2.5)), dec!(3));
    }

    #[test]
    fn test_regenerates_in_order_with_weights() {
        let mut logs = HashMap::new();
        logs.insert(
            "bench_press".to_string(),
            vec![log("bench_press", Some(dec!(100)), ExerciseModality::Strength, 4)],
        );
        logs.insert(
            "plank".to_string(),
            vec![log("plank", None, ExerciseModality::Mobility, 3)],
        );

        let result = PlanRegenerator::new().regenerate(&plan(), &logs, &increase());
        let workout = &result.workouts[0];

        assert_eq!(result.progressions.len(), 3);
        let orders: Vec<u32> = workout.exercises.iter().map(|e| e.exercise_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);

        let bench = &workout.exercises[0];
        assert_eq!(bench.target_sets, 5);
        assert_eq!(bench.target_weight, Some(dec!(102.5)));
        assert_eq!(bench.rest_seconds, 135);
        assert_eq!(bench.previous_sets, 4);
        assert!(bench.progression_notes.starts_with("increase: sets +1"));

        // no logs: unchanged, no weight
        let row = &workout.exercises[1];
        assert_eq!(row.target_sets, 3);
        assert_eq!(row.target_weight, None);
        assert_eq!(row.rest_seconds, 90);

        // non-strength: progresses sets but carries no weight
        let plank = &workout.exercises[2];
        assert_eq!(plank.target_sets, 4);
        assert_eq!(plank.target_weight, None);
        assert_eq!(plank.baseline_weight, None);

        assert_eq!(workout.target_volume, 12);
        assert_eq!(workout.previous_volume, 10);
        assert_eq!(workout.estimated_duration_minutes, 72);
    }

    #[test]
    fn test_rest_adjustment_bounds() {
        let regenerator = PlanRegenerator::new();
        assert_eq!(regenerator.adjust_rest(295, dec!(2.5)), 300);
        assert_eq!(regenerator.adjust_rest(120, dec!(-15)), 105);
        assert_eq!(regenerator.adjust_rest(40, dec!(-15)), 30);
        assert_eq!(regenerator.adjust_rest(120, dec!(-5)), 120);
        assert_eq!(regenerator.adjust_rest(120, dec!(0)), 120);
        assert_eq!(regenerator.adjust_rest(10, dec!(0)), 30);
        assert_eq!(regenerator.adjust_rest(400, dec!(-5)), 300);
        assert_eq!(regenerator.adjust_rest(u32::MAX, dec!(2.5)), 300);
    }

    #[test]
    fn test_duration_scaling_is_clamped() {
        let config = RegenerationConfig::default();
        assert_eq!(scaled_duration(60, 10, 5, &config), 30);
        assert_eq!(scaled_duration(30, 10, 5, &config), 20);
        assert_eq!(scaled_duration(100, 10, 20, &config), 120);
        assert_eq!(scaled_duration(45, 0, 12, &config), 45);
    }
}
