//! Safety rules applied to a regenerated plan
//!
//! Each rule is a transform from one set of workouts to a new one, applied
//! in a fixed order:
//!
//! 1. Global volume cap: total sets may grow by at most 10% over the plan.
//! 2. Weekly set cap: no exercise gains more than two sets.
//! 3. Weight-increase cap: +5% for high-set (compound) exercises, +10% for
//!    the rest, relative to the logged baseline.
//! 4. Deload enforcement: when every workout lost more than 20% of its
//!    sets, all working weights drop by a further 30%.
//!
//! Rules never report errors; unsafe output is corrected deterministically.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::regenerate::{round_to_half, round_whole, scaled_duration, RegeneratedPlanWorkout, RegenerationConfig};

/// Thresholds for the safety rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyConfig {
    /// Maximum growth of total plan sets, in percent
    pub max_volume_increase_pct: Decimal,

    /// Maximum sets an exercise may gain in one regeneration
    pub max_weekly_set_increase: u32,

    /// Previous set count from which an exercise is treated as compound
    pub compound_set_threshold: u32,

    /// Load increase caps, in percent over the logged baseline
    pub compound_weight_cap_pct: Decimal,
    pub isolation_weight_cap_pct: Decimal,

    /// Volume ratio under which every workout counts as a deload
    pub deload_volume_ratio: Decimal,

    /// Load multiplier enforced on a deload week
    pub deload_weight_factor: Decimal,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        SafetyConfig {
            max_volume_increase_pct: dec!(10),
            max_weekly_set_increase: 2,
            compound_set_threshold: 4,
            compound_weight_cap_pct: dec!(5),
            isolation_weight_cap_pct: dec!(10),
            deload_volume_ratio: dec!(0.8),
            deload_weight_factor: dec!(0.7),
        }
    }
}

/// Safety rule that changed a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyRule {
    GlobalVolumeCap,
    WeeklySetCap,
    WeightIncreaseCap,
    DeloadWeightReduction,
}

impl fmt::Display for SafetyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SafetyRule::GlobalVolumeCap => write!(f, "global volume cap"),
            SafetyRule::WeeklySetCap => write!(f, "weekly set cap"),
            SafetyRule::WeightIncreaseCap => write!(f, "weight increase cap"),
            SafetyRule::DeloadWeightReduction => write!(f, "deload weight reduction"),
        }
    }
}

/// One value corrected by a safety rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAdjustment {
    pub rule: SafetyRule,
    pub workout_id: String,
    pub exercise_id: String,
    pub from: Decimal,
    pub to: Decimal,
}

/// Workouts after the safety rules, with the corrections that were made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyOutcome {
    pub workouts: Vec<RegeneratedPlanWorkout>,
    pub adjustments: Vec<SafetyAdjustment>,

    /// True when deload enforcement fired
    pub deload_week: bool,
}

/// Applies the safety rules to regenerated workouts
pub struct SafetyClamper {
    config: SafetyConfig,
    regeneration: RegenerationConfig,
}

impl SafetyClamper {
    pub fn new() -> Self {
        Self::with_config(SafetyConfig::default(), RegenerationConfig::default())
    }

    /// `regeneration` supplies the duration bounds used when totals change
    pub fn with_config(config: SafetyConfig, regeneration: RegenerationConfig) -> Self {
        SafetyClamper { config, regeneration }
    }

    /// Apply every rule in order, producing a new set of workouts
    pub fn apply(&self, workouts: &[RegeneratedPlanWorkout]) -> SafetyOutcome {
        let mut adjustments = Vec::new();

        let workouts = self.cap_total_volume(workouts.to_vec(), &mut adjustments);
        let workouts = self.cap_weekly_sets(workouts, &mut adjustments);
        let workouts = self.cap_weight_increase(workouts, &mut adjustments);
        let deload_week = self.is_deload_week(&workouts);
        let workouts = if deload_week {
            self.enforce_deload(workouts, &mut adjustments)
        } else {
            workouts
        };

        for adjustment in &adjustments {
            tracing::info!(
                rule = %adjustment.rule,
                workout = %adjustment.workout_id,
                exercise = %adjustment.exercise_id,
                from = %adjustment.from,
                to = %adjustment.to,
                "Safety rule applied"
            );
        }

        SafetyOutcome {
            workouts,
            adjustments,
            deload_week,
        }
    }

    /// Rule 1: scale all sets down uniformly so the plan total stays within
    /// the allowed growth, then trim the largest exercises while rounding or
    /// the one-set floor leaves the total above the cap
    fn cap_total_volume(
        &self,
        mut workouts: Vec<RegeneratedPlanWorkout>,
        adjustments: &mut Vec<SafetyAdjustment>,
    ) -> Vec<RegeneratedPlanWorkout> {
        let previous_total: u32 = workouts
            .iter()
            .flat_map(|w| w.exercises.iter())
            .map(|e| e.previous_sets)
            .sum();
        let new_total: u32 = workouts.iter().map(|w| w.total_sets()).sum();

        let cap = (Decimal::from(previous_total) * (Decimal::ONE + self.config.max_volume_increase_pct / dec!(100)))
            .floor()
            .to_u32()
            .unwrap_or(previous_total);

        if previous_total == 0 || new_total <= cap {
            return workouts;
        }

        let before: Vec<Vec<u32>> = workouts
            .iter()
            .map(|w| w.exercises.iter().map(|e| e.target_sets).collect())
            .collect();

        let factor = Decimal::from(cap) / Decimal::from(new_total);
        for exercise in workouts.iter_mut().flat_map(|w| w.exercises.iter_mut()) {
            exercise.target_sets = round_whole(Decimal::from(exercise.target_sets) * factor)
                .to_u32()
                .unwrap_or(1)
                .max(1);
        }

        let mut total: u32 = workouts.iter().map(|w| w.total_sets()).sum();
        while total > cap {
            let largest = workouts
                .iter_mut()
                .flat_map(|w| w.exercises.iter_mut())
                .filter(|e| e.target_sets > 1)
                .max_by(|a, b| a.target_sets.cmp(&b.target_sets).then(b.exercise_order.cmp(&a.exercise_order)));
            match largest {
                Some(exercise) => {
                    exercise.target_sets -= 1;
                    total -= 1;
                }
                None => break,
            }
        }

        for (workout, sets_before) in workouts.iter_mut().zip(before) {
            for (exercise, from) in workout.exercises.iter_mut().zip(sets_before) {
                if exercise.target_sets != from {
                    exercise.progression_notes.push_str(&format!(" [{}]", SafetyRule::GlobalVolumeCap));
                    adjustments.push(SafetyAdjustment {
                        rule: SafetyRule::GlobalVolumeCap,
                        workout_id: workout.workout_id.clone(),
                        exercise_id: exercise.exercise_id.clone(),
                        from: Decimal::from(from),
                        to: Decimal::from(exercise.target_sets),
                    });
                }
            }
        }

        workouts.into_iter().map(|w| self.recompute_totals(w)).collect()
    }

    /// Rule 2: an exercise may gain at most `max_weekly_set_increase` sets
    fn cap_weekly_sets(
        &self,
        workouts: Vec<RegeneratedPlanWorkout>,
        adjustments: &mut Vec<SafetyAdjustment>,
    ) -> Vec<RegeneratedPlanWorkout> {
        workouts
            .into_iter()
            .map(|mut workout| {
                for exercise in workout.exercises.iter_mut() {
                    let limit = exercise.previous_sets.saturating_add(self.config.max_weekly_set_increase);
                    if exercise.target_sets > limit {
                        adjustments.push(SafetyAdjustment {
                            rule: SafetyRule::WeeklySetCap,
                            workout_id: workout.workout_id.clone(),
                            exercise_id: exercise.exercise_id.clone(),
                            from: Decimal::from(exercise.target_sets),
                            to: Decimal::from(limit),
                        });
                        exercise.target_sets = limit;
                        exercise.progression_notes.push_str(&format!(" [{}]", SafetyRule::WeeklySetCap));
                    }
                }
                self.recompute_totals(workout)
            })
            .collect()
    }

    /// Rule 3: cap the load increase over the logged baseline
    ///
    /// A previous set count at or above `compound_set_threshold` stands in
    /// for a compound movement.
    fn cap_weight_increase(
        &self,
        workouts: Vec<RegeneratedPlanWorkout>,
        adjustments: &mut Vec<SafetyAdjustment>,
    ) -> Vec<RegeneratedPlanWorkout> {
        workouts
            .into_iter()
            .map(|mut workout| {
                for exercise in workout.exercises.iter_mut() {
                    let (Some(weight), Some(baseline)) = (exercise.target_weight, exercise.baseline_weight) else {
                        continue;
                    };

                    let cap_pct = if exercise.previous_sets >= self.config.compound_set_threshold {
                        self.config.compound_weight_cap_pct
                    } else {
                        self.config.isolation_weight_cap_pct
                    };
                    let limit = baseline * (Decimal::ONE + cap_pct / dec!(100));

                    if weight > limit {
                        // round down so the capped weight never exceeds the limit
                        let capped = (limit * dec!(2)).floor() / dec!(2);
                        adjustments.push(SafetyAdjustment {
                            rule: SafetyRule::WeightIncreaseCap,
                            workout_id: workout.workout_id.clone(),
                            exercise_id: exercise.exercise_id.clone(),
                            from: weight,
                            to: capped,
                        });
                        exercise.target_weight = Some(capped);
                        exercise.progression_notes.push_str(&format!(" [{}]", SafetyRule::WeightIncreaseCap));
                    }
                }
                workout
            })
            .collect()
    }

    /// Every workout fell below the deload volume ratio of its prior volume
    fn is_deload_week(&self, workouts: &[RegeneratedPlanWorkout]) -> bool {
        !workouts.is_empty()
            && workouts.iter().all(|w| {
                Decimal::from(w.target_volume) < Decimal::from(w.previous_volume) * self.config.deload_volume_ratio
            })
    }

    /// Rule 4: force every working weight down on a deload week
    fn enforce_deload(
        &self,
        workouts: Vec<RegeneratedPlanWorkout>,
        adjustments: &mut Vec<SafetyAdjustment>,
    ) -> Vec<RegeneratedPlanWorkout> {
        workouts
            .into_iter()
            .map(|mut workout| {
                for exercise in workout.exercises.iter_mut() {
                    if let Some(weight) = exercise.target_weight {
                        let reduced = round_to_half(weight * self.config.deload_weight_factor);
                        adjustments.push(SafetyAdjustment {
                            rule: SafetyRule::DeloadWeightReduction,
                            workout_id: workout.workout_id.clone(),
                            exercise_id: exercise.exercise_id.clone(),
                            from: weight,
                            to: reduced,
                        });
                        exercise.target_weight = Some(reduced);
                        exercise
                            .progression_notes
                            .push_str(&format!(" [{}]", SafetyRule::DeloadWeightReduction));
                    }
                }
                workout
            })
            .collect()
    }

    fn recompute_totals(&self, mut workout: RegeneratedPlanWorkout) -> RegeneratedPlanWorkout {
        workout.target_volume = workout.total_sets();
        workout.estimated_duration_minutes = scaled_duration(
            workout.previous_duration_minutes,
            workout.previous_volume,
            workout.target_volume,
            &self.regeneration,
        );
        workout
    }
}

impl Default for SafetyClamper {
    fn default() -> Self {
        Self::new()
    }
}
