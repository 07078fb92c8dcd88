//! Per-exercise progression
//!
//! Translates the global recommendation into set, rep and load deltas for a
//! single exercise, using that exercise's recent log window to decide between
//! adding a set or adding load.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::metrics::mean;
use crate::models::{ExerciseLogEntry, PlannedExercise};
use crate::recommendation::{ProgressionAction, ProgressionRecommendation};

/// Set completion rate required before an extra set is prescribed
const SET_COMPLETION_FOR_EXTRA_SET: Decimal = dec!(95);

/// Minimum load increase when progressing without an extra set
const MIN_LOAD_INCREASE_PCT: Decimal = dec!(2.5);

/// Deload removes this share of the planned sets, at most two
const DELOAD_SET_SHARE: Decimal = dec!(-0.3);
const MAX_DELOAD_SET_REDUCTION: i32 = -2;

/// Progression computed for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgression {
    pub exercise_id: String,

    /// Mean volume per logged session
    pub current_volume: Decimal,

    /// Projected volume at the new targets
    pub target_volume: Decimal,

    /// Mean top weight across the window
    pub current_intensity: Decimal,

    /// Top weight after the load adjustment
    pub target_intensity: Decimal,

    pub sets_adjustment: i32,
    pub reps_adjustment: i32,

    /// Load adjustment in percent
    pub weight_adjustment: Decimal,

    pub target_sets: u32,
    pub target_reps_min: u32,
    pub target_reps_max: u32,

    /// Set completion rate over the window, absent without logs
    pub set_completion_rate: Option<Decimal>,

    /// Mean RPE over the window
    pub average_rpe: Option<Decimal>,

    /// Global recommendation annotated with exercise context
    pub recommendation: ProgressionRecommendation,
}

/// Calculates per-exercise deltas from logs and the global recommendation
pub struct ExerciseProgressionCalculator;

impl ExerciseProgressionCalculator {
    /// Compute the progression for `planned` given its log window
    ///
    /// An empty window yields zero deltas and the unchanged global
    /// recommendation: no data means no exercise-specific adjustment.
    pub fn calculate(
        logs: &[ExerciseLogEntry],
        planned: &PlannedExercise,
        global: &ProgressionRecommendation,
    ) -> ExerciseProgression {
        if logs.is_empty() {
            return Self::unchanged(planned, global);
        }

        let sessions = Decimal::from(logs.len());
        let avg_sets_per_session = Decimal::from(logs.iter().map(|l| l.sets_completed).sum::<u32>()) / sessions;
        let avg_volume_per_session = logs.iter().map(|l| l.total_volume).sum::<Decimal>() / sessions;
        let avg_weight = mean(logs.iter().filter_map(|l| l.max_weight)).unwrap_or(Decimal::ZERO);
        let avg_rpe = mean(logs.iter().filter_map(|l| l.average_rpe));

        let set_completion_rate = if planned.target_sets == 0 {
            Decimal::ZERO
        } else {
            avg_sets_per_session / Decimal::from(planned.target_sets) * dec!(100)
        };

        let mut weight_adjustment = global.intensity_adjustment;
        let sets_adjustment = match global.action {
            ProgressionAction::Increase => {
                if set_completion_rate >= SET_COMPLETION_FOR_EXTRA_SET {
                    1
                } else {
                    weight_adjustment = weight_adjustment.max(MIN_LOAD_INCREASE_PCT);
                    0
                }
            }
            ProgressionAction::Decrease => -1,
            ProgressionAction::Deload => {
                let reduction = (Decimal::from(planned.target_sets) * DELOAD_SET_SHARE)
                    .floor()
                    .to_i32()
                    .unwrap_or(MAX_DELOAD_SET_REDUCTION);
                reduction.max(MAX_DELOAD_SET_REDUCTION)
            }
            ProgressionAction::Maintain => 0,
        };

        let reps_adjustment = match avg_rpe {
            Some(rpe) if rpe < dec!(7) && global.action == ProgressionAction::Increase => 1,
            Some(rpe) if rpe > dec!(9) && global.action != ProgressionAction::Increase => -1,
            _ => 0,
        };

        let target_sets = offset(planned.target_sets, sets_adjustment).max(1);
        let target_reps_min = offset(planned.target_reps_min, reps_adjustment).max(1);
        let target_reps_max = offset(planned.target_reps_max, reps_adjustment).max(target_reps_min);

        let target_intensity = avg_weight * (Decimal::ONE + weight_adjustment / dec!(100));
        let avg_reps = Decimal::from(target_reps_min + target_reps_max) / dec!(2);
        let target_volume = Decimal::from(target_sets) * avg_reps * target_intensity;

        let rpe_note = avg_rpe
            .map(|rpe| rpe.round_dp(1).to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let rationale = format!(
            "{} (set completion {}%, avg RPE {})",
            global.rationale,
            set_completion_rate.round_dp(0),
            rpe_note
        );

        tracing::debug!(
            exercise = %planned.exercise_id,
            sets = sets_adjustment,
            reps = reps_adjustment,
            weight = %weight_adjustment,
            "Exercise progression calculated"
        );

        ExerciseProgression {
            exercise_id: planned.exercise_id.clone(),
            current_volume: avg_volume_per_session,
            target_volume,
            current_intensity: avg_weight,
            target_intensity,
            sets_adjustment,
            reps_adjustment,
            weight_adjustment,
            target_sets,
            target_reps_min,
            target_reps_max,
            set_completion_rate: Some(set_completion_rate),
            average_rpe: avg_rpe,
            recommendation: global.with_rationale(rationale),
        }
    }

    fn unchanged(planned: &PlannedExercise, global: &ProgressionRecommendation) -> ExerciseProgression {
        let target_reps_min = planned.target_reps_min.max(1);
        // an inverted range is passed through for the validator to flag
        let target_reps_max = if planned.target_reps_max >= planned.target_reps_min {
            planned.target_reps_max.max(target_reps_min)
        } else {
            planned.target_reps_max
        };

        ExerciseProgression {
            exercise_id: planned.exercise_id.clone(),
            current_volume: Decimal::ZERO,
            target_volume: Decimal::ZERO,
            current_intensity: Decimal::ZERO,
            target_intensity: Decimal::ZERO,
            sets_adjustment: 0,
            reps_adjustment: 0,
            weight_adjustment: Decimal::ZERO,
            target_sets: planned.target_sets.max(1),
            target_reps_min,
            target_reps_max,
            set_completion_rate: None,
            average_rpe: None,
            recommendation: global.clone(),
        }
    }
}

/// Apply a signed delta to a count, saturating at zero
fn offset(value: u32, delta: i32) -> u32 {
    if delta >= 0 {
        value.saturating_add(delta as u32)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}
