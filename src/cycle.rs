//! Four-week periodized cycle generation
//!
//! Expands one base week into base, progressive, peak and deload weeks by
//! uniform multiplication of set volume and load.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::PerformanceMetrics;
use crate::regenerate::{round_to_half, round_whole, RegeneratedPlanWorkout};

/// Load multiplier for weeks that build on the base
const BUILD_WEIGHT_FACTOR: Decimal = dec!(1.02);

/// Load multiplier for weeks at or below base volume
const BACKOFF_WEIGHT_FACTOR: Decimal = dec!(0.95);

/// Phase of a week within the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Base,
    Progressive,
    Peak,
    Deload,
}

impl CyclePhase {
    /// Volume multiplier applied to the base week
    pub fn volume_multiplier(&self) -> Decimal {
        match self {
            CyclePhase::Base => dec!(1.00),
            CyclePhase::Progressive => dec!(1.05),
            CyclePhase::Peak => dec!(1.10),
            CyclePhase::Deload => dec!(0.70),
        }
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CyclePhase::Base => write!(f, "Base"),
            CyclePhase::Progressive => write!(f, "Progressive"),
            CyclePhase::Peak => write!(f, "Peak"),
            CyclePhase::Deload => write!(f, "Deload"),
        }
    }
}

/// One week of the generated cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleWeek {
    pub week_number: u32,
    pub phase: CyclePhase,
    pub volume_multiplier: Decimal,
    pub workouts: Vec<RegeneratedPlanWorkout>,
}

/// Generates the four-week cycle from a base week
pub struct CycleGenerator;

impl CycleGenerator {
    const PHASES: [CyclePhase; 4] = [
        CyclePhase::Base,
        CyclePhase::Progressive,
        CyclePhase::Peak,
        CyclePhase::Deload,
    ];

    /// Expand `base_week` into four weeks
    ///
    /// The metrics are accepted so the multipliers can later respond to
    /// readiness; today the multipliers are fixed.
    pub fn generate(base_week: &[RegeneratedPlanWorkout], _metrics: &PerformanceMetrics) -> Vec<CycleWeek> {
        Self::PHASES
            .iter()
            .zip(1u32..)
            .map(|(phase, week_number)| CycleWeek {
                week_number,
                phase: *phase,
                volume_multiplier: phase.volume_multiplier(),
                workouts: match phase {
                    CyclePhase::Base => base_week.to_vec(),
                    _ => base_week
                        .iter()
                        .map(|w| Self::scale_workout(w, phase.volume_multiplier()))
                        .collect(),
                },
            })
            .collect()
    }

    fn scale_workout(workout: &RegeneratedPlanWorkout, multiplier: Decimal) -> RegeneratedPlanWorkout {
        let weight_factor = if multiplier > Decimal::ONE {
            BUILD_WEIGHT_FACTOR
        } else {
            BACKOFF_WEIGHT_FACTOR
        };

        let mut scaled = workout.clone();
        scaled.target_volume = scale_count(workout.target_volume, multiplier);
        for exercise in scaled.exercises.iter_mut() {
            exercise.target_sets = scale_count(exercise.target_sets, multiplier);
            exercise.target_weight = exercise.target_weight.map(|w| round_to_half(w * weight_factor));
        }
        scaled
    }
}

/// Multiply a count and round to the nearest whole number, at least 1
fn scale_count(value: u32, multiplier: Decimal) -> u32 {
    round_whole(Decimal::from(value) * multiplier)
        .to_u32()
        .unwrap_or(1)
        .max(1)
}
