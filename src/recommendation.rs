//! Global progression recommendation
//!
//! Maps one [`PerformanceMetrics`] record onto one of four actions using a
//! top-down decision ladder over the weighted performance score, the average
//! RPE and the recovery score.
//!
//! | Rung | Condition | Action | Volume | Intensity | Confidence cap |
//! |------|-----------|--------|--------|-----------|----------------|
//! | 1 | score >= 80, RPE < 7.5, recovery >= 60 | increase | +5 | +2.5 | 90 |
//! | 2 | score >= 70, RPE < 8.5, recovery >= 50 | increase | +2.5 | +1.25 | 80 |
//! | 3 | 60 <= score < 70 | maintain | 0 | 0 | 75 |
//! | 4 | score >= 50, recovery >= 40 | maintain | -2.5 | 0 | 70 |
//! | 5 | 40 <= score < 50 | decrease | -10 | -5 | 65 |
//! | 6 | otherwise | deload | -30 | -15 | 60 |
//!
//! An increase is never issued when the average RPE is 9 or higher.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metrics::PerformanceMetrics;

/// Average RPE at or above which escalation is refused
const NEAR_MAXIMAL_RPE: Decimal = dec!(9);

/// Direction of the next training block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionAction {
    Increase,
    Maintain,
    Decrease,
    Deload,
}

impl fmt::Display for ProgressionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressionAction::Increase => write!(f, "increase"),
            ProgressionAction::Maintain => write!(f, "maintain"),
            ProgressionAction::Decrease => write!(f, "decrease"),
            ProgressionAction::Deload => write!(f, "deload"),
        }
    }
}

impl std::str::FromStr for ProgressionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "increase" => Ok(ProgressionAction::Increase),
            "maintain" => Ok(ProgressionAction::Maintain),
            "decrease" => Ok(ProgressionAction::Decrease),
            "deload" => Ok(ProgressionAction::Deload),
            _ => Err(format!("Unknown progression action: {}", s)),
        }
    }
}

/// Recommended adjustment for the whole plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecommendation {
    pub action: ProgressionAction,

    /// Volume adjustment in percent
    pub volume_adjustment: Decimal,

    /// Intensity (load) adjustment in percent
    pub intensity_adjustment: Decimal,

    /// Human-readable explanation
    pub rationale: String,

    /// Confidence in the recommendation (0-100)
    pub confidence: Decimal,
}

impl ProgressionRecommendation {
    fn new(
        action: ProgressionAction,
        volume_adjustment: Decimal,
        intensity_adjustment: Decimal,
        rationale: impl Into<String>,
        confidence: Decimal,
    ) -> Self {
        ProgressionRecommendation {
            action,
            volume_adjustment,
            intensity_adjustment,
            rationale: rationale.into(),
            confidence,
        }
    }

    /// Copy of this recommendation with a different rationale
    pub fn with_rationale(&self, rationale: impl Into<String>) -> Self {
        ProgressionRecommendation {
            rationale: rationale.into(),
            ..self.clone()
        }
    }
}

/// Maps performance metrics onto a progression recommendation
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Recommend the next progression step
    ///
    /// Pure: identical metrics always produce an identical recommendation.
    pub fn recommend(metrics: &PerformanceMetrics) -> ProgressionRecommendation {
        let recommendation = Self::apply_rpe_override(Self::climb_ladder(metrics), metrics.average_rpe);

        tracing::debug!(
            action = %recommendation.action,
            volume = %recommendation.volume_adjustment,
            intensity = %recommendation.intensity_adjustment,
            confidence = %recommendation.confidence,
            "Progression recommendation selected"
        );

        recommendation
    }

    fn climb_ladder(metrics: &PerformanceMetrics) -> ProgressionRecommendation {
        let score = metrics.performance_score();
        let recovery = metrics.recovery_score;
        // A missing RPE places no constraint on escalation
        let rpe_below = |limit: Decimal| metrics.average_rpe.map_or(true, |rpe| rpe < limit);

        if score >= dec!(80) && rpe_below(dec!(7.5)) && recovery >= dec!(60) {
            ProgressionRecommendation::new(
                ProgressionAction::Increase,
                dec!(5),
                dec!(2.5),
                "Excellent performance and recovery. Ready for progressive overload.",
                score.min(dec!(90)),
            )
        } else if score >= dec!(70) && rpe_below(dec!(8.5)) && recovery >= dec!(50) {
            ProgressionRecommendation::new(
                ProgressionAction::Increase,
                dec!(2.5),
                dec!(1.25),
                "Good performance with manageable effort. Small progression recommended.",
                score.min(dec!(80)),
            )
        } else if score >= dec!(60) && score < dec!(70) {
            ProgressionRecommendation::new(
                ProgressionAction::Maintain,
                Decimal::ZERO,
                Decimal::ZERO,
                "Solid performance. Maintain the current load to consolidate adaptations.",
                score.min(dec!(75)),
            )
        } else if score >= dec!(50) && recovery >= dec!(40) {
            ProgressionRecommendation::new(
                ProgressionAction::Maintain,
                dec!(-2.5),
                Decimal::ZERO,
                "Moderate performance. Slight volume reduction to support recovery.",
                score.min(dec!(70)),
            )
        } else if score >= dec!(40) && score < dec!(50) {
            ProgressionRecommendation::new(
                ProgressionAction::Decrease,
                dec!(-10),
                dec!(-5),
                "Performance is declining. Reduce volume and intensity.",
                score.min(dec!(65)),
            )
        } else {
            ProgressionRecommendation::new(
                ProgressionAction::Deload,
                dec!(-30),
                dec!(-15),
                "Signs of accumulated fatigue. A deload week is needed.",
                score.min(dec!(60)),
            )
        }
    }

    fn apply_rpe_override(
        recommendation: ProgressionRecommendation,
        average_rpe: Option<Decimal>,
    ) -> ProgressionRecommendation {
        match average_rpe {
            Some(rpe) if recommendation.action == ProgressionAction::Increase && rpe >= NEAR_MAXIMAL_RPE => {
                ProgressionRecommendation::new(
                    ProgressionAction::Maintain,
                    Decimal::ZERO,
                    Decimal::ZERO,
                    "Effort is near maximal. Hold the current load before progressing.",
                    dec!(75),
                )
            }
            _ => recommendation,
        }
    }
}
