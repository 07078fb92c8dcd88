//! Performance metrics derived from logged training history
//!
//! Leaf calculators turn raw log collections into 0-100 scores, and
//! [`PerformanceAnalyzer`] combines them for a current window compared
//! against the previous one.
//!
//! Every calculator degrades gracefully: empty inputs yield documented
//! neutral values (0 or 50) and zero denominators return 0 instead of
//! propagating a division error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::WorkoutLogEntry;

/// Weights of the composite performance score
const COMPLETION_WEIGHT: Decimal = dec!(0.30);
const CONSISTENCY_WEIGHT: Decimal = dec!(0.20);
const READINESS_WEIGHT: Decimal = dec!(0.25);
const RECOVERY_WEIGHT: Decimal = dec!(0.25);

const NEUTRAL_SCORE: Decimal = dec!(50);

/// Settings for the analysis window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Length of each comparison window in days
    pub window_days: u32,

    /// Ideal number of days between two workouts
    pub ideal_days_per_workout: u32,

    /// Allowed deviation of actual from planned duration, in percent
    pub duration_tolerance_pct: Decimal,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            window_days: 7,
            ideal_days_per_workout: 2,
            duration_tolerance_pct: dec!(15),
        }
    }
}

/// Readiness/performance assessment for one analysis window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Completed sessions as a percentage of logged sessions (0-100)
    pub completion_rate: Decimal,

    /// Change in volume against the previous window, in percent (signed)
    pub volume_progression: Decimal,

    /// Mean RPE over the window (1-10), absent when nothing was rated
    pub average_rpe: Option<Decimal>,

    /// Training frequency and distribution (0-100)
    pub consistency_score: Decimal,

    /// Subjective readiness from RPE, difficulty and energy (0-100)
    pub readiness_score: Decimal,

    /// RPE trend and duration compliance (0-100)
    pub recovery_score: Decimal,
}

impl PerformanceMetrics {
    /// Weighted composite used by the recommendation ladder
    ///
    /// Volume progression is informational only and carries no weight.
    pub fn performance_score(&self) -> Decimal {
        self.completion_rate * COMPLETION_WEIGHT
            + self.consistency_score * CONSISTENCY_WEIGHT
            + self.readiness_score * READINESS_WEIGHT
            + self.recovery_score * RECOVERY_WEIGHT
    }
}

fn clamp_score(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO).min(dec!(100))
}

/// Mean of the present values, `None` when there are none
pub(crate) fn mean<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    let (sum, count) = values
        .into_iter()
        .fold((Decimal::ZERO, 0u32), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        None
    } else {
        Some(sum / Decimal::from(count))
    }
}

/// Percentage of logged sessions that were completed; 0 for no logs
pub fn completion_rate(logs: &[WorkoutLogEntry]) -> Decimal {
    if logs.is_empty() {
        return Decimal::ZERO;
    }

    let completed = logs.iter().filter(|l| l.status.is_completed()).count();
    Decimal::from(completed) / Decimal::from(logs.len()) * dec!(100)
}

/// Signed percentage change from `previous_total` to `current_total`
///
/// Returns 0 when the previous window carried no volume, which flattens a
/// genuine jump from nothing to something.
pub fn volume_progression(current_total: Decimal, previous_total: Decimal) -> Decimal {
    if previous_total.is_zero() {
        return Decimal::ZERO;
    }

    (current_total - previous_total) / previous_total * dec!(100)
}

/// Mean of the rated sessions' RPE
pub fn average_rpe(logs: &[WorkoutLogEntry]) -> Option<Decimal> {
    mean(logs.iter().filter_map(|l| l.average_rpe))
}

/// Average of a frequency score and a distribution score
///
/// * frequency: completed / planned (0 when nothing was planned)
/// * distribution: completed / floor(days / ideal spacing), capped at 100
pub fn consistency_score(
    completed: u32,
    planned: u32,
    days_covered: u32,
    ideal_days_per_workout: u32,
) -> Decimal {
    let frequency = if planned == 0 {
        Decimal::ZERO
    } else {
        clamp_score(Decimal::from(completed) / Decimal::from(planned) * dec!(100))
    };

    let ideal_workouts = if ideal_days_per_workout == 0 {
        0
    } else {
        days_covered / ideal_days_per_workout
    };

    let distribution = if ideal_workouts == 0 {
        Decimal::ZERO
    } else {
        (Decimal::from(completed) / Decimal::from(ideal_workouts) * dec!(100)).min(dec!(100))
    };

    (frequency + distribution) / dec!(2)
}

/// Readiness from whichever of RPE, difficulty and energy are present
///
/// Low exertion and difficulty raise readiness, high energy raises it.
/// Returns the neutral 50 when nothing was reported.
pub fn readiness_score(
    avg_rpe: Option<Decimal>,
    avg_difficulty: Option<Decimal>,
    avg_energy: Option<Decimal>,
) -> Decimal {
    let scores = [
        avg_rpe.map(|rpe| (dec!(10) - rpe) * dec!(10)),
        avg_difficulty.map(|difficulty| (dec!(10) - difficulty) * dec!(10)),
        avg_energy.map(|energy| energy * dec!(10)),
    ];

    mean(scores.into_iter().flatten().map(clamp_score)).unwrap_or(NEUTRAL_SCORE)
}

/// Percentage of sessions whose actual duration stayed within `tolerance_pct`
/// of the planned duration
///
/// Sessions missing either duration (or planned at zero minutes) are not
/// counted. Returns 50 when no session can be assessed.
pub fn duration_compliance_rate(logs: &[WorkoutLogEntry], tolerance_pct: Decimal) -> Decimal {
    let assessed: Vec<(u32, u32)> = logs
        .iter()
        .filter_map(|l| match (l.planned_duration_minutes, l.actual_duration_minutes) {
            (Some(planned), Some(actual)) if planned > 0 => Some((planned, actual)),
            _ => None,
        })
        .collect();

    if assessed.is_empty() {
        return NEUTRAL_SCORE;
    }

    let tolerance = tolerance_pct / dec!(100);
    let compliant = assessed
        .iter()
        .filter(|(planned, actual)| {
            let planned = Decimal::from(*planned);
            let deviation = (Decimal::from(*actual) - planned).abs() / planned;
            deviation <= tolerance
        })
        .count();

    Decimal::from(compliant) / Decimal::from(assessed.len()) * dec!(100)
}

/// Average of an RPE-trend score and the duration compliance rate
///
/// The trend compares the two most recent rated sessions: falling RPE scores
/// 75, flat 50, rising 25. Fewer than two rated sessions score 50.
pub fn recovery_score(logs: &[WorkoutLogEntry], duration_compliance_rate: Decimal) -> Decimal {
    let mut rated: Vec<(chrono::NaiveDate, Decimal)> = logs
        .iter()
        .filter_map(|l| l.average_rpe.map(|rpe| (l.date, rpe)))
        .collect();
    rated.sort_by(|a, b| b.0.cmp(&a.0));

    let trend = match rated.as_slice() {
        [(_, latest), (_, prior), ..] => {
            if latest < prior {
                dec!(75)
            } else if latest == prior {
                dec!(50)
            } else {
                dec!(25)
            }
        }
        _ => NEUTRAL_SCORE,
    };

    clamp_score((trend + clamp_score(duration_compliance_rate)) / dec!(2))
}

/// Aggregates the leaf calculators over a current and previous window
pub struct PerformanceAnalyzer {
    config: AnalysisConfig,
}

impl PerformanceAnalyzer {
    /// Create analyzer with the default 7-day window
    pub fn new() -> Self {
        PerformanceAnalyzer {
            config: AnalysisConfig::default(),
        }
    }

    /// Create analyzer with custom configuration
    pub fn with_config(config: AnalysisConfig) -> Self {
        PerformanceAnalyzer { config }
    }

    /// Compute the metrics for `current` compared against `previous`
    pub fn analyze(
        &self,
        current: &[WorkoutLogEntry],
        previous: &[WorkoutLogEntry],
        planned_workouts: u32,
    ) -> PerformanceMetrics {
        let completed = current.iter().filter(|l| l.status.is_completed()).count() as u32;

        let current_volume: Decimal = current.iter().map(|l| l.total_volume).sum();
        let previous_volume: Decimal = previous.iter().map(|l| l.total_volume).sum();

        let avg_rpe = average_rpe(current);
        let avg_difficulty = mean(current.iter().filter_map(|l| l.perceived_difficulty));
        let avg_energy = mean(current.iter().filter_map(|l| l.energy_level));

        let compliance = duration_compliance_rate(current, self.config.duration_tolerance_pct);

        let metrics = PerformanceMetrics {
            completion_rate: completion_rate(current),
            volume_progression: volume_progression(current_volume, previous_volume),
            average_rpe: avg_rpe,
            consistency_score: consistency_score(
                completed,
                planned_workouts,
                self.config.window_days,
                self.config.ideal_days_per_workout,
            ),
            readiness_score: readiness_score(avg_rpe, avg_difficulty, avg_energy),
            recovery_score: recovery_score(current, compliance),
        };

        tracing::debug!(
            completion = %metrics.completion_rate,
            consistency = %metrics.consistency_score,
            readiness = %metrics.readiness_score,
            recovery = %metrics.recovery_score,
            "Performance metrics computed"
        );

        metrics
    }
}

impl Default for PerformanceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
