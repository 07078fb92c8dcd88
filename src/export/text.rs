use super::ExportError;
use crate::engine::ProgressionOutcome;
use std::fmt::{self, Write as _};
use std::io::Write;
use std::path::Path;

/// Export a regeneration outcome to human-readable text format
pub fn export_outcome<P: AsRef<Path>>(
    outcome: &ProgressionOutcome,
    output_path: P,
) -> Result<(), ExportError> {
    let mut file = std::fs::File::create(output_path)?;
    file.write_all(render_outcome(outcome).as_bytes())?;
    Ok(())
}

/// Human-readable summary of a regeneration outcome
pub fn render_outcome(outcome: &ProgressionOutcome) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_outcome(&mut out, outcome);
    out
}

fn write_outcome(out: &mut String, outcome: &ProgressionOutcome) -> fmt::Result {
    writeln!(out, "PLAN REGENERATION: {}", outcome.plan_id)?;
    writeln!(out)?;

    let m = &outcome.metrics;
    writeln!(out, "PERFORMANCE")?;
    writeln!(out, "Completion Rate: {:.1}%", m.completion_rate)?;
    writeln!(out, "Volume Progression: {:+.1}%", m.volume_progression)?;
    match m.average_rpe {
        Some(rpe) => writeln!(out, "Average RPE: {:.1}", rpe)?,
        None => writeln!(out, "Average RPE: n/a")?,
    }
    writeln!(out, "Consistency: {:.1}", m.consistency_score)?;
    writeln!(out, "Readiness: {:.1}", m.readiness_score)?;
    writeln!(out, "Recovery: {:.1}", m.recovery_score)?;
    writeln!(out, "Performance Score: {:.1}", m.performance_score())?;
    writeln!(out)?;

    let r = &outcome.recommendation;
    writeln!(out, "RECOMMENDATION")?;
    writeln!(
        out,
        "{} (volume {:+}%, intensity {:+}%, confidence {:.0})",
        r.action.to_string().to_uppercase(),
        r.volume_adjustment,
        r.intensity_adjustment,
        r.confidence
    )?;
    writeln!(out, "{}", r.rationale)?;
    writeln!(out)?;

    writeln!(out, "WORKOUTS")?;
    for workout in &outcome.workouts {
        writeln!(
            out,
            "{} ({}): {} sets, ~{} min (was {} sets, {} min)",
            workout.name,
            workout.day_of_week,
            workout.target_volume,
            workout.estimated_duration_minutes,
            workout.previous_volume,
            workout.previous_duration_minutes
        )?;
        for exercise in &workout.exercises {
            let weight = exercise
                .target_weight
                .map_or_else(|| "bodyweight".to_string(), |w| format!("{} lbs", w));
            writeln!(
                out,
                "  {}. {}: {} x {}-{} @ {}, rest {}s",
                exercise.exercise_order,
                exercise.name,
                exercise.target_sets,
                exercise.target_reps_min,
                exercise.target_reps_max,
                weight,
                exercise.rest_seconds
            )?;
        }
    }

    if !outcome.safety_adjustments.is_empty() {
        writeln!(out)?;
        writeln!(out, "SAFETY ADJUSTMENTS")?;
        for adj in &outcome.safety_adjustments {
            writeln!(
                out,
                "- {} on {}/{}: {} -> {}",
                adj.rule, adj.workout_id, adj.exercise_id, adj.from, adj.to
            )?;
        }
    }
    if outcome.deload_week {
        writeln!(out, "Deload week detected: loads reduced.")?;
    }

    if !outcome.validation.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "WARNINGS")?;
        for warning in &outcome.validation.warnings {
            writeln!(out, "- {}", warning)?;
        }
    }

    if let Some(cycle) = &outcome.cycle {
        writeln!(out)?;
        writeln!(out, "FOUR-WEEK CYCLE")?;
        for week in cycle {
            let sets: u32 = week.workouts.iter().map(|w| w.target_volume).sum();
            writeln!(
                out,
                "Week {} ({}, x{}): {} sets",
                week.week_number, week.phase, week.volume_multiplier, sets
            )?;
        }
    }

    Ok(())
}
