use super::ExportError;
use crate::regenerate::RegeneratedPlanWorkout;
use csv::Writer;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 13] = [
    "workout_id",
    "workout_name",
    "day_of_week",
    "exercise_order",
    "exercise_id",
    "exercise_name",
    "previous_sets",
    "target_sets",
    "target_reps_min",
    "target_reps_max",
    "target_weight",
    "rest_seconds",
    "progression_notes",
];

/// Export regenerated workouts to CSV, one row per exercise
pub fn export_workouts<P: AsRef<Path>>(
    workouts: &[RegeneratedPlanWorkout],
    output_path: P,
) -> Result<(), ExportError> {
    let file = File::create(output_path)?;
    write_workouts(workouts, file)
}

/// Write regenerated workouts as CSV to any writer
pub fn write_workouts<W: Write>(workouts: &[RegeneratedPlanWorkout], output: W) -> Result<(), ExportError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(HEADER)?;

    for workout in workouts {
        for exercise in &workout.exercises {
            writer.write_record(&[
                workout.workout_id.clone(),
                workout.name.clone(),
                workout.day_of_week.to_string(),
                exercise.exercise_order.to_string(),
                exercise.exercise_id.clone(),
                exercise.name.clone(),
                exercise.previous_sets.to_string(),
                exercise.target_sets.to_string(),
                exercise.target_reps_min.to_string(),
                exercise.target_reps_max.to_string(),
                exercise.target_weight.map_or(String::new(), |w| w.to_string()),
                exercise.rest_seconds.to_string(),
                exercise.progression_notes.clone(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}
