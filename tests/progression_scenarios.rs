use chrono::{Duration, NaiveDate, Weekday};
use proptest::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::HashMap;

use liftrs::engine::{AdaptiveProgressionEngine, ProgressionInput};
use liftrs::metrics::PerformanceMetrics;
use liftrs::models::{
    ExerciseLogEntry, ExerciseModality, PlannedExercise, PlannedWorkout, WorkoutLogEntry, WorkoutPlan,
    WorkoutStatus,
};
use liftrs::progression::ExerciseProgressionCalculator;
use liftrs::recommendation::{ProgressionAction, RecommendationEngine};
use liftrs::regenerate::PlanRegenerator;
use liftrs::safety::SafetyRule;

// End-to-end tests of the progression pipeline on realistic training weeks

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap() + Duration::days(offset)
}

fn planned(id: &str, order: u32, sets: u32, reps: (u32, u32), rest: u32) -> PlannedExercise {
    PlannedExercise {
        exercise_id: id.to_string(),
        name: id.replace('_', " "),
        exercise_order: order,
        target_sets: sets,
        target_reps_min: reps.0,
        target_reps_max: reps.1,
        rest_seconds: rest,
    }
}

fn workout(id: &str, day_of_week: Weekday, exercises: Vec<PlannedExercise>) -> PlannedWorkout {
    let target_volume = exercises.iter().map(|e| e.target_sets).sum();
    PlannedWorkout {
        id: id.to_string(),
        name: id.to_string(),
        day_of_week,
        estimated_duration_minutes: 60,
        target_volume,
        exercises,
    }
}

fn push_pull_plan() -> WorkoutPlan {
    WorkoutPlan {
        id: "push-pull".to_string(),
        name: "Push/Pull".to_string(),
        duration_weeks: 12,
        workouts_per_week: 2,
        current_week: 5,
        workouts: vec![
            workout(
                "push",
                Weekday::Mon,
                vec![
                    planned("bench_press", 1, 4, (6, 8), 150),
                    planned("overhead_press", 2, 3, (8, 10), 120),
                ],
            ),
            workout(
                "pull",
                Weekday::Thu,
                vec![
                    planned("deadlift", 1, 4, (4, 6), 180),
                    planned("barbell_row", 2, 3, (8, 10), 120),
                ],
            ),
        ],
    }
}

fn exercise_logs(id: &str, sets: &[u32], weight: Decimal, rpe: Decimal) -> Vec<ExerciseLogEntry> {
    sets.iter()
        .enumerate()
        .map(|(i, &sets_completed)| ExerciseLogEntry {
            exercise_id: id.to_string(),
            date: day(i as i64),
            sets_completed,
            total_volume: weight * Decimal::from(sets_completed * 8),
            max_weight: Some(weight),
            average_rpe: Some(rpe),
            modality: ExerciseModality::Strength,
        })
        .collect()
}

fn session(offset: i64, status: WorkoutStatus, rpe: Option<Decimal>, actual_minutes: u32) -> WorkoutLogEntry {
    WorkoutLogEntry {
        id: format!("session-{}", offset),
        date: day(offset),
        status,
        planned_duration_minutes: Some(60),
        actual_duration_minutes: Some(actual_minutes),
        exercises_completed: 4,
        total_sets_completed: 14,
        total_volume: dec!(9000),
        average_rpe: rpe,
        perceived_difficulty: None,
        energy_level: None,
    }
}

/// Seven completed sessions at an average RPE of 6.5, easing off at the end
fn strong_week() -> Vec<WorkoutLogEntry> {
    [dec!(6.5), dec!(7), dec!(6), dec!(7), dec!(6), dec!(7), dec!(6)]
        .iter()
        .enumerate()
        .map(|(i, rpe)| WorkoutLogEntry {
            perceived_difficulty: Some(dec!(3)),
            energy_level: Some(dec!(9)),
            ..session(i as i64, WorkoutStatus::Completed, Some(*rpe), 60)
        })
        .collect()
}

/// Two completed sessions out of seven, rising RPE, blown-out durations
fn fatigued_week() -> Vec<WorkoutLogEntry> {
    let mut logs = vec![
        WorkoutLogEntry {
            perceived_difficulty: Some(dec!(9)),
            energy_level: Some(dec!(2)),
            ..session(0, WorkoutStatus::Completed, Some(dec!(9.0)), 95)
        },
        WorkoutLogEntry {
            perceived_difficulty: Some(dec!(9)),
            energy_level: Some(dec!(2)),
            ..session(4, WorkoutStatus::Completed, Some(dec!(9.4)), 100)
        },
    ];
    logs.extend([1, 2, 3, 5, 6].iter().map(|&d| session(d, WorkoutStatus::Skipped, None, 0)));
    logs
}

fn round_to_half(value: Decimal) -> Decimal {
    (value * dec!(2)).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero) / dec!(2)
}

#[test]
fn test_scenario_a_recommendation_from_metrics() {
    let metrics = PerformanceMetrics {
        completion_rate: dec!(100),
        volume_progression: dec!(3),
        average_rpe: Some(dec!(6.5)),
        consistency_score: dec!(100),
        readiness_score: dec!(80),
        recovery_score: dec!(70),
    };
    let recommendation = RecommendationEngine::recommend(&metrics);

    assert_eq!(recommendation.action, ProgressionAction::Increase);
    assert_eq!(recommendation.volume_adjustment, dec!(5));
    assert_eq!(recommendation.intensity_adjustment, dec!(2.5));
}

#[test]
fn test_scenario_a_end_to_end() {
    let logs = HashMap::from([
        ("bench_press".to_string(), exercise_logs("bench_press", &[4, 4, 4], dec!(185), dec!(6.5))),
        ("overhead_press".to_string(), exercise_logs("overhead_press", &[3, 3, 3], dec!(95), dec!(7))),
        ("deadlift".to_string(), exercise_logs("deadlift", &[4, 4, 4], dec!(315), dec!(6.5))),
        ("barbell_row".to_string(), exercise_logs("barbell_row", &[2, 3, 2], dec!(135), dec!(7))),
    ]);
    let input = ProgressionInput {
        plan: push_pull_plan(),
        exercise_logs: logs,
        current_window: strong_week(),
        previous_window: vec![session(-7, WorkoutStatus::Completed, Some(dec!(7)), 60)],
        planned_workouts: Some(7),
    };

    let outcome = AdaptiveProgressionEngine::new().regenerate(&input);

    assert_eq!(outcome.metrics.completion_rate, dec!(100));
    assert_eq!(outcome.metrics.consistency_score, dec!(100));
    assert_eq!(outcome.metrics.recovery_score, dec!(87.5));
    assert_eq!(outcome.recommendation.action, ProgressionAction::Increase);
    assert_eq!(outcome.recommendation.volume_adjustment, dec!(5));
    assert_eq!(outcome.recommendation.intensity_adjustment, dec!(2.5));

    // 14 planned sets: three exercises earn a set (17), the cap allows 15
    let total: u32 = outcome.workouts.iter().map(|w| w.total_sets()).sum();
    assert_eq!(total, 15);
    let sets: Vec<(u32, u32)> = outcome
        .workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .map(|e| (e.previous_sets, e.target_sets))
        .collect();
    assert_eq!(sets, vec![(4, 4), (3, 4), (4, 4), (3, 3)]);
    assert!(outcome
        .safety_adjustments
        .iter()
        .any(|a| a.rule == SafetyRule::GlobalVolumeCap));

    for exercise in outcome.workouts.iter().flat_map(|w| w.exercises.iter()) {
        assert!(exercise.target_reps_max >= exercise.target_reps_min);
        assert!(exercise.target_sets <= exercise.previous_sets + 2);
        assert!(exercise.rest_seconds > 0);
    }

    let bench = &outcome.workouts[0].exercises[0];
    assert_eq!(bench.target_reps_min, 7);
    assert_eq!(bench.target_reps_max, 9);
    // 185 * 1.025 = 189.625; within the 5% compound cap
    assert_eq!(bench.target_weight, Some(dec!(189.5)));
    assert_eq!(bench.rest_seconds, 165);

    assert!(!outcome.deload_week);
    let cycle = outcome.cycle.expect("cycle enabled by default");
    assert_eq!(cycle[0].workouts, outcome.workouts);
}

#[test]
fn test_scenario_b_deload_reduces_every_weight() {
    let logs: HashMap<String, Vec<ExerciseLogEntry>> = [
        ("bench_press", dec!(185)),
        ("overhead_press", dec!(95)),
        ("deadlift", dec!(315)),
        ("barbell_row", dec!(135)),
    ]
    .iter()
    .map(|(id, weight)| (id.to_string(), exercise_logs(id, &[2, 3], *weight, dec!(9.2))))
    .collect();
    let input = ProgressionInput {
        plan: push_pull_plan(),
        exercise_logs: logs,
        current_window: fatigued_week(),
        previous_window: strong_week(),
        planned_workouts: Some(7),
    };

    let engine = AdaptiveProgressionEngine::new();
    let outcome = engine.regenerate(&input);

    assert_eq!(outcome.recommendation.action, ProgressionAction::Deload);
    assert_eq!(outcome.recommendation.volume_adjustment, dec!(-30));
    assert_eq!(outcome.recommendation.intensity_adjustment, dec!(-15));
    assert!(outcome.metrics.recovery_score <= dec!(25));
    assert!(outcome.deload_week);

    let before_safety = PlanRegenerator::new().regenerate(&input.plan, &input.exercise_logs, &outcome.recommendation);
    let pre_deload: Vec<Decimal> = before_safety
        .workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .filter_map(|e| e.target_weight)
        .collect();
    let final_weights: Vec<Decimal> = outcome
        .workouts
        .iter()
        .flat_map(|w| w.exercises.iter())
        .filter_map(|e| e.target_weight)
        .collect();

    assert_eq!(pre_deload.len(), 4);
    for (before, after) in pre_deload.iter().zip(&final_weights) {
        assert_eq!(*after, round_to_half(*before * dec!(0.7)));
    }

    // 185 * 0.85 = 157.25 -> 157.5, then x0.7 = 110.25 -> 110.5
    assert_eq!(final_weights[0], dec!(110.5));
    assert_eq!(
        outcome
            .safety_adjustments
            .iter()
            .filter(|a| a.rule == SafetyRule::DeloadWeightReduction)
            .count(),
        4
    );

    // RPE above 9 on a non-increase week trims a rep
    let bench = &outcome.workouts[0].exercises[0];
    assert_eq!((bench.target_reps_min, bench.target_reps_max), (5, 7));
    assert_eq!(bench.target_sets, 2);
}

#[test]
fn test_scenario_c_extra_set_for_complete_sessions() {
    let global = RecommendationEngine::recommend(&PerformanceMetrics {
        completion_rate: dec!(100),
        volume_progression: dec!(0),
        average_rpe: Some(dec!(6.5)),
        consistency_score: dec!(100),
        readiness_score: dec!(80),
        recovery_score: dec!(70),
    });

    // 24 full sessions and one cut short: 98 of 100 planned sets
    let mut sets = vec![4; 24];
    sets.push(2);
    let logs = exercise_logs("squat", &sets, dec!(100), dec!(7.5));
    let planned = planned("squat", 1, 4, (8, 10), 150);

    let progression = ExerciseProgressionCalculator::calculate(&logs, &planned, &global);

    assert_eq!(progression.set_completion_rate, Some(dec!(98)));
    assert_eq!(progression.sets_adjustment, 1);
    assert_eq!(progression.target_sets, 5);
    assert_eq!(progression.weight_adjustment, global.intensity_adjustment);
}

#[test]
fn test_scenario_c_load_floor_when_no_set_added() {
    let global = RecommendationEngine::recommend(&PerformanceMetrics {
        completion_rate: dec!(80),
        volume_progression: dec!(0),
        average_rpe: Some(dec!(8)),
        consistency_score: dec!(70),
        readiness_score: dec!(70),
        recovery_score: dec!(60),
    });
    assert_eq!(global.action, ProgressionAction::Increase);
    assert_eq!(global.intensity_adjustment, dec!(1.25));

    let logs = exercise_logs("squat", &[3, 3, 3], dec!(100), dec!(7.5));
    let planned = planned("squat", 1, 4, (8, 10), 150);

    let progression = ExerciseProgressionCalculator::calculate(&logs, &planned, &global);

    assert_eq!(progression.sets_adjustment, 0);
    assert_eq!(progression.weight_adjustment, dec!(2.5));
    assert_eq!(progression.target_intensity, dec!(102.5));
}

#[test]
fn test_empty_exercise_history_keeps_prescription() {
    let input = ProgressionInput {
        plan: push_pull_plan(),
        exercise_logs: HashMap::new(),
        current_window: strong_week(),
        previous_window: Vec::new(),
        planned_workouts: Some(7),
    };

    let outcome = AdaptiveProgressionEngine::new().regenerate(&input);

    for progression in &outcome.progressions {
        assert_eq!(progression.sets_adjustment, 0);
        assert_eq!(progression.reps_adjustment, 0);
        assert_eq!(progression.weight_adjustment, Decimal::ZERO);
    }
    for (regenerated, original) in outcome.workouts.iter().zip(&input.plan.workouts) {
        assert_eq!(regenerated.target_volume, original.target_volume);
        assert!(regenerated.exercises.iter().all(|e| e.target_weight.is_none()));
    }
}

#[test]
fn test_untouched_exercises_meet_rep_and_rest_floors() {
    let plan = WorkoutPlan {
        id: "floors".to_string(),
        name: "Floors".to_string(),
        duration_weeks: 4,
        workouts_per_week: 1,
        current_week: 1,
        workouts: vec![workout(
            "mobility",
            Weekday::Sat,
            vec![planned("hip_airplane", 1, 2, (0, 0), 10), planned("band_pull_apart", 2, 2, (15, 20), 400)],
        )],
    };
    let input = ProgressionInput {
        plan,
        exercise_logs: HashMap::new(),
        current_window: strong_week(),
        previous_window: Vec::new(),
        planned_workouts: Some(7),
    };

    let outcome = AdaptiveProgressionEngine::new().regenerate(&input);
    let exercises = &outcome.workouts[0].exercises;

    assert_eq!((exercises[0].target_reps_min, exercises[0].target_reps_max), (1, 1));
    assert_eq!(exercises[0].rest_seconds, 30);
    assert_eq!(exercises[1].rest_seconds, 300);
    for exercise in exercises {
        assert!(exercise.target_sets >= 1);
    }
}

#[test]
fn test_batch_matches_sequential_runs() {
    let inputs: Vec<ProgressionInput> = (0..8)
        .map(|i| ProgressionInput {
            plan: WorkoutPlan {
                id: format!("user-{}", i),
                ..push_pull_plan()
            },
            exercise_logs: HashMap::from([(
                "bench_press".to_string(),
                exercise_logs("bench_press", &[4, 4], Decimal::from(100 + i * 10), dec!(7)),
            )]),
            current_window: if i % 2 == 0 { strong_week() } else { fatigued_week() },
            previous_window: Vec::new(),
            planned_workouts: Some(7),
        })
        .collect();

    let engine = AdaptiveProgressionEngine::new();
    let batch = engine.regenerate_batch(&inputs);
    let sequential: Vec<_> = inputs.iter().map(|input| engine.regenerate(input)).collect();

    assert_eq!(batch, sequential);
    assert_eq!(batch[5].plan_id, "user-5");
}

fn arb_plan() -> impl Strategy<Value = (Vec<u32>, Vec<bool>)> {
    (1usize..8).prop_flat_map(|n| {
        (
            prop::collection::vec(1u32..8, n),
            prop::collection::vec(any::<bool>(), n),
        )
    })
}

proptest! {
    #[test]
    fn test_pipeline_respects_safety_bounds((sets, logged) in arb_plan(), rpe in 5u32..10) {
        let exercises: Vec<PlannedExercise> = sets
            .iter()
            .enumerate()
            .map(|(i, &s)| planned(&format!("ex{}", i), i as u32 + 1, s, (8, 10), 90))
            .collect();
        let logs: HashMap<String, Vec<ExerciseLogEntry>> = exercises
            .iter()
            .zip(&logged)
            .filter(|(_, has_logs)| **has_logs)
            .map(|(e, _)| {
                let full = vec![e.target_sets; 3];
                (e.exercise_id.clone(), exercise_logs(&e.exercise_id, &full, dec!(100), Decimal::from(rpe)))
            })
            .collect();

        let plan = WorkoutPlan {
            workouts: vec![workout("random", Weekday::Sat, exercises)],
            ..push_pull_plan()
        };
        let previous_total = plan.total_sets();
        let input = ProgressionInput {
            plan,
            exercise_logs: logs,
            current_window: strong_week(),
            previous_window: Vec::new(),
            planned_workouts: Some(7),
        };

        let outcome = AdaptiveProgressionEngine::new().regenerate(&input);
        let total: u32 = outcome.workouts.iter().map(|w| w.total_sets()).sum();

        prop_assert!(Decimal::from(total) <= Decimal::from(previous_total) * dec!(1.10));
        for exercise in outcome.workouts.iter().flat_map(|w| w.exercises.iter()) {
            prop_assert!(exercise.target_sets >= 1);
            prop_assert!(exercise.target_sets <= exercise.previous_sets + 2);
            prop_assert!(exercise.target_reps_max >= exercise.target_reps_min);
        }
    }
}
