// Library interface for LiftRS modules
// This allows integration tests and benches to access the core functionality

pub mod config;
pub mod cycle;
pub mod engine;
pub mod error;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod progression;
pub mod recommendation;
pub mod regenerate;
pub mod safety;
pub mod validation;

// Re-export commonly used types for convenience
pub use models::*;
pub use config::EngineConfig;
pub use cycle::{CycleGenerator, CyclePhase, CycleWeek};
pub use engine::{AdaptiveProgressionEngine, ProgressionInput, ProgressionOutcome};
pub use error::{LiftRsError, Result};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use metrics::{PerformanceAnalyzer, PerformanceMetrics};
pub use progression::{ExerciseProgression, ExerciseProgressionCalculator};
pub use recommendation::{ProgressionAction, ProgressionRecommendation, RecommendationEngine};
pub use regenerate::{PlanRegenerator, RegeneratedPlanExercise, RegeneratedPlanWorkout};
pub use safety::{SafetyAdjustment, SafetyClamper, SafetyRule};
pub use validation::{PlanValidator, PlanWarning, ValidationReport};
