//! Timetable validation for university scheduling.
//!
//! Given a proposed set of scheduled sessions and a catalogue of
//! constraints, decides whether the timetable is legal, how badly it is
//! violated, and which sessions cannot coexist.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ScheduledSession`, `Venue`, `Lecturer`,
//!   `Course`, `StudentGroup`, `Constraint`, `ScheduleSnapshot`, and the
//!   violation/conflict records
//! - **`engine`**: `ConstraintEngine`, one evaluator per constraint kind
//! - **`conflict`**: `ConflictDetector` for venue, lecturer and student-group
//!   double-booking
//! - **`validation`**: `ValidationAggregator`, `ValidationResult`, and input
//!   integrity checks (duplicate IDs, dangling references)
//! - **`payload`**: Conversion from stored constraint records
//! - **`import`**: Import pipeline boundary and `validate_import`
//! - **`config`**: `EngineConfig`
//!
//! # Data Flow
//!
//! ```text
//! snapshot ──► ConstraintEngine ──┐
//!          └─► ConflictDetector ──┴─► ValidationAggregator ──► ValidationResult
//! ```
//!
//! Evaluation is pure: the same inputs always give the same output, in the
//! same order, whether or not the rayon pool is used.
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Müller (2009), "ITC2007 solver description: a hybrid approach"

pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod import;
pub mod models;
pub mod payload;
pub mod validation;

pub use config::EngineConfig;
pub use conflict::ConflictDetector;
pub use engine::ConstraintEngine;
pub use error::PayloadError;
pub use import::validate_import;
pub use validation::{ValidationAggregator, ValidationResult};
