//! Fitness evaluation for genetic flight-path planning.
//!
//! A [`PlanningProblem`] holds task areas (a polygon plus the objectives
//! scoped to it) and a start position. Candidate paths are supplied by an
//! [`Individual`] and scored task by task; the problem can be persisted in
//! a versioned binary record via [`codec`].

pub mod area;
pub mod codec;
pub mod config;
pub mod error;
pub mod geo;
pub mod individual;
pub mod models;
pub mod problem;
pub mod scenario;
pub mod tasks;

pub use area::{AreaEvent, TaskArea};
pub use codec::{decode_problem, encode_into, encode_problem};
pub use config::EvaluationConfig;
pub use error::{DecodeError, ScenarioError, TaskConfigError};
pub use geo::{haversine_distance, lla_to_enu, Enu, GeoPoint, GeoPolygon};
pub use individual::{FixedPath, Individual, WaypointPath};
pub use models::{Position, Trajectory};
pub use problem::{AreaId, FitnessReport, PlanningProblem, ProblemEvent, TaskScore};
pub use scenario::{Scenario, ScenarioArea, ScenarioTask};
pub use tasks::{EndingTask, FlyThroughTask, NoFlyTask, PathTask, TaskType, MAX_TASK_SCORE};
