//! Path tasks: the individual objectives a candidate path is scored on.
//!
//! Every task scores a trajectory into `[0, MAX_TASK_SCORE]`. A task that
//! reaches the maximum is considered accomplished, which the planning
//! problem uses to decide whether shorter paths earn a bonus.

use crate::error::TaskConfigError;
use crate::geo::{enu_distance, GeoPoint, GeoPolygon};
use crate::models::Position;
use serde::{Deserialize, Serialize};

/// Upper bound of any single task score.
pub const MAX_TASK_SCORE: f64 = 500.0;
/// Altitude both ends of a distance measurement are held at, in meters.
pub const REFERENCE_ALTITUDE_M: f64 = 1409.0;
/// Flat award for reaching a fly-through point.
pub const FLY_THROUGH_BONUS: f64 = 500.0;
/// Weight applied to the Gaussian partial-credit term.
pub const GAUSSIAN_WEIGHT: f64 = 10.0;
/// Samples that must fall within the threshold before the bonus is granted.
pub const FLY_THROUGH_GOAL_COUNT: u64 = 1;
/// Score lost for each sample inside a no-fly area unless configured otherwise.
pub const DEFAULT_NO_FLY_PENALTY: f64 = 100.0;

pub const FLY_THROUGH_TAG: &str = "FlyThrough";
pub const NO_FLY_TAG: &str = "NoFly";
pub const ENDING_TAG: &str = "Ending";

/// Zero-mean Gaussian density at `x` with standard deviation `sigma`.
pub fn normal(x: f64, sigma: f64) -> f64 {
    let coeff = 1.0 / (sigma * (2.0 * std::f64::consts::PI).sqrt());
    coeff * (-(x * x) / (2.0 * sigma * sigma)).exp()
}

fn check_std_dev(std_dev: f64) -> Result<f64, TaskConfigError> {
    if std_dev.is_finite() && std_dev > 0.0 {
        Ok(std_dev)
    } else {
        Err(TaskConfigError::InvalidStdDev(std_dev))
    }
}

// ========== FLY-THROUGH ==========

/// Pass within `std_dev` meters of a target point.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyThroughTask {
    target: GeoPoint,
    std_dev: f64,
    shortness_reward: bool,
}

impl FlyThroughTask {
    pub fn new(target: GeoPoint, std_dev: f64) -> Result<Self, TaskConfigError> {
        if !target.is_finite() {
            return Err(TaskConfigError::NonFiniteTarget);
        }
        Ok(Self {
            target,
            std_dev: check_std_dev(std_dev)?,
            shortness_reward: false,
        })
    }

    pub fn with_shortness_reward(mut self, applies: bool) -> Self {
        self.shortness_reward = applies;
        self
    }

    pub fn target(&self) -> GeoPoint {
        self.target
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Score samples in travel order. The first sample inside the threshold
    /// completes the task; until then each sample earns Gaussian credit.
    /// Samples with non-finite coordinates earn nothing.
    pub fn performance(&self, positions: &[Position]) -> f64 {
        let mut score = 0.0;
        let mut within_count: u64 = 0;

        for pos in positions {
            let dist = enu_distance(pos.lonlat(), self.target, REFERENCE_ALTITUDE_M);
            if !dist.is_finite() {
                continue;
            }

            if dist < self.std_dev {
                within_count += 1;
                if within_count >= FLY_THROUGH_GOAL_COUNT {
                    score += FLY_THROUGH_BONUS;
                    break;
                }
            }
            score += GAUSSIAN_WEIGHT * normal(dist, self.std_dev);
        }

        score.min(MAX_TASK_SCORE)
    }
}

// ========== NO-FLY ==========

/// Stay out of the area polygon. Each sample inside costs a penalty.
#[derive(Debug, Clone, PartialEq)]
pub struct NoFlyTask {
    penalty_per_sample: f64,
    shortness_reward: bool,
}

impl Default for NoFlyTask {
    fn default() -> Self {
        Self {
            penalty_per_sample: DEFAULT_NO_FLY_PENALTY,
            shortness_reward: false,
        }
    }
}

impl NoFlyTask {
    pub fn new(penalty_per_sample: f64) -> Result<Self, TaskConfigError> {
        if !(penalty_per_sample.is_finite() && penalty_per_sample > 0.0) {
            return Err(TaskConfigError::InvalidPenalty(penalty_per_sample));
        }
        Ok(Self {
            penalty_per_sample,
            shortness_reward: false,
        })
    }

    pub fn with_shortness_reward(mut self, applies: bool) -> Self {
        self.shortness_reward = applies;
        self
    }

    pub fn penalty_per_sample(&self) -> f64 {
        self.penalty_per_sample
    }

    pub fn performance(&self, positions: &[Position], forbidden: &GeoPolygon) -> f64 {
        let mut score = MAX_TASK_SCORE;

        for pos in positions {
            if forbidden.contains(pos.lonlat()) {
                score -= self.penalty_per_sample;
                if score <= 0.0 {
                    return 0.0;
                }
            }
        }

        score.clamp(0.0, MAX_TASK_SCORE)
    }
}

// ========== ENDING ==========

/// Finish the path inside the area polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct EndingTask {
    std_dev: f64,
    shortness_reward: bool,
}

impl EndingTask {
    pub fn new(std_dev: f64) -> Result<Self, TaskConfigError> {
        Ok(Self {
            std_dev: check_std_dev(std_dev)?,
            shortness_reward: true,
        })
    }

    pub fn with_shortness_reward(mut self, applies: bool) -> Self {
        self.shortness_reward = applies;
        self
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Only the final sample counts. Ending outside the area earns Gaussian
    /// credit by distance to the centre of the area's bounding box.
    pub fn performance(&self, positions: &[Position], goal: &GeoPolygon) -> f64 {
        let Some(last) = positions.last() else {
            return 0.0;
        };
        let Some(center) = goal.bounding_center() else {
            return 0.0;
        };

        if goal.contains(last.lonlat()) {
            return MAX_TASK_SCORE;
        }

        let dist = enu_distance(last.lonlat(), center, REFERENCE_ALTITUDE_M);
        if !dist.is_finite() {
            return 0.0;
        }
        (GAUSSIAN_WEIGHT * normal(dist, self.std_dev)).clamp(0.0, MAX_TASK_SCORE)
    }
}

// ========== DISPATCH ==========

/// One scoring objective attached to a task area.
#[derive(Debug, Clone, PartialEq)]
pub enum PathTask {
    FlyThrough(FlyThroughTask),
    NoFly(NoFlyTask),
    Ending(EndingTask),
}

/// Variant discriminant, also the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    FlyThrough,
    NoFly,
    Ending,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::FlyThrough => FLY_THROUGH_TAG,
            TaskType::NoFly => NO_FLY_TAG,
            TaskType::Ending => ENDING_TAG,
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            FLY_THROUGH_TAG => Some(TaskType::FlyThrough),
            NO_FLY_TAG => Some(TaskType::NoFly),
            ENDING_TAG => Some(TaskType::Ending),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PathTask {
    pub fn task_type(&self) -> TaskType {
        match self {
            PathTask::FlyThrough(_) => TaskType::FlyThrough,
            PathTask::NoFly(_) => TaskType::NoFly,
            PathTask::Ending(_) => TaskType::Ending,
        }
    }

    /// Whether accomplishing this task should also reward shorter paths.
    pub fn shortness_reward_applies(&self) -> bool {
        match self {
            PathTask::FlyThrough(t) => t.shortness_reward,
            PathTask::NoFly(t) => t.shortness_reward,
            PathTask::Ending(t) => t.shortness_reward,
        }
    }

    pub fn set_shortness_reward(&mut self, applies: bool) {
        match self {
            PathTask::FlyThrough(t) => t.shortness_reward = applies,
            PathTask::NoFly(t) => t.shortness_reward = applies,
            PathTask::Ending(t) => t.shortness_reward = applies,
        }
    }

    /// Score `positions` against this task.
    ///
    /// `geo_poly` is the polygon of the enclosing task area at the time of
    /// evaluation; tasks that don't depend on area geometry ignore it.
    pub fn performance(&self, positions: &[Position], geo_poly: &GeoPolygon) -> f64 {
        match self {
            PathTask::FlyThrough(t) => t.performance(positions),
            PathTask::NoFly(t) => t.performance(positions, geo_poly),
            PathTask::Ending(t) => t.performance(positions, geo_poly),
        }
    }
}

impl From<FlyThroughTask> for PathTask {
    fn from(task: FlyThroughTask) -> Self {
        PathTask::FlyThrough(task)
    }
}

impl From<NoFlyTask> for PathTask {
    fn from(task: NoFlyTask) -> Self {
        PathTask::NoFly(task)
    }
}

impl From<EndingTask> for PathTask {
    fn from(task: EndingTask) -> Self {
        PathTask::Ending(task)
    }
}
