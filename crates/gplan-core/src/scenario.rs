//! Human-editable JSON scenarios that build planning problems.

use crate::area::TaskArea;
use crate::error::{ScenarioError, TaskConfigError};
use crate::geo::{GeoPoint, GeoPolygon};
use crate::models::Position;
use crate::problem::PlanningProblem;
use crate::tasks::{EndingTask, FlyThroughTask, NoFlyTask, PathTask, DEFAULT_NO_FLY_PENALTY};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Position>,
    #[serde(default)]
    pub areas: Vec<ScenarioArea>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioArea {
    pub polygon: GeoPolygon,
    #[serde(default)]
    pub tasks: Vec<ScenarioTask>,
}

/// Task entry, tagged by `"type"` with the same names as the binary format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScenarioTask {
    FlyThrough {
        target: GeoPoint,
        std_dev: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shortness_reward: Option<bool>,
    },
    NoFly {
        #[serde(default = "default_penalty")]
        penalty_per_sample: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shortness_reward: Option<bool>,
    },
    Ending {
        std_dev: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        shortness_reward: Option<bool>,
    },
}

fn default_penalty() -> f64 {
    DEFAULT_NO_FLY_PENALTY
}

impl ScenarioTask {
    /// Build the validated task. Unset shortness flags keep the task default.
    pub fn to_task(&self) -> Result<PathTask, TaskConfigError> {
        let (mut task, shortness_reward) = match self {
            ScenarioTask::FlyThrough {
                target,
                std_dev,
                shortness_reward,
            } => (
                PathTask::from(FlyThroughTask::new(*target, *std_dev)?),
                *shortness_reward,
            ),
            ScenarioTask::NoFly {
                penalty_per_sample,
                shortness_reward,
            } => (
                PathTask::from(NoFlyTask::new(*penalty_per_sample)?),
                *shortness_reward,
            ),
            ScenarioTask::Ending {
                std_dev,
                shortness_reward,
            } => (PathTask::from(EndingTask::new(*std_dev)?), *shortness_reward),
        };
        if let Some(applies) = shortness_reward {
            task.set_shortness_reward(applies);
        }
        Ok(task)
    }

    pub fn from_task(task: &PathTask) -> Self {
        let shortness_reward = Some(task.shortness_reward_applies());
        match task {
            PathTask::FlyThrough(t) => ScenarioTask::FlyThrough {
                target: t.target(),
                std_dev: t.std_dev(),
                shortness_reward,
            },
            PathTask::NoFly(t) => ScenarioTask::NoFly {
                penalty_per_sample: t.penalty_per_sample(),
                shortness_reward,
            },
            PathTask::Ending(t) => ScenarioTask::Ending {
                std_dev: t.std_dev(),
                shortness_reward,
            },
        }
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Build a problem, failing on the first invalid task.
    pub fn to_problem(&self) -> Result<PlanningProblem, ScenarioError> {
        let mut areas = Vec::with_capacity(self.areas.len());
        for (area_index, area) in self.areas.iter().enumerate() {
            let mut tasks = Vec::with_capacity(area.tasks.len());
            for (task_index, task) in area.tasks.iter().enumerate() {
                let task = task.to_task().map_err(|source| ScenarioError::InvalidTask {
                    area: area_index,
                    task: task_index,
                    source,
                })?;
                tasks.push(task);
            }
            areas.push(TaskArea::with_tasks(area.polygon.clone(), tasks));
        }

        let mut problem = PlanningProblem::new();
        for area in areas {
            problem.add_area(area);
        }
        if let Some(start) = self.start {
            problem.set_start_position(start);
        }
        Ok(problem)
    }

    pub fn from_problem(problem: &PlanningProblem) -> Self {
        Self {
            start: problem
                .is_start_defined()
                .then(|| problem.starting_position()),
            areas: problem
                .areas()
                .map(|(_, area)| ScenarioArea {
                    polygon: area.geo_poly().clone(),
                    tasks: area.tasks().iter().map(ScenarioTask::from_task).collect(),
                })
                .collect(),
        }
    }
}
