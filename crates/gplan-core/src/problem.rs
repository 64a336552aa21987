//! The planning problem: task areas, a start position, and total fitness.

use crate::area::TaskArea;
use crate::codec;
use crate::error::DecodeError;
use crate::geo::path_length_m;
use crate::individual::Individual;
use crate::models::Position;
use crate::tasks::{TaskType, MAX_TASK_SCORE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Identity of an area inside one [`PlanningProblem`]. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AreaId(u64);

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "area-{}", self.0)
    }
}

/// Notification emitted by every structural edit of a problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProblemEvent {
    AreaAdded(AreaId),
    AreaRemoved(AreaId),
    AreaChanged(AreaId),
    StartPositionChanged(Position),
    StartPositionRemoved,
    /// Follows every specific event above
    Changed,
}

type Subscriber = Box<dyn FnMut(&ProblemEvent) + Send + Sync>;

/// Score of one task within a fitness evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct TaskScore {
    pub area: AreaId,
    pub index: usize,
    pub task_type: TaskType,
    pub score: f64,
}

/// Breakdown of a fitness evaluation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FitnessReport {
    pub task_scores: Vec<TaskScore>,
    /// Sum of task scores before any bonus
    pub task_total: f64,
    /// Shortness bonus accumulated from tasks that opt into it
    pub shortness_bonus: f64,
    /// Whether every task hit the maximum, so the bonus was added
    pub bonus_applied: bool,
    pub total: f64,
    pub trajectory_len: usize,
    /// Ground distance along the trajectory in meters
    pub path_length_m: f64,
}

/// Task areas plus an optional start, evaluated against candidate paths.
///
/// Not `Clone`: areas carry identity. Use
/// [`PlanningProblem::duplicate`] to get an independent copy through the
/// binary format.
#[derive(Default)]
pub struct PlanningProblem {
    areas: BTreeMap<AreaId, TaskArea>,
    next_area_id: u64,
    start_pos: Position,
    start_is_defined: bool,
    events: Vec<ProblemEvent>,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for PlanningProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanningProblem")
            .field("areas", &self.areas)
            .field("start_pos", &self.start_pos)
            .field("start_is_defined", &self.start_is_defined)
            .field("pending_events", &self.events.len())
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl PlanningProblem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ready to evaluate once a start position has been defined.
    pub fn is_ready(&self) -> bool {
        self.is_start_defined()
    }

    pub fn is_start_defined(&self) -> bool {
        self.start_is_defined
    }

    /// Last start position set. Still returned after it has been cleared.
    pub fn starting_position(&self) -> Position {
        self.start_pos
    }

    pub fn areas(&self) -> impl Iterator<Item = (AreaId, &TaskArea)> {
        self.areas.iter().map(|(id, area)| (*id, area))
    }

    pub fn area(&self, id: AreaId) -> Option<&TaskArea> {
        self.areas.get(&id)
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    pub fn task_count(&self) -> usize {
        self.areas.values().map(|a| a.tasks().len()).sum()
    }

    /// Register an area. Edits already recorded on it are discarded.
    pub fn add_area(&mut self, mut area: TaskArea) -> AreaId {
        area.take_events();
        let id = AreaId(self.next_area_id);
        self.next_area_id += 1;
        self.areas.insert(id, area);

        self.emit(ProblemEvent::AreaAdded(id));
        self.emit(ProblemEvent::Changed);
        id
    }

    pub fn remove_area(&mut self, id: AreaId) -> Option<TaskArea> {
        let area = self.areas.remove(&id)?;
        self.emit(ProblemEvent::AreaRemoved(id));
        self.emit(ProblemEvent::Changed);
        Some(area)
    }

    /// Edit one area in place. Any edit the closure makes is announced as
    /// `AreaChanged` followed by `Changed`.
    pub fn edit_area<R>(&mut self, id: AreaId, edit: impl FnOnce(&mut TaskArea) -> R) -> Option<R> {
        let area = self.areas.get_mut(&id)?;
        let result = edit(area);
        let edits = area.take_events();
        if !edits.is_empty() {
            tracing::debug!("{} edited ({} changes)", id, edits.len());
            self.emit(ProblemEvent::AreaChanged(id));
            self.emit(ProblemEvent::Changed);
        }
        Some(result)
    }

    pub fn set_start_position(&mut self, pos: Position) {
        self.start_pos = pos;
        self.start_is_defined = true;

        self.emit(ProblemEvent::StartPositionChanged(pos));
        self.emit(ProblemEvent::Changed);
    }

    /// Keep a start value without defining it, so an undefined start still
    /// survives a round trip through the binary format.
    pub(crate) fn stash_start_position(&mut self, pos: Position) {
        self.start_pos = pos;
    }

    pub fn clear_start_position(&mut self) {
        self.start_is_defined = false;
        self.emit(ProblemEvent::StartPositionRemoved);
        self.emit(ProblemEvent::Changed);
        tracing::debug!("Start position cleared");
    }

    /// Register a callback invoked for every event as it happens.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ProblemEvent) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Drain events queued since the last call.
    pub fn take_events(&mut self) -> Vec<ProblemEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: ProblemEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
        self.events.push(event);
    }

    /// Total fitness of `individual`. Zero, without generating a path, when
    /// no start position is defined.
    pub fn fitness(&self, individual: &dyn Individual) -> f64 {
        self.evaluate(individual).total
    }

    /// Fitness with a per-task breakdown.
    ///
    /// The shortness bonus (each opted-in task's score divided by the
    /// trajectory length) only counts when every task scored the maximum.
    pub fn evaluate(&self, individual: &dyn Individual) -> FitnessReport {
        let mut report = FitnessReport::default();
        if !self.is_ready() {
            return report;
        }

        let positions = individual.generate_positions(&self.start_pos);
        report.trajectory_len = positions.len();
        report.path_length_m = path_length_m(&positions);

        for (id, area) in &self.areas {
            for (index, task) in area.tasks().iter().enumerate() {
                let score = task.performance(&positions, area.geo_poly());
                report.task_total += score;
                if task.shortness_reward_applies() && !positions.is_empty() {
                    report.shortness_bonus += score / positions.len() as f64;
                }
                report.task_scores.push(TaskScore {
                    area: *id,
                    index,
                    task_type: task.task_type(),
                    score,
                });
            }
        }

        let task_count = report.task_scores.len();
        report.total = report.task_total;
        if report.task_total >= task_count as f64 * MAX_TASK_SCORE {
            report.bonus_applied = true;
            report.total += report.shortness_bonus;
        }

        tracing::debug!(
            tasks = task_count,
            samples = report.trajectory_len,
            total = report.total,
            "fitness evaluated"
        );
        report
    }

    /// Independent copy made by encoding and decoding this problem.
    /// Subscribers and pending events are not carried over.
    pub fn duplicate(&self) -> Result<PlanningProblem, DecodeError> {
        let mut bytes = codec::encode_problem(self);
        let mut copy = codec::decode_problem(&mut bytes)?;
        copy.take_events();
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{GeoPoint, GeoPolygon};
    use crate::individual::FixedPath;
    use crate::tasks::{FlyThroughTask, NoFlyTask, REFERENCE_ALTITUDE_M};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct CountingPath {
        calls: AtomicUsize,
        positions: Vec<Position>,
    }

    impl Individual for CountingPath {
        fn generate_positions(&self, _start: &Position) -> Vec<Position> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.positions.clone()
        }
    }

    fn at(lat: f64, lon: f64) -> Position {
        Position::new(lat, lon, REFERENCE_ALTITUDE_M)
    }

    fn square_around(lat: f64, lon: f64, half_deg: f64) -> GeoPolygon {
        GeoPolygon::new(vec![
            GeoPoint::new(lon - half_deg, lat - half_deg),
            GeoPoint::new(lon + half_deg, lat - half_deg),
            GeoPoint::new(lon + half_deg, lat + half_deg),
            GeoPoint::new(lon - half_deg, lat + half_deg),
        ])
    }

    #[test]
    fn not_ready_scores_zero_without_generating() {
        let mut problem = PlanningProblem::new();
        let mut area = TaskArea::new(GeoPolygon::default());
        area.add_task(FlyThroughTask::new(GeoPoint::new(10.0, 10.0), 50.0).unwrap());
        problem.add_area(area);

        let spy = CountingPath {
            calls: AtomicUsize::new(0),
            positions: vec![at(10.0, 10.0)],
        };
        assert!(!problem.is_ready());
        assert_eq!(problem.fitness(&spy), 0.0);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 0);

        problem.set_start_position(at(10.0, 10.0));
        assert_eq!(problem.fitness(&spy), 500.0);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);

        problem.clear_start_position();
        assert_eq!(problem.fitness(&spy), 0.0);
        assert_eq!(spy.calls.load(Ordering::SeqCst), 1);
    }

    fn bonus_problem(no_fly_penalty: f64) -> PlanningProblem {
        let mut problem = PlanningProblem::new();
        problem.set_start_position(at(33.0, -117.0));

        let mut target_area = TaskArea::new(GeoPolygon::default());
        target_area.add_task(
            FlyThroughTask::new(GeoPoint::new(-117.0, 33.0), 50.0)
                .unwrap()
                .with_shortness_reward(true),
        );
        problem.add_area(target_area);

        let mut zone = TaskArea::new(square_around(33.0, -117.0, 0.01));
        zone.add_task(NoFlyTask::new(no_fly_penalty).unwrap());
        problem.add_area(zone);
        problem
    }

    #[test]
    fn shortness_bonus_withheld_unless_every_task_maxed() {
        // One sample inside the no-fly zone costs 0.001: 500 + 499.999.
        let path = FixedPath(vec![at(33.0, -117.0), at(33.5, -117.0)]);
        let problem = bonus_problem(0.001);
        let report = problem.evaluate(&path);

        assert_eq!(report.task_scores.len(), 2);
        assert_eq!(report.task_scores[0].score, 500.0);
        assert!((report.task_scores[1].score - 499.999).abs() < 1e-9);
        assert_eq!(report.shortness_bonus, 250.0);
        assert!(!report.bonus_applied);
        assert_eq!(report.total, report.task_total);
    }

    #[test]
    fn shortness_bonus_added_on_full_success() {
        let path = FixedPath(vec![at(33.0, -117.0), at(33.5, -117.0)]);
        let mut problem = bonus_problem(0.001);
        let zone_id = problem.areas().nth(1).map(|(id, _)| id).unwrap();
        // Move the zone away from the path.
        problem.edit_area(zone_id, |area| area.translate(1.0, 0.0));

        let report = problem.evaluate(&path);
        assert!(report.bonus_applied);
        assert_eq!(report.total, 1000.0 + 500.0 / 2.0);
        assert_eq!(problem.fitness(&path), 1250.0);
    }

    #[test]
    fn shorter_successful_paths_score_higher() {
        let mut problem = bonus_problem(100.0);
        let zone_id = problem
            .areas()
            .find(|(_, area)| !area.geo_poly().is_empty())
            .map(|(id, _)| id)
            .unwrap();
        problem.edit_area(zone_id, |area| area.translate(5.0, 0.0));

        let short = FixedPath(vec![at(33.0, -117.0)]);
        let long = FixedPath(vec![at(33.0, -117.0); 4]);
        assert!(problem.fitness(&short) > problem.fitness(&long));
    }

    #[test]
    fn empty_trajectory_earns_no_bonus() {
        let mut problem = PlanningProblem::new();
        problem.set_start_position(at(0.0, 0.0));
        let mut area = TaskArea::new(square_around(0.0, 0.0, 0.01));
        area.add_task(NoFlyTask::default().with_shortness_reward(true));
        problem.add_area(area);

        let report = problem.evaluate(&FixedPath(Vec::new()));
        assert_eq!(report.total, 500.0);
        assert_eq!(report.shortness_bonus, 0.0);
    }

    #[test]
    fn problem_without_tasks_scores_zero() {
        let mut problem = PlanningProblem::new();
        problem.set_start_position(at(0.0, 0.0));
        problem.add_area(TaskArea::new(GeoPolygon::default()));
        assert_eq!(problem.fitness(&FixedPath(vec![at(0.0, 0.0)])), 0.0);
    }

    #[test]
    fn evaluation_sees_latest_polygon() {
        let mut problem = PlanningProblem::new();
        problem.set_start_position(at(33.0, -117.0));
        let id = problem.add_area(TaskArea::new(square_around(33.0, -117.0, 0.01)));
        problem.edit_area(id, |area| area.add_task(NoFlyTask::default()));

        let path = FixedPath(vec![at(33.0, -117.0)]);
        assert_eq!(problem.fitness(&path), 400.0);

        problem.edit_area(id, |area| area.translate(0.5, 0.0));
        assert_eq!(problem.fitness(&path), 500.0);
    }

    #[test]
    fn every_mutation_emits_changed() {
        let mut problem = PlanningProblem::new();
        let id = problem.add_area(TaskArea::default());
        problem.set_start_position(at(1.0, 2.0));
        problem.clear_start_position();
        problem.edit_area(id, |area| area.add_task(NoFlyTask::default()));
        problem.edit_area(id, |area| area.tasks().len());
        problem.remove_area(id);

        assert_eq!(
            problem.take_events(),
            vec![
                ProblemEvent::AreaAdded(id),
                ProblemEvent::Changed,
                ProblemEvent::StartPositionChanged(at(1.0, 2.0)),
                ProblemEvent::Changed,
                ProblemEvent::StartPositionRemoved,
                ProblemEvent::Changed,
                ProblemEvent::AreaChanged(id),
                ProblemEvent::Changed,
                ProblemEvent::AreaRemoved(id),
                ProblemEvent::Changed,
            ]
        );
        assert!(problem.remove_area(id).is_none());
        assert!(problem.take_events().is_empty());
    }

    #[test]
    fn subscribers_are_pushed_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut problem = PlanningProblem::new();
        problem.subscribe(move |event| sink.lock().unwrap().push(*event));
        let id = problem.add_area(TaskArea::default());

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ProblemEvent::AreaAdded(id), ProblemEvent::Changed]
        );
    }

    #[test]
    fn area_ids_are_not_reused() {
        let mut problem = PlanningProblem::new();
        let first = problem.add_area(TaskArea::default());
        problem.remove_area(first);
        let second = problem.add_area(TaskArea::default());
        assert_ne!(first, second);
        assert_eq!(problem.area_count(), 1);
    }

    #[test]
    fn problem_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PlanningProblem>();
    }

    #[test]
    fn duplicate_is_independent() {
        let mut problem = bonus_problem(100.0);
        let copy = problem.duplicate().unwrap();
        assert_eq!(copy.task_count(), 2);
        assert!(copy.is_start_defined());

        problem.clear_start_position();
        assert!(copy.is_ready());
        assert!(!problem.is_ready());
    }
}
