//! Task areas: a polygon plus the objectives scoped to it.

use crate::geo::{GeoPoint, GeoPolygon};
use crate::tasks::PathTask;

/// Edit recorded by a [`TaskArea`] until drained with [`TaskArea::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaEvent {
    PolygonChanged,
    TaskAdded(usize),
    TaskRemoved(usize),
}

/// A geographic region and the ordered tasks evaluated against it.
#[derive(Debug, Default)]
pub struct TaskArea {
    geo_poly: GeoPolygon,
    tasks: Vec<PathTask>,
    events: Vec<AreaEvent>,
}

impl TaskArea {
    pub fn new(geo_poly: GeoPolygon) -> Self {
        Self {
            geo_poly,
            tasks: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_tasks(geo_poly: GeoPolygon, tasks: Vec<PathTask>) -> Self {
        Self {
            geo_poly,
            tasks,
            events: Vec::new(),
        }
    }

    pub fn geo_poly(&self) -> &GeoPolygon {
        &self.geo_poly
    }

    pub fn tasks(&self) -> &[PathTask] {
        &self.tasks
    }

    pub fn set_geo_poly(&mut self, geo_poly: GeoPolygon) {
        self.geo_poly = geo_poly;
        self.events.push(AreaEvent::PolygonChanged);
    }

    /// Move one vertex. Nothing is recorded when `index` is out of range.
    pub fn set_vertex(&mut self, index: usize, point: GeoPoint) -> bool {
        let moved = self.geo_poly.set_vertex(index, point);
        if moved {
            self.events.push(AreaEvent::PolygonChanged);
        }
        moved
    }

    pub fn insert_vertex(&mut self, index: usize, point: GeoPoint) {
        self.geo_poly.insert_vertex(index, point);
        self.events.push(AreaEvent::PolygonChanged);
    }

    pub fn remove_vertex(&mut self, index: usize) -> Option<GeoPoint> {
        let removed = self.geo_poly.remove_vertex(index)?;
        self.events.push(AreaEvent::PolygonChanged);
        Some(removed)
    }

    /// Drag the whole polygon by degree offsets.
    pub fn translate(&mut self, d_lon: f64, d_lat: f64) {
        self.geo_poly.translate(d_lon, d_lat);
        self.events.push(AreaEvent::PolygonChanged);
    }

    pub fn add_task(&mut self, task: impl Into<PathTask>) -> usize {
        self.tasks.push(task.into());
        let index = self.tasks.len() - 1;
        self.events.push(AreaEvent::TaskAdded(index));
        index
    }

    pub fn remove_task(&mut self, index: usize) -> Option<PathTask> {
        if index >= self.tasks.len() {
            return None;
        }
        let task = self.tasks.remove(index);
        self.events.push(AreaEvent::TaskRemoved(index));
        Some(task)
    }

    pub fn clear_tasks(&mut self) {
        while let Some(task_index) = self.tasks.len().checked_sub(1) {
            self.tasks.pop();
            self.events.push(AreaEvent::TaskRemoved(task_index));
        }
    }

    pub fn take_events(&mut self) -> Vec<AreaEvent> {
        std::mem::take(&mut self.events)
    }
}
