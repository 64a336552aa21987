//! Binary record format for planning problems.
//!
//! All values are big-endian. Layout:
//!
//! ```text
//! header   : b"GPLN", version u16
//! problem  : area count i32, area*, start defined bool, start Position
//! area     : point count u32, (lon f64, lat f64)*, task count u32, task*
//! task     : tag string, shortness reward bool, payload
//! string   : byte length u32, UTF-8
//! Position : lat f64, lon f64, alt f64
//! ```
//!
//! The start position is written even when undefined so every record has
//! the same trailing shape. Decoding is all-or-nothing.

use crate::area::TaskArea;
use crate::error::{DecodeError, TaskConfigError};
use crate::geo::{GeoPoint, GeoPolygon};
use crate::models::Position;
use crate::problem::PlanningProblem;
use crate::tasks::{EndingTask, FlyThroughTask, NoFlyTask, PathTask, TaskType};
use bytes::{Buf, BufMut, Bytes, BytesMut};

pub const MAGIC: &[u8; 4] = b"GPLN";
pub const FORMAT_VERSION: u16 = 1;

// Smallest encodings, used to reject counts the remaining input can't hold.
const MIN_AREA_LEN: usize = 8;
const POINT_LEN: usize = 16;
const MIN_TASK_LEN: usize = 5;

/// Encode a problem into a fresh buffer.
pub fn encode_problem(problem: &PlanningProblem) -> Bytes {
    let mut buf = BytesMut::new();
    encode_into(problem, &mut buf);
    buf.freeze()
}

pub fn encode_into<B: BufMut>(problem: &PlanningProblem, buf: &mut B) {
    buf.put_slice(MAGIC);
    buf.put_u16(FORMAT_VERSION);

    buf.put_i32(problem.area_count() as i32);
    for (_, area) in problem.areas() {
        put_area(buf, area);
    }

    put_bool(buf, problem.is_start_defined());
    put_position(buf, &problem.starting_position());
}

fn put_area<B: BufMut>(buf: &mut B, area: &TaskArea) {
    put_polygon(buf, area.geo_poly());
    buf.put_u32(area.tasks().len() as u32);
    for task in area.tasks() {
        put_task(buf, task);
    }
}

fn put_polygon<B: BufMut>(buf: &mut B, poly: &GeoPolygon) {
    buf.put_u32(poly.len() as u32);
    for v in poly.vertices() {
        buf.put_f64(v.lon);
        buf.put_f64(v.lat);
    }
}

fn put_task<B: BufMut>(buf: &mut B, task: &PathTask) {
    put_string(buf, task.task_type().as_str());
    put_bool(buf, task.shortness_reward_applies());
    match task {
        PathTask::FlyThrough(t) => {
            buf.put_f64(t.target().lon);
            buf.put_f64(t.target().lat);
            buf.put_f64(t.std_dev());
        }
        PathTask::NoFly(t) => buf.put_f64(t.penalty_per_sample()),
        PathTask::Ending(t) => buf.put_f64(t.std_dev()),
    }
}

fn put_position<B: BufMut>(buf: &mut B, pos: &Position) {
    buf.put_f64(pos.latitude);
    buf.put_f64(pos.longitude);
    buf.put_f64(pos.altitude);
}

fn put_bool<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(u8::from(value));
}

fn put_string<B: BufMut>(buf: &mut B, value: &str) {
    buf.put_u32(value.len() as u32);
    buf.put_slice(value.as_bytes());
}

/// Decode a complete problem record. Trailing bytes are an error.
///
/// Areas are registered (emitting `AreaAdded`/`Changed`) only after the
/// whole record has been read, and the start position is applied through
/// the regular setters so readiness follows the decoded flag.
pub fn decode_problem<B: Buf>(buf: &mut B) -> Result<PlanningProblem, DecodeError> {
    decode_record(buf).inspect_err(|e| {
        tracing::warn!(error = %e, "failed to decode planning problem");
    })
}

fn decode_record<B: Buf>(buf: &mut B) -> Result<PlanningProblem, DecodeError> {
    let mut magic = [0u8; 4];
    need(buf, magic.len())?;
    buf.copy_to_slice(&mut magic);
    if &magic != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    need(buf, 2)?;
    let version = buf.get_u16();
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }

    need(buf, 4)?;
    let num_areas = buf.get_i32();
    let num_areas = checked_count(buf, "area", i64::from(num_areas), MIN_AREA_LEN)?;
    let mut areas = Vec::with_capacity(num_areas);
    for _ in 0..num_areas {
        areas.push(get_area(buf)?);
    }

    let start_is_defined = get_bool(buf)?;
    let start_pos = get_position(buf)?;

    if buf.has_remaining() {
        return Err(DecodeError::TrailingBytes(buf.remaining()));
    }

    let mut problem = PlanningProblem::new();
    for area in areas {
        problem.add_area(area);
    }
    if start_is_defined {
        problem.set_start_position(start_pos);
    } else {
        problem.stash_start_position(start_pos);
        problem.clear_start_position();
    }

    tracing::debug!(
        areas = problem.area_count(),
        tasks = problem.task_count(),
        start_defined = start_is_defined,
        "decoded planning problem"
    );
    Ok(problem)
}

fn get_area<B: Buf>(buf: &mut B) -> Result<TaskArea, DecodeError> {
    let poly = get_polygon(buf)?;

    need(buf, 4)?;
    let num_tasks = buf.get_u32();
    let num_tasks = checked_count(buf, "task", i64::from(num_tasks), MIN_TASK_LEN)?;
    let mut tasks = Vec::with_capacity(num_tasks);
    for _ in 0..num_tasks {
        tasks.push(get_task(buf)?);
    }

    Ok(TaskArea::with_tasks(poly, tasks))
}

fn get_polygon<B: Buf>(buf: &mut B) -> Result<GeoPolygon, DecodeError> {
    need(buf, 4)?;
    let num_points = buf.get_u32();
    let num_points = checked_count(buf, "polygon point", i64::from(num_points), POINT_LEN)?;
    let mut vertices = Vec::with_capacity(num_points);
    for _ in 0..num_points {
        let lon = buf.get_f64();
        let lat = buf.get_f64();
        vertices.push(GeoPoint::new(lon, lat));
    }
    Ok(GeoPolygon::new(vertices))
}

fn get_task<B: Buf>(buf: &mut B) -> Result<PathTask, DecodeError> {
    let tag = get_string(buf)?;
    let Some(task_type) = TaskType::from_tag(&tag) else {
        return Err(DecodeError::UnknownTaskType(tag));
    };
    let shortness_reward = get_bool(buf)?;

    let built: Result<PathTask, TaskConfigError> = match task_type {
        TaskType::FlyThrough => {
            need(buf, 24)?;
            let lon = buf.get_f64();
            let lat = buf.get_f64();
            let std_dev = buf.get_f64();
            FlyThroughTask::new(GeoPoint::new(lon, lat), std_dev).map(PathTask::from)
        }
        TaskType::NoFly => {
            need(buf, 8)?;
            NoFlyTask::new(buf.get_f64()).map(PathTask::from)
        }
        TaskType::Ending => {
            need(buf, 8)?;
            EndingTask::new(buf.get_f64()).map(PathTask::from)
        }
    };

    let mut task = built.map_err(|source| DecodeError::InvalidTask { tag, source })?;
    task.set_shortness_reward(shortness_reward);
    Ok(task)
}

fn get_position<B: Buf>(buf: &mut B) -> Result<Position, DecodeError> {
    need(buf, 24)?;
    Ok(Position::new(buf.get_f64(), buf.get_f64(), buf.get_f64()))
}

fn get_bool<B: Buf>(buf: &mut B) -> Result<bool, DecodeError> {
    need(buf, 1)?;
    match buf.get_u8() {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(DecodeError::InvalidBool(other)),
    }
}

fn get_string<B: Buf>(buf: &mut B) -> Result<String, DecodeError> {
    need(buf, 4)?;
    let len = buf.get_u32() as usize;
    need(buf, len)?;
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    Ok(String::from_utf8(bytes)?)
}

fn need<B: Buf>(buf: &B, needed: usize) -> Result<(), DecodeError> {
    if buf.remaining() < needed {
        return Err(DecodeError::Truncated {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

/// Validate a declared element count against what the input could hold.
fn checked_count<B: Buf>(
    buf: &B,
    what: &'static str,
    count: i64,
    min_len: usize,
) -> Result<usize, DecodeError> {
    if count < 0 {
        return Err(DecodeError::InvalidCount { what, count });
    }
    let count = count as usize;
    match count.checked_mul(min_len) {
        Some(total) => need(buf, total).map(|_| count),
        None => Err(DecodeError::InvalidCount {
            what,
            count: count as i64,
        }),
    }
}
