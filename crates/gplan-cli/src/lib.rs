//! gplan CLI - tools for building, inspecting, and scoring planning problems.
//!
//! The `gplan` binary converts JSON scenarios to the binary problem record,
//! dumps records back to JSON, and evaluates hand-written waypoint paths.

pub mod config;

use anyhow::{anyhow, bail, Context, Result};
use gplan_core::{
    decode_problem, encode_problem, EvaluationConfig, PlanningProblem, Position, Scenario,
};
use std::fs;
use std::path::Path;

pub use config::Config;

/// Load a problem from a `.json` scenario or a binary record.
pub fn load_problem(path: &Path) -> Result<PlanningProblem> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario = Scenario::from_json(&text)?;
        Ok(scenario.to_problem()?)
    } else {
        let bytes =
            fs::read(path).with_context(|| format!("reading problem {}", path.display()))?;
        decode_problem(&mut bytes.as_slice())
            .with_context(|| format!("decoding problem {}", path.display()))
    }
}

/// Write the binary record for `problem`, returning the number of bytes.
pub fn save_problem(problem: &PlanningProblem, path: &Path) -> Result<usize> {
    let bytes = encode_problem(problem);
    fs::write(path, &bytes).with_context(|| format!("writing problem {}", path.display()))?;
    Ok(bytes.len())
}

/// Directives added to `RUST_LOG` by the `gplan` binary.
pub const DEFAULT_LOG_DIRECTIVES: &[&str] = &["gplan=info", "gplan_cli=info"];

/// Parse `LAT,LON` or `LAT,LON,ALT`. Missing altitude uses the configured default.
pub fn parse_waypoint(value: &str, config: &EvaluationConfig) -> Result<Position> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let (lat, lon, alt) = match parts.as_slice() {
        [lat, lon] => (*lat, *lon, None),
        [lat, lon, alt] => (*lat, *lon, Some(*alt)),
        _ => bail!("waypoint {value:?} must be LAT,LON or LAT,LON,ALT"),
    };

    let parse = |field: &str, name: &str| -> Result<f64> {
        let parsed: f64 = field
            .parse()
            .map_err(|_| anyhow!("invalid {name} {field:?} in waypoint {value:?}"))?;
        if !parsed.is_finite() {
            bail!("{name} must be finite in waypoint {value:?}");
        }
        Ok(parsed)
    };

    let lat = parse(lat, "latitude")?;
    let lon = parse(lon, "longitude")?;
    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude {lat} out of range in waypoint {value:?}");
    }
    let alt = match alt {
        Some(alt) => parse(alt, "altitude")?,
        None => config.default_altitude_m,
    };
    Ok(Position::new(lat, lon, alt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gplan_core::{GeoPolygon, NoFlyTask, TaskArea};

    #[test]
    fn parses_waypoints() {
        let config = Config {
            sample_spacing_m: 25.0,
            altitude_m: 80.0,
        }
        .evaluation();
        assert_eq!(
            parse_waypoint("33.5, -117.25", &config).unwrap(),
            Position::new(33.5, -117.25, 80.0)
        );
        assert_eq!(
            parse_waypoint("1,2,3", &config).unwrap(),
            Position::new(1.0, 2.0, 3.0)
        );
        assert!(parse_waypoint("1", &config).is_err());
        assert!(parse_waypoint("a,b", &config).is_err());
        assert!(parse_waypoint("95,0", &config).is_err());
        assert!(parse_waypoint("1,NaN", &config).is_err());
    }

    #[test]
    fn log_directives_cover_the_binary() {
        for directive in DEFAULT_LOG_DIRECTIVES {
            assert!(
                directive.parse::<tracing_subscriber::filter::Directive>().is_ok(),
                "{directive}"
            );
        }
        assert!(DEFAULT_LOG_DIRECTIVES.iter().any(|d| d.starts_with("gplan=")));
    }

    #[test]
    fn save_then_load_binary() {
        let mut problem = PlanningProblem::new();
        let mut area = TaskArea::new(GeoPolygon::default());
        area.add_task(NoFlyTask::default());
        problem.add_area(area);
        problem.set_start_position(Position::new(1.0, 2.0, 3.0));

        let path = std::env::temp_dir().join(format!("gplan-cli-test-{}.gpp", std::process::id()));
        let written = save_problem(&problem, &path).unwrap();
        assert!(written > 0);

        let loaded = load_problem(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.task_count(), 1);
        assert!(loaded.is_ready());
    }

    #[test]
    fn demo_mission_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos/mission.json");
        let problem = load_problem(&path).unwrap();
        assert_eq!(problem.area_count(), 3);
        assert!(problem.is_ready());
    }

    #[test]
    fn load_reports_corrupt_record() {
        let path =
            std::env::temp_dir().join(format!("gplan-cli-corrupt-{}.gpp", std::process::id()));
        std::fs::write(&path, b"not a problem").unwrap();
        let err = load_problem(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(format!("{err:#}").contains("bad magic"), "{err:#}");
    }
}
