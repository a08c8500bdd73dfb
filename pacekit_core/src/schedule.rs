//! Handing plans to a scheduler.
//!
//! Scheduled plans are appended to a JSONL (JSON Lines) file with file
//! locking. Scheduling only reads the plan, so a failure here never touches
//! the workout store or an open builder session.

use crate::plan::WorkoutPlan;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Scheduler trait for handing off plans
pub trait PlanScheduler {
    fn schedule(&mut self, plan: &WorkoutPlan, at: DateTime<Utc>) -> Result<()>;
}

/// A plan together with the time it was scheduled for
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScheduledPlan {
    pub plan: WorkoutPlan,
    pub scheduled_at: DateTime<Utc>,
}

/// Next slot to schedule a plan into: one hour from now
pub fn next_slot(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::hours(1)
}

/// JSONL-based scheduler with file locking
pub struct JsonlScheduler {
    path: PathBuf,
}

impl JsonlScheduler {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl PlanScheduler for JsonlScheduler {
    fn schedule(&mut self, plan: &WorkoutPlan, at: DateTime<Utc>) -> Result<()> {
        self.ensure_parent_dir()?;

        let entry = ScheduledPlan {
            plan: plan.clone(),
            scheduled_at: at,
        };
        let line = serde_json::to_string(&entry)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::info!(
            "Scheduled plan {} for workout {} at {}",
            plan.id,
            plan.workout_id,
            at
        );
        Ok(())
    }
}

/// In-memory scheduler, for callers that only need to inspect what was sent
#[derive(Debug, Default)]
pub struct RecordingScheduler {
    pub scheduled: Vec<ScheduledPlan>,
}

impl PlanScheduler for RecordingScheduler {
    fn schedule(&mut self, plan: &WorkoutPlan, at: DateTime<Utc>) -> Result<()> {
        self.scheduled.push(ScheduledPlan {
            plan: plan.clone(),
            scheduled_at: at,
        });
        Ok(())
    }
}

/// Read all scheduled plans from a JSONL file
pub fn read_scheduled(path: &Path) -> Result<Vec<ScheduledPlan>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ScheduledPlan>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse scheduled plan at line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} scheduled plans", entries.len());
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundled::bundled_workouts;
    use crate::plan::{build_plan, PlanStyle};
    use chrono::TimeZone;

    fn sample_plan() -> WorkoutPlan {
        build_plan(&bundled_workouts().unwrap()[2], PlanStyle::Custom).unwrap()
    }

    #[test]
    fn test_next_slot_is_one_hour_ahead() {
        let now = Utc.with_ymd_and_hms(2025, 3, 6, 7, 30, 0).unwrap();
        assert_eq!(next_slot(now), Utc.with_ymd_and_hms(2025, 3, 6, 8, 30, 0).unwrap());
    }

    #[test]
    fn test_schedule_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("plans").join("scheduled.jsonl");

        let plan = sample_plan();
        let at = Utc.with_ymd_and_hms(2025, 3, 6, 8, 0, 0).unwrap();

        let mut scheduler = JsonlScheduler::new(&path);
        scheduler.schedule(&plan, at).unwrap();
        scheduler.schedule(&sample_plan(), at).unwrap();

        let entries = read_scheduled(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].plan, plan);
        assert_eq!(entries[0].scheduled_at, at);
    }

    #[test]
    fn test_read_skips_corrupt_lines() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("scheduled.jsonl");

        let mut scheduler = JsonlScheduler::new(&path);
        scheduler.schedule(&sample_plan(), Utc::now()).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ not json").unwrap();

        assert_eq!(read_scheduled(&path).unwrap().len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(read_scheduled(&temp_dir.path().join("none.jsonl")).unwrap().is_empty());
    }

    #[test]
    fn test_recording_scheduler() {
        let mut scheduler = RecordingScheduler::default();
        let plan = sample_plan();
        scheduler.schedule(&plan, Utc::now()).unwrap();
        assert_eq!(scheduler.scheduled.len(), 1);
        assert_eq!(scheduler.scheduled[0].plan.id, plan.id);
    }
}
