//! Per-run capacity bookkeeping.
//!
//! Each resource owns a map from date to the seconds still free on that date. Entries
//! appear on first booking; a date without an entry has a full work day available.

use crate::error::{PrevisionError, Result};
use crate::resource::Resource;
use crate::timesheet::TimesheetRow;
use chrono::NaiveDate;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ResourceDailyMap {
    resource: Resource,
    days: HashMap<NaiveDate, i64>,
}

impl ResourceDailyMap {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            days: HashMap::new(),
        }
    }

    pub fn user(&self) -> &str {
        &self.resource.user
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Seconds left on `date`, `None` when nothing was booked yet.
    pub fn remaining(&self, date: NaiveDate) -> Option<i64> {
        self.days.get(&date).copied()
    }

    /// Book up to `wanted` seconds on `date`, returning what was actually booked.
    pub fn consume(&mut self, date: NaiveDate, wanted: i64, day_seconds: i64) -> i64 {
        let available = self.remaining(date).unwrap_or(day_seconds);
        let booked = wanted.min(available).max(0);
        self.days.insert(date, available - booked);
        booked
    }
}

/// Capacity of every known resource for one build.
#[derive(Debug, Clone)]
pub struct ResourceBook {
    maps: HashMap<String, ResourceDailyMap>,
    day_seconds: i64,
}

impl ResourceBook {
    pub fn new(resources: &[Resource], day_seconds: i64) -> Self {
        let maps = resources
            .iter()
            .map(|r| (r.user.clone(), ResourceDailyMap::new(r.clone())))
            .collect();
        Self { maps, day_seconds }
    }

    pub fn day_seconds(&self) -> i64 {
        self.day_seconds
    }

    pub fn get(&self, user: &str) -> Result<&ResourceDailyMap> {
        self.maps
            .get(user)
            .ok_or_else(|| PrevisionError::ResourceNotFound(user.to_string()))
    }

    pub fn get_mut(&mut self, user: &str) -> Result<&mut ResourceDailyMap> {
        self.maps
            .get_mut(user)
            .ok_or_else(|| PrevisionError::ResourceNotFound(user.to_string()))
    }

    /// Seconds already booked for `user` on `date`.
    pub fn booked(&self, user: &str, date: NaiveDate) -> Result<i64> {
        let map = self.get(user)?;
        Ok(map
            .remaining(date)
            .map_or(0, |left| self.day_seconds - left))
    }

    /// Walk `resources` in order booking their free time on `date` against `left`,
    /// one row per booking, until `left` reaches zero.
    pub fn allocate(
        &mut self,
        task: &str,
        resources: &[String],
        date: NaiveDate,
        left: &mut i64,
        rows: &mut Vec<TimesheetRow>,
    ) -> Result<()> {
        let day_seconds = self.day_seconds;
        for user in resources {
            if *left == 0 {
                break;
            }
            let map = self.get_mut(user)?;
            if !map.resource().is_available(date) {
                debug!(%date, user = %user, task, "resource not available");
                continue;
            }
            if map.remaining(date) == Some(0) {
                debug!(%date, user = %user, task, "no more time for this day");
                continue;
            }

            let booked = map.consume(date, *left, day_seconds);
            *left -= booked;
            rows.push(TimesheetRow::allocated(user, date, task, booked));
            debug!(
                %date,
                user = %user,
                task,
                booked,
                left = *left,
                free = map.remaining(date).unwrap_or(0),
                "booked resource"
            );
        }
        Ok(())
    }
}
