use crate::error::{PrevisionError, Result};
use crate::period::Period;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A worker with the calendar windows in which they cannot be allocated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub user: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub email: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holidays: Vec<Period>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sick: Vec<Period>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unemployed: Vec<Period>,
}

impl Resource {
    pub fn new(user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn add_holiday(&mut self, period: Period) {
        self.holidays.push(period);
    }

    pub fn add_sick(&mut self, period: Period) {
        self.sick.push(period);
    }

    pub fn add_unemployed(&mut self, period: Period) {
        self.unemployed.push(period);
    }

    /// False when the date falls inside any holiday, sick or unemployment window.
    pub fn is_available(&self, date: NaiveDate) -> bool {
        !self
            .holidays
            .iter()
            .chain(&self.sick)
            .chain(&self.unemployed)
            .any(|window| window.contains(date))
    }

    pub fn validate(&self) -> Result<()> {
        for window in &self.holidays {
            self.check_closed_window(window, "holiday")?;
        }
        for window in &self.sick {
            self.check_closed_window(window, "sick")?;
        }

        let mut open_ended = false;
        for window in &self.unemployed {
            if window.start_period.is_none() {
                return Err(self.invalid("unemployed entry without start period"));
            }
            if window.end_period.is_none() {
                if open_ended {
                    return Err(self.invalid("multiple unemployed entries without end period"));
                }
                open_ended = true;
            }
        }
        Ok(())
    }

    fn check_closed_window(&self, window: &Period, kind: &str) -> Result<()> {
        match (window.start_period, window.end_period) {
            (Some(start), Some(end)) if start <= end => Ok(()),
            (Some(_), Some(_)) => Err(self.invalid(&format!("{kind} entry ends before it starts"))),
            _ => Err(self.invalid(&format!("invalid {kind} entry"))),
        }
    }

    fn invalid(&self, reason: &str) -> PrevisionError {
        PrevisionError::InvalidResource {
            user: self.user.clone(),
            reason: reason.to_string(),
        }
    }
}
