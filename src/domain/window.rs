use chrono::{DateTime, Duration, FixedOffset, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    pub since: DateTime<Local>,
    pub until: DateTime<Local>,
    pub hours: u32,
}

impl LookbackWindow {
    pub fn ending_at(until: DateTime<Local>, hours: u32) -> Self {
        Self {
            since: until - Duration::hours(i64::from(hours)),
            until,
            hours,
        }
    }

    pub fn contains(&self, timestamp: &DateTime<FixedOffset>) -> bool {
        *timestamp >= self.since && *timestamp <= self.until
    }
}
