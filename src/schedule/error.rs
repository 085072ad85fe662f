use thiserror::Error;

use crate::models::PrayerName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("Malformed timings for {prayer}: {reason}")]
    MalformedTimings {
        prayer: PrayerName,
        reason: MalformedReason,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("missing from provider response")]
    Missing,
    #[error("'{0}' is not a 24-hour HH:MM time")]
    Unparseable(String),
    #[error("not after the preceding prayer")]
    OutOfOrder,
    #[error("wall-clock time does not exist in the local timezone")]
    Unrepresentable,
}

impl ScheduleError {
    pub fn malformed(prayer: PrayerName, reason: MalformedReason) -> Self {
        ScheduleError::MalformedTimings { prayer, reason }
    }

    pub fn prayer(&self) -> PrayerName {
        match self {
            ScheduleError::MalformedTimings { prayer, .. } => *prayer,
        }
    }
}
