//! Read-only accessors over a structured result.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

use crate::types::{DailyRecord, HourlyRecord, StructuredWeather};

impl StructuredWeather {
    /// Timezone of the data. Unknown names fall back to UTC.
    pub fn tz(&self) -> Tz {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!("Unknown timezone {:?}, using UTC", self.timezone);
                Tz::UTC
            }
        }
    }

    pub fn current_day(&self) -> &DailyRecord {
        &self.current_day
    }

    pub fn past_days(&self) -> &[DailyRecord] {
        &self.past_days
    }

    pub fn forecast(&self) -> &[DailyRecord] {
        &self.forecast
    }

    /// Record of today whose hour-of-day matches `now` in the data's timezone.
    ///
    /// Only the hour component is compared.
    pub fn hour_at(&self, now: DateTime<Utc>) -> Option<&HourlyRecord> {
        let local_hour = now.with_timezone(&self.tz()).hour();
        self.current_day
            .hourly
            .iter()
            .find(|record| record.hour.is_some_and(|h| h.value.hour() == local_hour))
    }

    pub fn current_hour(&self) -> Option<&HourlyRecord> {
        self.hour_at(Utc::now())
    }
}
