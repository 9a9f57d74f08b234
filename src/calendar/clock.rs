use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

/// Where instants are turned into calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockZone {
    /// The system zone, looked up per instant so DST changes apply
    Local,
    Fixed(FixedOffset),
}

/// The single timezone policy used for "today" and for instant-bearing dates.
///
/// Production code uses the client's local time; tests pin both values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarClock {
    today: NaiveDate,
    zone: ClockZone,
}

impl CalendarClock {
    pub fn local() -> Self {
        Self {
            today: Local::now().date_naive(),
            zone: ClockZone::Local,
        }
    }

    pub fn fixed(today: NaiveDate, offset: FixedOffset) -> Self {
        Self {
            today,
            zone: ClockZone::Fixed(offset),
        }
    }

    pub fn utc(today: NaiveDate) -> Self {
        Self::fixed(today, Utc.fix())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn zone(&self) -> ClockZone {
        self.zone
    }

    /// Calendar date of an instant as seen from this clock's zone
    pub fn local_date<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> NaiveDate {
        match self.zone {
            ClockZone::Local => instant.with_timezone(&Local).date_naive(),
            ClockZone::Fixed(offset) => instant.with_timezone(&offset).date_naive(),
        }
    }
}

impl Default for CalendarClock {
    fn default() -> Self {
        Self::local()
    }
}
