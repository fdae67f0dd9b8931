use chrono::{DateTime, Datelike, Days, Month, Months, NaiveDate, NaiveDateTime, TimeZone, Weekday};
use num_traits::FromPrimitive;

use crate::tz::Tz;

/// Number of days in `month` of `year`, or `None` if the month lies outside
/// the representable date range.
pub fn days_of_month(month: &Month, year: i32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month.number_from_month(), 1)?;
    let next = if month.number_from_month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.number_from_month() + 1, 1)?
    };

    Some(next.signed_duration_since(first).num_days() as u32)
}

/// Date arithmetic a month grid is built from.
///
/// Every computation of the grid goes through this trait, so the grid itself
/// never assumes a particular calendar or week layout. Lookups return `None`
/// when the calendar cannot answer for a date; the grid surfaces that as an
/// `InvalidCalendarComputation` error.
pub trait CalendarSystem {
    fn days_per_week(&self) -> u32 {
        7
    }

    /// Zone used to reduce instants to calendar days.
    fn zone(&self) -> Tz {
        Tz::utc()
    }

    fn month_start(&self, date: NaiveDate) -> Option<NaiveDate>;

    fn days_in_month(&self, date: NaiveDate) -> Option<u32>;

    /// 1-based position of `date` within its week, 1 being the first day of the week.
    fn weekday_number(&self, date: NaiveDate) -> Option<u32>;

    fn add_months(&self, date: NaiveDate, months: u32) -> Option<NaiveDate>;

    fn add_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate>;

    fn days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        to.signed_duration_since(from).num_days()
    }

    /// Calendar months from the month of `from` to the month of `to`,
    /// ignoring the day of month.
    fn months_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        (to.year() as i64 - from.year() as i64) * 12 + (to.month() as i64 - from.month() as i64)
    }

    fn week_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        let number = self.weekday_number(date)?;
        self.add_days(date, -(number as i64 - 1))
    }
}

/// The proleptic Gregorian calendar with a configurable first day of the week.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gregorian {
    week_start: Weekday,
    zone: Tz,
}

impl Default for Gregorian {
    fn default() -> Self {
        Gregorian {
            week_start: Weekday::Sun,
            zone: Tz::utc(),
        }
    }
}

impl Gregorian {
    pub fn new(week_start: Weekday, zone: Tz) -> Self {
        Gregorian { week_start, zone }
    }

    /// Weeks starting on Monday.
    pub fn iso() -> Self {
        Self::default().with_week_start(Weekday::Mon)
    }

    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    pub fn with_zone(mut self, zone: Tz) -> Self {
        self.zone = zone;
        self
    }

    pub fn first_weekday(&self) -> Weekday {
        self.week_start
    }

    /// Weekdays in display order, starting with the first day of the week.
    pub fn weekdays(&self) -> impl Iterator<Item = Weekday> {
        std::iter::successors(Some(self.week_start), |day| Some(day.succ())).take(7)
    }
}

impl CalendarSystem for Gregorian {
    fn zone(&self) -> Tz {
        self.zone
    }

    fn month_start(&self, date: NaiveDate) -> Option<NaiveDate> {
        date.with_day(1)
    }

    fn days_in_month(&self, date: NaiveDate) -> Option<u32> {
        days_of_month(&Month::from_u32(date.month())?, date.year())
    }

    fn weekday_number(&self, date: NaiveDate) -> Option<u32> {
        let day = date.weekday().num_days_from_monday();
        let start = self.week_start.num_days_from_monday();
        Some((day + 7 - start) % 7 + 1)
    }

    fn add_months(&self, date: NaiveDate, months: u32) -> Option<NaiveDate> {
        date.checked_add_months(Months::new(months))
    }

    fn add_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate> {
        if days >= 0 {
            date.checked_add_days(Days::new(days as u64))
        } else {
            date.checked_sub_days(Days::new(days.unsigned_abs()))
        }
    }
}

/// Values that name a calendar day.
///
/// Plain dates are taken as they are, local date-times drop their time of day,
/// and instants are placed in the calendar's zone first.
pub trait IntoCalendarDay {
    fn into_calendar_day(self, zone: &Tz) -> NaiveDate;
}

impl IntoCalendarDay for NaiveDate {
    fn into_calendar_day(self, _zone: &Tz) -> NaiveDate {
        self
    }
}

impl IntoCalendarDay for NaiveDateTime {
    fn into_calendar_day(self, _zone: &Tz) -> NaiveDate {
        self.date()
    }
}

impl<T: TimeZone> IntoCalendarDay for DateTime<T> {
    fn into_calendar_day(self, zone: &Tz) -> NaiveDate {
        zone.calendar_day(&self)
    }
}

impl<T: TimeZone> IntoCalendarDay for &DateTime<T> {
    fn into_calendar_day(self, zone: &Tz) -> NaiveDate {
        zone.calendar_day(self)
    }
}
