use chrono::{Datelike, Month, NaiveDate};
use num_traits::FromPrimitive;

use crate::calendar::CalendarSystem;
use crate::error::{Error, ErrorKind, Result};

/// Shape of one calendar month: where its first day sits within the week
/// and how many days it has.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthPage {
    start: NaiveDate,
    end: NaiveDate,
    first_weekday_offset: u32,
    day_count: u32,
}

impl MonthPage {
    pub fn for_month_containing<C: CalendarSystem>(date: NaiveDate, calendar: &C) -> Result<Self> {
        let fail = |what: &str| {
            Error::new(
                ErrorKind::InvalidCalendarComputation,
                &format!("no {} for month containing {}", what, date),
            )
        };

        let start = calendar
            .month_start(date)
            .ok_or_else(|| fail("month start"))?;
        let day_count = calendar
            .days_in_month(start)
            .filter(|&count| count > 0)
            .ok_or_else(|| fail("day count"))?;
        // 1-indexed to 0-indexed
        let first_weekday_offset = calendar
            .weekday_number(start)
            .filter(|&number| number >= 1 && number <= calendar.days_per_week())
            .ok_or_else(|| fail("weekday"))?
            - 1;
        let end = calendar
            .add_days(start, day_count as i64)
            .ok_or_else(|| fail("month end"))?;

        Ok(MonthPage {
            start,
            end,
            first_weekday_offset,
            day_count,
        })
    }

    /// First day of the month.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day of the following month.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn first_weekday_offset(&self) -> u32 {
        self.first_weekday_offset
    }

    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    pub fn month(&self) -> Month {
        Month::from_u32(self.start.month()).unwrap_or(Month::January)
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn contains(&self, date: &NaiveDate) -> bool {
        (self.start..self.end).contains(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Gregorian;

    fn page(year: i32, month: u32, day: u32) -> MonthPage {
        MonthPage::for_month_containing(
            NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            &Gregorian::default(),
        )
        .unwrap()
    }

    #[test]
    fn thirty_one_day_month() {
        let august = page(2017, 8, 4);

        // August 1, 2017 is a Tuesday
        assert_eq!(august.first_weekday_offset(), 2);
        assert_eq!(august.day_count(), 31);
        assert_eq!(august.start(), NaiveDate::from_ymd_opt(2017, 8, 1).unwrap());
        assert_eq!(august.end(), NaiveDate::from_ymd_opt(2017, 9, 1).unwrap());
        assert_eq!(august.month(), Month::August);
        assert_eq!(august.year(), 2017);
    }

    #[test]
    fn thirty_day_month() {
        let june = page(2017, 6, 25);

        // June 1, 2017 is a Thursday
        assert_eq!(june.first_weekday_offset(), 4);
        assert_eq!(june.day_count(), 30);
    }

    #[test]
    fn february() {
        let february = page(2017, 2, 10);
        assert_eq!(february.first_weekday_offset(), 3);
        assert_eq!(february.day_count(), 28);

        let leap = page(2016, 2, 14);
        assert_eq!(leap.first_weekday_offset(), 1);
        assert_eq!(leap.day_count(), 29);
    }

    #[test]
    fn offset_follows_week_start() {
        let august = MonthPage::for_month_containing(
            NaiveDate::from_ymd_opt(2017, 8, 31).unwrap(),
            &Gregorian::iso(),
        )
        .unwrap();

        assert_eq!(august.first_weekday_offset(), 1);
    }

    #[test]
    fn contains_only_own_days() {
        let august = page(2017, 8, 4);
        assert!(august.contains(&NaiveDate::from_ymd_opt(2017, 8, 1).unwrap()));
        assert!(august.contains(&NaiveDate::from_ymd_opt(2017, 8, 31).unwrap()));
        assert!(!august.contains(&NaiveDate::from_ymd_opt(2017, 9, 1).unwrap()));
        assert!(!august.contains(&NaiveDate::from_ymd_opt(2017, 7, 31).unwrap()));
    }

    #[test]
    fn last_representable_month_fails() {
        let err = MonthPage::for_month_containing(NaiveDate::MAX, &Gregorian::default())
            .unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidCalendarComputation));
    }
}
