use chrono::NaiveDate;
use derive_more::Constructor;
use elsa::FrozenBTreeMap;
use serde::Deserialize;
use std::fmt;

use crate::calendar::{CalendarSystem, Gregorian, IntoCalendarDay};
use crate::error::{Error, ErrorKind, Result};
use crate::month::MonthPage;

/// Position of a cell: the page (month) it belongs to and its index within that page.
#[derive(Clone, Copy, Constructor, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coordinate {
    pub page: usize,
    pub cell: usize,
}

impl Coordinate {
    pub fn row(&self, days_per_week: u32) -> usize {
        self.cell / days_per_week as usize
    }

    pub fn column(&self, days_per_week: u32) -> usize {
        self.cell % days_per_week as usize
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.cell)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GridOptions {
    /// Show the weeks of the first month that lie before the week of the start date.
    pub show_leading_weeks: bool,
    /// Show the weeks of the last month that lie after the week of the end date.
    pub show_trailing_weeks: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            show_leading_weeks: true,
            show_trailing_weeks: true,
        }
    }
}

/// Materialized cell sequences, filled on first lookup of a page.
#[derive(Default)]
struct CellCache(FrozenBTreeMap<usize, Vec<Option<NaiveDate>>>);

impl CellCache {
    fn lookup<F>(&self, page: usize, compute: F) -> &[Option<NaiveDate>]
    where
        F: FnOnce() -> Vec<Option<NaiveDate>>,
    {
        if let Some(cells) = self.0.get(&page) {
            cells
        } else {
            self.0.insert(page, compute())
        }
    }
}

/// Maps dates of a range onto month pages of week rows and back.
///
/// A page holds whole weeks. Cells of a page that belong to a neighbouring
/// month are padding and map to no date. With leading weeks hidden, the first
/// page starts at the week of the start date; with trailing weeks hidden, the
/// last page ends with the week of the end date.
///
/// The model never changes after construction. Cell sequences are computed the
/// first time a page is queried and kept for the lifetime of the model.
pub struct GridModel<C: CalendarSystem = Gregorian> {
    calendar: C,
    start_date: NaiveDate,
    end_date: NaiveDate,
    options: GridOptions,
    pages: Vec<MonthPage>,
    // date of cell 0 for every page
    zero_cells: Vec<NaiveDate>,
    cache: CellCache,
}

impl GridModel<Gregorian> {
    /// Grid over `start..=end` in the default calendar, showing leading and trailing weeks.
    pub fn new<S, E>(start: S, end: E) -> Result<Self>
    where
        S: IntoCalendarDay,
        E: IntoCalendarDay,
    {
        Self::builder(start, end).build()
    }

    pub fn builder<S, E>(start: S, end: E) -> GridBuilder<S, E, Gregorian>
    where
        S: IntoCalendarDay,
        E: IntoCalendarDay,
    {
        GridBuilder {
            start,
            end,
            calendar: Gregorian::default(),
            options: GridOptions::default(),
        }
    }
}

impl<C: CalendarSystem> GridModel<C> {
    pub fn with_options(
        start_date: NaiveDate,
        end_date: NaiveDate,
        calendar: C,
        options: GridOptions,
    ) -> Result<Self> {
        if start_date > end_date {
            return Err(Error::new(
                ErrorKind::InvalidDateOrdering,
                &format!("{} is after {}", start_date, end_date),
            ));
        }

        let page_count = calendar.months_between(start_date, end_date) + 1;
        let first_month = calendar.month_start(start_date).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidCalendarComputation,
                &format!("no month start for {}", start_date),
            )
        })?;

        let pages = (0..page_count as u32)
            .map(|index| {
                let date = calendar.add_months(first_month, index).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidCalendarComputation,
                        &format!("cannot step {} months from {}", index, first_month),
                    )
                })?;
                MonthPage::for_month_containing(date, &calendar)
            })
            .collect::<Result<Vec<_>>>()?;

        let zero_cells = pages
            .iter()
            .enumerate()
            .map(|(index, page)| {
                let anchor = if index == 0 && !options.show_leading_weeks {
                    start_date
                } else {
                    page.start()
                };
                calendar.week_start(anchor).ok_or_else(|| {
                    Error::new(
                        ErrorKind::InvalidCalendarComputation,
                        &format!("no week start for {}", anchor),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Grid {}..={} spans {} page(s) (leading weeks: {}, trailing weeks: {})",
            start_date,
            end_date,
            pages.len(),
            options.show_leading_weeks,
            options.show_trailing_weeks
        );

        Ok(GridModel {
            calendar,
            start_date,
            end_date,
            options,
            pages,
            zero_cells,
            cache: CellCache::default(),
        })
    }

    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn options(&self) -> GridOptions {
        self.options
    }

    pub fn days_per_week(&self) -> u32 {
        self.calendar.days_per_week()
    }

    pub fn pages(&self) -> &[MonthPage] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&MonthPage> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// First day of the month shown on page `index`.
    pub fn page_start_date(&self, index: usize) -> Option<NaiveDate> {
        self.page(index).map(MonthPage::start)
    }

    pub fn cell_count(&self, page: usize) -> usize {
        self.cells(page).len()
    }

    /// Cells of page `page` in display order; `None` marks padding.
    ///
    /// Out of range pages have no cells.
    pub fn cells(&self, page: usize) -> &[Option<NaiveDate>] {
        if page >= self.pages.len() {
            return &[];
        }

        self.cache.lookup(page, || self.compute_cells(page))
    }

    pub fn date_for(&self, coordinate: Coordinate) -> Option<NaiveDate> {
        self.cells(coordinate.page)
            .get(coordinate.cell)
            .copied()
            .flatten()
    }

    /// Cell showing `date`, if the grid shows it at all.
    pub fn coordinate_for<D: IntoCalendarDay>(&self, date: D) -> Option<Coordinate> {
        let date = date.into_calendar_day(&self.calendar.zone());

        let page = self.calendar.months_between(self.start_date, date);
        if page < 0 || page as usize >= self.pages.len() {
            return None;
        }
        let page = page as usize;

        let cell = self.calendar.days_between(self.zero_cells[page], date);
        if cell < 0 {
            return None;
        }
        let coordinate = Coordinate::new(page, cell as usize);

        if self.date_for(coordinate) == Some(date) {
            Some(coordinate)
        } else {
            None
        }
    }

    /// All cells holding a date, page by page.
    pub fn dates(&self) -> impl Iterator<Item = (Coordinate, NaiveDate)> + '_ {
        (0..self.pages.len()).flat_map(move |page| {
            self.cells(page)
                .iter()
                .enumerate()
                .filter_map(move |(cell, &date)| date.map(|d| (Coordinate::new(page, cell), d)))
        })
    }

    fn compute_cells(&self, index: usize) -> Vec<Option<NaiveDate>> {
        let page = &self.pages[index];
        let zero_cell = self.zero_cells[index];
        let days_per_week = self.calendar.days_per_week() as i64;

        let mut first = page.first_weekday_offset() as i64;
        let mut last = first + page.day_count() as i64 - 1;

        if index == 0 && !self.options.show_leading_weeks {
            // whole weeks in front of the one holding the start date
            let start_index = first + self.calendar.days_between(page.start(), self.start_date);
            let shift = (start_index / days_per_week) * days_per_week;
            first -= shift;
            last -= shift;
        }

        if index == self.pages.len() - 1 && !self.options.show_trailing_weeks {
            let end_index = self.calendar.days_between(zero_cell, self.end_date);
            let week_end_index = (end_index / days_per_week + 1) * days_per_week - 1;
            last = last.min(week_end_index);
        }

        if last < first.max(0) {
            log::warn!(
                "Page {} of grid {}..={} has no populated cells",
                index,
                self.start_date,
                self.end_date
            );
            return Vec::new();
        }

        let rows = (last + days_per_week) / days_per_week;
        log::debug!("Materializing {} week(s) for page {}", rows, index);

        (0..rows * days_per_week)
            .map(|cell| {
                if cell < first.max(0) || cell > last {
                    None
                } else {
                    let date = self.calendar.add_days(zero_cell, cell);
                    if date.is_none() {
                        log::warn!(
                            "Cell {} of page {} left empty: no date {} day(s) after {}",
                            cell,
                            index,
                            cell,
                            zero_cell
                        );
                    }
                    date
                }
            })
            .collect()
    }
}

impl<C: CalendarSystem + fmt::Debug> fmt::Debug for GridModel<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridModel")
            .field("calendar", &self.calendar)
            .field("start_date", &self.start_date)
            .field("end_date", &self.end_date)
            .field("options", &self.options)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}

/// Collects construction parameters for a [`GridModel`].
pub struct GridBuilder<S, E, C> {
    start: S,
    end: E,
    calendar: C,
    options: GridOptions,
}

impl<S, E, C> GridBuilder<S, E, C>
where
    S: IntoCalendarDay,
    E: IntoCalendarDay,
    C: CalendarSystem,
{
    pub fn calendar<C2: CalendarSystem>(self, calendar: C2) -> GridBuilder<S, E, C2> {
        GridBuilder {
            start: self.start,
            end: self.end,
            calendar,
            options: self.options,
        }
    }

    pub fn options(mut self, options: GridOptions) -> Self {
        self.options = options;
        self
    }

    pub fn show_leading_weeks(mut self, show: bool) -> Self {
        self.options.show_leading_weeks = show;
        self
    }

    pub fn show_trailing_weeks(mut self, show: bool) -> Self {
        self.options.show_trailing_weeks = show;
        self
    }

    pub fn build(self) -> Result<GridModel<C>> {
        let zone = self.calendar.zone();
        let start = self.start.into_calendar_day(&zone);
        let end = self.end.into_calendar_day(&zone);

        GridModel::with_options(start, end, self.calendar, self.options)
    }
}
