use chrono::NaiveDate;

use crate::calendar::{CalendarSystem, Gregorian, IntoCalendarDay};
use crate::error::Result;
use crate::grid::{Coordinate, GridModel, GridOptions};
use crate::tz::Tz;

/// Supplies the range and options a [`CalendarView`] builds its grid from.
pub trait DataSource<C: CalendarSystem + Default = Gregorian> {
    fn start_date(&self) -> NaiveDate;
    fn end_date(&self) -> NaiveDate;

    fn calendar(&self) -> C {
        C::default()
    }

    fn show_leading_weeks(&self) -> bool {
        true
    }

    fn show_trailing_weeks(&self) -> bool {
        true
    }
}

/// Hooks for user interaction with a [`CalendarView`].
pub trait Delegate {
    fn should_select(&mut self, _date: NaiveDate) -> bool {
        true
    }

    fn did_select(&mut self, _date: NaiveDate, _coordinate: Coordinate) {}

    fn did_deselect(&mut self, _date: NaiveDate, _coordinate: Coordinate) {}

    fn will_display(&mut self, _date: NaiveDate, _coordinate: Coordinate) {}
}

/// Anything showing a single date: day cells and page headers.
pub trait Dated {
    fn set_date(&mut self, date: Option<NaiveDate>);
}

/// Cells that format their date themselves and need to know the calendar.
pub trait DateFormatting<C: CalendarSystem> {
    fn set_calendar(&mut self, calendar: &C);
}

/// Headless state of a calendar view: the current grid and the selection.
pub struct CalendarView<C: CalendarSystem + Default = Gregorian> {
    model: Option<GridModel<C>>,
    selected_dates: Vec<NaiveDate>,
    allows_multiple_selection: bool,
    delegate: Option<Box<dyn Delegate>>,
}

impl<C: CalendarSystem + Default> Default for CalendarView<C> {
    fn default() -> Self {
        CalendarView {
            model: None,
            selected_dates: Vec::new(),
            allows_multiple_selection: false,
            delegate: None,
        }
    }
}

impl<C: CalendarSystem + Default> CalendarView<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delegate(mut self, delegate: Box<dyn Delegate>) -> Self {
        self.set_delegate(delegate);
        self
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn Delegate>) {
        self.delegate = Some(delegate);
    }

    pub fn allows_multiple_selection(&self) -> bool {
        self.allows_multiple_selection
    }

    pub fn set_allows_multiple_selection(&mut self, allow: bool) {
        self.allows_multiple_selection = allow;
    }

    pub fn model(&self) -> Option<&GridModel<C>> {
        self.model.as_ref()
    }

    /// Replace the grid with one built from `source`.
    ///
    /// On failure the view is left without a grid; the selection survives and
    /// reappears once a grid showing those dates is loaded.
    pub fn reload_data(&mut self, source: &dyn DataSource<C>) -> Result<()> {
        let options = GridOptions {
            show_leading_weeks: source.show_leading_weeks(),
            show_trailing_weeks: source.show_trailing_weeks(),
        };

        match GridModel::with_options(
            source.start_date(),
            source.end_date(),
            source.calendar(),
            options,
        ) {
            Ok(model) => {
                self.model = Some(model);
                Ok(())
            }
            Err(err) => {
                log::warn!("Unable to reload calendar view: {}", err);
                self.model = None;
                Err(err)
            }
        }
    }

    pub fn page_count(&self) -> usize {
        self.model.as_ref().map_or(0, GridModel::page_count)
    }

    pub fn cell_count(&self, page: usize) -> usize {
        self.model.as_ref().map_or(0, |model| model.cell_count(page))
    }

    pub fn date_at(&self, coordinate: Coordinate) -> Option<NaiveDate> {
        self.model.as_ref()?.date_for(coordinate)
    }

    pub fn header_date(&self, page: usize) -> Option<NaiveDate> {
        self.model.as_ref()?.page_start_date(page)
    }

    /// Cell to bring into view for `date`.
    pub fn scroll_target<D: IntoCalendarDay>(&self, date: D) -> Option<Coordinate> {
        self.model.as_ref()?.coordinate_for(date)
    }

    pub fn selected_dates(&self) -> &[NaiveDate] {
        &self.selected_dates
    }

    pub fn is_selected(&self, date: &NaiveDate) -> bool {
        self.selected_dates.contains(date)
    }

    /// Cells of the selected dates shown by the current grid.
    pub fn selected_coordinates(&self) -> Vec<Coordinate> {
        match &self.model {
            Some(model) => self
                .selected_dates
                .iter()
                .filter_map(|&date| model.coordinate_for(date))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn select_date<D: IntoCalendarDay>(&mut self, date: D) {
        let date = date.into_calendar_day(&self.zone());
        if self.is_selected(&date) {
            return;
        }

        if !self.allows_multiple_selection {
            self.selected_dates.clear();
        }
        self.selected_dates.push(date);
    }

    pub fn select_dates<D, I>(&mut self, dates: I)
    where
        D: IntoCalendarDay,
        I: IntoIterator<Item = D>,
    {
        for date in dates {
            self.select_date(date);
        }
    }

    pub fn deselect_date<D: IntoCalendarDay>(&mut self, date: D) {
        let date = date.into_calendar_day(&self.zone());
        self.selected_dates.retain(|selected| selected != &date);
    }

    pub fn select_cell(&mut self, coordinate: Coordinate) {
        if let Some(date) = self.date_at(coordinate) {
            self.select_date(date);
        }
    }

    pub fn deselect_cell(&mut self, coordinate: Coordinate) {
        if let Some(date) = self.date_at(coordinate) {
            self.deselect_date(date);
        }
    }

    /// User interaction with a cell. Returns whether the selection changed.
    ///
    /// Padding cells don't react, and without a delegate nothing gets selected.
    /// With multiple selection, tapping a selected cell deselects it.
    pub fn tap_cell(&mut self, coordinate: Coordinate) -> bool {
        let date = match self.date_at(coordinate) {
            Some(date) => date,
            None => return false,
        };

        if self.is_selected(&date) {
            if !self.allows_multiple_selection {
                return false;
            }
            self.deselect_date(date);
            if let Some(delegate) = self.delegate.as_mut() {
                delegate.did_deselect(date, coordinate);
            }
            return true;
        }

        // without a delegate nothing is selectable by tapping
        let allowed = self
            .delegate
            .as_mut()
            .map_or(false, |delegate| delegate.should_select(date));
        if !allowed {
            return false;
        }

        self.select_date(date);
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.did_select(date, coordinate);
        }
        true
    }

    /// Point `cell` at the date of `coordinate`. Returns whether the cell is interactive.
    pub fn configure_cell<T: Dated>(&mut self, cell: &mut T, coordinate: Coordinate) -> bool {
        let date = self.date_at(coordinate);
        cell.set_date(date);

        if let (Some(date), Some(delegate)) = (date, self.delegate.as_mut()) {
            delegate.will_display(date, coordinate);
        }
        date.is_some()
    }

    pub fn configure_formatting_cell<T>(&mut self, cell: &mut T, coordinate: Coordinate) -> bool
    where
        T: Dated + DateFormatting<C>,
    {
        if let Some(model) = &self.model {
            cell.set_calendar(model.calendar());
        }
        self.configure_cell(cell, coordinate)
    }

    pub fn configure_header<T: Dated>(&self, header: &mut T, page: usize) {
        header.set_date(self.header_date(page));
    }

    fn zone(&self) -> Tz {
        self.model
            .as_ref()
            .map_or_else(|| C::default().zone(), |model| model.calendar().zone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    struct Range {
        start: NaiveDate,
        end: NaiveDate,
        leading: bool,
    }

    impl DataSource for Range {
        fn start_date(&self) -> NaiveDate {
            self.start
        }

        fn end_date(&self) -> NaiveDate {
            self.end
        }

        fn show_leading_weeks(&self) -> bool {
            self.leading
        }
    }

    fn august() -> Range {
        Range {
            start: ymd(2017, 8, 4),
            end: ymd(2017, 9, 4),
            leading: true,
        }
    }

    fn loaded() -> CalendarView {
        let mut view = CalendarView::new();
        view.reload_data(&august()).unwrap();
        view
    }

    #[derive(Default)]
    struct Recorder {
        selected: Vec<NaiveDate>,
        deselected: Vec<NaiveDate>,
        displayed: usize,
        refuse: Option<NaiveDate>,
    }

    struct SharedRecorder(Rc<RefCell<Recorder>>);

    impl Delegate for SharedRecorder {
        fn should_select(&mut self, date: NaiveDate) -> bool {
            self.0.borrow().refuse != Some(date)
        }

        fn did_select(&mut self, date: NaiveDate, _coordinate: Coordinate) {
            self.0.borrow_mut().selected.push(date);
        }

        fn did_deselect(&mut self, date: NaiveDate, _coordinate: Coordinate) {
            self.0.borrow_mut().deselected.push(date);
        }

        fn will_display(&mut self, _date: NaiveDate, _coordinate: Coordinate) {
            self.0.borrow_mut().displayed += 1;
        }
    }

    #[derive(Default)]
    struct DayCell {
        date: Option<NaiveDate>,
        week_start: Option<chrono::Weekday>,
    }

    impl Dated for DayCell {
        fn set_date(&mut self, date: Option<NaiveDate>) {
            self.date = date;
        }
    }

    impl DateFormatting<Gregorian> for DayCell {
        fn set_calendar(&mut self, calendar: &Gregorian) {
            self.week_start = Some(calendar.first_weekday());
        }
    }

    #[test]
    fn empty_until_loaded() {
        let view: CalendarView = CalendarView::new();
        assert_eq!(view.page_count(), 0);
        assert_eq!(view.cell_count(0), 0);
        assert_eq!(view.date_at(Coordinate::new(0, 2)), None);
        assert_eq!(view.scroll_target(ymd(2017, 8, 4)), None);
    }

    #[test]
    fn reload_replaces_model() {
        let mut view = loaded();
        assert_eq!(view.page_count(), 2);
        assert_eq!(view.header_date(1), Some(ymd(2017, 9, 1)));

        let mut range = august();
        range.leading = false;
        range.end = range.start;
        view.reload_data(&range).unwrap();
        assert_eq!(view.page_count(), 1);
        assert_eq!(view.cell_count(0), 35);

        range.start = ymd(2017, 8, 5);
        assert!(view.reload_data(&range).is_err());
        assert!(view.model().is_none());
        assert_eq!(view.page_count(), 0);
    }

    #[test]
    fn single_selection_replaces_previous() {
        let mut view = loaded();
        view.select_date(ymd(2017, 8, 4));
        view.select_date(ymd(2017, 8, 9).and_hms_opt(18, 0, 0).unwrap());

        assert_eq!(view.selected_dates(), &[ymd(2017, 8, 9)]);
        assert_eq!(view.selected_coordinates(), vec![Coordinate::new(0, 10)]);
    }

    #[test]
    fn multiple_selection() {
        let mut view = loaded();
        view.set_allows_multiple_selection(true);
        view.select_dates(vec![ymd(2017, 8, 4), ymd(2017, 9, 1), ymd(2017, 8, 4)]);
        assert_eq!(view.selected_dates(), &[ymd(2017, 8, 4), ymd(2017, 9, 1)]);

        view.deselect_cell(Coordinate::new(1, 5));
        assert_eq!(view.selected_dates(), &[ymd(2017, 8, 4)]);

        view.select_cell(Coordinate::new(0, 0));
        assert_eq!(view.selected_dates(), &[ymd(2017, 8, 4)]);
    }

    #[test]
    fn selection_outside_grid_has_no_coordinate() {
        let mut view = loaded();
        view.set_allows_multiple_selection(true);
        view.select_date(ymd(2018, 1, 1));
        view.select_date(ymd(2017, 8, 31));

        assert_eq!(view.selected_dates().len(), 2);
        assert_eq!(view.selected_coordinates(), vec![Coordinate::new(0, 32)]);
    }

    #[test]
    fn taps_notify_delegate() {
        let recorder = Rc::new(RefCell::new(Recorder {
            refuse: Some(ymd(2017, 8, 15)),
            ..Recorder::default()
        }));
        let mut view = loaded().with_delegate(Box::new(SharedRecorder(recorder.clone())));
        view.set_allows_multiple_selection(true);

        // padding
        assert!(!view.tap_cell(Coordinate::new(0, 0)));
        assert!(view.tap_cell(Coordinate::new(0, 5)));
        // refused by the delegate
        assert!(!view.tap_cell(Coordinate::new(0, 16)));
        // second tap deselects
        assert!(view.tap_cell(Coordinate::new(0, 5)));

        let recorder = recorder.borrow();
        assert_eq!(recorder.selected, vec![ymd(2017, 8, 4)]);
        assert_eq!(recorder.deselected, vec![ymd(2017, 8, 4)]);
        assert!(view.selected_dates().is_empty());
    }

    #[test]
    fn taps_need_a_delegate() {
        let mut view = loaded();
        assert!(!view.tap_cell(Coordinate::new(0, 5)));
        assert!(view.selected_dates().is_empty());

        // programmatic selection still works
        view.select_cell(Coordinate::new(0, 5));
        assert_eq!(view.selected_dates(), &[ymd(2017, 8, 4)]);
    }

    #[test]
    fn configures_cells_and_headers() {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        let mut view = loaded().with_delegate(Box::new(SharedRecorder(recorder.clone())));
        let mut cell = DayCell::default();

        assert!(!view.configure_cell(&mut cell, Coordinate::new(0, 1)));
        assert_eq!(cell.date, None);

        assert!(view.configure_formatting_cell(&mut cell, Coordinate::new(0, 2)));
        assert_eq!(cell.date, Some(ymd(2017, 8, 1)));
        assert_eq!(cell.week_start, Some(chrono::Weekday::Sun));
        assert_eq!(recorder.borrow().displayed, 1);

        let mut header = DayCell::default();
        view.configure_header(&mut header, 1);
        assert_eq!(header.date, Some(ymd(2017, 9, 1)));
        view.configure_header(&mut header, 2);
        assert_eq!(header.date, None);
    }
}
