extern crate calgrid as lib;

use chrono::{Datelike, NaiveDate, Weekday};
use flexi_logger::{FileSpec, Logger};
use itertools::Itertools;
use lib::{GridModel, Gregorian};
use std::path::PathBuf;
use structopt::StructOpt;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn parse_date(s: &str) -> lib::Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, DATE_FORMAT)?)
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "cg",
    about = "Calgrid - lays out a date range as month pages of week rows."
)]
pub struct Args {
    #[structopt(help = "first date of the range (YYYY-MM-DD)", parse(try_from_str = parse_date))]
    pub start: NaiveDate,

    #[structopt(help = "last date of the range (YYYY-MM-DD)", parse(try_from_str = parse_date))]
    pub end: NaiveDate,

    #[structopt(
        long = "no-leading-weeks",
        help = "hide weeks of the first month before the start date"
    )]
    pub no_leading_weeks: bool,

    #[structopt(
        long = "no-trailing-weeks",
        help = "hide weeks of the last month after the end date"
    )]
    pub no_trailing_weeks: bool,

    #[structopt(long = "week-start", help = "first day of the week, e.g. 'Mon'")]
    pub week_start: Option<Weekday>,

    #[structopt(
        long = "find",
        help = "print the cell of this date instead of the grid",
        parse(try_from_str = parse_date)
    )]
    pub find: Option<NaiveDate>,

    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn print_grid(grid: &GridModel<Gregorian>) {
    let days_per_week = grid.days_per_week() as usize;
    let header = grid
        .calendar()
        .weekdays()
        .map(|day| format!("{:>4}", day.to_string()))
        .join("");

    for page in 0..grid.page_count() {
        if let Some(month) = grid.page(page) {
            println!("{} {}", month.month().name(), month.year());
        }
        println!("{}", header);

        for week in grid.cells(page).chunks(days_per_week) {
            let row = week
                .iter()
                .map(|cell| match cell {
                    Some(date) => format!("{:>4}", date.day()),
                    None => format!("{:>4}", "."),
                })
                .join("");
            println!("{}", row);
        }
        println!();
    }
}

fn print_coordinate(grid: &GridModel<Gregorian>, date: NaiveDate) {
    let days_per_week = grid.days_per_week();
    match grid.coordinate_for(date) {
        Some(coordinate) => println!(
            "{}: page {}, cell {} (row {}, column {})",
            date,
            coordinate.page,
            coordinate.cell,
            coordinate.row(days_per_week),
            coordinate.column(days_per_week)
        ),
        None => println!("{}: not shown", date),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "warn"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    let _logger = logger.start()?;

    std::panic::set_hook(Box::new(move |info| {
        println!("Calgrid ran into a fatal error!");
        println!(
            "Consider filing an issue with a log file and the backtrace below at {}",
            env!("CARGO_PKG_REPOSITORY")
        );

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let mut calendar = config.calendar();
    if let Some(week_start) = args.week_start {
        calendar = calendar.with_week_start(week_start);
    }

    let mut options = config.grid;
    if args.no_leading_weeks {
        options.show_leading_weeks = false;
    }
    if args.no_trailing_weeks {
        options.show_trailing_weeks = false;
    }

    let grid = GridModel::with_options(args.start, args.end, calendar, options)?;

    match args.find {
        Some(date) => print_coordinate(&grid, date),
        None => print_grid(&grid),
    }

    Ok(())
}
