use jiff::civil::{Time, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("unknown day token {0:?}")]
    UnknownDay(String),

    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

/// Operating window of a route. Parsing rejects malformed day/time tokens;
/// semantic problems (no days, end not after start) are reported by
/// `issues` so validators can surface them as findings instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule", into = "RawSchedule")]
pub struct RouteSchedule {
    days: Vec<Weekday>,
    start: Time,
    end: Time,
}

impl RouteSchedule {
    pub fn new(days: Vec<Weekday>, start: Time, end: Time) -> Self {
        RouteSchedule { days, start, end }
    }

    /// Parses `"mon,tue,wed"`-style day lists and `HH:MM` times.
    pub fn parse(days: &str, start: &str, end: &str) -> Result<Self, ScheduleError> {
        let days = days
            .split(',')
            .map(|token| parse_day(token.trim()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteSchedule {
            days,
            start: parse_time(start)?,
            end: parse_time(end)?,
        })
    }

    pub fn days(&self) -> &[Weekday] {
        &self.days
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn operates_on(&self, weekday: Weekday) -> bool {
        self.days.contains(&weekday)
    }

    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.days.is_empty() {
            issues.push(String::from("schedule lists no operating days"));
        }

        if self.end <= self.start {
            issues.push(format!(
                "schedule end {} is not after start {}",
                self.end, self.start
            ));
        }

        issues
    }
}

impl Default for RouteSchedule {
    /// Weekdays, 08:00 to 18:00.
    fn default() -> Self {
        RouteSchedule {
            days: vec![
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
            ],
            start: Time::constant(8, 0, 0, 0),
            end: Time::constant(18, 0, 0, 0),
        }
    }
}

fn parse_day(token: &str) -> Result<Weekday, ScheduleError> {
    match token.to_lowercase().as_str() {
        "mon" | "monday" => Ok(Weekday::Monday),
        "tue" | "tuesday" => Ok(Weekday::Tuesday),
        "wed" | "wednesday" => Ok(Weekday::Wednesday),
        "thu" | "thursday" => Ok(Weekday::Thursday),
        "fri" | "friday" => Ok(Weekday::Friday),
        "sat" | "saturday" => Ok(Weekday::Saturday),
        "sun" | "sunday" => Ok(Weekday::Sunday),
        _ => Err(ScheduleError::UnknownDay(token.to_string())),
    }
}

fn parse_time(token: &str) -> Result<Time, ScheduleError> {
    let invalid = || ScheduleError::InvalidTime(token.to_string());

    let (hour, minute) = token.split_once(':').ok_or_else(invalid)?;
    let hour: i8 = hour.parse().map_err(|_| invalid())?;
    let minute: i8 = minute.parse().map_err(|_| invalid())?;

    Time::new(hour, minute, 0, 0).map_err(|_| invalid())
}

fn day_token(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "mon",
        Weekday::Tuesday => "tue",
        Weekday::Wednesday => "wed",
        Weekday::Thursday => "thu",
        Weekday::Friday => "fri",
        Weekday::Saturday => "sat",
        Weekday::Sunday => "sun",
    }
}

#[derive(Serialize, Deserialize)]
struct RawSchedule {
    days: String,
    start: String,
    end: String,
}

impl TryFrom<RawSchedule> for RouteSchedule {
    type Error = ScheduleError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        RouteSchedule::parse(&raw.days, &raw.start, &raw.end)
    }
}

impl From<RouteSchedule> for RawSchedule {
    fn from(schedule: RouteSchedule) -> Self {
        RawSchedule {
            days: schedule
                .days
                .iter()
                .map(|day| day_token(*day))
                .collect::<Vec<_>>()
                .join(","),
            start: format!("{:02}:{:02}", schedule.start.hour(), schedule.start.minute()),
            end: format!("{:02}:{:02}", schedule.end.hour(), schedule.end.minute()),
        }
    }
}
