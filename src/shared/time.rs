use std::{fmt::Display, str::FromStr};

use chrono::{Local, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

const HOUR_TO_SEC: u32 = 60 * 60;
const MINUTE_TO_SEC: u32 = 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unable to recognize time stamp <{0}>")]
    InvalidTimestamp(String),
}

/// A same-day wall clock time, stored as seconds since midnight.
///
/// There is no date component: comparisons are only meaningful inside a
/// single calendar day, and `24:00:00` is the latest representable value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(24 * HOUR_TO_SEC);

    pub fn now() -> Self {
        let now = Local::now();
        Self(now.num_seconds_from_midnight())
    }

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Parses `H:MM` or `H:MM:SS`, optionally followed by `AM`/`PM`.
    ///
    /// Without a meridiem hours run 0 to 24 (24 only as `24:00`), with one
    /// they run 1 to 12. Minutes and seconds are always two digits.
    pub fn parse(time: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidTimestamp(time.to_string());
        let (clock, meridiem) = split_meridiem(time.trim());

        let mut split = clock.split(':');
        let hours = parse_component(split.next(), 1..=2).ok_or_else(invalid)?;
        let minutes = parse_component(split.next(), 2..=2).ok_or_else(invalid)?;
        let seconds = match split.next() {
            Some(value) => parse_component(Some(value), 2..=2).ok_or_else(invalid)?,
            None => 0,
        };
        if split.next().is_some() || minutes > 59 || seconds > 59 {
            return Err(invalid());
        }

        let hours = match meridiem {
            Some(meridiem) => {
                if !(1..=12).contains(&hours) {
                    return Err(invalid());
                }
                match (meridiem, hours) {
                    (Meridiem::Am, 12) => 0,
                    (Meridiem::Am, h) => h,
                    (Meridiem::Pm, 12) => 12,
                    (Meridiem::Pm, h) => h + 12,
                }
            }
            None if hours == 24 && (minutes > 0 || seconds > 0) => return Err(invalid()),
            None if hours > 24 => return Err(invalid()),
            None => hours,
        };

        Ok(Self(hours * HOUR_TO_SEC + minutes * MINUTE_TO_SEC + seconds))
    }

    /// Signed whole minutes from `self` until `other`, rounded up.
    ///
    /// Negative when `other` is earlier in the day. No wrapping past
    /// midnight is attempted.
    pub fn minutes_until(&self, other: TimeOfDay) -> i64 {
        let diff = other.0 as i64 - self.0 as i64;
        let minutes = diff.div_euclid(MINUTE_TO_SEC as i64);
        if diff.rem_euclid(MINUTE_TO_SEC as i64) != 0 {
            minutes + 1
        } else {
            minutes
        }
    }

    pub fn to_hms_string(&self) -> String {
        let h = self.0 / HOUR_TO_SEC;
        let m = (self.0 % HOUR_TO_SEC) / MINUTE_TO_SEC;
        let s = self.0 % MINUTE_TO_SEC;
        format!("{:02}:{:02}:{:02}", h, m, s)
    }
}

/// Whole minutes from `a` until `b`, see [`TimeOfDay::minutes_until`].
pub fn minutes_between(a: &str, b: &str) -> Result<i64, Error> {
    let a = TimeOfDay::parse(a)?;
    let b = TimeOfDay::parse(b)?;
    Ok(a.minutes_until(b))
}

#[derive(Debug, Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

fn split_meridiem(time: &str) -> (&str, Option<Meridiem>) {
    if time.len() < 2 || !time.is_char_boundary(time.len() - 2) {
        return (time, None);
    }
    let (clock, suffix) = time.split_at(time.len() - 2);
    if suffix.eq_ignore_ascii_case("am") {
        (clock.trim_end(), Some(Meridiem::Am))
    } else if suffix.eq_ignore_ascii_case("pm") {
        (clock.trim_end(), Some(Meridiem::Pm))
    } else {
        (time, None)
    }
}

fn parse_component(value: Option<&str>, digits: std::ops::RangeInclusive<usize>) -> Option<u32> {
    let value = value?;
    if !digits.contains(&value.len()) || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hms_string())
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(de::Error::custom)
    }
}

/// A length of time, stored in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Duration(u32);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub const fn from_seconds(secs: u32) -> Self {
        Self(secs)
    }

    /// Saturates at `u32::MAX` seconds, well past any same-day window.
    pub const fn from_minutes(minutes: u32) -> Self {
        Self(minutes.saturating_mul(MINUTE_TO_SEC))
    }

    pub const fn from_hours(hours: u32) -> Self {
        Self(hours.saturating_mul(HOUR_TO_SEC))
    }

    pub const fn as_seconds(&self) -> u32 {
        self.0
    }

    /// Whole minutes, rounded down.
    pub const fn as_minutes(&self) -> i64 {
        (self.0 / MINUTE_TO_SEC) as i64
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} min", self.as_minutes())
    }
}

#[test]
fn parse_unparse_1() {
    let time = "00:00:00";
    let stime = TimeOfDay::parse(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn parse_unparse_2() {
    let time = "12:30:30";
    let stime = TimeOfDay::parse(time).unwrap();
    assert_eq!(time, stime.to_hms_string())
}

#[test]
fn valid_time_test_1() {
    assert_eq!(TimeOfDay::parse("8:05").unwrap().as_seconds(), 29_100);
}

#[test]
fn valid_time_test_2() {
    assert_eq!(TimeOfDay::parse("01:01:30").unwrap().as_seconds(), 3690);
}

#[test]
fn valid_time_test_3() {
    assert_eq!(TimeOfDay::parse("24:00").unwrap(), TimeOfDay::END_OF_DAY);
}

#[test]
fn huge_durations_saturate_test() {
    assert_eq!(Duration::from_minutes(u32::MAX).as_seconds(), u32::MAX);
    assert_eq!(Duration::from_hours(100_000_000).as_seconds(), u32::MAX);
    assert!(Duration::from_minutes(100_000_000) > Duration::from_hours(24));
}

#[test]
fn meridiem_test() {
    assert_eq!(
        TimeOfDay::parse("8:05 PM").unwrap(),
        TimeOfDay::parse("20:05").unwrap()
    );
    assert_eq!(TimeOfDay::parse("12:15am").unwrap().as_seconds(), 900);
    assert_eq!(
        TimeOfDay::parse("12:15 pm").unwrap(),
        TimeOfDay::parse("12:15").unwrap()
    );
}

#[test]
fn invalid_time_test_1() {
    assert!(matches!(
        TimeOfDay::parse("25:99"),
        Err(Error::InvalidTimestamp(_))
    ));
}

#[test]
fn invalid_time_test_2() {
    assert!(matches!(
        TimeOfDay::parse("noon-ish"),
        Err(Error::InvalidTimestamp(_))
    ));
}

#[test]
fn invalid_time_test_3() {
    for time in ["", "08", "08:5", "08:00:0a", "24:01", "13:00 PM", "0:30 AM", "1:2:3:4"] {
        assert!(TimeOfDay::parse(time).is_err(), "{time} should not parse");
    }
}

#[test]
fn minutes_between_test() {
    assert_eq!(minutes_between("07:55", "08:10").unwrap(), 15);
    assert_eq!(minutes_between("08:10", "07:55").unwrap(), -15);
    // Partial minutes round up toward the later time
    assert_eq!(minutes_between("08:00:00", "08:00:01").unwrap(), 1);
    assert_eq!(minutes_between("08:00:01", "08:00:00").unwrap(), 0);
    assert!(minutes_between("08:00", "").is_err());
}
