use chrono::{Datelike, Days, NaiveDate, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub name: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy)]
enum Rule {
    Fixed { month: u32, day: u32 },
    /// The `nth` (1-based) occurrence of `weekday` in `month`.
    NthWeekday { month: u32, weekday: Weekday, nth: u32 },
    LastWeekday { month: u32, weekday: Weekday },
}

const HOLIDAYS: &[(Rule, Holiday)] = &[
    (
        Rule::Fixed { month: 1, day: 1 },
        Holiday {
            name: "New Year's Day",
            description: "celebrating a new year and fresh starts",
        },
    ),
    (
        Rule::NthWeekday { month: 1, weekday: Weekday::Mon, nth: 3 },
        Holiday {
            name: "Martin Luther King Jr. Day",
            description: "honoring Dr. King and his work for equality and justice",
        },
    ),
    (
        Rule::Fixed { month: 2, day: 14 },
        Holiday {
            name: "Valentine's Day",
            description: "showing appreciation for loved ones, friends, and family",
        },
    ),
    (
        Rule::NthWeekday { month: 2, weekday: Weekday::Mon, nth: 3 },
        Holiday {
            name: "Presidents Day",
            description: "remembering U.S. presidents and leadership in history",
        },
    ),
    (
        Rule::LastWeekday { month: 5, weekday: Weekday::Mon },
        Holiday {
            name: "Memorial Day",
            description: "remembering service members who gave their lives",
        },
    ),
    (
        Rule::Fixed { month: 6, day: 19 },
        Holiday {
            name: "Juneteenth",
            description: "celebrating freedom and Black American history",
        },
    ),
    (
        Rule::Fixed { month: 7, day: 4 },
        Holiday {
            name: "Independence Day",
            description: "celebrating U.S. independence",
        },
    ),
    (
        Rule::NthWeekday { month: 9, weekday: Weekday::Mon, nth: 1 },
        Holiday {
            name: "Labor Day",
            description: "recognizing workers and the work people do",
        },
    ),
    (
        Rule::Fixed { month: 10, day: 31 },
        Holiday {
            name: "Halloween",
            description: "a day for costumes, creativity, and community fun",
        },
    ),
    (
        Rule::Fixed { month: 11, day: 11 },
        Holiday {
            name: "Veterans Day",
            description: "honoring military veterans and their service",
        },
    ),
    (
        Rule::NthWeekday { month: 11, weekday: Weekday::Thu, nth: 4 },
        Holiday {
            name: "Thanksgiving",
            description: "sharing gratitude, family time, and thankfulness",
        },
    ),
    (
        Rule::Fixed { month: 12, day: 25 },
        Holiday {
            name: "Christmas Day",
            description: "celebrating Christmas traditions, giving, and time with loved ones",
        },
    ),
];

impl Rule {
    fn matches(self, date: NaiveDate) -> bool {
        match self {
            Rule::Fixed { month, day } => date.month() == month && date.day() == day,
            Rule::NthWeekday {
                month,
                weekday,
                nth,
            } => {
                date.month() == month
                    && date.weekday() == weekday
                    && (date.day() - 1) / 7 + 1 == nth
            }
            Rule::LastWeekday { month, weekday } => {
                date.month() == month
                    && date.weekday() == weekday
                    && date
                        .checked_add_days(Days::new(7))
                        .map_or(true, |next| next.month() != month)
            }
        }
    }
}

/// The US holiday falling on `date`, if any.
pub fn holiday_on(date: NaiveDate) -> Option<Holiday> {
    HOLIDAYS
        .iter()
        .find(|(rule, _)| rule.matches(date))
        .map(|(_, holiday)| *holiday)
}

pub fn holiday_tomorrow(date: NaiveDate) -> Option<Holiday> {
    date.succ_opt().and_then(holiday_on)
}

pub fn day_phrase(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Fri => "Fri-YAY!",
        Weekday::Sat | Weekday::Sun => "weekend",
        _ => "day",
    }
}

pub fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
