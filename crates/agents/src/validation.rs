//! Intake answer normalization.
//!
//! Dates become `YYYY-MM-DD`, times `HH:MM` (24h), ages a bare integer.
//! On failure the returned message is shown to the user before the step's
//! prompt is repeated.

use std::sync::LazyLock;

use chrono::Datelike;
use regex::Regex;

use ca_domain::AnswerFormat;

static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?([A-Za-z]+),?\s+(\d{4})")
        .expect("valid day-month-year regex")
});
static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Za-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})")
        .expect("valid month-day-year regex")
});
static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid iso date regex"));
static YEAR_FIRST_SLASH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").expect("valid year-first date regex")
});
static MONTH_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})([/.-])(\d{1,2})([/.-])(\d{2}|\d{4})$")
        .expect("valid month-first date regex")
});
static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}):(\d{2})(?:\s*(am|pm))?$").expect("valid clock regex")
});
static HOUR_MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})\s*(am|pm)$").expect("valid hour regex"));
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)").expect("valid number regex"));

const DATE_HELP: &str = "Please provide a valid date in YYYY-MM-DD format. Examples: 2023-05-15, 05/15/2023, May 15, 2023.";
const DATE_RANGE: &str = "Please provide a valid date with month between 1-12 and day between 1-31.";
const TIME_HELP: &str = "Please provide a valid time in HH:MM format, or with AM/PM. Examples: 14:30, 2:30 PM, noon.";
const HOUR_RANGE: &str = "Please provide a valid hour between 0-23 (or 1-12 with AM/PM).";

/// Normalize `input` for the given format. `Text` answers are trimmed and
/// must not be empty.
pub fn normalize(format: AnswerFormat, input: &str) -> Result<String, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("The answer was empty.".into());
    }
    match format {
        AnswerFormat::Text => Ok(input.to_owned()),
        AnswerFormat::Date => normalize_date(input),
        AnswerFormat::Time => normalize_time(input),
        AnswerFormat::Age => normalize_age(input),
    }
}

fn month_number(name: &str) -> Option<u32> {
    let m = match name.to_ascii_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(m)
}

fn ymd(year: &str, month: u32, day: &str) -> Result<String, String> {
    let day: u32 = day.parse().map_err(|_| DATE_HELP.to_owned())?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(DATE_RANGE.into());
    }
    Ok(format!("{year}-{month:02}-{day:02}"))
}

/// Two-digit years within the current century unless they would land in
/// the future, in which case the previous century is used.
fn expand_year(short: &str) -> Result<String, String> {
    let yy: i32 = short.parse().map_err(|_| DATE_HELP.to_owned())?;
    let now = chrono::Utc::now().year();
    let century = now / 100;
    let full = if yy > now % 100 {
        (century - 1) * 100 + yy
    } else {
        century * 100 + yy
    };
    Ok(full.to_string())
}

fn normalize_date(input: &str) -> Result<String, String> {
    if let Some(c) = DAY_MONTH_YEAR.captures(input) {
        if let Some(month) = month_number(&c[2]) {
            return ymd(&c[3], month, &c[1]);
        }
    }
    if let Some(c) = MONTH_DAY_YEAR.captures(input) {
        if let Some(month) = month_number(&c[1]) {
            return ymd(&c[3], month, &c[2]);
        }
    }
    if let Some(c) = ISO_DATE.captures(input).or_else(|| YEAR_FIRST_SLASH.captures(input)) {
        let month: u32 = c[2].parse().map_err(|_| DATE_HELP.to_owned())?;
        return ymd(&c[1], month, &c[3]);
    }
    if let Some(c) = MONTH_FIRST.captures(input) {
        // Mixed separators ("05/15-2023") are not a date.
        if c[2] == c[4] {
            let month: u32 = c[1].parse().map_err(|_| DATE_HELP.to_owned())?;
            let year = if c[5].len() == 2 {
                expand_year(&c[5])?
            } else {
                c[5].to_owned()
            };
            return ymd(&year, month, &c[3]);
        }
    }
    Err(DATE_HELP.into())
}

fn to_24h(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem {
        Some("pm") if hour < 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    }
}

fn normalize_time(input: &str) -> Result<String, String> {
    let lower = input.to_ascii_lowercase();

    if let Some(c) = CLOCK.captures(&lower) {
        let hour: u32 = c[1].parse().map_err(|_| TIME_HELP.to_owned())?;
        let minute: u32 = c[2].parse().map_err(|_| TIME_HELP.to_owned())?;
        let hour = to_24h(hour, c.get(3).map(|m| m.as_str()));
        if hour > 23 {
            return Err(HOUR_RANGE.into());
        }
        if minute > 59 {
            return Err("Please provide a valid minute between 0-59.".into());
        }
        return Ok(format!("{hour:02}:{minute:02}"));
    }

    if let Some(c) = HOUR_MERIDIEM.captures(&lower) {
        let hour: u32 = c[1].parse().map_err(|_| TIME_HELP.to_owned())?;
        let hour = to_24h(hour, Some(&c[2]));
        if hour > 23 {
            return Err(HOUR_RANGE.into());
        }
        return Ok(format!("{hour:02}:00"));
    }

    // Longer words first: "afternoon" contains "noon", "midnight" contains "night".
    const DESCRIPTIVE: [(&str, &str); 6] = [
        ("midnight", "00:00"),
        ("afternoon", "15:00"),
        ("noon", "12:00"),
        ("morning", "09:00"),
        ("evening", "19:00"),
        ("night", "22:00"),
    ];
    DESCRIPTIVE
        .iter()
        .find(|(word, _)| lower.contains(word))
        .map(|(_, t)| (*t).to_owned())
        .ok_or_else(|| TIME_HELP.to_owned())
}

fn normalize_age(input: &str) -> Result<String, String> {
    let c = NUMBER
        .captures(input)
        .ok_or_else(|| "Please provide a valid numeric age. Example: 35.".to_owned())?;
    match c[1].parse::<u32>() {
        Ok(age) if age <= 120 => Ok(age.to_string()),
        _ => Err("Please provide a valid age between 0-120 years.".into()),
    }
}
