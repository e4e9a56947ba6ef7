use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::model::holiday_day::HolidayDay;

/// Orthodox Easter Sunday for the given year (Gregorian calendar).
///
/// Meeus' Julian algorithm; the +13 days move the Julian date onto the
/// Gregorian calendar, valid for 1900..=2099.
pub fn orthodox_easter(year: i32) -> NaiveDate {
    let a = year % 4;
    let b = year % 7;
    let c = year % 19;
    let d = (19 * c + 15) % 30;
    let e = (2 * a + 4 * b - d + 34) % 7;
    let month = (d + e + 114) / 31;
    let day = (d + e + 114) % 31 + 1;

    let julian = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .expect("easter congruence yields a valid March/April date");
    julian + Duration::days(13)
}

/// The statutory holiday set for a year: fixed national holidays, the four
/// Easter-derived days, and a compensating Monday for every holiday that lands
/// on a weekend (skipped when that Monday is already a holiday).
pub fn official_holidays(year: i32) -> Vec<HolidayDay> {
    let fixed = [
        (1, 1, "New Year's Day"),
        (3, 3, "Liberation Day"),
        (5, 1, "Labour Day"),
        (5, 6, "St George's Day"),
        (5, 24, "Day of Bulgarian Education and Culture"),
        (9, 6, "Unification Day"),
        (9, 22, "Independence Day"),
        (12, 24, "Christmas Eve"),
        (12, 25, "Christmas Day"),
        (12, 26, "Christmas Day"),
    ];

    let mut holidays: Vec<HolidayDay> = fixed
        .iter()
        .map(|&(month, day, name)| {
            let date = NaiveDate::from_ymd_opt(year, month, day)
                .expect("fixed holiday dates are valid for every year");
            HolidayDay::official(name, date)
        })
        .collect();

    // When Easter lands next to a fixed holiday (e.g. Holy Saturday on
    // Labour Day) the date is kept once, under the fixed holiday's name.
    let easter = orthodox_easter(year);
    let easter_days = [
        ("Good Friday", easter - Duration::days(2)),
        ("Holy Saturday", easter - Duration::days(1)),
        ("Easter Sunday", easter),
        ("Easter Monday", easter + Duration::days(1)),
    ];
    for (name, date) in easter_days {
        if holidays.iter().all(|h| h.date != date) {
            holidays.push(HolidayDay::official(name, date));
        }
    }

    // Weekend holidays earn a compensating Monday, named after the original.
    let base: Vec<(NaiveDate, String)> = holidays
        .iter()
        .map(|h| (h.date, h.name.clone()))
        .collect();
    for (date, name) in base {
        if !is_weekend(date) {
            continue;
        }
        let mut monday = date;
        while monday.weekday() != Weekday::Mon {
            monday += Duration::days(1);
        }
        if holidays.iter().all(|h| h.date != monday) {
            holidays.push(HolidayDay::official(format!("Day off for {name}"), monday));
        }
    }

    holidays
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of non-working days inside `[start, start + days)`: Saturdays,
/// Sundays and holiday dates. A holiday that itself falls on a weekend counts
/// once, not twice.
pub fn non_working_days(start: NaiveDate, days: u8, holidays: &[HolidayDay]) -> u8 {
    let mut count = 0;
    for offset in 0..days as i64 {
        let date = start + Duration::days(offset);
        if is_weekend(date) || holidays.iter().any(|h| h.date == date) {
            count += 1;
        }
    }
    count
}

/// Working days actually consumed by a personal-leave request of `days_count`
/// calendar days starting at `start`.
pub fn leave_days_taken(start: NaiveDate, days_count: u8, holidays: &[HolidayDay]) -> u8 {
    days_count - non_working_days(start, days_count, holidays)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn easter_matches_known_years() {
        assert_eq!(orthodox_easter(2024), ymd(2024, 5, 5));
        assert_eq!(orthodox_easter(2025), ymd(2025, 4, 20));
        assert_eq!(orthodox_easter(2026), ymd(2026, 4, 12));
    }

    #[test]
    fn official_set_has_fixed_and_easter_days() {
        let holidays = official_holidays(2026);
        let dates: Vec<NaiveDate> = holidays.iter().map(|h| h.date).collect();

        assert!(dates.contains(&ymd(2026, 1, 1)));
        assert!(dates.contains(&ymd(2026, 3, 3)));
        assert!(dates.contains(&ymd(2026, 12, 26)));
        // Easter Sunday 2026-04-12 plus Friday, Saturday, Monday around it
        assert!(dates.contains(&ymd(2026, 4, 10)));
        assert!(dates.contains(&ymd(2026, 4, 11)));
        assert!(dates.contains(&ymd(2026, 4, 12)));
        assert!(dates.contains(&ymd(2026, 4, 13)));
    }

    #[test]
    fn no_duplicate_dates_in_official_set() {
        for year in 2020..=2030 {
            let holidays = official_holidays(year);
            let mut dates: Vec<NaiveDate> = holidays.iter().map(|h| h.date).collect();
            dates.sort();
            dates.dedup();
            assert_eq!(dates.len(), holidays.len(), "duplicates in {year}");
        }
    }

    #[test]
    fn weekend_holidays_get_a_compensating_monday() {
        // 2022-01-01 was a Saturday, 2022-05-01 a Sunday.
        let holidays = official_holidays(2022);
        let dates: Vec<NaiveDate> = holidays.iter().map(|h| h.date).collect();
        assert!(dates.contains(&ymd(2022, 1, 3)));
        assert!(dates.contains(&ymd(2022, 5, 2)));

        let comp = holidays
            .iter()
            .find(|h| h.date == ymd(2022, 1, 3))
            .unwrap();
        assert!(comp.name.contains("New Year's Day"));
    }

    #[test]
    fn compensation_skips_dates_already_in_the_set() {
        // Easter Sunday always precedes Easter Monday, so no extra Monday
        // may be added for it.
        for year in 2020..=2030 {
            let easter = orthodox_easter(year);
            let monday = easter + Duration::days(1);
            let count = official_holidays(year)
                .iter()
                .filter(|h| h.date == monday)
                .count();
            assert_eq!(count, 1, "year {year}");
        }
    }

    #[test]
    fn non_working_days_counts_weekends() {
        // 2026-01-10 is a Saturday; five days cover Sat, Sun and three weekdays.
        let count = non_working_days(ymd(2026, 1, 10), 5, &[]);
        assert_eq!(count, 2);
        assert_eq!(leave_days_taken(ymd(2026, 1, 10), 5, &[]), 3);
    }

    #[test]
    fn non_working_days_counts_holidays_inside_the_range() {
        // 2026-03-03 (Liberation Day) is a Tuesday.
        let holidays = official_holidays(2026);
        let count = non_working_days(ymd(2026, 3, 2), 5, &holidays);
        // Mon..Fri window with one holiday inside
        assert_eq!(count, 1);
    }

    #[test]
    fn weekend_holiday_is_counted_once() {
        // A custom holiday on a Saturday must not be double-counted.
        let saturday = ymd(2026, 1, 10);
        let holidays = vec![HolidayDay::official("Company day", saturday)];
        assert_eq!(non_working_days(saturday, 1, &holidays), 1);
        assert_eq!(non_working_days(saturday, 2, &holidays), 2);
    }
}
