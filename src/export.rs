use anyhow::Result;
use chrono::Datelike;

use crate::model::absence::Absence;
use crate::model::business_trip::BusinessTrip;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Filter applied to the approved-trip export.
#[derive(Debug, Clone)]
pub struct TripExportFilter {
    pub year: i32,
    /// 1-based month; `None` exports the whole year plus a monthly summary
    pub month: Option<u32>,
    pub project: Option<String>,
}

/// Total expense of a single trip: daily wage allowance over the trip days,
/// plus accommodation and other expenses.
pub fn trip_total(trip: &BusinessTrip) -> f64 {
    trip.wage * trip.total_days as f64 + trip.accommodation_money + trip.additional_expenses
}

fn matches_filter(trip: &BusinessTrip, filter: &TripExportFilter) -> bool {
    if trip.start_date.year() != filter.year {
        return false;
    }
    if let Some(month) = filter.month {
        if trip.start_date.month() != month {
            return false;
        }
    }
    if let Some(project) = &filter.project {
        if &trip.project_name != project {
            return false;
        }
    }
    true
}

/// Summed trip expenses per month (1-based) of the filter year.
pub fn monthly_totals(trips: &[BusinessTrip], filter: &TripExportFilter) -> [f64; 12] {
    let mut totals = [0.0; 12];
    for trip in trips.iter().filter(|t| matches_filter(t, filter)) {
        totals[trip.start_date.month0() as usize] += trip_total(trip);
    }
    totals
}

/// CSV export of approved business trips: one detail row per trip with its
/// computed total, a trailing total row, and (for whole-year exports) a
/// month-by-month summary section.
pub fn trips_csv(trips: &[BusinessTrip], filter: &TripExportFilter) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    // Detail rows and the monthly summary have different widths.
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(&mut buf);

    wtr.write_record([
        "Number",
        "Project",
        "Destination",
        "Issue date",
        "Days",
        "Daily allowance",
        "Wage",
        "Hotel",
        "Other",
        "Task",
        "Total",
    ])?;

    let mut grand_total = 0.0;
    for trip in trips.iter().filter(|t| matches_filter(t, filter)) {
        let total = trip_total(trip);
        grand_total += total;
        wtr.write_record([
            trip.issue_id.to_string(),
            trip.project_name.clone(),
            trip.destination.clone(),
            trip.issue_date.to_string(),
            trip.total_days.to_string(),
            format!("{:.2}", trip.wage * trip.total_days as f64),
            format!("{:.2}", trip.wage),
            format!("{:.2}", trip.accommodation_money),
            format!("{:.2}", trip.additional_expenses),
            trip.task.clone().unwrap_or_default(),
            format!("{total:.2}"),
        ])?;
    }

    wtr.write_record([
        "Total",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        "",
        &format!("{grand_total:.2}"),
    ])?;

    if filter.month.is_none() {
        wtr.write_record([""])?;
        wtr.write_record(["Month", "Total expenses"])?;
        for (index, total) in monthly_totals(trips, filter).iter().enumerate() {
            wtr.write_record([MONTH_NAMES[index], &format!("{total:.2}")])?;
        }
    }

    wtr.flush()?;
    drop(wtr);
    Ok(buf)
}

/// Month-by-employee matrix of approved absence days for one year: one row per
/// month, one column per employee, cells hold summed `days_taken`, with a
/// trailing per-employee total row.
pub fn absence_matrix_csv(
    absences: &[Absence],
    year: i32,
    absence_type: Option<&str>,
) -> Result<Vec<u8>> {
    let filtered: Vec<&Absence> = absences
        .iter()
        .filter(|a| a.start_date.year() == year)
        .filter(|a| absence_type.is_none_or(|t| a.absence_type == t))
        .collect();

    let mut names: Vec<&str> = filtered.iter().map(|a| a.user_name.as_str()).collect();
    names.sort();
    names.dedup();

    let mut cells = vec![[0u32; 12]; names.len()];
    for absence in &filtered {
        let column = names
            .iter()
            .position(|n| *n == absence.user_name)
            .expect("every filtered absence owner is in the name list");
        cells[column][absence.start_date.month0() as usize] += absence.days_taken as u32;
    }

    let mut buf = Vec::new();
    let mut wtr = csv::Writer::from_writer(&mut buf);

    let mut header = vec!["Month"];
    header.extend(names.iter().copied());
    wtr.write_record(&header)?;

    for month in 0..12 {
        let mut row = vec![MONTH_NAMES[month].to_string()];
        for employee in &cells {
            row.push(employee[month].to_string());
        }
        wtr.write_record(&row)?;
    }

    let mut totals = vec!["Total".to_string()];
    for employee in &cells {
        totals.push(employee.iter().sum::<u32>().to_string());
    }
    wtr.write_record(&totals)?;

    wtr.flush()?;
    drop(wtr);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn trip(project: &str, start: NaiveDate, days: u8, wage: f64, hotel: f64, other: f64) -> BusinessTrip {
        BusinessTrip {
            id: 1,
            issue_id: 1,
            issue_date: start,
            status: "approved".into(),
            project_name: project.into(),
            user_full_name: "John Doe".into(),
            task: None,
            start_date: start,
            end_date: start + chrono::Duration::days(days as i64 - 1),
            total_days: days,
            car_ownership: "company".into(),
            wage,
            accommodation_money: hotel,
            car_brand: None,
            car_model: None,
            car_registration_number: None,
            destination: "Varna".into(),
            departure_date: start,
            date_of_arrival: start,
            additional_expenses: other,
            car_usage_per_hundred_km: 0.0,
            price_per_liter: 0.0,
            expenses_responsibility: None,
            created: start.and_hms_opt(9, 0, 0).unwrap(),
            user_id: "u1".into(),
        }
    }

    fn absence(name: &str, start: NaiveDate, taken: u8, kind: &str) -> Absence {
        Absence {
            id: 1,
            user_id: "u1".into(),
            user_name: name.into(),
            absence_type: kind.into(),
            days_count: taken,
            days_taken: taken,
            status: "approved".into(),
            start_date: start,
            created: start.and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn trip_total_sums_allowances_and_expenses() {
        let t = trip("P", ymd(2026, 2, 10), 3, 40.0, 80.0, 25.0);
        assert_eq!(trip_total(&t), 40.0 * 3.0 + 80.0 + 25.0);
    }

    #[test]
    fn monthly_totals_bucket_by_start_month() {
        let trips = vec![
            trip("P", ymd(2026, 2, 10), 2, 10.0, 0.0, 0.0),
            trip("P", ymd(2026, 2, 20), 1, 10.0, 5.0, 0.0),
            trip("P", ymd(2026, 7, 1), 1, 10.0, 0.0, 0.0),
            trip("P", ymd(2025, 2, 1), 1, 99.0, 0.0, 0.0), // wrong year
        ];
        let filter = TripExportFilter {
            year: 2026,
            month: None,
            project: None,
        };
        let totals = monthly_totals(&trips, &filter);
        assert_eq!(totals[1], 20.0 + 15.0);
        assert_eq!(totals[6], 10.0);
        assert_eq!(totals[0], 0.0);
    }

    #[test]
    fn trips_csv_filters_by_project_and_month() {
        let trips = vec![
            trip("Alpha", ymd(2026, 2, 10), 2, 10.0, 0.0, 0.0),
            trip("Beta", ymd(2026, 2, 11), 2, 10.0, 0.0, 0.0),
            trip("Alpha", ymd(2026, 3, 1), 2, 10.0, 0.0, 0.0),
        ];
        let filter = TripExportFilter {
            year: 2026,
            month: Some(2),
            project: Some("Alpha".into()),
        };
        let csv = String::from_utf8(trips_csv(&trips, &filter).unwrap()).unwrap();
        assert!(csv.contains("Alpha"));
        assert!(!csv.contains("Beta"));
        // one header, one detail row, one total row; no monthly summary
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.lines().last().unwrap().starts_with("Total"));
    }

    #[test]
    fn trips_csv_whole_year_appends_monthly_summary() {
        let trips = vec![trip("Alpha", ymd(2026, 2, 10), 2, 10.0, 0.0, 0.0)];
        let filter = TripExportFilter {
            year: 2026,
            month: None,
            project: None,
        };
        let csv = String::from_utf8(trips_csv(&trips, &filter).unwrap()).unwrap();
        assert!(csv.contains("Month,Total expenses"));
        assert!(csv.contains("February,20.00"));
    }

    #[test]
    fn absence_matrix_sums_days_per_employee_and_month() {
        let absences = vec![
            absence("Anna", ymd(2026, 1, 5), 3, "personal"),
            absence("Anna", ymd(2026, 1, 20), 2, "personal"),
            absence("Boris", ymd(2026, 4, 1), 4, "sick"),
            absence("Anna", ymd(2025, 1, 5), 9, "personal"), // wrong year
        ];
        let csv = String::from_utf8(absence_matrix_csv(&absences, 2026, None).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Month,Anna,Boris");
        assert_eq!(lines[1], "January,5,0");
        assert_eq!(lines[4], "April,0,4");
        assert_eq!(lines[13], "Total,5,4");
    }

    #[test]
    fn absence_matrix_filters_by_type() {
        let absences = vec![
            absence("Anna", ymd(2026, 1, 5), 3, "personal"),
            absence("Boris", ymd(2026, 4, 1), 4, "sick"),
        ];
        let csv =
            String::from_utf8(absence_matrix_csv(&absences, 2026, Some("sick")).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Month,Boris");
        assert_eq!(lines[13], "Total,4");
    }
}
