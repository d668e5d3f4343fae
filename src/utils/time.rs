use chrono::{DateTime, Local, NaiveDate, Utc};

/// Calendar date used in download filenames, in the caller's local zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `dd/mm/yyyy` as printed on report pages.
pub fn display_date(dt: DateTime<Utc>) -> String {
    dt.format("%d/%m/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_date_is_day_first() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 9, 10, 0, 0).unwrap();
        assert_eq!(display_date(dt), "09/03/2026");
    }
}
