use chrono::{Local, NaiveDate};

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";
pub const API_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_date(date_str: &str) -> Option<NaiveDate> {
    let date_str = date_str.trim();
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%Y/%m/%d"))
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%d-%m-%Y"))
        .or_else(|_| NaiveDate::parse_from_str(date_str, "%d/%m/%Y"))
        .ok()
}

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub fn api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Resolves an optional CLI date argument, defaulting to today.
pub fn resolve_date(input: Option<&str>) -> Result<NaiveDate, String> {
    match input {
        None => Ok(today()),
        Some(raw) => parse_date(raw).ok_or_else(|| format!("Invalid date: {raw}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_iso_and_day_first_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07"), Some(expected));
        assert_eq!(parse_date("2024/03/07"), Some(expected));
        assert_eq!(parse_date("07-03-2024"), Some(expected));
        assert_eq!(parse_date("07/03/2024"), Some(expected));
        assert_eq!(parse_date("not a date"), None);
    }

    #[test]
    fn renders_display_and_api_forms() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(display_date(date), "07/03/2024");
        assert_eq!(api_date(date), "2024-03-07");
    }

    #[test]
    fn resolve_date_reports_bad_input() {
        assert!(resolve_date(Some("31/02/2024")).is_err());
        assert_eq!(resolve_date(None).unwrap(), today());
    }
}
