use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Next delivery-attempt date after a failed attempt: the next calendar
/// day, pushed past the weekend since the carrier does not attempt
/// residential delivery on Saturday or Sunday.
pub fn next_business_day(after: NaiveDate) -> NaiveDate {
    let candidate = after + Days::new(1);
    match candidate.weekday() {
        Weekday::Sat => candidate + Days::new(2),
        Weekday::Sun => candidate + Days::new(1),
        _ => candidate,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::next_business_day;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn friday_attempt_retries_monday() {
        // 2025-01-03 is a Friday; next day is Saturday, skip to Monday.
        assert_eq!(next_business_day(date(2025, 1, 3)), date(2025, 1, 6));
    }

    #[test]
    fn saturday_attempt_retries_monday() {
        // next day is Sunday, skip to Monday
        assert_eq!(next_business_day(date(2025, 1, 4)), date(2025, 1, 6));
    }

    #[test]
    fn weekday_attempt_retries_next_day() {
        // Wednesday -> Thursday
        assert_eq!(next_business_day(date(2025, 1, 1)), date(2025, 1, 2));
        // Monday -> Tuesday
        assert_eq!(next_business_day(date(2025, 1, 6)), date(2025, 1, 7));
    }

    #[test]
    fn sunday_attempt_retries_monday() {
        assert_eq!(next_business_day(date(2025, 1, 5)), date(2025, 1, 6));
    }
}
