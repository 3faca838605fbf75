use anyhow::{bail, Context, Result};
#[cfg(not(test))]
use chrono::Local;
use chrono::{Datelike, Months, NaiveDate, Weekday};

/// Localタイムゾーンでの今日の日付を返す。
#[cfg(not(test))]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}


#[cfg(test)]
pub use mock_today::today;

/// `YYYY-MM-DD`形式の日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Failed to parse date: {}", s))
}

/// 土日かどうかを返す。
pub fn is_weekend(date: &NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// 両端を含む日付の範囲。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// 新しい`DateRange`を返す。
    ///
    /// 指定されなかった端はLocalタイムゾーンでの今月の初日、末日で補う。
    /// 開始日が終了日より後の場合はエラーを返す。
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        let month = Self::current_month()?;
        let range = Self {
            from: from.unwrap_or(month.from),
            to: to.unwrap_or(month.to),
        };
        if range.from > range.to {
            bail!(
                "Start date {} must not be after end date {}",
                range.from,
                range.to
            );
        }
        Ok(range)
    }

    /// Localタイムゾーンでの今月の範囲を返す。
    pub fn current_month() -> Result<Self> {
        let today = today();
        let from = today.with_day(1).context("Failed to set day")?;
        let to = from
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .context("Failed to compute end of month")?;
        Ok(Self { from, to })
    }

    /// 範囲内の日付を新しい順に返す。
    pub fn days_desc(&self) -> impl Iterator<Item = NaiveDate> {
        let from = self.from;
        std::iter::successors(Some(self.to), move |day| {
            day.pred_opt().filter(|prev| *prev >= from)
        })
        .filter(move |day| *day >= from)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{is_weekend, mock_today, parse_date, DateRange};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case::valid("2023-01-02", true)]
    #[case::invalid_day("2023-02-30", false)]
    #[case::wrong_format("02-01-2023", false)]
    fn test_parse_date(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(parse_date(input).is_ok(), ok);
    }

    #[rstest]
    #[case::friday("2023-01-06", false)]
    #[case::saturday("2023-01-07", true)]
    #[case::sunday("2023-01-08", true)]
    #[case::monday("2023-01-09", false)]
    fn test_is_weekend(#[case] day: &str, #[case] expected: bool) {
        assert_eq!(is_weekend(&date(day)), expected);
    }

    /// 範囲を指定しない場合は今日を含む月の初日から末日になる。
    #[rstest]
    #[case::first_day("2023-01-01", "2023-01-01", "2023-01-31")]
    #[case::last_day("2023-01-31", "2023-01-01", "2023-01-31")]
    #[case::february_leap("2024-02-15", "2024-02-01", "2024-02-29")]
    #[case::february("2023-02-28", "2023-02-01", "2023-02-28")]
    #[case::december("2023-12-15", "2023-12-01", "2023-12-31")]
    fn test_current_month(#[case] today: &str, #[case] from: &str, #[case] to: &str) {
        mock_today::set_today(Some(date(today)));

        let range = DateRange::current_month().unwrap();
        mock_today::set_today(None);

        assert_eq!(range, DateRange { from: date(from), to: date(to) });
    }

    /// 片方だけ指定した場合は、もう片方を今月で補う。
    #[rstest]
    #[case::only_from(Some("2023-03-10"), None, "2023-03-10", "2023-03-31")]
    #[case::only_to(None, Some("2023-03-10"), "2023-03-01", "2023-03-10")]
    #[case::neither(None, None, "2023-03-01", "2023-03-31")]
    fn test_range_fills_missing_bound(
        #[case] from: Option<&str>,
        #[case] to: Option<&str>,
        #[case] expected_from: &str,
        #[case] expected_to: &str,
    ) {
        mock_today::set_today(Some(date("2023-03-20")));

        let range = DateRange::new(from.map(date), to.map(date));
        mock_today::set_today(None);

        let range = range.unwrap();
        assert_eq!(range.from, date(expected_from));
        assert_eq!(range.to, date(expected_to));
    }

    /// 開始日だけを指定し、それが今月末より後の場合はエラーになる。
    #[test]
    fn test_only_from_after_end_of_month() {
        mock_today::set_today(Some(date("2023-03-20")));

        let result = DateRange::new(Some(date("2023-04-02")), None);
        mock_today::set_today(None);

        assert!(result.is_err());
    }

    #[test]
    fn test_explicit_range() {
        let range = DateRange::new(Some(date("2023-01-01")), Some(date("2023-01-22"))).unwrap();

        assert_eq!(range.from, date("2023-01-01"));
        assert_eq!(range.to, date("2023-01-22"));
    }

    #[test]
    fn test_reversed_range_is_error() {
        let result = DateRange::new(Some(date("2023-01-22")), Some(date("2023-01-01")));

        assert!(result.is_err());
    }

    #[test]
    fn test_days_desc() {
        let range = DateRange::new(Some(date("2022-12-30")), Some(date("2023-01-02"))).unwrap();

        let days: Vec<NaiveDate> = range.days_desc().collect();

        assert_eq!(
            days,
            vec![
                date("2023-01-02"),
                date("2023-01-01"),
                date("2022-12-31"),
                date("2022-12-30"),
            ]
        );
    }

    #[test]
    fn test_days_desc_single_day() {
        let range = DateRange::new(Some(date("2023-01-02")), Some(date("2023-01-02"))).unwrap();

        assert_eq!(range.days_desc().collect::<Vec<_>>(), vec![date("2023-01-02")]);
    }
}
