// src/common/period.rs

use chrono::{DateTime, Datelike, Days, FixedOffset, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::common::error::AppError;

/// Relógio da loja: "hoje" e limites de dia sempre no fuso local da loja.
#[derive(Debug, Clone, Copy)]
pub struct ShopClock {
    offset: FixedOffset,
}

impl ShopClock {
    pub fn new(utc_offset_hours: i32) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600)
            .ok_or_else(|| anyhow::anyhow!("Fuso horário inválido: {} horas", utc_offset_hours))?;
        Ok(Self { offset })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn today(&self) -> NaiveDate {
        self.local_date(Utc::now())
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Meia-noite local de `date`, em UTC.
    /// Datas nos extremos do calendário (vindas da query string) viram `InvalidDateRange`.
    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>, AppError> {
        let local_midnight = date.and_time(NaiveTime::MIN);
        local_midnight
            .checked_sub_signed(TimeDelta::seconds(self.offset.local_minus_utc() as i64))
            .map(|utc| utc.and_utc())
            .ok_or(AppError::InvalidDateRange)
    }

    /// Intervalo semiaberto [início de `start`, início do dia seguinte a `end`) em UTC.
    pub fn utc_bounds(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let next_day = end.checked_add_days(Days::new(1)).ok_or(AppError::InvalidDateRange)?;
        Ok((self.start_of_day(start)?, self.start_of_day(next_day)?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// Primeiro e último dia (inclusivos) do período que contém `today`.
    /// A semana começa na segunda-feira.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            Period::Day => (today, today),
            Period::Week => {
                let monday = today - TimeDelta::days(today.weekday().num_days_from_monday() as i64);
                (monday, monday + TimeDelta::days(6))
            }
            Period::Month => {
                let first = today - TimeDelta::days(today.day0() as i64);
                (first, first + Months::new(1) - TimeDelta::days(1))
            }
            Period::Year => {
                let first = today - TimeDelta::days(today.ordinal0() as i64);
                (first, first + Months::new(12) - TimeDelta::days(1))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-03-16 é um domingo
        assert_eq!(Period::Week.range(date(2025, 3, 16)), (date(2025, 3, 10), date(2025, 3, 16)));
        assert_eq!(Period::Week.range(date(2025, 3, 10)), (date(2025, 3, 10), date(2025, 3, 16)));
    }

    #[test]
    fn month_handles_february_of_leap_year() {
        assert_eq!(Period::Month.range(date(2024, 2, 14)), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(Period::Month.range(date(2025, 12, 31)), (date(2025, 12, 1), date(2025, 12, 31)));
    }

    #[test]
    fn year_and_day_ranges() {
        assert_eq!(Period::Year.range(date(2025, 7, 4)), (date(2025, 1, 1), date(2025, 12, 31)));
        assert_eq!(Period::Day.range(date(2025, 7, 4)), (date(2025, 7, 4), date(2025, 7, 4)));
    }

    #[test]
    fn local_day_bounds_follow_shop_offset() {
        let clock = ShopClock::new(-3).unwrap();
        let (start, end) = clock.utc_bounds(date(2025, 5, 1), date(2025, 5, 1)).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-05-01T03:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-05-02T03:00:00+00:00");
    }

    #[test]
    fn late_evening_sale_belongs_to_local_day() {
        let clock = ShopClock::new(-3).unwrap();
        // 01:30 UTC do dia 2 ainda é 22:30 do dia 1 na loja
        let instant = DateTime::parse_from_rfc3339("2025-05-02T01:30:00Z").unwrap().with_timezone(&Utc);
        assert_eq!(clock.local_date(instant), date(2025, 5, 1));
    }

    #[test]
    fn calendar_extremes_are_rejected_instead_of_overflowing() {
        let west = ShopClock::new(-3).unwrap();
        assert!(matches!(
            west.utc_bounds(NaiveDate::MAX, NaiveDate::MAX),
            Err(AppError::InvalidDateRange)
        ));
        let last = NaiveDate::MAX.pred_opt().unwrap();
        assert!(west.utc_bounds(last, last).is_ok());

        let east = ShopClock::new(3).unwrap();
        assert!(matches!(east.start_of_day(NaiveDate::MIN), Err(AppError::InvalidDateRange)));
    }

    #[test]
    fn extreme_date_from_query_string_is_rejected() {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Query {
            end_date: NaiveDate,
        }
        let query: Query = serde_json::from_str(r#"{"endDate":"+262142-12-31"}"#).unwrap();
        let clock = ShopClock::new(-3).unwrap();
        assert!(clock.utc_bounds(query.end_date, query.end_date).is_err());
    }

    #[test]
    fn rejects_impossible_offset() {
        assert!(ShopClock::new(30).is_err());
    }
}
