// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Month-by-month cashflow series over a sliding window.

use crate::aggregate::{budget_total, category_reports, summary, total};
use crate::errors::{Error, Result};
use crate::filter::filter_by_date_range;
use crate::models::{BudgetItem, ReportData, Transaction, TrendPoint, TxType};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// Longest trend window accepted, in months (ten years).
pub const MAX_WINDOW: usize = 120;

/// First and last day of the month `back` months before the month of `today`.
pub fn month_bounds(today: NaiveDate, back: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = today
        .with_day(1)?
        .checked_sub_months(Months::new(back))?;
    let last = first.checked_add_months(Months::new(1))?.pred_opt()?;
    Some((first, last))
}

pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// `window` buckets, oldest first, the last one holding `today`.
///
/// `budget` is the net plan over the whole budget set and is the same in every
/// bucket. A window above [`MAX_WINDOW`], or one reaching past the calendar
/// range, is an error rather than a shorter series.
pub fn trends(
    transactions: &[Transaction],
    budget_items: &[BudgetItem],
    window: usize,
    today: NaiveDate,
) -> Result<Vec<TrendPoint>> {
    if window > MAX_WINDOW {
        return Err(Error::TrendWindow {
            window,
            max: MAX_WINDOW,
        });
    }
    let budget =
        budget_total(budget_items, TxType::Income) - budget_total(budget_items, TxType::Expense);

    let mut points = Vec::with_capacity(window);
    for back in (0..window).rev() {
        let (start, end) = u32::try_from(back)
            .ok()
            .and_then(|b| month_bounds(today, b))
            .ok_or(Error::TrendWindow {
                window,
                max: MAX_WINDOW,
            })?;
        let in_month = filter_by_date_range(transactions, start, end);
        let income = total(&in_month, TxType::Income);
        let expense = total(&in_month, TxType::Expense);
        points.push(TrendPoint {
            period: month_label(start),
            start,
            end,
            income,
            expense,
            budget,
            actual: income - expense,
        });
    }
    Ok(points)
}

/// Summary, category variances and trends for one view, as the report page shows them.
pub fn report_data(
    transactions: &[Transaction],
    budget_items: &[BudgetItem],
    period: &str,
    window: usize,
    today: NaiveDate,
) -> Result<ReportData> {
    Ok(ReportData {
        period: period.to_string(),
        categories: category_reports(transactions, budget_items),
        summary: summary(transactions, budget_items, period),
        trends: trends(transactions, budget_items, window, today)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAverages {
    pub income: Decimal,
    pub expense: Decimal,
    pub actual: Decimal,
}

impl TrendAverages {
    pub fn from_points(points: &[TrendPoint]) -> Self {
        if points.is_empty() {
            return TrendAverages {
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
                actual: Decimal::ZERO,
            };
        }
        let n = Decimal::from(points.len());
        TrendAverages {
            income: points.iter().map(|p| p.income).sum::<Decimal>() / n,
            expense: points.iter().map(|p| p.expense).sum::<Decimal>() / n,
            actual: points.iter().map(|p| p.actual).sum::<Decimal>() / n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetPeriod;
    use chrono::{TimeZone, Utc};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(date: NaiveDate, ty: TxType, amount: i64) -> Transaction {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Transaction {
            id: date.to_string(),
            date,
            description: "x".into(),
            amount: Decimal::from(amount),
            r#type: ty,
            category: "A".into(),
            sub_category: None,
            reference: None,
            attachment: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn budget(ty: TxType, amount: i64, period: BudgetPeriod) -> BudgetItem {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        BudgetItem {
            id: format!("{}-{}", ty, amount),
            category: "A".into(),
            sub_category: None,
            r#type: ty,
            planned_amount: Decimal::from(amount),
            period,
            description: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn month_bounds_handle_leap_years_and_year_wrap() {
        assert_eq!(
            month_bounds(day(2024, 3, 31), 1),
            Some((day(2024, 2, 1), day(2024, 2, 29)))
        );
        assert_eq!(
            month_bounds(day(2024, 1, 15), 2),
            Some((day(2023, 11, 1), day(2023, 11, 30)))
        );
        assert_eq!(
            month_bounds(day(2023, 12, 1), 0),
            Some((day(2023, 12, 1), day(2023, 12, 31)))
        );
    }

    #[test]
    fn window_of_three_ends_at_current_month() {
        let points = trends(&[], &[], 3, day(2024, 2, 10)).unwrap();
        let labels: Vec<_> = points.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(labels, vec!["Dec 2023", "Jan 2024", "Feb 2024"]);
        assert_eq!(points[2].start, day(2024, 2, 1));
        assert_eq!(points[2].end, day(2024, 2, 29));
    }

    #[test]
    fn empty_window_gives_no_points() {
        let txs = vec![tx(day(2024, 1, 1), TxType::Income, 5)];
        assert!(trends(&txs, &[], 0, day(2024, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn buckets_split_on_month_edges_and_repeat_budget() {
        let txs = vec![
            tx(day(2024, 1, 1), TxType::Income, 100),
            tx(day(2024, 1, 31), TxType::Expense, 30),
            tx(day(2024, 2, 1), TxType::Expense, 20),
            tx(day(2023, 6, 1), TxType::Income, 999),
        ];
        let items = vec![
            budget(TxType::Income, 500, BudgetPeriod::Monthly),
            budget(TxType::Expense, 200, BudgetPeriod::Yearly),
        ];
        let points = trends(&txs, &items, 2, day(2024, 2, 29)).unwrap();
        assert_eq!(points.len(), 2);

        assert_eq!(points[0].income, Decimal::from(100));
        assert_eq!(points[0].expense, Decimal::from(30));
        assert_eq!(points[0].actual, Decimal::from(70));
        assert_eq!(points[1].income, Decimal::ZERO);
        assert_eq!(points[1].actual, Decimal::from(-20));

        for p in &points {
            assert_eq!(p.budget, Decimal::from(300));
        }
    }

    #[test]
    fn averages_over_points() {
        let txs = vec![
            tx(day(2024, 1, 5), TxType::Income, 90),
            tx(day(2024, 2, 5), TxType::Expense, 30),
        ];
        let points = trends(&txs, &[], 3, day(2024, 2, 5)).unwrap();
        let avg = TrendAverages::from_points(&points);
        assert_eq!(avg.income, Decimal::from(30));
        assert_eq!(avg.expense, Decimal::from(10));
        assert_eq!(avg.actual, Decimal::from(20));
        assert_eq!(TrendAverages::from_points(&[]).income, Decimal::ZERO);
    }

    #[test]
    fn report_data_bundles_every_view() {
        let txs = vec![tx(day(2024, 2, 5), TxType::Expense, 30)];
        let items = vec![budget(TxType::Expense, 50, BudgetPeriod::Monthly)];
        let r = report_data(&txs, &items, "Feb 2024", 2, day(2024, 2, 5)).unwrap();
        assert_eq!(r.period, "Feb 2024");
        assert_eq!(r.summary.period, "Feb 2024");
        assert_eq!(r.categories.len(), 1);
        assert_eq!(r.categories[0].variance, Decimal::from(-20));
        assert_eq!(r.trends.len(), 2);
        assert_eq!(r.trends[1].expense, Decimal::from(30));
    }

    #[test]
    fn window_is_capped_and_never_shortened() {
        let full = trends(&[], &[], MAX_WINDOW, day(2024, 2, 10)).unwrap();
        assert_eq!(full.len(), MAX_WINDOW);
        assert_eq!(full[0].period, "Mar 2014");

        assert!(matches!(
            trends(&[], &[], MAX_WINDOW + 1, day(2024, 2, 10)),
            Err(Error::TrendWindow { window: 121, max: 120 })
        ));
        assert!(trends(&[], &[], 4_000_000, day(2024, 2, 10)).is_err());
        assert!(trends(&[], &[], usize::MAX, day(2024, 2, 10)).is_err());

        // Within the cap but past the earliest representable date.
        let early = NaiveDate::MIN.with_day(1).unwrap();
        assert!(trends(&[], &[], 2, early).is_err());
        assert_eq!(trends(&[], &[], 1, early).unwrap().len(), 1);
    }
}
