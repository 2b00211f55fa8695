use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Inclusive calendar-month date range `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// First and last day of the month.
    ///
    /// Returns `None` for a month outside 1..=12 or a year chrono cannot represent.
    /// ```
    /// use contracts::dashboards::d402_top_customers::DateRange;
    /// let range = DateRange::for_month(2024, 2).unwrap();
    /// assert_eq!(range.end_str(), "2024-02-29");
    /// ```
    pub fn for_month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = start.checked_add_months(Months::new(1))?.pred_opt()?;
        Some(Self { start, end })
    }

    /// Start date in format "YYYY-MM-DD"
    pub fn start_str(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// End date in format "YYYY-MM-DD"
    pub fn end_str(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }

    /// Period label in format "<year>-<month>", month without zero padding
    pub fn period(&self) -> String {
        format!("{}-{}", self.start.year(), self.start.month())
    }
}

/// Customer with its sales total for the requested period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSalesRecord {
    pub name: String,
    pub sales: f64,
}

/// Response for GET /api/customers/top/:year/:month
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopCustomersResponse {
    pub success: bool,
    /// Period in format "YYYY-M"
    pub period: String,
    pub count: usize,
    pub date_from: String,
    pub date_to: String,
    pub customers: Vec<CustomerSalesRecord>,
    /// Number of array elements rejected by record validation
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skipped: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl TopCustomersResponse {
    pub fn new(range: &DateRange, customers: Vec<CustomerSalesRecord>, skipped: usize) -> Self {
        Self {
            success: true,
            period: range.period(),
            count: customers.len(),
            date_from: range.start_str(),
            date_to: range.end_str(),
            customers,
            skipped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leap_year_february() {
        let range = DateRange::for_month(2024, 2).unwrap();
        assert_eq!(range.start_str(), "2024-02-01");
        assert_eq!(range.end_str(), "2024-02-29");

        let range = DateRange::for_month(2023, 2).unwrap();
        assert_eq!(range.end_str(), "2023-02-28");

        let range = DateRange::for_month(2000, 2).unwrap();
        assert_eq!(range.end_str(), "2000-02-29");

        let range = DateRange::for_month(1900, 2).unwrap();
        assert_eq!(range.end_str(), "1900-02-28");
    }

    #[test]
    fn test_december_stays_in_year() {
        let range = DateRange::for_month(2025, 12).unwrap();
        assert_eq!(range.start_str(), "2025-12-01");
        assert_eq!(range.end_str(), "2025-12-31");
    }

    #[test]
    fn test_thirty_day_months() {
        for month in [4, 6, 9, 11] {
            let range = DateRange::for_month(2025, month).unwrap();
            assert_eq!(range.end.day(), 30, "month {}", month);
        }
    }

    #[test]
    fn test_invalid_month_rejected() {
        assert!(DateRange::for_month(2025, 0).is_none());
        assert!(DateRange::for_month(2025, 13).is_none());
    }

    #[test]
    fn test_period_label() {
        let range = DateRange::for_month(2025, 9).unwrap();
        assert_eq!(range.period(), "2025-9");
    }

    #[test]
    fn test_response_serialization() {
        let range = DateRange::for_month(2025, 9).unwrap();
        let response = TopCustomersResponse::new(
            &range,
            vec![CustomerSalesRecord {
                name: "Acme".to_string(),
                sales: 100.5,
            }],
            0,
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["period"], "2025-9");
        assert_eq!(value["count"], 1);
        assert_eq!(value["dateFrom"], "2025-09-01");
        assert_eq!(value["dateTo"], "2025-09-30");
        assert_eq!(value["customers"][0]["name"], "Acme");
        assert!(value.get("skipped").is_none());

        let response = TopCustomersResponse::new(&range, vec![], 2);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["skipped"], 2);
        assert_eq!(value["count"], 0);
    }
}
