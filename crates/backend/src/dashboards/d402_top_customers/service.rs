use contracts::dashboards::d402_top_customers::{DateRange, TopCustomersResponse};
use std::ops::RangeInclusive;
use std::time::{Duration, Instant};

use super::error::ReportError;
use super::prompt::{self, ReportDefinition};
use super::response_parser;
use crate::shared::config::Config;
use crate::shared::format::{preview, truncate_chars};
use crate::shared::llm::{ChatMessage, LlmProvider};

const YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;
const RAW_PREVIEW_CHARS: usize = 200;

/// Настройки отчёта, собираются один раз из конфигурации
#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub report: ReportDefinition,
    pub default_limit: usize,
    pub max_limit: usize,
    /// Upper bound for one provider call
    pub timeout: Duration,
}

impl ReportSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            report: ReportDefinition::from(&config.report),
            default_limit: config.report.default_limit,
            max_limit: config.report.max_limit,
            timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }
}

/// Validated request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportQuery {
    pub year: i32,
    pub month: u32,
    pub limit: usize,
}

impl ReportQuery {
    /// Parse raw path/query values.
    ///
    /// A missing or non-numeric `limit` falls back to the default; an integer
    /// outside `1..=max_limit` (even one too large for `i64`) is rejected.
    pub fn from_raw(
        year: &str,
        month: &str,
        limit: Option<&str>,
        settings: &ReportSettings,
    ) -> Result<Self, ReportError> {
        let year: i32 = year
            .trim()
            .parse()
            .map_err(|_| ReportError::InputMalformed(format!("Invalid year '{}'", year)))?;
        if !YEAR_RANGE.contains(&year) {
            return Err(ReportError::InputMalformed(format!(
                "Year {} is out of range {}..={}",
                year,
                YEAR_RANGE.start(),
                YEAR_RANGE.end()
            )));
        }

        let month: u32 = month
            .trim()
            .parse()
            .map_err(|_| ReportError::InputMalformed(format!("Invalid month '{}'", month)))?;
        if !(1..=12).contains(&month) {
            return Err(ReportError::InputMalformed(format!(
                "Month {} is out of range 1..=12",
                month
            )));
        }

        let limit = match limit.map(str::trim).filter(|raw| is_integer(raw)) {
            None => settings.default_limit,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n >= 1 && n as u64 <= settings.max_limit as u64 => n as usize,
                _ => {
                    return Err(ReportError::InputMalformed(format!(
                        "Limit {} is out of range 1..={}",
                        raw, settings.max_limit
                    )))
                }
            },
        };

        Ok(Self { year, month, limit })
    }
}

/// Optional sign followed by ASCII digits
fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Получить топ клиентов по продажам за месяц через LLM
pub async fn get_top_customers(
    provider: &dyn LlmProvider,
    settings: &ReportSettings,
    query: ReportQuery,
) -> Result<TopCustomersResponse, ReportError> {
    let range = DateRange::for_month(query.year, query.month).ok_or_else(|| {
        ReportError::InputMalformed(format!("Invalid period {}-{}", query.year, query.month))
    })?;

    let prompt = prompt::build_prompt(&settings.report, &range, query.limit);
    let started = Instant::now();

    let response = tokio::time::timeout(
        settings.timeout,
        provider.chat_completion(vec![ChatMessage::user(prompt)]),
    )
    .await
    .map_err(|_| ReportError::ProviderTimeout(settings.timeout))??;

    tracing::info!(
        "D402: {} answered in {} ms (tokens: {:?}, finish: {:?})",
        provider.provider_name(),
        started.elapsed().as_millis(),
        response.tokens_used,
        response.finish_reason
    );
    tracing::debug!("D402: raw model response: {}", preview(&response.content, 500));

    let parsed = response_parser::parse_customers(&response.content).map_err(|source| {
        tracing::warn!(
            "D402: failed to parse model response ({}): {}",
            source,
            preview(&response.content, RAW_PREVIEW_CHARS)
        );
        ReportError::ResponseUnparseable {
            source,
            raw_preview: truncate_chars(&response.content, RAW_PREVIEW_CHARS),
        }
    })?;

    let mut customers = parsed.customers;
    customers.sort_by(|a, b| b.sales.total_cmp(&a.sales));
    customers.truncate(query.limit);

    Ok(TopCustomersResponse::new(&range, customers, parsed.skipped))
}
