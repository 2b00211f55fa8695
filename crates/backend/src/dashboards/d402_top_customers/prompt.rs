use contracts::dashboards::d402_top_customers::DateRange;

use crate::shared::config::ReportConfig;

/// Отчёт, который модель должна выполнить через инструмент
#[derive(Debug, Clone)]
pub struct ReportDefinition {
    pub id: u32,
    pub name: String,
    /// Tool name the model calls to run the report
    pub tool: String,
}

impl From<&ReportConfig> for ReportDefinition {
    fn from(config: &ReportConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            tool: config.tool.clone(),
        }
    }
}

/// Build the single user message asking for the top `limit` customers over `range`.
///
/// The model must answer with a bare JSON array of `{"name", "sales"}` objects;
/// the response parser still tolerates fences and prose around it.
pub fn build_prompt(report: &ReportDefinition, range: &DateRange, limit: usize) -> String {
    format!(
        r#"Use {tool} tool (report ID {id} - {name}) for {start} to {end}.

Extract the top {limit} customers by sales amount, sorted from highest to lowest sales.

Return ONLY a valid JSON array with NO other text before or after:
[{{"name":"Customer Name","sales":123456.78}},{{"name":"Customer 2","sales":98765.43}}]

CRITICAL RULES:
- Start response with [
- End response with ]
- No markdown code blocks
- No explanatory text
- No newlines between array elements
- At most {limit} entries
- Pure JSON array only"#,
        tool = report.tool,
        id = report.id,
        name = report.name,
        start = range.start_str(),
        end = range.end_str(),
        limit = limit,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ReportDefinition {
        ReportDefinition {
            id: 272,
            name: "Sales by Customer Summary".to_string(),
            tool: "ns_runReport".to_string(),
        }
    }

    #[test]
    fn test_prompt_mentions_report_and_range() {
        let range = DateRange::for_month(2025, 9).unwrap();
        let prompt = build_prompt(&report(), &range, 5);

        assert!(prompt.starts_with(
            "Use ns_runReport tool (report ID 272 - Sales by Customer Summary) for 2025-09-01 to 2025-09-30."
        ));
        assert!(prompt.contains("Extract the top 5 customers"));
        assert!(prompt.contains("At most 5 entries"));
    }

    #[test]
    fn test_prompt_forbids_formatting_noise() {
        let range = DateRange::for_month(2024, 2).unwrap();
        let prompt = build_prompt(&report(), &range, 10);

        assert!(prompt.contains("2024-02-29"));
        assert!(prompt.contains("No markdown code blocks"));
        assert!(prompt.contains("No explanatory text"));
        assert!(prompt.contains(r#"[{"name":"Customer Name","sales":123456.78}"#));
    }
}
