use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

const DATA_FENCE_TAG: &str = "```json";
const FENCE: &str = "```";

/// One fiscal year of headline financials, values in INR crore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialYearRecord {
    #[serde(deserialize_with = "year_label")]
    pub year: String,
    pub revenue: f64,
    pub ebitda: f64,
    pub ebitda_margin: f64,
    pub pat: f64,
    pub debt: f64,
    pub equity: f64,
}

/// Accept `"FY24"` as well as a bare `2024`.
fn year_label<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Label {
        Text(String),
        Number(i64),
    }

    Ok(match Label::deserialize(deserializer)? {
        Label::Text(s) => s,
        Label::Number(n) => n.to_string(),
    })
}

/// Byte range of a fenced data block and the text between its delimiters.
struct DataFence<'a> {
    start: usize,
    end: usize,
    content: &'a str,
}

/// Split a generated body into prose and its trailing financial series.
///
/// Fail-soft: a missing fence returns the body untouched; a fence whose
/// content does not parse is still removed, and the series comes back empty.
/// The series is normalized to oldest-to-newest.
pub fn extract(raw_body: &str) -> (String, Vec<FinancialYearRecord>) {
    let Some(fence) = find_last_data_fence(raw_body) else {
        debug!("No structured data block in response");
        return (raw_body.to_string(), Vec::new());
    };

    let body = strip_range(raw_body, fence.start, fence.end);

    let series = match serde_json::from_str::<Vec<FinancialYearRecord>>(fence.content) {
        Ok(records) => chronological(records),
        Err(e) => {
            warn!(error = %e, "Failed to parse financial JSON from response");
            Vec::new()
        }
    };

    debug!(records = series.len(), body_len = body.len(), "Extracted data block");
    (body, series)
}

/// Find the last ```json fence that has a closing delimiter.
fn find_last_data_fence(text: &str) -> Option<DataFence<'_>> {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lowered = text.to_ascii_lowercase();

    lowered
        .match_indices(DATA_FENCE_TAG)
        .filter_map(|(start, _)| {
            let after_tag = start + DATA_FENCE_TAG.len();
            // Reject tags like ```jsonc or ```json5.
            let tag_ends = text[after_tag..]
                .chars()
                .next()
                .map_or(true, char::is_whitespace);
            if !tag_ends {
                return None;
            }
            let close = text[after_tag..].find(FENCE)?;
            Some(DataFence {
                start,
                end: after_tag + close + FENCE.len(),
                content: text[after_tag..after_tag + close].trim(),
            })
        })
        .last()
}

/// Remove `[start, end)` and trim whitespace at the cut.
fn strip_range(text: &str, start: usize, end: usize) -> String {
    let before = text[..start].trim_end();
    let after = text[end..].trim_start();
    let joined = match (before.is_empty(), after.is_empty()) {
        (false, false) => format!("{}\n\n{}", before, after),
        _ => format!("{}{}", before, after),
    };
    joined.trim().to_string()
}

/// Order records oldest first. When every label yields a distinct year the
/// records sort by it; otherwise the model's most-recent-first order is reversed.
fn chronological(mut records: Vec<FinancialYearRecord>) -> Vec<FinancialYearRecord> {
    let years: Option<Vec<u32>> = records.iter().map(|r| label_year(&r.year)).collect();
    match years.filter(|years| all_distinct(years)) {
        Some(years) => {
            let mut keyed: Vec<(u32, FinancialYearRecord)> =
                years.into_iter().zip(records).collect();
            keyed.sort_by_key(|(year, _)| *year);
            keyed.into_iter().map(|(_, r)| r).collect()
        }
        None => {
            records.reverse();
            records
        }
    }
}

fn all_distinct(years: &[u32]) -> bool {
    let mut sorted = years.to_vec();
    sorted.sort_unstable();
    sorted.windows(2).all(|w| w[0] < w[1])
}

/// Year a label refers to. The last 4-digit run wins ("2024-03-31" is 2024,
/// "FY2021 (est.)" is 2021); failing that, a 2-digit run right after `FY`,
/// `'` or `-` counts as 20xx ("FY24 (12M)" is 2024, "Mar-24" is 2024).
fn label_year(label: &str) -> Option<u32> {
    let bytes = label.as_bytes();
    let mut long = None;
    let mut short = None;
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let run = &label[start..i];
        match run.len() {
            4 => long = run.parse::<u32>().ok(),
            2 if follows_year_marker(&label[..start]) => {
                short = run.parse::<u32>().ok().map(|n| 2000 + n)
            }
            _ => {}
        }
    }

    long.or(short)
}

fn follows_year_marker(before: &str) -> bool {
    let before = before.trim_end().to_ascii_lowercase();
    before.ends_with("fy") || before.ends_with('\'') || before.ends_with('-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: &str) -> FinancialYearRecord {
        FinancialYearRecord {
            year: year.to_string(),
            revenue: 0.0,
            ebitda: 0.0,
            ebitda_margin: 0.0,
            pat: 0.0,
            debt: 0.0,
            equity: 0.0,
        }
    }

    fn years(series: &[FinancialYearRecord]) -> Vec<&str> {
        series.iter().map(|r| r.year.as_str()).collect()
    }

    #[test]
    fn test_single_record_scenario() {
        let raw = "Report text\n\n```json\n[{\"year\":\"FY24\",\"revenue\":10,\"ebitda\":2,\"ebitdaMargin\":20,\"pat\":1,\"debt\":5,\"equity\":5}]\n```";
        let (body, series) = extract(raw);
        assert_eq!(body, "Report text");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].year, "FY24");
        assert_eq!(series[0].revenue, 10.0);
        assert_eq!(series[0].ebitda_margin, 20.0);
    }

    #[test]
    fn test_no_fence_returns_body_unchanged() {
        let raw = "## Heading\n\nJust prose with `code` and ```rust\nfn x() {}\n```\n";
        let (body, series) = extract(raw);
        assert_eq!(body, raw);
        assert!(series.is_empty());
    }

    #[test]
    fn test_invalid_json_still_strips_fence() {
        let raw = "Body\n```json\n[{\"year\": \"FY24\", \"revenue\": \"n/a\"}]\n```\n";
        let (body, series) = extract(raw);
        assert_eq!(body, "Body");
        assert!(series.is_empty());
    }

    #[test]
    fn test_empty_array() {
        let (body, series) = extract("Body\n\n```json\n[]\n```");
        assert_eq!(body, "Body");
        assert!(series.is_empty());
    }

    #[test]
    fn test_last_fence_wins() {
        let raw = "Intro\n```json\n{\"example\": true}\n```\nMiddle\n```json\n[{\"year\":\"FY23\",\"revenue\":1,\"ebitda\":1,\"ebitdaMargin\":1,\"pat\":1,\"debt\":1,\"equity\":1}]\n```\n";
        let (body, series) = extract(raw);
        assert_eq!(body, "Intro\n```json\n{\"example\": true}\n```\nMiddle");
        assert_eq!(years(&series), vec!["FY23"]);
    }

    #[test]
    fn test_fence_in_middle_joins_surrounding_text() {
        let raw = "Before\n\n```json\n[]\n```\n\nAfter";
        let (body, _) = extract(raw);
        assert_eq!(body, "Before\n\nAfter");
    }

    #[test]
    fn test_unclosed_fence_is_not_a_block() {
        let raw = "Body\n```json\n[{\"year\":\"FY24\"";
        let (body, series) = extract(raw);
        assert_eq!(body, raw);
        assert!(series.is_empty());
    }

    #[test]
    fn test_jsonc_tag_ignored_and_uppercase_tag_accepted() {
        let (body, _) = extract("A\n```jsonc\n[]\n```");
        assert_eq!(body, "A\n```jsonc\n[]\n```");

        let (body, _) = extract("A\n```JSON\n[]\n```");
        assert_eq!(body, "A");
    }

    #[test]
    fn test_numeric_year_label_accepted() {
        let raw = "```json\n[{\"year\":2024,\"revenue\":1,\"ebitda\":1,\"ebitdaMargin\":1,\"pat\":1,\"debt\":1,\"equity\":1}]\n```";
        let (body, series) = extract(raw);
        assert!(body.is_empty());
        assert_eq!(years(&series), vec!["2024"]);
    }

    #[test]
    fn test_series_sorted_oldest_first() {
        let sorted = chronological(vec![record("FY24"), record("FY22"), record("FY2023")]);
        assert_eq!(years(&sorted), vec!["FY22", "FY2023", "FY24"]);
    }

    #[test]
    fn test_unlabelled_series_reversed() {
        let sorted = chronological(vec![record("Latest"), record("FY23"), record("Oldest")]);
        assert_eq!(years(&sorted), vec!["Oldest", "FY23", "Latest"]);
    }

    #[test]
    fn test_iso_date_labels_sorted_oldest_first() {
        let sorted = chronological(vec![
            record("2024-03-31"),
            record("2023-03-31"),
            record("2022-03-31"),
        ]);
        assert_eq!(years(&sorted), vec!["2022-03-31", "2023-03-31", "2024-03-31"]);
    }

    #[test]
    fn test_period_length_suffix_ignored() {
        let sorted = chronological(vec![
            record("FY24 (12M)"),
            record("FY23 (15M)"),
            record("FY22 (12M)"),
        ]);
        assert_eq!(years(&sorted), vec!["FY22 (12M)", "FY23 (15M)", "FY24 (12M)"]);
    }

    #[test]
    fn test_duplicate_years_fall_back_to_reversal() {
        let sorted = chronological(vec![record("FY24"), record("2024"), record("FY23")]);
        assert_eq!(years(&sorted), vec!["FY23", "2024", "FY24"]);
    }

    #[test]
    fn test_label_year() {
        assert_eq!(label_year("FY24"), Some(2024));
        assert_eq!(label_year("FY 24"), Some(2024));
        assert_eq!(label_year("'23"), Some(2023));
        assert_eq!(label_year("Mar-24"), Some(2024));
        assert_eq!(label_year("2024-03-31"), Some(2024));
        assert_eq!(label_year("FY24 (12M)"), Some(2024));
        assert_eq!(label_year("FY2021 (est.)"), Some(2021));
        assert_eq!(label_year("Mar 2020"), Some(2020));
        assert_eq!(label_year("12M"), None);
        assert_eq!(label_year("TTM"), None);
        assert_eq!(label_year("Q3"), None);
    }
}
