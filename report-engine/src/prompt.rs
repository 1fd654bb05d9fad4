//! Prompt builders: a readable data block embedded in fixed templates.
//!
//! The templates name the sections the model must produce; the data block is
//! one line per record so the model sees every row in the selection.

use std::fmt::Write as _;

use migration_store::{MigrationRecord, StatsBundle};

/// One line per record: `country (ISO), year: refugees=N, asylum_seekers=N`.
///
/// # Example
/// ```
/// # use report_engine::prompt::format_records;
/// assert_eq!(format_records(&[]), "(no records matched the selection)");
/// ```
pub fn format_records(records: &[MigrationRecord]) -> String {
    if records.is_empty() {
        return "(no records matched the selection)".to_string();
    }

    let mut out = String::new();
    for r in records {
        let year = r
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "n/a".to_string());
        let _ = writeln!(
            out,
            "{} ({}), {}: refugees={}, asylum_seekers={}",
            r.country_of_origin, r.iso_code, year, r.refugees, r.asylum_seekers
        );
    }
    out.truncate(out.trim_end().len());
    out
}

pub fn hotspot_prompt(records: &[MigrationRecord]) -> String {
    format!(
        "Analyze this migration data to identify potential future hotspots:\n\
         {data}\n\
         \n\
         Provide:\n\
         1. Risk assessment with probability estimates\n\
         2. Predicted future hotspots (top 3 countries)\n\
         3. Timeline of expected migration surges\n\
         4. Recommended interventions\n\
         \n\
         Format as a professional report with clear sections.\n",
        data = format_records(records)
    )
}

pub fn impact_prompt(records: &[MigrationRecord]) -> String {
    format!(
        "Create a detailed impact report based on:\n\
         {data}\n\
         \n\
         Include these sections:\n\
         1. Executive Summary\n\
         2. Key Statistics (with numbers)\n\
         3. Economic Impact Analysis\n\
         4. Social Consequences\n\
         5. Policy Recommendations\n\
         6. Long-term Projections\n\
         \n\
         Use professional tone with bullet points for key findings.\n",
        data = format_records(records)
    )
}

/// Chat template: the question plus the unfiltered stats bundle.
pub fn chat_prompt(question: &str, stats: &StatsBundle) -> String {
    let by_year = if stats.by_year.is_empty() {
        "none".to_string()
    } else {
        stats
            .by_year
            .iter()
            .map(|t| {
                format!(
                    "{}: refugees={}, asylum_seekers={}",
                    t.year, t.total_refugees, t.total_asylum
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    let top = if stats.top_origins.is_empty() {
        "none".to_string()
    } else {
        stats
            .top_origins
            .iter()
            .map(|o| match &o.iso_code {
                Some(iso) => format!("{} ({iso}): {}", o.country, o.total_refugees),
                None => format!("{}: {}", o.country, o.total_refugees),
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    format!(
        "The user asked: {question}\n\
         \n\
         Here's some relevant migration data:\n\
         - Refugees by year: {by_year}\n\
         - Top origin countries: {top}\n\
         \n\
         Provide a concise, data-informed response focusing on:\n\
         1. Key trends in the data\n\
         2. Any notable patterns\n\
         3. Professional insights\n",
        question = question.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration_store::{OriginTotals, YearTotals, bson::doc};

    fn syria_2019() -> MigrationRecord {
        MigrationRecord::from_document(doc! {
            "Country of Origin": "Syria",
            "Country of Origin ISO": "SYR",
            "Year": 2019,
            "Refugees": "6617000",
            "Asylum Seekers": "120000",
        })
    }

    #[test]
    fn record_lines_are_readable() {
        let block = format_records(&[syria_2019()]);
        assert_eq!(
            block,
            "Syria (SYR), 2019: refugees=6617000, asylum_seekers=120000"
        );
    }

    #[test]
    fn hotspot_template_lists_required_sections() {
        let p = hotspot_prompt(&[syria_2019()]);
        assert!(p.starts_with("Analyze this migration data to identify potential future hotspots:\n"));
        assert!(p.contains("Syria (SYR), 2019"));
        assert!(p.contains("1. Risk assessment with probability estimates"));
        assert!(p.contains("2. Predicted future hotspots (top 3 countries)"));
        assert!(p.contains("3. Timeline of expected migration surges"));
        assert!(p.contains("4. Recommended interventions"));
        assert!(p.contains("Format as a professional report with clear sections."));
    }

    #[test]
    fn impact_template_lists_required_sections() {
        let p = impact_prompt(&[]);
        assert!(p.contains("(no records matched the selection)"));
        for section in [
            "1. Executive Summary",
            "2. Key Statistics (with numbers)",
            "3. Economic Impact Analysis",
            "4. Social Consequences",
            "5. Policy Recommendations",
            "6. Long-term Projections",
        ] {
            assert!(p.contains(section), "missing {section}");
        }
        assert!(p.contains("bullet points"));
    }

    #[test]
    fn chat_prompt_embeds_question_and_stats() {
        let stats = StatsBundle {
            by_year: vec![YearTotals {
                year: 2020,
                total_refugees: 10,
                total_asylum: 2,
            }],
            top_origins: vec![OriginTotals {
                country: "Syria".into(),
                total_refugees: 10,
                iso_code: Some("SYR".into()),
            }],
        };
        let p = chat_prompt("  What are the top origin countries?  ", &stats);
        assert!(p.starts_with("The user asked: What are the top origin countries?\n"));
        assert!(p.contains("- Refugees by year: 2020: refugees=10, asylum_seekers=2"));
        assert!(p.contains("- Top origin countries: Syria (SYR): 10"));
        assert!(p.contains("1. Key trends in the data"));
    }

    #[test]
    fn chat_prompt_with_empty_stats_says_none() {
        let p = chat_prompt("hi", &StatsBundle::default());
        assert!(p.contains("- Refugees by year: none"));
        assert!(p.contains("- Top origin countries: none"));
    }
}
