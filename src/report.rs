use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::models::{FeatureValue, FIELD_NAMES};
use crate::session::Outcome;

pub fn build_report(outcome: &Outcome, generated_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Student Exam Score Report");
    let _ = writeln!(
        output,
        "Generated {} (request {})",
        generated_at.format("%Y-%m-%d %H:%M UTC"),
        outcome.request_id
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Inputs");
    let row = outcome.record.to_feature_row();
    for name in FIELD_NAMES {
        match row.get(name) {
            Some(FeatureValue::Numeric(value)) => {
                let _ = writeln!(output, "- {name}: {value}");
            }
            Some(FeatureValue::Category(level)) => {
                let _ = writeln!(output, "- {name}: {level}");
            }
            None => {}
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Prediction");
    match &outcome.prediction {
        Ok(score) => {
            let _ = writeln!(output, "Predicted Exam Score: {score:.2}");
        }
        Err(err) => {
            let _ = writeln!(output, "Prediction Failed: {err}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Data Insights");
    match &outcome.insights {
        None => {
            let _ = writeln!(output, "No insights without a prediction.");
        }
        Some(Err(err)) => {
            let _ = writeln!(output, "Plotting Failed: {err}");
        }
        Some(Ok(charts)) => {
            for file in &charts.files {
                let _ = writeln!(output, "- ![chart]({})", file.display());
            }
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "Your predicted score is at or above {:.1}% of past students.",
                charts.context.percentile
            );
            let _ = writeln!(output);
            let _ = writeln!(output, "### Exam Score by Motivation Level");
            for summary in &charts.context.by_motivation {
                let _ = writeln!(
                    output,
                    "- {}: {} students (avg score {:.1})",
                    summary.category, summary.count, summary.avg_score
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Smart Suggestions for Improvement");
    for tip in outcome.suggestions.lines() {
        let _ = writeln!(output, "- {tip}");
    }

    output
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::error::{InsightError, PredictionError};
    use crate::models::{sample_record, CategorySummary, CohortContext, Suggestions};
    use crate::session::ChartOutput;
    use crate::suggest::ON_TRACK;

    fn outcome() -> Outcome {
        Outcome {
            request_id: Uuid::nil(),
            record: sample_record(),
            prediction: Ok(67.4251),
            insights: Some(Ok(ChartOutput {
                files: vec![PathBuf::from("charts/exam_score_distribution.svg")],
                context: CohortContext {
                    percentile: 62.5,
                    by_motivation: vec![CategorySummary {
                        category: "Medium".to_string(),
                        count: 3,
                        avg_score: 71.66,
                    }],
                },
            })),
            suggestions: Suggestions::OnTrack,
        }
    }

    fn generated_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn report_includes_every_section() {
        let report = build_report(&outcome(), generated_at());
        assert!(report.starts_with("# Student Exam Score Report\n"));
        assert!(report.contains("Generated 2026-02-02 09:30 UTC"));
        assert!(report.contains("- Parental_Education_Level: Bachelor"));
        assert!(report.contains("- Hours_Studied: 5"));
        assert!(report.contains("Predicted Exam Score: 67.43"));
        assert!(report.contains("![chart](charts/exam_score_distribution.svg)"));
        assert!(report.contains("at or above 62.5% of past students"));
        assert!(report.contains("- Medium: 3 students (avg score 71.7)"));
        assert!(report.ends_with(&format!("- {ON_TRACK}\n")));
    }

    #[test]
    fn inputs_are_listed_in_form_order() {
        let report = build_report(&outcome(), generated_at());
        let position = |line: &str| report.find(line).unwrap();
        assert!(position("- Hours_Studied: 5\n") < position("- Attendance: 90\n"));
        assert!(position("- Attendance: 90\n") < position("- Parental_Involvement: Medium\n"));
        assert!(position("- Physical_Activity: 4\n") < position("- Gender: Female\n"));
    }

    #[test]
    fn report_shows_each_failure_domain() {
        let mut failed = outcome();
        failed.prediction = Err(PredictionError::MissingFeature("Gender".to_string()));
        failed.insights = None;
        let report = build_report(&failed, generated_at());
        assert!(report.contains("Prediction Failed: missing feature Gender"));
        assert!(report.contains("No insights without a prediction."));

        let mut plotting = outcome();
        plotting.insights = Some(Err(InsightError::MissingColumn("Exam_Score")));
        let report = build_report(&plotting, generated_at());
        assert!(report.contains("Predicted Exam Score: 67.43"));
        assert!(report.contains("Plotting Failed: history has no Exam_Score column"));
    }
}
