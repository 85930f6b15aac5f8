use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::charts;
use crate::error::InsightError;
use crate::history::HistoricalDataset;
use crate::insights;
use crate::models::{CohortContext, PredictionResult, StudentRecord, Suggestions};
use crate::predict::{self, Scorer};
use crate::suggest;

#[derive(Debug)]
pub struct ChartOutput {
    pub files: Vec<PathBuf>,
    pub context: CohortContext,
}

#[derive(Debug)]
pub struct Outcome {
    pub request_id: Uuid,
    pub record: StudentRecord,
    pub prediction: PredictionResult,
    pub insights: Option<Result<ChartOutput, InsightError>>,
    pub suggestions: Suggestions,
}

pub struct Session<'a> {
    pub scorer: &'a dyn Scorer,
    pub dataset: &'a Path,
    pub charts_dir: &'a Path,
}

impl Session<'_> {
    pub fn run(&self, record: StudentRecord) -> Outcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("cycle", %request_id);
        let _guard = span.enter();

        let prediction = predict::predict(self.scorer, &record);
        let insights = match &prediction {
            Ok(score) => {
                info!(score, "prediction ready");
                let result = self.insights(&record, *score);
                if let Err(err) = &result {
                    warn!(error = %err, "insights failed");
                }
                Some(result)
            }
            Err(err) => {
                warn!(error = %err, "prediction failed");
                None
            }
        };
        let suggestions = suggest::suggest(&record);

        Outcome {
            request_id,
            record,
            prediction,
            insights,
            suggestions,
        }
    }

    fn insights(&self, record: &StudentRecord, prediction: f64) -> Result<ChartOutput, InsightError> {
        let history = HistoricalDataset::load(self.dataset)?;
        let set = insights::render(&history, record, prediction)?;
        let files = charts::draw_all(&set)?.write_to(self.charts_dir)?;
        Ok(ChartOutput {
            files,
            context: set.context,
        })
    }
}
