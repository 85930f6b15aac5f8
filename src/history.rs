use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::InsightError;

pub const EXAM_SCORE: &str = "Exam_Score";
pub const HOURS_STUDIED: &str = "Hours_Studied";
pub const MOTIVATION_LEVEL: &str = "Motivation_Level";

#[derive(Debug, Clone)]
pub struct HistoricalDataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HistoricalDataset {
    pub fn load(path: &Path) -> Result<Self, InsightError> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = dataset.rows.len(),
            columns = dataset.headers.len(),
            "history loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InsightError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cells(&self, index: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| {
            row.get(index)
                .map(String::as_str)
                .filter(|cell| !cell.is_empty())
        })
    }

    pub fn numeric_column(&self, index: usize) -> Option<Vec<Option<f64>>> {
        let mut values = Vec::with_capacity(self.rows.len());
        let mut present = 0usize;
        for cell in self.cells(index) {
            match cell {
                Some(text) => {
                    let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
                    present += 1;
                    values.push(Some(value));
                }
                None => values.push(None),
            }
        }
        (present > 0).then_some(values)
    }

    pub fn numeric_columns(&self) -> Vec<(String, Vec<Option<f64>>)> {
        self.headers
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                self.numeric_column(index)
                    .map(|values| (name.clone(), values))
            })
            .collect()
    }

    pub fn require_numeric(&self, name: &'static str) -> Result<Vec<Option<f64>>, InsightError> {
        let index = self
            .column_index(name)
            .ok_or(InsightError::MissingColumn(name))?;

        let mut values = Vec::with_capacity(self.rows.len());
        for (row, cell) in self.cells(index).enumerate() {
            match cell {
                Some(text) => {
                    let value = text
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .ok_or_else(|| InsightError::NotNumeric {
                            column: name,
                            row: row + 1,
                            value: text.to_string(),
                        })?;
                    values.push(Some(value));
                }
                None => values.push(None),
            }
        }

        if values.iter().all(Option::is_none) {
            return Err(InsightError::Empty(name));
        }
        Ok(values)
    }

    pub fn require_text(&self, name: &'static str) -> Result<Vec<Option<&str>>, InsightError> {
        let index = self
            .column_index(name)
            .ok_or(InsightError::MissingColumn(name))?;
        Ok(self.cells(index).collect())
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_CSV: &str = "\
Hours_Studied,Attendance,Motivation_Level,Sleep_Hours,Exam_Score
23,84,Low,7,67
19,64,Low,8,61
24,98,Medium,7,74
29,89,Medium,8,71
19,92,Medium,6,70
10,75,High,,65
";

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn detects_numeric_columns_in_file_order() {
        let dataset = HistoricalDataset::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let names: Vec<String> = dataset
            .numeric_columns()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["Hours_Studied", "Attendance", "Sleep_Hours", "Exam_Score"]
        );
    }

    #[test]
    fn empty_cells_are_missing_values() {
        let dataset = HistoricalDataset::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        let sleep = dataset.require_numeric("Sleep_Hours").unwrap();
        assert_eq!(sleep.len(), 6);
        assert_eq!(sleep[5], None);
        assert_eq!(sleep[0], Some(7.0));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let dataset = HistoricalDataset::from_reader("Attendance\n80\n".as_bytes()).unwrap();
        let err = dataset.require_numeric(EXAM_SCORE).unwrap_err();
        assert_eq!(err.to_string(), "history has no Exam_Score column");
    }

    #[test]
    fn text_in_required_numeric_column_is_reported() {
        let dataset =
            HistoricalDataset::from_reader("Exam_Score\n70\nabsent\n".as_bytes()).unwrap();
        let err = dataset.require_numeric(EXAM_SCORE).unwrap_err();
        assert!(matches!(err, InsightError::NotNumeric { row: 2, .. }));
    }

    #[test]
    fn non_finite_cells_in_required_column_are_rejected() {
        for cell in ["inf", "NaN", "-infinity"] {
            let csv = format!("Hours_Studied,Motivation_Level,Exam_Score\n3,Low,60\n4,High,{cell}\n");
            let dataset = HistoricalDataset::from_reader(csv.as_bytes()).unwrap();
            let err = dataset.require_numeric(EXAM_SCORE).unwrap_err();
            assert!(
                matches!(err, InsightError::NotNumeric { row: 2, ref value, .. } if value == cell),
                "{cell} accepted"
            );
        }
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
        let dataset = HistoricalDataset::load(file.path()).unwrap();
        assert_eq!(dataset.rows.len(), 6);
        let motivation = dataset.require_text(MOTIVATION_LEVEL).unwrap();
        assert_eq!(motivation[2], Some("Medium"));
    }

    #[test]
    fn load_of_missing_file_is_an_insight_error() {
        let err = HistoricalDataset::load(Path::new("/nonexistent/history.csv")).unwrap_err();
        assert!(matches!(err, InsightError::Io(_)));
    }
}
