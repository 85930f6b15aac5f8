use std::collections::HashMap;

use tracing::debug;

use crate::error::InsightError;
use crate::history::{HistoricalDataset, EXAM_SCORE, HOURS_STUDIED, MOTIVATION_LEVEL};
use crate::models::{CategorySummary, CohortContext, StudentRecord};

pub const DISTRIBUTION_BINS: usize = 30;
const DENSITY_POINTS: usize = 200;
// Bandwidths beyond the data the curve extends to on each side.
const DENSITY_CUT: f64 = 3.0;

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    // Row-major; NaN where undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct Distribution {
    pub bins: Vec<Bin>,
    // Gaussian KDE scaled to bin counts; empty when it cannot be estimated.
    pub density: Vec<(f64, f64)>,
    pub marker: f64,
}

#[derive(Debug, Clone)]
pub struct ScatterSeries {
    pub category: String,
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone)]
pub struct Scatter {
    pub series: Vec<ScatterSeries>,
    pub marker: f64,
}

#[derive(Debug, Clone)]
pub struct InsightSet {
    pub correlation: CorrelationMatrix,
    pub distribution: Distribution,
    pub scatter: Scatter,
    pub context: CohortContext,
}

pub fn render(
    history: &HistoricalDataset,
    record: &StudentRecord,
    prediction: f64,
) -> Result<InsightSet, InsightError> {
    let scores = history.require_numeric(EXAM_SCORE)?;
    let hours = history.require_numeric(HOURS_STUDIED)?;
    let motivation = history.require_text(MOTIVATION_LEVEL)?;

    let correlation = correlation_matrix(history)?;
    let observed: Vec<f64> = scores.iter().flatten().copied().collect();
    let distribution = score_distribution(&observed, prediction, DISTRIBUTION_BINS);
    let scatter = hours_vs_score(&hours, &scores, &motivation, record.hours_studied as f64);
    let context = CohortContext {
        percentile: percentile_of(&observed, prediction),
        by_motivation: summarize_by_category(&motivation, &scores),
    };

    debug!(
        numeric_columns = correlation.columns.len(),
        scores = observed.len(),
        series = scatter.series.len(),
        "insights computed"
    );

    Ok(InsightSet {
        correlation,
        distribution,
        scatter,
        context,
    })
}

pub fn correlation_matrix(history: &HistoricalDataset) -> Result<CorrelationMatrix, InsightError> {
    let columns = history.numeric_columns();
    if columns.is_empty() {
        return Err(InsightError::Empty("numeric"));
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in 0..i {
            let r = pearson(&columns[i].1, &columns[j].1);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.into_iter().map(|(name, _)| name).collect(),
        values,
    })
}

fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let count = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / count;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / count;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

// The last bin is closed.
pub fn score_distribution(scores: &[f64], prediction: f64, bins: usize) -> Distribution {
    let bins = bins.max(1);
    if scores.is_empty() {
        return Distribution {
            bins: Vec::new(),
            density: Vec::new(),
            marker: prediction,
        };
    }

    let mut min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for score in scores {
        let index = (((score - min) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    Distribution {
        bins: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| Bin {
                start: min + i as f64 * width,
                end: min + (i + 1) as f64 * width,
                count,
            })
            .collect(),
        density: density_curve(scores, width),
        marker: prediction,
    }
}

pub fn density_curve(scores: &[f64], bin_width: f64) -> Vec<(f64, f64)> {
    let n = scores.len();
    if n < 2 {
        return Vec::new();
    }

    let count = n as f64;
    let mean = scores.iter().sum::<f64>() / count;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (count - 1.0);
    let bandwidth = variance.sqrt() * count.powf(-0.2);
    if bandwidth <= 0.0 || !bandwidth.is_finite() {
        return Vec::new();
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min) - DENSITY_CUT * bandwidth;
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max) + DENSITY_CUT * bandwidth;
    let step = (max - min) / (DENSITY_POINTS - 1) as f64;
    let norm = 1.0 / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = count * bin_width;

    (0..DENSITY_POINTS)
        .map(|i| {
            let x = min + i as f64 * step;
            let density = scores
                .iter()
                .map(|s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm
                / count;
            (x, density * scale)
        })
        .collect()
}

pub fn hours_vs_score(
    hours: &[Option<f64>],
    scores: &[Option<f64>],
    categories: &[Option<&str>],
    marker: f64,
) -> Scatter {
    let mut series: Vec<ScatterSeries> = Vec::new();
    for ((x, y), category) in hours.iter().zip(scores).zip(categories) {
        let (Some(x), Some(y), Some(category)) = (x, y, category) else {
            continue;
        };
        match series.iter_mut().find(|s| s.category == *category) {
            Some(existing) => existing.points.push((*x, *y)),
            None => series.push(ScatterSeries {
                category: category.to_string(),
                points: vec![(*x, *y)],
            }),
        }
    }

    Scatter { series, marker }
}

pub fn percentile_of(scores: &[f64], value: f64) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let below = scores.iter().filter(|s| **s <= value).count();
    below as f64 * 100.0 / scores.len() as f64
}

pub fn summarize_by_category(
    categories: &[Option<&str>],
    scores: &[Option<f64>],
) -> Vec<CategorySummary> {
    let mut map: HashMap<&str, (usize, f64)> = HashMap::new();

    for (category, score) in categories.iter().zip(scores) {
        if let (Some(category), Some(score)) = (category, score) {
            let entry = map.entry(*category).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += score;
        }
    }

    let mut summaries: Vec<CategorySummary> = map
        .into_iter()
        .map(|(category, (count, total))| CategorySummary {
            category: category.to_string(),
            count,
            avg_score: total / count as f64,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    summaries
}
