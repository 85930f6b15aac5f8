use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::error::InsightError;
use crate::insights::{CorrelationMatrix, Distribution, InsightSet, Scatter};

const HEATMAP_SIZE: (u32, u32) = (1000, 600);
const CHART_SIZE: (u32, u32) = (800, 500);

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const UNDEFINED: RGBColor = RGBColor(200, 200, 200);
const SERIES_COLORS: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

#[derive(Debug, Clone)]
pub struct ChartSet {
    pub correlation: String,
    pub distribution: String,
    pub scatter: String,
}

impl ChartSet {
    pub const FILE_NAMES: [&'static str; 3] = [
        "feature_correlation.svg",
        "exam_score_distribution.svg",
        "hours_vs_exam_score.svg",
    ];

    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, InsightError> {
        std::fs::create_dir_all(dir)?;
        let documents = [&self.correlation, &self.distribution, &self.scatter];

        // Stage under temporary names so a failure keeps nothing.
        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(documents.len());
        for (name, svg) in Self::FILE_NAMES.iter().zip(documents) {
            let temp = dir.join(format!(".{name}.partial"));
            if let Err(err) = std::fs::write(&temp, svg) {
                discard(staged.iter().map(|(temp, _)| temp).chain([&temp]));
                return Err(err.into());
            }
            staged.push((temp, dir.join(name)));
        }

        let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
        for (temp, path) in &staged {
            if let Err(err) = std::fs::rename(temp, path) {
                discard(staged.iter().map(|(temp, _)| temp).chain(&written));
                return Err(err.into());
            }
            info!(path = %path.display(), "chart written");
            written.push(path.clone());
        }
        Ok(written)
    }
}

fn discard<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        let _ = std::fs::remove_file(path);
    }
}

pub fn draw_all(insights: &InsightSet) -> Result<ChartSet, InsightError> {
    Ok(ChartSet {
        correlation: draw_correlation(&insights.correlation)?,
        distribution: draw_distribution(&insights.distribution)?,
        scatter: draw_scatter(&insights.scatter)?,
    })
}

fn coolwarm(value: f64) -> RGBColor {
    const COOL: (f64, f64, f64) = (59.0, 76.0, 192.0);
    const MID: (f64, f64, f64) = (221.0, 221.0, 221.0);
    const WARM: (f64, f64, f64) = (180.0, 4.0, 38.0);

    let t = value.clamp(-1.0, 1.0);
    let (from, to, f) = if t < 0.0 {
        (MID, COOL, -t)
    } else {
        (MID, WARM, t)
    };
    let lerp = |a: f64, b: f64| (a + (b - a) * f).round() as u8;
    RGBColor(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

pub fn draw_correlation(matrix: &CorrelationMatrix) -> Result<String, InsightError> {
    let n = matrix.columns.len() as i32;
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, HEATMAP_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Feature Correlation", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(140)
            .build_cartesian_2d(0..n, 0..n)?;

        // Row 0 is drawn at the top, as in a table.
        let name = |index: i32| {
            usize::try_from(index)
                .ok()
                .and_then(|i| matrix.columns.get(i))
                .cloned()
                .unwrap_or_default()
        };
        let x_label = |x: &i32| name(*x);
        let y_label = |y: &i32| name(n - 1 - *y);
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n as usize + 1)
            .y_labels(n as usize + 1)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .draw()?;

        let cell = |row: usize, col: usize| {
            let x = col as i32;
            let y = n - 1 - row as i32;
            (x, y, matrix.get(row, col))
        };
        let cells: Vec<(i32, i32, f64)> = (0..matrix.columns.len())
            .flat_map(|row| (0..matrix.columns.len()).map(move |col| (row, col)))
            .map(|(row, col)| cell(row, col))
            .collect();

        chart.draw_series(cells.iter().map(|&(x, y, value)| {
            let color = if value.is_nan() {
                UNDEFINED
            } else {
                coolwarm(value)
            };
            Rectangle::new([(x, y), (x + 1, y + 1)], color.filled())
        }))?;

        chart.draw_series(cells.iter().filter(|(_, _, value)| !value.is_nan()).map(
            |&(x, y, value)| {
                Text::new(
                    format!("{value:.2}"),
                    (x, y + 1),
                    ("sans-serif", 13).into_font(),
                )
            },
        ))?;

        root.present()?;
    }
    Ok(svg)
}

pub fn draw_distribution(distribution: &Distribution) -> Result<String, InsightError> {
    let marker = distribution.marker;
    let x_min = distribution
        .bins
        .first()
        .map_or(marker, |bin| bin.start.min(marker));
    let x_max = distribution
        .bins
        .last()
        .map_or(marker, |bin| bin.end.max(marker));
    let (x_min, x_max) = padded(x_min, x_max);
    let y_max = distribution
        .bins
        .iter()
        .map(|bin| bin.count as f64)
        .chain(distribution.density.iter().map(|&(_, y)| y))
        .fold(1.0, f64::max)
        * 1.1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Exam Score Distribution", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Exam_Score")
            .y_desc("Count")
            .draw()?;

        chart.draw_series(distribution.bins.iter().map(|bin| {
            Rectangle::new(
                [(bin.start, 0.0), (bin.end, bin.count as f64)],
                SKY_BLUE.filled(),
            )
        }))?;

        if !distribution.density.is_empty() {
            chart.draw_series(LineSeries::new(
                distribution.density.iter().copied(),
                STEEL_BLUE.stroke_width(2),
            ))?;
        }

        chart
            .draw_series(LineSeries::new(
                vec![(marker, 0.0), (marker, y_max)],
                RED.stroke_width(2),
            ))?
            .label("Your Score")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(svg)
}

pub fn draw_scatter(scatter: &Scatter) -> Result<String, InsightError> {
    let marker = scatter.marker;
    let points = scatter.series.iter().flat_map(|s| s.points.iter());
    let (mut x_min, mut x_max) = (marker, marker);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() {
        (y_min, y_max) = (0.0, 100.0);
    }
    let (x_min, x_max) = padded(x_min, x_max);
    let (y_min, y_max) = padded(y_min, y_max);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Hours Studied vs Exam Score", ("sans-serif", 24))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

        chart
            .configure_mesh()
            .x_desc("Hours_Studied")
            .y_desc("Exam_Score")
            .draw()?;

        for (index, series) in scatter.series.iter().enumerate() {
            let color = SERIES_COLORS[index % SERIES_COLORS.len()];
            chart
                .draw_series(
                    series
                        .points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 3, color.filled())),
                )?
                .label(series.category.as_str())
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }

        chart
            .draw_series(LineSeries::new(
                vec![(marker, y_min), (marker, y_max)],
                ORANGE.stroke_width(2),
            ))?
            .label("You")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE.stroke_width(2)));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(svg)
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    let span = if max > min { max - min } else { 1.0 };
    (min - span * 0.05, max + span * 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::{HistoricalDataset, SAMPLE_CSV};
    use crate::insights::{render, score_distribution};
    use crate::models::sample_record;

    fn sample_insights() -> InsightSet {
        let history = HistoricalDataset::from_reader(SAMPLE_CSV.as_bytes()).unwrap();
        render(&history, &sample_record(), 68.5).unwrap()
    }

    #[test]
    fn coolwarm_endpoints() {
        assert_eq!(coolwarm(-1.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.0), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
        assert_eq!(coolwarm(3.0), coolwarm(1.0));
    }

    #[test]
    fn draws_three_svg_documents() {
        let charts = draw_all(&sample_insights()).unwrap();
        for svg in [&charts.correlation, &charts.distribution, &charts.scatter] {
            assert!(svg.contains("<svg"));
        }
        assert!(charts.correlation.contains("1.00"));
        assert!(charts.distribution.contains("Your Score"));
        assert!(charts.scatter.contains("Medium"));
        assert!(charts.scatter.contains("You"));
    }

    #[test]
    fn distribution_without_scores_still_draws_marker() {
        let svg = draw_distribution(&score_distribution(&[], 55.0, 30)).unwrap();
        assert!(svg.contains("Your Score"));
    }

    #[test]
    fn write_to_creates_one_file_per_chart() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("charts");
        let written = draw_all(&sample_insights()).unwrap().write_to(&out).unwrap();
        assert_eq!(written.len(), 3);
        for (path, name) in written.iter().zip(ChartSet::FILE_NAMES) {
            assert_eq!(path.file_name().unwrap(), name);
            assert!(path.exists());
        }
    }

    #[test]
    fn failed_write_leaves_no_partial_set() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join(ChartSet::FILE_NAMES[2]);
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        let result = draw_all(&sample_insights()).unwrap().write_to(dir.path());
        assert!(matches!(result, Err(InsightError::Io(_))));

        let mut remaining: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();
        assert_eq!(remaining, vec![ChartSet::FILE_NAMES[2].to_string()]);
    }

    #[test]
    fn distribution_draws_density_curve() {
        let scores: Vec<f64> = (0..30).map(|i| 60.0 + (i % 7) as f64 * 3.0).collect();
        let distribution = score_distribution(&scores, 66.0, 30);
        assert!(!distribution.density.is_empty());
        let with_curve = draw_distribution(&distribution).unwrap();
        let without_curve = draw_distribution(&Distribution {
            density: Vec::new(),
            ..distribution
        })
        .unwrap();
        assert!(
            with_curve.matches("<polyline").count() > without_curve.matches("<polyline").count()
        );
    }

    #[test]
    fn padded_handles_degenerate_ranges() {
        let (lo, hi) = padded(5.0, 5.0);
        assert!((lo - 4.95).abs() < 1e-9 && (hi - 5.05).abs() < 1e-9);
        let (lo, hi) = padded(0.0, 10.0);
        assert!(lo < 0.0 && hi > 10.0);
    }
}
