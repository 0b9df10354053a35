use std::cmp::Ordering;
use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use plotters::prelude::*;
use thiserror::Error;

use crate::csv_table::CsvTable;

pub const EXPERIENCE_COLUMN: &str = "Internship_Experience";
pub const OUTCOME_COLUMN: &str = "Placement";

const WIDTH: u32 = 800;
const HEIGHT: u32 = 600;

const PLACED: RGBColor = RGBColor(135, 206, 235);
const NOT_PLACED: RGBColor = RGBColor(250, 128, 114);
const PALETTE: [RGBColor; 6] = [
    RGBColor(102, 194, 165),
    RGBColor(141, 160, 203),
    RGBColor(231, 138, 195),
    RGBColor(166, 216, 84),
    RGBColor(255, 217, 47),
    RGBColor(229, 196, 148),
];

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("No rows with both values present")]
    NoData,

    #[error("{0}")]
    Drawing(String),
}

fn drawing<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Drawing(err.to_string())
}

/// Text drawn around the chart.
#[derive(Debug, Clone)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub legend_title: String,
}

impl ChartLabels {
    pub fn placement() -> Self {
        Self {
            title: "Placement Status by Internship Experience".into(),
            x_label: "Internship Experience".into(),
            y_label: "Number of Students".into(),
            legend_title: "Placement".into(),
        }
    }
}

/// Row counts per `(category, group)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedCounts {
    /// Distinct x-axis values, in natural order.
    pub categories: Vec<String>,
    /// Distinct hue values. `Yes` then `No` lead, the rest follow in order.
    pub groups: Vec<String>,
    /// `counts[category][group]`.
    counts: Vec<Vec<u32>>,
}

impl GroupedCounts {
    /// Count rows of `table` by the values of `x_col` and `hue_col`.
    ///
    /// Returns `None` if either column is missing. Rows where either value is
    /// blank are skipped.
    pub fn from_table(table: &CsvTable, x_col: &str, hue_col: &str) -> Option<Self> {
        let x_idx = table.column_index(x_col)?;
        let hue_idx = table.column_index(hue_col)?;

        let mut pairs: BTreeMap<(String, String), u32> = BTreeMap::new();
        for row in &table.rows {
            let x = row[x_idx].trim();
            let hue = row[hue_idx].trim();
            if x.is_empty() || hue.is_empty() {
                continue;
            }
            *pairs.entry((x.to_string(), hue.to_string())).or_default() += 1;
        }

        let mut categories: Vec<String> = pairs.keys().map(|(x, _)| x.clone()).collect();
        categories.sort_by(|a, b| natural_cmp(a, b));
        categories.dedup();

        let mut groups: Vec<String> = pairs.keys().map(|(_, h)| h.clone()).collect();
        groups.sort_by(|a, b| group_rank(a).cmp(&group_rank(b)).then_with(|| natural_cmp(a, b)));
        groups.dedup();

        let mut counts = vec![vec![0; groups.len()]; categories.len()];
        for ((x, hue), n) in pairs {
            let ci = categories.iter().position(|c| *c == x);
            let gi = groups.iter().position(|g| *g == hue);
            if let (Some(ci), Some(gi)) = (ci, gi) {
                counts[ci][gi] = n;
            }
        }

        Some(Self {
            categories,
            groups,
            counts,
        })
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

fn group_rank(group: &str) -> u8 {
    match group {
        "Yes" => 0,
        "No" => 1,
        _ => 2,
    }
}

/// Numbers compare by value, everything else as text.
fn natural_cmp(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

fn group_style(group: &str, index: usize) -> (String, RGBColor) {
    match group {
        "Yes" => ("Placed".into(), PLACED),
        "No" => ("Not Placed".into(), NOT_PLACED),
        other => (other.to_string(), PALETTE[index % PALETTE.len()]),
    }
}

/// Draw side-by-side bars per category and return the SVG document.
pub fn render_grouped_bar(
    counts: &GroupedCounts,
    labels: &ChartLabels,
) -> Result<String, ChartError> {
    if counts.is_empty() {
        return Err(ChartError::NoData);
    }

    let n = counts.categories.len();
    let group_count = counts.groups.len();
    let y_max = counts.max_count() + counts.max_count() / 10 + 1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(drawing)?;

        // Category i is centered on x = i.
        let mut chart = ChartBuilder::on(&root)
            .caption(&labels.title, ("sans-serif", 24))
            .margin(16)
            .x_label_area_size(48)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0u32..y_max)
            .map_err(drawing)?;

        let category_label = |x: &f64| {
            let i = x.round();
            if (x - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            counts
                .categories
                .get(i as usize)
                .cloned()
                .unwrap_or_default()
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&category_label)
            .x_desc(&labels.x_label)
            .y_desc(&labels.y_label)
            .bold_line_style(BLACK.mix(0.12))
            .light_line_style(BLACK.mix(0.04))
            .draw()
            .map_err(drawing)?;

        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, u32)>>())
            .map_err(drawing)?
            .label(labels.legend_title.as_str())
            .legend(|(x, y)| EmptyElement::at((x, y)));

        let bar_width = 0.8 / group_count as f64;
        for (gi, group) in counts.groups.iter().enumerate() {
            let (label, color) = group_style(group, gi);
            let bars = counts.counts.iter().enumerate().map(|(ci, row)| {
                let left = ci as f64 - 0.4 + gi as f64 * bar_width;
                Rectangle::new([(left, 0), (left + bar_width, row[gi])], color.filled())
            });

            chart
                .draw_series(bars)
                .map_err(drawing)?
                .label(label)
                .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.3))
            .draw()
            .map_err(drawing)?;

        root.present().map_err(drawing)?;
    }

    Ok(svg)
}

/// Embed an SVG document in an `<img src>`.
pub fn to_data_uri(svg: &str) -> String {
    format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg))
}
