// Charts of the feature scores.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::survey::*;

/// Width of one bar, in category units.
const BAR_WIDTH: f64 = 0.1;

const OPTION_COLORS: [(&str, RGBColor); 5] = [
    ("AC", RGBColor(0xd0, 0x12, 0x12)),
    ("RR", RGBColor(0x23, 0xba, 0x15)),
    ("CR", RGBColor(0x0d, 0x2a, 0xee)),
    ("SGT", RGBColor(0xff, 0xbf, 0x00)),
    ("JA", RGBColor(0xec, 0x25, 0xcc)),
];

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ChartKind {
    /// One bar per option, summed over all the respondents.
    Total,
    PriceBand,
    BuyingSentiment,
}

impl ChartKind {
    pub fn parse(s: &str) -> Option<ChartKind> {
        match s {
            "total" => Some(ChartKind::Total),
            "price" => Some(ChartKind::PriceBand),
            "buy" => Some(ChartKind::BuyingSentiment),
            _ => None,
        }
    }

    pub fn file_suffix(&self) -> &'static str {
        match self {
            ChartKind::Total => "total",
            ChartKind::PriceBand => "price",
            ChartKind::BuyingSentiment => "buy",
        }
    }

    pub fn caption(&self, title: &str) -> String {
        match self {
            ChartKind::Total => format!("Total Feature Scores {}", title),
            ChartKind::PriceBand => format!("Feature Scores per Price Band {}", title),
            ChartKind::BuyingSentiment => format!("Feature Scores per BUY {}", title),
        }
    }

    fn x_desc(&self) -> &'static str {
        match self {
            ChartKind::Total => "Feature",
            ChartKind::PriceBand => "Price Band",
            ChartKind::BuyingSentiment => "BS",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct ChartMode {
    /// Each category as a share of its own total.
    pub percentage: bool,
    /// One line per option instead of grouped bars.
    pub line: bool,
}

impl ChartMode {
    fn y_desc(&self) -> &'static str {
        if self.percentage {
            "Feature score (%)"
        } else {
            "Feature score"
        }
    }
}

/// The values of one option across the categories. `None` is an undefined value.
#[derive(PartialEq, Debug, Clone)]
pub struct ChartSeries {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

fn option_color(name: &str, idx: usize) -> RGBColor {
    OPTION_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(OPTION_COLORS[idx % OPTION_COLORS.len()].1)
}

/// One series per option, one value per category, in category order.
pub fn grouped_series(list: &AggregatedScoreList, percentage: bool) -> Vec<ChartSeries> {
    let options: Vec<String> = match list.categories.first() {
        Some(c) => c.tally.scores.iter().map(|(n, _)| n.clone()).collect(),
        None => return Vec::new(),
    };
    let per_category: Vec<Vec<Option<f64>>> = list
        .categories
        .iter()
        .map(|c| {
            if percentage {
                match c.tally.percentages() {
                    Some(p) => p.iter().map(|(_, v)| Some(*v)).collect(),
                    None => {
                        warn!(
                            "grouped_series: {} {:?} has no scores, its share is undefined",
                            list.column, c.category.label
                        );
                        vec![None; options.len()]
                    }
                }
            } else {
                c.tally.values().iter().map(|v| Some(*v as f64)).collect()
            }
        })
        .collect();
    options
        .iter()
        .enumerate()
        .map(|(idx, name)| ChartSeries {
            label: name.clone(),
            values: per_category.iter().map(|vals| vals[idx]).collect(),
        })
        .collect()
}

pub fn render_grouped_chart(
    list: &AggregatedScoreList,
    labels: &[String],
    kind: ChartKind,
    title: &str,
    mode: ChartMode,
    path: &str,
    size: (u32, u32),
) -> SurveyResult<()> {
    info!("render_grouped_chart: writing {:?}", path);
    let series = grouped_series(list, mode.percentage);
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_grouped(
        root,
        &kind.caption(title),
        kind.x_desc(),
        mode.y_desc(),
        labels,
        &series,
        mode.line,
    )
    .map_err(|e| SurveyError::Drawing {
        path: path.to_string(),
        message: e.to_string(),
    })
}

pub fn render_total_chart(
    tally: &FeatureTally,
    title: &str,
    path: &str,
    size: (u32, u32),
) -> SurveyResult<()> {
    info!("render_total_chart: writing {:?}", path);
    let root = SVGBackend::new(path, size).into_drawing_area();
    draw_total(root, &ChartKind::Total.caption(title), tally).map_err(|e| {
        SurveyError::Drawing {
            path: path.to_string(),
            message: e.to_string(),
        }
    })
}

// The label of the category at a tick position. Ticks between categories stay blank.
fn tick_label(labels: &[String], x: f64) -> String {
    let pos = x.round();
    if (x - pos).abs() > 1e-6 || pos < 0.0 {
        return String::new();
    }
    labels.get(pos as usize).cloned().unwrap_or_default()
}

fn y_range_max(series: &[ChartSeries]) -> f64 {
    let y_max = series
        .iter()
        .flat_map(|s| s.values.iter().flatten())
        .cloned()
        .fold(0.0, f64::max);
    if y_max > 0.0 {
        y_max * 1.1
    } else {
        1.0
    }
}

pub fn draw_grouped<DB>(
    root: DrawingArea<DB, Shift>,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
    labels: &[String],
    series: &[ChartSeries],
    line: bool,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let num_categories = labels.len();
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            -0.5f64..(num_categories as f64 - 0.5),
            0f64..y_range_max(series),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(num_categories.max(1))
        .x_label_formatter(&|x| tick_label(labels, *x))
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()?;

    let center = (series.len() as f64 - 1.0) / 2.0;
    for (idx, s) in series.iter().enumerate() {
        let color = option_color(&s.label, idx);
        if line {
            // Undefined values break the line.
            let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
            for (pos, v) in s.values.iter().enumerate() {
                match (v, segments.last_mut()) {
                    (Some(y), Some(seg)) => seg.push((pos as f64, *y)),
                    _ => segments.push(Vec::new()),
                }
            }
            for (seg_idx, seg) in segments.iter().enumerate() {
                let drawn = chart.draw_series(LineSeries::new(seg.iter().cloned(), &color))?;
                if seg_idx == 0 {
                    drawn.label(s.label.as_str()).legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], &color)
                    });
                }
                // A value between two gaps is a segment of one point: only its marker shows.
                chart.draw_series(seg.iter().map(|p| Circle::new(*p, 3, color.filled())))?;
            }
        } else {
            let offset = (idx as f64 - center) * BAR_WIDTH;
            let bars = s.values.iter().enumerate().filter_map(|(pos, v)| {
                v.map(|y| {
                    let x = pos as f64 + offset;
                    Rectangle::new(
                        [(x - BAR_WIDTH / 2.0, 0.0), (x + BAR_WIDTH / 2.0, y)],
                        color.filled(),
                    )
                })
            });
            chart
                .draw_series(bars)?
                .label(s.label.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

pub fn draw_total<DB>(
    root: DrawingArea<DB, Shift>,
    caption: &str,
    tally: &FeatureTally,
) -> Result<(), Box<dyn Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let labels: Vec<String> = tally.scores.iter().map(|(n, _)| n.clone()).collect();
    let series = vec![ChartSeries {
        label: "total".to_string(),
        values: tally.values().iter().map(|v| Some(*v as f64)).collect(),
    }];
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            -0.5f64..(labels.len() as f64 - 0.5),
            0f64..y_range_max(&series),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len().max(1))
        .x_label_formatter(&|x| tick_label(&labels, *x))
        .x_desc(ChartKind::Total.x_desc())
        .y_desc(ChartMode::default().y_desc())
        .draw()?;

    chart.draw_series(tally.scores.iter().enumerate().map(|(pos, (name, v))| {
        let x = pos as f64;
        Rectangle::new(
            [(x - 0.25, 0.0), (x + 0.25, *v as f64)],
            option_color(name, pos).filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}
