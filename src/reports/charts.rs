//! Chart rendering
//!
//! Every function here takes data that already exists in a [`MetricBundle`], [`EpochLog`] or
//! prediction list and lays it out as an SVG document. No metric is computed while rendering.
//!
//! [`MetricBundle`]: crate::metrics::MetricBundle

use liquid::ParserBuilder;
use serde::Serialize;

use crate::{
    datasets::{Sentiment, NUM_LABELS},
    metrics::{ConfusionMatrix, PerClass},
    training::EpochLog,
};

use super::{Artifact, ReportError};

const CONFUSION_MATRIX: &str = include_str!("templates/confusion_matrix.svg.liquid");
const LOSS_CURVES: &str = include_str!("templates/loss_curves.svg.liquid");
const CLASS_METRICS: &str = include_str!("templates/class_metrics.svg.liquid");
const PREDICTION_DISTRIBUTION: &str = include_str!("templates/prediction_distribution.svg.liquid");

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 480.0;

/// Plot area: left, top, width, height
const PLOT: (f64, f64, f64, f64) = (80.0, 60.0, 520.0, 340.0);

const TRAIN_COLOR: &str = "#1f77b4";
const EVAL_COLOR: &str = "#ff7f0e";
const METRIC_COLORS: [&str; 3] = ["#1f77b4", "#ff7f0e", "#2ca02c"];
const DISTRIBUTION_COLOR: &str = "skyblue";

/// Light and dark ends of the heatmap's blue scale
const BLUES: [(f64, f64, f64); 2] = [(247.0, 251.0, 255.0), (8.0, 48.0, 107.0)];

#[derive(Serialize)]
struct Frame {
    title: String,
    width: f64,
    height: f64,
    x_label: String,
    y_label: String,
    x_label_x: f64,
    x_label_y: f64,
    y_label_x: f64,
    y_label_y: f64,
    plot_left: f64,
    plot_top: f64,
    plot_right: f64,
    plot_bottom: f64,
    x_ticks: Vec<Tick>,
    y_ticks: Vec<Tick>,
}

#[derive(Serialize)]
struct Tick {
    position: f64,
    label: String,
}

#[derive(Serialize)]
struct Cell {
    x: f64,
    y: f64,
    size: f64,
    fill: String,
    value: usize,
    text_x: f64,
    text_y: f64,
    text_fill: &'static str,
}

#[derive(Serialize)]
struct Series {
    name: &'static str,
    color: &'static str,
    points: String,
    markers: Vec<Point>,
    legend_y: f64,
}

#[derive(Serialize)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct Bar {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    color: &'static str,
    label: String,
    label_x: f64,
    label_y: f64,
}

#[derive(Serialize)]
struct LegendEntry {
    name: &'static str,
    color: &'static str,
    y: f64,
}

#[derive(Serialize)]
struct HeatmapContext {
    #[serde(flatten)]
    frame: Frame,
    cells: Vec<Cell>,
}

#[derive(Serialize)]
struct LineContext {
    #[serde(flatten)]
    frame: Frame,
    series: Vec<Series>,
}

#[derive(Serialize)]
struct BarContext {
    #[serde(flatten)]
    frame: Frame,
    bars: Vec<Bar>,
    legend: Vec<LegendEntry>,
}

/// Annotated heatmap of a confusion matrix
pub fn render_confusion_matrix(
    confusion_matrix: &ConfusionMatrix,
    model_label: &str,
) -> Result<Artifact, ReportError> {
    let (left, top, width, height) = PLOT;
    let size = (width.min(height) / NUM_LABELS as f64).floor();
    let left = left + (width - size * NUM_LABELS as f64) / 2.0;
    let max = confusion_matrix.max().max(1) as f64;

    let mut cells = Vec::with_capacity(NUM_LABELS * NUM_LABELS);
    for truth in Sentiment::ALL {
        for predicted in Sentiment::ALL {
            let value = confusion_matrix.get(truth, predicted);
            let x = left + predicted.index() as f64 * size;
            let y = top + truth.index() as f64 * size;
            let intensity = value as f64 / max;

            cells.push(Cell {
                x,
                y,
                size,
                fill: blues(intensity),
                value,
                text_x: round(x + size / 2.0),
                text_y: round(y + size / 2.0 + 5.0),
                text_fill: if intensity > 0.5 { "white" } else { "black" },
            });
        }
    }

    let centers = |origin: f64| {
        Sentiment::ALL
            .iter()
            .map(|label| Tick {
                position: round(origin + (label.index() as f64 + 0.5) * size),
                label: label.name().to_string(),
            })
            .collect::<Vec<_>>()
    };

    let frame = Frame {
        x_ticks: centers(left),
        y_ticks: centers(top),
        plot_left: left,
        plot_right: left + size * NUM_LABELS as f64,
        plot_bottom: top + size * NUM_LABELS as f64,
        ..Frame::new(
            format!("Confusion Matrix - {model_label}"),
            "Predicted",
            "True",
        )
    };

    render(
        "confusion_matrix.svg",
        CONFUSION_MATRIX,
        &HeatmapContext { frame, cells },
    )
}

/// Train and eval loss per epoch, with the train series truncated to the eval length
pub fn render_loss_curves(
    epoch_log: &EpochLog,
    model_label: &str,
) -> Result<Artifact, ReportError> {
    let curves = epoch_log.loss_curves();
    let (left, top, width, height) = PLOT;

    let n = curves.eval.len().max(curves.train.len());
    let y_max = curves
        .train
        .iter()
        .chain(&curves.eval)
        .copied()
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON)
        * 1.1;

    let x_at = |i: usize| {
        if n <= 1 {
            left + width / 2.0
        } else {
            left + width * i as f64 / (n - 1) as f64
        }
    };
    let y_at = |v: f64| top + height * (1.0 - v / y_max);

    let series = [
        ("Train Loss", TRAIN_COLOR, &curves.train),
        ("Eval Loss", EVAL_COLOR, &curves.eval),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (name, color, values))| {
        let markers: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(j, v)| Point {
                x: round(x_at(j)),
                y: round(y_at(*v)),
            })
            .collect();

        Series {
            name,
            color,
            points: markers
                .iter()
                .map(|p| format!("{},{}", p.x, p.y))
                .collect::<Vec<_>>()
                .join(" "),
            markers,
            legend_y: top + 20.0 + 20.0 * i as f64,
        }
    })
    .collect();

    let frame = Frame {
        x_ticks: (0..n)
            .map(|i| Tick {
                position: round(x_at(i)),
                label: (i + 1).to_string(),
            })
            .collect(),
        y_ticks: value_ticks(y_max, 5, |v| format!("{v:.2}")),
        ..Frame::new(format!("Loss Curves - {model_label}"), "Epoch", "Loss")
    };

    render("loss_curves.svg", LOSS_CURVES, &LineContext { frame, series })
}

/// Grouped precision, recall and F1 bars for each class
pub fn render_class_metrics(
    per_class: &PerClass,
    model_label: &str,
) -> Result<Artifact, ReportError> {
    let (left, top, width, height) = PLOT;
    let group = width / NUM_LABELS as f64;
    let bar_width = group * 0.25;
    let names = ["Precision", "Recall", "F1 Score"];
    let series = [per_class.precision, per_class.recall, per_class.f1];

    let mut bars = Vec::with_capacity(NUM_LABELS * series.len());
    for label in Sentiment::ALL {
        let class = label.index();
        let group_left = left + group * class as f64 + (group - bar_width * 3.0) / 2.0;

        for (i, values) in series.iter().enumerate() {
            let value = values[class];
            let bar_height = height * value.clamp(0.0, 1.0);
            let x = group_left + bar_width * i as f64;

            bars.push(Bar {
                x: round(x),
                y: round(top + height - bar_height),
                width: round(bar_width),
                height: round(bar_height),
                color: METRIC_COLORS[i],
                label: format!("{value:.2}"),
                label_x: round(x + bar_width / 2.0),
                label_y: round(top + height - bar_height - 4.0),
            });
        }
    }

    let legend = names
        .into_iter()
        .zip(METRIC_COLORS)
        .enumerate()
        .map(|(i, (name, color))| LegendEntry {
            name,
            color,
            y: top + 20.0 + 20.0 * i as f64,
        })
        .collect();

    let frame = Frame {
        x_ticks: class_ticks(left, group),
        y_ticks: value_ticks(1.0, 5, |v| format!("{v:.1}")),
        ..Frame::new(format!("Per-Class Metrics - {model_label}"), "", "Score")
    };

    render(
        "class_metrics.svg",
        CLASS_METRICS,
        &BarContext {
            frame,
            bars,
            legend,
        },
    )
}

/// Number of predictions per class
pub fn render_prediction_distribution(
    y_pred: &[Sentiment],
    model_label: &str,
) -> Result<Artifact, ReportError> {
    let (left, top, width, height) = PLOT;
    let group = width / NUM_LABELS as f64;
    let bar_width = group * 0.8;

    let mut counts = [0usize; NUM_LABELS];
    for label in y_pred {
        counts[label.index()] += 1;
    }

    let y_max = (*counts.iter().max().unwrap_or(&0)).max(1) as f64 * 1.1;

    let bars = Sentiment::ALL
        .iter()
        .map(|label| {
            let count = counts[label.index()];
            let bar_height = height * count as f64 / y_max;
            let x = left + group * label.index() as f64 + (group - bar_width) / 2.0;

            Bar {
                x: round(x),
                y: round(top + height - bar_height),
                width: round(bar_width),
                height: round(bar_height),
                color: DISTRIBUTION_COLOR,
                label: count.to_string(),
                label_x: round(x + bar_width / 2.0),
                label_y: round(top + height - bar_height - 4.0),
            }
        })
        .collect();

    let frame = Frame {
        x_ticks: class_ticks(left, group),
        y_ticks: value_ticks(y_max, 5, |v| format!("{v:.0}")),
        ..Frame::new(
            format!("Prediction Distribution - {model_label}"),
            "",
            "Count",
        )
    };

    render(
        "prediction_distribution.svg",
        PREDICTION_DISTRIBUTION,
        &BarContext {
            frame,
            bars,
            legend: Vec::new(),
        },
    )
}

impl Frame {
    fn new(title: String, x_label: &str, y_label: &str) -> Self {
        let (left, top, width, height) = PLOT;

        Self {
            title,
            width: WIDTH,
            height: HEIGHT,
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            x_label_x: left + width / 2.0,
            x_label_y: top + height + 50.0,
            y_label_x: left - 55.0,
            y_label_y: top + height / 2.0,
            plot_left: left,
            plot_top: top,
            plot_right: left + width,
            plot_bottom: top + height,
            x_ticks: Vec::new(),
            y_ticks: Vec::new(),
        }
    }
}

fn render<C: Serialize>(
    file_name: &str,
    template: &str,
    context: &C,
) -> Result<Artifact, ReportError> {
    let template = ParserBuilder::with_stdlib().build()?.parse(template)?;
    let globals = liquid::model::to_object(context)?;

    Ok(Artifact::new(file_name.to_string(), template.render(&globals)?))
}

fn class_ticks(left: f64, group: f64) -> Vec<Tick> {
    Sentiment::ALL
        .iter()
        .map(|label| Tick {
            position: round(left + group * (label.index() as f64 + 0.5)),
            label: label.name().to_string(),
        })
        .collect()
}

fn value_ticks(max: f64, count: usize, label: impl Fn(f64) -> String) -> Vec<Tick> {
    let (_, top, _, height) = PLOT;

    (0..=count)
        .map(|i| {
            let value = max * i as f64 / count as f64;

            Tick {
                position: round(top + height * (1.0 - value / max)),
                label: label(value),
            }
        })
        .collect()
}

fn blues(intensity: f64) -> String {
    let [(r0, g0, b0), (r1, g1, b1)] = BLUES;
    let t = intensity.clamp(0.0, 1.0);
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;

    format!("#{:02x}{:02x}{:02x}", mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

fn round(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        datasets::Sentiment::{Negative, Neutral, Positive},
        metrics::evaluate,
    };

    use super::*;

    #[test]
    fn heatmap_annotates_every_cell() {
        let metrics = evaluate(
            &[Negative, Neutral, Positive, Negative],
            &[Negative, Neutral, Neutral, Negative],
        )
        .unwrap();

        let artifact = render_confusion_matrix(&metrics.confusion_matrix, "bert-base").unwrap();

        assert_eq!(artifact.file_name, "confusion_matrix.svg");
        assert!(artifact.contents.starts_with("<svg"));
        assert!(artifact.contents.contains("Confusion Matrix - bert-base"));
        assert_eq!(artifact.contents.matches("class=\"cell\"").count(), 9);
        assert!(artifact.contents.contains(&blues(1.0)));
        assert!(artifact.contents.contains(">Predicted<"));
    }

    #[test]
    fn loss_curves_plot_aligned_series() {
        let mut log = EpochLog::default();
        for step in 1..=30 {
            log.push_train(step * 10, step as f64 / 10.0, 1.0, 2e-5);
            if step % 10 == 0 {
                log.push_eval(step * 10, step as f64 / 10.0, 0.5, 0.7, 0.7);
            }
        }

        let artifact = render_loss_curves(&log, "roberta-base").unwrap();

        assert_eq!(artifact.contents.matches("class=\"marker\"").count(), 6);
        assert!(artifact.contents.contains("Train Loss"));
        assert!(artifact.contents.contains("Eval Loss"));
        assert!(artifact.contents.contains(">Epoch<"));
    }

    #[test]
    fn class_metrics_draw_three_bars_per_class() {
        let metrics =
            evaluate(&[Negative, Neutral, Positive], &[Negative, Positive, Positive]).unwrap();

        let artifact = render_class_metrics(&metrics.per_class, "bertweet-base").unwrap();

        assert_eq!(artifact.contents.matches("class=\"bar\"").count(), 9);
        assert!(artifact.contents.contains("F1 Score"));
    }

    #[test]
    fn prediction_distribution_counts_each_class() {
        let artifact =
            render_prediction_distribution(&[Positive, Positive, Neutral], "bert-base").unwrap();

        assert_eq!(artifact.contents.matches("class=\"bar\"").count(), 3);
        assert!(artifact.contents.contains(">2</text>"));
        assert!(artifact.contents.contains(">0</text>"));
    }

    #[test]
    fn titles_are_escaped() {
        let artifact = render_prediction_distribution(&[], "a<b>&c").unwrap();

        assert!(artifact.contents.contains("a&lt;b&gt;&amp;c"));
    }

    #[test]
    fn blues_spans_the_scale() {
        assert_eq!(blues(0.0), "#f7fbff");
        assert_eq!(blues(1.0), "#08306b");
    }
}
