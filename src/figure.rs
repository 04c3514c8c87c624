use serde::{Deserialize, Serialize};

const BACKGROUND: &str = "#111111";
const TEXT_COLOR: &str = "#7FDBFF";

/// Plotly-style scatter trace. Only what the two dashboard charts need.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Trace {
    pub x: Vec<String>,
    pub y: Vec<f64>,
    pub mode: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Line>,
}

impl Trace {
    pub fn lines(name: &str, x: Vec<String>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            mode: "lines".to_string(),
            name: name.to_string(),
            line: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.line = Some(Line {
            color: color.to_string(),
        });
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Line {
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
}

impl Axis {
    fn titled(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            visible: None,
        }
    }

    fn hidden() -> Self {
        Self {
            title: None,
            visible: Some(false),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Annotation {
    pub text: String,
    pub xref: String,
    pub yref: String,
    pub showarrow: bool,
    pub font: AnnotationFont,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AnnotationFont {
    pub size: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Layout {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub paper_bgcolor: String,
    pub plot_bgcolor: String,
    pub font_color: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

fn dark_layout(title: &str) -> Layout {
    Layout {
        title: Some(title.to_string()),
        xaxis: Axis::titled("Date"),
        yaxis: Axis::titled("Close"),
        paper_bgcolor: BACKGROUND.to_string(),
        plot_bgcolor: BACKGROUND.to_string(),
        font_color: TEXT_COLOR.to_string(),
        annotations: Vec::new(),
    }
}

/// Train/test comparison: observed training data, one-step test predictions
/// (red) and the test ground truth, all in price space.
pub fn train_test_figure(
    title: &str,
    train_dates: Vec<String>,
    train_closes: Vec<f64>,
    prediction_dates: Vec<String>,
    predictions: Vec<f64>,
    test_dates: Vec<String>,
    test_closes: Vec<f64>,
) -> Figure {
    Figure {
        data: vec![
            Trace::lines("Data", train_dates, train_closes),
            Trace::lines("Prediction", prediction_dates, predictions).with_color("red"),
            Trace::lines("Ground Truth", test_dates, test_closes),
        ],
        layout: dark_layout(title),
    }
}

/// Full observed history plus the autoregressive forecast.
pub fn future_figure(
    dates: Vec<String>,
    closes: Vec<f64>,
    forecast_dates: Vec<String>,
    forecast: Vec<f64>,
) -> Figure {
    Figure {
        data: vec![
            Trace::lines("Data", dates, closes),
            Trace::lines("Prediction", forecast_dates, forecast),
        ],
        layout: dark_layout("FUTURE PREDICTION"),
    }
}

/// Uniform failure placeholder: hidden axes, fixed annotation. Every failure
/// cause renders identically; the cause only reaches the log.
pub fn empty_figure() -> Figure {
    Figure {
        data: Vec::new(),
        layout: Layout {
            title: None,
            xaxis: Axis::hidden(),
            yaxis: Axis::hidden(),
            paper_bgcolor: BACKGROUND.to_string(),
            plot_bgcolor: BACKGROUND.to_string(),
            font_color: TEXT_COLOR.to_string(),
            annotations: vec![Annotation {
                text: "No matching data found\nOr\nYou entered incorrect stock name..."
                    .to_string(),
                xref: "paper".to_string(),
                yref: "paper".to_string(),
                showarrow: false,
                font: AnnotationFont { size: 28 },
            }],
        },
    }
}
