// Chart descriptor domain models
use super::label::{Label, LabelLookup};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    Line,
    Bar,
    RangeArea,
    Candlestick,
}

/// The `y` part of a series point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PointValue {
    Single(Option<f64>),
    Range([f64; 2]),
    /// `[open, high, low, close]`
    Candle([Option<f64>; 4]),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Milliseconds since the epoch.
    pub x: i64,
    pub y: PointValue,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub interpolated: bool,
}

impl SeriesPoint {
    pub fn new(timestamp: i64, y: PointValue, interpolated: bool) -> Self {
        Self {
            x: timestamp * 1000,
            y,
            interpolated,
        }
    }

    pub fn single(timestamp: i64, value: Option<f64>, interpolated: bool) -> Self {
        Self::new(timestamp, PointValue::Single(value), interpolated)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: Label,
    pub kind: SeriesKind,
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(name: Label, kind: SeriesKind, points: Vec<SeriesPoint>) -> Self {
        Self { name, kind, points }
    }

    pub fn values(&self) -> Vec<Option<f64>> {
        self.points
            .iter()
            .map(|p| match p.y {
                PointValue::Single(v) => v,
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceFormat {
    pub price_per_unit: f64,
    pub currency: String,
}

/// How axis values are turned into text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueFormat {
    pub decimals: u32,
    pub prefix: String,
    pub suffix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceFormat>,
}

impl ValueFormat {
    pub fn new(decimals: u32, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            decimals,
            prefix: prefix.into(),
            suffix: suffix.into(),
            price: None,
        }
    }

    /// Formats a value; a missing value renders as `?`, never as zero.
    pub fn format(&self, value: Option<f64>) -> String {
        match value {
            Some(v) => format!("{}{:.*}{}", self.prefix, self.decimals as usize, v, self.suffix),
            None => "?".to_string(),
        }
    }

    /// Like [`ValueFormat::format`], with the cost appended when a price is set.
    pub fn format_with_cost(&self, value: Option<f64>) -> String {
        let text = self.format(value);
        match (value, &self.price) {
            (Some(v), Some(price)) => {
                format!("{} = {:.2} {}", text, v * price.price_per_unit, price.currency)
            }
            _ => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisDescriptor {
    pub series_name: Label,
    pub title: Label,
    pub format: ValueFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub opposite: bool,
}

impl AxisDescriptor {
    pub fn new(name: Label, format: ValueFormat) -> Self {
        Self {
            series_name: name.clone(),
            title: name,
            format,
            min: None,
            max: None,
            opposite: false,
        }
    }
}

/// Vertical marker, one per detected counter reset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub x: i64,
    pub label: Label,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizedSeries {
    pub series: Vec<Series>,
    pub y_axes: Vec<AxisDescriptor>,
    pub annotations: Vec<Annotation>,
}

impl NormalizedSeries {
    pub fn new(series: Vec<Series>, y_axes: Vec<AxisDescriptor>, annotations: Vec<Annotation>) -> Self {
        Self {
            series,
            y_axes,
            annotations,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty() && self.annotations.is_empty()
    }

    /// Replaces every label key with text from the lookup.
    pub fn localize(mut self, labels: &dyn LabelLookup) -> Self {
        for series in &mut self.series {
            series.name = series.name.resolve(labels);
        }
        for axis in &mut self.y_axes {
            axis.series_name = axis.series_name.resolve(labels);
            axis.title = axis.title.resolve(labels);
        }
        for annotation in &mut self.annotations {
            annotation.label = annotation.label.resolve(labels);
        }
        self
    }
}
