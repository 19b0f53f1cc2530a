//! Trailing-window aggregates over a borrowed [`Series`].
//!
//! The window ending at position `i` covers `max(0, i + 1 - window)..=i`.
//! A position yields a missing value when the window holds fewer than
//! `min_periods` elements or contains any missing element.

use cs_columnar::{Column, max_element, median, min_element, numeric};
use cs_types::{Element, Kind};

use crate::{Series, SeriesError, quantile_of};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingOptions {
    pub window: usize,
    pub min_periods: usize,
}

impl RollingOptions {
    /// `min_periods` defaults to the window size. Zero disables the count
    /// threshold.
    #[must_use]
    pub fn new(window: usize) -> Self {
        Self {
            window,
            min_periods: window,
        }
    }

    #[must_use]
    pub fn with_min_periods(mut self, min_periods: usize) -> Self {
        self.min_periods = min_periods;
        self
    }

    pub fn validate(&self) -> Result<(), SeriesError> {
        if self.window == 0 {
            return Err(SeriesError::Argument {
                op: "rolling",
                detail: "window must be at least 1".to_owned(),
            });
        }
        if self.min_periods > self.window {
            return Err(SeriesError::Argument {
                op: "rolling",
                detail: format!(
                    "min_periods must be within 0..={} but was {}",
                    self.window, self.min_periods
                ),
            });
        }
        Ok(())
    }
}

impl Default for RollingOptions {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rolling<'a> {
    source: &'a Series,
    options: RollingOptions,
}

impl<'a> Rolling<'a> {
    #[must_use]
    pub fn new(source: &'a Series, options: RollingOptions) -> Self {
        Self { source, options }
    }

    #[must_use]
    pub fn source(&self) -> &'a Series {
        self.source
    }

    #[must_use]
    pub fn options(&self) -> RollingOptions {
        self.options
    }

    /// Window maximum, keeping the source kind.
    #[must_use]
    pub fn max(&self) -> Series {
        let kind = self.source.kind();
        self.aggregate("Max", kind, |window| {
            max_element(window)
                .cloned()
                .unwrap_or_else(|| Element::missing(kind))
        })
    }

    #[must_use]
    pub fn min(&self) -> Series {
        let kind = self.source.kind();
        self.aggregate("Min", kind, |window| {
            min_element(window)
                .cloned()
                .unwrap_or_else(|| Element::missing(kind))
        })
    }

    #[must_use]
    pub fn mean(&self) -> Series {
        self.aggregate_float("Mean", |window| numeric::mean(&floats(window)))
    }

    #[must_use]
    pub fn std_dev(&self) -> Series {
        self.aggregate_float("StdDev", |window| {
            numeric::sample_std_dev(&floats(window))
        })
    }

    /// NaN throughout for bool and string sources.
    #[must_use]
    pub fn median(&self) -> Series {
        let kind = self.source.kind();
        self.aggregate_float("Median", |window| median(kind, window))
    }

    /// NaN throughout for string sources.
    #[must_use]
    pub fn quantile(&self, p: f64) -> Series {
        let kind = self.source.kind();
        self.aggregate_float(&format!("Quantile({p})"), |window| {
            quantile_of(kind, window, p)
        })
    }

    /// Weighted window mean. The last weight applies to the newest element;
    /// a window shorter than `weights` uses the trailing weights only and is
    /// normalized by their sum.
    #[must_use]
    pub fn mean_by_weights(&self, weights: &[f64]) -> Series {
        if weights.is_empty() && !self.source.is_poisoned() {
            return self.reject(Kind::Float, SeriesError::Argument {
                op: "rolling",
                detail: "weights must not be empty".to_owned(),
            });
        }
        self.aggregate_float("MeanByWeights", |window| {
            let used = window.len().min(weights.len());
            let values = floats(&window[window.len() - used..]);
            numeric::weighted_mean(&values, &weights[weights.len() - used..])
                .unwrap_or(f64::NAN)
        })
    }

    fn aggregate_float(&self, name: &str, f: impl Fn(&[Element]) -> f64) -> Series {
        self.aggregate(name, Kind::Float, |window| Element::Float(f(window)))
    }

    fn aggregate(&self, name: &str, kind: Kind, f: impl Fn(&[Element]) -> Element) -> Series {
        if let Err(err) = self.source.check().and_then(|_| self.options.validate()) {
            return self.reject(kind, err);
        }
        let RollingOptions {
            window,
            min_periods,
        } = self.options;
        emit!(
            debug,
            aggregate = name,
            window,
            min_periods,
            len = self.source.len(),
            "rolling aggregate"
        );

        let elements = self.source.elements();
        let out: Vec<Element> = (0..elements.len())
            .map(|idx| {
                let start = (idx + 1).saturating_sub(window);
                let frame = &elements[start..=idx];
                if frame.len() < min_periods || frame.iter().any(Element::is_missing) {
                    Element::missing(kind)
                } else {
                    f(frame)
                }
            })
            .collect();
        Series::from_column(
            format!(
                "{}_Rolling({window},{min_periods})_{name}",
                self.source.name()
            ),
            Column::from_elements(kind, out),
        )
    }

    /// Empty poisoned result of the aggregate's output kind.
    fn reject(&self, kind: Kind, err: SeriesError) -> Series {
        if self.source.is_poisoned() && kind == self.source.kind() {
            return self.source.clone();
        }
        emit!(debug, series = %self.source.name(), error = %err, "rolling aggregate poisoned");
        Series::from_error(kind, err).with_name(self.source.name())
    }
}

fn floats(window: &[Element]) -> Vec<f64> {
    window.iter().map(Element::as_float).collect()
}
