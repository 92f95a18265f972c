//! Tuning configuration (`CLUSTERCONFIG`) for a distillation run.

use crate::error::ConfigError;

/// The style of prototype a cluster should be fit to, or a fallthrough
/// strategy that tries several styles in order.
///
/// `Automatic` is modelled as a strategy consumed by
/// [`crate::distill::ProtoDistiller`], not as a data tag stored on the
/// resulting [`crate::distill::Prototype`] (`SPEC_FULL.md` §9 redesign
/// flag) — every emitted prototype carries a concrete
/// [`crate::distill::ProtoShape`].
///
/// # Examples
/// ```
/// use protolearn_core::ProtoStyle;
///
/// assert_eq!(ProtoStyle::Automatic, ProtoStyle::Automatic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoStyle {
    /// Fit a single scalar variance across all essential dimensions.
    Spherical,
    /// Fit an independent variance per essential dimension, all normal.
    Elliptical,
    /// Fit each essential dimension independently, trying normal, random,
    /// and uniform distributions in turn.
    Mixed,
    /// Try spherical, then elliptical, then mixed, accepting the first
    /// that fits.
    Automatic,
}

/// Validated tuning parameters for one distillation run.
///
/// # Examples
/// ```
/// use protolearn_core::{ClusterConfigBuilder, ProtoStyle};
///
/// let config = ClusterConfigBuilder::new()
///     .with_proto_style(ProtoStyle::Elliptical)
///     .with_min_samples(0.1)
///     .build()
///     .expect("default configuration is valid");
/// assert_eq!(config.proto_style(), ProtoStyle::Elliptical);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ClusterConfig {
    proto_style: ProtoStyle,
    min_samples: f32,
    max_illegal: f32,
    independence: f32,
    confidence: f64,
    magic_samples: u32,
}

impl ClusterConfig {
    /// Requested prototype style or fallthrough strategy.
    #[rustfmt::skip]
    #[must_use]
    pub const fn proto_style(&self) -> ProtoStyle { self.proto_style }

    /// Fraction of total-character count required for significance.
    #[rustfmt::skip]
    #[must_use]
    pub const fn min_samples(&self) -> f32 { self.min_samples }

    /// Fraction threshold for the multi-character filter.
    #[rustfmt::skip]
    #[must_use]
    pub const fn max_illegal(&self) -> f32 { self.max_illegal }

    /// Correlation-coefficient ceiling for the independence gate.
    #[rustfmt::skip]
    #[must_use]
    pub const fn independence(&self) -> f32 { self.independence }

    /// Alpha for the chi-squared goodness-of-fit test.
    #[rustfmt::skip]
    #[must_use]
    pub const fn confidence(&self) -> f64 { self.confidence }

    /// Sample count that earns the Hotelling acceptance boost.
    #[rustfmt::skip]
    #[must_use]
    pub const fn magic_samples(&self) -> u32 { self.magic_samples }
}

/// Builds and validates a [`ClusterConfig`].
///
/// # Examples
/// ```
/// use protolearn_core::ClusterConfigBuilder;
///
/// let config = ClusterConfigBuilder::new().build().expect("defaults are valid");
/// assert_eq!(config.min_samples(), 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterConfigBuilder {
    proto_style: ProtoStyle,
    min_samples: f32,
    max_illegal: f32,
    independence: f32,
    confidence: f64,
    magic_samples: u32,
}

impl Default for ClusterConfigBuilder {
    fn default() -> Self {
        Self {
            proto_style: ProtoStyle::Elliptical,
            min_samples: 0.1,
            max_illegal: 0.5,
            independence: 0.9,
            confidence: 0.01,
            magic_samples: 0,
        }
    }
}

impl ClusterConfigBuilder {
    /// Creates a builder populated with the historical defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the requested prototype style or fallthrough strategy.
    #[must_use]
    pub fn with_proto_style(mut self, style: ProtoStyle) -> Self {
        self.proto_style = style;
        self
    }

    /// Overrides `min_samples`.
    #[must_use]
    pub fn with_min_samples(mut self, value: f32) -> Self {
        self.min_samples = value;
        self
    }

    /// Overrides `max_illegal`.
    #[must_use]
    pub fn with_max_illegal(mut self, value: f32) -> Self {
        self.max_illegal = value;
        self
    }

    /// Overrides `independence`.
    #[must_use]
    pub fn with_independence(mut self, value: f32) -> Self {
        self.independence = value;
        self
    }

    /// Overrides `confidence` (alpha).
    #[must_use]
    pub fn with_confidence(mut self, value: f64) -> Self {
        self.confidence = value;
        self
    }

    /// Overrides `magic_samples`.
    #[must_use]
    pub fn with_magic_samples(mut self, value: u32) -> Self {
        self.magic_samples = value;
        self
    }

    /// Validates the configuration and constructs a [`ClusterConfig`].
    ///
    /// # Errors
    /// Returns [`ConfigError::FractionOutOfRange`] if `min_samples`,
    /// `max_illegal`, or `independence` is outside `[0, 1]`, or
    /// [`ConfigError::ConfidenceOutOfRange`] if `confidence` is outside
    /// `(0, 1]`.
    pub fn build(self) -> Result<ClusterConfig, ConfigError> {
        check_fraction("min_samples", self.min_samples)?;
        check_fraction("max_illegal", self.max_illegal)?;
        check_fraction("independence", self.independence)?;
        if !(1e-200..=1.0).contains(&self.confidence) {
            return Err(ConfigError::ConfidenceOutOfRange {
                got: self.confidence,
            });
        }

        Ok(ClusterConfig {
            proto_style: self.proto_style,
            min_samples: self.min_samples,
            max_illegal: self.max_illegal,
            independence: self.independence,
            confidence: self.confidence,
            magic_samples: self.magic_samples,
        })
    }
}

fn check_fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FractionOutOfRange { field, got: value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ClusterConfigBuilder::new().build().expect("defaults are valid");
        assert_eq!(config.proto_style(), ProtoStyle::Elliptical);
        assert_eq!(config.magic_samples(), 0);
    }

    #[test]
    fn out_of_range_fraction_is_rejected() {
        let err = ClusterConfigBuilder::new()
            .with_independence(1.5)
            .build()
            .expect_err("1.5 is out of range");
        assert_eq!(err.code().as_str(), "fraction_out_of_range");
    }

    #[test]
    fn out_of_range_confidence_is_rejected() {
        let err = ClusterConfigBuilder::new()
            .with_confidence(0.0)
            .build()
            .expect_err("0.0 is out of range");
        assert_eq!(err.code().as_str(), "confidence_out_of_range");
    }
}
