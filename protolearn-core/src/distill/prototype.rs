//! The prototype data model: shape, per-dimension distribution tags, and
//! the distilled [`Prototype`] itself.
//!
//! [`ProtoShape`] is a tagged union in place of the original `FLOATUNION`
//! C union — each variant only carries the fields its style actually
//! needs (`SPEC_FULL.md` §3, §9 redesign flag).

/// The statistical shape fitted to one essential dimension of a [`Mixed`]
/// prototype.
///
/// [`Mixed`]: ProtoShape::Mixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// Gaussian fit.
    Normal,
    /// Flat fit between the cluster's observed extremes.
    Uniform,
    /// No fit accepted; treated as maximally dispersed.
    Random,
}

impl Distribution {
    /// Single-character token used in the normproto file format.
    #[rustfmt::skip]
    #[must_use]
    pub const fn token(self) -> char {
        match self {
            Self::Normal => 'n',
            Self::Uniform => 'u',
            Self::Random => 'r',
        }
    }

    /// Parses a normproto distribution token.
    #[must_use]
    pub const fn from_token(token: char) -> Option<Self> {
        match token {
            'n' => Some(Self::Normal),
            'u' => Some(Self::Uniform),
            'r' => Some(Self::Random),
            _ => None,
        }
    }
}

/// The fitted statistical shape of a prototype's essential dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtoShape {
    /// One variance shared across every essential dimension.
    Spherical {
        /// Shared variance, floored at the numeric epsilon.
        variance: f32,
        /// `1 / sqrt(2 * pi * variance)`.
        magnitude: f32,
    },
    /// An independent, normally distributed variance per essential
    /// dimension.
    Elliptical {
        /// Per-dimension variance, floored at the numeric epsilon.
        variance: Vec<f32>,
        /// Per-dimension `1 / sqrt(2 * pi * variance)`.
        magnitude: Vec<f32>,
    },
    /// An independently fitted distribution per essential dimension,
    /// each Normal, Uniform, or Random.
    Mixed {
        /// Per-dimension distribution fit.
        distribution: Vec<Distribution>,
        /// Per-dimension variance, floored at the numeric epsilon.
        variance: Vec<f32>,
        /// Per-dimension density-normalising magnitude; its formula
        /// depends on the dimension's fitted distribution.
        magnitude: Vec<f32>,
    },
}

impl ProtoShape {
    /// Number of essential dimensions this shape describes.
    #[must_use]
    pub fn dimensions(&self) -> usize {
        match self {
            Self::Spherical { .. } => 1,
            Self::Elliptical { variance, .. } | Self::Mixed { variance, .. } => variance.len(),
        }
    }

    /// `total_magnitude`: the product of every dimension's magnitude
    /// (`SPEC_FULL.md` §3). For [`Self::Spherical`] this is just
    /// `magnitude` itself; computed on demand rather than stored, since
    /// it is a pure function of the per-dimension magnitudes already
    /// held by the shape.
    #[expect(clippy::float_arithmetic, reason = "product of per-dimension magnitudes")]
    #[must_use]
    pub fn total_magnitude(&self) -> f32 {
        match self {
            Self::Spherical { magnitude, .. } => *magnitude,
            Self::Elliptical { magnitude, .. } | Self::Mixed { magnitude, .. } => {
                magnitude.iter().product()
            }
        }
    }

    /// `log_magnitude`: `ln(total_magnitude())` (`SPEC_FULL.md` §3).
    #[expect(clippy::float_arithmetic, reason = "logarithm of the total magnitude")]
    #[must_use]
    pub fn log_magnitude(&self) -> f32 {
        self.total_magnitude().ln()
    }

    /// Per-dimension matcher weight (`SPEC_FULL.md` §3's `weight` field):
    /// the reciprocal of that dimension's variance. Computed on demand
    /// rather than stored, the same way [`Self::total_magnitude`] is — it
    /// is a pure function of the variance this shape already holds. For
    /// [`Self::Spherical`] every dimension shares the one scalar variance,
    /// so `dim` is ignored.
    #[expect(clippy::float_arithmetic, reason = "reciprocal-variance matcher weight")]
    #[must_use]
    pub fn weight(&self, dim: usize) -> f32 {
        match self {
            Self::Spherical { variance, .. } => 1.0 / variance,
            Self::Elliptical { variance, .. } | Self::Mixed { variance, .. } => {
                variance.get(dim).copied().map_or(0.0, |v| 1.0 / v)
            }
        }
    }
}

/// A distilled prototype: the statistical summary of one cluster judged
/// to be a good fit for its configured style.
#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    mean: Vec<f32>,
    sample_count: u32,
    significant: bool,
    shape: ProtoShape,
    merged: bool,
    composed_from_char_fragments: bool,
}

impl Prototype {
    /// Builds a prototype from its mean, originating sample count,
    /// significance decision, and fitted shape. `merged` starts `false`
    /// (set by [`crate::merge::ProtoMerger`] when this instance is
    /// folded into an existing library entry rather than appended) and
    /// `composed_from_char_fragments` starts `false`; use
    /// [`Self::with_char_fragments`] when the originating cluster
    /// admitted repeated-character leaves under the multi-character
    /// filter's tolerance (`SPEC_FULL.md` §3).
    #[must_use]
    pub const fn new(mean: Vec<f32>, sample_count: u32, significant: bool, shape: ProtoShape) -> Self {
        Self {
            mean,
            sample_count,
            significant,
            shape,
            merged: false,
            composed_from_char_fragments: false,
        }
    }

    /// Returns `self` with `composed_from_char_fragments` set.
    #[must_use]
    pub const fn with_char_fragments(mut self, composed_from_char_fragments: bool) -> Self {
        self.composed_from_char_fragments = composed_from_char_fragments;
        self
    }

    /// Whether the originating cluster included samples from a character
    /// already seen elsewhere in the cluster, tolerated under
    /// `config.max_illegal` rather than rejected outright.
    #[rustfmt::skip]
    #[must_use]
    pub const fn composed_from_char_fragments(&self) -> bool { self.composed_from_char_fragments }

    /// Whether [`crate::merge::ProtoMerger`] folded this prototype into
    /// an existing library entry (`true`) or appended it as a new entry
    /// (`false`). Set by the merger; `false` for a freshly distilled,
    /// not-yet-merged prototype.
    #[rustfmt::skip]
    #[must_use]
    pub const fn merged(&self) -> bool { self.merged }

    /// Marks this prototype as folded into an existing library entry.
    pub const fn mark_merged(&mut self) {
        self.merged = true;
    }

    /// Feature-space mean.
    #[must_use]
    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Number of leaf samples folded into the originating cluster.
    #[rustfmt::skip]
    #[must_use]
    pub const fn sample_count(&self) -> u32 { self.sample_count }

    /// Whether the prototype met the `min_samples` significance
    /// threshold (`SPEC_FULL.md` §4.3 step 1).
    #[rustfmt::skip]
    #[must_use]
    pub const fn significant(&self) -> bool { self.significant }

    /// The fitted statistical shape.
    #[must_use]
    pub const fn shape(&self) -> &ProtoShape {
        &self.shape
    }
}
