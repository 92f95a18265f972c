//! Prototype-merge pass: folds a training page's freshly distilled
//! prototypes into a persistent per-class library, either merging each
//! into its closest compatible existing prototype or appending it as a
//! new entry (`SPEC_FULL.md` §4.4).
//!
//! `ProtoMerger` never sees the feature space's [`crate::param::ParamDesc`]
//! descriptors — only [`ClassLibrary`] and the page's `Vec<Prototype>` —
//! matching spec.md §4.4's listed inputs (`Class`, `proto_list`,
//! `font_id`). Proto-vs-proto comparison is therefore grounded on the
//! simplified geometric representation `training/mergenf.cpp` built for
//! exactly this purpose, not the general statistical [`ProtoShape`].

use crate::bitvec::BitVector;
use crate::distill::{ProtoShape, Prototype};
use crate::distill::MIN_VARIANCE;
use crate::error::{MergeError, Result};

/// Infinitesimal synthetic feature length used to bound proto-vs-proto
/// similarity, mirroring `classify/featdefs.cpp`'s `PICO_FEATURE_LENGTH`.
pub const PICO_FEATURE_LENGTH: f32 = 0.05;
/// Similarity threshold above which an incoming prototype is folded into
/// an existing one rather than appended (`mergenf.h`'s
/// `WORST_MATCH_ALLOWED`).
pub const WORST_MATCH_ALLOWED: f32 = 0.9;
/// Starting value for [`compare_protos`]'s worst-case tracking; only ever
/// decreases (`mergenf.h`'s `WORST_EVIDENCE`).
pub const WORST_EVIDENCE: f32 = 1.0;
/// Two protos whose lengths differ by more than this never match
/// (`mergenf.h`'s `MAX_LENGTH_MISMATCH = 2 * GetPicoFeatureLength()`).
pub const MAX_LENGTH_MISMATCH: f32 = 2.0 * PICO_FEATURE_LENGTH;

const ANGLE_MATCH_SCALE: f32 = 1.0;
const SIMILARITY_MIDPOINT: f32 = 0.0075;
const SIMILARITY_CURL: f32 = 2.0;
const TANGENT_BBOX_PAD: f32 = 0.5;
const ORTHOGONAL_BBOX_PAD: f32 = 2.5;
const ANGLE_PAD_DEGREES: f32 = 45.0;

/// The simplified 7-field line representation `ProtoMerger` actually
/// compares and merges, extracted from a [`Prototype`]'s first four mean
/// components in `MF_PARAM_NAME` order (X, Y, Length, Direction) —
/// `training/protos.cpp`'s `PROTO_STRUCT` in Rust form. Distinct from, and
/// much simpler than, the general statistical [`ProtoShape`] the rest of
/// the crate works with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricProto {
    x: f32,
    y: f32,
    length: f32,
    /// Orientation as a fraction of a full turn, in `[0, 1)`, matching the
    /// original's `Angle` field (radians are only ever reconstructed as
    /// `angle * 2 * PI` at point of use).
    angle: f32,
    a: f32,
    b: f32,
    c: f32,
}

impl GeometricProto {
    /// Builds a geometric proto from `(x, y, length, angle)`, deriving the
    /// `A, B, C` line coefficients via [`Self::fill_abc`]
    /// (`protos.cpp`'s `FillABC`).
    #[must_use]
    pub fn new(x: f32, y: f32, length: f32, angle: f32) -> Self {
        let mut proto = Self { x, y, length, angle, a: 0.0, b: 0.0, c: 0.0 };
        proto.fill_abc();
        proto
    }

    /// Extracts the geometric representation from a distilled
    /// prototype's mean, reading `mean[0..4]` as `(X, Y, Length,
    /// Direction)` per the microfeature parameter ordering
    /// (`SPEC_FULL.md` §4.4 / `classify/mf.h`'s `MF_PARAM_NAME`). A mean
    /// shorter than 4 components pads the missing trailing fields with
    /// `0.0` rather than panicking.
    #[must_use]
    pub fn from_prototype(proto: &Prototype) -> Self {
        let mean = proto.mean();
        let at = |i: usize| mean.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2), at(3))
    }

    #[rustfmt::skip]
    #[must_use]
    pub const fn x(&self) -> f32 { self.x }
    #[rustfmt::skip]
    #[must_use]
    pub const fn y(&self) -> f32 { self.y }
    #[rustfmt::skip]
    #[must_use]
    pub const fn length(&self) -> f32 { self.length }
    #[rustfmt::skip]
    #[must_use]
    pub const fn angle(&self) -> f32 { self.angle }
    /// Unit-normal line coefficient `A` in `Ax + By + C = 0`.
    #[rustfmt::skip]
    #[must_use]
    pub const fn a(&self) -> f32 { self.a }
    /// Unit-normal line coefficient `B` in `Ax + By + C = 0`.
    #[rustfmt::skip]
    #[must_use]
    pub const fn b(&self) -> f32 { self.b }
    /// Unit-normal line coefficient `C` in `Ax + By + C = 0`.
    #[rustfmt::skip]
    #[must_use]
    pub const fn c(&self) -> f32 { self.c }

    /// Rebuilds a geometric proto from its seven persisted fields
    /// (`SPEC_FULL.md` §6.1 Microfeat dump), trusting the stored `A, B, C`
    /// rather than re-deriving them from `angle` — a file produced by a
    /// future revision of [`Self::fill_abc`] round-trips exactly.
    #[must_use]
    pub const fn from_fields(x: f32, y: f32, length: f32, angle: f32, a: f32, b: f32, c: f32) -> Self {
        Self { x, y, length, angle, a, b, c }
    }

    /// Recomputes `A, B, C` (the unit-normal line form `Ax + By + C = 0`)
    /// from `x, y, angle`, matching `protos.cpp`'s `FillABC`.
    #[expect(clippy::float_arithmetic, reason = "line-coefficient reconstruction from angle")]
    pub fn fill_abc(&mut self) {
        let radians = self.angle * 2.0 * std::f32::consts::PI;
        let slope = radians.tan();
        let intercept = self.y - slope * self.x;
        let normalizer = 1.0 / (slope * slope + 1.0).sqrt();
        self.a = slope * normalizer;
        self.b = -normalizer;
        self.c = intercept * normalizer;
    }

    /// Weighted average of two geometric protos' `(x, y, length, angle)`,
    /// followed by a `fill_abc` rebuild (`mergenf.cpp`'s
    /// `ComputeMergedProto`).
    #[expect(clippy::float_arithmetic, reason = "weighted mean of geometric proto fields")]
    #[must_use]
    pub fn weighted_average(p1: &Self, w1: f32, p2: &Self, w2: f32) -> Self {
        let total = (w1 + w2).max(f32::EPSILON);
        let lerp = |a: f32, b: f32| (a * w1 + b * w2) / total;
        Self::new(lerp(p1.x, p2.x), lerp(p1.y, p2.y), lerp(p1.length, p2.length), lerp(p1.angle, p2.angle))
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundingBox {
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl BoundingBox {
    fn contains(self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

/// Bounding box around `proto` padded `tangent_pad` along its own
/// orientation and `orthogonal_pad` across it (`mergenf.cpp`'s
/// `ComputePaddedBoundingBox`).
#[expect(clippy::float_arithmetic, reason = "trigonometric bounding-box padding")]
fn padded_bounding_box(proto: &GeometricProto, tangent_pad: f32, orthogonal_pad: f32) -> BoundingBox {
    let radians = proto.angle * 2.0 * std::f32::consts::PI;
    let half_length = proto.length / 2.0 + tangent_pad;
    let cos_angle = radians.cos().abs();
    let sin_angle = radians.sin().abs();

    let pad_x = (cos_angle * half_length).max(sin_angle * orthogonal_pad);
    let pad_y = (sin_angle * half_length).max(cos_angle * orthogonal_pad);
    BoundingBox {
        min_x: proto.x - pad_x,
        max_x: proto.x + pad_x,
        min_y: proto.y - pad_y,
        max_y: proto.y + pad_y,
    }
}

/// `true` if a synthetic pico-feature at `(x, y)` oriented `direction`
/// could plausibly match `proto`: its orientation must fall within
/// `training_angle_pad` of `proto`'s, and its position must fall inside
/// `proto`'s padded bounding box (`mergenf.cpp`'s `DummyFastMatch`).
#[expect(clippy::float_arithmetic, reason = "angle-wrap comparison against a padded tolerance")]
fn dummy_fast_match(x: f32, y: f32, direction: f32, proto: &GeometricProto) -> bool {
    let max_angle_error = ANGLE_PAD_DEGREES / 360.0;
    let mut angle_error = (proto.angle - direction).abs();
    if angle_error > 0.5 {
        angle_error = 1.0 - angle_error;
    }
    if angle_error > max_angle_error {
        return false;
    }
    let bbox = padded_bounding_box(proto, TANGENT_BBOX_PAD * PICO_FEATURE_LENGTH, ORTHOGONAL_BBOX_PAD * PICO_FEATURE_LENGTH);
    bbox.contains(x, y)
}

/// Evidence rating for a synthetic pico-feature at `(x, y)` oriented
/// `direction` matched against `proto` (`mergenf.cpp`'s
/// `SubfeatureEvidence`).
#[expect(clippy::float_arithmetic, reason = "signed perpendicular distance and angular difference combination")]
fn subfeature_evidence(x: f32, y: f32, direction: f32, proto: &GeometricProto) -> f32 {
    let mut dangle = proto.angle - direction;
    if dangle < -0.5 {
        dangle += 1.0;
    }
    if dangle > 0.5 {
        dangle -= 1.0;
    }
    dangle *= ANGLE_MATCH_SCALE;

    let distance = proto.a * x + proto.b * y + proto.c;
    evidence_of(distance * distance + dangle * dangle)
}

/// Converts a combined distance/angle similarity measure into an evidence
/// rating in `(0, 1]` via `1 / (1 + (similarity / midpoint) ^ curl)`
/// (`mergenf.cpp`'s `EvidenceOf`).
#[expect(clippy::float_arithmetic, reason = "evidence transform over a normalised similarity measure")]
fn evidence_of(similarity: f32) -> f32 {
    let scaled = similarity / SIMILARITY_MIDPOINT;
    1.0 / (1.0 + scaled.powf(SIMILARITY_CURL))
}

/// Upper-bounds the worst-case pico-feature match rating one would get if
/// `p1` were decomposed into unit-length pieces and matched against `p2`
/// (`mergenf.cpp`'s `CompareProtos`). Returns `0.0` immediately if the
/// lengths differ by more than [`MAX_LENGTH_MISMATCH`] or either synthetic
/// endpoint falls outside `p2`'s fast-match envelope.
#[expect(clippy::float_arithmetic, reason = "pico-feature endpoint placement along p1's orientation")]
#[must_use]
pub fn compare_protos(p1: &GeometricProto, p2: &GeometricProto) -> f32 {
    if (p1.length - p2.length).abs() > MAX_LENGTH_MISMATCH {
        return 0.0;
    }

    let radians = p1.angle * 2.0 * std::f32::consts::PI;
    let half_length = (p1.length / 2.0 - PICO_FEATURE_LENGTH / 2.0).max(0.0);
    let (cos_a, sin_a) = (radians.cos(), radians.sin());

    let mut worst = WORST_EVIDENCE;
    for sign in [1.0_f32, -1.0_f32] {
        let x = p1.x + sign * cos_a * half_length;
        let y = p1.y + sign * sin_a * half_length;
        if !dummy_fast_match(x, y, p1.angle, p2) {
            return 0.0;
        }
        let evidence = subfeature_evidence(x, y, p1.angle, p2);
        worst = worst.min(evidence);
    }
    worst
}

/// Weighted average of two statistical prototypes' means and shapes,
/// used when [`ProtoMerger`] folds an incoming prototype into an existing
/// library entry. Assumes both prototypes share the same dimensionality
/// and (for [`ProtoShape::Elliptical`]/[`ProtoShape::Mixed`]) the same
/// per-dimension layout; a shape mismatch falls back to keeping the
/// existing prototype's shape unchanged rather than guessing a
/// conversion (`SPEC_FULL.md` §9 Open Questions: `ProtoMerger` receives
/// no `ParamDesc`, so this merge is a plain linear interpolation without
/// circular wraparound, unlike [`crate::cluster`]'s weighted mean).
#[must_use]
pub fn weighted_average_prototype(existing: &Prototype, existing_weight: f32, incoming: &Prototype, incoming_weight: f32) -> Prototype {
    #[expect(clippy::float_arithmetic, reason = "weighted mean of two prototypes' feature-space means")]
    let lerp = |a: f32, b: f32| {
        let total = (existing_weight + incoming_weight).max(f32::EPSILON);
        (a * existing_weight + b * incoming_weight) / total
    };
    let mean: Vec<f32> = existing.mean().iter().zip(incoming.mean()).map(|(&a, &b)| lerp(a, b)).collect();
    let shape = merge_shape(existing.shape(), existing_weight, incoming.shape(), incoming_weight);
    let sample_count = existing.sample_count().saturating_add(incoming.sample_count());
    let significant = existing.significant() || incoming.significant();
    let composed = existing.composed_from_char_fragments() || incoming.composed_from_char_fragments();
    Prototype::new(mean, sample_count, significant, shape).with_char_fragments(composed)
}

#[expect(clippy::float_arithmetic, reason = "weighted mean of two scalar shape parameters")]
fn weighted_scalar(a: f32, wa: f32, b: f32, wb: f32) -> f32 {
    let total = (wa + wb).max(f32::EPSILON);
    (a * wa + b * wb) / total
}

fn merge_shape(existing: &ProtoShape, wa: f32, incoming: &ProtoShape, wb: f32) -> ProtoShape {
    match (existing, incoming) {
        (ProtoShape::Spherical { variance: va, .. }, ProtoShape::Spherical { variance: vb, .. }) => {
            let variance = weighted_scalar(*va, wa, *vb, wb).max(MIN_VARIANCE);
            let magnitude = weighted_scalar(crate::distill::spherical_magnitude(*va), wa, crate::distill::spherical_magnitude(*vb), wb);
            ProtoShape::Spherical { variance, magnitude }
        }
        (ProtoShape::Elliptical { variance: va, magnitude: ma }, ProtoShape::Elliptical { variance: vb, magnitude: mb }) if va.len() == vb.len() => {
            let variance: Vec<f32> = va.iter().zip(vb).map(|(&x, &y)| weighted_scalar(x, wa, y, wb).max(MIN_VARIANCE)).collect();
            let magnitude: Vec<f32> = ma.iter().zip(mb).map(|(&x, &y)| weighted_scalar(x, wa, y, wb)).collect();
            ProtoShape::Elliptical { variance, magnitude }
        }
        (
            ProtoShape::Mixed { distribution, variance: va, magnitude: ma },
            ProtoShape::Mixed { variance: vb, magnitude: mb, .. },
        ) if va.len() == vb.len() => {
            let variance: Vec<f32> = va.iter().zip(vb).map(|(&x, &y)| weighted_scalar(x, wa, y, wb).max(MIN_VARIANCE)).collect();
            let magnitude: Vec<f32> = ma.iter().zip(mb).map(|(&x, &y)| weighted_scalar(x, wa, y, wb)).collect();
            ProtoShape::Mixed { distribution: distribution.clone(), variance, magnitude }
        }
        (existing, _) => existing.clone(),
    }
}

/// A per-class prototype library, accumulated across training pages
/// (`SPEC_FULL.md` §3 Class library). Owned by the caller for the life of
/// the training job; one instance per unichar class.
#[derive(Debug, Clone)]
pub struct ClassLibrary {
    protos: Vec<Prototype>,
    num_merged: Vec<u32>,
    configs: Vec<BitVector>,
    font_set: Vec<i32>,
    max_num_protos: usize,
}

impl ClassLibrary {
    /// Creates an empty library bounded at `max_num_protos` entries.
    /// `MAX_NUM_PROTOS` is not a value recovered from the retrieved
    /// corpus (its `#define` lives outside the retrieved slice), so it is
    /// a caller-supplied construction parameter rather than a guessed
    /// literal (`SPEC_FULL.md` §9 Open Questions).
    #[must_use]
    pub fn new(max_num_protos: usize) -> Self {
        Self { protos: Vec::new(), num_merged: Vec::new(), configs: Vec::new(), font_set: Vec::new(), max_num_protos }
    }

    /// Rebuilds a library from its persisted parts ([`crate::io::microfeat`]
    /// reads a dump straight into this shape rather than replaying it
    /// through [`ProtoMerger::merge_page`], since the dump already holds
    /// the merge outcome, not the pages that produced it).
    pub(crate) fn from_parts(
        protos: Vec<Prototype>,
        num_merged: Vec<u32>,
        configs: Vec<BitVector>,
        font_set: Vec<i32>,
        max_num_protos: usize,
    ) -> Self {
        Self { protos, num_merged, configs, font_set, max_num_protos }
    }

    /// Prototypes currently held by this library.
    #[must_use]
    pub fn protos(&self) -> &[Prototype] {
        &self.protos
    }

    /// Per-proto merge weight: how many source prototypes have been
    /// folded into each entry so far.
    #[must_use]
    pub fn num_merged(&self) -> &[u32] {
        &self.num_merged
    }

    /// One bit-vector per training page that contributed to this class,
    /// each sized to `protos().len()`.
    #[must_use]
    pub fn configs(&self) -> &[BitVector] {
        &self.configs
    }

    /// Font ids that have contributed a configuration to this class, in
    /// first-seen order.
    #[must_use]
    pub fn font_set(&self) -> &[i32] {
        &self.font_set
    }

    fn add_font(&mut self, font_id: i32) {
        if !self.font_set.contains(&font_id) {
            self.font_set.push(font_id);
        }
    }

    fn grow_configs_to(&mut self, width: usize) {
        for config in &mut self.configs {
            config.grow(width);
        }
    }
}

/// Folds one training page's freshly distilled prototypes into an
/// accumulated class library (`SPEC_FULL.md` §4.4). Stateless: all
/// mutable state lives in the [`ClassLibrary`] passed to
/// [`Self::merge_page`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtoMerger;

impl ProtoMerger {
    /// Creates a merger. There is no per-run state to own — the χ² memo
    /// and bucket cache belong to [`crate::distill::ProtoDistiller`], not
    /// here.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Merges one page's `proto_list` into `class`, allocating and
    /// recording a new configuration bit-vector, and recording `font_id`
    /// in the class's font set (`SPEC_FULL.md` §4.4, §5 ordering
    /// guarantee: `proto_list` must already be in left-before-right pop
    /// order, and this call must be made in page-arrival order).
    ///
    /// # Errors
    /// Returns [`MergeError::LibraryFull`] if appending a prototype not
    /// matched to any existing entry would exceed `class`'s configured
    /// `max_num_protos`.
    pub fn merge_page(&self, class: &mut ClassLibrary, proto_list: Vec<Prototype>, font_id: i32) -> Result<()> {
        let mut config = BitVector::with_len(class.protos.len());

        for incoming in proto_list {
            let incoming_geo = GeometricProto::from_prototype(&incoming);
            let chosen = Self::find_closest_existing(class, &incoming_geo);

            match chosen {
                Some(pid) => {
                    let mut merged = weighted_average_prototype(&class.protos[pid], f32_from(class.num_merged[pid]), &incoming, 1.0);
                    merged.mark_merged();
                    class.protos[pid] = merged;
                    class.num_merged[pid] += 1;
                    config.set(pid);
                }
                None => {
                    if class.protos.len() >= class.max_num_protos {
                        return Err(MergeError::LibraryFull { max: class.max_num_protos }.into());
                    }
                    class.protos.push(incoming);
                    class.num_merged.push(1);
                    let new_width = class.protos.len();
                    config.grow(new_width);
                    config.set(new_width - 1);
                }
            }
        }

        let width = class.protos.len();
        class.grow_configs_to(width);
        config.grow(width);
        class.configs.push(config);
        class.add_font(font_id);
        Ok(())
    }

    /// Finds the existing proto in `class` that best approximates
    /// `incoming`, returning `None` (the original's `NO_PROTO`) if no
    /// candidate clears [`WORST_MATCH_ALLOWED`] (`mergenf.cpp`'s
    /// `FindClosestExistingProto`).
    fn find_closest_existing(class: &ClassLibrary, incoming: &GeometricProto) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_match = WORST_MATCH_ALLOWED;

        for (pid, existing) in class.protos.iter().enumerate() {
            let existing_geo = GeometricProto::from_prototype(existing);
            let merged = GeometricProto::weighted_average(&existing_geo, f32_from(class.num_merged[pid]), incoming, 1.0);
            let old_match = compare_protos(&existing_geo, &merged);
            let new_match = compare_protos(incoming, &merged);
            let similarity = old_match.min(new_match);
            if similarity > best_match {
                best = Some(pid);
                best_match = similarity;
            }
        }
        best
    }
}

#[expect(clippy::cast_precision_loss, reason = "merge weights stay well within f32's exact integer range")]
fn f32_from(count: u32) -> f32 {
    count as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distill::ProtoShape;

    fn spherical(mean: Vec<f32>, sample_count: u32) -> Prototype {
        Prototype::new(mean, sample_count, true, ProtoShape::Spherical { variance: 0.01, magnitude: 1.0 })
    }

    #[test]
    fn identical_line_protos_compare_as_a_near_perfect_match() {
        let p1 = GeometricProto::new(0.0, 0.0, 0.2, 0.0);
        let p2 = GeometricProto::new(0.0, 0.0, 0.2, 0.0);
        assert!(compare_protos(&p1, &p2) > 0.9);
    }

    #[test]
    fn mismatched_length_protos_never_match() {
        let p1 = GeometricProto::new(0.0, 0.0, 0.2, 0.0);
        let p2 = GeometricProto::new(0.0, 0.0, 0.8, 0.0);
        assert_eq!(compare_protos(&p1, &p2), 0.0);
    }

    #[test]
    fn perpendicular_protos_never_match() {
        let p1 = GeometricProto::new(0.0, 0.0, 0.2, 0.0);
        let p2 = GeometricProto::new(0.0, 0.0, 0.2, 0.25);
        assert_eq!(compare_protos(&p1, &p2), 0.0);
    }

    #[test]
    fn first_prototype_is_always_appended() {
        let mut class = ClassLibrary::new(8);
        let merger = ProtoMerger::new();
        merger.merge_page(&mut class, vec![spherical(vec![0.0, 0.0, 0.2, 0.0], 5)], 1).expect("fits under max_num_protos");

        assert_eq!(class.protos().len(), 1);
        assert_eq!(class.num_merged(), &[1]);
        assert_eq!(class.configs().len(), 1);
        assert!(class.configs()[0].test(0));
        assert_eq!(class.font_set(), &[1]);
    }

    #[test]
    fn repeated_near_identical_prototypes_merge_rather_than_append() {
        let mut class = ClassLibrary::new(8);
        let merger = ProtoMerger::new();
        let proto = || spherical(vec![0.1, 0.1, 0.2, 0.0], 5);

        for page in 0..4 {
            merger.merge_page(&mut class, vec![proto()], page).expect("fits under max_num_protos");
        }

        assert_eq!(class.protos().len(), 1, "near-identical protos should merge into one entry");
        assert_eq!(class.num_merged(), &[4]);
        assert_eq!(class.configs().len(), 4);
        assert_eq!(class.font_set().len(), 4);
        let merged_mean = class.protos()[0].mean();
        assert!((merged_mean[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn distant_prototypes_each_get_their_own_entry() {
        let mut class = ClassLibrary::new(8);
        let merger = ProtoMerger::new();
        merger.merge_page(&mut class, vec![spherical(vec![0.0, 0.0, 0.2, 0.0], 5)], 1).expect("first proto appends");
        merger.merge_page(&mut class, vec![spherical(vec![0.8, 0.8, 0.2, 0.25], 5)], 1).expect("second proto appends");

        assert_eq!(class.protos().len(), 2);
        assert_eq!(class.configs().len(), 2);
        assert!(class.configs()[0].test(0) && !class.configs()[0].test(1));
        assert!(class.configs()[1].test(1) && !class.configs()[1].test(0));
    }

    #[test]
    fn library_full_rejects_further_appends() {
        let mut class = ClassLibrary::new(1);
        let merger = ProtoMerger::new();
        merger.merge_page(&mut class, vec![spherical(vec![0.0, 0.0, 0.2, 0.0], 5)], 1).expect("first proto fits");

        let result = merger.merge_page(&mut class, vec![spherical(vec![0.9, 0.9, 0.2, 0.25], 5)], 1);
        assert!(matches!(result, Err(crate::error::ClassifierError::Merge(MergeError::LibraryFull { max: 1 }))));
    }
}
