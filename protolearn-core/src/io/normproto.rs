//! The normproto prototype-file format (`SPEC_FULL.md` §6.1):
//!
//! ```text
//! <sample_size>
//! <sample_size param descriptors, same format as a ParamDesc file>
//! <unichar_label> <num_protos>
//!   <significant|insignificant> <spherical|elliptical|mixed> <num_samples>
//!   <mean[0] … mean[sample_size-1]>
//!   <variance row(s) depending on style>
//!   [<distribution tag per dim> if style=mixed]
//! ... repeated per class until the input is exhausted ...
//! ```
//!
//! For `Spherical` the single variance row holds one `<variance>
//! <magnitude> <weight>` triple; for `Elliptical`/`Mixed` it holds three
//! rows of `sample_size` floats each — variance, magnitude, weight — in
//! that order, since the shape's per-dimension magnitude and weight are
//! pure functions of its variance ([`ProtoShape::weight`]) but are
//! persisted anyway for parity with the historical file's explicit
//! fields. `Mixed` additionally writes one distribution-tag token per
//! dimension after the three rows.
//!
//! `automatic` is deliberately not a readable style tag here: the
//! distiller's [`crate::config::ProtoStyle::Automatic`] is a fallthrough
//! *strategy*, not a shape a distilled [`Prototype`] ever carries
//! (`SPEC_FULL.md` §9 redesign flag), so there is no concrete row layout
//! to associate with that token. A file containing it is rejected as
//! [`IoError::UnknownStyle`] rather than guessed at (`SPEC_FULL.md` §9
//! Open Questions).

use std::io::Write;

use crate::distill::{Distribution, ProtoShape, Prototype};
use crate::error::IoError;
use crate::param::ParamDesc;

use super::paramdesc::{read_param_descs_from, write_one as write_param_desc};
use super::TokenCursor;

/// One class's worth of prototypes read from or destined for a normproto
/// file: the unichar label plus its distilled prototype list.
#[derive(Debug, Clone, PartialEq)]
pub struct NormProtoClass {
    /// Training-character label this block of prototypes belongs to.
    pub label: String,
    /// The class's prototypes, in file order.
    pub protos: Vec<Prototype>,
}

/// Reads a normproto file: the shared [`ParamDesc`] header followed by
/// zero or more class blocks, read until the input is exhausted.
///
/// # Errors
/// Returns [`IoError::MalformedRecord`] if any field is missing or does
/// not parse, [`IoError::UnknownStyle`]/[`IoError::UnknownDistribution`]
/// if a style or distribution token is unrecognised, or
/// [`IoError::Transport`] if the underlying reader fails.
pub fn read_normproto(reader: impl std::io::Read) -> Result<(Vec<ParamDesc>, Vec<NormProtoClass>), IoError> {
    let mut cursor = TokenCursor::from_reader(reader)?;
    let params = read_param_descs_from(&mut cursor)?;
    let mut classes = Vec::new();
    while !cursor.is_exhausted() {
        classes.push(read_class(&mut cursor, &params)?);
    }
    Ok((params, classes))
}

fn read_class(cursor: &mut TokenCursor, params: &[ParamDesc]) -> Result<NormProtoClass, IoError> {
    let label = cursor.next_token("unichar_label")?;
    let num_protos = cursor.next_usize("num_protos")?;
    let mut protos = Vec::with_capacity(num_protos);
    for _ in 0..num_protos {
        protos.push(read_prototype(cursor, params)?);
    }
    Ok(NormProtoClass { label, protos })
}

fn read_prototype(cursor: &mut TokenCursor, params: &[ParamDesc]) -> Result<Prototype, IoError> {
    let sample_size = params.len();
    let significant = match cursor.next_token("prototype significance")?.as_str() {
        "significant" => true,
        "insignificant" => false,
        other => {
            return Err(IoError::MalformedRecord {
                what: "prototype significance",
                detail: format!("expected `significant` or `insignificant`, got `{other}`"),
            });
        }
    };
    let style_token = cursor.next_token("prototype style")?;
    let num_samples = cursor.next_u32("num_samples")?;
    let mean = read_floats(cursor, "prototype mean", sample_size)?;

    let shape = match style_token.as_str() {
        "spherical" => {
            let variance = cursor.next_f32("spherical variance")?;
            let _magnitude = cursor.next_f32("spherical magnitude")?;
            let _weight = cursor.next_f32("spherical weight")?;
            ProtoShape::Spherical {
                variance,
                magnitude: crate::distill::spherical_magnitude(variance),
            }
        }
        "elliptical" => {
            let variance = read_floats(cursor, "elliptical variance row", sample_size)?;
            let _magnitude = read_floats(cursor, "elliptical magnitude row", sample_size)?;
            let _weight = read_floats(cursor, "elliptical weight row", sample_size)?;
            let magnitude = variance.iter().map(|&v| crate::distill::spherical_magnitude(v)).collect();
            ProtoShape::Elliptical { variance, magnitude }
        }
        "mixed" => {
            let variance = read_floats(cursor, "mixed variance row", sample_size)?;
            let _magnitude = read_floats(cursor, "mixed magnitude row", sample_size)?;
            let _weight = read_floats(cursor, "mixed weight row", sample_size)?;
            let mut distribution = Vec::with_capacity(sample_size);
            for _ in 0..sample_size {
                let token = cursor.next_token("distribution tag")?;
                let ch = token.chars().next().ok_or_else(|| IoError::UnknownDistribution { token: token.clone() })?;
                distribution.push(Distribution::from_token(ch).ok_or(IoError::UnknownDistribution { token })?);
            }
            let magnitude = variance
                .iter()
                .zip(&distribution)
                .zip(params)
                .map(|((&v, &dist), param)| crate::distill::mixed_magnitude(dist, v, param))
                .collect();
            ProtoShape::Mixed { distribution, variance, magnitude }
        }
        other => return Err(IoError::UnknownStyle { token: other.to_owned() }),
    };

    Ok(Prototype::new(mean, num_samples, significant, shape))
}

fn read_floats(cursor: &mut TokenCursor, what: &'static str, count: usize) -> Result<Vec<f32>, IoError> {
    (0..count).map(|_| cursor.next_f32(what)).collect()
}

/// Writes a normproto file: the shared [`ParamDesc`] header followed by
/// `classes` in order, each in the format [`read_normproto`] accepts.
///
/// # Errors
/// Returns [`IoError::Transport`] if the underlying writer fails.
pub fn write_normproto(writer: &mut impl Write, params: &[ParamDesc], classes: &[NormProtoClass]) -> Result<(), IoError> {
    writeln!(writer, "{}", params.len())?;
    for param in params {
        write_param_desc(writer, param)?;
    }
    for class in classes {
        write_class(writer, class)?;
    }
    Ok(())
}

fn write_class(writer: &mut impl Write, class: &NormProtoClass) -> Result<(), IoError> {
    writeln!(writer, "{} {}", class.label, class.protos.len())?;
    for proto in &class.protos {
        write_prototype(writer, proto)?;
    }
    Ok(())
}

fn write_prototype(writer: &mut impl Write, proto: &Prototype) -> Result<(), IoError> {
    let style_token = match proto.shape() {
        ProtoShape::Spherical { .. } => "spherical",
        ProtoShape::Elliptical { .. } => "elliptical",
        ProtoShape::Mixed { .. } => "mixed",
    };
    writeln!(
        writer,
        "{} {} {}",
        if proto.significant() { "significant" } else { "insignificant" },
        style_token,
        proto.sample_count(),
    )?;
    write_floats(writer, proto.mean())?;

    match proto.shape() {
        ProtoShape::Spherical { variance, magnitude } => {
            writeln!(writer, "{variance:.6} {magnitude:.6} {:.6}", proto.shape().weight(0))?;
        }
        ProtoShape::Elliptical { variance, magnitude } => {
            write_floats(writer, variance)?;
            write_floats(writer, magnitude)?;
            let weights: Vec<f32> = (0..variance.len()).map(|dim| proto.shape().weight(dim)).collect();
            write_floats(writer, &weights)?;
        }
        ProtoShape::Mixed { distribution, variance, magnitude } => {
            write_floats(writer, variance)?;
            write_floats(writer, magnitude)?;
            let weights: Vec<f32> = (0..variance.len()).map(|dim| proto.shape().weight(dim)).collect();
            write_floats(writer, &weights)?;
            for (i, dist) in distribution.iter().enumerate() {
                if i > 0 {
                    write!(writer, " ")?;
                }
                write!(writer, "{}", dist.token())?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

fn write_floats(writer: &mut impl Write, values: &[f32]) -> Result<(), IoError> {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(writer, " ")?;
        }
        write!(writer, "{value:.6}")?;
    }
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(n: usize) -> Vec<ParamDesc> {
        (0..n).map(|_| ParamDesc::new(false, false, -1.0, 1.0)).collect()
    }

    #[test]
    fn round_trips_a_spherical_prototype() {
        let params = params(2);
        let proto = Prototype::new(vec![0.1, -0.2], 12, true, ProtoShape::Spherical { variance: 0.02, magnitude: 1.5 });
        let classes = vec![NormProtoClass { label: "a".to_owned(), protos: vec![proto.clone()] }];

        let mut buf = Vec::new();
        write_normproto(&mut buf, &params, &classes).expect("writes successfully");
        let (read_params, read_classes) = read_normproto(buf.as_slice()).expect("reads successfully");

        assert_eq!(read_params.len(), params.len());
        assert_eq!(read_classes.len(), 1);
        assert_eq!(read_classes[0].label, "a");
        let read_proto = &read_classes[0].protos[0];
        assert_eq!(read_proto.significant(), proto.significant());
        assert_eq!(read_proto.sample_count(), proto.sample_count());
        for (a, b) in read_proto.mean().iter().zip(proto.mean()) {
            assert!((a - b).abs() < 1e-5);
        }
        match read_proto.shape() {
            ProtoShape::Spherical { variance, .. } => assert!((variance - 0.02).abs() < 1e-5),
            other => panic!("expected Spherical, got {other:?}"),
        }
    }

    #[test]
    fn round_trips_a_mixed_prototype_with_distribution_tags() {
        let params = params(2);
        let shape = ProtoShape::Mixed {
            distribution: vec![Distribution::Normal, Distribution::Uniform],
            variance: vec![0.01, 0.5],
            magnitude: vec![3.0, 1.0],
        };
        let proto = Prototype::new(vec![0.0, 0.0], 8, false, shape);
        let classes = vec![NormProtoClass { label: "b".to_owned(), protos: vec![proto] }];

        let mut buf = Vec::new();
        write_normproto(&mut buf, &params, &classes).expect("writes successfully");
        let (_, read_classes) = read_normproto(buf.as_slice()).expect("reads successfully");

        match read_classes[0].protos[0].shape() {
            ProtoShape::Mixed { distribution, .. } => {
                assert_eq!(distribution, &vec![Distribution::Normal, Distribution::Uniform]);
            }
            other => panic!("expected Mixed, got {other:?}"),
        }
        assert!(!read_classes[0].protos[0].significant());
    }

    #[test]
    fn rejects_an_automatic_style_token() {
        let input = "1\nlinear essential -1.000000 1.000000\nx 1\nsignificant automatic 4\n0.000000\n";
        let err = read_normproto(input.as_bytes()).expect_err("automatic has no concrete row layout");
        assert_eq!(err.code().as_str(), "unknown_style");
    }

    #[test]
    fn multiple_classes_are_read_until_input_is_exhausted() {
        let params = params(1);
        let proto = |n| Prototype::new(vec![0.0], n, true, ProtoShape::Spherical { variance: 0.01, magnitude: 1.0 });
        let classes = vec![
            NormProtoClass { label: "a".to_owned(), protos: vec![proto(3)] },
            NormProtoClass { label: "b".to_owned(), protos: vec![proto(4), proto(5)] },
        ];

        let mut buf = Vec::new();
        write_normproto(&mut buf, &params, &classes).expect("writes successfully");
        let (_, read_classes) = read_normproto(buf.as_slice()).expect("reads successfully");

        assert_eq!(read_classes.len(), 2);
        assert_eq!(read_classes[1].protos.len(), 2);
    }
}
