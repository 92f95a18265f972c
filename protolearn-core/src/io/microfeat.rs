//! The Microfeat class-library dump format (`SPEC_FULL.md` §6.1, `spec.md`
//! §6 "inttemp-adjacent" text file), per class:
//!
//! ```text
//! <unichar_label>
//! <num_protos>
//!   <x> <y> <length> <angle> <A> <B> <C>
//! ...
//! <num_configs> <words_per_config>
//! <hex bitvector words ...>
//! ... repeated per class until the input is exhausted ...
//! ```
//!
//! This is the merger's output format, not the distiller's: each
//! prototype is the simplified [`GeometricProto`] line representation
//! `ProtoMerger` actually compares, not the statistical [`ProtoShape`].
//! The dump carries no per-page font ids or merge-weight counters — those
//! are training-time bookkeeping that [`read_microfeat`] cannot recover,
//! so a freshly read [`ClassLibrary`] reports every prototype merged
//! exactly once and an empty font set.

use std::io::Write;

use crate::bitvec::BitVector;
use crate::distill::{ProtoShape, Prototype};
use crate::error::IoError;
use crate::merge::{ClassLibrary, GeometricProto};

use super::TokenCursor;

/// Reads a Microfeat dump: zero or more `(label, class library)` pairs,
/// read until the input is exhausted.
///
/// Every prototype's shape is reconstructed as
/// [`ProtoShape::Spherical`] with a nominal unit variance and magnitude,
/// since the Microfeat format does not carry the statistical shape — only
/// the geometric line representation a freshly merged class library would
/// otherwise have discarded. Callers that need the original statistical
/// shape must keep the normproto file alongside the Microfeat dump; they
/// describe the same prototypes at two different stages of the pipeline.
///
/// # Errors
/// Returns [`IoError::MalformedRecord`] if any field is missing or does
/// not parse, or [`IoError::Transport`] if the underlying reader fails.
pub fn read_microfeat(reader: impl std::io::Read, max_num_protos: usize) -> Result<Vec<(String, ClassLibrary)>, IoError> {
    let mut cursor = TokenCursor::from_reader(reader)?;
    let mut classes = Vec::new();
    while !cursor.is_exhausted() {
        classes.push(read_class(&mut cursor, max_num_protos)?);
    }
    Ok(classes)
}

fn read_class(cursor: &mut TokenCursor, max_num_protos: usize) -> Result<(String, ClassLibrary), IoError> {
    let label = cursor.next_token("unichar_label")?;
    let num_protos = cursor.next_usize("num_protos")?;

    let mut protos = Vec::with_capacity(num_protos);
    for _ in 0..num_protos {
        protos.push(read_geometric_prototype(cursor)?);
    }

    let num_configs = cursor.next_usize("num_configs")?;
    let words_per_config = cursor.next_usize("words_per_config")?;
    let mut configs = Vec::with_capacity(num_configs);
    for _ in 0..num_configs {
        configs.push(read_config(cursor, words_per_config, num_protos)?);
    }

    let num_merged = vec![1_u32; protos.len()];
    let library = ClassLibrary::from_parts(protos, num_merged, configs, Vec::new(), max_num_protos);
    Ok((label, library))
}

fn read_geometric_prototype(cursor: &mut TokenCursor) -> Result<Prototype, IoError> {
    let x = cursor.next_f32("prototype x")?;
    let y = cursor.next_f32("prototype y")?;
    let length = cursor.next_f32("prototype length")?;
    let angle = cursor.next_f32("prototype angle")?;
    let a = cursor.next_f32("prototype A")?;
    let b = cursor.next_f32("prototype B")?;
    let c = cursor.next_f32("prototype C")?;
    let geo = GeometricProto::from_fields(x, y, length, angle, a, b, c);
    Ok(geometric_to_prototype(&geo))
}

fn geometric_to_prototype(geo: &GeometricProto) -> Prototype {
    let mean = vec![geo.x(), geo.y(), geo.length(), geo.angle()];
    Prototype::new(mean, 1, true, ProtoShape::Spherical { variance: 1.0, magnitude: 1.0 })
}

fn read_config(cursor: &mut TokenCursor, words_per_config: usize, num_protos: usize) -> Result<BitVector, IoError> {
    let mut words = Vec::with_capacity(words_per_config);
    for _ in 0..words_per_config {
        let token = cursor.next_token("bitvector word")?;
        let word = u32::from_str_radix(&token, 16).map_err(|_source| IoError::MalformedRecord {
            what: "bitvector word",
            detail: format!("expected 8 hex digits, got `{token}`"),
        })?;
        words.push(word);
    }
    Ok(BitVector::from_words(words, num_protos))
}

/// Writes a Microfeat dump: `classes` in order, each in the format
/// [`read_microfeat`] accepts.
///
/// # Errors
/// Returns [`IoError::Transport`] if the underlying writer fails.
pub fn write_microfeat(writer: &mut impl Write, classes: &[(String, ClassLibrary)]) -> Result<(), IoError> {
    for (label, library) in classes {
        write_class(writer, label, library)?;
    }
    Ok(())
}

fn write_class(writer: &mut impl Write, label: &str, library: &ClassLibrary) -> Result<(), IoError> {
    writeln!(writer, "{label}")?;
    writeln!(writer, "{}", library.protos().len())?;
    for proto in library.protos() {
        let geo = GeometricProto::from_prototype(proto);
        writeln!(
            writer,
            "\t{:.6} {:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
            geo.x(), geo.y(), geo.length(), geo.angle(), geo.a(), geo.b(), geo.c(),
        )?;
    }

    let words_per_config = library.protos().len().div_ceil(32).max(1);
    writeln!(writer, "{} {}", library.configs().len(), words_per_config)?;
    for config in library.configs() {
        let words = config.to_hex_words();
        writeln!(writer, "{}", words.join(" "))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::ProtoMerger;

    fn sample_library() -> ClassLibrary {
        let mut library = ClassLibrary::new(8);
        let merger = ProtoMerger::new();
        let proto = Prototype::new(vec![0.0, 0.0, 0.2, 0.0], 5, true, ProtoShape::Spherical { variance: 0.01, magnitude: 1.0 });
        merger.merge_page(&mut library, vec![proto], 1).expect("fits under max_num_protos");
        library
    }

    #[test]
    fn round_trips_a_class_library_with_one_prototype() {
        let classes = vec![("a".to_owned(), sample_library())];

        let mut buf = Vec::new();
        write_microfeat(&mut buf, &classes).expect("writes successfully");
        let read_back = read_microfeat(buf.as_slice(), 8).expect("reads successfully");

        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].0, "a");
        assert_eq!(read_back[0].1.protos().len(), 1);
        assert_eq!(read_back[0].1.configs().len(), 1);
        let original_geo = GeometricProto::from_prototype(&classes[0].1.protos()[0]);
        let read_geo = GeometricProto::from_prototype(&read_back[0].1.protos()[0]);
        assert!((original_geo.x() - read_geo.x()).abs() < 1e-5);
        assert!((original_geo.length() - read_geo.length()).abs() < 1e-5);
    }

    #[test]
    fn round_trips_multiple_classes_and_configs() {
        let mut library = sample_library();
        let merger = ProtoMerger::new();
        let far_proto = Prototype::new(vec![0.9, 0.9, 0.2, 0.25], 5, true, ProtoShape::Spherical { variance: 0.01, magnitude: 1.0 });
        merger.merge_page(&mut library, vec![far_proto], 2).expect("fits under max_num_protos");

        let classes = vec![("a".to_owned(), library), ("b".to_owned(), sample_library())];

        let mut buf = Vec::new();
        write_microfeat(&mut buf, &classes).expect("writes successfully");
        let read_back = read_microfeat(buf.as_slice(), 8).expect("reads successfully");

        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[0].1.protos().len(), 2);
        assert_eq!(read_back[0].1.configs().len(), 2);
        assert!(read_back[0].1.configs()[0].test(0));
        assert!(read_back[0].1.configs()[1].test(1));
        assert_eq!(read_back[1].0, "b");
    }

    #[test]
    fn rejects_a_malformed_bitvector_word() {
        let input = "a\n0\n1 1\nnot-hex\n";
        let err = read_microfeat(input.as_bytes(), 8).expect_err("not-hex is not a valid hex word");
        assert_eq!(err.code().as_str(), "malformed_record");
    }
}
