//! The ParamDesc per-dimension descriptor format (`SPEC_FULL.md` §6.1):
//!
//! ```text
//! <sample_size>
//! <circular|linear> <essential|non-essential> <min:float> <max:float>
//! ... repeated sample_size times ...
//! ```
//!
//! Shared between a standalone ParamDesc file and the header embedded at
//! the top of a normproto file (`SPEC_FULL.md` §6.1), which is why this
//! module exposes `read_one`/`write_one` for [`super::normproto`] to reuse
//! alongside the whole-file [`read_param_descs`]/[`write_param_descs`]
//! pair.

use std::io::Write;

use crate::error::IoError;
use crate::param::ParamDesc;

use super::TokenCursor;

/// Reads the `sample_size` count followed by that many per-dimension
/// descriptors from `reader`.
///
/// # Errors
/// Returns [`IoError::MalformedRecord`] if the count or any descriptor
/// field is missing or does not parse, or [`IoError::Transport`] if the
/// underlying reader fails.
pub fn read_param_descs(reader: impl std::io::Read) -> Result<Vec<ParamDesc>, IoError> {
    let mut cursor = TokenCursor::from_reader(reader)?;
    read_param_descs_from(&mut cursor)
}

pub(super) fn read_param_descs_from(cursor: &mut TokenCursor) -> Result<Vec<ParamDesc>, IoError> {
    let sample_size = cursor.next_usize("sample_size")?;
    let mut params = Vec::with_capacity(sample_size);
    for _ in 0..sample_size {
        params.push(read_one(cursor)?);
    }
    Ok(params)
}

fn read_one(cursor: &mut TokenCursor) -> Result<ParamDesc, IoError> {
    let circular = match cursor.next_token("ParamDesc circularity")?.as_str() {
        "circular" => true,
        "linear" => false,
        other => {
            return Err(IoError::MalformedRecord {
                what: "ParamDesc circularity",
                detail: format!("expected `circular` or `linear`, got `{other}`"),
            });
        }
    };
    let non_essential = match cursor.next_token("ParamDesc essentiality")?.as_str() {
        "essential" => false,
        "non-essential" => true,
        other => {
            return Err(IoError::MalformedRecord {
                what: "ParamDesc essentiality",
                detail: format!("expected `essential` or `non-essential`, got `{other}`"),
            });
        }
    };
    let min = cursor.next_f32("ParamDesc min")?;
    let max = cursor.next_f32("ParamDesc max")?;
    Ok(ParamDesc::new(circular, non_essential, min, max))
}

/// Writes the `sample_size` count followed by every descriptor in
/// `params`, in the format [`read_param_descs`] accepts.
///
/// # Errors
/// Returns [`IoError::Transport`] if the underlying writer fails.
pub fn write_param_descs(writer: &mut impl Write, params: &[ParamDesc]) -> Result<(), IoError> {
    writeln!(writer, "{}", params.len())?;
    for param in params {
        write_one(writer, param)?;
    }
    Ok(())
}

pub(super) fn write_one(writer: &mut impl Write, param: &ParamDesc) -> Result<(), IoError> {
    writeln!(
        writer,
        "{} {} {:.6} {:.6}",
        if param.circular() { "circular" } else { "linear" },
        if param.non_essential() { "non-essential" } else { "essential" },
        param.min(),
        param.max(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_mix_of_linear_and_circular_dimensions() {
        let params = vec![
            ParamDesc::new(false, false, -1.0, 1.0),
            ParamDesc::new(true, false, 0.0, 360.0),
            ParamDesc::new(false, true, 0.0, 1.0),
        ];

        let mut buf = Vec::new();
        write_param_descs(&mut buf, &params).expect("writes successfully");

        let read_back = read_param_descs(buf.as_slice()).expect("reads successfully");
        assert_eq!(read_back.len(), params.len());
        for (original, read) in params.iter().zip(read_back.iter()) {
            assert_eq!(original.circular(), read.circular());
            assert_eq!(original.non_essential(), read.non_essential());
            assert!((original.min() - read.min()).abs() < 1e-5);
            assert!((original.max() - read.max()).abs() < 1e-5);
        }
    }

    #[test]
    fn rejects_an_unknown_circularity_token() {
        let err = read_param_descs("1\nwibble essential 0.0 1.0".as_bytes()).expect_err("wibble is not a valid token");
        assert_eq!(err.code().as_str(), "malformed_record");
    }
}
