use std::io::BufRead;

use ndarray::ArrayView1;

use crate::error::{Error, Result};

/// Largest absolute component of a vector, zero for an empty vector.
pub fn max_abs(v: ArrayView1<f64>) -> f64 {
    v.iter().fold(0., |max, x| max.max(x.abs()))
}

/// l2 norm that does not overflow or underflow for finite components.
pub fn l2_norm(v: ArrayView1<f64>) -> f64 {
    let scale = max_abs(v);
    if scale == 0. {
        return 0.;
    }

    scale * v.iter().map(|x| (x / scale).powi(2)).sum::<f64>().sqrt()
}

pub fn read_number(reader: &mut dyn BufRead, delim: u8) -> Result<usize> {
    let field_str = read_string(reader, delim)?;
    field_str.trim().parse().map_err(|e| {
        Error::Format(format!(
            "Cannot parse shape component '{}': {}",
            field_str, e
        ))
    })
}

pub fn read_string(reader: &mut dyn BufRead, delim: u8) -> Result<String> {
    let mut buf = Vec::new();
    reader
        .read_until(delim, &mut buf)
        .map_err(|e| Error::read_error("Cannot read string", e))?;
    if buf.last() == Some(&delim) {
        buf.pop();
    }

    String::from_utf8(buf)
        .map_err(|e| Error::Format(format!("Token contains invalid UTF-8: {}", e)))
}
