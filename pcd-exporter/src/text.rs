use std::io::{self, Write};

use pcd_core::pointcloud::point::{PointCloud, WeightedPoint};
use rayon::prelude::*;

const CHUNK_POINTS: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    /// Digits after the decimal point of the mantissa.
    pub precision: usize,
    pub delimiter: char,
}

impl Default for TextFormat {
    fn default() -> Self {
        Self {
            precision: 18,
            delimiter: ' ',
        }
    }
}

/// A point cloud serialized as whitespace-delimited text, ready to be piped
/// into another process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializedBuffer {
    bytes: Vec<u8>,
    point_count: usize,
}

impl SerializedBuffer {
    /// Wraps text that is already in the point-per-line layout.
    pub fn new(bytes: Vec<u8>, point_count: usize) -> Self {
        Self { bytes, point_count }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn point_count(&self) -> usize {
        self.point_count
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for SerializedBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

pub fn write_cloud<W: Write>(
    writer: &mut W,
    cloud: &PointCloud,
    format: &TextFormat,
) -> io::Result<()> {
    let mut line = String::new();
    for point in &cloud.points {
        line.clear();
        push_point(&mut line, point, format);
        writer.write_all(line.as_bytes())?;
    }
    Ok(())
}

/// Serializes the cloud in memory. Rows are formatted in parallel chunks and
/// joined back in their original order.
pub fn to_buffer(cloud: &PointCloud, format: &TextFormat) -> SerializedBuffer {
    let chunks: Vec<String> = cloud
        .points
        .par_chunks(CHUNK_POINTS)
        .map(|chunk| {
            let mut text = String::with_capacity(chunk.len() * (4 * (format.precision + 8)));
            for point in chunk {
                push_point(&mut text, point, format);
            }
            text
        })
        .collect();

    let mut bytes = Vec::with_capacity(chunks.iter().map(String::len).sum());
    for chunk in &chunks {
        bytes.extend_from_slice(chunk.as_bytes());
    }

    SerializedBuffer {
        bytes,
        point_count: cloud.points.len(),
    }
}

fn push_point(out: &mut String, point: &WeightedPoint, format: &TextFormat) {
    for (index, value) in point.to_array().into_iter().enumerate() {
        if index > 0 {
            out.push(format.delimiter);
        }
        push_value(out, value, format.precision);
    }
    out.push('\n');
}

// Scientific notation with a signed exponent of at least two digits,
// e.g. 1.500e+00, the layout C's printf("%.*e") produces.
fn push_value(out: &mut String, value: f64, precision: usize) {
    if value.is_nan() {
        out.push_str("nan");
        return;
    }
    if value.is_infinite() {
        out.push_str(if value > 0.0 { "inf" } else { "-inf" });
        return;
    }

    let formatted = format!("{value:.precision$e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .unwrap_or((formatted.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    out.push_str(mantissa);
    out.push('e');
    out.push(if exponent < 0 { '-' } else { '+' });
    if exponent.abs() < 10 {
        out.push('0');
    }
    out.push_str(&exponent.abs().to_string());
}
