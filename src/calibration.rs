use std::{fs, path::Path};

use log::debug;
use nalgebra::Matrix4;

use crate::Error;

pub const PROJECTION_SECTION: &str = "OpenGL Projection Matrix";
pub const VIEW_SECTION: &str = "OpenGL View Matrix";

const MATRIX_SIZE: usize = 4;
const MATRIX_VALUES: usize = MATRIX_SIZE * MATRIX_SIZE;

/// Projector calibration, as written by the projector-camera calibration tool.
///
/// The dump is plain text with any number of labeled sections:
///
/// ```text
/// OpenGL Projection Matrix
/// [4.08863642519573, 0, -0.1598951637553037, 0;
///   0, 5.938522796755259, 1.472432012343846, 0;
///   0, 0, -1.02020202020202, -0.202020202020202;
///   0, 0, -1, 0]
/// ```
///
/// Only the projection and view sections are consumed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationMatrices {
    pub projection: Matrix4<f32>,
    pub view: Matrix4<f32>,
}

impl CalibrationMatrices {
    /// Read the whole file and parse both matrices from it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        debug!("Parsing calibration file {}", path.display());

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Error> {
        Ok(Self {
            projection: read_projection_matrix(content)?,
            view: read_view_matrix(content)?,
        })
    }

    /// Render both sections in the calibration tool's layout.
    pub fn to_dump(&self) -> String {
        let mut dump = String::new();

        write_section(&mut dump, PROJECTION_SECTION, &self.projection);
        dump.push('\n');
        write_section(&mut dump, VIEW_SECTION, &self.view);

        dump
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        fs::write(path, self.to_dump())?;

        Ok(())
    }
}

pub fn read_projection_matrix(content: &str) -> Result<Matrix4<f32>, Error> {
    read_section_matrix(content, PROJECTION_SECTION)
}

pub fn read_view_matrix(content: &str) -> Result<Matrix4<f32>, Error> {
    read_section_matrix(content, VIEW_SECTION)
}

/// Parse the 4x4 row-major matrix following `header` (matched case-insensitively).
pub fn read_section_matrix(content: &str, header: &str) -> Result<Matrix4<f32>, Error> {
    let body = find_section(content, header).ok_or_else(|| Error::SectionNotFound(header.to_string()))?;
    let values: Vec<f32> = NumericTokens::new(body).take(MATRIX_VALUES).collect();

    if values.len() < MATRIX_VALUES {
        return Err(Error::MalformedMatrix {
            section: header.to_string(),
            found: values.len(),
        });
    }

    // values[i * 4 + j] is element (i, j)
    Ok(Matrix4::from_row_slice(&values))
}

/// Text between the end of `header` and the next `]` (included), or the end of the content.
fn find_section<'a>(content: &'a str, header: &str) -> Option<&'a str> {
    // ASCII lowercasing keeps byte offsets valid for slicing the original content
    let haystack = content.to_ascii_lowercase();
    let needle = header.to_ascii_lowercase();

    let start = haystack.find(&needle)? + needle.len();
    let end = content[start..]
        .find(']')
        .map(|offset| start + offset + 1)
        .unwrap_or(content.len());

    Some(&content[start..end])
}

fn write_section(dump: &mut String, header: &str, matrix: &Matrix4<f32>) {
    dump.push_str(header);
    dump.push_str("\n[");

    for row in 0..MATRIX_SIZE {
        if row > 0 {
            dump.push_str(";\n  ");
        }

        for column in 0..MATRIX_SIZE {
            if column > 0 {
                dump.push_str(", ");
            }

            dump.push_str(&matrix[(row, column)].to_string());
        }
    }

    dump.push_str("]\n");
}

/// Signed decimal numbers (`-12`, `0.5`, `-3.2e-05`) embedded in arbitrary text.
struct NumericTokens<'a> {
    bytes: &'a [u8],
    text: &'a str,
    position: usize,
}

impl<'a> NumericTokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            bytes: text.as_bytes(),
            text,
            position: 0,
        }
    }

    fn digit_at(&self, index: usize) -> bool {
        self.bytes.get(index).is_some_and(u8::is_ascii_digit)
    }

    fn skip_digits(&self, mut index: usize) -> usize {
        while self.digit_at(index) {
            index += 1;
        }

        index
    }
}

impl Iterator for NumericTokens<'_> {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        while self.position < self.bytes.len() {
            let start = self.position;
            let negative = self.bytes[start] == b'-' && self.digit_at(start + 1);

            if !negative && !self.digit_at(start) {
                self.position += 1;
                continue;
            }

            let mut end = self.skip_digits(if negative { start + 1 } else { start });

            if self.bytes.get(end) == Some(&b'.') && self.digit_at(end + 1) {
                end = self.skip_digits(end + 1);
            }

            if matches!(self.bytes.get(end), Some(b'e' | b'E')) {
                let sign = usize::from(matches!(self.bytes.get(end + 1), Some(b'-' | b'+')));

                if self.digit_at(end + 1 + sign) {
                    end = self.skip_digits(end + 1 + sign);
                }
            }

            self.position = end;

            if let Ok(value) = self.text[start..end].parse() {
                return Some(value);
            }
        }

        None
    }
}
