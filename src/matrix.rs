use std::{fs, path::Path, str::FromStr};

use ndarray::Array2;

use crate::{Error, Result};

/// Read a matrix of floats from a file
///
/// Each non-blank line is one row; entries are separated by any amount of whitespace.
pub fn read_matrix(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    parse_matrix(&read(path.as_ref())?)
}

/// Read a matrix of state indices from a file
///
/// Every entry must parse as a non-negative integer.
pub fn read_index_matrix(path: impl AsRef<Path>) -> Result<Array2<usize>> {
    parse_index_matrix(&read(path.as_ref())?)
}

/// Parse a matrix of floats from text
pub fn parse_matrix(text: &str) -> Result<Array2<f64>> {
    parse(text, |row, col, token| Error::InvalidNumber {
        row,
        col,
        token: token.to_owned(),
    })
}

/// Parse a matrix of state indices from text
pub fn parse_index_matrix(text: &str) -> Result<Array2<usize>> {
    parse(text, |row, col, token| Error::NonIntegerTransition {
        row,
        col,
        token: token.to_owned(),
    })
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse<T, F>(text: &str, invalid: F) -> Result<Array2<T>>
where
    T: FromStr,
    F: Fn(usize, usize, &str) -> Error,
{
    let mut data = Vec::new();
    let mut cols = None;
    let mut rows = 0;

    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let start = data.len();
        for (col, token) in line.split_whitespace().enumerate() {
            let value = token.parse::<T>().map_err(|_| invalid(rows, col, token))?;
            data.push(value);
        }

        let got = data.len() - start;
        match cols {
            None => cols = Some(got),
            Some(expected) if expected != got => {
                return Err(Error::RaggedMatrix {
                    row: rows,
                    expected,
                    got,
                })
            }
            _ => {}
        }
        rows += 1;
    }

    let cols = cols.ok_or(Error::EmptyMatrix)?;
    Ok(Array2::from_shape_vec((rows, cols), data).expect("row lengths were checked"))
}
