//! Reader for ARFF tables with dense (`1,2,3`) or sparse (`{0 1, 2 3}`) rows.

use crate::error::{KMeansError, Result};
use crate::point::{DensePoint, SparsePoint};
use crate::vector_store::{Points, VectorStore};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

enum Row {
    Dense(Vec<f64>),
    Sparse(Vec<(usize, f64)>),
}

pub fn read_arff<P: AsRef<Path>>(path: P) -> Result<VectorStore> {
    let content = fs::read_to_string(path)?;
    parse_arff(&content)
}

/// Parse ARFF text. The result is sparse if any data row is sparse.
pub fn parse_arff(content: &str) -> Result<VectorStore> {
    let mut relation = String::new();
    let mut attributes: Vec<String> = Vec::new();
    let mut rows: Vec<Row> = Vec::new();
    let mut in_data = false;

    for (i, raw) in content.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        if in_data {
            let row = if let Some(body) = line.strip_prefix('{') {
                parse_sparse_row(body, attributes.len(), line_no)?
            } else {
                parse_dense_row(line, attributes.len(), line_no)?
            };
            rows.push(row);
            continue;
        }

        let (keyword, rest) = split_keyword(line);
        match keyword.to_ascii_lowercase().as_str() {
            "@relation" => {
                relation = split_name(rest).0;
            }
            "@attribute" => {
                let (name, kind) = split_name(rest);
                if name.is_empty() {
                    return Err(parse_error(line_no, "attribute without a name"));
                }
                let kind = kind.trim();
                if !matches!(
                    kind.to_ascii_lowercase().as_str(),
                    "numeric" | "real" | "integer"
                ) {
                    warn!(attribute = %name, kind, "treating non-numeric attribute as numeric");
                }
                attributes.push(name);
            }
            "@data" => {
                if attributes.is_empty() {
                    return Err(parse_error(line_no, "@data before any @attribute"));
                }
                in_data = true;
            }
            _ => {
                return Err(parse_error(
                    line_no,
                    format!("unexpected header line '{}'", line),
                ))
            }
        }
    }

    if !in_data {
        return Err(parse_error(content.lines().count(), "missing @data section"));
    }

    let dimensions = attributes.len();
    let any_sparse = rows.iter().any(|r| matches!(r, Row::Sparse(_)));
    let points = if any_sparse {
        let points = rows
            .into_iter()
            .map(|row| match row {
                Row::Sparse(entries) => SparsePoint::from_unsorted(entries),
                Row::Dense(values) => Ok(SparsePoint::from_dense(&DensePoint::new(values))),
            })
            .collect::<Result<Vec<_>>>()?;
        Points::Sparse(points)
    } else {
        Points::Dense(
            rows.into_iter()
                .filter_map(|row| match row {
                    Row::Dense(values) => Some(DensePoint::new(values)),
                    Row::Sparse(_) => None,
                })
                .collect(),
        )
    };

    info!(
        relation = %relation,
        attributes = dimensions,
        points = points.len(),
        sparse = any_sparse,
        "read ARFF data"
    );
    Ok(VectorStore::new(relation, attributes, points))
}

fn parse_error(line: usize, message: impl Into<String>) -> KMeansError {
    KMeansError::Parse {
        line,
        message: message.into(),
    }
}

fn split_keyword(line: &str) -> (&str, &str) {
    match line.find(char::is_whitespace) {
        Some(pos) => (&line[..pos], line[pos..].trim_start()),
        None => (line, ""),
    }
}

/// Split a possibly quoted name off the front of `rest`.
fn split_name(rest: &str) -> (String, &str) {
    let rest = rest.trim_start();
    for quote in ['\'', '"'] {
        if let Some(body) = rest.strip_prefix(quote) {
            if let Some(end) = body.find(quote) {
                return (body[..end].to_string(), &body[end + 1..]);
            }
        }
    }
    let (name, tail) = split_keyword(rest);
    (name.to_string(), tail)
}

fn parse_value(token: &str, line_no: usize) -> Result<f64> {
    let token = token.trim();
    if token == "?" {
        return Err(parse_error(line_no, "missing data not supported"));
    }
    token
        .parse::<f64>()
        .map_err(|_| parse_error(line_no, format!("invalid number '{}'", token)))
}

fn parse_dense_row(line: &str, dimensions: usize, line_no: usize) -> Result<Row> {
    let values = line
        .split(',')
        .map(|token| parse_value(token, line_no))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != dimensions {
        return Err(parse_error(
            line_no,
            format!("expected {} values, found {}", dimensions, values.len()),
        ));
    }
    Ok(Row::Dense(values))
}

fn parse_sparse_row(body: &str, dimensions: usize, line_no: usize) -> Result<Row> {
    let body = body
        .trim_end()
        .strip_suffix('}')
        .ok_or_else(|| parse_error(line_no, "unterminated sparse row"))?;

    let mut entries = Vec::new();
    for pair in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let mut parts = pair.split_whitespace();
        let (index, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(index), Some(value), None) => (index, value),
            _ => return Err(parse_error(line_no, format!("malformed entry '{}'", pair))),
        };
        let index: usize = index
            .parse()
            .map_err(|_| parse_error(line_no, format!("invalid index '{}'", index)))?;
        if index >= dimensions {
            return Err(parse_error(
                line_no,
                format!("index {} outside {} attributes", index, dimensions),
            ));
        }
        entries.push((index, parse_value(value, line_no)?));
    }
    Ok(Row::Sparse(entries))
}
