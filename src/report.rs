//! Fixed-width cluster summary table.
//!
//! ```text
//!                              Cluster#
//! Attribute        Full Data          0          1
//!                        (6)        (3)        (3)
//! ================================================
//! x                   5.3333     0.3333    10.3333
//! ```

use crate::error::Result;
use crate::kmeans::KMeansResult;
use crate::normalize::Extrema;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the table for `result`. With `extrema` every value is mapped back to
/// the unnormalized scale.
pub fn write_report<W: Write>(
    out: &mut W,
    attributes: &[String],
    result: &KMeansResult,
    extrema: Option<&[Extrema]>,
) -> Result<()> {
    let centroids = &result.centroids;
    let num_clusters = centroids.num_clusters();
    let num_points = result.labels.len();

    writeln!(out, "{:>37}", "Cluster#")?;
    write!(out, "{:<16}{:>10}", "Attribute", "Full Data")?;
    for c in 0..num_clusters {
        write!(out, "{:>11}", c)?;
    }
    writeln!(out)?;

    write!(out, "{:>26}", format!("({})", num_points))?;
    for &count in centroids.counts() {
        write!(out, "{:>11}", format!("({})", count))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(26 + 11 * num_clusters))?;

    let scale = |d: usize, value: f64| match extrema {
        Some(extrema) => extrema.get(d).map_or(value, |e| e.denormalize(value)),
        None => value,
    };

    for (d, name) in attributes.iter().enumerate().take(centroids.dimensions()) {
        let column = centroids.coords().column(d).to_owned();
        let weighted: f64 = column
            .iter()
            .zip(centroids.counts())
            .map(|(&v, &n)| v * n as f64)
            .sum();
        let overall = if num_points > 0 {
            weighted / num_points as f64
        } else {
            0.0
        };

        write!(out, "{:<16}{:>10.4}", name, scale(d, overall))?;
        for &v in column.iter() {
            write!(out, "{:>11.4}", scale(d, v))?;
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_report_file<P: AsRef<Path>>(
    path: P,
    attributes: &[String],
    result: &KMeansResult,
    extrema: Option<&[Extrema]>,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_report(&mut out, attributes, result, extrema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::centroids::CentroidSet;
    use crate::config::KMeansConfig;
    use crate::kmeans::KMeans;
    use crate::point::DensePoint;
    use ndarray::array;

    fn fitted() -> KMeansResult {
        let mut points: Vec<DensePoint> =
            [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [10.0, 10.0], [10.0, 11.0], [11.0, 10.0]]
                .iter()
                .map(|c| DensePoint::new(c.to_vec()))
                .collect();
        let initial = CentroidSet::from_coords(array![[0.0, 0.0], [10.0, 10.0]]);
        KMeans::new(KMeansConfig::new(2))
            .fit_from(&mut points, initial)
            .unwrap()
    }

    #[test]
    fn renders_fixed_width_table() {
        let result = fitted();
        let mut out = Vec::new();
        write_report(&mut out, &["x".into(), "y".into()], &result, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], format!("{:>37}", "Cluster#"));
        assert_eq!(
            lines[1],
            "Attribute        Full Data          0          1"
        );
        assert_eq!(
            lines[2],
            "                       (6)        (3)        (3)"
        );
        assert_eq!(lines[3], "=".repeat(48));
        assert_eq!(
            lines[4],
            "x                   5.3333     0.3333    10.3333"
        );
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn values_are_denormalized_when_extrema_are_given() {
        let result = fitted();
        let extrema = [
            Extrema { min: 1.0, max: 2.0 },
            Extrema { min: 4.0, max: 4.0 },
        ];
        let mut out = Vec::new();
        write_report(&mut out, &["x".into(), "y".into()], &result, Some(&extrema)).unwrap();
        let text = String::from_utf8(out).unwrap();
        let y = text.lines().nth(5).unwrap();
        assert_eq!(y, "y                   4.0000     4.0000     4.0000");
    }

    #[test]
    fn writes_to_a_file() {
        let result = fitted();
        let file = tempfile::NamedTempFile::new().unwrap();
        write_report_file(file.path(), &["x".into(), "y".into()], &result, None).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with(&format!("{:>37}\n", "Cluster#")));
    }
}
