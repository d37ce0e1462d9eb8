//! Post-run analysis of trajectory and measurement files.
//!
//! Displacement anisotropy between snapshots (how strongly the non-affine
//! motion is aligned with one direction) and jammed/flowing classification of
//! finished runs.

use std::io::BufRead;

use crate::core::particle::DIM;
use crate::error::{Error, Result};

/// One trajectory frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub time: f64,
    pub lx: f64,
    pub ly: f64,
    pub positions: Vec<[f64; DIM]>,
    pub diameters: Vec<f64>,
}

/// Parse every frame of a trajectory file.
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<Frame>> {
    let mut frames = Vec::new();
    let mut lines = reader.lines().enumerate();
    while let Some((lineno, header)) = lines.next() {
        let header = header?;
        if header.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = header.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(malformed(lineno, "frame header needs time, N, L_x, L_y"));
        }
        let time = field(&fields, 0, lineno)?;
        let n: usize = fields[1]
            .parse()
            .map_err(|_| malformed(lineno, "particle count is not an integer"))?;
        let lx = field(&fields, 2, lineno)?;
        let ly = field(&fields, 3, lineno)?;

        let mut positions = Vec::with_capacity(n);
        let mut diameters = Vec::with_capacity(n);
        for _ in 0..n {
            let (lineno, line) = lines
                .next()
                .ok_or_else(|| malformed(lineno, "frame ends before N particle lines"))?;
            let line = line?;
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 4 {
                return Err(malformed(lineno, "particle line needs x y z diameter"));
            }
            positions.push([field(&cols, 0, lineno)?, field(&cols, 1, lineno)?]);
            diameters.push(field(&cols, 3, lineno)?);
        }
        frames.push(Frame {
            time,
            lx,
            ly,
            positions,
            diameters,
        });
    }
    Ok(frames)
}

/// Per-particle displacement from `a` to `b` with the mean drift removed.
///
/// Minimum image is applied along x only; y is confined by walls.
pub fn drift_free_displacements(a: &Frame, b: &Frame) -> Result<Vec<[f64; DIM]>> {
    if a.positions.len() != b.positions.len() {
        return Err(Error::MalformedData(format!(
            "frames hold {} and {} particles",
            a.positions.len(),
            b.positions.len()
        )));
    }
    if a.positions.is_empty() {
        return Ok(Vec::new());
    }
    let lx = a.lx;
    let mut d: Vec<[f64; DIM]> = a
        .positions
        .iter()
        .zip(&b.positions)
        .map(|(p, q)| {
            let dx = q[0] - p[0];
            [dx - lx * (dx / lx).round(), q[1] - p[1]]
        })
        .collect();
    let n = d.len() as f64;
    let mx = d.iter().map(|v| v[0]).sum::<f64>() / n;
    let my = d.iter().map(|v| v[1]).sum::<f64>() / n;
    for v in &mut d {
        v[0] -= mx;
        v[1] -= my;
    }
    Ok(d)
}

/// Anisotropy `A = (l_max - l_min) / (l_max + l_min)` of the displacement
/// covariance; 0 when there is no motion at all.
pub fn anisotropy(displacements: &[[f64; DIM]]) -> f64 {
    if displacements.is_empty() {
        return 0.0;
    }
    let n = displacements.len() as f64;
    let (m11, m12, m22) = displacements.iter().fold((0.0, 0.0, 0.0), |(a, b, c), v| {
        (a + v[0] * v[0], b + v[0] * v[1], c + v[1] * v[1])
    });
    let (m11, m12, m22) = (m11 / n, m12 / n, m22 / n);
    let trace = m11 + m22;
    if trace == 0.0 {
        return 0.0;
    }
    // For a symmetric 2x2 matrix, l_max - l_min = sqrt((m11 - m22)^2 + 4 m12^2).
    let split = ((m11 - m22) * (m11 - m22) + 4.0 * m12 * m12).sqrt();
    split / trace
}

/// Mean and spread of the anisotropy over frame pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnisotropySeries {
    pub values: Vec<f64>,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

/// Anisotropy for every frame pair `(k, k + lag)`.
pub fn anisotropy_series(frames: &[Frame], lag: usize) -> Result<AnisotropySeries> {
    if lag == 0 {
        return Err(Error::Config("lag must be >= 1".into()));
    }
    let values = frames
        .iter()
        .zip(frames.iter().skip(lag))
        .map(|(a, b)| drift_free_displacements(a, b).map(|d| anisotropy(&d)))
        .collect::<Result<Vec<_>>>()?;
    if values.is_empty() {
        return Err(Error::MalformedData(format!(
            "{} frames are too few for lag {lag}",
            frames.len()
        )));
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = (values.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>() / n).sqrt();
    Ok(AnisotropySeries {
        values,
        mean,
        std_dev,
    })
}

/// Whether a finished run still moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// The energy stopped changing between the last two measurements.
    Jammed,
    Flowing,
}

/// Classify a run from the energy column of the last two lines of its
/// measurement file.
pub fn classify_flow<R: BufRead>(reader: R) -> Result<FlowState> {
    let mut last: Option<f64> = None;
    let mut previous: Option<f64> = None;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.is_empty() {
            continue;
        }
        if cols.len() < 2 {
            return Err(malformed(lineno, "measurement line needs time and energy"));
        }
        previous = last;
        last = Some(field(&cols, 1, lineno)?);
    }
    match (previous, last) {
        (Some(e1), Some(e2)) => Ok(if is_close(e1, e2) {
            FlowState::Jammed
        } else {
            FlowState::Flowing
        }),
        _ => Err(Error::MalformedData(
            "need at least two measurements to classify a run".into(),
        )),
    }
}

fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-15 + 1e-12 * b.abs()
}

fn field(cols: &[&str], idx: usize, lineno: usize) -> Result<f64> {
    cols[idx].parse().map_err(|_| {
        let msg = format!("column {} is not a number: {:?}", idx + 1, cols[idx]);
        malformed(lineno, &msg)
    })
}

fn malformed(lineno: usize, msg: &str) -> Error {
    Error::MalformedData(format!("line {}: {msg}", lineno + 1))
}
