//! Flat-text run output: the measurement file and the optional trajectory file.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::SimConfig;
use crate::core::domain::Domain;
use crate::core::particle::Particle;
use crate::core::potential::Measurement;
use crate::core::sim::{Observer, Simulation};
use crate::error::Result;

/// Format like C's `%.{precision}e`: signed, at least two exponent digits.
pub fn sci(value: f64, precision: usize) -> String {
    let s = format!("{value:.precision$e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// Paths of one run's output files.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub dir: PathBuf,
    pub data: PathBuf,
    pub trajectory: PathBuf,
}

impl RunPaths {
    pub fn for_config(cfg: &SimConfig) -> Self {
        let dir = cfg.output_root.join(cfg.run_dir_name());
        let suffix = cfg.file_suffix();
        Self {
            data: dir.join(format!("data_{suffix}")),
            trajectory: dir.join(format!("trajectory_{suffix}")),
            dir,
        }
    }
}

/// Write one measurement line: `time energy pressure shear`, tab separated.
pub fn write_measurement<W: Write>(out: &mut W, time: f64, m: &Measurement) -> Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        sci(time, 10),
        sci(m.energy, 10),
        sci(m.pressure, 10),
        sci(m.shear_stress, 10)
    )?;
    Ok(())
}

/// Write one trajectory frame: a `time N lx ly` header, then `x y 0.0 diameter`
/// per particle.
pub fn write_frame<W: Write>(
    out: &mut W,
    time: f64,
    domain: &Domain,
    particles: &[Particle],
) -> Result<()> {
    writeln!(
        out,
        "{:.6}\t{}\t{:.10}\t{:.10}",
        time,
        particles.len(),
        domain.lx,
        domain.ly
    )?;
    for p in particles {
        writeln!(
            out,
            "{} {} {} {}",
            sci(p.r[0], 16),
            sci(p.r[1], 16),
            sci(0.0, 16),
            sci(p.diameter, 16)
        )?;
    }
    Ok(())
}

/// Observer writing the measurement file and, if enabled, the trajectory file.
#[derive(Debug)]
pub struct RunWriter {
    paths: RunPaths,
    data: BufWriter<File>,
    trajectory: Option<BufWriter<File>>,
}

impl RunWriter {
    /// Create the run directory (reused if it exists) and open the output files.
    pub fn create(cfg: &SimConfig) -> Result<Self> {
        let paths = RunPaths::for_config(cfg);
        fs::create_dir_all(&paths.dir)?;
        log::info!("writing output to {}", paths.dir.display());
        let data = BufWriter::new(File::create(&paths.data)?);
        let trajectory = if cfg.trajectory {
            Some(BufWriter::new(File::create(&paths.trajectory)?))
        } else {
            None
        };
        Ok(Self {
            paths,
            data,
            trajectory,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.paths.dir
    }

    /// Flush both files.
    pub fn finish(mut self) -> Result<RunPaths> {
        self.data.flush()?;
        if let Some(t) = self.trajectory.as_mut() {
            t.flush()?;
        }
        Ok(self.paths)
    }
}

impl Observer for RunWriter {
    fn on_measurement(&mut self, time: f64, m: &Measurement) -> Result<()> {
        write_measurement(&mut self.data, time, m)
    }

    fn on_frame(&mut self, time: f64, sim: &Simulation) -> Result<()> {
        match self.trajectory.as_mut() {
            Some(out) => write_frame(out, time, sim.domain(), sim.particles()),
            None => Ok(()),
        }
    }
}
