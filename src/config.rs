//! Run configuration and `-flag value` command-line parsing.

use std::path::PathBuf;

use crate::core::neighbor::DEFAULT_MAX_NEIGHBORS;
use crate::error::{Error, Result};

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Particle count.
    pub n: usize,
    /// Potential exponent (2.0 harmonic, 2.5 Hertzian).
    pub alpha: f64,
    /// Packing fraction.
    pub phi: f64,
    /// Polydispersity (standard deviation of the diameters).
    pub delta: f64,
    /// Aspect ratio `lx / ly`.
    pub gamma: f64,
    /// Wall offset from the box edges.
    pub w: f64,
    /// Obstacle diameter.
    pub sigm_obs: f64,
    /// Wall and obstacle spring stiffness.
    pub k: f64,
    /// External drive along x.
    pub fx_ext: f64,
    pub dt: f64,
    /// Run index; offsets the clock seed and names the output files.
    pub run: u64,
    /// Neighbor-list cutoff.
    pub r_neighbor: f64,
    /// Emit trajectory frames.
    pub trajectory: bool,
    /// Measurement and frame cadence, in steps.
    pub output_step: u64,
    pub total_step: u64,
    /// Explicit seed; `None` seeds from the clock and `run`.
    pub seed: Option<u64>,
    /// Per-particle neighbor capacity.
    pub max_neighbors: usize,
    /// Directory the run directory is created in.
    pub output_root: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n: 900,
            alpha: 2.5,
            phi: 1.2,
            delta: 0.1,
            gamma: 1.5,
            w: 1.0,
            sigm_obs: 5.0,
            k: 10.0,
            fx_ext: 0.005,
            dt: 0.1,
            run: 0,
            r_neighbor: 3.0,
            trajectory: false,
            output_step: 100,
            total_step: 100_000,
            seed: None,
            max_neighbors: DEFAULT_MAX_NEIGHBORS,
            output_root: PathBuf::from("."),
        }
    }
}

const REQUIRED: [&str; 11] = [
    "-N",
    "-phi",
    "-delta",
    "-gamma",
    "-w",
    "-sigm_obs",
    "-K",
    "-fx_ext",
    "-dt",
    "-output_step",
    "-total_step",
];

impl SimConfig {
    /// Parse `-flag value` pairs (program name excluded) and validate.
    ///
    /// Errors: `Error::Config` on unknown flags, missing values, unparseable
    /// values, missing required flags, or values failing [`SimConfig::validate`].
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cfg = Self::default();
        let mut seen: Vec<String> = Vec::new();
        let mut it = args.into_iter();
        while let Some(flag) = it.next() {
            let flag = flag.as_ref().to_string();
            let value = it
                .next()
                .ok_or_else(|| Error::Config(format!("flag {flag} needs a value")))?;
            let value = value.as_ref();
            match flag.as_str() {
                "-N" => cfg.n = parse(&flag, value)?,
                "-alpha" => cfg.alpha = parse(&flag, value)?,
                "-phi" => cfg.phi = parse(&flag, value)?,
                "-delta" => cfg.delta = parse(&flag, value)?,
                "-gamma" => cfg.gamma = parse(&flag, value)?,
                "-w" => cfg.w = parse(&flag, value)?,
                "-sigm_obs" => cfg.sigm_obs = parse(&flag, value)?,
                "-K" => cfg.k = parse(&flag, value)?,
                "-fx_ext" => cfg.fx_ext = parse(&flag, value)?,
                "-dt" => cfg.dt = parse(&flag, value)?,
                "-run" => cfg.run = parse(&flag, value)?,
                "-r_neighbor" => cfg.r_neighbor = parse(&flag, value)?,
                "-trajectory" => {
                    cfg.trajectory = match value {
                        "0" => false,
                        "1" => true,
                        other => {
                            return Err(Error::Config(format!(
                                "-trajectory takes 0 or 1, got {other:?}"
                            )))
                        }
                    }
                }
                "-output_step" => cfg.output_step = parse(&flag, value)?,
                "-total_step" => cfg.total_step = parse(&flag, value)?,
                "-seed" => cfg.seed = Some(parse(&flag, value)?),
                "-list_max" => cfg.max_neighbors = parse(&flag, value)?,
                "-out" => cfg.output_root = PathBuf::from(value),
                _ => return Err(Error::Config(format!("unknown flag {flag}"))),
            }
            seen.push(flag);
        }

        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|r| !seen.iter().any(|s| s == r))
            .collect();
        if !missing.is_empty() {
            return Err(Error::Config(format!(
                "missing required flags: {}",
                missing.join(" ")
            )));
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Check ranges of every parameter.
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::Config("-N must be >= 1".into()));
        }
        let reals = [
            ("-alpha", self.alpha),
            ("-phi", self.phi),
            ("-delta", self.delta),
            ("-gamma", self.gamma),
            ("-w", self.w),
            ("-sigm_obs", self.sigm_obs),
            ("-K", self.k),
            ("-fx_ext", self.fx_ext),
            ("-dt", self.dt),
            ("-r_neighbor", self.r_neighbor),
        ];
        if let Some((name, _)) = reals.iter().find(|(_, v)| !v.is_finite()) {
            return Err(Error::Config(format!("{name} must be finite")));
        }
        positive("-phi", self.phi)?;
        positive("-gamma", self.gamma)?;
        positive("-dt", self.dt)?;
        non_negative("-delta", self.delta)?;
        non_negative("-w", self.w)?;
        non_negative("-sigm_obs", self.sigm_obs)?;
        non_negative("-K", self.k)?;
        if self.alpha <= 1.0 {
            return Err(Error::Config("-alpha must be > 1".into()));
        }
        if self.r_neighbor <= 1.0 {
            return Err(Error::Config(
                "-r_neighbor must be > 1 so the Verlet skin is positive".into(),
            ));
        }
        if self.output_step == 0 {
            return Err(Error::Config("-output_step must be >= 1".into()));
        }
        if self.max_neighbors == 0 {
            return Err(Error::Config("-list_max must be >= 1".into()));
        }
        Ok(())
    }

    /// Name of the run directory, encoding the physical parameters.
    pub fn run_dir_name(&self) -> String {
        format!(
            "Flow_N{}_alpha{:.3}_phi{:.3}_delta{:.3}_gamma{:.3}_w{:.3}_sigm_obs{:.3}_K{:.3}_fx_ext{:.6}_dt{:.3}",
            self.n,
            self.alpha,
            self.phi,
            self.delta,
            self.gamma,
            self.w,
            self.sigm_obs,
            self.k,
            self.fx_ext,
            self.dt
        )
    }

    /// Suffix shared by the measurement and trajectory file names.
    pub fn file_suffix(&self) -> String {
        format!(
            "total_step{}_output_step{}_run{}.txt",
            self.total_step, self.output_step, self.run
        )
    }
}

fn parse<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("cannot parse {value:?} for {flag}")))
}

fn positive(name: &str, v: f64) -> Result<()> {
    if v <= 0.0 {
        return Err(Error::Config(format!("{name} must be > 0")));
    }
    Ok(())
}

fn non_negative(name: &str, v: f64) -> Result<()> {
    if v < 0.0 {
        return Err(Error::Config(format!("{name} must be >= 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "-N 900 -phi 1.2 -delta 0.1 -gamma 1.5 -w 1.0 -sigm_obs 5.0 -K 10.0 \
        -fx_ext 0.005 -dt 0.1 -trajectory 1 -total_step 100000 -output_step 100 -run 1";

    fn args(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn parses_full_command_line() -> Result<()> {
        let cfg = SimConfig::from_args(args(EXAMPLE))?;
        assert_eq!(cfg.n, 900);
        assert_eq!(cfg.alpha, 2.5);
        assert_eq!(cfg.r_neighbor, 3.0);
        assert!(cfg.trajectory);
        assert_eq!(cfg.run, 1);
        assert_eq!(cfg.total_step, 100_000);
        assert_eq!(cfg.seed, None);
        Ok(())
    }

    #[test]
    fn optional_flags_override_defaults() -> Result<()> {
        let line =
            format!("{EXAMPLE} -alpha 2.0 -r_neighbor 2.5 -seed 42 -list_max 64 -out /tmp/x");
        let cfg = SimConfig::from_args(args(&line))?;
        assert_eq!(cfg.alpha, 2.0);
        assert_eq!(cfg.r_neighbor, 2.5);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.max_neighbors, 64);
        assert_eq!(cfg.output_root, PathBuf::from("/tmp/x"));
        Ok(())
    }

    #[test]
    fn missing_required_flag_reported() {
        let err = SimConfig::from_args(args("-N 10 -phi 1.0")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("missing required flags"));
        assert!(msg.contains("-gamma"));
    }

    #[test]
    fn bad_values_rejected() {
        for bad in [
            "-phi 0",
            "-gamma -1",
            "-dt 0",
            "-delta -0.1",
            "-alpha 1.0",
            "-r_neighbor 0.9",
            "-output_step 0",
            "-trajectory 2",
            "-N ten",
        ] {
            let line = format!("{EXAMPLE} {bad}");
            assert!(
                matches!(SimConfig::from_args(args(&line)), Err(Error::Config(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_flag_and_dangling_flag_rejected() {
        assert!(SimConfig::from_args(args(&format!("{EXAMPLE} -bogus 1"))).is_err());
        assert!(SimConfig::from_args(args(&format!("{EXAMPLE} -alpha"))).is_err());
    }

    #[test]
    fn names_follow_parameters() -> Result<()> {
        let cfg = SimConfig::from_args(args(EXAMPLE))?;
        assert_eq!(
            cfg.run_dir_name(),
            "Flow_N900_alpha2.500_phi1.200_delta0.100_gamma1.500_w1.000_sigm_obs5.000_K10.000_fx_ext0.005000_dt0.100"
        );
        assert_eq!(cfg.file_suffix(), "total_step100000_output_step100_run1.txt");
        Ok(())
    }
}
