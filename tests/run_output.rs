use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use foamflow::analysis::{anisotropy_series, classify_flow, read_frames};
use foamflow::config::SimConfig;
use foamflow::core::{SeededUniform, Simulation};
use foamflow::error::Result;
use foamflow::output::RunWriter;

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("foamflow-{name}-{}", std::process::id()))
}

/// A short driven run writes one measurement line per output step and a
/// trajectory that the analysis tools can read back.
#[test]
fn short_run_writes_readable_files() -> Result<()> {
    let root = scratch_dir("run");
    let cfg = SimConfig {
        n: 30,
        phi: 0.8,
        delta: 0.1,
        gamma: 2.0,
        w: 0.5,
        sigm_obs: 2.0,
        k: 10.0,
        fx_ext: 0.05,
        dt: 0.1,
        trajectory: true,
        output_step: 5,
        total_step: 20,
        seed: Some(7),
        output_root: root.clone(),
        ..SimConfig::default()
    };

    let mut writer = RunWriter::create(&cfg)?;
    assert!(writer.dir().starts_with(&root));
    let mut sim = Simulation::new(cfg.clone(), &mut SeededUniform::from_seed(7))?;
    sim.run(&mut writer)?;
    let paths = writer.finish()?;

    let data = fs::read_to_string(&paths.data)?;
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines.len(), 4);
    for line in &lines {
        let cols: Vec<&str> = line.split('\t').collect();
        assert_eq!(cols.len(), 4);
        for c in cols {
            assert!(c.contains('e'), "{c} not in scientific notation");
            assert!(c.parse::<f64>().is_ok());
        }
    }

    let frames = read_frames(BufReader::new(File::open(&paths.trajectory)?))?;
    assert_eq!(frames.len(), 5);
    let domain = sim.domain();
    for f in &frames {
        assert_eq!(f.positions.len(), 30);
        assert!((f.lx - domain.lx).abs() < 1e-9);
        assert!((f.ly - domain.ly).abs() < 1e-9);
    }
    // Diameters are fixed for the whole run and survive the text round trip exactly.
    assert!(frames.iter().all(|f| f.diameters == sim.diameters()));

    let series = anisotropy_series(&frames, 1)?;
    assert_eq!(series.values.len(), 4);
    assert!(series.values.iter().all(|a| (0.0..=1.0 + 1e-12).contains(a)));

    classify_flow(BufReader::new(File::open(&paths.data)?))?;

    fs::remove_dir_all(&root)?;
    Ok(())
}

/// With trajectory output off no trajectory file is created.
#[test]
fn trajectory_file_only_when_enabled() -> Result<()> {
    let root = scratch_dir("notraj");
    let cfg = SimConfig {
        n: 10,
        phi: 0.5,
        delta: 0.0,
        total_step: 3,
        output_step: 1,
        trajectory: false,
        output_root: root.clone(),
        ..SimConfig::default()
    };
    let mut writer = RunWriter::create(&cfg)?;
    let mut sim = Simulation::new(cfg, &mut SeededUniform::from_seed(1))?;
    sim.run(&mut writer)?;
    let paths = writer.finish()?;
    assert!(paths.data.exists());
    assert!(!paths.trajectory.exists());
    assert_eq!(fs::read_to_string(&paths.data)?.lines().count(), 3);
    fs::remove_dir_all(&root)?;
    Ok(())
}
