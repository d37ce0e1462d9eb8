use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;

use env_logger::Env;

use foamflow::analysis::{anisotropy_series, classify_flow, read_frames, FlowState};
use foamflow::config::SimConfig;
use foamflow::core::Simulation;
use foamflow::error::{Error, Result};
use foamflow::output::RunWriter;

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("anisotropy") => run_anisotropy(&args[1..]),
        Some("classify") => run_classify(&args[1..]),
        Some("help" | "-h" | "--help") => {
            print_help();
            Ok(())
        }
        _ => run_simulation(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            if matches!(e, Error::Config(_)) {
                print_help();
            }
            ExitCode::FAILURE
        }
    }
}

fn run_simulation(args: &[String]) -> Result<()> {
    let cfg = SimConfig::from_args(args)?;
    let mut writer = RunWriter::create(&cfg)?;
    let mut sim = Simulation::from_config(cfg)?;
    sim.run(&mut writer)?;
    let paths = writer.finish()?;
    log::info!("measurements written to {}", paths.data.display());
    Ok(())
}

fn run_anisotropy(args: &[String]) -> Result<()> {
    let [path, lag] = args else {
        return Err(Error::Config(
            "usage: foamflow anisotropy <trajectory-file> <lag>".into(),
        ));
    };
    let lag: usize = lag
        .parse()
        .map_err(|_| Error::Config(format!("lag must be a positive integer, got {lag:?}")))?;
    let frames = read_frames(BufReader::new(File::open(path)?))?;
    let series = anisotropy_series(&frames, lag)?;
    for (k, a) in series.values.iter().enumerate() {
        println!("{}\t{}\t{a:.6}", frames[k].time, frames[k + lag].time);
    }
    println!("pairs={}", series.values.len());
    println!("mean_A={:.6}", series.mean);
    println!("std_A={:.6}", series.std_dev);
    Ok(())
}

fn run_classify(args: &[String]) -> Result<()> {
    if args.is_empty() {
        return Err(Error::Config(
            "usage: foamflow classify <data-file>...".into(),
        ));
    }
    let mut flowing = 0usize;
    for path in args {
        let state = classify_flow(BufReader::new(File::open(path)?))?;
        if state == FlowState::Flowing {
            flowing += 1;
        }
        println!("{path}\t{state:?}");
    }
    println!(
        "flowing={flowing}/{} ({:.1}%)",
        args.len(),
        100.0 * flowing as f64 / args.len() as f64
    );
    Ok(())
}

fn print_help() {
    println!("foamflow: driven soft-disk foam past a circular obstacle");
    println!();
    println!("USAGE:");
    println!("  foamflow -N <n> -phi <f> -delta <f> -gamma <f> -w <f> -sigm_obs <f> -K <f>");
    println!("           -fx_ext <f> -dt <f> -output_step <n> -total_step <n>");
    println!("           [-alpha 2.5] [-r_neighbor 3.0] [-run 0] [-trajectory 0|1]");
    println!("           [-seed <u64>] [-list_max 500] [-out <dir>]");
    println!("  foamflow anisotropy <trajectory-file> <lag>");
    println!("  foamflow classify <data-file>...");
    println!();
    println!("Set RUST_LOG=debug to see neighbor-list rebuilds.");
}
