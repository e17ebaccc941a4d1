//! CLI for generating tapered trench geometries.
//!
//! Builds a half-plane substrate, carves a (possibly tapered) trench out of
//! it, and writes the resulting surface as a legacy VTK line mesh.

use std::{fs, path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use log::info;
use trench_core::{parse_log_level, SceneConfig, Trench, TrenchError, DEFAULT_OUTPUT, R2};

#[derive(Parser, Debug)]
#[command(name = "trench")]
#[command(about = "Tapered trench geometry generator", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TRENCH_BUILD_SHA"), ")"))]
struct Cli {
    /// Trench depth [default: 50]
    #[arg(short, long)]
    depth: Option<f64>,

    /// Trench width at the top [default: 20]
    #[arg(short, long)]
    width: Option<f64>,

    /// Sidewall direction "dx,dy"; "1,0" gives vertical walls
    #[arg(short, long, value_parser = parse_pair, allow_hyphen_values = true)]
    taper_angle: R2<f64>,

    /// Top-center of the trench "x,y" [default: 0,0]
    #[arg(short, long, value_parser = parse_pair, allow_hyphen_values = true)]
    center: Option<R2<f64>>,

    /// Surface sampling resolution [default: 1]
    #[arg(short, long)]
    grid_delta: Option<f64>,

    /// Half-width of the simulation domain [default: 20]
    #[arg(short, long)]
    extent: Option<f64>,

    /// Output mesh file (legacy VTK)
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Base scene configuration (JSON); other flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    log_level: String,
}

/// Parse a comma-separated pair of reals, e.g. "1,0".
fn parse_pair(s: &str) -> Result<R2<f64>, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y] = parts.as_slice() else {
        return Err(format!("expected two comma-separated numbers, got {:?}", s));
    };
    let parse = |v: &str| v.parse::<f64>().map_err(|e| format!("{:?}: {}", v, e));
    Ok(R2::new(parse(*x)?, parse(*y)?))
}

/// Help and version requests succeed; every other parse failure is a usage error.
fn parse_exit_code(err: &clap::Error) -> u8 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
        _ => 1,
    }
}

fn scene_config(cli: &Cli) -> Result<SceneConfig, TrenchError> {
    let mut config = match &cli.config {
        Some(path) => SceneConfig::from_json(&fs::read_to_string(path)?)?,
        None => SceneConfig::default(),
    };
    if let Some(depth) = cli.depth {
        config.profile.depth = depth;
    }
    if let Some(width) = cli.width {
        config.profile.width = width;
    }
    if let Some(center) = cli.center {
        config.profile.center = center;
    }
    if let Some(grid_delta) = cli.grid_delta {
        config.grid_delta = grid_delta;
    }
    if let Some(extent) = cli.extent {
        config.extent = extent;
    }
    config.profile.taper_direction = cli.taper_angle;
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), TrenchError> {
    let config = scene_config(cli)?;
    info!("Scene configuration: {}", serde_json::to_string(&config)?);

    let mut trench = Trench::new();
    trench.set_config(config);
    trench.generate()?;
    trench.save(&cli.output)?;

    let area = trench.area()?;
    let mesh = trench.surface_mesh()?;
    println!(
        "Wrote {}: {} nodes, {} lines, substrate area {:.3}",
        cli.output.display(),
        mesh.nodes.len(),
        mesh.lines.len(),
        area,
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_exit_code(&err));
        }
    };

    match parse_log_level(Some(&cli.log_level)) {
        Ok(level) => env_logger::Builder::new().filter_level(level).parse_default_env().init(),
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(1);
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("trench").chain(args.iter().copied()))
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trench-cli-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_parse_pair() {
        assert_eq!(parse_pair("1,0").unwrap(), R2::new(1., 0.));
        assert_eq!(parse_pair(" 1.5 , -0.25 ").unwrap(), R2::new(1.5, -0.25));
        assert!(parse_pair("1").is_err());
        assert!(parse_pair("1,2,3").is_err());
        assert!(parse_pair("a,0").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["--taper-angle", "1,0"]).unwrap();
        assert_eq!(cli.output, PathBuf::from("trench.vtk"));
        assert_eq!(cli.log_level, "info");
        let config = scene_config(&cli).unwrap();
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn test_short_flags() {
        let cli = parse(&["-d", "30", "-w", "12", "-t", "1,0.1", "-c", "-2,0", "-g", "0.5", "-e", "25", "-o", "out.vtk"]).unwrap();
        let config = scene_config(&cli).unwrap();
        assert_eq!(config.profile.depth, 30.);
        assert_eq!(config.profile.width, 12.);
        assert_eq!(config.profile.taper_direction, R2::new(1., 0.1));
        assert_eq!(config.profile.center, R2::new(-2., 0.));
        assert_eq!(config.grid_delta, 0.5);
        assert_eq!(config.extent, 25.);
        assert_eq!(cli.output, PathBuf::from("out.vtk"));
    }

    #[test]
    fn test_missing_taper_angle() {
        let err = parse(&["--depth", "10"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert_eq!(parse_exit_code(&err), 1);
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse(&["-t", "1,0", "--compression", "3"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert_eq!(parse_exit_code(&err), 1);
    }

    #[test]
    fn test_invalid_values() {
        for args in [&["-t", "1"][..], &["-t", "x,y"], &["-t", "1,0", "-d", "deep"], &["-t", "1,0", "--log-level", "loud"]] {
            let err = parse(args).unwrap_err();
            assert_eq!(parse_exit_code(&err), 1, "{:?}", args);
        }
    }

    #[test]
    fn test_help_and_version() {
        let err = parse(&["--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse_exit_code(&err), 0);
        assert!(err.to_string().contains("--taper-angle"));

        let err = parse(&["--version"]).unwrap_err();
        assert_eq!(parse_exit_code(&err), 0);
    }

    #[test]
    fn test_config_file_overridden_by_flags() {
        let path = temp_path("config.json");
        fs::write(&path, r#"{"gridDelta": 2, "extent": 30, "profile": {"width": 8, "depth": 12}}"#).unwrap();
        let cli = parse(&["-t", "1,0", "--config", path.to_str().unwrap(), "--depth", "15"]).unwrap();
        let config = scene_config(&cli);
        fs::remove_file(&path).unwrap();
        let config = config.unwrap();
        assert_eq!(config.grid_delta, 2.);
        assert_eq!(config.extent, 30.);
        assert_eq!(config.profile.width, 8.);
        assert_eq!(config.profile.depth, 15.);
    }

    #[test]
    fn test_bad_config_file() {
        let path = temp_path("bad.json");
        fs::write(&path, "not json").unwrap();
        let cli = parse(&["-t", "1,0", "--config", path.to_str().unwrap()]).unwrap();
        let result = scene_config(&cli);
        fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(TrenchError::ConfigFile(_))));

        let cli = parse(&["-t", "1,0", "--config", temp_path("missing.json").to_str().unwrap()]).unwrap();
        assert!(matches!(scene_config(&cli), Err(TrenchError::Io(_))));
    }

    #[test]
    fn test_run_writes_mesh() {
        let output = temp_path("run.vtk");
        let cli = parse(&["-t", "1,0.1", "-g", "2", "-o", output.to_str().unwrap()]).unwrap();
        run(&cli).unwrap();
        let text = fs::read_to_string(&output).unwrap();
        fs::remove_file(&output).unwrap();
        assert!(text.starts_with("# vtk DataFile Version 2.0\n"));
        assert!(text.contains("DATASET POLYDATA\n"));
    }

    #[test]
    fn test_run_output_matches_library_save() {
        let output = temp_path("cli.vtk");
        let expected = temp_path("lib.vtk");
        let cli = parse(&["-t", "1,0", "-g", "5", "-o", output.to_str().unwrap()]).unwrap();
        run(&cli).unwrap();

        let mut trench = Trench::new();
        trench.set_grid_delta(5.);
        trench.generate().unwrap();
        trench.save(&expected).unwrap();

        let (cli_text, lib_text) = (fs::read_to_string(&output).unwrap(), fs::read_to_string(&expected).unwrap());
        fs::remove_file(&output).unwrap();
        fs::remove_file(&expected).unwrap();
        assert_eq!(cli_text, lib_text);
        assert!(cli_text.contains("LINES 28 84\n"));
    }

    #[test]
    fn test_run_rejects_fine_grid() {
        let output = temp_path("fine.vtk");
        let cli = parse(&["-t", "1,0", "-g", "1e-300", "-o", output.to_str().unwrap()]).unwrap();
        assert!(matches!(run(&cli), Err(TrenchError::InvalidConfig(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_run_rejects_invalid_profile() {
        let output = temp_path("invalid.vtk");
        let cli = parse(&["-t", "0,1", "-o", output.to_str().unwrap()]).unwrap();
        assert!(matches!(run(&cli), Err(TrenchError::InvalidProfile(_))));
        assert!(!output.exists());

        let cli = parse(&["-w", "10", "-d", "20", "-t", "1,0.5", "-o", output.to_str().unwrap()]).unwrap();
        assert!(matches!(run(&cli), Err(TrenchError::InvalidProfile(_))));
    }
}
