//! `vlaforge-cli` – dataset assembly front end.
//!
//! One-shot commands over recorded episode trees:
//!
//! - `vlaforge build` – construct the dataset and print a summary report
//!   (human-readable, or JSON with `--json`).
//! - `vlaforge export` – construct the dataset, pick one item and dump its
//!   primary view as a PNG plus a PLY point cloud with a gripper marker, for
//!   eyeballing in an image/point-cloud viewer.
//!
//! Job options come from a TOML file (`--config job.toml`) or from flags;
//! flags win. Logging goes through `tracing` (`RUST_LOG`, default `info`);
//! set `VLAFORGE_LOG_FORMAT=json` for newline-delimited JSON logs.

mod job;

use std::path::PathBuf;

use colored::Colorize;
use vlaforge_dataset::{DatasetConfig, EpisodeDataset};
use vlaforge_export::image::save_image_from_array;
use vlaforge_export::ply::{MarkerOptions, save_pcd_with_gripper_ply};
use vlaforge_types::{CameraView, Sample, TrainingItem};

fn main() {
    // ── Structured logging ────────────────────────────────────────────────
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("VLAFORGE_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("build") => cmd_build(&args[1..]),
        Some("export") => cmd_export(&args[1..]),
        Some("help") | Some("--help") | Some("-h") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => Err(format!("unknown command '{other}'")),
    };

    if let Err(message) = result {
        eprintln!("{}: {}", "error".red().bold(), message);
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// build
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_build(args: &[String]) -> Result<(), String> {
    let (config, json) = parse_build_args(args)?;
    let dataset = EpisodeDataset::construct(config).map_err(|e| e.to_string())?;
    let summary = dataset.summary();

    if json {
        let rendered =
            serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?;
        println!("{rendered}");
        return Ok(());
    }

    print_banner();
    println!("  {} {}", "build".bold(), summary.id.to_string().dimmed());
    println!();
    println!("  Tasks            {}", summary.tasks.to_string().bold());
    println!(
        "  Episodes         {} loaded, {} skipped",
        summary.episodes_loaded.to_string().bold(),
        if summary.episodes_skipped > 0 {
            summary.episodes_skipped.to_string().yellow().bold()
        } else {
            "0".normal()
        }
    );
    if summary.pairs > 0 {
        println!("  Contrastive pairs {}", summary.pairs.to_string().bold());
        println!(
            "  Vocabulary       {} instruction(s)",
            summary.vocabulary_size.to_string().bold()
        );
    } else {
        println!("  Samples          {}", summary.samples.to_string().bold());
    }
    println!();
    println!("  {} dataset table materialized in memory", "✓".green().bold());
    Ok(())
}

fn parse_build_args(args: &[String]) -> Result<(DatasetConfig, bool), String> {
    let mut config: Option<DatasetConfig> = None;
    let mut root: Option<PathBuf> = None;
    let mut ep_per_task: Option<usize> = None;
    let mut contrastive = false;
    let mut arm_flag = false;
    let mut current_pose = false;
    let mut json = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = expect_value(&mut iter, "--config")?;
                config = Some(job::load(&PathBuf::from(path))?);
            }
            "--root" => root = Some(PathBuf::from(expect_value(&mut iter, "--root")?)),
            "--ep-per-task" => {
                let value = expect_value(&mut iter, "--ep-per-task")?;
                ep_per_task = Some(
                    value
                        .parse()
                        .map_err(|_| format!("--ep-per-task: '{value}' is not a count"))?,
                );
            }
            "--contrastive" => contrastive = true,
            "--arm-flag" => arm_flag = true,
            "--current-pose" => current_pose = true,
            "--json" => json = true,
            other => return Err(format!("unknown option '{other}' (see 'vlaforge help')")),
        }
    }

    let mut config = match (config, root.clone()) {
        (Some(cfg), _) => cfg,
        (None, Some(root)) => DatasetConfig::new(root),
        (None, None) => {
            return Err("either --config <job.toml> or --root <dir> is required".to_string());
        }
    };
    if let Some(root) = root {
        config.root = root;
    }
    if let Some(cap) = ep_per_task {
        config.ep_per_task = cap;
    }
    config.contrastive_pairs |= contrastive;
    config.output_arm_flag |= arm_flag;
    config.current_pose_input |= current_pose;
    Ok((config, json))
}

// ─────────────────────────────────────────────────────────────────────────────
// export
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_export(args: &[String]) -> Result<(), String> {
    let mut build_args = Vec::new();
    let mut index = 0usize;
    let mut out_dir = PathBuf::from(".");

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--index" | "-i" => {
                let value = expect_value(&mut iter, "--index")?;
                index = value
                    .parse()
                    .map_err(|_| format!("--index: '{value}' is not an index"))?;
            }
            "--out" | "-o" => out_dir = PathBuf::from(expect_value(&mut iter, "--out")?),
            "--config" | "-c" | "--root" | "--ep-per-task" => {
                build_args.push(arg.clone());
                build_args.push(expect_value(&mut iter, arg)?.clone());
            }
            "--contrastive" | "--arm-flag" | "--current-pose" => build_args.push(arg.clone()),
            other => return Err(format!("unknown option '{other}' (see 'vlaforge help')")),
        }
    }

    let (config, _) = parse_build_args(&build_args)?;
    let dataset = EpisodeDataset::construct(config).map_err(|e| e.to_string())?;
    let item = dataset
        .get(index)
        .ok_or_else(|| format!("index {index} out of range (dataset has {} items)", dataset.len()))?;
    let sample = match item {
        TrainingItem::Sample(s) => s,
        // A pair's two sides share their planes; export the positive.
        TrainingItem::Pair(p) => &p.positive,
    };

    std::fs::create_dir_all(&out_dir)
        .map_err(|e| format!("cannot create {}: {e}", out_dir.display()))?;
    let (png, ply) = export_sample(sample, &out_dir, index)?;
    println!("  {} wrote {}", "✓".green().bold(), png.display());
    println!("  {} wrote {}", "✓".green().bold(), ply.display());
    Ok(())
}

fn export_sample(
    sample: &Sample,
    out_dir: &std::path::Path,
    index: usize,
) -> Result<(PathBuf, PathBuf), String> {
    let view = sample
        .views
        .get(&CameraView::ThirdPerson)
        .ok_or_else(|| "item carries no third-person view".to_string())?;

    let png = out_dir.join(format!("sample_{index}.png"));
    save_image_from_array(&view.rgb, &png).map_err(|e| e.to_string())?;

    let gripper_xyz = [
        sample.gripper_pose[0],
        sample.gripper_pose[1],
        sample.gripper_pose[2],
    ];
    let ply = out_dir.join(format!("sample_{index}.ply"));
    save_pcd_with_gripper_ply(&view.pcd, &view.rgb, gripper_xyz, &ply, MarkerOptions::default())
        .map_err(|e| e.to_string())?;
    Ok((png, ply))
}

// ─────────────────────────────────────────────────────────────────────────────
// Usage & banner
// ─────────────────────────────────────────────────────────────────────────────

fn expect_value<'a>(
    iter: &mut std::slice::Iter<'a, String>,
    option: &str,
) -> Result<&'a String, String> {
    iter.next()
        .ok_or_else(|| format!("{option} expects a value"))
}

fn print_banner() {
    println!();
    println!("{}", r#"       __      ____                 "#.bold().cyan());
    println!("{}", r#" _  __/ /___ _/ _/__  _______ ____  "#.bold().cyan());
    println!("{}", r#"| |/ / / __ `/ _/ _ \/ __/ _ `/ -_) "#.bold().cyan());
    println!("{}", r#"|___/_/\__,_/_/ \___/_/  \_, /\__/  "#.bold().cyan());
    println!("{}", r#"                        /___/       "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "vlaforge".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Episode-to-sample assembly for VLA training");
    println!();
}

fn print_usage() {
    print_banner();
    println!("  {}", "USAGE".bold());
    println!("    vlaforge build  [--config job.toml] [--root DIR] [options] [--json]");
    println!("    vlaforge export [--config job.toml] [--root DIR] [options] --index N --out DIR");
    println!();
    println!("  {}", "OPTIONS".bold());
    println!("    --config, -c FILE   TOML job description");
    println!("    --root DIR          dataset root (overrides the job file)");
    println!("    --ep-per-task N     episode cap per task (default 10)");
    println!("    --contrastive       expand samples into positive/negative pairs");
    println!("    --arm-flag          attach the target record's arm flag");
    println!("    --current-pose      attach and describe the current gripper pose");
    println!("    --json              print the build summary as JSON");
    println!("    --index, -i N       item to export (export only)");
    println!("    --out, -o DIR       export output directory (export only)");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
