//! Thin CLI layer over unbox-core: parse args, styled output, exit codes.
//! Exercises the same surface a server front end would: resolve, file,
//! metadata, and cache maintenance.

use clap::{crate_version, Arg, ArgAction, Command};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::io::{IsTerminal, Write};
use std::process::ExitCode;
use std::time::Duration;
use unbox_core::{parse_package_pathname, Cdn, Config, MetadataNode, UnboxError};

fn use_color() -> bool {
    std::io::stdout().is_terminal() && env::var("NO_COLOR").unwrap_or_default().is_empty()
}

fn info(msg: &str) {
    if use_color() {
        println!("{}", msg.cyan());
    } else {
        println!("{}", msg);
    }
}

fn error(msg: &str) {
    if use_color() {
        eprintln!("{}", msg.red());
    } else {
        eprintln!("{}", msg);
    }
}

fn dim(msg: &str) {
    if use_color() {
        println!("{}", msg.dimmed());
    } else {
        println!("{}", msg);
    }
}

/// Spinner on stderr while a package downloads; no-op when not a TTY.
fn spinner(message: String) -> Option<ProgressBar> {
    if !std::io::stderr().is_terminal() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⠈⠐⠠⠰⠸⠹")
            .template("{spinner:.dim} {msg}")
            .unwrap(),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(80));
    Some(pb)
}

fn cli() -> Command {
    Command::new("unbox")
        .version(crate_version!())
        .about("npm package CDN cache: resolve, fetch, and serve package files")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("resolve")
                .about("Resolve a package spec to a concrete published version")
                .arg(Arg::new("spec").required(true).help("name[@version-or-range]")),
        )
        .subcommand(
            Command::new("file")
                .about("Print a file out of a package, e.g. /react@18.2.0/umd/react.js")
                .arg(Arg::new("pathname").required(true))
                .arg(
                    Arg::new("raw")
                        .long("raw")
                        .action(ArgAction::SetTrue)
                        .help("Skip module resolution; require the literal path"),
                ),
        )
        .subcommand(
            Command::new("metadata")
                .about("Print file or directory metadata as JSON")
                .arg(Arg::new("pathname").required(true)),
        )
        .subcommand(
            Command::new("cache")
                .about("Inspect or clear the local package cache")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List cached package versions"))
                .subcommand(Command::new("size").about("Print total cached bytes"))
                .subcommand(Command::new("clear").about("Delete every cached package")),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    let result = match matches.subcommand() {
        Some(("resolve", sub)) => cmd_resolve(sub.get_one::<String>("spec").unwrap()),
        Some(("file", sub)) => cmd_file(
            sub.get_one::<String>("pathname").unwrap(),
            sub.get_flag("raw"),
        ),
        Some(("metadata", sub)) => cmd_metadata(sub.get_one::<String>("pathname").unwrap()),
        Some(("cache", sub)) => match sub.subcommand() {
            Some(("list", _)) => cmd_cache_list(),
            Some(("size", _)) => cmd_cache_size(),
            Some(("clear", _)) => cmd_cache_clear(),
            _ => unreachable!("subcommand required"),
        },
        _ => unreachable!("subcommand required"),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &UnboxError) {
    if err.is_not_found() {
        error(&format!("Not found: {}", err));
    } else if err.is_retryable() {
        error(&format!("Registry unavailable, try again: {}", err));
    } else {
        error(&format!("Error: {}", err));
    }
}

fn open_cdn() -> Result<Cdn, UnboxError> {
    Cdn::open(Config::from_env())
}

fn cmd_resolve(raw_spec: &str) -> Result<(), UnboxError> {
    let cdn = open_cdn()?;
    let manifest = cdn.resolve_manifest(raw_spec)?;
    println!("{}@{}", manifest.name, manifest.version);
    Ok(())
}

fn cmd_file(pathname: &str, raw: bool) -> Result<(), UnboxError> {
    let parsed = parse_package_pathname(pathname)?;
    let cdn = open_cdn()?;
    let manifest = cdn.resolve_manifest(&parsed.spec.to_string())?;

    let pb = spinner(format!("fetching {}@{}", manifest.name, manifest.version));
    let result = if raw {
        cdn.get_file(&manifest.name, &manifest.version, &parsed.filename)
    } else {
        cdn.resolve(&manifest.name, &manifest.version, &parsed.filename)
            .and_then(|stored| cdn.get_file(&manifest.name, &manifest.version, &stored))
    };
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let file = result?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&file.content)
        .and_then(|_| stdout.flush())
        .map_err(|e| UnboxError::io("write to stdout", e))
}

fn cmd_metadata(pathname: &str) -> Result<(), UnboxError> {
    let parsed = parse_package_pathname(pathname)?;
    let cdn = open_cdn()?;
    let manifest = cdn.resolve_manifest(&parsed.spec.to_string())?;

    let pb = spinner(format!("fetching {}@{}", manifest.name, manifest.version));
    let metadata = cdn.get_metadata(&manifest.name, &manifest.version, &parsed.filename);
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let metadata: MetadataNode = metadata?;

    println!(
        "{}",
        serde_json::to_string_pretty(&metadata).expect("metadata serializes")
    );
    Ok(())
}

fn cmd_cache_list() -> Result<(), UnboxError> {
    let cdn = open_cdn()?;
    let packages = cdn.list_cached();
    if packages.is_empty() {
        dim("cache is empty");
        return Ok(());
    }
    for package in packages {
        println!(
            "{}@{}  {}",
            package.name,
            package.version,
            human_bytes(package.bytes)
        );
    }
    Ok(())
}

fn cmd_cache_size() -> Result<(), UnboxError> {
    let cdn = open_cdn()?;
    println!("{}", human_bytes(cdn.cache_size_bytes()));
    Ok(())
}

fn cmd_cache_clear() -> Result<(), UnboxError> {
    let cdn = open_cdn()?;
    cdn.clear_cache()?;
    info("cache cleared");
    Ok(())
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
