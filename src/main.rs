use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use twt_gen::metainfo::{
    browser_link, magnet_link, Descriptor, TorrentBuilder, DEFAULT_PIECE_LENGTH,
};

const URL_SCHEMES: [&str; 3] = ["http", "https", "udp"];

/// Creates a torrent for a website or any set of files.
///
/// Put `index.html` at the root of the torrent so that it can be opened in a
/// browser.
#[derive(Parser, Debug)]
#[command(name = "twt-gen", version, about)]
struct Cli {
    /// Files or directories to include.
    #[arg(required = true, value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// Torrent file to write. Defaults to `<name>.torrent`.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name of the torrent. Derived from the inputs when not given.
    #[arg(long)]
    name: Option<String>,

    /// Tracker URLs. Without one the torrent can only be shared by magnet link.
    #[arg(long = "tracker", value_name = "URL", num_args = 1.., value_parser = parse_url)]
    trackers: Vec<String>,

    /// URLs serving the same files, used when no peers are available.
    #[arg(long = "webseed", value_name = "URL", num_args = 1.., value_parser = parse_url)]
    webseeds: Vec<String>,

    /// Free-form comment stored in the torrent.
    #[arg(long)]
    comment: Option<String>,

    /// Bytes per piece. Must be a power of two.
    #[arg(long, default_value_t = DEFAULT_PIECE_LENGTH, value_parser = parse_piece_length)]
    piece_length: u64,

    /// Include files whose names start with `.` or that are marked hidden.
    #[arg(long)]
    include_hidden_files: bool,

    /// Log every file as it is added and hashed.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_url(s: &str) -> Result<String, String> {
    let scheme = s
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .ok_or_else(|| format!("`{}` is not a URL", s))?;

    if URL_SCHEMES.contains(&scheme.as_str()) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "unsupported scheme `{}`, expected one of {}",
            scheme,
            URL_SCHEMES.join(", ")
        ))
    }
}

fn parse_piece_length(s: &str) -> Result<u64, String> {
    let n: u64 = s.parse().map_err(|e| format!("`{}`: {}", s, e))?;
    if n.is_power_of_two() {
        Ok(n)
    } else {
        Err(format!("{} is not a power of two", n))
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "twt_gen=debug" } else { "twt_gen=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Makes `path` absolute against the current directory, expanding a leading
/// `~` and folding `.` and `..` segments.
fn absolute(path: &Path, cwd: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };

    let mut out = PathBuf::new();
    for component in cwd.join(expanded).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn print_links(descriptor: &Descriptor) {
    println!("Info hash: {}", descriptor.info_hash());

    if descriptor.announce.is_some() {
        println!(
            "Magnet link (with tracker):    {}",
            magnet_link(descriptor, true)
        );
        println!(
            "Magnet link (without tracker): {}",
            magnet_link(descriptor, false)
        );
        println!(
            "Browser link (with tracker):    {}",
            browser_link(descriptor, true)
        );
        println!(
            "Browser link (without tracker): {}",
            browser_link(descriptor, false)
        );
    } else {
        println!("Magnet link:  {}", magnet_link(descriptor, false));
        println!("Browser link: {}", browser_link(descriptor, false));
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let cwd = env::current_dir().context("failed to read the current directory")?;
    let inputs: Vec<PathBuf> = cli.inputs.iter().map(|p| absolute(p, &cwd)).collect();

    let mut builder = TorrentBuilder::new()
        .add_paths(inputs)
        .piece_length(cli.piece_length)
        .include_hidden(cli.include_hidden_files);
    if let Some(name) = cli.name {
        builder = builder.name(name);
    }
    if let Some(comment) = cli.comment {
        builder = builder.comment(comment);
    }
    for url in cli.trackers {
        builder = builder.add_tracker(url);
    }
    for url in cli.webseeds {
        builder = builder.add_web_seed(url);
    }

    let descriptor = builder.build().context("failed to build torrent")?;

    if !descriptor.has_root_index() {
        warn!("No 'index.html' found in the root directory of the torrent");
    }

    let output = match cli.output {
        Some(path) => absolute(&path, &cwd),
        None => cwd.join(format!("{}.torrent", descriptor.info.name)),
    };
    fs::write(&output, descriptor.to_bytes())
        .with_context(|| format!("failed to write {}", output.display()))?;
    info!("Wrote {}", output.display());

    print_links(&descriptor);
    Ok(())
}
