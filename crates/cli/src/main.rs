use std::{
    fs,
    io::{Write, stderr, stdout},
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    },
    time::Instant,
};

use clap::{
    ArgAction, ArgGroup, Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::styling::{AnsiColor, Color, Style, Styles},
};
use mimalloc::MiMalloc;
use rayon::{ThreadPoolBuilder, prelude::*};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use jnrrd::{
    DataArray, DataLocation, Encoding, Header, WriteOptions, can_read_file, data::text::encode_ascii,
    read, read_header, write, write_detached,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const FILE_EXT: &str = "jnrrd";

const ANSI_RESET: &str = "\x1b[0m";
const ANSI_GREEN: &str = "\x1b[1;32m";
const ANSI_YELLOW: &str = "\x1b[1;33m";
const ANSI_RED: &str = "\x1b[1;31m";
const ANSI_BLUE: &str = "\x1b[1;34m";

const AFTER_HELP: &str = "
\x1b[1;33mQUICK REFERENCE\x1b[0m (full flags are in `jnrrd convert --help` / `jnrrd cat --help`)

\x1b[1;32mUSAGE:\x1b[0m
  \x1b[96mjnrrd convert\x1b[0m -i, --input-path PATH
                -o, --output-path DIR
                [--encoding raw|gzip|bzip2|zstd|lz4|ascii|hex] [--level N]
                [--detached] [--overwrite] [--cores N]

  \x1b[96mjnrrd cat\x1b[0m PATH [--full]

\x1b[1;32mOPTIONS:\x1b[0m
  \x1b[96m-h\x1b[0m, \x1b[96m--help\x1b[0m
  \x1b[96m-v\x1b[0m, \x1b[96m--version\x1b[0m

\x1b[1;32mENVIRONMENT:\x1b[0m
  \x1b[96mRUST_LOG\x1b[0m      log filter, default `jnrrd=info`

\x1b[1;32mEXAMPLES:\x1b[0m
  \x1b[96mjnrrd convert\x1b[0m -i data/raw -o data/gz --encoding gzip --level 9
  \x1b[96mjnrrd convert\x1b[0m -i data/raw -o data/split --detached --regex '^scan_\\d+'
  \x1b[96mjnrrd cat\x1b[0m data/gz/volume.jnrrd
";

fn cli_styles() -> Styles {
    Styles::styled().literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
}

#[derive(Parser)]
#[command(
    name = "jnrrd",
    version = VERSION,
    arg_required_else_help = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue, global = true)]
    version: bool,

    #[command(subcommand)]
    cmd: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    Convert(ConvertArgs),
    Cat(CatArgs),
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("pattern_mode")
        .args(["pattern", "pattern_exact", "regex"])
        .multiple(false)
))]
struct ConvertArgs {
    /// A .jnrrd file or a directory searched recursively
    #[arg(short = 'i', long = "input-path", required = true)]
    input_path: PathBuf,

    #[arg(short = 'o', long = "output-path", required = true)]
    output_path: PathBuf,

    /// Target payload encoding (default: keep each file's own)
    #[arg(long = "encoding", value_parser = parse_encoding)]
    encoding: Option<Encoding>,

    #[arg(long = "level", value_parser = clap::value_parser!(u32).range(0..=22))]
    compression_level: Option<u32>,

    /// Write the payload to a separate file next to the header
    #[arg(long, default_value_t = false, action = ArgAction::SetTrue)]
    detached: bool,

    #[arg(long, default_value_t = false, action = ArgAction::SetTrue)]
    overwrite: bool,

    #[arg(long = "pattern")]
    pattern: Option<String>,

    #[arg(long = "pattern-exact")]
    pattern_exact: Option<String>,

    #[arg(long = "regex")]
    regex: Option<String>,

    #[arg(
        long = "cores",
        default_value_t = 1u16,
        value_parser = clap::value_parser!(u16).range(1..=1024)
    )]
    cores: u16,
}

#[derive(Args)]
struct CatArgs {
    #[arg(value_name = "PATH")]
    file_path: PathBuf,

    /// Also decode and print the array values
    #[arg(long = "full", short = 'f', action = ArgAction::SetTrue, default_value_t = false)]
    full: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("jnrrd=info")),
        )
        .with_writer(stderr)
        .init();

    let mut cmd = Cli::command();
    cmd = cmd
        .styles(cli_styles())
        .color(ColorChoice::Auto)
        .after_help(AFTER_HELP);

    let matches = cmd.get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if cli.version {
        println!("{VERSION}");
        return Ok(());
    }

    match cli.cmd {
        Some(Cmd::Convert(cmd)) => convert(cmd).map_err(|e| e.into()),
        Some(Cmd::Cat(cmd)) => cat(cmd).map_err(|e| e.into()),
        None => Ok(()),
    }
}

fn parse_encoding(s: &str) -> Result<Encoding, String> {
    Encoding::from_name(s).map_err(|e| e.to_string())
}

#[derive(Serialize)]
struct ArraySummary {
    #[serde(rename = "type")]
    element_type: &'static str,
    endian: &'static str,
    sizes: Vec<usize>,
    elements: usize,
    bytes: usize,
    encoding: &'static str,
    detached: bool,
}

#[derive(Serialize)]
struct CatView<'a> {
    header: &'a Header,
    array: ArraySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<Vec<String>>,
}

fn summarize(header: &Header, path: &Path) -> Result<ArraySummary, String> {
    let descriptor = header.descriptor().map_err(|e| e.to_string())?;
    let encoding = header.encoding().map_err(|e| e.to_string())?;
    let detached = DataLocation::from_header(header, Some(path), 0)
        .map_err(|e| e.to_string())?
        .is_detached();
    Ok(ArraySummary {
        element_type: descriptor.element_type.name(),
        endian: descriptor.byte_order.name(),
        elements: descriptor.element_count(),
        bytes: descriptor.byte_len(),
        sizes: descriptor.sizes,
        encoding: encoding.name(),
        detached,
    })
}

fn array_values(array: &DataArray) -> Vec<String> {
    String::from_utf8_lossy(&encode_ascii(array.buffer()))
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn print_json_full<T: Serialize>(v: &T) -> Result<(), String> {
    let s = serde_json::to_string_pretty(v).map_err(|e| format!("json failed: {e}"))?;
    println!("{s}");
    Ok(())
}

fn cat(cmd: CatArgs) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("get current dir failed: {e}"))?;
    let file_path = resolve_user_path(&cwd, &cmd.file_path);

    let (header, values) = if cmd.full {
        let (header, array) = read(&file_path).map_err(|e| format!("read failed: {e}"))?;
        let values = array_values(&array);
        (header, Some(values))
    } else {
        let header = read_header(&file_path).map_err(|e| format!("read header failed: {e}"))?;
        (header, None)
    };

    let array = summarize(&header, &file_path)?;
    print_json_full(&CatView {
        header: &header,
        array,
        values,
    })
}

fn file_ext_lower(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// File name for a detached payload written next to `header_name`.
fn data_file_name(header_name: &str, encoding: Encoding) -> String {
    let stem = Path::new(header_name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    let suffix = match encoding {
        Encoding::Raw => "raw",
        Encoding::Gzip => "raw.gz",
        Encoding::Bzip2 => "raw.bz2",
        Encoding::Zstd => "raw.zst",
        Encoding::Lz4 => "raw.lz4",
        Encoding::Ascii => "txt",
        Encoding::Hex => "hex",
    };
    format!("{stem}.{suffix}")
}

type NameFilter = Box<dyn Fn(&str) -> bool + Send + Sync>;

fn build_name_filter(
    pattern: Option<&str>,
    pattern_exact: Option<&str>,
    regex: Option<&str>,
) -> Result<Option<NameFilter>, String> {
    if let Some(p) = pattern {
        let needle = p.to_lowercase();
        return Ok(Some(Box::new(move |name: &str| {
            name.to_lowercase().contains(&needle)
        })));
    }

    if let Some(p) = pattern_exact {
        let needle = p.to_string();
        return Ok(Some(Box::new(move |name: &str| name.contains(&needle))));
    }

    if let Some(r) = regex {
        let re = Regex::new(r).map_err(|e| format!("invalid regex: {e}"))?;
        return Ok(Some(Box::new(move |name: &str| re.is_match(name))));
    }

    Ok(None)
}

/// Every `.jnrrd` file under `input_root`, or `input_root` itself when it is
/// a file. Returns the files with the directory their relative paths start
/// from.
fn collect_inputs(
    input_root: &Path,
    name_filter: Option<&(dyn Fn(&str) -> bool + Send + Sync)>,
) -> Result<(PathBuf, Vec<PathBuf>), String> {
    let keep = |p: &Path| match name_filter {
        Some(f) => f(p.file_name().and_then(|s| s.to_str()).unwrap_or("")),
        None => true,
    };

    if input_root.is_file() {
        let base = input_root.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
        let files = if keep(input_root) {
            vec![input_root.to_path_buf()]
        } else {
            Vec::new()
        };
        return Ok((base, files));
    }

    let mut out = Vec::new();
    let mut stack = vec![input_root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| format!("read dir failed: {e}"))?;
        for entry in entries {
            let entry = entry.map_err(|e| format!("read dir entry failed: {e}"))?;
            let p = entry.path();
            if p.is_dir() {
                stack.push(p);
                continue;
            }
            if !p.is_file() || file_ext_lower(&p) != FILE_EXT {
                continue;
            }
            if keep(&p) {
                out.push(p);
            }
        }
    }

    out.sort();
    Ok((input_root.to_path_buf(), out))
}

/// Shared counters and the print lock for one `convert` run.
#[derive(Default)]
struct Progress {
    total: usize,
    print_lock: Mutex<()>,
    done: AtomicUsize,
    ok: AtomicU32,
    failed: AtomicU32,
    skipped: AtomicU32,
    rewrote_bad: AtomicU32,
    had_failed: AtomicBool,
}

impl Progress {
    fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    fn next(&self) -> usize {
        self.done.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn error(&self, path: &Path, msg: &str) {
        self.had_failed.store(true, Ordering::Relaxed);
        self.failed.fetch_add(1, Ordering::Relaxed);
        let n = self.next();
        let _g = self.print_lock.lock().unwrap_or_else(|e| e.into_inner());
        eprintln!(
            "{ANSI_RED}[error]{ANSI_RESET} [{}/{}] {}: {msg}",
            n,
            self.total,
            basename(path)
        );
        let _ = stderr().flush();
    }

    fn skip(&self, path: &Path) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
        let n = self.next();
        let _g = self.print_lock.lock().unwrap_or_else(|e| e.into_inner());
        println!(
            "{ANSI_YELLOW}[skip]{ANSI_RESET} [{}/{}] {}",
            n,
            self.total,
            basename(path)
        );
        let _ = stdout().flush();
    }

    fn ok(&self, out_path: &Path, rewrote_bad: bool, in_bytes: u64, out_bytes: u64, t0: Instant) {
        const MB: f64 = 1024.0 * 1024.0;

        self.ok.fetch_add(1, Ordering::Relaxed);
        if rewrote_bad {
            self.rewrote_bad.fetch_add(1, Ordering::Relaxed);
        }
        let n = self.next();

        let (tag, color) = if rewrote_bad {
            ("[rewrote]", ANSI_BLUE)
        } else {
            ("[ok]", ANSI_GREEN)
        };

        let _g = self.print_lock.lock().unwrap_or_else(|e| e.into_inner());
        println!(
            "{color}{tag}{ANSI_RESET} [{}/{}] output: {}  input={:.2} MB, output={:.2} MB, time={:.3}s",
            n,
            self.total,
            basename(out_path),
            in_bytes as f64 / MB,
            out_bytes as f64 / MB,
            t0.elapsed().as_secs_f64()
        );
        let _ = stdout().flush();
    }

    fn finish(&self, t_all: Instant) -> Result<(), String> {
        let ok = self.ok.load(Ordering::Relaxed);
        let failed = self.failed.load(Ordering::Relaxed);
        let skipped = self.skipped.load(Ordering::Relaxed);
        let rewrote_bad = self.rewrote_bad.load(Ordering::Relaxed);

        let total_secs = t_all.elapsed().as_secs();
        let h = total_secs / 3600;
        let m = (total_secs % 3600) / 60;
        let s = total_secs % 60;

        println!(
            "converted_ok={ok} converted_failed={failed} converted_skipped={skipped} rewrote_bad={rewrote_bad} total_time={:02}:{:02}:{:02}",
            h, m, s
        );

        if self.had_failed.load(Ordering::Relaxed) {
            return Err("some files failed".to_string());
        }
        Ok(())
    }
}

struct ConvertPlan {
    input_base: PathBuf,
    output_root: PathBuf,
    encoding: Option<Encoding>,
    compression_level: Option<u32>,
    detached: bool,
    overwrite: bool,
}

fn convert(cmd: ConvertArgs) -> Result<(), String> {
    let cwd = std::env::current_dir().map_err(|e| format!("get current dir failed: {e}"))?;

    let input_root = resolve_user_path(&cwd, &cmd.input_path);
    let output_root = resolve_user_path(&cwd, &cmd.output_path);

    fs::create_dir_all(&output_root).map_err(|e| format!("create output dir failed: {e}"))?;

    let filter = build_name_filter(
        cmd.pattern.as_deref(),
        cmd.pattern_exact.as_deref(),
        cmd.regex.as_deref(),
    )?;

    let cores = cmd.cores as usize;
    if cores == 0 {
        return Err("--cores must be >= 1".to_string());
    }
    let pool = ThreadPoolBuilder::new()
        .num_threads(cores)
        .build()
        .map_err(|e| format!("rayon thread pool init failed: {e}"))?;

    let (input_base, files) = collect_inputs(&input_root, filter.as_deref())?;
    if files.is_empty() {
        return Err(format!(
            "no matching .{FILE_EXT} files found under {}",
            input_root.display()
        ));
    }
    info!(files = files.len(), cores, "converting");

    let plan = ConvertPlan {
        input_base,
        output_root,
        encoding: cmd.encoding,
        compression_level: cmd.compression_level,
        detached: cmd.detached,
        overwrite: cmd.overwrite,
    };

    let t_all = Instant::now();
    let progress = Progress::new(files.len());

    pool.install(|| {
        files
            .par_iter()
            .for_each(|in_path| convert_one(&plan, &progress, in_path))
    });

    progress.finish(t_all)
}

fn convert_one(plan: &ConvertPlan, progress: &Progress, in_path: &Path) {
    let Ok(rel) = in_path.strip_prefix(&plan.input_base) else {
        progress.error(in_path, "cannot make relative path");
        return;
    };
    let out_path = plan.output_root.join(rel);
    let out_dir = out_path
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .to_path_buf();

    let mut rewrote_bad = false;
    if !plan.overwrite && out_path.is_file() {
        if can_read_file(&out_path) {
            progress.skip(&out_path);
            return;
        }
        rewrote_bad = true;
    }

    if let Err(e) = fs::create_dir_all(&out_dir) {
        progress.error(&out_dir, &format!("create output dir failed: {e}"));
        return;
    }

    let t0 = Instant::now();

    let (header, array) = match read(in_path) {
        Ok(v) => v,
        Err(e) => {
            progress.error(in_path, &format!("read failed: {e}"));
            return;
        }
    };

    let options = match write_options(plan, &header) {
        Ok(v) => v,
        Err(e) => {
            progress.error(in_path, &e);
            return;
        }
    };

    let written = if plan.detached {
        let name = basename(&out_path);
        let data_path = out_dir.join(data_file_name(&name, options.encoding));
        debug!(data = %data_path.display(), "detached payload");
        write_detached(&out_path, &data_path, &header, &array, &options)
            .map(|()| vec![out_path.clone(), data_path])
    } else {
        write(&out_path, &header, &array, &options).map(|()| vec![out_path.clone()])
    };

    match written {
        Ok(paths) => {
            let in_bytes = file_len(in_path);
            let out_bytes = paths.iter().map(|p| file_len(p)).sum();
            progress.ok(&out_path, rewrote_bad, in_bytes, out_bytes, t0);
        }
        Err(e) => progress.error(&out_path, &format!("write failed: {e}")),
    }
}

/// Keeps the source's encoding and byte order unless overridden.
fn write_options(plan: &ConvertPlan, header: &Header) -> Result<WriteOptions, String> {
    let encoding = match plan.encoding {
        Some(e) => e,
        None => header.encoding().map_err(|e| e.to_string())?,
    };
    let byte_order = header.byte_order().map_err(|e| e.to_string())?;
    let mut options = WriteOptions::new(encoding).with_byte_order(byte_order);
    if let Some(level) = plan.compression_level {
        options = options.with_level(level);
    }
    Ok(options)
}

fn resolve_user_path(cwd: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        cwd.join(p)
    }
}

#[inline]
fn file_len(p: &Path) -> u64 {
    fs::metadata(p).map(|m| m.len()).unwrap_or(0)
}

#[inline]
fn basename(p: &Path) -> std::borrow::Cow<'_, str> {
    p.file_name()
        .unwrap_or_else(|| p.as_os_str())
        .to_string_lossy()
}
