use clap::{Parser, Subcommand, ValueEnum};
use pattern_bench::demos;
use pattern_bench::harness::{BenchConfig, Profile};
use pattern_bench::schema::{PatternBenchReport, RunMeta};
use pattern_bench::DemoVariant;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProfileArg {
    Quick,
    Full,
}

impl From<ProfileArg> for Profile {
    fn from(v: ProfileArg) -> Self {
        match v {
            ProfileArg::Quick => Profile::Quick,
            ProfileArg::Full => Profile::Full,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one demo family (or all of them).
    Demo {
        /// Which demo family to run.
        #[arg(long, value_enum, default_value_t = DemoVariant::All)]
        variant: DemoVariant,
    },

    /// Run every demo family back to back.
    Suite,
}

#[derive(Parser, Debug)]
#[command(name = "pattern-bench")]
#[command(about = "Design-pattern micro-benchmarks: human reports to stdout, optional JSON")]
struct Args {
    #[arg(long, value_enum, default_value_t = ProfileArg::Quick, global = true)]
    profile: ProfileArg,

    #[arg(long, default_value_t = 0, global = true)]
    seed: u64,

    /// Where to write the JSON report. If omitted, only the per-run
    /// human-readable reports are printed.
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

fn now_utc_rfc3339() -> String {
    // Avoid adding chrono dependency; this is "good enough" for filenames + reports.
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("unix:{secs}")
}

fn git_sha_short() -> Option<String> {
    // Best-effort: read from environment set by CI/build scripts.
    std::env::var("GIT_SHA")
        .ok()
        .or_else(|| std::env::var("GITHUB_SHA").ok())
        .map(|s| s.chars().take(12).collect())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    let args = Args::parse();
    let cfg = BenchConfig {
        profile: args.profile.into(),
        seed: args.seed,
    };

    let measurements = match &args.cmd {
        Command::Demo { variant } => demos::run_variant(&cfg, *variant).await?,
        Command::Suite => demos::run_variant(&cfg, DemoVariant::All).await?,
    };

    if let Some(out) = args.out {
        let report = PatternBenchReport {
            run: RunMeta {
                schema_version: 1,
                bench_version: env!("CARGO_PKG_VERSION").to_string(),
                profile: cfg.profile.as_str().to_string(),
                seed: cfg.seed,
                timestamp_utc: now_utc_rfc3339(),
                git_sha: git_sha_short(),
            },
            measurements,
        };
        let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        fs::write(&out, json)?;
        eprintln!("JSON report: {}", out.display());
    }

    Ok(())
}
