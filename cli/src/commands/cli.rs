use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "stepwise", version, about = "Normalize and execute step plans")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.stepwise/config.toml or ./stepwise.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

/// Where a plan comes from and how it is normalized.
#[derive(ClapArgs, Debug, Clone)]
pub struct PlanSourceArgs {
    /// Plan file to read, or `-` for stdin. Fenced ```json blocks are accepted.
    #[arg(long, default_value = "-")]
    pub plan: String,

    /// Project root for ignore files and convention detection.
    #[arg(long)]
    pub root: Option<String>,

    /// Convention preset to enforce (react, nextjs-app, rust, python).
    #[arg(long)]
    pub convention: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub source: PlanSourceArgs,

    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub plan: PlanSourceArgs,

    /// Overrides `[scheduler] max_concurrency`; 0 means one per CPU.
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Run tasks in sequential batches of this size.
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Show progress bars on stderr.
    #[arg(long, default_value_t = false)]
    pub progress: bool,

    /// Restrict text output to ASCII.
    #[arg(long, default_value_t = false)]
    pub ascii: bool,

    /// Simulated work time per step, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub step_delay_ms: u64,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckArgs {
    /// Paths to check, as they would appear in a plan step.
    #[arg(required = true)]
    pub paths: Vec<String>,

    #[arg(long)]
    pub root: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate and consolidate a plan, then print the canonical form.
    Normalize(NormalizeArgs),
    /// Normalize a plan and execute its steps through the scheduler.
    Run(RunArgs),
    /// Report whether paths are safe and whether they would be ignored.
    Check(CheckArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_accepts_plan_and_scheduler_flags() {
        let args = Args::parse_from([
            "stepwise",
            "run",
            "--plan",
            "plan.json",
            "--max-concurrency",
            "3",
            "--format",
            "jsonl",
            "--batch-size",
            "10",
        ]);
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.plan.plan, "plan.json");
                assert_eq!(run.max_concurrency, Some(3));
                assert_eq!(run.format, OutputFormat::Jsonl);
                assert_eq!(run.batch_size, Some(10));
                assert!(!run.progress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let args = Args::parse_from(["stepwise", "check", "src/lib.rs", "--config", "x.toml"]);
        assert_eq!(args.config.as_deref(), Some("x.toml"));
    }

    #[test]
    fn normalize_defaults_to_stdin() {
        let args = Args::parse_from(["stepwise", "normalize"]);
        match args.command {
            Commands::Normalize(n) => {
                assert_eq!(n.source.plan, "-");
                assert!(!n.pretty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn pretty_is_only_accepted_by_normalize() {
        assert!(Args::try_parse_from(["stepwise", "normalize", "--pretty"]).is_ok());
        assert!(Args::try_parse_from(["stepwise", "run", "--pretty"]).is_err());
    }
}
