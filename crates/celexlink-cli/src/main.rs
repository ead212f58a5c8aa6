mod display;
mod pipeline;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use celexlink_core::{Annotator, EngineConfig, InstrumentType};
use celexlink_fetch::ConfigClient;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "celexlink", version, about = "Link informal EU legal citations to EUR-Lex")]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConfigArgs {
    /// CELEX lookup table (JSON object of "year/number" -> CELEX).
    #[arg(long, global = true, env = "CELEXLINK_LOOKUP")]
    lookup: Option<PathBuf>,

    /// Additional pattern rules (JSON array), run after the built-in rules.
    #[arg(long, global = true, env = "CELEXLINK_RULES")]
    rules: Option<PathBuf>,

    /// Fetch celex-map.json and patterns.json from this base URL instead of local files.
    #[arg(long, global = true, env = "CELEXLINK_CONFIG_URL")]
    config_url: Option<String>,

    /// Use only rules from --rules or --config-url.
    #[arg(long, global = true)]
    no_builtin_rules: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite documents, linking every recognised citation. Each line is a segment.
    Annotate {
        /// Input files; reads stdin when none are given.
        files: Vec<PathBuf>,
    },
    /// List recognised citations without rewriting.
    Scan {
        files: Vec<PathBuf>,

        /// Emit JSON instead of text cards.
        #[arg(long)]
        json: bool,
    },
    /// Resolve a single "year/number" reference to its EUR-Lex URL.
    Resolve {
        /// e.g. 2016/679, or 1049/2001 with --number-first.
        reference: String,

        /// Instrument type: R, L, D or Regulation, Directive, Decision.
        #[arg(long = "type", short = 't')]
        instrument: InstrumentType,

        /// Read the reference as number/year, as in "No 1049/2001".
        #[arg(long)]
        number_first: bool,
    },
    /// Show the effective rule set in precedence order.
    Rules,
}

async fn load_annotator(args: &ConfigArgs) -> anyhow::Result<Annotator> {
    let include_builtin = !args.no_builtin_rules;
    let config = match &args.config_url {
        Some(url) => {
            if args.lookup.is_some() || args.rules.is_some() {
                tracing::warn!("--config-url given; ignoring --lookup and --rules");
            }
            ConfigClient::new(url.clone())
                .fetch_config(include_builtin)
                .await
                .with_context(|| format!("fetching configuration from {url}"))?
        }
        None => EngineConfig::load(args.lookup.as_deref(), args.rules.as_deref(), include_builtin)
            .context("loading configuration")?,
    };
    Ok(config.into_annotator())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let annotator = load_annotator(&cli.config).await?;

    match cli.command {
        Command::Annotate { files } => {
            let inputs = pipeline::read_inputs(&files)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mut links = 0;
            for input in &inputs {
                links += pipeline::annotate_input(&annotator, input, &mut out)?.links;
            }
            out.flush().context("flushing stdout")?;
            tracing::info!(inputs = inputs.len(), links, "annotation complete");
        }
        Command::Scan { files, json } => {
            for input in pipeline::read_inputs(&files)? {
                let found = pipeline::scan_input(&annotator, &input);
                if json {
                    let citations: Vec<_> = found.iter().map(|(_, c)| c).collect();
                    println!("{}", serde_json::to_string_pretty(&citations)?);
                } else {
                    print!("{}", pipeline::render_scan(&input, &found));
                }
            }
        }
        Command::Resolve {
            reference,
            instrument,
            number_first,
        } => {
            let (left, right) = reference
                .split_once('/')
                .with_context(|| format!("expected YEAR/NUMBER, got {reference:?}"))?;
            let (year, number) = if number_first {
                (right.trim(), left.trim())
            } else {
                (left.trim(), right.trim())
            };
            let resolution = annotator
                .resolver()
                .resolve(year, number, Some(instrument))
                .with_context(|| format!("{reference:?} is not a numeric year/number pair"))?;
            println!("{}", resolution.url);
            eprint!("{}", display::ResolutionCard(&resolution));
        }
        Command::Rules => {
            print!("{}", display::RuleListing(annotator.rules()));
        }
    }

    Ok(())
}
