use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use roamscope_cli::{OutputFormat, commands};
use roamscope_core::ReportConfig;
use roamscope_core::config::{
    DEFAULT_FLOW_FILE, DEFAULT_HANDOVER_FILE, DEFAULT_OUTPUT_FILE, DEFAULT_RSSI_FILE,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roamscope")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Generate analysis reports for WiFi roaming network simulations",
    long_about = "Roamscope reads the RSSI, handover event and flow statistics tables of a \
                  WiFi roaming simulation, measures handover service interruptions and renders \
                  everything into a single static HTML report."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the HTML analysis report
    Report {
        /// RSSI measurements CSV
        #[arg(short, long, value_name = "FILE", env = "ROAMSCOPE_RSSI", default_value = DEFAULT_RSSI_FILE)]
        rssi: PathBuf,

        /// Handover events CSV
        #[arg(short = 'H', long, value_name = "FILE", env = "ROAMSCOPE_HANDOVER", default_value = DEFAULT_HANDOVER_FILE)]
        handover: PathBuf,

        /// Flow statistics CSV
        #[arg(short, long, value_name = "FILE", env = "ROAMSCOPE_FLOW", default_value = DEFAULT_FLOW_FILE)]
        flow: PathBuf,

        /// Output HTML file
        #[arg(short, long, value_name = "FILE", env = "ROAMSCOPE_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// ON duration of the traffic generator, in seconds
        #[arg(long, value_name = "SECS", default_value_t = 1.0)]
        on: f64,

        /// OFF duration of the traffic generator, in seconds
        #[arg(long, value_name = "SECS", default_value_t = 0.0)]
        off: f64,

        /// Roaming threshold drawn on RSSI charts
        #[arg(long, value_name = "DBM", default_value_t = -70.0, allow_hyphen_values = true)]
        threshold: f64,

        /// Number of stations in the RSSI evolution chart
        #[arg(long, value_name = "N", default_value_t = 5)]
        max_stations: usize,

        /// Fail instead of skipping the handover section on invalid events
        #[arg(long)]
        strict: bool,

        /// Open the report in a browser when done
        #[arg(short, long)]
        show: bool,
    },

    /// Extract handover interruptions from an event table
    Handovers {
        /// Handover events CSV
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// List every interruption
        #[arg(long)]
        interruptions: bool,
    },

    /// Display dataset statistics
    Stats {
        /// RSSI measurements CSV
        #[arg(short, long, value_name = "FILE")]
        rssi: Option<PathBuf>,

        /// Handover events CSV
        #[arg(short = 'H', long, value_name = "FILE")]
        handover: Option<PathBuf>,

        /// Flow statistics CSV
        #[arg(short, long, value_name = "FILE")]
        flow: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n    \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n    \
        bash:  roamscope completion --shell bash >> ~/.bashrc\n    \
        zsh:   roamscope completion --shell zsh > ~/.zfunc/_roamscope\n           \
        (add `fpath+=~/.zfunc` to ~/.zshrc)\n    \
        fish:  roamscope completion --shell fish > ~/.config/fish/completions/roamscope.fish")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    match cli.command {
        Commands::Report {
            rssi,
            handover,
            flow,
            output,
            on,
            off,
            threshold,
            max_stations,
            strict,
            show,
        } => {
            let config = ReportConfig {
                rssi_path: rssi,
                handover_path: handover,
                flow_path: flow,
                output_path: output,
                on_time: on,
                off_time: off,
                rssi_threshold_dbm: threshold,
                max_rssi_stations: max_stations,
                strict,
                ..Default::default()
            };
            commands::report::execute(config, show, cli.format)
        }
        Commands::Handovers {
            file,
            interruptions,
        } => commands::handovers::execute(&file, interruptions, cli.format),
        Commands::Stats {
            rssi,
            handover,
            flow,
        } => commands::stats::execute(
            rssi.as_deref(),
            handover.as_deref(),
            flow.as_deref(),
            cli.format,
        ),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("roamscope=debug,roamscope_cli=debug,roamscope_core=debug")
    } else {
        EnvFilter::new("roamscope=info,roamscope_cli=info,roamscope_core=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
