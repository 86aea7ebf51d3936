use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Parser)]
#[command(name = "celestia")]
#[command(about = "Moon calendars and natal charts from remote ephemeris services")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Per-day lunar and solar data for one calendar month
    Moon {
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,

        /// Calendar month 1-12, defaults to the current month
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Natal chart for a name, birth date/time and birthplace
    Chart {
        #[arg(long, default_value = "")]
        name: String,

        /// Birth date, e.g. 1990-08-04 or 04.08.1990
        #[arg(long)]
        date: String,

        /// Local birth time HH:MM, defaults to 12:00
        #[arg(long)]
        time: Option<String>,

        #[arg(long)]
        city: String,

        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}
