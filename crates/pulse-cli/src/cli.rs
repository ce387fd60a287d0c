use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use pulse_core::feed::FeedSort;
use pulse_core::Urgency;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(about = "Post and browse geotagged island reports from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional JSON catalog replacing the built-in regions, settlements and terms
    #[arg(long, global = true, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Work without contacting the marker API
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List markers
    List {
        /// Only markers in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only markers inside this region
        #[arg(short, long)]
        region: Option<String>,
        /// Ordering of the list
        #[arg(long, value_enum, default_value_t = SortOrder::Recent)]
        sort: SortOrder,
        /// Number of markers to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Post a new marker
    #[command(alias = "new")]
    Add {
        /// Latitude of the report
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the report
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        /// Marker category
        #[arg(short, long)]
        category: String,
        /// How pressing the report is
        #[arg(short, long, value_enum, default_value_t = UrgencyArg::Normal)]
        urgency: UrgencyArg,
        /// Short title (derived from the description when omitted)
        #[arg(short, long)]
        title: Option<String>,
        /// Tag to attach (repeatable)
        #[arg(long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Hide your email on the post (allowed categories only)
        #[arg(long)]
        anonymous: bool,
        /// Description text
        description: Vec<String>,
    },
    /// Delete one of your markers
    Delete {
        /// Marker ID
        id: String,
    },
    /// List the configured regions
    Regions,
    /// Show which region a coordinate belongs to
    Resolve {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },
    /// Search region and settlement names
    Search {
        /// Search query
        query: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the place labels drawn at a zoom level
    Labels {
        /// Map zoom level
        #[arg(short, long)]
        zoom: f64,
    },
    /// Check text against the moderation list
    Moderate {
        /// Text to check
        text: Vec<String>,
    },
    /// Show feed counters
    Stats {
        /// Only markers inside this region
        #[arg(short, long)]
        region: Option<String>,
    },
    /// Export markers
    Export {
        /// Export format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,
        /// Only markers in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SortOrder {
    Recent,
    Urgency,
}

impl From<SortOrder> for FeedSort {
    fn from(value: SortOrder) -> Self {
        match value {
            SortOrder::Recent => Self::Recent,
            SortOrder::Urgency => Self::Urgency,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum UrgencyArg {
    Low,
    Normal,
    High,
    Critical,
}

impl From<UrgencyArg> for Urgency {
    fn from(value: UrgencyArg) -> Self {
        match value {
            UrgencyArg::Low => Self::Low,
            UrgencyArg::Normal => Self::Normal,
            UrgencyArg::High => Self::High,
            UrgencyArg::Critical => Self::Critical,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl From<ExportFormat> for pulse_core::export::ExportFormat {
    fn from(value: ExportFormat) -> Self {
        match value {
            ExportFormat::Json => Self::Json,
            ExportFormat::Markdown => Self::Markdown,
        }
    }
}
