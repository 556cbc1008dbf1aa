pub mod commands;
pub mod options;

use clap::Parser;

use crate::domain::DEFAULT_LIMIT;

#[derive(Parser, Debug)]
#[command(name = "graytail")]
#[command(about = "Search and tail logs from Graylog", long_about = None)]
pub struct Cli {
    /// List Graylog streams and exit
    #[arg(long)]
    pub list_streams: bool,

    /// Search the 'application' field, e.g. -a send-email is the same as
    /// -q 'application:send-email'. ANDed with --query when both are given
    #[arg(short, long)]
    pub application: Option<String>,

    /// Query terms to search on (Elasticsearch syntax). Defaults to '*'
    #[arg(short, long)]
    pub query: Option<String>,

    /// Export the given fields ('field1,field2,...') as CSV into export.csv.
    /// Requires --start
    #[arg(short, long, value_name = "FIELDS")]
    pub export: Option<String>,

    /// Maximum number of messages to request
    #[arg(short, long, default_value_t = DEFAULT_LIMIT as i64, allow_negative_numbers = true)]
    pub limit: i64,

    /// Name(s) of the streams to show messages from, comma separated.
    /// Default: all streams
    #[arg(short, long)]
    pub stream: Option<String>,

    /// Keep polling for new messages. Requires a relative search
    #[arg(short, long)]
    pub tail: bool,

    /// Path to the config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Time range to search backwards from now, e.g. 30m, 2h, 4d, 1d12h
    #[arg(short, long, default_value = "2h")]
    pub range: String,

    /// Start of an absolute search, e.g. '1:32pm' or '2019-01-04 12:30:00'
    #[arg(long)]
    pub start: Option<String>,

    /// End of an absolute search. Defaults to now when --start is given
    #[arg(long)]
    pub end: Option<String>,

    /// Print each message as a JSON object of its fields, including the
    /// derived ones templates can use
    #[arg(short, long)]
    pub json: bool,

    /// Don't use colors in output
    #[arg(long = "no-colors")]
    pub no_colors: bool,
}
