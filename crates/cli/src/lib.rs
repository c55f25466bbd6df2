// The verbosity stuff is cribbed from https://github.com/clap-rs/clap-verbosity-flag/blob/c621a6a8a7c0b6df8f1464a985a5d076b4915693/src/lib.rs and updated for tracing

#![deny(unused_crate_dependencies)]

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use geocore::{Client, Config, ResultType, SearchParams};
use geojson::FeatureCollection;
use std::{fs::File, io::Write, path::PathBuf};
use tracing::metadata::Level;
use tracing_subscriber::{
    EnvFilter, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// geocore: Search a geoCore metadata API and get GeoJSON back
#[derive(Debug, Parser)]
pub struct Geocore {
    #[command(subcommand)]
    command: Command,

    /// A JSON configuration file, e.g. `{"base_url": "https://geocore.example.com", "mapping": {"query": "geo", "get": "id"}}`.
    ///
    /// Values passed with `--base-url`, `--query-endpoint`, and
    /// `--get-endpoint` take precedence over the file.
    #[arg(long = "config", global = true, verbatim_doc_comment)]
    config: Option<PathBuf>,

    /// The base url of the geoCore API.
    #[arg(long = "base-url", env = "GEOCORE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// The search endpoint, relative to the base url (default: geo).
    #[arg(long = "query-endpoint", env = "GEOCORE_QUERY_ENDPOINT", global = true)]
    query_endpoint: Option<String>,

    /// The single-record endpoint, relative to the base url (default: id).
    #[arg(long = "get-endpoint", env = "GEOCORE_GET_ENDPOINT", global = true)]
    get_endpoint: Option<String>,

    /// Whether to print compact JSON output.
    ///
    /// By default, JSON output will printed "compact" if it is being output to a file, and printed "pretty" if it is being output to standard output.
    /// Use this argument to force one or the other.
    #[arg(short = 'c', long = "compact-json", global = true)]
    compact_json: Option<bool>,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = WarnLevel::verbose_help(),
        long_help = WarnLevel::verbose_long_help(),
    )]
    verbose: u8,

    #[arg(
        long,
        short = 'q',
        action = clap::ArgAction::Count,
        global = true,
        help = WarnLevel::quiet_help(),
        long_help = WarnLevel::quiet_long_help(),
        conflicts_with = "verbose",
    )]
    quiet: u8,
}

/// A geocore subcommand.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Searches the geoCore API.
    Search {
        /// The output file.
        ///
        /// To write to standard output, pass `-` or don't provide an argument at all.
        outfile: Option<String>,

        /// Requested bounding box, as a comma-delimited string (minx,miny,maxx,maxy).
        ///
        /// Without a bounding box, the search is keyword-only.
        #[arg(long = "bbox", allow_hyphen_values = true)]
        bbox: Option<String>,

        /// The first record to return, zero-based.
        #[arg(long = "start-index", default_value_t = 0)]
        start_index: u64,

        /// The number of records to return.
        #[arg(
            short = 'n',
            long = "limit",
            default_value_t = geocore::DEFAULT_LIMIT,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        limit: u64,

        /// Leave geometries out of the returned features.
        #[arg(long = "skip-geometry", default_value_t = false)]
        skip_geometry: bool,

        /// Return results or hits. Only results are supported by geoCore.
        #[arg(long = "result-type", default_value = "results")]
        result_type: ResultType,

        /// Full-text search term(s).
        ///
        /// geoCore has no full-text parameter, so this is currently ignored.
        #[arg(long = "text")]
        text: Option<String>,

        /// Single date+time, or a range ('/' separator).
        ///
        /// geoCore has no temporal parameter, so this is currently ignored.
        #[arg(long = "datetime")]
        datetime: Option<String>,
    },

    /// Gets a single record by its UUID.
    Get {
        /// The record identifier.
        identifier: String,

        /// The output file.
        ///
        /// To write to standard output, pass `-` or don't provide an argument at all.
        outfile: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, Default)]
struct WarnLevel;

impl Geocore {
    /// Runs this command.
    ///
    /// If `init_tracing_subscriber` is `false`, it is expected that the caller
    /// is setting up the appropriate logging.
    pub fn run(self, init_tracing_subscriber: bool) -> Result<()> {
        if init_tracing_subscriber {
            let filter = EnvFilter::builder()
                .with_default_directive(LevelFilter::from(self.log_level()).into())
                .from_env_lossy();
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
        let client = Client::new(self.config()?)?;
        match self.command {
            Command::Search {
                ref outfile,
                ref bbox,
                start_index,
                limit,
                skip_geometry,
                result_type,
                ref text,
                ref datetime,
            } => {
                let mut params = SearchParams::new()
                    .start_index(start_index)
                    .limit(limit)
                    .skip_geometry(skip_geometry)
                    .result_type(result_type);
                if let Some(bbox) = bbox {
                    params = params.bbox(parse_bbox(bbox)?);
                }
                params.free_text = text.clone();
                params.datetime = datetime.clone();
                let feature_collection = client.search(&params)?;
                self.put(outfile.as_deref(), &feature_collection)
            }
            Command::Get {
                ref identifier,
                ref outfile,
            } => {
                let feature_collection = client.get_by_id(identifier)?;
                self.put(outfile.as_deref(), &feature_collection)
            }
        }
    }

    /// Returns the configuration, from the config file (if any) and the command line.
    pub fn config(&self) -> Result<Config> {
        let mut config = if let Some(path) = &self.config {
            let file = File::open(path)
                .map_err(|err| anyhow!("could not open {}: {err}", path.display()))?;
            serde_json::from_reader(file)?
        } else {
            Config::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(query_endpoint) = &self.query_endpoint {
            config = config.query_endpoint(query_endpoint);
        }
        if let Some(get_endpoint) = &self.get_endpoint {
            config = config.get_endpoint(get_endpoint);
        }
        Ok(config)
    }

    fn put(&self, href: Option<&str>, feature_collection: &FeatureCollection) -> Result<()> {
        let href = href.and_then(|s| if s == "-" { None } else { Some(s) });
        let pretty = self.pretty(href);
        let mut bytes = if pretty {
            serde_json::to_vec_pretty(feature_collection)?
        } else {
            serde_json::to_vec(feature_collection)?
        };
        if let Some(href) = href {
            std::fs::write(href, bytes)?;
        } else {
            bytes.push(b'\n');
            std::io::stdout().write_all(&bytes)?;
        }
        Ok(())
    }

    /// Returns true if output to this href should be pretty-printed.
    pub fn pretty(&self, href: Option<&str>) -> bool {
        self.compact_json
            .map(|compact| !compact)
            .unwrap_or(href.is_none())
    }

    pub fn log_level(&self) -> Option<Level> {
        level_enum(self.verbosity())
    }

    fn verbosity(&self) -> i8 {
        level_value(WarnLevel::default()) - (self.quiet as i8) + (self.verbose as i8)
    }
}

impl WarnLevel {
    fn default() -> Option<Level> {
        Some(Level::WARN)
    }

    fn verbose_help() -> Option<&'static str> {
        Some("Increase verbosity")
    }

    fn verbose_long_help() -> Option<&'static str> {
        None
    }

    fn quiet_help() -> Option<&'static str> {
        Some("Decrease verbosity")
    }

    fn quiet_long_help() -> Option<&'static str> {
        None
    }
}

/// Parses a comma-delimited bounding box.
///
/// # Examples
///
/// ```
/// let bbox = geocore_cli::parse_bbox("-120,45,-110,50").unwrap();
/// assert_eq!(bbox, [-120.0, 45.0, -110.0, 50.0]);
/// ```
pub fn parse_bbox(s: &str) -> Result<[f64; 4]> {
    let values = s
        .split(',')
        .map(|value| value.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|err| anyhow!("invalid bbox {s}: {err}"))?;
    values
        .try_into()
        .map_err(|values: Vec<f64>| anyhow!("bbox must have four values, got {}", values.len()))
}

fn level_enum(verbosity: i8) -> Option<Level> {
    match verbosity {
        i8::MIN..=-1 => None,
        0 => Some(Level::ERROR),
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        4..=i8::MAX => Some(Level::TRACE),
    }
}

fn level_value(level: Option<Level>) -> i8 {
    match level {
        None => -1,
        Some(Level::ERROR) => 0,
        Some(Level::WARN) => 1,
        Some(Level::INFO) => 2,
        Some(Level::DEBUG) => 3,
        Some(Level::TRACE) => 4,
    }
}

#[cfg(test)]
use {assert_cmd as _, mockito as _, rstest as _, tempfile as _};
