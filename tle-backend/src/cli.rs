use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::module::spacetrack::{ArchiveQuery, QueryError};
use crate::module::tle::DEFAULT_STEP_SECONDS;

#[derive(Debug, Parser)]
#[command(name = "tle-backend")]
#[command(version, about = "TLE ingestion from CelesTrak, Space-Track and local files", long_about = None)]
pub struct Cli {
    /// Configuration file; defaults are used when it does not exist
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run every configured source and write the outputs (default)
    Ingest,

    /// Classify the TLE sets found in a local text file
    Extract {
        file: PathBuf,

        /// Group name for the records (defaults to the file stem)
        #[arg(short, long)]
        group: Option<String>,

        /// Also print the propagation time grid (epoch to one period) per record
        #[arg(long)]
        schedule: bool,

        /// Step of the propagation grid in seconds
        #[arg(long, default_value_t = DEFAULT_STEP_SECONDS)]
        step_seconds: f64,
    },

    /// Print the Space-Track path a query would request
    Query(QueryArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryClass {
    Satcat,
    TleLatest,
    Decay,
    CdmPublic,
    Tle,
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[arg(value_enum)]
    pub class: QueryClass,

    /// Raw predicate appended verbatim
    #[arg(long = "where")]
    pub where_clause: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,

    /// `decay` epoch filter or `cdm_public` creation filter, e.g. "now-5 years"
    #[arg(long)]
    pub since: Option<String>,

    /// Required for `tle`
    #[arg(long)]
    pub norad_id: Option<u32>,

    #[arg(long)]
    pub epoch_start: Option<String>,

    #[arg(long)]
    pub epoch_end: Option<String>,

    #[arg(long)]
    pub ordinal: Option<i64>,

    /// `tle_latest` NORAD_CAT_ID filter, e.g. ">0" or "25544,58074"
    #[arg(long)]
    pub norad_filter: Option<String>,

    /// `tle` sort order, e.g. "EPOCH asc"
    #[arg(long)]
    pub orderby: Option<String>,
}

impl TryFrom<QueryArgs> for ArchiveQuery {
    type Error = QueryError;

    fn try_from(args: QueryArgs) -> Result<Self, Self::Error> {
        let query = match args.class {
            QueryClass::Satcat => ArchiveQuery::satcat(),
            QueryClass::TleLatest => {
                let mut query = ArchiveQuery::tle_latest();
                if let ArchiveQuery::TleLatest {
                    ordinal,
                    norad_filter,
                    ..
                } = &mut query
                {
                    if let Some(value) = args.ordinal {
                        *ordinal = value;
                    }
                    if let Some(filter) = args.norad_filter {
                        *norad_filter = filter;
                    }
                }
                query
            }
            QueryClass::Decay => match args.since {
                Some(since) => ArchiveQuery::decay(since),
                None => ArchiveQuery::decay("now-5 years"),
            },
            QueryClass::CdmPublic => match args.since {
                Some(since) => ArchiveQuery::cdm_public(since),
                None => ArchiveQuery::cdm_public("now-30 days"),
            },
            QueryClass::Tle => {
                let norad_id = args.norad_id.ok_or(QueryError::MissingField {
                    class: "tle",
                    field: "--norad-id",
                })?;
                let mut query =
                    ArchiveQuery::tle(norad_id).with_epoch_range(args.epoch_start, args.epoch_end);
                if let (ArchiveQuery::Tle { orderby, .. }, Some(value)) = (&mut query, args.orderby)
                {
                    *orderby = value;
                }
                query
            }
        };

        let query = match args.where_clause {
            Some(predicate) => query.with_where(predicate),
            None => query,
        };
        Ok(match args.limit {
            Some(limit) => query.with_limit(limit),
            None => query,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_from(args: &[&str]) -> Result<ArchiveQuery, QueryError> {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Some(Command::Query(args)) => ArchiveQuery::try_from(args),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_default_command_and_config() {
        let cli = Cli::try_parse_from(["tle-backend"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.toml"));

        let cli = Cli::try_parse_from(["tle-backend", "--config", "x.toml", "ingest"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Ingest)));
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn test_extract_args() {
        let cli = Cli::try_parse_from(["tle-backend", "extract", "sats.txt", "-g", "mine"]).unwrap();
        match cli.command {
            Some(Command::Extract {
                file,
                group,
                schedule,
                step_seconds,
            }) => {
                assert_eq!(file, PathBuf::from("sats.txt"));
                assert_eq!(group.as_deref(), Some("mine"));
                assert!(!schedule);
                assert_eq!(step_seconds, 100.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_query_decay() {
        let query = query_from(&["tle-backend", "query", "decay", "--since", "now-5 years"]).unwrap();
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/decay/DECAY/%3Enow-5%20years/format/json"
        );
    }

    #[test]
    fn test_query_tle_with_range_and_limit() {
        let query = query_from(&[
            "tle-backend",
            "query",
            "tle",
            "--norad-id",
            "58074",
            "--epoch-start",
            "2025-08-01",
            "--epoch-end",
            "2025-08-31",
            "--limit",
            "5",
        ])
        .unwrap();
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/tle/NORAD_CAT_ID/58074/EPOCH/2025-08-01--2025-08-31/orderby/EPOCH%20desc/limit/5/format/json"
        );
    }

    #[test]
    fn test_query_tle_requires_norad_id() {
        let err = query_from(&["tle-backend", "query", "tle"]).unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingField {
                class: "tle",
                field: "--norad-id"
            }
        );
    }

    #[test]
    fn test_query_class_names() {
        let query = query_from(&["tle-backend", "query", "cdm-public"]).unwrap();
        assert_eq!(query.class(), "cdm_public");
        let query = query_from(&["tle-backend", "query", "tle-latest", "--ordinal", "2"]).unwrap();
        assert!(query.path().contains("ORDINAL/2/"));
    }

    #[test]
    fn test_query_norad_filter_and_orderby() {
        let query = query_from(&[
            "tle-backend",
            "query",
            "tle-latest",
            "--norad-filter",
            "25544,58074",
        ])
        .unwrap();
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/tle_latest/ORDINAL/1/NORAD_CAT_ID/25544,58074/format/json"
        );

        let query = query_from(&[
            "tle-backend",
            "query",
            "tle",
            "--norad-id",
            "25544",
            "--orderby",
            "EPOCH asc",
        ])
        .unwrap();
        assert_eq!(
            query.path(),
            "/basicspacedata/query/class/tle/NORAD_CAT_ID/25544/orderby/EPOCH%20asc/format/json"
        );
    }
}
