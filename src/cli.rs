use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the config file.
    /// Defaults to $MOVIEMATCH_CONFIG, then ./moviematch.yaml
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Address to listen on (overrides config)
        #[clap(short, long)]
        listen: Option<String>,

        /// Build or load the catalog in the background at startup
        #[clap(long, default_value = "false")]
        warm: bool,
    },

    /// Find the movies closest to a free-text query
    Search {
        /// The query text
        query: String,

        /// Number of results (overrides config)
        #[clap(short = 'n', long)]
        limit: Option<usize>,

        /// Print only titles and scores
        #[clap(short, long, default_value = "false")]
        brief: bool,
    },

    /// Build the enriched catalog and write the cache file
    Build {
        /// Delete the existing cache file and rebuild from the dataset
        #[clap(short, long, default_value = "false")]
        force: bool,
    },

    /// Show catalog cache status
    Status {},
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let args = Args::parse_from(["moviematch", "search", "cozy snow", "-n", "3", "--brief"]);
        match args.command {
            Command::Search {
                query,
                limit,
                brief,
            } => {
                assert_eq!(query, "cozy snow");
                assert_eq!(limit, Some(3));
                assert!(brief);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_config() {
        let args = Args::parse_from(["moviematch", "build", "--force", "-c", "/etc/mm.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("/etc/mm.yaml")));
        assert!(matches!(args.command, Command::Build { force: true }));
    }
}
