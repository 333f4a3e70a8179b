#![forbid(unsafe_code)]

//! Command-line argument parsing for the demo.
//!
//! Parses args manually to keep the binary lean. Supports environment
//! variable overrides via the `TYPEAHEAD_DEMO_*` prefix.

use std::env;
use std::path::PathBuf;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const HELP_TEXT: &str = "\
Typeahead Demo: incremental search over a record list

USAGE:
    typeahead-demo [OPTIONS]

OPTIONS:
    --data=FILE          JSON array of records (default: built-in fruit list)
    --config=FILE        JSON widget config (propertiesToSearch, descriptorProperty,
                         searchResultsLimit)
    --property=NAME      Field to search; repeat for several (default: name)
    --descriptor=NAME    Field used for display text (default: name)
    --limit=N            Maximum results, 0 for unlimited (default: unlimited)
    --latency-ms=N       Simulate a slow backend: run searches on a thread
                         that sleeps N ms first (default: 0)
    --log=FILTER         JSON logs to stderr, e.g. 'typeahead_widgets=debug'
    --no-mouse           Disable mouse event capture
    --help, -h           Show this help message
    --version, -V        Show version

KEYBINDINGS:
    Up / Down            Move the highlight
    Enter / Tab          Commit the highlighted result
    Esc                  Close the list
    Ctrl+C               Quit and print the selections

ENVIRONMENT VARIABLES:
    TYPEAHEAD_DEMO_DATA         Override --data
    TYPEAHEAD_DEMO_LIMIT        Override --limit
    TYPEAHEAD_DEMO_LATENCY_MS   Override --latency-ms
    TYPEAHEAD_DEMO_LOG          Override --log";

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    /// Record file; `None` uses the built-in list.
    pub data: Option<PathBuf>,
    /// Widget config file.
    pub config: Option<PathBuf>,
    /// Fields to search. Empty keeps the configured default.
    pub properties: Vec<String>,
    /// Descriptor field override.
    pub descriptor: Option<String>,
    /// Result limit override.
    pub limit: Option<usize>,
    /// Simulated search latency in milliseconds (0 = synchronous).
    pub latency_ms: u64,
    /// JSON log filter; `None` disables logging.
    pub log: Option<String>,
    /// Whether mouse events are enabled.
    pub mouse: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            data: None,
            config: None,
            properties: Vec::new(),
            descriptor: None,
            limit: None,
            latency_ms: 0,
            log: None,
            mouse: true,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Run the demo.
    Run(Opts),
    /// Print help and exit.
    Help,
    /// Print the version and exit.
    Version,
}

impl Opts {
    /// Parse command-line arguments and environment variables, exiting on
    /// `--help`, `--version`, or invalid input.
    ///
    /// Environment variables take precedence over defaults but are overridden
    /// by explicit command-line flags.
    pub fn parse() -> Self {
        let env_vars = |name: &str| env::var(name).ok();
        match Self::parse_from(env::args().skip(1), env_vars) {
            Ok(Parsed::Run(opts)) => opts,
            Ok(Parsed::Help) => {
                println!("{HELP_TEXT}");
                process::exit(0);
            }
            Ok(Parsed::Version) => {
                println!("typeahead-demo {VERSION}");
                process::exit(0);
            }
            Err(msg) => {
                eprintln!("{msg}");
                eprintln!("Run with --help for usage information.");
                process::exit(1);
            }
        }
    }

    /// Parse from explicit sources.
    pub fn parse_from<I, E>(args: I, env_var: E) -> Result<Parsed, String>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Apply environment variable defaults first
        if let Some(val) = env_var("TYPEAHEAD_DEMO_DATA") {
            opts.data = Some(PathBuf::from(val));
        }
        if let Some(val) = env_var("TYPEAHEAD_DEMO_LIMIT")
            && let Ok(n) = val.parse()
        {
            opts.limit = Some(n);
        }
        if let Some(val) = env_var("TYPEAHEAD_DEMO_LATENCY_MS")
            && let Ok(n) = val.parse()
        {
            opts.latency_ms = n;
        }
        if let Some(val) = env_var("TYPEAHEAD_DEMO_LOG") {
            opts.log = Some(val);
        }

        // Parse command-line args (override env vars)
        for arg in args {
            match arg.as_str() {
                "--help" | "-h" => return Ok(Parsed::Help),
                "--version" | "-V" => return Ok(Parsed::Version),
                "--no-mouse" => opts.mouse = false,
                other => {
                    if let Some(val) = other.strip_prefix("--data=") {
                        opts.data = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--config=") {
                        opts.config = Some(PathBuf::from(val));
                    } else if let Some(val) = other.strip_prefix("--property=") {
                        opts.properties.push(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--descriptor=") {
                        opts.descriptor = Some(val.to_string());
                    } else if let Some(val) = other.strip_prefix("--limit=") {
                        let n = val
                            .parse()
                            .map_err(|_| format!("Invalid --limit value: {val}"))?;
                        opts.limit = Some(n);
                    } else if let Some(val) = other.strip_prefix("--latency-ms=") {
                        opts.latency_ms = val
                            .parse()
                            .map_err(|_| format!("Invalid --latency-ms value: {val}"))?;
                    } else if let Some(val) = other.strip_prefix("--log=") {
                        opts.log = Some(val.to_string());
                    } else {
                        return Err(format!("Unknown argument: {other}"));
                    }
                }
            }
        }

        Ok(Parsed::Run(opts))
    }
}
