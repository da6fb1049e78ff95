use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gzarray::{Config, Error};

/// Extract a gzip-compressed page from a C header array and re-embed an edited copy.
#[derive(Debug, Parser)]
#[command(version, about, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    convert: ConvertArgs,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract the page and, if an edited copy exists, recompress it (the default).
    Convert(ConvertArgs),
    /// Minify an HTML page with its inline CSS and JS.
    #[cfg(feature = "minify")]
    Minify {
        /// Page to minify.
        input: PathBuf,
        /// Output path [default: <INPUT stem>-min.html].
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// C header holding the compressed page.
    header: Option<PathBuf>,

    /// TOML file with the run settings; command line values take precedence.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Name of the byte array [default: index_ov2640_html_gz].
    #[arg(short, long)]
    name: Option<String>,

    /// Where to write the decompressed page [default: extracted_index.html].
    #[arg(long)]
    html_out: Option<PathBuf>,

    /// Edited page to recompress when present [default: modified_index.html].
    #[arg(long)]
    edited: Option<PathBuf>,

    /// Where to write the new C array [default: new_camera_index_array.h].
    #[arg(long)]
    array_out: Option<PathBuf>,

    /// File label for the `//File:` comment [default: index_ov2640.html.gz].
    #[arg(long)]
    label: Option<String>,
}

impl ConvertArgs {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut config = match (self.config, self.header) {
            (Some(path), header) => {
                let config = Config::from_toml_file(&path)?;
                match header {
                    Some(header) => config.header(header),
                    None => config,
                }
            }
            (None, Some(header)) => Config::new(header),
            (None, None) => bail!("no header given, pass HEADER or --config"),
        };

        if let Some(name) = self.name {
            config = config.array_name(name);
        }
        if let Some(path) = self.html_out {
            config = config.html_out(path);
        }
        if let Some(path) = self.edited {
            config = config.edited_html(path);
        }
        if let Some(path) = self.array_out {
            config = config.array_out(path);
        }
        if let Some(label) = self.label {
            config = config.label(label);
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Convert(args) => {
            let report = args.into_config()?.run()?;
            println!("{}", report.html_out.display());
            if let Some(array_out) = report.array_out {
                println!("{}", array_out.display());
            }
        }
        #[cfg(feature = "minify")]
        Command::Minify { input, output } => {
            let output = output.unwrap_or_else(|| gzarray::minify::default_output(&input));
            gzarray::minify::minify_file(&input, &output)
                .with_context(|| format!("failed to minify '{}'", input.display()))?;
            println!("{}", output.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let command = cli.command.unwrap_or(Command::Convert(cli.convert));
    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<Error>().map_or(1, Error::exit_code);
            ExitCode::from(code)
        }
    }
}
