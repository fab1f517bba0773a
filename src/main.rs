use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use goimpl::{GoEnv, Options};

const EXAMPLES: &str = "\
Examples:
  goimpl 'f *File' io.ReadWriteCloser
  goimpl 's *Store' golang.org/x/oauth2.TokenSource
  goimpl 't *Tree[K, V]' 'Container[K, V]'
  goimpl --dir ./server 'h handler' net/http.Handler";

/// Generate method stubs for implementing a Go interface
#[derive(Parser, Debug)]
#[command(name = "goimpl", version, about, long_about = None, after_help = EXAMPLES)]
struct Cli {
    /// Directory of the package the receiver lives in [default: current directory]
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Print only the stubs, without package clause and imports
    #[arg(long)]
    no_preamble: bool,

    /// Receiver, e.g. 'f *File' or 't *Tree[K, V any]'
    #[arg(value_name = "RECV")]
    recv: String,

    /// Interface: Name, pkg.Name or import/path.Name, optionally instantiated
    #[arg(value_name = "IFACE")]
    iface: String,
}

fn main() -> ExitCode {
    if let Ok(filter) = EnvFilter::try_from_env("GOIMPL_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    let dir = match cli.dir {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("goimpl: {e}");
                return ExitCode::FAILURE;
            }
        },
    };
    let opts = Options {
        dir,
        preamble: !cli.no_preamble,
        env: GoEnv::from_env(),
    };

    match goimpl::generate(&cli.recv, &cli.iface, &opts) {
        Ok(out) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(out.as_bytes()).and_then(|()| stdout.flush()) {
                eprintln!("goimpl: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("goimpl: {e}");
            if e.is_usage() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
