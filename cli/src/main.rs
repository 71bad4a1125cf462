// Copyright 2024 Viktor Reusch
//
// This file is part of shealth_gpx.
//
// shealth_gpx is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, either version 3 of the License, or (at your
// option) any later version.
//
// shealth_gpx is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or
// FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License
// for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with shealth_gpx. If not, see <https://www.gnu.org/licenses/>.

//! Command-line interface converting an unpacked Samsung Health export.
//!
//! Every exercise with location data is written as `<id>.gpx` into the
//! output directory.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use shealth_gpx::{batch, Converter, Error, Options, ZeroValues, MIN_RECORDS};
use tracing_subscriber::EnvFilter;

/// Exit code for an export without exercise directory.
const EXIT_MISSING_EXPORT: u8 = 3;
/// Exit code for a missing export root.
const EXIT_NOT_A_DIRECTORY: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "shealth-gpx")]
#[command(about = "Convert Samsung Health exercises to GPX tracks")]
#[command(version)]
struct Args {
    /// Unpacked export, i.e. the directory containing `jsons/`
    export_dir: PathBuf,

    /// Directory receiving the GPX files
    #[arg(short, long, default_value = "output", env = "SHEALTH_GPX_OUTPUT")]
    output: PathBuf,

    /// Minimum number of records for a track to be converted
    #[arg(long, default_value_t = MIN_RECORDS, env = "SHEALTH_GPX_MIN_RECORDS")]
    min_records: usize,

    /// Treat zero coordinates, altitudes and heart rates as valid values
    #[arg(long)]
    keep_zero_values: bool,

    /// Log every processed exercise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "shealth_gpx=debug"
    } else {
        "shealth_gpx=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = Options {
        min_records: args.min_records,
        zero_values: if args.keep_zero_values {
            ZeroValues::Keep
        } else {
            ZeroValues::Skip
        },
    };
    let converter = Converter::new(args.output, options);

    match batch::run(&args.export_dir, &converter) {
        Ok(summary) => {
            println!("Done");
            println!("{summary}");
            if summary.failed == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err @ Error::MissingExport(_)) => {
            eprintln!("Seems like the export is invalid: {err}");
            ExitCode::from(EXIT_MISSING_EXPORT)
        }
        Err(err) => {
            eprintln!("Conversion failed with: {err}");
            ExitCode::from(EXIT_NOT_A_DIRECTORY)
        }
    }
}
