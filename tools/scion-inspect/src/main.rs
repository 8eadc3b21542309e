// Copyright 2025 Anapaya Systems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A tool to inspect raw SCION packets and control-plane segment responses.
//!
//! Packets are read from files holding the packet as hex string; whitespace is ignored.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use scion_proto::{
    packet::{parse_packet, reverse_packet, validate},
    path::SegmentsResponse,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Logging options
    #[command(flatten)]
    logging: LoggingOptions,
}

/// Logging options.
#[derive(Debug, Args)]
struct LoggingOptions {
    /// Log to stderr.
    #[arg(long, global = true)]
    stderr: bool,

    /// Directory for the log file.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Prints the headers of a packet.
    Decode {
        /// File holding the hex encoded packet.
        file: PathBuf,
    },
    /// Checks whether a packet is a valid SCION/UDP packet.
    Validate {
        /// File holding the hex encoded packet.
        file: PathBuf,
    },
    /// Prints the headers of the reply to a packet as hex.
    Reverse {
        /// File holding the hex encoded packet.
        file: PathBuf,
    },
    /// Prints the segments of an encoded segments response.
    Segments {
        /// File holding the binary protobuf response.
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guards = observability::setup_tracing(cli.logging.log_dir.as_ref(), cli.logging.stderr)
        .context("setting up logging")?;

    match cli.command {
        Commands::Decode { file } => run_decode(&file),
        Commands::Validate { file } => run_validate(&file),
        Commands::Reverse { file } => run_reverse(&file),
        Commands::Segments { file } => run_segments(&file),
    }
}

fn read_hex(file: &Path) -> anyhow::Result<Vec<u8>> {
    let content =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    let digits: String = content.split_whitespace().collect();
    let packet = hex::decode(digits).context("packet is not a valid hex string")?;
    tracing::debug!(file = %file.display(), length = packet.len(), "Read packet");
    Ok(packet)
}

fn run_decode(file: &Path) -> anyhow::Result<()> {
    let packet = read_hex(file)?;
    let parsed = parse_packet(&packet).context("decoding packet")?;
    println!("common:  {:?}", parsed.common);
    println!("address: {:?}", parsed.address);
    println!("path:    {:?}", parsed.path);
    println!("udp:     {} -> {}", parsed.source(), parsed.destination());
    println!("payload: {} bytes", parsed.payload(&packet).len());
    Ok(())
}

fn run_validate(file: &Path) -> anyhow::Result<()> {
    let packet = read_hex(file)?;
    match validate(&packet) {
        Ok(()) => println!("valid SCION/UDP packet, {} bytes", packet.len()),
        Err(e) => println!("{e}"),
    }
    Ok(())
}

fn run_reverse(file: &Path) -> anyhow::Result<()> {
    let mut packet = read_hex(file)?;
    validate(&packet).context("reversing packet")?;
    reverse_packet(&mut packet).context("reversing packet")?;
    println!("{}", hex::encode(&packet));
    Ok(())
}

fn run_segments(file: &Path) -> anyhow::Result<()> {
    let data = fs::read(file).with_context(|| format!("reading {}", file.display()))?;
    let response = SegmentsResponse::decode_proto(&data).context("decoding segments")?;
    println!("{response}");
    Ok(())
}
