//! serialhub-loopback - push stdin through a SerialIo over the loopback provider
//!
//! Every input line is written to the stream (optionally split into several
//! chunks), then read back line by line and echoed to stdout. Handy for
//! checking stream settings from a config file without a browser attached.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serialhub::{logging, Config, EndOfStream, LoopbackProvider, SerialIo};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EosArg {
    Zero,
    None,
}

impl From<EosArg> for EndOfStream {
    fn from(arg: EosArg) -> Self {
        match arg {
            EosArg::Zero => EndOfStream::Zero,
            EosArg::None => EndOfStream::None,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "serialhub-loopback", version, about = "Echo stdin through a loopback SerialIo")]
struct Cli {
    /// Config file (defaults to the user config dir, if present).
    /// Only [stream] and [log] affect the loopback; [serial] and [request]
    /// are validated and logged at debug level.
    #[arg(long, env = "SERIALHUB_CONFIG")]
    config: Option<PathBuf>,

    /// End-of-stream convention, overriding the config file
    #[arg(long, value_enum)]
    eos: Option<EosArg>,

    /// Split each input line into chunks of this many bytes (0 = whole line)
    #[arg(long, default_value_t = 0)]
    chunk: usize,

    /// Print a JSON summary after the echoed output
    #[arg(long)]
    json: bool,

    /// Tracing filter, overriding the config file
    #[arg(long)]
    log: Option<String>,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    lines: u64,
    chunks: u64,
    bytes_written: u64,
    bytes_read: u64,
}

fn echo<R: BufRead, W: Write>(
    sio: &SerialIo<LoopbackProvider>,
    chunk: usize,
    mut input: R,
    mut output: W,
) -> Result<Summary> {
    let mut summary = Summary::default();
    let mut line = Vec::new();

    while input
        .read_until(b'\n', &mut line)
        .context("Failed to read input")?
        > 0
    {
        let pieces: Vec<&[u8]> = if chunk == 0 {
            vec![line.as_slice()]
        } else {
            line.chunks(chunk).collect()
        };
        for piece in pieces {
            if let Some(n) = sio.write(piece)? {
                summary.bytes_written += n as u64;
            }
            summary.chunks += 1;
        }

        while let Some(echoed) = sio.readline(None)? {
            if echoed.is_empty() {
                break;
            }
            output.write_all(&echoed).context("Failed to write output")?;
            summary.bytes_read += echoed.len() as u64;
            summary.lines += 1;
        }
        line.clear();
    }

    output.flush()?;
    Ok(summary)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default().context("Failed to load default config")?,
    };
    if let Some(eos) = cli.eos {
        config.stream.end_of_stream = eos.into();
    }

    let filter = cli.log.as_deref().unwrap_or(&config.log.filter);
    logging::init(filter)?;

    let siop = Rc::new(LoopbackProvider::new());
    let sio = SerialIo::with_config(Rc::clone(&siop), config.stream.clone());
    tracing::debug!("Stream ready: {:?}", sio);
    // Port settings only reach a browser through SerialHub; the loopback
    // ignores them, but the resolved values are still worth seeing.
    tracing::debug!(
        "Serial options (unused by loopback): {}",
        serde_json::to_string(&config.serial)?
    );
    tracing::debug!(
        "Request options (unused by loopback): {}",
        serde_json::to_string(&config.request)?
    );

    let stdout = io::stdout();
    let summary = echo(&sio, cli.chunk, io::stdin().lock(), stdout.lock())?;
    tracing::info!(
        "Echoed {} lines ({} bytes in {} chunks)",
        summary.lines,
        summary.bytes_read,
        summary.chunks
    );

    if cli.json {
        let mut out = stdout.lock();
        serde_json::to_writer(&mut out, &summary)?;
        writeln!(out)?;
    }

    Ok(())
}
