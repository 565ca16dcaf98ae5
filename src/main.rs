use std::fs::File;
use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::Parser;
use memmap2::Mmap;

use freqrank::FreqRank;

/// Count whitespace-separated tokens and print the most frequent ones.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Number of top tokens to print
    #[arg(short = 'k', long, default_value_t = 10)]
    top: usize,

    /// Input file (memory-mapped); reads stdin when omitted
    file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let mut tracker: FreqRank<Vec<u8>> = FreqRank::new();

    match &args.file {
        Some(path) => {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            for token in mmap.split(|b| b.is_ascii_whitespace()) {
                if !token.is_empty() {
                    tracker.record(token.to_vec());
                }
            }
        }
        None => {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = line?;
                for token in line.split_whitespace() {
                    tracker.record(token.as_bytes().to_vec());
                }
            }
        }
    }

    for entry in tracker.top_entries(args.top) {
        println!("{} {}", String::from_utf8_lossy(&entry.key), entry.count);
    }

    Ok(())
}
