use anyhow::{Context, Result};
use clap::Parser;
use huffman_codec::{EncodingTree, FrequencyTable, Stats};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

const EXTENSION: &str = "huf";

#[derive(Parser)]
pub struct Options {
    #[clap(flatten)]
    global: GlobalOptions,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser)]
pub struct GlobalOptions {
    /// Log debug output, unless RUST_LOG says otherwise.
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser)]
pub enum Command {
    Compress(CompressOptions),
    Decompress(DecompressOptions),
    Table(TableOptions),
}

pub trait Runnable {
    fn run(&self, global: &GlobalOptions) -> Result<()>;
}

#[derive(Parser)]
pub struct CompressOptions {
    /// Output file, defaults to the input with `.huf` appended.
    #[clap(short, long)]
    output: Option<PathBuf>,
    file: PathBuf,
}

impl Runnable for CompressOptions {
    fn run(&self, _global: &GlobalOptions) -> Result<()> {
        let output = self.output.clone().unwrap_or_else(|| {
            let mut name = self.file.clone().into_os_string();
            name.push(".");
            name.push(EXTENSION);
            name.into()
        });

        let input = open(&self.file)?;
        let writer = create(&output)?;
        let stats = huffman_codec::compress_stream(BufReader::new(input), BufWriter::new(writer))
            .with_context(|| format!("compressing {}", self.file.display()))?;
        report(&output, &stats);
        Ok(())
    }
}

#[derive(Parser)]
pub struct DecompressOptions {
    /// Output file, defaults to the input without `.huf`, or with `.out`
    /// appended.
    #[clap(short, long)]
    output: Option<PathBuf>,
    file: PathBuf,
}

impl Runnable for DecompressOptions {
    fn run(&self, _global: &GlobalOptions) -> Result<()> {
        let output = self.output.clone().unwrap_or_else(|| {
            if self.file.extension().is_some_and(|ext| ext == EXTENSION) {
                self.file.with_extension("")
            } else {
                let mut name = self.file.clone().into_os_string();
                name.push(".out");
                name.into()
            }
        });

        let input = open(&self.file)?;
        let writer = create(&output)?;
        let stats = huffman_codec::decompress_stream(BufReader::new(input), writer)
            .with_context(|| format!("decompressing {}", self.file.display()))?;
        report(&output, &stats);
        Ok(())
    }
}

#[derive(Parser)]
pub struct TableOptions {
    file: PathBuf,
}

impl Runnable for TableOptions {
    fn run(&self, _global: &GlobalOptions) -> Result<()> {
        let table = FrequencyTable::from_reader(BufReader::new(open(&self.file)?))?;
        let codes = EncodingTree::new(&table)?.code_table();
        for (symbol, count) in table.iter() {
            let code: String = codes
                .get(symbol)
                .map(|code| code.iter().map(|bit| if *bit { '1' } else { '0' }).collect())
                .unwrap_or_default();
            println!("{symbol:>6} {count:>12} {code}");
        }
        Ok(())
    }
}

impl Runnable for Command {
    fn run(&self, global: &GlobalOptions) -> Result<()> {
        match self {
            Command::Compress(command) => command.run(global),
            Command::Decompress(command) => command.run(global),
            Command::Table(command) => command.run(global),
        }
    }
}

impl Options {
    fn run(&self) -> Result<()> {
        self.command.run(&self.global)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("opening {}", path.display()))
}

fn create(path: &Path) -> Result<File> {
    File::create(path).with_context(|| format!("creating {}", path.display()))
}

fn report(output: &Path, stats: &Stats) {
    tracing::info!(
        output = %output.display(),
        original_len = stats.original_len,
        compressed_len = stats.compressed_len,
        symbols = stats.symbols,
        ratio = stats.ratio().unwrap_or_default(),
        "done"
    );
}

fn main() -> Result<()> {
    let options = Options::parse();

    let level = if options.global.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("huffman_codec={level}"))),
        )
        .init();

    options.run()
}
