use std::io::{self, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tibasic::{Translator, TranslatorConfig};
use tracing::Level;

/// Compile TI-BASIC source text into TI-83F program files and back
#[derive(Parser, Debug)]
#[command(name = "tibasic", version, about, long_about = None)]
pub struct Cli {
    /// Increase diagnostic output (-v: every matched token, -vv: decoding trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Token data file to use instead of the built-in table
    #[arg(long, value_name = "FILE", global = true)]
    pub tokens: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a source text file into a program file
    Compile {
        /// TI-BASIC source file
        input: PathBuf,

        /// Program file to write (its file name becomes the variable name)
        output: PathBuf,

        /// Header comment, at most 42 ASCII characters
        #[arg(long)]
        comment: Option<String>,

        /// Variable name to use instead of the one derived from the output path
        #[arg(long)]
        name: Option<String>,
    },

    /// Decompile a program file into source text
    Decompile {
        /// Program file
        input: PathBuf,

        /// Source file to write
        output: PathBuf,

        /// Fail when the stored checksum does not match the contents
        #[arg(long)]
        verify_checksum: bool,
    },

    /// List the active token table
    Tokens {
        /// Print the table in the token data file format
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Maximum log level selected by the verbosity flags
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

/// Send log output to stderr, leaving stdout for command output
pub fn init_tracing(level: Level) {
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}

pub struct CliHandler;

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle(&self, cli: Cli) -> Result<()> {
        let mut config = TranslatorConfig::new();
        if let Some(path) = &cli.tokens {
            config = config.with_token_table(path);
        }

        match cli.command {
            Commands::Compile {
                input,
                output,
                comment,
                name,
            } => {
                if let Some(comment) = comment {
                    config = config.with_comment(&comment);
                }
                if let Some(name) = name {
                    config = config.with_variable_name(&name);
                }
                let translator = self.translator(config)?;
                self.compile(&translator, &input, &output)
            }
            Commands::Decompile {
                input,
                output,
                verify_checksum,
            } => {
                let translator = self.translator(config.with_checksum_verification(verify_checksum))?;
                self.decompile(&translator, &input, &output)
            }
            Commands::Tokens { json } => {
                let translator = self.translator(config)?;
                self.list_tokens(&translator, json)
            }
        }
    }

    fn translator(&self, config: TranslatorConfig) -> Result<Translator> {
        Translator::with_config(config).context("Failed to load the token table")
    }

    fn compile(&self, translator: &Translator, input: &Path, output: &Path) -> Result<()> {
        let program = translator
            .compile_file(input, output)
            .with_context(|| format!("Failed to compile {}", input.display()))?;

        tracing::info!(
            "Compiled {} to {} (program {}, {} bytes)",
            input.display(),
            output.display(),
            program.entry.name_text(),
            program.payload.len()
        );
        Ok(())
    }

    fn decompile(&self, translator: &Translator, input: &Path, output: &Path) -> Result<()> {
        let program = translator
            .decompile_file(input, output)
            .with_context(|| format!("Failed to decompile {}", input.display()))?;

        tracing::info!(
            "Decompiled {} (program {}) to {}",
            input.display(),
            program.entry.name_text(),
            output.display()
        );
        Ok(())
    }

    fn list_tokens(&self, translator: &Translator, json: bool) -> Result<()> {
        let table = translator.table();
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if json {
            writeln!(out, "{}", table.to_json()?)?;
        } else {
            for token in table.iter() {
                writeln!(out, "{:<6} {}", token.code().to_string(), token.mnemonic.escape_debug())?;
            }
        }
        Ok(())
    }
}
