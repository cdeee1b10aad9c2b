use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use crate::container::{variable_name, Parser, Program};
use crate::text::{Detokenizer, Tokenizer};
use crate::tokens::TokenTable;
use crate::translator::{TranslateError, TranslateResult, TranslatorConfig};

/// The Translator is the main entry point for compiling and decompiling
#[derive(Clone, Debug)]
pub struct Translator {
    table: TokenTable,
    config: TranslatorConfig,
}

impl Translator {
    /// Create a new translator with default configuration
    pub fn new() -> TranslateResult<Self> {
        Self::with_config(TranslatorConfig::default())
    }

    /// Create a new translator with custom configuration
    pub fn with_config(config: TranslatorConfig) -> TranslateResult<Self> {
        let table = match &config.token_table {
            Some(path) => TokenTable::from_file(path)?,
            None => TokenTable::standard()?,
        };
        tracing::debug!(
            tokens = table.len(),
            longest = table.longest_mnemonic(),
            "token table loaded"
        );

        Ok(Self::with_table(table, config))
    }

    /// Create a translator over an already loaded table
    pub fn with_table(table: TokenTable, config: TranslatorConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &TokenTable {
        &self.table
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Compile source text into a program named after `output_name`
    pub fn compile_source<R: BufRead>(&self, reader: R, output_name: &str) -> TranslateResult<Program> {
        let stream = Tokenizer::new(&self.table).tokenize(reader)?;
        tracing::debug!(
            tokens = stream.len(),
            bytes = stream.byte_len(),
            "source tokenized"
        );

        let name = match &self.config.variable_name {
            Some(name) => variable_name(name),
            None => variable_name(output_name),
        };

        Ok(Program::new(name, &self.config.comment, stream.to_payload())?)
    }

    /// Compile a source file into a program file.
    ///
    /// The output is only created once the whole input has tokenized.
    pub fn compile_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> TranslateResult<Program> {
        let input = input.as_ref();
        let output = output.as_ref();

        let reader = open_input(input)?;
        let program = self.compile_source(reader, &output.to_string_lossy())?;
        write_output(output, |writer| program.write_to(writer))?;

        Ok(program)
    }

    /// Decode a program's payload back into source text
    pub fn decompile_program(&self, program: &Program) -> TranslateResult<Vec<u8>> {
        if self.config.verify_checksum {
            program.verify_checksum()?;
        }
        Ok(Detokenizer::new(&self.table).detokenize(&program.payload))
    }

    /// Decompile a program file into a source file
    pub fn decompile_file<P: AsRef<Path>, Q: AsRef<Path>>(&self, input: P, output: Q) -> TranslateResult<Program> {
        let input = input.as_ref();
        let output = output.as_ref();

        let mut reader = open_input(input)?;
        let program = Parser::parse(&mut reader)?;
        tracing::debug!(
            name = %program.entry.name_text(),
            comment = %program.header.comment_text(),
            bytes = program.payload.len(),
            "program loaded"
        );

        let text = self.decompile_program(&program)?;
        write_output(output, |writer| writer.write_all(&text))?;

        Ok(program)
    }
}

fn open_input(path: &Path) -> TranslateResult<BufReader<File>> {
    let file = File::open(path).map_err(|source| TranslateError::InputError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Create `path` and fill it through `write`, removing the file again if
/// anything fails part way
fn write_output<F>(path: &Path, write: F) -> TranslateResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let file = File::create(path).map_err(|source| TranslateError::OutputError {
        path: path.to_path_buf(),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    let result = write(&mut writer).and_then(|_| writer.flush());

    if let Err(source) = result {
        drop(writer);
        let _ = fs::remove_file(path);
        return Err(TranslateError::OutputError {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}
