use crate::domain::product::ProductId;
use crate::domain::transaction::TransactionId;
use crate::error::VendingError;
use crate::interfaces::command::Command;
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;

/// Errors raised while turning a script row into a [`Command`].
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command '{command}'")]
    UnrecognizedCommand { line: usize, command: String },

    #[error("line {line}: {command} missing {field}")]
    MissingField {
        line: usize,
        command: String,
        field: &'static str,
    },

    #[error("line {line}: {source}")]
    Invalid { line: usize, source: VendingError },
}

#[derive(Debug, Deserialize)]
struct CommandRow {
    command: String,
    product: Option<ProductId>,
    tx: Option<TransactionId>,
    value: Option<String>,
}

/// A parsed command and the script line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub command: Command,
}

/// Reads machine commands from a CSV script with header `command, product, tx, value`.
///
/// Whitespace is trimmed and trailing empty columns may be omitted.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily parses the script; a bad row yields an error and reading continues.
    pub fn commands(self) -> impl Iterator<Item = Result<ScriptLine, ScriptError>> {
        self.reader
            .into_deserialize::<CommandRow>()
            .enumerate()
            .map(|(idx, result)| {
                let line = idx + 2; // 1-indexed, skip header
                let row = result.map_err(|source| ScriptError::Parse { line, source })?;
                let command = parse_row(line, row)?;
                Ok(ScriptLine { line, command })
            })
    }
}

fn parse_row(line: usize, row: CommandRow) -> Result<Command, ScriptError> {
    let missing = |field: &'static str| ScriptError::MissingField {
        line,
        command: row.command.clone(),
        field,
    };

    match row.command.as_str() {
        "create" => {
            let payment_type = row.value.clone().ok_or_else(|| missing("payment type"))?;
            Ok(Command::CreateTransaction { payment_type })
        }
        "cancel" => Ok(Command::CancelTransaction),
        "sell" => Ok(Command::Sell {
            product: row.product.ok_or_else(|| missing("product"))?,
            transaction: row.tx,
        }),
        "restock" => {
            let product = row.product.ok_or_else(|| missing("product"))?;
            let quantity = row
                .value
                .as_deref()
                .map(|raw| {
                    raw.parse::<u32>().map_err(|_| ScriptError::Invalid {
                        line,
                        source: VendingError::InvalidQuantity(raw.to_string()),
                    })
                })
                .transpose()?;
            Ok(Command::Restock { product, quantity })
        }
        "restock_all" => Ok(Command::RestockAll),
        "clear_funds" => Ok(Command::ClearFunds),
        other => Err(ScriptError::UnrecognizedCommand {
            line,
            command: other.to_string(),
        }),
    }
}
