use std::{collections::HashMap, fmt, io};

use serde::{Deserialize, Serialize};

use crate::language_models::{TokenUsage, UsageMetadata};

use super::TableError;

/// Identifier of a hosted model variant, e.g.
/// `anthropic.claude-3-haiku-20240307-v1:0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(feature = "bedrock")]
impl From<crate::llm::BedrockModel> for ModelId {
    fn from(model: crate::llm::BedrockModel) -> Self {
        Self::new(model.as_str())
    }
}

/// Outcome of one (example, model) call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Cell {
    Response {
        text: String,
        usage: Option<TokenUsage>,
    },
    Failed {
        error: String,
    },
}

impl Cell {
    pub fn response<S: Into<String>>(text: S, usage: Option<TokenUsage>) -> Self {
        Cell::Response {
            text: text.into(),
            usage,
        }
    }

    pub fn failed<S: Into<String>>(error: S) -> Self {
        Cell::Failed {
            error: error.into(),
        }
    }

    /// The model's answer, if the call succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Response { text, .. } => Some(text),
            Cell::Failed { .. } => None,
        }
    }

    pub fn usage(&self) -> Option<&TokenUsage> {
        match self {
            Cell::Response { usage, .. } => usage.as_ref(),
            Cell::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Cell::Failed { .. })
    }

    /// Text shown to a reader: the answer, or the error marked as such.
    pub fn display_text(&self) -> String {
        match self {
            Cell::Response { text, .. } => text.clone(),
            Cell::Failed { error } => format!("ERROR: {}", error),
        }
    }
}

/// One example and every model's answer to it, keyed by model.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    example: String,
    cells: HashMap<ModelId, Cell>,
}

impl ResultRow {
    pub fn new<S: Into<String>>(example: S) -> Self {
        Self {
            example: example.into(),
            cells: HashMap::new(),
        }
    }

    /// Set the cell for `model`, returning the one it replaces.
    pub fn insert(&mut self, model: ModelId, cell: Cell) -> Option<Cell> {
        self.cells.insert(model, cell)
    }

    pub fn with_cell<M: Into<ModelId>>(mut self, model: M, cell: Cell) -> Self {
        self.insert(model.into(), cell);
        self
    }

    pub fn example(&self) -> &str {
        &self.example
    }

    pub fn cell(&self, model: &ModelId) -> Option<&Cell> {
        self.cells.get(model)
    }

    pub fn cells(&self) -> &HashMap<ModelId, Cell> {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Append-only comparison table: one row per example, one column per model.
///
/// The column list is fixed at construction. Every pushed row must hold
/// exactly one cell per column, so the table can never drift out of step with
/// the model list that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    columns: Vec<ModelId>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(columns: Vec<ModelId>) -> Result<Self, TableError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(TableError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn push_row(&mut self, row: ResultRow) -> Result<(), TableError> {
        let missing: Vec<ModelId> = self
            .columns
            .iter()
            .filter(|column| !row.cells.contains_key(*column))
            .cloned()
            .collect();
        let mut unexpected: Vec<ModelId> = row
            .cells
            .keys()
            .filter(|model| !self.columns.contains(*model))
            .cloned()
            .collect();
        if !missing.is_empty() || !unexpected.is_empty() {
            unexpected.sort();
            return Err(TableError::ColumnMismatch {
                example: row.example,
                missing,
                unexpected,
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[ModelId] {
        &self.columns
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, model: &ModelId) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.cell(model))
    }

    /// All cells for one model, in row order.
    pub fn column(&self, model: &ModelId) -> Option<Vec<&Cell>> {
        if !self.columns.contains(model) {
            return None;
        }
        Some(self.rows.iter().filter_map(|r| r.cell(model)).collect())
    }

    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(ResultRow::len).sum()
    }

    pub fn failures(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.cells.values())
            .filter(|c| c.is_failed())
            .count()
    }

    pub fn usage(&self) -> UsageMetadata {
        let mut usage = UsageMetadata::new();
        for row in &self.rows {
            for (model, cell) in &row.cells {
                if let Some(tokens) = cell.usage() {
                    usage.add_usage(model.as_str(), tokens);
                }
            }
        }
        usage
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();

        out.push_str("| Example |");
        for column in &self.columns {
            out.push_str(&format!(" {} |", escape_markdown(column.as_str())));
        }
        out.push('\n');

        out.push_str("| --- |");
        for _ in &self.columns {
            out.push_str(" --- |");
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&format!("| {} |", escape_markdown(&row.example)));
            for column in &self.columns {
                let text = row.cell(column).map(Cell::display_text).unwrap_or_default();
                out.push_str(&format!(" {} |", escape_markdown(&text)));
            }
            out.push('\n');
        }

        out
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), TableError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = vec!["example"];
        header.extend(self.columns.iter().map(ModelId::as_str));
        csv_writer.write_record(&header)?;

        for row in &self.rows {
            let mut record = vec![row.example.clone()];
            record.extend(
                self.columns
                    .iter()
                    .map(|column| row.cell(column).map(Cell::display_text).unwrap_or_default()),
            );
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markdown())
    }
}

fn escape_markdown(text: &str) -> String {
    text.trim()
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<ModelId> {
        vec![
            ModelId::from("anthropic.claude-3-haiku-20240307-v1:0"),
            ModelId::from("meta.llama3-8b-instruct-v1:0"),
        ]
    }

    fn full_row(example: &str) -> ResultRow {
        let [haiku, llama] = [models()[0].clone(), models()[1].clone()];
        ResultRow::new(example)
            .with_cell(haiku, Cell::response("Absolutely!", Some(TokenUsage::new(10, 2))))
            .with_cell(llama, Cell::failed("throttled"))
    }

    #[test]
    fn test_new_rejects_duplicate_columns() {
        let err = ResultTable::new(vec!["a".into(), "b".into(), "a".into()]).unwrap_err();
        assert!(matches!(err, TableError::DuplicateColumn(id) if id.as_str() == "a"));
    }

    #[test]
    fn test_push_row_requires_every_column() {
        let mut table = ResultTable::new(models()).unwrap();
        let partial = ResultRow::new("Paris?").with_cell(models()[0].clone(), Cell::response("Yes", None));

        match table.push_row(partial).unwrap_err() {
            TableError::ColumnMismatch {
                missing,
                unexpected,
                ..
            } => {
                assert_eq!(missing, vec![models()[1].clone()]);
                assert!(unexpected.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn test_push_row_rejects_unknown_models() {
        let mut table = ResultTable::new(models()).unwrap();
        let row = full_row("Paris?").with_cell("cohere.command-r-v1:0", Cell::response("Hi", None));
        assert!(matches!(
            table.push_row(row),
            Err(TableError::ColumnMismatch { unexpected, .. }) if unexpected.len() == 1
        ));
    }

    #[test]
    fn test_accessors() {
        let mut table = ResultTable::new(models()).unwrap();
        table.push_row(full_row("Paris?")).unwrap();
        table.push_row(full_row("Rome?")).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.cell_count(), 4);
        assert_eq!(table.failures(), 2);
        assert_eq!(table.rows()[1].example(), "Rome?");
        assert_eq!(table.cell(0, &models()[0]).and_then(Cell::text), Some("Absolutely!"));
        assert_eq!(table.column(&models()[1]).map(|c| c.len()), Some(2));
        assert!(table.column(&ModelId::from("unknown")).is_none());

        let usage = table.usage();
        assert_eq!(usage.get_total_usage(models()[0].as_str()).unwrap().total_tokens, 24);
        assert!(usage.get_total_usage(models()[1].as_str()).is_none());
    }

    #[test]
    fn test_markdown_rendering() {
        let mut table = ResultTable::new(models()).unwrap();
        table
            .push_row(
                ResultRow::new("Flights | hotels?")
                    .with_cell(models()[0].clone(), Cell::response("Line one\nLine two", None))
                    .with_cell(models()[1].clone(), Cell::failed("throttled")),
            )
            .unwrap();

        let markdown = table.to_markdown();
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(
            lines[0],
            "| Example | anthropic.claude-3-haiku-20240307-v1:0 | meta.llama3-8b-instruct-v1:0 |"
        );
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert_eq!(
            lines[2],
            "| Flights \\| hotels? | Line one<br>Line two | ERROR: throttled |"
        );
        assert_eq!(table.to_string(), markdown);
    }

    #[test]
    fn test_csv_export() {
        let mut table = ResultTable::new(models()).unwrap();
        table
            .push_row(
                ResultRow::new("Cheap, sunny places?")
                    .with_cell(models()[0].clone(), Cell::response("Absolutely!\nTry Malta.", None))
                    .with_cell(models()[1].clone(), Cell::response("Lisbon", None)),
            )
            .unwrap();

        let mut buffer = Vec::new();
        table.write_csv(&mut buffer).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "example");
        assert_eq!(&headers[2], "meta.llama3-8b-instruct-v1:0");

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][0], "Cheap, sunny places?");
        assert_eq!(&records[0][1], "Absolutely!\nTry Malta.");
    }

    #[test]
    fn test_cell_serde_is_tagged() {
        let json = serde_json::to_value(Cell::failed("boom")).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }
}
