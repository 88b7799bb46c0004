use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, info, warn};

use super::manager::GlossaryManager;
use super::rule::{GlossaryRule, MatchType, RuleRecord};
use super::GlossaryError;

/// Column order used for export
pub const CSV_HEADER: [&str; 6] = [
    "trigger",
    "replacement",
    "match_type",
    "case_sensitive",
    "word_boundary",
    "description",
];

/// Column positions resolved from an import header
struct Columns {
    trigger: usize,
    replacement: usize,
    match_type: Option<usize>,
    case_sensitive: Option<usize>,
    word_boundary: Option<usize>,
    description: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Self, GlossaryError> {
        let find = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().eq_ignore_ascii_case(name))
        };

        Ok(Self {
            trigger: find("trigger").ok_or(GlossaryError::MissingColumn("trigger"))?,
            replacement: find("replacement").ok_or(GlossaryError::MissingColumn("replacement"))?,
            match_type: find("match_type"),
            case_sensitive: find("case_sensitive"),
            word_boundary: find("word_boundary"),
            description: find("description"),
        })
    }

    /// Builds a record from a row, `None` when trigger or replacement is blank
    fn record(&self, row: &StringRecord) -> Option<RuleRecord> {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let trigger = field(Some(self.trigger))?;
        let replacement = field(Some(self.replacement))?;

        let match_type = field(self.match_type).map_or(MatchType::default(), |value| {
            value.parse().unwrap_or_else(|_| {
                warn!(value = value, trigger = trigger, "unknown match type, using phrase");
                MatchType::default()
            })
        });

        Some(RuleRecord {
            trigger: trigger.to_owned(),
            replacement: replacement.to_owned(),
            match_type,
            case_sensitive: field(self.case_sensitive).is_some_and(parse_bool),
            word_boundary: field(self.word_boundary).map_or(true, parse_bool),
            description: field(self.description).map(str::to_owned),
        })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

impl GlossaryManager {
    /// Exports rules as CSV with a header row; empty when there are no rules
    pub fn export_csv(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        match self.write_csv() {
            Ok(csv) => csv,
            Err(e) => {
                warn!(error = %e, "could not export glossary CSV");
                String::new()
            }
        }
    }

    fn write_csv(&self) -> Result<String, GlossaryError> {
        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for rule in self.rules() {
            writer.write_record([
                rule.trigger(),
                rule.replacement(),
                rule.match_type().as_str(),
                if rule.case_sensitive() { "true" } else { "false" },
                if rule.word_boundary() { "true" } else { "false" },
                rule.description().unwrap_or(""),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| GlossaryError::Csv(e.into_error().into()))?;
        String::from_utf8(bytes).map_err(|_| GlossaryError::Encoding)
    }

    /// Imports CSV rows, upserting each rule
    ///
    /// Rows with a blank trigger or replacement are skipped. Missing optional
    /// columns take their defaults (`phrase`, case-insensitive, word
    /// boundaries on). Returns the number of rules imported.
    ///
    /// # Errors
    /// Returns [`GlossaryError`] if the CSV is malformed or lacks a trigger
    /// or replacement column. Nothing is imported in that case.
    pub fn import_csv(&mut self, text: &str) -> Result<usize, GlossaryError> {
        if text.trim().is_empty() {
            return Ok(0);
        }

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());
        let columns = Columns::from_header(reader.headers()?)?;

        let mut rules = Vec::new();
        for row in reader.records() {
            let row = row?;
            let Some(record) = columns.record(&row) else {
                let line = row.position().map(csv::Position::line);
                debug!(line = ?line, "skipping incomplete CSV row");
                continue;
            };
            if let Ok(rule) = GlossaryRule::from_record(record) {
                rules.push(rule);
            }
        }

        let imported = rules.len();
        for rule in rules {
            self.upsert(rule);
        }
        info!(imported = imported, total = self.len(), "glossary CSV imported");
        Ok(imported)
    }
}
