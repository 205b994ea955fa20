use std::mem;

/// One row of the country attribute table.
///
/// Columns keep their header order so merged property bags list them the
/// way the file does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryRecord {
    columns: Vec<(String, String)>,
}

impl CountryRecord {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            columns: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Value of a column. A header that appears twice resolves to its last
    /// occurrence.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .rev()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse tab-separated text whose first row is the header.
///
/// Short rows are padded with empty strings, extra fields are dropped and
/// blank lines are skipped. Fields may be double-quoted; a doubled quote
/// inside a quoted field is a literal quote.
pub fn parse_tsv(text: &str) -> Result<Vec<CountryRecord>, String> {
    let mut rows = split_rows(text, '\t')?.into_iter();
    let header = rows.next().ok_or_else(|| "missing header row".to_string())?;

    let records = rows
        .filter(|row| !(row.len() == 1 && row[0].is_empty()))
        .map(|row| {
            let mut fields = row.into_iter();
            CountryRecord::from_pairs(
                header
                    .iter()
                    .map(|name| (name.clone(), fields.next().unwrap_or_default())),
            )
        })
        .collect();

    Ok(records)
}

fn split_rows(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, String> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut at_field_start = true;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if at_field_start => {
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            field.push('"');
                        }
                        Some('"') => break,
                        Some(c) => field.push(c),
                        None => return Err("unterminated quoted field".to_string()),
                    }
                }
                at_field_start = false;
            }
            c if c == delimiter => {
                row.push(mem::take(&mut field));
                at_field_start = true;
            }
            // CRLF: the '\n' closes the row
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                row.push(mem::take(&mut field));
                rows.push(mem::take(&mut row));
                at_field_start = true;
            }
            c => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    if !at_field_start || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}
