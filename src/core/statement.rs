use crate::domain::model::StatementRow;
use crate::utils::error::Result;
use std::collections::HashMap;

/// Options for reading a delimited statement export.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    pub delimiter: u8,
    pub has_headers: bool,
    pub skip_rows: usize,
    pub max_records: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            skip_rows: 0,
            max_records: None,
        }
    }
}

/// Parses raw statement bytes into rows keyed by header (or 1-based
/// column position when there is no header row). Invalid UTF-8 is
/// replaced rather than rejected, since many banks export Latin-1.
pub fn read_rows(raw: &[u8], options: &ReadOptions) -> Result<Vec<StatementRow>> {
    let data = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
    let data = skip_lines(data, options.skip_rows);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers: Option<Vec<String>> = if options.has_headers {
        Some(
            reader
                .byte_headers()?
                .iter()
                .map(|h| String::from_utf8_lossy(h).trim().to_string())
                .collect(),
        )
    } else {
        None
    };

    let limit = options.max_records.unwrap_or(usize::MAX);
    let mut rows = Vec::new();

    for record in reader.byte_records() {
        if rows.len() >= limit {
            tracing::debug!("Reached max_records limit of {}", limit);
            break;
        }

        let record = record?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(rows.len() + 1)
            + options.skip_rows;

        let mut fields = HashMap::with_capacity(record.len());
        for (index, value) in record.iter().enumerate() {
            let key = match &headers {
                Some(names) => match names.get(index) {
                    Some(name) => name.clone(),
                    None => continue,
                },
                None => (index + 1).to_string(),
            };
            fields.insert(key, String::from_utf8_lossy(value).into_owned());
        }

        rows.push(StatementRow { line, fields });
    }

    Ok(rows)
}

fn skip_lines(data: &[u8], count: usize) -> &[u8] {
    let mut rest = data;
    for _ in 0..count {
        match rest.iter().position(|b| *b == b'\n') {
            Some(pos) => rest = &rest[pos + 1..],
            None => return &[],
        }
    }
    rest
}
