// CSV/TSV table import/export

use std::io::Read;
use std::path::Path;

use storelink_linkage::{AnnotatedTable, RawTable};

/// Read a headed table, sniffing the delimiter unless one is given.
pub fn read_table(path: &Path, delimiter: Option<u8>) -> Result<RawTable, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    let table = import_from_string(&content, delimiter)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    log::info!(
        "read {} rows x {} columns from {} (delimiter {:?})",
        table.len(),
        table.headers().len(),
        path.display(),
        delimiter as char
    );
    Ok(table)
}

const SNIFF_CANDIDATES: [u8; 4] = [b'\t', b';', b',', b'|'];
const SNIFF_RECORDS: usize = 10;

/// Guess the field delimiter from the first few records of `content`.
///
/// Records are read with the real parser, so a quoted header that wraps onto
/// several lines still counts as one record. A candidate must split the header
/// into more than one field; among those, the one whose width repeats across
/// the most sampled records (weighted by width) wins. Falls back to `,`.
pub fn sniff_delimiter(content: &str) -> u8 {
    let mut best = (b',', 0usize);

    for delim in SNIFF_CANDIDATES {
        let widths = record_widths(content, delim);
        let Some(&header_width) = widths.first() else {
            continue;
        };
        if header_width < 2 {
            continue;
        }

        let agreeing = widths.iter().filter(|&&w| w == header_width).count();
        let score = agreeing * header_width;
        if score > best.1 {
            best = (delim, score);
        }
    }

    best.0
}

/// Field counts of the leading records when parsed with `delimiter`.
/// Stops at the first record the parser rejects.
fn record_widths(content: &str, delimiter: u8) -> Vec<usize> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect()
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file =
        std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            // Fall back to Windows-1252 (common for Excel-exported CSVs)
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            decoded.into_owned()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

/// Parse CSV text into a table. The first record is the header; every cell stays text.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<RawTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(result) => {
            let record = result.map_err(|e| e.to_string())?;
            record.iter().map(str::to_string).collect()
        }
        None => return Err("no header row".to_string()),
    };

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

/// Write the linkage output: registry columns plus the healthy flag.
pub fn write_annotated(path: &Path, table: &AnnotatedTable) -> Result<(), String> {
    write_rows(path, &table.output_headers(), table.output_rows())
}

/// Write a plain table back out, headers first.
pub fn write_table(path: &Path, table: &RawTable) -> Result<(), String> {
    write_rows(
        path,
        table.headers(),
        (0..table.len()).filter_map(|i| table.row_cells(i).map(|c| c.to_vec())),
    )
}

fn write_rows<I>(path: &Path, headers: &[String], rows: I) -> Result<(), String>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(|e| format!("{}: {}", path.display(), e))?;

    writer.write_record(headers).map_err(|e| e.to_string())?;
    let mut written = 0usize;
    for row in rows {
        writer.write_record(&row).map_err(|e| e.to_string())?;
        written += 1;
    }

    writer.flush().map_err(|e| e.to_string())?;
    log::info!("wrote {} rows to {}", written, path.display());
    Ok(())
}
