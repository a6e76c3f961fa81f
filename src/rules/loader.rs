use crate::error::LookupError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column names the lookup table must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 3] = ["uuid", "name", "device_group"];

/// One security rule to query for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    pub uuid: String,
    pub name: String,
    pub device_group: String,
}

/// Load the lookup table at `path`.
///
/// Fails if the file is missing, lacks any of [`REQUIRED_COLUMNS`], has no
/// row with a non-empty uuid, or has a uuid that cannot name an export file.
pub fn load_rules(path: &Path) -> Result<Vec<RuleRow>, LookupError> {
    if !path.is_file() {
        return Err(LookupError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|e| LookupError::Csv {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    read_rules(file, path)
}

/// Parse a lookup table from any reader. `origin` is only used in errors.
pub fn read_rules<R: Read>(reader: R, origin: &Path) -> Result<Vec<RuleRow>, LookupError> {
    let csv_err = |source: csv::Error| LookupError::Csv {
        path: origin.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_err)?.clone();
    let position = |name: &str| headers.iter().position(|h| h == name);

    let (uuid_idx, name_idx, dg_idx) =
        match (position("uuid"), position("name"), position("device_group")) {
            (Some(u), Some(n), Some(d)) => (u, n, d),
            _ => {
                let missing = REQUIRED_COLUMNS
                    .iter()
                    .filter(|c| position(c).is_none())
                    .map(|c| (*c).to_string())
                    .collect();
                return Err(LookupError::MissingColumns(missing));
            }
        };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_err)?;
        let cell = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        let uuid = cell(uuid_idx);
        if uuid.is_empty() {
            continue;
        }
        if !usable_as_file_name(&uuid) {
            return Err(LookupError::UnusableUuid {
                line: record.position().map_or(0, |p| p.line()),
                uuid,
            });
        }
        rows.push(RuleRow {
            uuid,
            name: cell(name_idx),
            device_group: cell(dg_idx),
        });
    }

    if rows.is_empty() {
        return Err(LookupError::Empty(origin.to_path_buf()));
    }
    Ok(rows)
}

/// Uuids name a directory and files under `rawlogs/`.
fn usable_as_file_name(uuid: &str) -> bool {
    !matches!(uuid, "." | "..") && !uuid.contains(['/', '\\', '\0'])
}
