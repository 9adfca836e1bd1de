use crate::error::LoadError;
use crate::models::{ResultSet, Row, Value};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Load a result set from `.csv` (header row required) or `.json`.
///
/// JSON input is either an array of row objects or an object with a `rows`
/// array, as query engines commonly return.
pub fn load_result_set<P: AsRef<Path>>(path: P) -> Result<ResultSet> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let results = match ext.as_str() {
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string()).into()),
    };
    if results.rows.is_empty() {
        return Err(LoadError::EmptyInput(path.to_path_buf()).into());
    }
    log::debug!(
        "loaded {} rows, {} columns from {}",
        results.rows.len(),
        results.columns.len(),
        path.display()
    );
    Ok(results)
}

fn read_csv(path: &Path) -> Result<ResultSet> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let names: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading header of {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{} record {}", path.display(), line + 1))?;
        let row: Row = names
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| (name.clone(), Value::parse_cell(cell)))
            .collect();
        rows.push(row);
    }
    Ok(ResultSet::new(names, rows))
}

fn read_json(path: &Path) -> Result<ResultSet> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let doc: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let items = match &doc {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(obj) => match obj.get("rows") {
            Some(serde_json::Value::Array(items)) => items,
            _ => anyhow::bail!("{}: expected an array of rows", path.display()),
        },
        _ => anyhow::bail!("{}: expected an array of rows", path.display()),
    };
    let objects: Vec<serde_json::Map<String, serde_json::Value>> = items
        .iter()
        .filter_map(|v| v.as_object().cloned())
        .collect();
    Ok(ResultSet::from_json_objects(&objects))
}

/// Cells starting with a formula trigger get a leading quote so spreadsheets
/// open them as text.
fn sanitize_cell(s: &str) -> String {
    match s.chars().next() {
        Some('=' | '+' | '-' | '@') if s.parse::<f64>().is_err() => format!("'{s}"),
        _ => s.to_string(),
    }
}

/// Save a result set as CSV with header, optionally with an extra per-row column
/// (for example the assigned color).
pub fn save_csv<P: AsRef<Path>>(
    results: &ResultSet,
    extra: Option<(&str, &[String])>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut header: Vec<&str> = results.columns.iter().map(|c| c.name.as_str()).collect();
    if let Some((name, _)) = extra {
        header.push(name);
    }
    wtr.write_record(&header)?;
    for (i, row) in results.rows.iter().enumerate() {
        let mut record: Vec<String> = results
            .columns
            .iter()
            .map(|c| {
                row.get(&c.name)
                    .and_then(Value::category_key)
                    .map(|s| sanitize_cell(&s))
                    .unwrap_or_default()
            })
            .collect();
        if let Some((_, values)) = extra {
            record.push(values.get(i).cloned().unwrap_or_default());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any serializable value as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColumnKind;
    use tempfile::tempdir;

    #[test]
    fn read_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        std::fs::write(&csvp, "name,confidence\na,0.1\nb,\nc,0.9\n").unwrap();
        std::fs::write(&jsonp, r#"{"rows":[{"name":"a","n":3},{"name":"b","n":null}]}"#).unwrap();

        let rs = load_result_set(&csvp).unwrap();
        assert_eq!(rs.rows.len(), 3);
        assert_eq!(rs.column("confidence").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(rs.rows[1]["confidence"], Value::Null);

        let rs = load_result_set(&jsonp).unwrap();
        assert_eq!(rs.column("n").unwrap().kind, ColumnKind::Numeric);
        assert_eq!(rs.column("name").unwrap().kind, ColumnKind::Categorical);
    }

    #[test]
    fn unknown_extension_is_typed_error() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("x.parquet");
        std::fs::write(&p, "").unwrap();
        let err = load_result_set(&p).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn csv_output_defuses_formulas() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("out.csv");
        let mut row = Row::new();
        row.insert("label".into(), Value::Text("=SUM(A1:A9)".into()));
        row.insert("v".into(), Value::Int(-3));
        let rs = ResultSet::new(vec!["label".into(), "v".into()], vec![row]);
        let classes = vec!["2".to_string()];
        save_csv(&rs, Some(("class", classes.as_slice())), &p).unwrap();
        let txt = std::fs::read_to_string(&p).unwrap();
        assert_eq!(txt.lines().next(), Some("label,v,class"));
        assert_eq!(txt.lines().nth(1), Some("'=SUM(A1:A9),-3,2"));
    }

    #[test]
    fn settings_save_as_camel_case_json() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("style.json");
        save_json(&crate::style::StyleSettings::default(), &p).unwrap();
        let text = std::fs::read_to_string(&p).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["classCount"], 5);
        assert_eq!(v["mode"], "single");
    }
}
