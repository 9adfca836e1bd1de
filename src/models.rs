use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cell of a query result.
///
/// Numeric cells may arrive as integers, floats, or integers too wide for
/// `i64`; all of them normalize to `f64` through [`Value::as_f64`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    BigInt(i128),
    Float(f64),
    Text(String),
}

impl Value {
    /// Parse a raw text cell (e.g. from CSV) into the narrowest matching value.
    pub fn parse_cell(raw: &str) -> Self {
        let s = raw.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("null") {
            return Value::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(i) = s.parse::<i128>() {
            return Value::BigInt(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
        match s {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Numeric view of the cell. Text that parses as a number counts, so
    /// engines that emit decimals as strings still classify. Null, booleans,
    /// other text and non-finite values yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Value::Int(i) => *i as f64,
            Value::BigInt(i) => *i as f64,
            Value::Float(f) => *f,
            Value::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_) | Value::Float(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String key used for categorical styling. Null has no category.
    pub fn category_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::BigInt(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(*b),
            J::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::BigInt(u as i128)
                } else {
                    n.as_f64().map(Value::Float).unwrap_or(Value::Null)
                }
            }
            J::String(s) => Value::Text(s.clone()),
            // Nested values (e.g. geometry objects) are kept as their JSON text.
            other => Value::Text(other.to_string()),
        }
    }
}

/// One result record, keyed by column name.
pub type Row = BTreeMap<String, Value>;

/// Inferred value kind of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    pub kind: ColumnKind,
}

/// Columns holding geometry are never styling targets.
fn is_geometry_column(name: &str) -> bool {
    matches!(name.to_ascii_lowercase().as_str(), "geometry" | "geom")
}

/// Schema plus rows of one query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<ResultColumn>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    /// Build a result set from ordered column names and rows, inferring each column's kind
    /// from the first row that has a non-null value for it.
    pub fn new(names: Vec<String>, rows: Vec<Row>) -> Self {
        let columns = names
            .into_iter()
            .map(|name| {
                let kind = match rows
                    .iter()
                    .filter_map(|r| r.get(&name))
                    .find(|v| !v.is_null())
                {
                    Some(v) if v.is_numeric() => ColumnKind::Numeric,
                    _ => ColumnKind::Categorical,
                };
                ResultColumn { name, kind }
            })
            .collect();
        Self { columns, rows }
    }

    /// Build a result set from JSON objects. Column order follows the first
    /// occurrence of each key.
    pub fn from_json_objects(objects: &[serde_json::Map<String, serde_json::Value>]) -> Self {
        let mut names: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(objects.len());
        for obj in objects {
            let mut row = Row::new();
            for (k, v) in obj {
                if !names.iter().any(|n| n == k) {
                    names.push(k.clone());
                }
                row.insert(k.clone(), Value::from(v));
            }
            rows.push(row);
        }
        Self::new(names, rows)
    }

    pub fn column(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns that can drive styling, in schema order.
    pub fn styleable_columns(&self) -> impl Iterator<Item = &ResultColumn> {
        self.columns.iter().filter(|c| !is_geometry_column(&c.name))
    }

    /// Numeric sample of `column` over the first `max_rows` rows, nulls and
    /// non-finite values excluded.
    pub fn numeric_sample(&self, column: &str, max_rows: usize) -> NumericSample {
        let mut entries = Vec::new();
        let mut missing = 0;
        for (idx, row) in self.rows.iter().take(max_rows).enumerate() {
            match row.get(column).and_then(Value::as_f64) {
                Some(v) => entries.push((idx, v)),
                None => missing += 1,
            }
        }
        NumericSample { entries, missing }
    }

    /// Categorical sample of `column` over the first `max_rows` rows, nulls excluded.
    pub fn categorical_sample(&self, column: &str, max_rows: usize) -> CategoricalSample {
        let entries = self
            .rows
            .iter()
            .take(max_rows)
            .enumerate()
            .filter_map(|(idx, row)| row.get(column)?.category_key().map(|k| (idx, k)))
            .collect();
        CategoricalSample { entries }
    }
}

/// Finite numeric values of one column, each tagged with its source row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericSample {
    pub entries: Vec<(usize, f64)>,
    /// Rows skipped because the value was null, non-numeric, or non-finite.
    pub missing: usize,
}

impl NumericSample {
    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.entries.iter().map(|(_, v)| *v).reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.entries.iter().map(|(_, v)| *v).reduce(f64::max)
    }
}

/// Category keys of one column, each tagged with its source row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoricalSample {
    pub entries: Vec<(usize, String)>,
}

impl CategoricalSample {
    /// Distinct keys in first-seen order.
    pub fn distinct(&self) -> Vec<&str> {
        let mut seen = ahash::AHashSet::new();
        self.entries
            .iter()
            .map(|(_, k)| k.as_str())
            .filter(|k| seen.insert(*k))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
