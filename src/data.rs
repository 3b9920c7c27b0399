use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::classify::{classify, Classification};

/// A single cell as delivered by ingestion.
///
/// Numbers are always finite. Equality is exact on the raw value, so
/// `Number(1.0)` and `Text("1")` are different group keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Normalize a raw delimited-text field the way the upload step does:
    /// empty → null, true/false → bool, finite numbers → number, else text.
    pub fn from_field(raw: &str) -> Self {
        let field = raw.trim();
        if field.is_empty() {
            return Value::Null;
        }
        if field.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if field.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        match field.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(field.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    fn number_bits(n: f64) -> u64 {
        // -0.0 and 0.0 are the same group
        if n == 0.0 { 0.0f64.to_bits() } else { n.to_bits() }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => Value::number_bits(*a) == Value::number_bits(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Number(n) => Value::number_bits(*n).hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// One record, keyed by column name. Immutable once ingested.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Numeric value of `column`, or `None` when missing or not a number.
    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A loaded dataset: column order, rows, and the classification computed
/// once at load time.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
    classification: Classification,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Row>, id_column: &str) -> Self {
        let classification = classify(&columns, rows.first(), id_column);
        Self {
            columns,
            rows,
            classification,
        }
    }

    /// Create a Dataset from a JSON array of objects.
    /// Column order follows the keys of the first object.
    pub fn from_json(value: &serde_json::Value, id_column: &str) -> Result<Self> {
        let array = value
            .as_array()
            .ok_or_else(|| anyhow!("Input data must be a JSON array of objects"))?;

        let columns: Vec<String> = match array.first() {
            Some(first) => first
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?
                .keys()
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let mut rows = Vec::with_capacity(array.len());
        for item in array {
            let obj = item
                .as_object()
                .ok_or_else(|| anyhow!("Items in array must be objects"))?;

            let mut values = HashMap::with_capacity(columns.len());
            for column in &columns {
                let value = match obj.get(column) {
                    Some(serde_json::Value::String(s)) => Value::Text(s.clone()),
                    Some(serde_json::Value::Number(n)) => match n.as_f64() {
                        Some(f) if f.is_finite() => Value::Number(f),
                        _ => Value::Text(n.to_string()),
                    },
                    Some(serde_json::Value::Bool(b)) => Value::Bool(*b),
                    Some(serde_json::Value::Null) | None => Value::Null,
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", column)),
                };
                values.insert(column.clone(), value);
            }
            rows.push(Row::new(values));
        }

        Ok(Self::new(columns, rows, id_column))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
