//! Normalization of the stats API's tabular wire format.
//!
//! Most endpoints answer with named column/row blocks instead of structured
//! JSON:
//!
//! ```json
//! {
//!     "resultSets": [
//!         {
//!             "name": "Standings",
//!             "headers": ["TeamID", "TeamName", "WINS"],
//!             "rowSet": [
//!                 [1610612760, "Thunder", 68],
//!                 [1610612739, "Cavaliers", 64]
//!             ]
//!         }
//!     ]
//! }
//! ```
//!
//! Three wire variants exist and callers should not need to care which one
//! arrived: the `resultSets` container may be a list of blocks or a map
//! keyed by block name, and some legacy endpoints use a singular
//! [`LEGACY_BLOCK_KEY`] holding a single block. The functions here locate a
//! block, zip `headers[i] ↔ row[i]` into [`Record`]s, and surface malformed
//! structure as fatal [`Error::Decode`] — a shape violation means the API
//! contract changed, not that the request should be retried.
//!
//! All functions are pure; payloads that are not tabular pass through
//! [`normalize`] unchanged, so normalizing twice is a no-op.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Key under which tabular responses carry their blocks.
pub const BLOCK_CONTAINER_KEY: &str = "resultSets";

/// Fallback key used by legacy single-block responses.
pub const LEGACY_BLOCK_KEY: &str = "resultSet";

/// One normalized row: header name → cell value.
pub type Record = Map<String, Value>;

/// Which block of a tabular payload to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSelector<'a> {
    /// Select by position in the container. `Index(0)` is the common case
    /// for single-block responses.
    Index(usize),
    /// Select by the block's `name` field (or map key).
    Name(&'a str),
}

impl Default for BlockSelector<'_> {
    fn default() -> Self {
        BlockSelector::Index(0)
    }
}

impl BlockSelector<'_> {
    fn describe(&self) -> String {
        match self {
            BlockSelector::Index(i) => format!("#{i}"),
            BlockSelector::Name(name) => (*name).to_string(),
        }
    }
}

/// Returns `true` if the payload is in the tabular wire format.
///
/// Already-normalized data (plain records, arrays of records) is not
/// tabular and passes through [`normalize`] untouched.
pub fn is_tabular(data: &Value) -> bool {
    data.as_object().is_some_and(|obj| {
        obj.contains_key(BLOCK_CONTAINER_KEY) || obj.contains_key(LEGACY_BLOCK_KEY)
    })
}

/// Normalizes a payload into an array of records.
///
/// Non-tabular payloads are returned unchanged, so the operation is
/// idempotent. Tabular payloads have the selected block expanded into
/// `[{header: value, ...}, ...]`.
pub fn normalize(data: &Value, selector: BlockSelector<'_>) -> Result<Value> {
    if !is_tabular(data) {
        return Ok(data.clone());
    }
    let records = rows(data, selector)?;
    Ok(Value::Array(records.into_iter().map(Value::Object).collect()))
}

/// Extracts every row of the selected block as [`Record`]s, in row order.
///
/// An empty `rowSet` yields an empty vec — many blocks are legitimately
/// empty for a given query.
///
/// # Examples
///
/// ```
/// use courtside::table::{rows, BlockSelector};
/// use serde_json::json;
///
/// let payload = json!({
///     "resultSets": [{
///         "name": "Players",
///         "headers": ["id", "name"],
///         "rowSet": [[1, "Alice"], [2, "Bob"]]
///     }]
/// });
///
/// let records = rows(&payload, BlockSelector::Index(0)).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0]["name"], json!("Alice"));
/// ```
pub fn rows(data: &Value, selector: BlockSelector<'_>) -> Result<Vec<Record>> {
    let block = select_block(data, selector)?;
    block_rows(block, &selector.describe())
}

/// Extracts the first row of the selected block, or `None` if the block
/// has no rows. Absence is not an error; a missing *block* still is.
pub fn first_row(data: &Value, selector: BlockSelector<'_>) -> Result<Option<Record>> {
    Ok(rows(data, selector)?.into_iter().next())
}

/// Like [`rows`], deserializing each record into `T`.
pub fn rows_as<T: DeserializeOwned>(data: &Value, selector: BlockSelector<'_>) -> Result<Vec<T>> {
    rows(data, selector)?
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            serde_json::from_value(Value::Object(record)).map_err(|e| Error::Decode {
                context: format!("block {} row {i}", selector.describe()),
                detail: e.to_string(),
                raw: String::new(),
            })
        })
        .collect()
}

/// Like [`first_row`], deserializing the record into `T`.
pub fn first_row_as<T: DeserializeOwned>(
    data: &Value,
    selector: BlockSelector<'_>,
) -> Result<Option<T>> {
    match first_row(data, selector)? {
        Some(record) => serde_json::from_value(Value::Object(record))
            .map(Some)
            .map_err(|e| Error::Decode {
                context: format!("block {}", selector.describe()),
                detail: e.to_string(),
                raw: String::new(),
            }),
        None => Ok(None),
    }
}

/// How one field of a projection pulls from a tabular block.
#[derive(Debug, Clone)]
pub struct BlockSpec {
    block: String,
    extract: Extract,
    optional: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extract {
    Rows,
    First,
}

impl BlockSpec {
    /// All rows of the named block, as an array of records.
    pub fn rows(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            extract: Extract::Rows,
            optional: false,
        }
    }

    /// The first row of the named block, or `null` when the block is empty.
    pub fn first(block: impl Into<String>) -> Self {
        Self {
            block: block.into(),
            extract: Extract::First,
            optional: false,
        }
    }

    /// Tolerate the block being absent entirely: yields an empty array (or
    /// `null` for [`BlockSpec::first`]) instead of failing. For endpoints
    /// whose optional sections are only conditionally present.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Projects several named blocks into one object in a single pass.
///
/// Each `(field, spec)` entry extracts one block into `field` of the output
/// object. Useful for endpoints that answer with multiple named blocks.
///
/// # Examples
///
/// ```
/// use courtside::table::{project, BlockSpec};
/// use serde_json::json;
///
/// let payload = json!({
///     "resultSets": [
///         {"name": "GameByGame", "headers": ["PTS"], "rowSet": [[112], [98]]},
///         {"name": "Totals", "headers": ["PTS"], "rowSet": [[210]]}
///     ]
/// });
///
/// let out = project(&payload, &[
///     ("games", BlockSpec::rows("GameByGame")),
///     ("totals", BlockSpec::first("Totals")),
///     ("overtimes", BlockSpec::rows("Overtimes").optional()),
/// ]).unwrap();
///
/// assert_eq!(out["games"].as_array().unwrap().len(), 2);
/// assert_eq!(out["totals"]["PTS"], json!(210));
/// assert_eq!(out["overtimes"], json!([]));
/// ```
pub fn project(data: &Value, fields: &[(&str, BlockSpec)]) -> Result<Value> {
    let mut out = Map::with_capacity(fields.len());
    for (field, spec) in fields {
        let extracted = match rows(data, BlockSelector::Name(&spec.block)) {
            Ok(records) => match spec.extract {
                Extract::Rows => Value::Array(records.into_iter().map(Value::Object).collect()),
                Extract::First => records.into_iter().next().map_or(Value::Null, Value::Object),
            },
            Err(Error::BlockNotFound { .. }) if spec.optional => match spec.extract {
                Extract::Rows => Value::Array(Vec::new()),
                Extract::First => Value::Null,
            },
            Err(e) => return Err(e),
        };
        out.insert((*field).to_string(), extracted);
    }
    Ok(Value::Object(out))
}

/// Locates the selected block across the three wire variants.
fn select_block<'v>(data: &'v Value, selector: BlockSelector<'_>) -> Result<&'v Value> {
    let Some(obj) = data.as_object() else {
        return Err(not_tabular());
    };

    if let Some(container) = obj.get(BLOCK_CONTAINER_KEY) {
        return match container {
            Value::Array(blocks) => select_from_list(blocks, selector),
            Value::Object(by_name) => select_from_map(by_name, selector),
            _ => Err(Error::Decode {
                context: "tabular payload".to_string(),
                detail: format!("'{BLOCK_CONTAINER_KEY}' is neither a list nor a map of blocks"),
                raw: String::new(),
            }),
        };
    }

    // Legacy single-block responses carry the block directly.
    if let Some(block) = obj.get(LEGACY_BLOCK_KEY) {
        return select_single(block, selector);
    }

    Err(not_tabular())
}

fn not_tabular() -> Error {
    Error::Decode {
        context: "tabular payload".to_string(),
        detail: format!("missing '{BLOCK_CONTAINER_KEY}' container"),
        raw: String::new(),
    }
}

fn select_from_list<'v>(blocks: &'v [Value], selector: BlockSelector<'_>) -> Result<&'v Value> {
    let found = match selector {
        BlockSelector::Index(i) => blocks.get(i),
        BlockSelector::Name(name) => blocks
            .iter()
            .find(|block| block.get("name").and_then(Value::as_str) == Some(name)),
    };
    found.ok_or_else(|| Error::BlockNotFound {
        wanted: selector.describe(),
        available: blocks
            .iter()
            .filter_map(|block| block.get("name").and_then(Value::as_str))
            .map(str::to_string)
            .collect(),
    })
}

fn select_from_map<'v>(
    by_name: &'v Map<String, Value>,
    selector: BlockSelector<'_>,
) -> Result<&'v Value> {
    let found = match selector {
        BlockSelector::Index(i) => by_name.values().nth(i),
        BlockSelector::Name(name) => by_name.get(name),
    };
    found.ok_or_else(|| Error::BlockNotFound {
        wanted: selector.describe(),
        available: by_name.keys().cloned().collect(),
    })
}

fn select_single<'v>(block: &'v Value, selector: BlockSelector<'_>) -> Result<&'v Value> {
    let own_name = block.get("name").and_then(Value::as_str);
    let matches = match selector {
        BlockSelector::Index(i) => i == 0,
        BlockSelector::Name(name) => own_name == Some(name),
    };
    if matches {
        Ok(block)
    } else {
        Err(Error::BlockNotFound {
            wanted: selector.describe(),
            available: own_name.map(str::to_string).into_iter().collect(),
        })
    }
}

/// Zips a block's headers against each row. Row length must equal header
/// length exactly; mismatches never silently truncate or pad.
fn block_rows(block: &Value, context: &str) -> Result<Vec<Record>> {
    let malformed = |detail: String| Error::Decode {
        context: format!("block {context}"),
        detail,
        raw: String::new(),
    };

    let headers = block
        .get("headers")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing or malformed 'headers'".to_string()))?;
    let headers: Vec<&str> = headers
        .iter()
        .map(|h| {
            h.as_str()
                .ok_or_else(|| malformed(format!("non-string header: {h}")))
        })
        .collect::<Result<_>>()?;

    let row_set = block
        .get("rowSet")
        .and_then(Value::as_array)
        .ok_or_else(|| malformed("missing or malformed 'rowSet'".to_string()))?;

    let mut records = Vec::with_capacity(row_set.len());
    for (i, row) in row_set.iter().enumerate() {
        let cells = row
            .as_array()
            .ok_or_else(|| malformed(format!("row {i} is not an array")))?;
        if cells.len() != headers.len() {
            return Err(malformed(format!(
                "row {i} has {} cells but {} headers",
                cells.len(),
                headers.len()
            )));
        }
        let record: Record = headers
            .iter()
            .zip(cells)
            .map(|(header, cell)| ((*header).to_string(), cell.clone()))
            .collect();
        records.push(record);
    }
    Ok(records)
}
