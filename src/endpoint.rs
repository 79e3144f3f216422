//! Endpoint descriptors: what to request and how to decode the answer.
//!
//! An endpoint is described by a path, an ordered list of query parameters,
//! and a response shape. The [`Descriptor`] type covers ad-hoc use; endpoint
//! families (see [`crate::endpoints`]) are small configuration structs that
//! build descriptors, composed rather than subclassed.

use crate::table::{self, BlockSelector, BlockSpec};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// A remote resource the client knows how to fetch and decode.
///
/// `Response` is the schema the decoded payload is validated against, once,
/// at decode time — field aliasing lives in `#[serde(rename)]` attributes on
/// the response type, not in runtime lookups.
pub trait Endpoint {
    /// The decoded response type.
    type Response: DeserializeOwned;

    /// URL path segment relative to the API base (e.g. `"leaguegamelog"`).
    fn path(&self) -> &str;

    /// Query parameters, serialized in exactly this order.
    fn params(&self) -> Vec<(String, String)>;

    /// Decodes the raw JSON payload into the response type.
    ///
    /// The default expects pre-structured JSON. Tabular endpoints override
    /// this (or use [`Descriptor`] with a tabular [`Shape`]) to normalize
    /// the block format first.
    fn decode(&self, raw: &Value) -> Result<Self::Response> {
        serde_json::from_value(raw.clone()).map_err(|e| Error::Decode {
            context: self.path().to_string(),
            detail: e.to_string(),
            raw: String::new(),
        })
    }
}

/// An owned block reference, the storable counterpart of [`BlockSelector`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKey {
    /// Block at this position in the container.
    Index(usize),
    /// Block with this name.
    Name(String),
}

impl BlockKey {
    fn selector(&self) -> BlockSelector<'_> {
        match self {
            BlockKey::Index(i) => BlockSelector::Index(*i),
            BlockKey::Name(name) => BlockSelector::Name(name),
        }
    }
}

/// How the wire payload maps onto the response type.
#[derive(Debug, Clone)]
pub enum Shape {
    /// The body already matches the response type; decode directly.
    Structured,
    /// One tabular block, normalized into an array of records.
    Table(BlockKey),
    /// Several named blocks projected into one object, field by field.
    Projected(Vec<(String, BlockSpec)>),
}

/// A generic endpoint descriptor: path, ordered params, response shape.
///
/// Immutable once built; construct one per logical request.
///
/// # Examples
///
/// ```
/// use courtside::endpoint::{BlockKey, Descriptor};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Standing {
///     #[serde(rename = "TeamID")]
///     team_id: i64,
///     #[serde(rename = "WINS")]
///     wins: i64,
/// }
///
/// let endpoint: Descriptor<Vec<Standing>> = Descriptor::new("leaguestandingsv3")
///     .param("LeagueID", "00")
///     .param("Season", "2024-25")
///     .param("SeasonType", "Regular Season")
///     .table(BlockKey::Name("Standings".to_string()));
/// ```
pub struct Descriptor<T> {
    path: String,
    params: Vec<(String, String)>,
    shape: Shape,
    _response: PhantomData<fn() -> T>,
}

impl<T> Descriptor<T> {
    /// Creates a descriptor for `path` with no parameters and a
    /// [`Shape::Structured`] response.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            shape: Shape::Structured,
            _response: PhantomData,
        }
    }

    /// Appends a query parameter. Parameters are serialized in insertion
    /// order.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Declares the response tabular: the keyed block is normalized into an
    /// array of records before decoding.
    pub fn table(mut self, key: BlockKey) -> Self {
        self.shape = Shape::Table(key);
        self
    }

    /// Declares the response a multi-block projection.
    pub fn projected(mut self, fields: Vec<(String, BlockSpec)>) -> Self {
        self.shape = Shape::Projected(fields);
        self
    }
}

impl<T> Clone for Descriptor<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            params: self.params.clone(),
            shape: self.shape.clone(),
            _response: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Descriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("shape", &self.shape)
            .finish()
    }
}

impl<T: DeserializeOwned> Endpoint for Descriptor<T> {
    type Response = T;

    fn path(&self) -> &str {
        &self.path
    }

    fn params(&self) -> Vec<(String, String)> {
        self.params.clone()
    }

    fn decode(&self, raw: &Value) -> Result<T> {
        let shaped = match &self.shape {
            Shape::Structured => raw.clone(),
            Shape::Table(key) => table::normalize(raw, key.selector())?,
            Shape::Projected(fields) => {
                let specs: Vec<(&str, BlockSpec)> = fields
                    .iter()
                    .map(|(field, spec)| (field.as_str(), spec.clone()))
                    .collect();
                table::project(raw, &specs)?
            }
        };
        serde_json::from_value(shaped).map_err(|e| Error::Decode {
            context: self.path.clone(),
            detail: e.to_string(),
            raw: String::new(),
        })
    }
}
