//! The BRIO value model.
//!
//! [`Value`] is the tagged union of everything BRIO can put on the wire.
//! Encoding dispatches by exhaustive match, so adding a variant is a
//! compile-time obligation for both codec halves.

use chrono::{DateTime, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::grid::{Grid, GridBuilder};
use crate::{Error, Result};

/// Insertion-ordered string-keyed mapping. Iteration and wire order follow
/// insertion order; equality does not.
pub type Dict = indexmap::IndexMap<String, Value>;

/// A BRIO-representable value.
///
/// Values are immutable after construction. The sentinels `Marker`, `Na`
/// and `Remove` are payload-free variants equal only to themselves.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. Dict entries with this value are skipped on encode.
    Null,
    /// "Present without value" sentinel.
    Marker,
    /// "Not available" sentinel.
    Na,
    /// "Delete this tag" sentinel.
    Remove,
    /// Boolean.
    Bool(bool),
    /// Number with optional unit.
    Number(Number),
    /// UTF-8 string.
    Str(String),
    /// URI. Distinct wire tag from `Str`.
    Uri(String),
    /// Identity reference.
    Ref(Ref),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day, millisecond precision on the wire.
    Time(NaiveTime),
    /// Timezone-aware instant, nanosecond precision on the wire.
    DateTime(DateTime<Tz>),
    /// Geographic coordinate in micro-degrees.
    Coord(Coord),
    /// Raw byte buffer.
    Buf(Vec<u8>),
    /// Ordered string-keyed mapping.
    Dict(Dict),
    /// Sequence of values.
    List(Vec<Value>),
    /// Tabular grid.
    Grid(Grid),
    /// Numeric matrix, carried on the wire as a special dict.
    NDArray(NDArray),
}

impl Value {
    /// Variant name, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Marker => "Marker",
            Value::Na => "Na",
            Value::Remove => "Remove",
            Value::Bool(_) => "Bool",
            Value::Number(_) => "Number",
            Value::Str(_) => "Str",
            Value::Uri(_) => "Uri",
            Value::Ref(_) => "Ref",
            Value::Date(_) => "Date",
            Value::Time(_) => "Time",
            Value::DateTime(_) => "DateTime",
            Value::Coord(_) => "Coord",
            Value::Buf(_) => "Buf",
            Value::Dict(_) => "Dict",
            Value::List(_) => "List",
            Value::Grid(_) => "Grid",
            Value::NDArray(_) => "NDArray",
        }
    }

    /// The string payload, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The dict payload, if this is a `Dict`.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// The buffer payload, if this is a `Buf`.
    pub fn as_buf(&self) -> Option<&[u8]> {
        match self {
            Value::Buf(b) => Some(b),
            _ => None,
        }
    }

    /// The numeric payload as an integer, if this is a `Number` with a
    /// zero fractional part.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) if n.val.fract() == 0.0 && n.val.is_finite() => Some(n.val as i64),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Value {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Number(Number::new(v as f64))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Number(Number::new(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Marker => write!(f, "marker"),
            Value::Na => write!(f, "na"),
            Value::Remove => write!(f, "remove"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Uri(u) => write!(f, "{u}"),
            Value::Ref(r) => write!(f, "{r}"),
            Value::Date(d) => write!(f, "{d}"),
            Value::Time(t) => write!(f, "{t}"),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Coord(c) => write!(f, "{c}"),
            Value::Buf(b) => write!(f, "Buf({} bytes)", b.len()),
            Value::Dict(d) => {
                write!(f, "{{")?;
                for (i, (k, v)) in d.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}:{v}")?;
                }
                write!(f, "}}")
            }
            Value::List(l) => {
                write!(f, "[")?;
                for (i, v) in l.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
            Value::Grid(g) => write!(f, "Grid({}x{})", g.size(), g.cols().len()),
            Value::NDArray(a) => write!(f, "NDArray({}x{})", a.rows, a.cols),
        }
    }
}

/// A number with an optional opaque unit symbol (e.g. `"kWh"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    /// Numeric value.
    pub val: f64,
    /// Unit symbol. Encoded as the empty string when absent.
    pub unit: Option<String>,
}

impl Number {
    /// Unitless number.
    pub fn new(val: f64) -> Number {
        Number { val, unit: None }
    }

    /// Number with a unit.
    pub fn with_unit(val: f64, unit: impl Into<String>) -> Number {
        Number {
            val,
            unit: Some(unit.into()),
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.unit {
            Some(u) => write!(f, "{}{}", self.val, u),
            None => write!(f, "{}", self.val),
        }
    }
}

/// An identity reference with an optional display string.
///
/// Equality considers the id only.
#[derive(Debug, Clone)]
pub struct Ref {
    id: String,
    dis: Option<String>,
}

impl Ref {
    /// Create a ref from its id.
    pub fn new(id: impl Into<String>) -> Ref {
        Ref {
            id: id.into(),
            dis: None,
        }
    }

    /// Create a ref with a display string.
    pub fn with_dis(id: impl Into<String>, dis: impl Into<String>) -> Ref {
        Ref {
            id: id.into(),
            dis: Some(dis.into()),
        }
    }

    /// Reconstruct the `"xxxxxxxx-xxxxxxxx"` id from a packed 64-bit
    /// handle.
    pub fn from_handle(handle: i64) -> Ref {
        let time = (handle >> 32) & 0xffff_ffff;
        let rand = handle & 0xffff_ffff;
        Ref::new(format!("{time:08x}-{rand:08x}"))
    }

    /// Pack the id into a 64-bit handle, if it has the canonical
    /// `"xxxxxxxx-xxxxxxxx"` lowercase hex shape.
    pub fn handle(&self) -> Option<i64> {
        let b = self.id.as_bytes();
        if b.len() != 17 || b[8] != b'-' {
            return None;
        }
        let mut h: i64 = 0;
        for (i, c) in b.iter().enumerate() {
            if i == 8 {
                continue;
            }
            // Lowercase only: an uppercase id would come back lowercase
            // from the handle and no longer compare equal.
            let nibble = match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                _ => return None,
            };
            h = (h << 4) | nibble as i64;
        }
        Some(h)
    }

    /// The id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The display string.
    pub fn dis(&self) -> Option<&str> {
        self.dis.as_deref()
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Ref) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A geographic coordinate in micro-degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coord {
    ulat: i32,
    ulng: i32,
}

impl Coord {
    /// Create a coordinate from micro-degrees, validating the ranges.
    pub fn new(ulat: i32, ulng: i32) -> Result<Coord> {
        if !(-90_000_000..=90_000_000).contains(&ulat) {
            return Err(Error::CoordRange {
                axis: "lat",
                val: ulat,
            });
        }
        if !(-180_000_000..=180_000_000).contains(&ulng) {
            return Err(Error::CoordRange {
                axis: "lng",
                val: ulng,
            });
        }
        Ok(Coord { ulat, ulng })
    }

    /// Latitude in micro-degrees.
    pub fn ulat(&self) -> i32 {
        self.ulat
    }

    /// Longitude in micro-degrees.
    pub fn ulng(&self) -> i32 {
        self.ulng
    }

    /// Unpack from the 64-bit wire form: biased latitude in the high 32
    /// bits, biased longitude in the low 32.
    pub fn unpack(bits: i64) -> Result<Coord> {
        let ulat = (((bits >> 32) & 0xffff_ffff) - 90_000_000) as i32;
        let ulng = ((bits & 0xffff_ffff) - 180_000_000) as i32;
        Coord::new(ulat, ulng)
    }

    /// Pack into the 64-bit wire form.
    pub fn pack(&self) -> i64 {
        let lat = (self.ulat as i64 + 90_000_000) as u64;
        let lng = (self.ulng as i64 + 180_000_000) as u64;
        ((lat << 32) | lng) as i64
    }
}

impl std::str::FromStr for Coord {
    type Err = Error;

    /// Parse the `C(lat,lng)` degree form.
    fn from_str(s: &str) -> Result<Coord> {
        let bad = || Error::CoordParse(s.to_string());
        let inner = s
            .strip_prefix("C(")
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(bad)?;
        let (lat, lng) = inner.split_once(',').ok_or_else(bad)?;
        let lat: f64 = lat.trim().parse().map_err(|_| bad())?;
        let lng: f64 = lng.trim().parse().map_err(|_| bad())?;
        Coord::new((lat * 1_000_000.0).round() as i32, (lng * 1_000_000.0).round() as i32)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "C({},{})",
            self.ulat as f64 / 1_000_000.0,
            self.ulng as f64 / 1_000_000.0
        )
    }
}

/// A two-dimensional row-major `f64` matrix.
///
/// On the wire this travels as a dict of the shape
/// `{ndarray: Marker, r, c, bytes}` with the cells as big-endian IEEE-754
/// doubles.
#[derive(Debug, Clone, PartialEq)]
pub struct NDArray {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl NDArray {
    /// Create a matrix, validating that `data` has `rows * cols` cells.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<NDArray> {
        if rows * cols != data.len() {
            return Err(Error::ShapeUnsupported {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(NDArray { rows, cols, data })
    }

    /// Promote a vector to an `(len, 1)` column matrix.
    pub fn from_vec(data: Vec<f64>) -> NDArray {
        NDArray {
            rows: data.len(),
            cols: 1,
            data,
        }
    }

    /// Row count.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Column count.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cells in row-major order, always `rows * cols` long.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Convert to a grid with generated column names `v0..vN` and empty
    /// metadata.
    pub fn to_grid(&self) -> Result<Grid> {
        let mut gb = GridBuilder::new();
        gb.add_col_names((0..self.cols).map(|c| format!("v{c}")))?;
        if self.cols > 0 {
            for row in self.data.chunks(self.cols) {
                gb.add_row(row.iter().map(|v| Value::from(*v)).collect())?;
            }
        }
        Ok(gb.to_grid())
    }
}
