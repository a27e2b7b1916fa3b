//! BRIO encoder.
//!
//! [`BrioWriter`] appends tagged encodings to an owned byte buffer. The
//! encoder always emits canonical bytes: the smallest varint class, the
//! smallest number form that holds the value exactly, and the packed ref
//! form whenever the id has the canonical hex shape.
//!
//! In the default lenient mode a value the wire format cannot carry (for
//! instance a date outside the 16-bit year range) is written as its
//! display string instead; strict mode turns that into an error.

use crate::reader::EPOCH_SECS;
use crate::value::{Dict, Number, Value};
use crate::{Error, Result, control, varint};

const EPOCH_NANOS: i64 = EPOCH_SECS * 1_000_000_000;

/// Encoder owning its output buffer.
#[derive(Default)]
pub struct BrioWriter {
    buf: Vec<u8>,
    strict: bool,
}

impl BrioWriter {
    /// New lenient writer with an empty buffer.
    pub fn new() -> BrioWriter {
        BrioWriter::default()
    }

    /// Set strict mode. Strict writers fail on unencodable values instead
    /// of coercing them to display strings.
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    /// Encode one value to bytes.
    pub fn to_bytes(val: &Value) -> Result<Vec<u8>> {
        let mut w = BrioWriter::new();
        w.write_val(val)?;
        Ok(w.into_bytes())
    }

    /// The bytes written so far.
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer, returning its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append the tagged encoding of `val`.
    pub fn write_val(&mut self, val: &Value) -> Result<()> {
        let mark = self.buf.len();
        match self.encode_val(val) {
            Err(Error::EncodeUnsupported { .. }) if !self.strict => {
                // Drop the partial encoding and coerce.
                self.buf.truncate(mark);
                self.buf.push(control::STR);
                self.encode_str(&val.to_string());
                Ok(())
            }
            other => other,
        }
    }

    fn encode_val(&mut self, val: &Value) -> Result<()> {
        match val {
            Value::Null => self.buf.push(control::NULL),
            Value::Marker => self.buf.push(control::MARKER),
            Value::Na => self.buf.push(control::NA),
            Value::Remove => self.buf.push(control::REMOVE),
            Value::Bool(false) => self.buf.push(control::FALSE),
            Value::Bool(true) => self.buf.push(control::TRUE),
            Value::Number(n) => self.write_number(n),
            Value::Str(s) => {
                self.buf.push(control::STR);
                self.encode_str(s);
            }
            Value::Uri(u) => {
                self.buf.push(control::URI);
                self.encode_str(u);
            }
            Value::Ref(r) => {
                match r.handle() {
                    Some(handle) => {
                        self.buf.push(control::REF_I8);
                        self.buf.extend_from_slice(&handle.to_be_bytes());
                    }
                    None => {
                        self.buf.push(control::REF_STR);
                        self.encode_str(r.id());
                    }
                }
                // The display string is always present, raw and
                // character-counted, in both ref forms.
                self.encode_str_chars(r.dis().unwrap_or(""));
            }
            Value::Date(d) => {
                use chrono::Datelike;
                let y = i16::try_from(d.year()).map_err(|_| Error::EncodeUnsupported {
                    what: format!("date year {}", d.year()),
                })?;
                self.buf.push(control::DATE);
                self.buf.extend_from_slice(&y.to_be_bytes());
                self.buf.push(d.month() as u8);
                self.buf.push(d.day() as u8);
            }
            Value::Time(t) => {
                use chrono::Timelike;
                let millis = t.hour() * 3_600_000
                    + t.minute() * 60_000
                    + t.second() * 1000
                    + t.nanosecond() / 1_000_000;
                self.buf.push(control::TIME);
                self.buf.extend_from_slice(&millis.to_be_bytes());
            }
            Value::DateTime(dt) => self.write_datetime(dt)?,
            Value::Coord(c) => {
                self.buf.push(control::COORD);
                self.buf.extend_from_slice(&c.pack().to_be_bytes());
            }
            Value::Buf(b) => {
                self.buf.push(control::BUF);
                varint::encode(&mut self.buf, b.len() as i64);
                self.buf.extend_from_slice(b);
            }
            Value::Dict(d) => self.write_dict(d)?,
            Value::List(l) => {
                if l.is_empty() {
                    self.buf.push(control::LIST_EMPTY);
                } else {
                    self.buf.push(control::LIST);
                    self.buf.push(b'[');
                    varint::encode(&mut self.buf, l.len() as i64);
                    for item in l {
                        self.write_val(item)?;
                    }
                    self.buf.push(b']');
                }
            }
            Value::Grid(g) => {
                self.buf.push(control::GRID);
                self.buf.push(b'<');
                varint::encode(&mut self.buf, g.cols().len() as i64);
                varint::encode(&mut self.buf, g.size() as i64);
                self.write_dict(g.meta())?;
                for col in g.cols() {
                    self.encode_str(col.name());
                    self.write_dict(col.meta())?;
                }
                for row in g.rows() {
                    for cell in row {
                        self.write_val(cell)?;
                    }
                }
                self.buf.push(b'>');
            }
            Value::NDArray(a) => {
                // The shape invariant is guaranteed at construction.
                let mut bytes = Vec::with_capacity(a.data().len() * 8);
                for v in a.data() {
                    bytes.extend_from_slice(&v.to_be_bytes());
                }
                let mut spec = Dict::new();
                spec.insert("ndarray".into(), Value::Marker);
                spec.insert("r".into(), Value::from(a.rows() as i64));
                spec.insert("c".into(), Value::from(a.cols() as i64));
                spec.insert("bytes".into(), Value::Buf(bytes));
                self.write_dict(&spec)?;
            }
        }
        Ok(())
    }

    /// Smallest number form that holds the value exactly: i2 or i4 for
    /// integral values in range, f8 otherwise. The unit string follows in
    /// all three forms.
    fn write_number(&mut self, n: &Number) {
        let v = n.val;
        if v.fract() == 0.0 && (-32_767.0..=32_767.0).contains(&v) {
            self.buf.push(control::NUM_I2);
            self.buf.extend_from_slice(&(v as i16).to_be_bytes());
        } else if v.fract() == 0.0 && (-2_147_483_648.0..=2_147_483_647.0).contains(&v) {
            self.buf.push(control::NUM_I4);
            self.buf.extend_from_slice(&(v as i32).to_be_bytes());
        } else {
            self.buf.push(control::NUM_F8);
            self.buf.extend_from_slice(&v.to_be_bytes());
        }
        self.encode_str(n.unit.as_deref().unwrap_or(""));
    }

    /// Seconds form when the instant is whole seconds that fit an i4,
    /// nanosecond form otherwise. Pure integer arithmetic; no float ticks.
    fn write_datetime(&mut self, dt: &chrono::DateTime<chrono_tz::Tz>) -> Result<()> {
        let nanos = dt
            .timestamp_nanos_opt()
            .and_then(|n| n.checked_sub(EPOCH_NANOS))
            .ok_or_else(|| Error::EncodeUnsupported {
                what: format!("datetime {dt} out of range"),
            })?;

        // Wire names are short: the last path segment of the zone name.
        let full = dt.timezone().name();
        let short = match full.rfind('/') {
            Some(i) => &full[i + 1..],
            None => full,
        };

        let secs = nanos / 1_000_000_000;
        match (nanos % 1_000_000_000 == 0, i32::try_from(secs)) {
            (true, Ok(secs)) => {
                self.buf.push(control::DATE_TIME_I4);
                self.buf.extend_from_slice(&secs.to_be_bytes());
            }
            _ => {
                self.buf.push(control::DATE_TIME_I8);
                self.buf.extend_from_slice(&nanos.to_be_bytes());
            }
        }
        self.encode_str(short);
        Ok(())
    }

    /// Dict body with null-valued entries skipped, both from the count
    /// and from the payload.
    fn write_dict(&mut self, d: &Dict) -> Result<()> {
        if d.is_empty() {
            self.buf.push(control::DICT_EMPTY);
            return Ok(());
        }
        self.buf.push(control::DICT);
        self.buf.push(b'{');
        let count = d.values().filter(|v| **v != Value::Null).count();
        varint::encode(&mut self.buf, count as i64);
        for (k, v) in d {
            if *v != Value::Null {
                self.encode_str(k);
                self.write_val(v)?;
            }
        }
        self.buf.push(b'}');
        Ok(())
    }

    /// Tagged string: −1 sentinel, then the character-counted payload.
    fn encode_str(&mut self, s: &str) {
        varint::encode(&mut self.buf, -1);
        self.encode_str_chars(s);
    }

    /// Raw string: character count (code points, not bytes), then the
    /// UTF-8 bytes.
    fn encode_str_chars(&mut self, s: &str) {
        varint::encode(&mut self.buf, s.chars().count() as i64);
        self.buf.extend_from_slice(s.as_bytes());
    }
}
