//! BRIO decoder.
//!
//! [`BrioReader`] borrows an input byte slice and advances a cursor over
//! it, producing owned [`Value`]s. A reader is scoped to one decode
//! session: its string and timezone intern tables live exactly as long as
//! it does and never change what is decoded, only how much is allocated
//! and how often the IANA table is scanned.

use std::collections::{HashMap, HashSet};

use chrono::DateTime;
use chrono_tz::Tz;
use log::trace;

use crate::grid::GridBuilder;
use crate::value::{Dict, NDArray, Number, Ref, Value};
use crate::{Coord, Error, Result, control, varint};

/// Seconds between the Unix epoch and 2000-01-01T00:00:00 UTC.
pub(crate) const EPOCH_SECS: i64 = 946_684_800;

/// Decoder over a borrowed byte slice.
pub struct BrioReader<'a> {
    data: &'a [u8],
    pos: usize,
    intern_strs: HashSet<String>,
    intern_tzs: HashMap<String, Tz>,
}

impl<'a> BrioReader<'a> {
    /// Create a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> BrioReader<'a> {
        BrioReader {
            data,
            pos: 0,
            intern_strs: HashSet::new(),
            intern_tzs: HashMap::new(),
        }
    }

    /// Bytes remaining after the cursor.
    pub fn avail(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Read one value, advancing the cursor past its encoding.
    pub fn read_val(&mut self) -> Result<Value> {
        let pos = self.pos;
        let ctrl = self.u1()?;
        trace!("control byte {ctrl:#04x} at {pos}");
        match ctrl {
            control::NULL => Ok(Value::Null),
            control::MARKER => Ok(Value::Marker),
            control::NA => Ok(Value::Na),
            control::REMOVE => Ok(Value::Remove),
            control::FALSE => Ok(Value::Bool(false)),
            control::TRUE => Ok(Value::Bool(true)),
            control::NUM_I2 => {
                let val = self.i2()? as f64;
                Ok(Value::Number(self.number(val)?))
            }
            control::NUM_I4 => {
                let val = self.i4()? as f64;
                Ok(Value::Number(self.number(val)?))
            }
            control::NUM_F8 => {
                let val = self.f8()?;
                Ok(Value::Number(self.number(val)?))
            }
            control::STR => Ok(Value::Str(self.read_str(true)?)),
            control::REF_STR => {
                let id = self.read_str(false)?;
                let dis = self.read_str_chars(false)?;
                Ok(Value::Ref(make_ref(id, dis)))
            }
            control::REF_I8 => {
                let handle = self.i8()?;
                let dis = self.read_str_chars(false)?;
                let id = Ref::from_handle(handle).id().to_string();
                Ok(Value::Ref(make_ref(id, dis)))
            }
            control::URI => Ok(Value::Uri(self.read_str(false)?)),
            control::DATE => self.read_date(),
            control::TIME => self.read_time(),
            control::DATE_TIME_I4 => {
                let secs = self.i4()?;
                self.read_datetime(EPOCH_SECS + secs as i64, 0)
            }
            control::DATE_TIME_I8 => {
                let nanos = self.i8()?;
                self.read_datetime(
                    EPOCH_SECS + nanos.div_euclid(1_000_000_000),
                    nanos.rem_euclid(1_000_000_000) as u32,
                )
            }
            control::COORD => {
                let bits = self.i8()?;
                Ok(Value::Coord(Coord::unpack(bits)?))
            }
            control::BUF => {
                let size = self.size()?;
                Ok(Value::Buf(self.consume(size)?.to_vec()))
            }
            control::DICT_EMPTY => Ok(Value::Dict(Dict::new())),
            control::DICT => self.read_dict_body(),
            control::LIST_EMPTY => Ok(Value::List(Vec::new())),
            control::LIST => self.read_list(),
            control::GRID => self.read_grid(),
            ctrl => Err(Error::UnsupportedControl { ctrl, pos }),
        }
    }

    /// Read one value and require it to be a dict.
    ///
    /// An ndarray special dict does not qualify; it decodes to a matrix.
    pub fn read_dict(&mut self) -> Result<Dict> {
        match self.read_val()? {
            Value::Dict(d) => Ok(d),
            other => Err(Error::TypeMismatch {
                expected: "Dict",
                found: other.type_name(),
            }),
        }
    }

    fn read_date(&mut self) -> Result<Value> {
        let y = self.i2()?;
        let m = self.u1()?;
        let d = self.u1()?;
        let date = chrono::NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32)
            .ok_or(Error::Decode { what: "date" })?;
        Ok(Value::Date(date))
    }

    fn read_time(&mut self) -> Result<Value> {
        let millis = self.u4()?;
        let h = (millis / 3_600_000) % 24;
        let m = (millis / 60_000) % 60;
        let s = (millis / 1000) % 60;
        let ms = millis % 1000;
        let time = chrono::NaiveTime::from_hms_milli_opt(h, m, s, ms)
            .ok_or(Error::Decode { what: "time" })?;
        Ok(Value::Time(time))
    }

    fn read_datetime(&mut self, unix_secs: i64, subsec_nanos: u32) -> Result<Value> {
        let tz = self.read_timezone()?;
        let utc = DateTime::from_timestamp(unix_secs, subsec_nanos)
            .ok_or(Error::Decode { what: "datetime" })?;
        Ok(Value::DateTime(utc.with_timezone(&tz)))
    }

    /// Resolve a wire timezone name against the IANA table.
    ///
    /// The wire carries the short form (e.g. `"New_York"`); any zone whose
    /// full name equals it or ends in `"/" + name` matches. Resolutions
    /// are interned per reader.
    fn read_timezone(&mut self) -> Result<Tz> {
        let name = self.read_str(false)?;
        if let Some(tz) = self.intern_tzs.get(&name) {
            return Ok(*tz);
        }
        let suffix = format!("/{name}");
        let tz = chrono_tz::TZ_VARIANTS
            .iter()
            .find(|tz| tz.name() == name || tz.name().ends_with(&suffix))
            .copied()
            .ok_or_else(|| Error::UnknownTimezone(name.clone()))?;
        self.intern_tzs.insert(name, tz);
        Ok(tz)
    }

    fn read_dict_body(&mut self) -> Result<Value> {
        self.expect('{')?;
        let count = self.size()?;
        let mut acc = Dict::with_capacity(count);
        for _ in 0..count {
            let tag = self.read_str(true)?;
            let val = self.read_val()?;
            acc.insert(tag, val);
        }
        self.expect('}')?;

        if acc.get("ndarray") == Some(&Value::Marker) {
            return self.dict_to_ndarray(&acc);
        }
        Ok(Value::Dict(acc))
    }

    /// Rewrite an `{ndarray: Marker, r, c, bytes}` dict as a matrix.
    ///
    /// The dimensions must be non-negative integers and the buffer
    /// exactly `r * c * 8` bytes; anything else is a type mismatch.
    fn dict_to_ndarray(&self, spec: &Dict) -> Result<Value> {
        let dim = |name: &str| {
            let val = spec.get(name);
            val.and_then(Value::as_i64)
                .and_then(|v| usize::try_from(v).ok())
                .ok_or(Error::TypeMismatch {
                    expected: "non-negative Number",
                    found: val.map_or("Null", Value::type_name),
                })
        };
        let rows = dim("r")?;
        let cols = dim("c")?;
        let val = spec.get("bytes");
        let bytes = val.and_then(Value::as_buf).ok_or(Error::TypeMismatch {
            expected: "Buf",
            found: val.map_or("Null", Value::type_name),
        })?;
        if bytes.len() != rows * cols * 8 {
            return Err(Error::TypeMismatch {
                expected: "r * c * 8 bytes",
                found: "Buf",
            });
        }
        let data = bytes
            .chunks_exact(8)
            .map(|c| f64::from_be_bytes(c.try_into().unwrap()))
            .collect();
        Ok(Value::NDArray(NDArray::new(rows, cols, data)?))
    }

    fn read_list(&mut self) -> Result<Value> {
        self.expect('[')?;
        let size = self.size()?;
        let mut acc = Vec::with_capacity(size);
        for _ in 0..size {
            acc.push(self.read_val()?);
        }
        self.expect(']')?;
        Ok(Value::List(acc))
    }

    fn read_grid(&mut self) -> Result<Value> {
        self.expect('<')?;
        let num_cols = self.size()?;
        let num_rows = self.size()?;

        let mut gb = GridBuilder::new();
        gb.set_meta(self.read_dict()?);
        for _ in 0..num_cols {
            let name = self.read_str(true)?;
            gb.add_col(name, self.read_dict()?)?;
        }
        for _ in 0..num_rows {
            let mut cells = Vec::with_capacity(num_cols);
            for _ in 0..num_cols {
                cells.push(self.read_val()?);
            }
            gb.add_row(cells)?;
        }
        self.expect('>')?;
        Ok(Value::Grid(gb.to_grid()))
    }

    /// Unit string following a number payload; empty means unitless.
    fn number(&mut self, val: f64) -> Result<Number> {
        let unit = self.read_str(false)?;
        if unit.is_empty() {
            Ok(Number::new(val))
        } else {
            Ok(Number::with_unit(val, unit))
        }
    }

    /// Tagged string: a pooled-reference prefix is rejected, the −1
    /// sentinel is followed by the character-counted payload.
    fn read_str(&mut self, intern: bool) -> Result<String> {
        let code = varint::decode(self.data, &mut self.pos)?;
        if code >= 0 {
            return Err(Error::ConstantPool { code });
        }
        self.read_str_chars(intern)
    }

    /// Character-counted string payload. The count is UTF-8 code points,
    /// not bytes; only the bytes belonging to those code points are
    /// consumed.
    fn read_str_chars(&mut self, intern: bool) -> Result<String> {
        let size = self.size()?;
        let start = self.pos;
        let mut end = start;
        for _ in 0..size {
            let first = *self.data.get(end).ok_or(Error::ShortBuffer {
                need: end - start + 1,
                have: self.data.len() - start,
            })?;
            end += match first {
                0x00..=0x7f => 1,
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                _ => return Err(Error::InvalidUtf8 { pos: end }),
            };
        }
        if end > self.data.len() {
            return Err(Error::ShortBuffer {
                need: end - start,
                have: self.data.len() - start,
            });
        }
        let s = std::str::from_utf8(&self.data[start..end])
            .map_err(|_| Error::InvalidUtf8 { pos: start })?
            .to_string();
        self.pos = end;
        if intern { Ok(self.intern(s)) } else { Ok(s) }
    }

    /// Replace with the first equal string previously seen.
    fn intern(&mut self, s: String) -> String {
        match self.intern_strs.get(&s) {
            Some(i) => i.clone(),
            None => {
                self.intern_strs.insert(s.clone());
                s
            }
        }
    }

    /// Non-negative varint as a size.
    fn size(&mut self) -> Result<usize> {
        let v = varint::decode(self.data, &mut self.pos)?;
        usize::try_from(v).map_err(|_| Error::Decode { what: "size" })
    }

    fn expect(&mut self, want: char) -> Result<()> {
        let pos = self.pos;
        let got = self.u1()?;
        if got != want as u8 {
            return Err(Error::UnexpectedByte { want, got, pos });
        }
        Ok(())
    }

    fn u1(&mut self) -> Result<u8> {
        Ok(self.consume(1)?[0])
    }

    fn i2(&mut self) -> Result<i16> {
        let b = self.consume(2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    fn i4(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.consume(4)?.try_into().unwrap()))
    }

    fn u4(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.consume(4)?.try_into().unwrap()))
    }

    fn i8(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.consume(8)?.try_into().unwrap()))
    }

    fn f8(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.consume(8)?.try_into().unwrap()))
    }

    fn consume(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.pos + n > self.data.len() {
            return Err(Error::ShortBuffer {
                need: n,
                have: self.avail(),
            });
        }
        let s = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(s)
    }
}

fn make_ref(id: String, dis: String) -> Ref {
    if dis.is_empty() {
        Ref::new(id)
    } else {
        Ref::with_dis(id, dis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::New_York;
    use chrono_tz::Europe::Warsaw;

    fn read(hex: &str) -> Value {
        BrioReader::new(&hex::decode(hex).unwrap())
            .read_val()
            .unwrap()
    }

    #[test]
    fn singletons() {
        assert_eq!(read("00"), Value::Null);
        assert_eq!(read("01"), Value::Marker);
        assert_eq!(read("02"), Value::Na);
        assert_eq!(read("03"), Value::Remove);
    }

    #[test]
    fn bools() {
        let data = [0x04, 0x05];
        let mut r = BrioReader::new(&data);
        assert_eq!(r.read_val().unwrap(), Value::Bool(false));
        assert_eq!(r.read_val().unwrap(), Value::Bool(true));
        assert_eq!(r.avail(), 0);
    }

    #[test]
    fn numbers() {
        assert_eq!(read("06000cff00"), Value::from(12));
        assert_eq!(read("07075bcd15ff00"), Value::from(123_456_789));
        assert_eq!(
            read("07075bcd15ff02c2b046"),
            Value::Number(Number::with_unit(123_456_789.0, "°F"))
        );
        assert_eq!(
            read("0840fe240c9fbe76c9ff02c2b046"),
            Value::Number(Number::with_unit(123_456.789, "°F"))
        );
    }

    #[test]
    fn number_boundaries() {
        assert_eq!(read("067fffff00"), Value::from(0x7fff));
        assert_eq!(read("0700008000ff00"), Value::from(0x7fff + 1));
        assert_eq!(read("068001ff00"), Value::from(-32767));
        assert_eq!(read("07ffff8000ff00"), Value::from(-32768));
        assert_eq!(read("077fffffffff00"), Value::from(0x7fff_ffff));
        assert_eq!(read("0841e0000000000000ff00"), Value::from(0x8000_0000));
        assert_eq!(read("0780000000ff00"), Value::from(-2_147_483_648));
        assert_eq!(read("08c1e0000000200000ff00"), Value::from(-2_147_483_649));
    }

    #[test]
    fn strings() {
        assert_eq!(read("09ff00"), Value::from(""));
        assert_eq!(read("09ff0161"), Value::from("a"));

        // Unicode surrounded by nulls, to prove the cursor lands exactly
        // after the counted characters.
        let data = hex::decode("0009ff05cebbe1bdb9ceb3cebfcf8200").unwrap();
        let mut r = BrioReader::new(&data);
        assert_eq!(r.read_val().unwrap(), Value::Null);
        assert_eq!(r.read_val().unwrap(), Value::from("λόγος"));
        assert_eq!(r.read_val().unwrap(), Value::Null);
        assert_eq!(r.avail(), 0);
    }

    #[test]
    fn refs() {
        assert_eq!(
            read("0aff03666f6f03466f6f"),
            Value::Ref(Ref::with_dis("foo", "Foo"))
        );
        let v = read("0b1deb31b87508b18700");
        assert_eq!(v, Value::Ref(Ref::new("1deb31b8-7508b187")));
        match v {
            Value::Ref(r) => assert_eq!(r.dis(), None),
            _ => unreachable!(),
        }
    }

    #[test]
    fn dates() {
        assert_eq!(
            read("0d07e50715"),
            Value::Date(chrono::NaiveDate::from_ymd_opt(2021, 7, 21).unwrap())
        );
    }

    #[test]
    fn times() {
        let t = |h, m, s, ms| {
            Value::Time(chrono::NaiveTime::from_hms_milli_opt(h, m, s, ms).unwrap())
        };
        assert_eq!(read("0e00000000"), t(0, 0, 0, 0));
        assert_eq!(read("0e02932dff"), t(11, 59, 59, 999));
        assert_eq!(read("0e05265bff"), t(23, 59, 59, 999));
    }

    #[test]
    fn datetimes() {
        let ny = |y, mo, d, h, mi, s| New_York.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap();

        // 2015-11-30T12:02:33.378-05:00 New_York
        assert_eq!(
            read("1006f83cbfe7d92c80ff084e65775f596f726b"),
            Value::DateTime(ny(2015, 11, 30, 12, 2, 33) + Duration::milliseconds(378))
        );
        // 2015-11-30T12:03:57-05:00 New_York
        assert_eq!(
            read("0f1def3dfdff084e65775f596f726b"),
            Value::DateTime(ny(2015, 11, 30, 12, 3, 57))
        );
        // 2015-11-30T12:03:57.000123-05:00 New_York
        assert_eq!(
            read("1006f83cd3601d8278ff084e65775f596f726b"),
            Value::DateTime(ny(2015, 11, 30, 12, 3, 57) + Duration::microseconds(123))
        );
        // 2000-01-01T00:00:00+01:00 Warsaw
        assert_eq!(
            read("0ffffff1f0ff06576172736177"),
            Value::DateTime(Warsaw.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap())
        );
        // 2000-01-01T00:00:00.832+01:00 Warsaw
        assert_eq!(
            read("10fffffcba00deb000ff06576172736177"),
            Value::DateTime(
                Warsaw.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()
                    + Duration::milliseconds(832)
            )
        );
        // 1999-06-07T01:02:00-04:00 New_York
        assert_eq!(
            read("0ffeee0ec8ff084e65775f596f726b"),
            Value::DateTime(ny(1999, 6, 7, 1, 2, 0))
        );
        // 1950-06-07T01:02:00-04:00 New_York
        assert_eq!(
            read("0fa2c36148ff084e65775f596f726b"),
            Value::DateTime(ny(1950, 6, 7, 1, 2, 0))
        );
        // 1950-06-07T01:02:00.123-04:00 New_York
        assert_eq!(
            read("10ea4aa7624f67a4c0ff084e65775f596f726b"),
            Value::DateTime(ny(1950, 6, 7, 1, 2, 0) + Duration::milliseconds(123))
        );
    }

    #[test]
    fn datetime_tz_is_resolved() {
        match read("0f1def3dfdff084e65775f596f726b") {
            Value::DateTime(dt) => assert_eq!(dt.timezone(), New_York),
            other => panic!("expected datetime, got {other:?}"),
        }
    }

    #[test]
    fn unknown_timezone() {
        // Valid datetime payload, tz name "Nowhere_On_Earth".
        let mut data = hex::decode("0f1def3dfd").unwrap();
        data.extend([0xff, 0x10]);
        data.extend(b"Nowhere_On_Earth");
        assert!(matches!(
            BrioReader::new(&data).read_val(),
            Err(Error::UnknownTimezone(name)) if name == "Nowhere_On_Earth"
        ));
    }

    #[test]
    fn coords() {
        assert_eq!(
            read("110a5f07800365c040"),
            Value::Coord(Coord::new(84_000_000, -123_000_000).unwrap())
        );
    }

    #[test]
    fn bufs() {
        assert_eq!(read("1304666f6f21"), Value::Buf(b"foo!".to_vec()));
    }

    #[test]
    fn dicts() {
        assert_eq!(read("14"), Value::Dict(Dict::new()));

        let mut want = Dict::new();
        want.insert("a".into(), 1.into());
        want.insert("b".into(), "B".into());
        assert_eq!(read("157b02ff0161060001ff00ff016209ff01427d"), Value::Dict(want.clone()));

        let mut nested = Dict::new();
        let mut inner = Dict::new();
        inner.insert("b".into(), "B".into());
        nested.insert("a".into(), 1.into());
        nested.insert("nested".into(), Value::Dict(inner));
        assert_eq!(
            read("157b02ff0161060001ff00ff066e6573746564157b01ff016209ff01427d7d"),
            Value::Dict(nested)
        );
    }

    #[test]
    fn lists() {
        assert_eq!(read("16"), Value::List(Vec::new()));
        assert_eq!(
            read("175b02060001ff00060002ff005d"),
            Value::List(vec![1.into(), 2.into()])
        );
    }

    #[test]
    fn grids() {
        match read("183c0000143e") {
            Value::Grid(g) => {
                assert!(g.is_empty());
                assert!(g.cols().is_empty());
                assert!(g.meta().is_empty());
            }
            other => panic!("expected grid, got {other:?}"),
        }

        let hex = "183c030214ff02763014ff02763114ff02763214060001ff00060002ff00\
                   060003ff00060004ff00060005ff00060006ff003e";
        match read(hex) {
            Value::Grid(g) => {
                assert_eq!(g.col_names(), ["v0", "v1", "v2"]);
                assert_eq!(g.size(), 2);
                assert_eq!(g.val(0, 0), &Value::from(1));
                assert_eq!(g.val(1, 2), &Value::from(6));
            }
            other => panic!("expected grid, got {other:?}"),
        }
    }

    #[test]
    fn ndarrays() {
        let hex = "157b04ff0172060002ff00ff0163060003ff00ff05627974657313303ff000000000000040000000000000004008000000000000401000000000000040140000000000004018000000000000ff076e646172726179017d";
        let want = NDArray::new(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(read(hex), Value::NDArray(want));
    }

    #[test]
    fn malformed_ndarray_dicts() {
        use crate::writer::BrioWriter;

        // Writers only special-case Value::NDArray, so a hand-built dict
        // carrying the marker goes out as a plain dict and exercises the
        // rewrite on decode.
        let encoded = |entries: &[(&str, Value)]| {
            let mut d = Dict::new();
            d.insert("ndarray".into(), Value::Marker);
            for (k, v) in entries {
                d.insert(k.to_string(), v.clone());
            }
            BrioWriter::to_bytes(&Value::Dict(d)).unwrap()
        };
        let buf48 = || Value::Buf(vec![0; 48]);

        let cases = [
            // Non-integer r.
            encoded(&[("r", "two".into()), ("c", 3.into()), ("bytes", buf48())]),
            // Fractional r.
            encoded(&[("r", 2.5.into()), ("c", 3.into()), ("bytes", buf48())]),
            // Negative c.
            encoded(&[("r", 2.into()), ("c", (-3).into()), ("bytes", buf48())]),
            // Missing c.
            encoded(&[("r", 2.into()), ("bytes", buf48())]),
            // Missing bytes.
            encoded(&[("r", 2.into()), ("c", 3.into())]),
            // Bytes of the wrong type.
            encoded(&[("r", 2.into()), ("c", 3.into()), ("bytes", "x".into())]),
            // Buffer shorter than r * c * 8.
            encoded(&[("r", 2.into()), ("c", 3.into()), ("bytes", Value::Buf(vec![0; 40]))]),
        ];
        for bytes in cases {
            assert!(matches!(
                BrioReader::new(&bytes).read_val(),
                Err(Error::TypeMismatch { .. })
            ));
        }
    }

    #[test]
    fn read_dict_rejects_other_types() {
        let data = [control::LIST_EMPTY];
        assert!(matches!(
            BrioReader::new(&data).read_dict(),
            Err(Error::TypeMismatch { expected: "Dict", .. })
        ));
    }

    #[test]
    fn reserved_controls_fail() {
        for ctrl in [control::XSTR, control::SYMBOL, 0x42] {
            let data = [ctrl];
            assert!(matches!(
                BrioReader::new(&data).read_val(),
                Err(Error::UnsupportedControl { ctrl: c, pos: 0 }) if c == ctrl
            ));
        }
    }

    #[test]
    fn constant_pool_rejected() {
        // A Str whose tagged string starts with a non-negative varint.
        let data = [control::STR, 0x05];
        assert!(matches!(
            BrioReader::new(&data).read_val(),
            Err(Error::ConstantPool { code: 5 })
        ));
    }

    #[test]
    fn short_buffer() {
        let data = [control::NUM_I2, 0x00];
        assert!(matches!(
            BrioReader::new(&data).read_val(),
            Err(Error::ShortBuffer { .. })
        ));
    }

    #[test]
    fn invalid_utf8() {
        // Character count 1 but the payload starts with a continuation
        // byte.
        let data = [control::STR, 0xff, 0x01, 0x80];
        assert!(matches!(
            BrioReader::new(&data).read_val(),
            Err(Error::InvalidUtf8 { .. })
        ));
    }

    #[test]
    fn truncated_multibyte_char() {
        let data = [control::STR, 0xff, 0x01, 0xce];
        assert!(matches!(
            BrioReader::new(&data).read_val(),
            Err(Error::ShortBuffer { .. })
        ));
    }
}
