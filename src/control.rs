//! BRIO control bytes.
//!
//! Every encoded value starts with one of these bytes; it selects the
//! variant and therefore the layout of the payload that follows.

/// Null, no payload.
pub const NULL: u8 = 0x00;
/// Marker sentinel, no payload.
pub const MARKER: u8 = 0x01;
/// NA sentinel, no payload.
pub const NA: u8 = 0x02;
/// Remove sentinel, no payload.
pub const REMOVE: u8 = 0x03;
/// Boolean false, no payload.
pub const FALSE: u8 = 0x04;
/// Boolean true, no payload.
pub const TRUE: u8 = 0x05;
/// Number as i16 BE plus unit string.
pub const NUM_I2: u8 = 0x06;
/// Number as i32 BE plus unit string.
pub const NUM_I4: u8 = 0x07;
/// Number as f64 BE plus unit string.
pub const NUM_F8: u8 = 0x08;
/// Tagged string.
pub const STR: u8 = 0x09;
/// Ref as tagged string id plus raw dis string.
pub const REF_STR: u8 = 0x0a;
/// Ref as packed i64 handle plus raw dis string.
pub const REF_I8: u8 = 0x0b;
/// URI as tagged string.
pub const URI: u8 = 0x0c;
/// Date as i16 BE year, u8 month, u8 day.
pub const DATE: u8 = 0x0d;
/// Time as u32 BE milliseconds of day.
pub const TIME: u8 = 0x0e;
/// DateTime as i32 BE seconds since the epoch, plus tagged timezone.
pub const DATE_TIME_I4: u8 = 0x0f;
/// DateTime as i64 BE nanoseconds since the epoch, plus tagged timezone.
pub const DATE_TIME_I8: u8 = 0x10;
/// Coord as packed i64 BE.
pub const COORD: u8 = 0x11;
/// Reserved. Never encoded, and the decoder rejects it.
pub const XSTR: u8 = 0x12;
/// Buffer as varint size plus raw bytes.
pub const BUF: u8 = 0x13;
/// Empty dict, no payload.
pub const DICT_EMPTY: u8 = 0x14;
/// Dict as `{`, varint count, entries, `}`.
pub const DICT: u8 = 0x15;
/// Empty list, no payload.
pub const LIST_EMPTY: u8 = 0x16;
/// List as `[`, varint size, values, `]`.
pub const LIST: u8 = 0x17;
/// Grid as `<`, varint cols, varint rows, meta, columns, cells, `>`.
pub const GRID: u8 = 0x18;
/// Reserved. Never encoded, and the decoder rejects it.
pub const SYMBOL: u8 = 0x19;
