#![warn(missing_docs)]
/*! Codec and IPC loop for BRIO, the binary interchange format of the
Project Haystack data model.

BRIO is compact and self-describing: every value starts with a control
byte, lengths are varints, strings are counted in UTF-8 characters, and
tabular grids keep column order and metadata. This crate encodes and
decodes the full value model bit-compatibly with the peer implementations,
and runs the framed define/exec/eval instruction loop a host uses to drive
a co-process over TCP.

# Codec

```
use brio::{BrioReader, BrioWriter, Value};

let bytes = BrioWriter::to_bytes(&Value::from(12))?;
assert_eq!(bytes, [0x06, 0x00, 0x0c, 0xff, 0x00]);
assert_eq!(BrioReader::new(&bytes).read_val()?, Value::from(12));
# Ok::<(), brio::Error>(())
```

# Instruction loop

The companion binary binds a socket, waits for the host to connect,
checks the shared key, then processes instruction frames:

```text
$ brio --key secret --port 8888 --level debug
```

Each instruction is a dict carrying `def` (bind a variable), `exec` (run
statements) or `eval` (evaluate and reply with one frame). What the
source strings mean is up to the [`Evaluator`] the loop is given.
*/

pub mod control;
pub mod frame;
pub mod grid;
pub mod reader;
pub mod session;
pub mod value;
pub mod varint;
pub mod writer;

pub use grid::{Grid, GridBuilder, GridCol};
pub use reader::BrioReader;
pub use session::{Env, Evaluator, IpcServer, Session, VarEvaluator};
pub use value::{Coord, Dict, NDArray, Number, Ref, Value};
pub use writer::BrioWriter;

/// Crate-wide error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input ended inside a value.
    #[error("short buffer: need {need} more bytes, have {have}")]
    ShortBuffer {
        /// Bytes the current field still needs.
        need: usize,
        /// Bytes actually remaining.
        have: usize,
    },

    /// Control byte with no implemented variant (including the reserved
    /// XStr and Symbol codes).
    #[error("unsupported control byte {ctrl:#04x} at position {pos}")]
    UnsupportedControl {
        /// The offending byte.
        ctrl: u8,
        /// Cursor position of the byte.
        pos: usize,
    },

    /// A pooled string reference; this codec does not implement the
    /// constant pool.
    #[error("constant pool not supported: code {code}")]
    ConstantPool {
        /// The pool index that was encountered.
        code: i64,
    },

    /// String payload is not valid UTF-8.
    #[error("invalid utf-8 at position {pos}")]
    InvalidUtf8 {
        /// Cursor position of the offending byte.
        pos: usize,
    },

    /// Wire timezone name matches nothing in the IANA table.
    #[error("timezone not found: {0}")]
    UnknownTimezone(String),

    /// A value of the wrong variant where a specific one is required.
    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        /// Required variant.
        expected: &'static str,
        /// Variant actually present.
        found: &'static str,
    },

    /// A field that decoded to a nonsensical value.
    #[error("invalid {what} on wire")]
    Decode {
        /// Which field.
        what: &'static str,
    },

    /// Framing byte (brace, bracket, angle) missing where required.
    #[error("expected {want:?} at position {pos}, got {got:#04x}")]
    UnexpectedByte {
        /// Required literal.
        want: char,
        /// Byte actually read.
        got: u8,
        /// Cursor position of the byte.
        pos: usize,
    },

    /// Grid column name violates the tagname rule.
    #[error("invalid column name: {0}")]
    InvalidTagname(String),

    /// Grid column name used twice.
    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    /// Column metadata addressed a column that does not exist.
    #[error("column not found: {0}")]
    UnknownColumn(String),

    /// Column added after the first row froze the column set.
    #[error("cannot add columns after adding rows")]
    ColumnsFrozen,

    /// Row with the wrong number of cells.
    #[error("row has {cells} cells for {cols} columns")]
    RowLength {
        /// Cells in the rejected row.
        cells: usize,
        /// Columns in the grid.
        cols: usize,
    },

    /// Coordinate outside the valid micro-degree range.
    #[error("invalid {axis}: {val}")]
    CoordRange {
        /// Which axis.
        axis: &'static str,
        /// Offending micro-degrees.
        val: i32,
    },

    /// Unparseable `C(lat,lng)` string.
    #[error("invalid coord string: {0}")]
    CoordParse(String),

    /// Matrix dimensions do not match its cell count.
    #[error("cannot encode {rows}x{cols} array with {len} cells")]
    ShapeUnsupported {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
        /// Cells actually present.
        len: usize,
    },

    /// Value the wire format cannot carry (strict mode only; lenient
    /// writers coerce to the display string).
    #[error("cannot encode {what}")]
    EncodeUnsupported {
        /// Description of the value.
        what: String,
    },

    /// Auth key mismatch on the first frame.
    #[error("invalid api key")]
    AuthFailed,

    /// Stream closed where a frame was required.
    #[error("connection closed")]
    Closed,

    /// Evaluator-side failure.
    #[error("eval error: {0}")]
    Eval(String),

    /// Socket or stream error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result.
pub type Result<T> = std::result::Result<T, Error>;
