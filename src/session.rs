//! The framed instruction loop.
//!
//! One connection at a time: accept, authenticate, then process lists of
//! instruction dicts against a per-connection variable environment until
//! the peer closes the stream. Replies (one per `eval`) go out in the
//! order the instructions arrived; `def` and `exec` produce no reply.
//!
//! The expression language behind `exec`/`eval` is an embedder concern,
//! abstracted as [`Evaluator`]. [`VarEvaluator`] is the minimal built-in
//! used by the shipped binary.

use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::frame::{read_frame, write_frame};
use crate::reader::BrioReader;
use crate::value::{Dict, Value};
use crate::writer::BrioWriter;
use crate::{Error, Result};

/// Per-connection variable environment.
pub type Env = HashMap<String, Value>;

/// The host evaluator behind `exec` and `eval` instructions.
///
/// The codec neither parses nor interprets the source strings; it hands
/// them to this trait together with the connection's environment.
pub trait Evaluator {
    /// Execute statements. Mutates the environment, produces no value.
    fn exec(&mut self, source: &str, env: &mut Env) -> Result<()>;

    /// Evaluate an expression to a value.
    fn eval(&mut self, source: &str, env: &mut Env) -> Result<Value>;
}

/// Built-in minimal evaluator: `eval` looks up a bare variable name and
/// `exec` handles `name = other` assignments. Anything richer belongs to
/// the embedder.
pub struct VarEvaluator;

impl Evaluator for VarEvaluator {
    fn exec(&mut self, source: &str, env: &mut Env) -> Result<()> {
        match source.split_once('=') {
            Some((lhs, rhs)) => {
                let val = lookup(env, rhs.trim())?;
                env.insert(lhs.trim().to_string(), val);
                Ok(())
            }
            None => Err(Error::Eval(format!("cannot execute: {source}"))),
        }
    }

    fn eval(&mut self, source: &str, env: &mut Env) -> Result<Value> {
        lookup(env, source.trim())
    }
}

fn lookup(env: &Env, name: &str) -> Result<Value> {
    env.get(name)
        .cloned()
        .ok_or_else(|| Error::Eval(format!("undefined variable: {name}")))
}

/// One authenticated connection over any byte stream.
pub struct Session<S: Read + Write> {
    stream: S,
    key: String,
}

impl<S: Read + Write> Session<S> {
    /// Wrap a connected stream with the expected auth key.
    pub fn new(stream: S, key: impl Into<String>) -> Session<S> {
        Session {
            stream,
            key: key.into(),
        }
    }

    /// Authenticate, then process instruction frames until the peer
    /// closes the stream.
    pub fn run(&mut self, evaluator: &mut impl Evaluator) -> Result<()> {
        self.auth()?;
        let mut env = Env::new();
        while let Some(frame) = read_frame(&mut self.stream)? {
            let instrs = match BrioReader::new(&frame).read_val()? {
                Value::List(l) => l,
                other => {
                    return Err(Error::TypeMismatch {
                        expected: "List",
                        found: other.type_name(),
                    });
                }
            };
            for instr in instrs {
                match instr {
                    Value::Dict(d) => self.dispatch(d, &mut env, evaluator)?,
                    other => {
                        return Err(Error::TypeMismatch {
                            expected: "Dict",
                            found: other.type_name(),
                        });
                    }
                }
            }
        }
        debug!("peer closed, session done");
        Ok(())
    }

    /// First frame must be `{key: <str>}` matching the configured key;
    /// the reply is `{ok}`. On mismatch the connection dies with no
    /// reply.
    fn auth(&mut self) -> Result<()> {
        let frame = read_frame(&mut self.stream)?.ok_or(Error::Closed)?;
        let auth = BrioReader::new(&frame).read_dict()?;
        match auth.get("key").and_then(Value::as_str) {
            Some(k) if k == self.key => {
                debug!("auth ok");
                let mut ok = Dict::new();
                ok.insert("ok".into(), Value::Marker);
                self.send(&Value::Dict(ok))
            }
            _ => Err(Error::AuthFailed),
        }
    }

    fn dispatch(
        &mut self,
        instr: Dict,
        env: &mut Env,
        evaluator: &mut impl Evaluator,
    ) -> Result<()> {
        if let Some(def) = instr.get("def") {
            let name = def.as_str().ok_or(Error::TypeMismatch {
                expected: "Str",
                found: def.type_name(),
            })?;
            let val = instr.get("v").cloned().unwrap_or(Value::Null);
            debug!("def {name}");
            env.insert(name.to_string(), val);
        }
        if let Some(src) = instr.get("exec") {
            let src = src.as_str().ok_or(Error::TypeMismatch {
                expected: "Str",
                found: src.type_name(),
            })?;
            debug!("exec {src}");
            evaluator.exec(src, env)?;
        } else if let Some(src) = instr.get("eval") {
            let src = src.as_str().ok_or(Error::TypeMismatch {
                expected: "Str",
                found: src.type_name(),
            })?;
            let result = evaluator.eval(src, env)?;
            debug!("eval {src} => {result}");
            self.send(&result)?;
        } else if !instr.contains_key("def") {
            warn!("instruction carries none of def/exec/eval, skipping");
        }
        Ok(())
    }

    fn send(&mut self, val: &Value) -> Result<()> {
        write_frame(&mut self.stream, &BrioWriter::to_bytes(val)?)
    }
}

/// Single-connection TCP server around [`Session`].
pub struct IpcServer {
    listener: TcpListener,
    key: String,
    timeout: Duration,
}

impl IpcServer {
    /// Bind the listen socket. The timeout applies to the initial accept
    /// only; mid-session reads block until the peer closes.
    pub fn bind(host: &str, port: u16, key: &str, timeout: Duration) -> Result<IpcServer> {
        let listener = TcpListener::bind((host, port))?;
        info!("listening on {}", listener.local_addr()?);
        Ok(IpcServer {
            listener,
            key: key.to_string(),
            timeout,
        })
    }

    /// The bound address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept one connection and run its session to completion.
    pub fn run(self, evaluator: &mut impl Evaluator) -> Result<()> {
        let stream = self.accept()?;
        Session::new(stream, self.key).run(evaluator)
    }

    fn accept(&self) -> Result<TcpStream> {
        // std has no native accept timeout; poll a nonblocking accept
        // until the deadline.
        self.listener.set_nonblocking(true)?;
        let deadline = Instant::now() + self.timeout;
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    debug!("accepted connection from {peer}");
                    stream.set_nonblocking(false)?;
                    return Ok(stream);
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if Instant::now() >= deadline {
                        return Err(std::io::Error::new(
                            ErrorKind::TimedOut,
                            "no connection before accept timeout",
                        )
                        .into());
                    }
                    std::thread::sleep(Duration::from_millis(20));
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
