//! Co-process entry point.
//!
//! Binds the listen socket, waits for the host to connect, then runs the
//! BRIO instruction loop until the host closes the connection. Exits
//! nonzero on auth failure or any uncaught decode error.
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::info;

use brio::{IpcServer, VarEvaluator};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, short, default_value_t = 8888)]
    port: u16,

    #[arg(long, short, help = "Expected auth key")]
    key: String,

    #[arg(long, short, default_value_t = 10, help = "Accept timeout in seconds")]
    timeout: u64,

    #[arg(long, value_enum, default_value = "warn")]
    level: Level,
}

#[derive(Copy, Clone, Debug, PartialEq, clap::ValueEnum)]
enum Level {
    Warn,
    Info,
    Debug,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    let verbosity: usize = match opt.level {
        Level::Warn => 1,
        Level::Info => 2,
        Level::Debug => 3,
    };
    stderrlog::new()
        .module(module_path!())
        .module("brio")
        .verbosity(verbosity)
        .timestamp(stderrlog::Timestamp::Second)
        .init()?;

    let server = IpcServer::bind(
        &opt.host,
        opt.port,
        &opt.key,
        Duration::from_secs(opt.timeout),
    )?;
    server.run(&mut VarEvaluator)?;
    info!("exiting");
    Ok(())
}
