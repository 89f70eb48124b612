//! ChromoDB CLI Client
//!
//! Command-line interface for a running ChromoDB server (plain TCP).

use std::io::{self, BufRead, Write};

use chromodb::network::{Client, Credentials};
use clap::Parser;

/// ChromoDB CLI
#[derive(Parser, Debug)]
#[command(name = "chromodb-cli")]
#[command(about = "CLI for the ChromoDB key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7676")]
    server: String,

    /// Username
    #[arg(short, long)]
    user: String,

    /// Password
    #[arg(short, long)]
    pass: String,

    /// Command to run, e.g. `GET->name`; reads commands from stdin if omitted
    command: Option<String>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> chromodb::Result<()> {
    let credentials = Credentials::new(args.user, args.pass);
    let mut client = Client::connect(args.server.as_str(), &credentials)?;

    if let Some(command) = args.command {
        println!("{}", client.execute_str(&command)?);
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        writeln!(stdout, "{}", client.execute_str(&line)?)?;
        stdout.flush()?;
    }

    Ok(())
}
