//! Local Shell
//!
//! Reads commands from a local stream with no authentication.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::protocol::{trim, Dispatcher};

/// Prompt printed before each line
pub const PROMPT: &str = "db>";

/// Line that ends the session
pub const EXIT: &str = "exit";

/// Run the shell until `exit` or end of input
///
/// Successful results print as text; failures print as
/// `Error executing query: <error>` and the loop continues.
pub fn run<R: BufRead, W: Write>(
    dispatcher: &Dispatcher,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let mut line = Vec::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            writeln!(output)?;
            break;
        }

        let query = trim(&line);
        if query == EXIT.as_bytes() {
            writeln!(output, "..\nbye!")?;
            break;
        }

        match dispatcher.execute(query) {
            Ok(response) => {
                output.write_all(&response.payload)?;
                writeln!(output)?;
            }
            Err(e) => writeln!(output, "Error executing query: {}", e)?,
        }
    }

    output.flush()?;
    Ok(())
}
