//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use mecha_core::Payload;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a response payload. No content prints nothing.
pub fn payload(payload: &Payload) -> Result<()> {
    match payload {
        Payload::Json(value) => json_pretty(value),
        Payload::Text(text) => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Payload::NoContent => Ok(()),
    }
}
