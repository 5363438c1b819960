use std::io::Write;

use chrono::Utc;
use tracing::{error, info};

use crate::RecorderError;

fn write_banner<W: Write>(
    out: &mut W,
    heading: &str,
    detail: Option<&str>,
    fields: &[(&str, &str)],
) -> Result<(), RecorderError> {
    writeln!(out, "{}", heading)?;
    if let Some(detail) = detail {
        writeln!(out, "  {}", detail)?;
    }
    for (name, value) in fields {
        writeln!(out, "  {}: {}", name, value)?;
    }
    out.flush()?;

    Ok(())
}

/// Tells the operator something worked, and records it in the log.
pub fn log_info<W: Write>(
    out: &mut W,
    title: &str,
    fields: Vec<(&str, &str)>,
) -> Result<(), RecorderError> {
    info!("ℹ️ {}\n\n{:#?}", title, fields);

    let now_string = Utc::now().to_rfc2822();
    let mut fields: Vec<(&str, &str)> = fields;
    fields.push(("Happened at", &now_string));

    write_banner(out, &format!("ℹ️ {}", title), None, &fields)
}

/// Shows the operator an error banner, and records it in the log.
pub fn log_error<W: Write>(
    out: &mut W,
    title: &str,
    fields: Vec<(&str, &str)>,
) -> Result<(), RecorderError> {
    error!("⚠️ {}\n\n{:#?}", title, fields);

    let now_string = Utc::now().to_rfc2822();
    let mut fields: Vec<(&str, &str)> = fields;
    fields.push(("Seen at", &now_string));

    write_banner(
        out,
        "⚠️ Something went wrong!",
        Some(&format!("{}. Nothing was lost, you can try again.", title)),
        &fields,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_banner_lists_fields() {
        let mut out = Vec::new();

        log_error(&mut out, "Could not save the game", vec![("Cause", "status 500")]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("⚠️ Something went wrong!"));
        assert!(text.contains("Could not save the game"));
        assert!(text.contains("  Cause: status 500"));
        assert!(text.contains("  Seen at: "));
    }

    #[test]
    fn info_banner_has_a_timestamp() {
        let mut out = Vec::new();

        log_info(&mut out, "Game saved", vec![]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("ℹ️ Game saved"));
        assert!(text.contains("Happened at: "));
    }
}
