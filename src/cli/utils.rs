use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// How a crewctl step went. Text output is one line per step; JSON output is
/// one object per step so scripts can read the seed report line by line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed(&'static str),
}

/// Render one step as text or as a JSON object with `fields` merged in
pub fn render(output_format: &OutputFormat, outcome: Outcome, message: &str, fields: Value) -> anyhow::Result<String> {
    Ok(match output_format {
        OutputFormat::Text => match outcome {
            Outcome::Done => format!("✓ {}", message),
            Outcome::Failed(code) => format!("✗ [{}] {}", code, message),
        },
        OutputFormat::Json => {
            let mut line = Map::new();
            line.insert("ok".to_string(), json!(outcome == Outcome::Done));
            line.insert("message".to_string(), json!(message));
            if let Outcome::Failed(code) = outcome {
                line.insert("error_code".to_string(), json!(code));
            }
            if let Value::Object(extra) = fields {
                line.extend(extra);
            }
            serde_json::to_string(&Value::Object(line))?
        }
    })
}

/// Print a step: successes to stdout, failures to stderr
pub fn report(output_format: &OutputFormat, outcome: Outcome, message: &str, fields: Value) -> anyhow::Result<()> {
    let line = render(output_format, outcome, message, fields)?;
    match outcome {
        Outcome::Done => println!("{}", line),
        Outcome::Failed(_) => eprintln!("{}", line),
    }
    Ok(())
}
