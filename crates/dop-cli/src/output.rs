use atty::Stream;
use color_eyre::Result;
use serde_json::Value;

use crate::outcome::{
    format_status_message, to_json_response, CommandName, CommandStatus, ExecutionOutcome,
};
use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn emit_output(
    opts: &OutputOptions,
    name: CommandName,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = outcome.exit_code();

    if opts.json {
        let payload = to_json_response(name, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    if let CommandStatus::Ok = outcome.status {
        if !opts.quiet {
            let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
            for line in render_success(&style, name, outcome) {
                println!("{line}");
            }
        }
    } else {
        let style = Style::new(opts.no_color, atty::is(Stream::Stderr));
        for line in render_error(&style, name, outcome) {
            eprintln!("{line}");
        }
    }

    Ok(code)
}

fn render_success(style: &Style, name: CommandName, outcome: &ExecutionOutcome) -> Vec<String> {
    let details = &outcome.details;
    match name {
        CommandName::Get => details
            .get("operator")
            .and_then(Value::as_str)
            .map(|text| vec![text.to_string()])
            .unwrap_or_default(),
        CommandName::Keys => details
            .get("keys")
            .and_then(Value::as_array)
            .map(|keys| {
                keys.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        CommandName::Locate => {
            let mut lines = vec![style.status(
                &outcome.status,
                &format_status_message(name, &outcome.message),
            )];
            let artifact = details.get("artifact");
            if let Some(path) = artifact.and_then(|a| a.get("path")).and_then(Value::as_str) {
                lines.push(format!("  {} {}", style.label("path:"), style.info(path)));
            }
            if let Some(path) = artifact
                .and_then(|a| a.get("shadowed"))
                .and_then(Value::as_str)
            {
                lines.push(format!("  {} {}", style.label("ignored:"), style.info(path)));
            }
            lines
        }
        CommandName::Check => vec![style.status(
            &outcome.status,
            &format_status_message(name, &outcome.message),
        )],
    }
}

fn render_error(style: &Style, name: CommandName, outcome: &ExecutionOutcome) -> Vec<String> {
    let details = &outcome.details;
    let code = details.get("code").and_then(Value::as_str).unwrap_or("DOP");
    let header = format!(
        "{code}  {}",
        format_status_message(name, &outcome.message)
    );
    let mut lines = vec![style.error_header(&outcome.status, &header), String::new()];
    lines.push("Why:".to_string());
    for reason in collect_why_bullets(details, &outcome.message) {
        lines.push(format!("  • {reason}"));
    }
    let fixes = collect_fix_bullets(details);
    if !fixes.is_empty() {
        lines.push(String::new());
        lines.push("Fix:".to_string());
        for fix in fixes {
            lines.push(style.fix_bullet(&format!("  • {fix}")));
        }
    }
    lines
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn collect_why_bullets(details: &Value, fallback: &str) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        push_unique(
            &mut bullets,
            reason_display(reason).unwrap_or(reason).to_string(),
        );
    }
    if let Some(issues) = details
        .get("issues")
        .or_else(|| details.get("failures"))
        .and_then(Value::as_array)
    {
        for entry in issues {
            match entry {
                Value::String(message) => push_unique(&mut bullets, message.to_string()),
                Value::Object(map) => {
                    let message = map
                        .get("error")
                        .and_then(Value::as_str)
                        .unwrap_or_default();
                    if message.is_empty() {
                        continue;
                    }
                    if let Some(key) = map.get("key").and_then(Value::as_str) {
                        push_unique(&mut bullets, format!("{key}: {message}"));
                    } else {
                        push_unique(&mut bullets, message.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    if bullets.is_empty() {
        bullets.push(fallback.to_string());
    }
    bullets
}

fn collect_fix_bullets(details: &Value) -> Vec<String> {
    let mut fixes = Vec::new();
    if let Some(hint) = hint_from_details(details) {
        push_unique(&mut fixes, hint.to_string());
    }
    if fixes.is_empty() {
        fixes.push("Re-run with --help for usage or -v for more detail.".to_string());
    }
    fixes
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "unknown_key" => Some("No artifact or placeholder exists for this key."),
        "unavailable" => Some("The key is valid but its data has not been fetched."),
        "invalid_key" => Some("The key does not have the shape this dataset uses."),
        "unknown_dataset" => Some("Only bkp, btp and hks are known."),
        "malformed_expression" => Some("The stored operator text could not be parsed."),
        "check_failed" => Some("Some stored operators could not be parsed."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn why_bullets_map_reasons_and_collect_failures() {
        let details = json!({
            "reason": "check_failed",
            "failures": [
                { "key": "1.1", "code": "DOP200", "error": "bad" },
                { "key": "1.1", "code": "DOP200", "error": "bad" },
                "loose note"
            ]
        });
        let bullets = collect_why_bullets(&details, "fallback");
        assert_eq!(
            bullets,
            [
                "Some stored operators could not be parsed.",
                "1.1: bad",
                "loose note"
            ]
        );
    }

    #[test]
    fn why_falls_back_to_the_message() {
        assert_eq!(collect_why_bullets(&json!({}), "boom"), ["boom"]);
    }

    #[test]
    fn fix_bullets_prefer_the_hint() {
        let fixes = collect_fix_bullets(&json!({ "hint": "run `dop keys bkp`" }));
        assert_eq!(fixes, ["run `dop keys bkp`"]);
        assert_eq!(collect_fix_bullets(&json!({})).len(), 1);
    }

    #[test]
    fn success_rendering_prints_raw_payloads() {
        let style = Style::new(true, false);
        let get = ExecutionOutcome::success("13.3754", json!({ "operator": "t^2*D + 3" }));
        assert_eq!(
            render_success(&style, CommandName::Get, &get),
            ["t^2*D + 3"]
        );
        let keys = ExecutionOutcome::success("2 keys", json!({ "keys": ["1.1", "1.2"] }));
        assert_eq!(
            render_success(&style, CommandName::Keys, &keys),
            ["1.1", "1.2"]
        );
    }

    #[test]
    fn locate_lists_the_artifact_paths() {
        let style = Style::new(true, false);
        let outcome = ExecutionOutcome::success(
            "2.2 is plain",
            json!({
                "artifact": {
                    "state": "plain",
                    "path": "/data/btp/dop.2.2",
                    "shadowed": "/data/btp/dop.2.2.xz"
                }
            }),
        );
        assert_eq!(
            render_success(&style, CommandName::Locate, &outcome),
            [
                "✔ dop locate: 2.2 is plain",
                "  path: /data/btp/dop.2.2",
                "  ignored: /data/btp/dop.2.2.xz"
            ]
        );
    }

    #[test]
    fn error_rendering_leads_with_the_code() {
        let style = Style::new(true, false);
        let outcome = ExecutionOutcome::user_error(
            "unknown key 9.9",
            json!({ "code": "DOP100", "reason": "unknown_key" }),
        );
        let lines = render_error(&style, CommandName::Get, &outcome);
        assert_eq!(lines[0], "DOP100  dop get: unknown key 9.9");
        assert!(lines.iter().any(|l| l.contains("No artifact")));
        assert!(lines.iter().any(|l| l == "Fix:"));
    }
}
