//! Human-readable error descriptions and structured JSON error formatting.

use chew_core::ChewError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<ChewError>() {
        return match ce {
            ChewError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: A typo or out-of-range value in the TOML, or a --config path that does not exist.\nHow to fix: Edit the config file (see etc/chew_config.toml), then rerun."
            ),
            ChewError::InvalidTransition { intent, view } => format!(
                "What happened: {intent} cannot be used on the {view} screen.\nLikely causes: Commands sent out of order.\nHow to fix: Follow start, snap, go, end, home."
            ),
            ChewError::Busy(what) => format!(
                "What happened: The session is busy ({what}).\nLikely causes: A photo is still being analyzed.\nHow to fix: Wait for the analysis, or send `home` to abandon it."
            ),
        };
    }

    // String-based heuristics for errors coming from I/O
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read image") {
        return format!(
            "What happened: The meal photo could not be read.\nLikely causes: Wrong path or missing permissions.\nHow to fix: Pass an existing JPEG with --image. Original: {msg}"
        );
    }

    if lower.contains("logging") || lower.contains("log file") {
        return format!(
            "What happened: Logging could not be set up.\nLikely causes: [logging].file points to a directory that cannot be written.\nHow to fix: Fix or remove [logging].file in the config. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// 3 for configuration problems, 1 for everything else. Clap uses 2 for usage errors.
pub fn exit_code_for_error(err: &eyre::Report) -> u8 {
    if matches!(err.downcast_ref::<ChewError>(), Some(ChewError::Config(_))) {
        return 3;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match err.downcast_ref::<ChewError>() {
        Some(ChewError::Config(_)) => "InvalidConfig",
        Some(ChewError::InvalidTransition { .. }) => "InvalidTransition",
        Some(ChewError::Busy(_)) => "Busy",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
