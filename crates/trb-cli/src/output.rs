use serde::Serialize;
use trb_core::responses::ErrorResponse;
use trb_db::error::EngineError;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Error envelope for a failed command.
///
/// Engine errors keep their kind and status even when wrapped in context;
/// anything else is reported as an internal error with the full chain.
pub fn error_response(error: &anyhow::Error) -> ErrorResponse {
    error.downcast_ref::<EngineError>().map_or_else(
        || ErrorResponse {
            kind: "internal".into(),
            status: 500,
            message: format!("{error:#}"),
        },
        EngineError::to_response,
    )
}

/// Print the error envelope to stderr.
pub fn print_error(error: &anyhow::Error) {
    let response = error_response(error);
    match serde_json::to_string_pretty(&response) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("trb error: {error:#}"),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn raw_is_compact_and_json_is_pretty() {
        let value = json!({"id": "apl-1", "status": "filed"});
        assert_eq!(
            render(&value, OutputFormat::Raw).unwrap(),
            r#"{"id":"apl-1","status":"filed"}"#
        );
        assert!(render(&value, OutputFormat::Json).unwrap().contains("\n  \"id\""));
    }

    #[test]
    fn engine_errors_keep_kind_through_context() {
        let error = Err::<(), _>(EngineError::VotingNotFound("vtg-1".into()))
            .context("closing voting")
            .unwrap_err();
        let response = error_response(&error);
        assert_eq!(response.kind, "voting_not_found");
        assert_eq!(response.status, 404);
    }

    #[test]
    fn other_errors_are_internal() {
        let response = error_response(&anyhow::anyhow!("disk on fire"));
        assert_eq!(response.kind, "internal");
        assert_eq!(response.status, 500);
        assert_eq!(response.message, "disk on fire");
    }
}
