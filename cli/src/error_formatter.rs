use deductor::DeductorError;

/// Format a DeductorError for the terminal, with a hint where one helps
pub fn format_error(error: &DeductorError) -> String {
    match error {
        DeductorError::Contradiction {
            name,
            rule,
            existing,
            deduced,
        } => {
            let spread = (deduced - existing).abs() / existing.abs().max(deduced.abs());
            format!(
                "Contradiction on '{}'\n  Known:    {}\n  Deduced:  {} by {}\n  Relative difference: {:.2}%\n  help: check the given values, or widen the tolerance with --tolerance",
                name,
                existing,
                deduced,
                rule,
                spread * 100.0
            )
        }
        DeductorError::UnknownVariable { .. } => {
            with_help(error, "run `deductor show <model>` to list its attributes")
        }
        DeductorError::DeducedNaN { .. } => with_help(
            error,
            "the given values admit no solution for this rule; check them for consistency",
        ),
        DeductorError::MissingInput { .. } => with_help(
            error,
            "give the missing values, or skip validation with --no-validate",
        ),
        DeductorError::NonConvergence { .. } => {
            with_help(error, "raise the limit with --max-passes")
        }
        _ => error.to_string(),
    }
}

fn with_help(error: &DeductorError, help: &str) -> String {
    format!("{}\n  help: {}", error, help)
}
