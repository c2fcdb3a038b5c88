use crate::FireguardError;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// Level comes from `RUST_LOG`, defaulting to `info`. Fails if a global
/// subscriber is already set.
pub fn init_logging(json: bool) -> Result<(), FireguardError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| FireguardError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // Another test in this binary may have installed it first
        let _ = init_logging(false);
        assert!(matches!(init_logging(true), Err(FireguardError::Logging(_))));
    }
}
