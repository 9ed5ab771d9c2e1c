use thiserror::Error;

/// Failures while installing the runner's tracing subscriber.
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?}, use text, json or journald")]
    InvalidFormat(String),
    #[error("journald logging needs Linux and the `journald` feature")]
    JournaldNotSupported,
    #[error("a global tracing subscriber is already installed")]
    AlreadyInitialized,
    #[error("cannot install tracing subscriber: {0}")]
    InitializationFailed(String),
    #[error("invalid log filter {0:?}, expected directives like `info` or `shard=debug`")]
    InvalidLogLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = LoggerError::InvalidFormat("xml".into());
        assert_eq!(err.to_string(), r#"unknown log format "xml", use text, json or journald"#);
        assert!(LoggerError::InvalidLogLevel("shard=loud".into())
            .to_string()
            .contains(r#""shard=loud""#));
    }
}
