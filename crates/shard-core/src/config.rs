use std::path::PathBuf;

use shard_model::BatchSize;

use crate::error::CoreError;

/// Engine-facing parameters forwarded on every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunParams {
    /// Browser the engine should use, engine default when `None`.
    pub browser: Option<String>,
    pub headed: bool,
    /// Extra arguments appended verbatim to the engine command line.
    pub extra_args: Vec<String>,
}

/// Resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum specs per claim in batched mode.
    pub batch_size: BatchSize,
    /// Project root; absolute spec paths reported by the engine are made relative to it.
    pub spec_root: Option<PathBuf>,
    /// Byte cap for captured output per batch, `0` for unbounded.
    pub output_limit: usize,
    pub params: RunParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: BatchSize::ONE,
            spec_root: None,
            output_limit: 4 * 1024 * 1024,
            params: RunParams::default(),
        }
    }
}

impl RunConfig {
    pub fn with_batch_size(mut self, n: usize) -> Result<Self, CoreError> {
        self.batch_size = BatchSize::new(n)?;
        Ok(self)
    }

    pub fn with_spec_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.spec_root = Some(root.into());
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(root) = &self.spec_root
            && root.as_os_str().is_empty()
        {
            return Err(CoreError::InvalidConfig("spec root is empty".into()));
        }
        if self.params.extra_args.iter().any(|a| a.is_empty()) {
            return Err(CoreError::InvalidConfig(
                "extra engine arguments must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_batch_size_is_invalid() {
        let err = RunConfig::default().with_batch_size(0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn default_is_valid() {
        let cfg = RunConfig::default().with_batch_size(5).unwrap();
        assert_eq!(cfg.batch_size.get(), 5);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_extra_arg_is_rejected() {
        let mut cfg = RunConfig::default();
        cfg.params.extra_args.push(String::new());
        assert!(cfg.validate().is_err());
    }
}
