/// Errors that can occur while configuring the metric pipeline.
///
/// All variants are configuration errors: they surface at agent startup when
/// a plugin is bound, and are never retried.
///
/// # Examples
///
/// ```rust
/// use relaymon_pipeline::filter::Filter;
///
/// let filter = Filter {
///     name_pass: vec!["cpu[".to_string()],
///     ..Filter::default()
/// };
/// let err = filter.compile().unwrap_err();
/// assert!(err.to_string().contains("cpu["));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A filter glob pattern failed to compile.
    #[error("Pipeline: invalid filter pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// An input configuration file could not be read.
    #[error("Pipeline: failed to read configuration '{path}': {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An input configuration file could not be parsed.
    #[error("Pipeline: invalid input configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

/// Convenience `Result` alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
