use std::fmt;

/// Error returned by a [`Sink`](super::Sink) operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
    /// A backend-specific failure carrying only a message.
    #[error("{0}")]
    Sink(String),
    /// One or more child sinks of a fan-out failed.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// An ordered collection of child sink failures.
///
/// The display form concatenates every child message, one per line, in the
/// order the failing children were invoked. The individual errors remain
/// available through [`AggregateError::errors`].
#[derive(Debug, Default)]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: Error) {
        self.errors.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Collapses into `Ok(())` when no error was collected, otherwise into
    /// an [`Error::Aggregate`].
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Aggregate(self))
        }
    }
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregateError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_aggregate_is_ok() {
        assert!(AggregateError::new().into_result().is_ok());
    }

    #[test]
    fn display_joins_messages_in_order() {
        let mut agg = AggregateError::new();
        agg.push(Error::Sink("disk full".into()));
        agg.push(Error::Sink("connection reset".into()));
        assert_eq!(agg.to_string(), "disk full\nconnection reset");

        let err = agg.into_result().unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert!(err.to_string().contains("connection reset"));
    }

    #[test]
    fn constituents_remain_accessible() {
        let mut agg = AggregateError::new();
        agg.push(Error::Sink("boom".into()));
        assert_eq!(agg.errors().len(), 1);
    }
}
