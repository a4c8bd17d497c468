use std::backtrace::{Backtrace, BacktraceStatus};

use super::record::Attr;

/// Builds a `stack` attribute from an error: its message, the chain of
/// sources, and a backtrace when one is available (`RUST_BACKTRACE=1`).
pub fn error_stack(err: &(dyn std::error::Error + 'static)) -> Attr {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        lines.push(backtrace.to_string());
    }
    Attr::string("stack", lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::record::Value;

    #[derive(Debug, thiserror::Error)]
    #[error("outer failure")]
    struct Outer(#[source] Inner);

    #[derive(Debug, thiserror::Error)]
    #[error("inner failure")]
    struct Inner;

    #[test]
    fn stack_attr_lists_the_source_chain() {
        let attr = error_stack(&Outer(Inner));
        assert_eq!(attr.key, "stack");
        match attr.value {
            Value::Text(text) => {
                assert!(text.contains("outer failure"));
                assert!(text.contains("caused by: inner failure"));
            }
            other => panic!("expected text value, got {other}"),
        }
    }
}
