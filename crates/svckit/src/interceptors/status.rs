use num_enum::{FromPrimitive, IntoPrimitive};
use poem::http::StatusCode;
use poem::Response;

/// The gRPC status codes this crate's interceptors emit or inspect.
///
/// Parsed from the `grpc-status` header as an `i32` value. Falls back to
/// [`Code::Unknown`] for any unrecognized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(i32)]
pub enum Code {
    Ok = 0,
    #[num_enum(default)]
    Unknown = 2,
    Internal = 13,
    Unauthenticated = 16,
}

impl Code {
    pub fn is_error(self) -> bool {
        self != Code::Ok
    }
}

/// Builds a gRPC Trailers-Only error reply: HTTP 200 with the status code
/// and message carried in headers.
pub fn error_reply(code: Code, message: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .content_type("application/grpc")
        .header("grpc-status", i32::from(code).to_string())
        .header("grpc-message", message)
        .finish()
}

/// Reads the gRPC status of a response, treating a missing or unreadable
/// `grpc-status` header as [`Code::Ok`].
pub fn status_from_response(response: &Response) -> Code {
    response
        .headers()
        .get("grpc-status")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i32>().ok())
        .map(Code::from)
        .unwrap_or(Code::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_convert_both_ways() {
        assert_eq!(i32::from(Code::Unauthenticated), 16);
        assert_eq!(Code::from(13), Code::Internal);
        assert_eq!(Code::from(99), Code::Unknown);
    }

    #[test]
    fn error_reply_is_trailers_only() {
        let reply = error_reply(Code::Unauthenticated, "missing credentials");
        assert_eq!(reply.status(), StatusCode::OK);
        assert_eq!(
            reply.headers().get("grpc-status").unwrap().to_str().unwrap(),
            "16"
        );
        assert_eq!(
            reply.headers().get("grpc-message").unwrap().to_str().unwrap(),
            "missing credentials"
        );
        assert_eq!(status_from_response(&reply), Code::Unauthenticated);
    }

    #[test]
    fn missing_status_header_reads_as_ok() {
        let response = Response::builder().finish();
        assert_eq!(status_from_response(&response), Code::Ok);
        assert!(!Code::Ok.is_error());
        assert!(Code::Internal.is_error());
    }
}
