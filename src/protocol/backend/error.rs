//! Error and notice response messages.
//!
//! Both messages share the same body layout: a stream of
//! `(tag byte, cstring)` fields terminated by a zero tag byte. The
//! stream is validated and classified by [`ServerMessage::classify`].

use crate::error::{Error, Result};
use crate::protocol::codec::Reader;
use crate::sqlstate::ServerMessage;

/// Parse the error/notice field stream from payload bytes.
///
/// Fields are returned in wire order; duplicate tags are kept (the
/// classifier resolves them by first occurrence). A missing terminator
/// is a decoding failure.
fn read_fields(payload: &[u8]) -> Result<Vec<(u8, String)>> {
    let mut reader = Reader::new(payload);
    let mut fields = Vec::new();

    loop {
        let tag = reader.read_u8()?;
        if tag == 0 {
            break;
        }
        let value = reader.read_cstr()?.to_owned();
        fields.push((tag, value));
    }

    Ok(fields)
}

/// ErrorResponse message - statement or session error from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Classified server message
    pub message: ServerMessage,
}

impl ErrorResponse {
    /// Parse an ErrorResponse message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            message: ServerMessage::classify(&read_fields(payload)?)?,
        })
    }

    /// Convert to an Error.
    pub fn into_error(self) -> Error {
        Error::Server(self.message)
    }

    /// Get the severity.
    pub fn severity(&self) -> &str {
        self.message.severity()
    }

    /// Get the SQLSTATE code.
    pub fn code(&self) -> &str {
        self.message.code()
    }
}

/// NoticeResponse message - non-fatal warning/info from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeResponse {
    /// Classified server message
    pub message: ServerMessage,
}

impl NoticeResponse {
    /// Parse a NoticeResponse message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        Ok(Self {
            message: ServerMessage::classify(&read_fields(payload)?)?,
        })
    }

    /// Get the severity.
    pub fn severity(&self) -> &str {
        self.message.severity()
    }

    /// Get the SQLSTATE code.
    pub fn code(&self) -> &str {
        self.message.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_stream(pairs: &[(u8, &str)]) -> Vec<u8> {
        let mut payload = Vec::new();
        for (tag, value) in pairs {
            payload.push(*tag);
            payload.extend_from_slice(value.as_bytes());
            payload.push(0);
        }
        payload.push(0);
        payload
    }

    #[test]
    fn test_read_fields_in_wire_order() {
        let payload = field_stream(&[(b'M', "msg"), (b'S', "ERROR"), (b'C', "42601")]);
        let fields = read_fields(&payload).unwrap();
        assert_eq!(
            fields,
            vec![
                (b'M', "msg".to_string()),
                (b'S', "ERROR".to_string()),
                (b'C', "42601".to_string()),
            ]
        );
    }

    #[test]
    fn test_read_fields_missing_terminator() {
        let mut payload = field_stream(&[(b'S', "ERROR")]);
        payload.pop();
        assert!(read_fields(&payload).is_err());

        // Tag with an unterminated value.
        assert!(read_fields(b"Moops").is_err());
    }

    #[test]
    fn test_error_response_classified() {
        let payload = field_stream(&[(b'S', "ERROR"), (b'C', "42601"), (b'M', "syntax error")]);
        let response = ErrorResponse::parse(&payload).unwrap();
        assert!(matches!(
            response.message,
            ServerMessage::SyntaxErrorOrAccessRuleViolation(_)
        ));
        assert_eq!(response.severity(), "ERROR");
        assert_eq!(response.code(), "42601");

        let err = response.into_error();
        assert_eq!(err.sqlstate(), Some("42601"));
    }

    #[test]
    fn test_notice_response_classified() {
        let payload = field_stream(&[(b'S', "WARNING"), (b'C', "01000"), (b'M', "careful")]);
        let notice = NoticeResponse::parse(&payload).unwrap();
        assert!(matches!(notice.message, ServerMessage::Warning(_)));
        assert_eq!(notice.severity(), "WARNING");
    }

    #[test]
    fn test_error_response_missing_required_fields() {
        let payload = field_stream(&[(b'M', "x")]);
        match ErrorResponse::parse(&payload) {
            Err(Error::MissingErrorFields(messages)) => assert_eq!(messages.len(), 2),
            other => panic!("expected MissingErrorFields, got {other:?}"),
        }
    }
}
