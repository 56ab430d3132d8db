//! PostgreSQL backend (server → client) messages.

pub mod auth;
pub mod error;
pub mod query;

pub use auth::{AuthenticationMessage, BackendKeyData, ParameterStatus, ReadyForQuery};
pub use error::{ErrorResponse, NoticeResponse};
pub use query::{CommandComplete, DataRow, FieldDescription, RowDescription};

use crate::error::{Error, Result};

/// Backend message type bytes.
pub mod msg_type {
    /// Authentication message
    pub const AUTHENTICATION: u8 = b'R';
    /// BackendKeyData
    pub const BACKEND_KEY_DATA: u8 = b'K';
    /// ParameterStatus
    pub const PARAMETER_STATUS: u8 = b'S';
    /// ReadyForQuery
    pub const READY_FOR_QUERY: u8 = b'Z';
    /// RowDescription
    pub const ROW_DESCRIPTION: u8 = b'T';
    /// DataRow
    pub const DATA_ROW: u8 = b'D';
    /// CommandComplete
    pub const COMMAND_COMPLETE: u8 = b'C';
    /// ErrorResponse
    pub const ERROR_RESPONSE: u8 = b'E';
    /// NoticeResponse
    pub const NOTICE_RESPONSE: u8 = b'N';
    /// NotificationResponse
    pub const NOTIFICATION_RESPONSE: u8 = b'A';
}

/// Framed message from the PostgreSQL server.
///
/// The transport strips the standard envelope (1-byte tag + 4-byte
/// big-endian length including itself) and hands over the tag with the
/// remaining body bytes. The packet owns its body; the transport's
/// read buffer is free to move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Message type byte
    pub tag: u8,
    /// Message body (after the length field)
    pub body: Vec<u8>,
}

impl Packet {
    /// Create a new Packet.
    pub fn new(tag: u8, body: Vec<u8>) -> Self {
        Self { tag, body }
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.tag == msg_type::ERROR_RESPONSE
    }

    /// Check if this is a notice response.
    pub fn is_notice(&self) -> bool {
        self.tag == msg_type::NOTICE_RESPONSE
    }

    /// Check if this is an async message (can arrive at any time).
    pub fn is_async(&self) -> bool {
        matches!(
            self.tag,
            msg_type::NOTICE_RESPONSE
                | msg_type::NOTIFICATION_RESPONSE
                | msg_type::PARAMETER_STATUS
        )
    }
}

/// Decoded backend message.
///
/// One variant per message type this decoder understands; the session
/// layer matches on the variant to drive its protocol state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMessage {
    /// Authentication challenge or completion
    Authentication(AuthenticationMessage),
    /// Cancellation key data
    BackendKeyData(BackendKeyData),
    /// Command-completed response
    CommandComplete(CommandComplete),
    /// Single row of a result set
    DataRow(DataRow),
    /// Classified error response
    ErrorResponse(ErrorResponse),
    /// Classified notice
    NoticeResponse(NoticeResponse),
    /// Run-time parameter status report
    ParameterStatus(ParameterStatus),
    /// Server is ready for a new query cycle
    ReadyForQuery(ReadyForQuery),
    /// Result-set column descriptions
    RowDescription(RowDescription),
}

impl BackendMessage {
    /// Decode a packet into a typed message, selected by the tag byte.
    ///
    /// Tags without a registered decoder yield
    /// [`Error::UnsupportedMessage`]; the body is not inspected in that
    /// case.
    pub fn decode(packet: &Packet) -> Result<Self> {
        let body = packet.body.as_slice();
        let message = match packet.tag {
            msg_type::AUTHENTICATION => Self::Authentication(AuthenticationMessage::parse(body)?),
            msg_type::BACKEND_KEY_DATA => Self::BackendKeyData(BackendKeyData::parse(body)?),
            msg_type::PARAMETER_STATUS => Self::ParameterStatus(ParameterStatus::parse(body)?),
            msg_type::READY_FOR_QUERY => Self::ReadyForQuery(ReadyForQuery::parse(body)?),
            msg_type::ROW_DESCRIPTION => Self::RowDescription(RowDescription::parse(body)?),
            msg_type::DATA_ROW => Self::DataRow(DataRow::parse(body)?),
            msg_type::COMMAND_COMPLETE => Self::CommandComplete(CommandComplete::parse(body)?),
            msg_type::ERROR_RESPONSE => Self::ErrorResponse(ErrorResponse::parse(body)?),
            msg_type::NOTICE_RESPONSE => Self::NoticeResponse(NoticeResponse::parse(body)?),
            tag => return Err(Error::UnsupportedMessage(tag)),
        };
        Ok(message)
    }

    /// Message type byte of this message.
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Authentication(_) => msg_type::AUTHENTICATION,
            Self::BackendKeyData(_) => msg_type::BACKEND_KEY_DATA,
            Self::CommandComplete(_) => msg_type::COMMAND_COMPLETE,
            Self::DataRow(_) => msg_type::DATA_ROW,
            Self::ErrorResponse(_) => msg_type::ERROR_RESPONSE,
            Self::NoticeResponse(_) => msg_type::NOTICE_RESPONSE,
            Self::ParameterStatus(_) => msg_type::PARAMETER_STATUS,
            Self::ReadyForQuery(_) => msg_type::READY_FOR_QUERY,
            Self::RowDescription(_) => msg_type::ROW_DESCRIPTION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_tag() {
        let packet = Packet::new(b'C', b"SELECT 1\0".to_vec());
        let message = BackendMessage::decode(&packet).unwrap();
        assert_eq!(message.tag(), b'C');
        assert!(matches!(message, BackendMessage::CommandComplete(_)));
    }

    #[test]
    fn test_unsupported_tag() {
        let packet = Packet::new(b'X', vec![1, 2, 3]);
        match BackendMessage::decode(&packet) {
            Err(Error::UnsupportedMessage(tag)) => assert_eq!(tag, b'X'),
            other => panic!("expected UnsupportedMessage, got {other:?}"),
        }
    }

    #[test]
    fn test_packet_predicates() {
        assert!(Packet::new(b'E', Vec::new()).is_error());
        assert!(Packet::new(b'N', Vec::new()).is_notice());
        assert!(Packet::new(b'N', Vec::new()).is_async());
        assert!(Packet::new(b'A', Vec::new()).is_async());
        assert!(Packet::new(b'S', Vec::new()).is_async());
        assert!(!Packet::new(b'Z', Vec::new()).is_async());
    }
}
