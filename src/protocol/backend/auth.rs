//! Authentication and session-setup backend messages.

use crate::error::{Error, Result};
use crate::protocol::codec::Reader;
use crate::protocol::types::TransactionStatus;

/// Authentication method constants.
pub mod auth_type {
    pub const OK: i32 = 0;
    pub const KERBEROS_V5: i32 = 2;
    pub const CLEARTEXT_PASSWORD: i32 = 3;
    pub const MD5_PASSWORD: i32 = 5;
    pub const SCM_CREDENTIAL: i32 = 6;
    pub const GSS: i32 = 7;
    pub const GSS_CONTINUE: i32 = 8;
    pub const SSPI: i32 = 9;
}

/// Authentication challenge from the server.
///
/// The decoder only classifies the challenge; responding to it
/// (password hashing, GSSAPI exchanges) belongs to the session layer.
/// Codes this decoder does not know classify as `Unknown` so newer
/// servers stay decodable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationMessage {
    /// Authentication successful
    Ok,
    /// Kerberos V5 authentication required
    KerberosV5,
    /// Cleartext password required
    CleartextPassword,
    /// MD5 password required (with 4-byte salt)
    Md5Password { salt: [u8; 4] },
    /// SCM credentials message required
    ScmCredential,
    /// GSS authentication required
    Gss,
    /// GSS continue (with additional data)
    GssContinue { data: Vec<u8> },
    /// SSPI authentication required
    Sspi,
    /// Authentication code without a registered classification
    Unknown(i32),
}

impl AuthenticationMessage {
    /// Parse an Authentication message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let auth_type = reader.read_i32()?;

        match auth_type {
            auth_type::OK => Ok(AuthenticationMessage::Ok),
            auth_type::KERBEROS_V5 => Ok(AuthenticationMessage::KerberosV5),
            auth_type::CLEARTEXT_PASSWORD => Ok(AuthenticationMessage::CleartextPassword),
            auth_type::MD5_PASSWORD => {
                let mut salt = [0u8; 4];
                salt.copy_from_slice(reader.read_bytes(4)?);
                Ok(AuthenticationMessage::Md5Password { salt })
            }
            auth_type::SCM_CREDENTIAL => Ok(AuthenticationMessage::ScmCredential),
            auth_type::GSS => Ok(AuthenticationMessage::Gss),
            auth_type::GSS_CONTINUE => Ok(AuthenticationMessage::GssContinue {
                data: reader.rest().to_vec(),
            }),
            auth_type::SSPI => Ok(AuthenticationMessage::Sspi),
            code if code >= 0 => Ok(AuthenticationMessage::Unknown(code)),
            code => Err(Error::Packet(format!(
                "Authentication: invalid negative code {code}"
            ))),
        }
    }
}

/// BackendKeyData message - process ID and secret key for cancellation.
///
/// The frontend must save these values to issue CancelRequest messages
/// later.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BackendKeyData {
    /// Process ID of the backend
    pub process_id: i32,
    /// Secret key for cancellation
    pub secret_key: i32,
}

impl BackendKeyData {
    /// Parse a BackendKeyData message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        Ok(Self {
            process_id: reader.read_i32()?,
            secret_key: reader.read_i32()?,
        })
    }
}

impl std::fmt::Debug for BackendKeyData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendKeyData")
            .field("process_id", &self.process_id)
            .field("secret_key", &"<REDACTED>")
            .finish()
    }
}

/// ParameterStatus message - server parameter name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterStatus {
    /// Parameter name
    pub name: String,
    /// Parameter value
    pub value: String,
}

impl ParameterStatus {
    /// Parse a ParameterStatus message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        Ok(Self {
            name: reader.read_cstr()?.to_owned(),
            value: reader.read_cstr()?.to_owned(),
        })
    }
}

/// ReadyForQuery message - server is ready for a new query cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadyForQuery {
    /// Current transaction status
    pub status: TransactionStatus,
}

impl ReadyForQuery {
    /// Parse a ReadyForQuery message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let byte = reader.read_u8()?;
        let status = TransactionStatus::from_byte(byte).ok_or_else(|| {
            Error::Packet(format!(
                "ReadyForQuery: unknown transaction status {:?}",
                byte as char
            ))
        })?;
        Ok(Self { status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_variants() {
        assert_eq!(
            AuthenticationMessage::parse(&[0, 0, 0, 0]).unwrap(),
            AuthenticationMessage::Ok
        );
        assert_eq!(
            AuthenticationMessage::parse(&[0, 0, 0, 3]).unwrap(),
            AuthenticationMessage::CleartextPassword
        );
        assert_eq!(
            AuthenticationMessage::parse(&[0, 0, 0, 5, 0xDE, 0xAD, 0xBE, 0xEF]).unwrap(),
            AuthenticationMessage::Md5Password {
                salt: [0xDE, 0xAD, 0xBE, 0xEF]
            }
        );
        assert_eq!(
            AuthenticationMessage::parse(&[0, 0, 0, 8, 1, 2, 3]).unwrap(),
            AuthenticationMessage::GssContinue {
                data: vec![1, 2, 3]
            }
        );
    }

    #[test]
    fn test_authentication_unknown_code() {
        // SASL negotiation (code 10) is not classified by this decoder.
        assert_eq!(
            AuthenticationMessage::parse(&[0, 0, 0, 10]).unwrap(),
            AuthenticationMessage::Unknown(10)
        );
    }

    #[test]
    fn test_authentication_failures() {
        // Truncated salt, missing code, negative code.
        assert!(AuthenticationMessage::parse(&[0, 0, 0, 5, 0xDE]).is_err());
        assert!(AuthenticationMessage::parse(&[0, 0]).is_err());
        assert!(AuthenticationMessage::parse(&[0xFF, 0xFF, 0xFF, 0xFF]).is_err());
    }

    #[test]
    fn test_backend_key_data() {
        let key = BackendKeyData::parse(&[0, 0, 0x30, 0x39, 0, 0, 0, 42]).unwrap();
        assert_eq!(key.process_id, 12345);
        assert_eq!(key.secret_key, 42);
    }

    #[test]
    fn test_backend_key_data_redacts_secret() {
        let key = BackendKeyData::parse(&[0, 0, 0, 1, 0, 0, 0, 42]).unwrap();
        let debug = format!("{key:?}");
        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("42"));
    }

    #[test]
    fn test_parameter_status() {
        let status = ParameterStatus::parse(b"server_encoding\0UTF8\0").unwrap();
        assert_eq!(status.name, "server_encoding");
        assert_eq!(status.value, "UTF8");
    }

    #[test]
    fn test_ready_for_query() {
        assert_eq!(
            ReadyForQuery::parse(&[b'I']).unwrap().status,
            TransactionStatus::Idle
        );
        assert_eq!(
            ReadyForQuery::parse(&[b'T']).unwrap().status,
            TransactionStatus::InTransaction
        );
        assert_eq!(
            ReadyForQuery::parse(&[b'E']).unwrap().status,
            TransactionStatus::Failed
        );
        assert!(ReadyForQuery::parse(&[b'X']).is_err());
        assert!(ReadyForQuery::parse(&[]).is_err());
    }
}
