//! A typed decoder for the PostgreSQL backend wire protocol.
//!
//! # Features
//!
//! - **Typed messages**: Every backend message decodes into an owned,
//!   immutable value the session layer can match on
//! - **Classified server errors**: Error and notice responses are
//!   validated and classified by SQLSTATE class
//! - **No I/O**: The decoder consumes framed packets from a transport
//!   and never touches a socket
//!
//! # Example
//!
//! ```
//! use pgdecode::{BackendMessage, Packet};
//!
//! fn main() -> pgdecode::Result<()> {
//!     // tag 'Z', body "I": ReadyForQuery, idle
//!     let packet = Packet::new(b'Z', vec![b'I']);
//!
//!     match BackendMessage::decode(&packet)? {
//!         BackendMessage::ReadyForQuery(ready) => {
//!             assert!(!ready.status.in_transaction());
//!         }
//!         message => panic!("unexpected message: {message:?}"),
//!     }
//!     Ok(())
//! }
//! ```

// private
mod error;

// pub
pub mod protocol;
pub mod sqlstate;

pub use error::{Error, ErrorFields, Result};
pub use protocol::backend::{
    AuthenticationMessage, BackendKeyData, BackendMessage, CommandComplete, DataRow,
    ErrorResponse, FieldDescription, NoticeResponse, Packet, ParameterStatus, ReadyForQuery,
    RowDescription,
};
pub use protocol::types::{FormatCode, TransactionStatus};
pub use sqlstate::ServerMessage;
