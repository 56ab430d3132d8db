//! SQLSTATE classification of server error and notice responses.
//!
//! PostgreSQL reports errors and notices as a stream of tagged fields.
//! The required fields (severity, SQLSTATE code, message) are validated
//! up front with accumulated diagnostics; the first two characters of the
//! SQLSTATE code then select the error class.
//!
//! <https://www.postgresql.org/docs/current/errcodes-appendix.html>

use crate::error::{Error, ErrorFields, Result};

/// Error field type codes from PostgreSQL protocol.
pub mod field_type {
    /// Severity (localized)
    pub const SEVERITY: u8 = b'S';
    /// SQLSTATE code
    pub const CODE: u8 = b'C';
    /// Message
    pub const MESSAGE: u8 = b'M';
    /// Detail
    pub const DETAIL: u8 = b'D';
    /// Hint
    pub const HINT: u8 = b'H';
    /// Position in query
    pub const POSITION: u8 = b'P';
    /// Internal position
    pub const INTERNAL_POSITION: u8 = b'p';
    /// Internal query
    pub const INTERNAL_QUERY: u8 = b'q';
    /// Where (context)
    pub const WHERE: u8 = b'W';
    /// Schema name
    pub const SCHEMA: u8 = b's';
    /// Table name
    pub const TABLE: u8 = b't';
    /// Column name
    pub const COLUMN: u8 = b'c';
    /// Data type name
    pub const DATA_TYPE: u8 = b'd';
    /// Constraint name
    pub const CONSTRAINT: u8 = b'n';
    /// File name
    pub const FILE: u8 = b'F';
    /// Line number
    pub const LINE: u8 = b'L';
    /// Routine name
    pub const ROUTINE: u8 = b'R';
}

// Required-field diagnostics, reported in severity, code, message order.
const MISSING_SEVERITY: &str = "Required Severity Level was not present.";
const MISSING_CODE: &str = "Required SQLSTATE Code was not present.";
const MISSING_MESSAGE: &str = "Required Message was not present.";

macro_rules! server_message {
    ($(
        $(#[$doc:meta])* $class:literal => $name:ident,
    )*) => {
        /// Server error or notice, classified by SQLSTATE class.
        ///
        /// Every variant carries the full [`ErrorFields`] record. Codes
        /// from classes this decoder does not know (newer servers,
        /// extensions) classify as [`ServerMessage::UnknownError`].
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ServerMessage {
            $(
                $(#[$doc])*
                $name(ErrorFields),
            )*
            /// SQLSTATE class not recognized by this decoder
            UnknownError(ErrorFields),
        }

        impl ServerMessage {
            fn from_class(class: &[u8], fields: ErrorFields) -> Self {
                match class {
                    $($class => Self::$name(fields),)*
                    _ => Self::UnknownError(fields),
                }
            }

            /// The field record carried by every variant.
            pub fn fields(&self) -> &ErrorFields {
                match self {
                    $(Self::$name(fields) => fields,)*
                    Self::UnknownError(fields) => fields,
                }
            }
        }
    };
}

server_message! {
    /// Class 00: successful completion
    b"00" => SuccessfulCompletion,
    /// Class 01: warning
    b"01" => Warning,
    /// Class 02: no data
    b"02" => NoData,
    /// Class 03: SQL statement not yet complete
    b"03" => SqlStatementNotYetComplete,
    /// Class 08: connection exception
    b"08" => ConnectionException,
    /// Class 09: triggered action exception
    b"09" => TriggeredActionException,
    /// Class 0A: feature not supported
    b"0A" => FeatureNotSupported,
    /// Class 0B: invalid transaction initiation
    b"0B" => InvalidTransactionInitiation,
    /// Class 0F: locator exception
    b"0F" => LocatorException,
    /// Class 0L: invalid grantor
    b"0L" => InvalidGrantor,
    /// Class 0P: invalid role specification
    b"0P" => InvalidRoleSpecification,
    /// Class 0Z: diagnostics exception
    b"0Z" => DiagnosticsException,
    /// Class 20: case not found
    b"20" => CaseNotFound,
    /// Class 21: cardinality violation
    b"21" => CardinalityViolation,
    /// Class 22: data exception
    b"22" => DataException,
    /// Class 23: integrity constraint violation
    b"23" => IntegrityConstraintViolation,
    /// Class 24: invalid cursor state
    b"24" => InvalidCursorState,
    /// Class 25: invalid transaction state
    b"25" => InvalidTransactionState,
    /// Class 26: invalid SQL statement name
    b"26" => InvalidSqlStatementName,
    /// Class 27: triggered data change violation
    b"27" => TriggeredDataChangeViolation,
    /// Class 28: invalid authorization specification
    b"28" => InvalidAuthorizationSpecification,
    /// Class 2B: dependent privilege descriptors still exist
    b"2B" => DependentPrivilegeDescriptorsStillExist,
    /// Class 2D: invalid transaction termination
    b"2D" => InvalidTransactionTermination,
    /// Class 2F: SQL routine exception
    b"2F" => SqlRoutineException,
    /// Class 38: external routine exception
    b"38" => ExternalRoutineException,
    /// Class 39: external routine invocation exception
    b"39" => ExternalRoutineInvocationException,
    /// Class 3B: savepoint exception
    b"3B" => SavepointException,
    /// Class 3D: invalid catalog name
    b"3D" => InvalidCatalogName,
    /// Class 3F: invalid schema name
    b"3F" => InvalidSchemaName,
    /// Class 40: transaction rollback
    b"40" => TransactionRollback,
    /// Class 42: syntax error or access rule violation
    b"42" => SyntaxErrorOrAccessRuleViolation,
    /// Class 44: WITH CHECK OPTION violation
    b"44" => WithCheckOptionViolation,
    /// Class 53: insufficient resources
    b"53" => InsufficientResources,
    /// Class 54: program limit exceeded
    b"54" => ProgramLimitExceeded,
    /// Class 55: object not in prerequisite state
    b"55" => ObjectNotInPrerequisiteState,
    /// Class 57: operator intervention
    b"57" => OperatorIntervention,
    /// Class 58: system error (external to PostgreSQL)
    b"58" => SystemError,
    /// Class F0: configuration file error
    b"F0" => ConfigFileError,
    /// Class HV: foreign data wrapper error (SQL/MED)
    b"HV" => FdwError,
    /// Class P0: PL/pgSQL error
    b"P0" => PlPgSqlError,
    /// Class XX: internal error
    b"XX" => InternalError,
}

impl ServerMessage {
    /// Validate and classify an error/notice field stream.
    ///
    /// Severity (`S`), code (`C`), and message (`M`) are required; every
    /// missing one contributes its own diagnostic to
    /// [`Error::MissingErrorFields`]. Classification itself is total:
    /// any code, malformed or unknown, yields some variant.
    pub fn classify(fields: &[(u8, String)]) -> Result<Self> {
        for (tag, _) in fields {
            if !is_known_tag(*tag) {
                tracing::debug!("Unknown error field type: {}", *tag as char);
            }
        }

        let severity = first_field(field_type::SEVERITY, fields);
        let code = first_field(field_type::CODE, fields);
        let message = first_field(field_type::MESSAGE, fields);

        let (severity, code, message) = match (severity, code, message) {
            (Some(severity), Some(code), Some(message)) => (severity, code, message),
            (severity, code, message) => {
                let mut missing = Vec::new();
                if severity.is_none() {
                    missing.push(MISSING_SEVERITY.to_owned());
                }
                if code.is_none() {
                    missing.push(MISSING_CODE.to_owned());
                }
                if message.is_none() {
                    missing.push(MISSING_MESSAGE.to_owned());
                }
                return Err(Error::MissingErrorFields(missing));
            }
        };

        let take = |tag| first_field(tag, fields).map(str::to_owned);
        let record = ErrorFields {
            severity: severity.to_owned(),
            code: code.to_owned(),
            message: message.to_owned(),
            detail: take(field_type::DETAIL),
            hint: take(field_type::HINT),
            position: take(field_type::POSITION),
            internal_position: take(field_type::INTERNAL_POSITION),
            internal_query: take(field_type::INTERNAL_QUERY),
            where_: take(field_type::WHERE),
            schema: take(field_type::SCHEMA),
            table: take(field_type::TABLE),
            column: take(field_type::COLUMN),
            data_type: take(field_type::DATA_TYPE),
            constraint: take(field_type::CONSTRAINT),
            file: take(field_type::FILE),
            line: take(field_type::LINE),
            routine: take(field_type::ROUTINE),
        };

        Ok(Self::from_code(record))
    }

    /// Classify an already-validated field record by its SQLSTATE code.
    fn from_code(fields: ErrorFields) -> Self {
        let class = match fields.code.as_bytes() {
            [first, second, ..] => [*first, *second],
            _ => return Self::UnknownError(fields),
        };
        Self::from_class(&class, fields)
    }

    /// Severity of the underlying field record.
    pub fn severity(&self) -> &str {
        &self.fields().severity
    }

    /// SQLSTATE code of the underlying field record.
    pub fn code(&self) -> &str {
        &self.fields().code
    }

    /// Primary message of the underlying field record.
    pub fn message(&self) -> &str {
        &self.fields().message
    }
}

impl std::fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fields())
    }
}

/// First value whose tag matches, or `None`.
///
/// PostgreSQL does not send duplicate tags in practice; when a hostile
/// stream does, the first occurrence wins.
fn first_field<'a>(tag: u8, fields: &'a [(u8, String)]) -> Option<&'a str> {
    fields
        .iter()
        .find(|(field_tag, _)| *field_tag == tag)
        .map(|(_, value)| value.as_str())
}

fn is_known_tag(tag: u8) -> bool {
    matches!(
        tag,
        field_type::SEVERITY
            | field_type::CODE
            | field_type::MESSAGE
            | field_type::DETAIL
            | field_type::HINT
            | field_type::POSITION
            | field_type::INTERNAL_POSITION
            | field_type::INTERNAL_QUERY
            | field_type::WHERE
            | field_type::SCHEMA
            | field_type::TABLE
            | field_type::COLUMN
            | field_type::DATA_TYPE
            | field_type::CONSTRAINT
            | field_type::FILE
            | field_type::LINE
            | field_type::ROUTINE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(pairs: &[(u8, &str)]) -> Vec<(u8, String)> {
        pairs
            .iter()
            .map(|(tag, value)| (*tag, (*value).to_string()))
            .collect()
    }

    fn minimal(code: &str) -> Vec<(u8, String)> {
        stream(&[(b'S', "ERROR"), (b'C', code), (b'M', "boom")])
    }

    #[test]
    fn test_classify_by_class_prefix() {
        let message = ServerMessage::classify(&minimal("42601")).unwrap();
        assert!(matches!(
            message,
            ServerMessage::SyntaxErrorOrAccessRuleViolation(_)
        ));
        assert_eq!(message.code(), "42601");

        let message = ServerMessage::classify(&minimal("23505")).unwrap();
        assert!(matches!(
            message,
            ServerMessage::IntegrityConstraintViolation(_)
        ));

        let message = ServerMessage::classify(&minimal("XX000")).unwrap();
        assert!(matches!(message, ServerMessage::InternalError(_)));

        let message = ServerMessage::classify(&minimal("00000")).unwrap();
        assert!(matches!(message, ServerMessage::SuccessfulCompletion(_)));
    }

    #[test]
    fn test_classify_is_total() {
        // Unknown class, short code, empty code: all classify, none fail.
        for code in ["ZZ123", "9", ""] {
            let message = ServerMessage::classify(&minimal(code)).unwrap();
            assert!(matches!(message, ServerMessage::UnknownError(_)));
            assert_eq!(message.code(), code);
        }
    }

    #[test]
    fn test_missing_fields_accumulate_in_order() {
        let err = ServerMessage::classify(&stream(&[(b'M', "x")])).unwrap_err();
        match err {
            Error::MissingErrorFields(messages) => {
                assert_eq!(
                    messages,
                    vec![
                        "Required Severity Level was not present.".to_string(),
                        "Required SQLSTATE Code was not present.".to_string(),
                    ]
                );
            }
            other => panic!("expected MissingErrorFields, got {other:?}"),
        }

        let err = ServerMessage::classify(&[]).unwrap_err();
        match err {
            Error::MissingErrorFields(messages) => assert_eq!(messages.len(), 3),
            other => panic!("expected MissingErrorFields, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_fields() {
        let fields = stream(&[
            (b'S', "ERROR"),
            (b'C', "23503"),
            (b'M', "violates foreign key constraint"),
            (b'D', "Key (id)=(3) is not present."),
            (b'H', "check the parent row"),
            (b't', "orders"),
            (b'n', "orders_customer_fkey"),
        ]);
        let message = ServerMessage::classify(&fields).unwrap();
        let record = message.fields();
        assert_eq!(record.detail.as_deref(), Some("Key (id)=(3) is not present."));
        assert_eq!(record.hint.as_deref(), Some("check the parent row"));
        assert_eq!(record.table.as_deref(), Some("orders"));
        assert_eq!(record.constraint.as_deref(), Some("orders_customer_fkey"));
        assert_eq!(record.schema, None);
        assert_eq!(record.column, None);
        assert_eq!(record.position, None);
    }

    #[test]
    fn test_first_field_wins_on_duplicates() {
        let fields = stream(&[(b'S', "ERROR"), (b'S', "PANIC"), (b'C', "08000")]);
        assert_eq!(first_field(b'S', &fields), Some("ERROR"));
        assert_eq!(first_field(b'C', &fields), Some("08000"));
        assert_eq!(first_field(b'M', &fields), None);
    }

    #[test]
    fn test_display() {
        let message = ServerMessage::classify(&minimal("57014")).unwrap();
        assert!(matches!(message, ServerMessage::OperatorIntervention(_)));
        assert_eq!(message.to_string(), "ERROR: boom (SQLSTATE 57014)");
    }
}
