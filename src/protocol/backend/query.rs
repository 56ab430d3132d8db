//! Query-result backend messages.

use zerocopy::byteorder::big_endian::{I16 as I16BE, I32 as I32BE};
use zerocopy::{FromBytes, Immutable, KnownLayout};

use crate::error::{Error, Result};
use crate::protocol::codec::Reader;
use crate::protocol::types::FormatCode;

/// Fixed-size tail of a field description (18 bytes after the name).
#[derive(Debug, Clone, Copy, FromBytes, KnownLayout, Immutable)]
#[repr(C, packed)]
struct FieldDescriptionTail {
    table_oid: I32BE,
    column_id: I16BE,
    type_oid: I32BE,
    type_size: I16BE,
    type_modifier: I32BE,
    format: I16BE,
}

/// Field description within a RowDescription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescription {
    /// Field name
    pub name: String,
    /// Table OID (0 if not a table column)
    pub table_oid: i32,
    /// Column attribute number (0 if not a table column)
    pub column_id: i16,
    /// Data type OID
    pub type_oid: i32,
    /// Type size (negative values denote variable-width types)
    pub type_size: i16,
    /// Type modifier (type-specific)
    pub type_modifier: i32,
    /// Format code (text or binary)
    pub format: FormatCode,
}

/// RowDescription message - describes the columns in a result set.
///
/// Field order matches the server transmission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDescription {
    fields: Vec<FieldDescription>,
}

impl RowDescription {
    /// Parse a RowDescription message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let num_fields = reader.read_i16()?;
        let num_fields = usize::try_from(num_fields).map_err(|_| {
            Error::Packet(format!("RowDescription: negative field count {num_fields}"))
        })?;

        let mut fields = Vec::with_capacity(num_fields);
        for _ in 0..num_fields {
            let name = reader.read_cstr()?.to_owned();
            let tail = reader.read_ref::<FieldDescriptionTail>()?;
            let format = tail.format.get();
            let format = FormatCode::from_i16(format).ok_or_else(|| {
                Error::Packet(format!("RowDescription: unknown format code {format}"))
            })?;

            fields.push(FieldDescription {
                name,
                table_oid: tail.table_oid.get(),
                column_id: tail.column_id.get(),
                type_oid: tail.type_oid.get(),
                type_size: tail.type_size.get(),
                type_modifier: tail.type_modifier.get(),
                format,
            });
        }

        Ok(Self { fields })
    }

    /// Get the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get field descriptions in wire order.
    pub fn fields(&self) -> &[FieldDescription] {
        &self.fields
    }

    /// Iterate over field descriptions.
    pub fn iter(&self) -> impl Iterator<Item = &FieldDescription> {
        self.fields.iter()
    }
}

/// DataRow message - contains a single row of data.
///
/// Column order matches the server transmission order. `None` is SQL
/// NULL; an empty `Some` is a present-but-empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    columns: Vec<Option<Vec<u8>>>,
}

impl DataRow {
    /// Parse a DataRow message from payload bytes.
    ///
    /// Each column is prefixed by an i32 length: `-1` is the NULL
    /// sentinel (no value bytes follow), `0` an empty value, a positive
    /// length that many value bytes. Anything below `-1` is malformed.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        let num_columns = reader.read_i16()?;
        let num_columns = usize::try_from(num_columns).map_err(|_| {
            Error::Packet(format!("DataRow: negative column count {num_columns}"))
        })?;

        let mut columns = Vec::with_capacity(num_columns);
        for _ in 0..num_columns {
            let len = reader.read_i32()?;
            let value = match len {
                -1 => None,
                0.. => Some(reader.read_bytes(len as usize)?.to_vec()),
                _ => {
                    return Err(Error::Packet(format!("DataRow: invalid column length {len}")));
                }
            };
            columns.push(value);
        }

        Ok(Self { columns })
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get a column value by index.
    ///
    /// The outer `Option` is index bounds; the inner is SQL NULL.
    pub fn get(&self, index: usize) -> Option<Option<&[u8]>> {
        self.columns.get(index).map(Option::as_deref)
    }

    /// Iterate over column values in wire order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&[u8]>> {
        self.columns.iter().map(Option::as_deref)
    }

    /// Get all column values.
    pub fn columns(&self) -> &[Option<Vec<u8>>] {
        &self.columns
    }
}

/// CommandComplete message - indicates successful completion of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandComplete {
    /// Command tag (e.g., "SELECT 5", "INSERT 0 1", "UPDATE 10")
    pub tag: String,
}

impl CommandComplete {
    /// Parse a CommandComplete message from payload bytes.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(payload);
        Ok(Self {
            tag: reader.read_cstr()?.to_owned(),
        })
    }

    /// Parse the number of rows affected from the command tag.
    ///
    /// Returns `Some(count)` for commands like SELECT, INSERT, UPDATE,
    /// DELETE. Returns `None` for other commands or parse failures.
    pub fn rows_affected(&self) -> Option<u64> {
        let parts: Vec<&str> = self.tag.split_whitespace().collect();

        match parts.as_slice() {
            ["SELECT", count] => count.parse().ok(),
            ["INSERT", _oid, count] => count.parse().ok(),
            ["UPDATE", count] => count.parse().ok(),
            ["DELETE", count] => count.parse().ok(),
            ["MERGE", count] => count.parse().ok(),
            ["COPY", count] => count.parse().ok(),
            ["MOVE", count] => count.parse().ok(),
            ["FETCH", count] => count.parse().ok(),
            _ => None,
        }
    }

    /// Get the command name from the tag.
    pub fn command(&self) -> Option<&str> {
        self.tag.split_whitespace().next()
    }
}
