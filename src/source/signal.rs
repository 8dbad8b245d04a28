// src/source/signal.rs
//! Signal Desktop source.
//!
//! Signal Desktop keeps its message store in a SQLCipher-4 encrypted SQLite
//! database; the decryption key sits next to it in `config.json`. The
//! database is opened read-only and the connection is dropped when the read
//! finishes, error paths included (RAII), so a running Signal instance is
//! never blocked longer than the query takes.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};

use crate::dedup::KeyPolicy;
use crate::error::ParseError;
use crate::source::{MessageSource, ParseMode};
use crate::types::NormalizedMessage;

/// Raw message row, before direction/attribution policy is applied.
#[derive(Debug)]
struct MessageRow {
    body: Option<String>,
    msg_type: Option<String>,
    sent_at: Option<i64>,
    source: Option<String>,
}

/// Read the SQLCipher key from Signal Desktop's `config.json`.
pub fn read_db_key(config_path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(config_path).with_context(|| {
        format!(
            "Signal config not found at {} (is Signal Desktop installed?)",
            config_path.display()
        )
    })?;
    let config: serde_json::Value =
        serde_json::from_str(&content).context("parsing Signal config.json")?;
    config
        .get("key")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no 'key' field in Signal config.json"))
}

/// Open the database read-only and verify the key actually decrypts it.
fn open_db(db_path: &Path, key: &str) -> Result<Connection> {
    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("opening Signal database at {}", db_path.display()))?;
    conn.execute_batch(&format!("PRAGMA key = \"x'{key}'\";"))
        .context("setting SQLCipher decryption key")?;
    conn.execute_batch("SELECT count(*) FROM messages;")
        .context("decrypting Signal database (wrong key, or Signal is holding a lock?)")?;
    Ok(conn)
}

/// Apply the attribution policy to one row.
///
/// `sender_id` is set only for `incoming` rows; `outgoing` means the account
/// owner and stays `None`. Rows without a body (attachments, protocol
/// messages) yield nothing. A row missing its direction or timestamp is
/// malformed and reported with its 1-based position.
fn normalize_row(row: &MessageRow, row_no: usize) -> Result<Option<NormalizedMessage>, ParseError> {
    let msg_type = row
        .msg_type
        .as_deref()
        .ok_or_else(|| ParseError::row(row_no, "missing message type"))?;

    let sender_id = match msg_type {
        "incoming" => Some(
            row.source
                .clone()
                .ok_or_else(|| ParseError::row(row_no, "incoming message without source"))?,
        ),
        "outgoing" => None,
        // group updates, timer changes, key changes: no message content
        _ => return Ok(None),
    };

    let body = match row.body.as_deref() {
        Some(b) if !b.trim().is_empty() => b.to_string(),
        _ => return Ok(None),
    };

    let timestamp_ms = row
        .sent_at
        .ok_or_else(|| ParseError::row(row_no, "missing sent_at timestamp"))?;

    Ok(Some(NormalizedMessage {
        text: body,
        timestamp_ms,
        sender_id,
    }))
}

pub struct SignalSource {
    db_path: PathBuf,
    config_path: PathBuf,
    conversation_id: String,
}

impl SignalSource {
    pub fn new(
        db_path: impl AsRef<Path>,
        config_path: impl AsRef<Path>,
        conversation_id: impl Into<String>,
    ) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            config_path: config_path.as_ref().to_path_buf(),
            conversation_id: conversation_id.into(),
        }
    }

    fn query_rows(&self, conn: &Connection) -> Result<Vec<MessageRow>> {
        let mut stmt = conn
            .prepare(
                "SELECT body, type, sent_at, source FROM messages \
                 WHERE conversationId = ?1 ORDER BY sent_at ASC",
            )
            .context("preparing messages query")?;
        let rows = stmt
            .query_map([&self.conversation_id], |row| {
                Ok(MessageRow {
                    body: row.get(0)?,
                    msg_type: row.get(1)?,
                    sent_at: row.get(2)?,
                    source: row.get(3)?,
                })
            })
            .context("querying messages")?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row.context("reading message row")?);
        }
        Ok(out)
    }
}

#[async_trait]
impl MessageSource for SignalSource {
    async fn read_messages(&self, mode: ParseMode) -> Result<Vec<NormalizedMessage>> {
        let key = read_db_key(&self.config_path)?;
        let conn = open_db(&self.db_path, &key)?;
        let rows = self.query_rows(&conn)?;

        let mut out = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            match normalize_row(row, i + 1) {
                Ok(Some(msg)) => out.push(msg),
                Ok(None) => {}
                Err(e) => match mode {
                    ParseMode::Strict => return Err(e.into()),
                    ParseMode::Lenient => tracing::warn!(error = %e, "skipping malformed row"),
                },
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "Signal Desktop"
    }

    /// `sent_at` is millisecond-exact, so the same link re-shared later is a
    /// distinct event and time belongs in the dedup key.
    fn key_policy(&self) -> KeyPolicy {
        KeyPolicy::IdentifierSenderTime
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        body: Option<&str>,
        msg_type: Option<&str>,
        sent_at: Option<i64>,
        source: Option<&str>,
    ) -> MessageRow {
        MessageRow {
            body: body.map(str::to_string),
            msg_type: msg_type.map(str::to_string),
            sent_at,
            source: source.map(str::to_string),
        }
    }

    #[test]
    fn incoming_row_keeps_sender() {
        let msg = normalize_row(&row(Some("hi"), Some("incoming"), Some(123), Some("+431")), 1)
            .unwrap()
            .unwrap();
        assert_eq!(msg.sender_id.as_deref(), Some("+431"));
        assert_eq!(msg.timestamp_ms, 123);
    }

    #[test]
    fn outgoing_row_has_no_sender() {
        let msg = normalize_row(&row(Some("hi"), Some("outgoing"), Some(123), Some("+431")), 1)
            .unwrap()
            .unwrap();
        assert_eq!(msg.sender_id, None);
    }

    #[test]
    fn protocol_rows_and_empty_bodies_yield_nothing() {
        assert!(normalize_row(&row(Some("x"), Some("keychange"), Some(1), None), 1)
            .unwrap()
            .is_none());
        assert!(normalize_row(&row(None, Some("incoming"), Some(1), Some("s")), 1)
            .unwrap()
            .is_none());
        assert!(normalize_row(&row(Some("  "), Some("outgoing"), Some(1), None), 1)
            .unwrap()
            .is_none());
    }

    #[test]
    fn missing_required_fields_report_row_number() {
        let err = normalize_row(&row(Some("hi"), None, Some(1), None), 4).unwrap_err();
        assert_eq!(err, ParseError::row(4, "missing message type"));
        let err = normalize_row(&row(Some("hi"), Some("incoming"), None, Some("s")), 9).unwrap_err();
        assert!(matches!(err, ParseError::Row { row: 9, .. }));
    }
}
