// src/source/whatsapp.rs
//! WhatsApp text-export source.
//!
//! The export is line oriented. A message starts with a header line
//! `<date>, <time> - <author>: <body>`; any line not matching that grammar is
//! a continuation of the previous message and is silently dropped (links in
//! continuation lines are lost — accepted tradeoff, the header line carries
//! them in practice). Dates are day-first (`25/11/2016`), never parsed through
//! a locale.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, TimeZone};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::path::{Path, PathBuf};

use crate::dedup::KeyPolicy;
use crate::error::ParseError;
use crate::source::{MessageSource, ParseMode};
use crate::types::NormalizedMessage;

/// Event phrases WhatsApp appends to the author slot ("Alice left",
/// "Bob changed the subject"). Matched as whole suffixes, never as substrings,
/// so a real author or body mentioning "left" is untouched.
const AUTHOR_NOTICES: &[&str] = &[
    "Messages to this chat and calls are now secured with end-to-end encryption",
    "Messages and calls are end-to-end encrypted",
    "created group",
    "created this group",
    "added you",
    "changed the subject",
    "changed this group's icon",
    "left",
    "joined using this group's invite link",
];

/// Notices that arrive as the entire message body.
const BODY_NOTICES: &[&str] = &["This message was deleted", "You deleted this message"];

fn header_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4}), (\d{1,2}):(\d{2}) - ([^:]+): (.*)$").unwrap()
    })
}

/// `+` prefix marks a phone number: strip internal whitespace. Anything else
/// passes through trimmed; empty becomes `None`.
fn normalize_author(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('+') {
        Some(trimmed.chars().filter(|c| !c.is_whitespace()).collect())
    } else {
        Some(trimmed.to_string())
    }
}

fn is_system_notice(author: &str, body: &str) -> bool {
    let author = author.trim();
    let body = body.trim();
    AUTHOR_NOTICES
        .iter()
        .any(|n| author == *n || author.ends_with(&format!(" {n}")))
        || BODY_NOTICES.iter().any(|n| body == *n)
}

/// Day-first date plus 24-hour time, interpreted in the machine's local
/// timezone, to epoch millis. `None` for impossible dates (month 13) or
/// nonexistent local times (DST gap).
fn local_epoch_ms(day: u32, month: u32, year: i32, hour: u32, minute: u32) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let naive = date.and_hms_opt(hour, minute, 0)?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
}

/// Parse one export line. `Ok(None)` for continuations and suppressed system
/// notices; `Err` only for header lines whose date/time cannot exist.
pub fn parse_line(
    line: &str,
    line_no: usize,
    skip_system_notices: bool,
) -> Result<Option<NormalizedMessage>, ParseError> {
    let caps = match header_re().captures(line) {
        Some(c) => c,
        None => return Ok(None), // continuation line
    };

    // Unwraps are safe: the grammar only matches digit runs.
    let day: u32 = caps[1].parse().unwrap();
    let month: u32 = caps[2].parse().unwrap();
    let year: i32 = caps[3].parse().unwrap();
    let hour: u32 = caps[4].parse().unwrap();
    let minute: u32 = caps[5].parse().unwrap();
    let author_raw = &caps[6];
    let body = &caps[7];

    if skip_system_notices && is_system_notice(author_raw, body) {
        return Ok(None);
    }

    let timestamp_ms = local_epoch_ms(day, month, year, hour, minute).ok_or_else(|| {
        ParseError::line(
            line_no,
            format!("invalid date/time {day}/{month}/{year} {hour}:{minute:02}"),
        )
    })?;

    Ok(Some(NormalizedMessage {
        text: body.to_string(),
        timestamp_ms,
        sender_id: normalize_author(author_raw),
    }))
}

/// Parse a whole export. Strict mode aborts on the first bad header line;
/// lenient mode logs it and keeps going.
pub fn parse_export(content: &str, mode: ParseMode, skip_system_notices: bool) -> Result<Vec<NormalizedMessage>> {
    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        match parse_line(line, i + 1, skip_system_notices) {
            Ok(Some(msg)) => out.push(msg),
            Ok(None) => {}
            Err(e) => match mode {
                ParseMode::Strict => return Err(e.into()),
                ParseMode::Lenient => tracing::warn!(error = %e, "skipping malformed line"),
            },
        }
    }
    Ok(out)
}

pub struct WhatsAppSource {
    path: PathBuf,
    skip_system_notices: bool,
}

impl WhatsAppSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            skip_system_notices: false,
        }
    }

    pub fn skip_system_notices(mut self, skip: bool) -> Self {
        self.skip_system_notices = skip;
        self
    }
}

#[async_trait]
impl MessageSource for WhatsAppSource {
    async fn read_messages(&self, mode: ParseMode) -> Result<Vec<NormalizedMessage>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading WhatsApp export from {}", self.path.display()))?;
        parse_export(&content, mode, self.skip_system_notices)
    }

    fn name(&self) -> &'static str {
        "WhatsApp export"
    }

    /// Export timestamps are minute-granular and shift between re-exports, so
    /// repeats from the same sender collapse to the earliest occurrence.
    fn key_policy(&self) -> KeyPolicy {
        KeyPolicy::IdentifierSender
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_ms(day: u32, month: u32, year: i32, hour: u32, minute: u32) -> i64 {
        local_epoch_ms(day, month, year, hour, minute).unwrap()
    }

    #[test]
    fn header_line_parses_with_phone_author() {
        let msg = parse_line(
            "25/11/2016, 01:29 - +43 677 6141397: check this https://youtu.be/abc12345678",
            1,
            false,
        )
        .unwrap()
        .unwrap();
        assert_eq!(msg.sender_id.as_deref(), Some("+436776141397"));
        assert_eq!(msg.text, "check this https://youtu.be/abc12345678");
        assert_eq!(msg.timestamp_ms, expected_ms(25, 11, 2016, 1, 29));
    }

    #[test]
    fn single_digit_day_and_hour_are_accepted() {
        let msg = parse_line("3/2/2017, 9:05 - Alice: hi", 1, false)
            .unwrap()
            .unwrap();
        assert_eq!(msg.sender_id.as_deref(), Some("Alice"));
        assert_eq!(msg.timestamp_ms, expected_ms(3, 2, 2017, 9, 5));
    }

    #[test]
    fn day_comes_before_month() {
        // 25/11 must be November 25th, not fail as month 25
        assert!(parse_line("25/11/2016, 01:29 - a: b", 1, false).unwrap().is_some());
        assert!(parse_line("11/25/2016, 01:29 - a: b", 1, false).is_err());
    }

    #[test]
    fn continuation_line_yields_nothing_without_error() {
        assert_eq!(parse_line("just a second paragraph", 7, false).unwrap(), None);
        assert_eq!(parse_line("", 8, false).unwrap(), None);
    }

    #[test]
    fn system_notice_suppression_is_flag_controlled() {
        let line = "25/11/2016, 01:29 - Alice changed the subject: from x to y";
        assert!(parse_line(line, 1, true).unwrap().is_none());
        assert!(parse_line(line, 1, false).unwrap().is_some());
    }

    #[test]
    fn notice_words_inside_a_real_body_are_not_suppressed() {
        // "left" is only a notice as the whole author suffix, never as a body word
        let line = "25/11/2016, 01:29 - Bob: left you the link https://youtu.be/abc12345678";
        let msg = parse_line(line, 1, true).unwrap().unwrap();
        assert_eq!(msg.sender_id.as_deref(), Some("Bob"));
        assert_eq!(msg.text, "left you the link https://youtu.be/abc12345678");

        // whereas the actual departure notice is suppressed
        assert!(parse_line("25/11/2016, 01:30 - Bob left: ", 2, true)
            .unwrap()
            .is_none());
    }

    #[test]
    fn deletion_notice_matches_only_the_whole_body() {
        let deleted = "25/11/2016, 01:29 - Bob: This message was deleted";
        assert!(parse_line(deleted, 1, true).unwrap().is_none());

        let quoting = "25/11/2016, 01:29 - Bob: he said This message was deleted lol";
        assert!(parse_line(quoting, 1, true).unwrap().is_some());
    }

    #[test]
    fn author_notice_must_be_a_suffix_not_a_substring() {
        // a person actually named e.g. "Cleft" must survive the flag
        let line = "25/11/2016, 01:29 - Cleft: hello";
        assert!(parse_line(line, 1, true).unwrap().is_some());
    }

    #[test]
    fn empty_author_becomes_none() {
        assert_eq!(normalize_author("   "), None);
        assert_eq!(normalize_author(" Bob "), Some("Bob".to_string()));
        assert_eq!(
            normalize_author("+43 677 6141397"),
            Some("+436776141397".to_string())
        );
    }

    #[test]
    fn lenient_mode_keeps_good_lines_around_bad_ones() {
        let export = "25/11/2016, 01:29 - a: one\n31/2/2017, 10:00 - b: bad date\n26/11/2016, 02:30 - c: two\n";
        let msgs = parse_export(export, ParseMode::Lenient, false).unwrap();
        assert_eq!(msgs.len(), 2);
        assert!(parse_export(export, ParseMode::Strict, false).is_err());
    }
}
