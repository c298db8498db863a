//! Pose-log parser.
//!
//! A pose log is a whitespace-delimited table with one header line followed by
//! one line per recorded waypoint:
//!
//! ```text
//! Timestamp Position (X, Y, Z) Orientation (Rx, Ry, Rz) Claw Status
//! 2025-04-27_15-34-33-519 166.5982 -165.0889 168.8611 88.0599 -2.6958 -90.3270 1 0
//! ```
//!
//! Three line formats exist, distinguished purely by token count:
//!
//! - **9 tokens** – timestamp, position ×3, orientation ×3, claw status,
//!   arm flag.
//! - **8 tokens** – as above without the arm flag (arm flag := 0).
//! - **anything else with ≥ 7 tokens** – the legacy format: no status columns
//!   at all. Claw status is inferred from the row's position in the file (see
//!   [`legacy_claw_status`]); arm flag := 0.
//!
//! Fewer than 7 tokens, or a non-numeric field, is a hard parse error carrying
//! the 1-based data-row number.

use thiserror::Error;
use vlaforge_types::{CLAW_CLOSED, CLAW_OPEN, PoseRecord};

// ────────────────────────────────────────────────────────────────────────────
// Error type
// ────────────────────────────────────────────────────────────────────────────

/// Errors from parsing a pose log.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoseLogError {
    #[error("Pose log row {row} has {tokens} token(s); at least 7 are required")]
    Truncated { row: usize, tokens: usize },
    #[error("Pose log row {row}: {field} field '{token}' is not numeric")]
    BadNumber {
        row: usize,
        field: &'static str,
        token: String,
    },
}

// ────────────────────────────────────────────────────────────────────────────
// Line format
// ────────────────────────────────────────────────────────────────────────────

/// Which grammar variant a pose-log line matched. Exposed for diagnostics so
/// callers can tell when an episode fell back to the legacy format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineFormat {
    /// Nine tokens: explicit claw status and arm flag.
    Explicit,
    /// Eight tokens: explicit claw status, no arm flag column.
    ExplicitNoArm,
    /// No status columns; claw status inferred from the row number.
    Legacy,
}

/// One parsed pose-log line together with the grammar variant it matched.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseLine {
    pub record: PoseRecord,
    pub format: LineFormat,
}

// ────────────────────────────────────────────────────────────────────────────
// Legacy fallback
// ────────────────────────────────────────────────────────────────────────────

/// Compatibility shim for logs recorded before the claw-status column existed.
///
/// Those recordings followed a fixed choreography in which data rows 1, 2 and
/// 5 (1-based, header excluded) had the gripper closed and every other row
/// had it open. This is brittle by construction and intentionally not
/// generalized; it exists only so historical episodes keep loading.
pub fn legacy_claw_status(row: usize) -> i32 {
    if row == 1 || row == 2 || row == 5 {
        CLAW_CLOSED
    } else {
        CLAW_OPEN
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parser
// ────────────────────────────────────────────────────────────────────────────

/// Parse a pose-log text blob into ordered pose lines.
///
/// Line 0 is the header and is skipped; output order is input order. `row` in
/// errors and in the legacy fallback is the 1-based data-row number.
pub fn parse_pose_log(text: &str) -> Result<Vec<PoseLine>, PoseLogError> {
    let mut out = Vec::new();
    for (row, line) in text.trim().lines().enumerate() {
        if row == 0 {
            continue;
        }
        out.push(parse_line(row, line)?);
    }
    Ok(out)
}

fn parse_line(row: usize, line: &str) -> Result<PoseLine, PoseLogError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 7 {
        return Err(PoseLogError::Truncated {
            row,
            tokens: tokens.len(),
        });
    }

    let timestamp = tokens[0].to_string();
    let position_mm = [
        parse_f64(row, "position", tokens[1])?,
        parse_f64(row, "position", tokens[2])?,
        parse_f64(row, "position", tokens[3])?,
    ];
    let orientation_deg = [
        parse_f64(row, "orientation", tokens[4])?,
        parse_f64(row, "orientation", tokens[5])?,
        parse_f64(row, "orientation", tokens[6])?,
    ];

    let (claw_status, arm_flag, format) = match tokens.len() {
        9 => (
            parse_i32(row, "claw status", tokens[7])?,
            parse_i32(row, "arm flag", tokens[8])?,
            LineFormat::Explicit,
        ),
        8 => (
            parse_i32(row, "claw status", tokens[7])?,
            0,
            LineFormat::ExplicitNoArm,
        ),
        _ => (legacy_claw_status(row), 0, LineFormat::Legacy),
    };

    Ok(PoseLine {
        record: PoseRecord {
            timestamp,
            position_mm,
            orientation_deg,
            claw_status,
            arm_flag,
        },
        format,
    })
}

fn parse_f64(row: usize, field: &'static str, token: &str) -> Result<f64, PoseLogError> {
    token.parse().map_err(|_| PoseLogError::BadNumber {
        row,
        field,
        token: token.to_string(),
    })
}

fn parse_i32(row: usize, field: &'static str, token: &str) -> Result<i32, PoseLogError> {
    token.parse().map_err(|_| PoseLogError::BadNumber {
        row,
        field,
        token: token.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Timestamp Position (X, Y, Z) Orientation (Rx, Ry, Rz) Claw Status";

    fn log(lines: &[&str]) -> String {
        let mut text = HEADER.to_string();
        for line in lines {
            text.push('\n');
            text.push_str(line);
        }
        text
    }

    // ── Explicit formats ────────────────────────────────────────────────────

    #[test]
    fn nine_tokens_recover_all_fields() {
        let text = log(&["t0 166.5982 -165.0889 168.8611 88.0599 -2.6958 -90.3270 1 2"]);
        let lines = parse_pose_log(&text).unwrap();
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line.format, LineFormat::Explicit);
        assert_eq!(line.record.timestamp, "t0");
        assert_eq!(line.record.position_mm, [166.5982, -165.0889, 168.8611]);
        assert_eq!(line.record.orientation_deg, [88.0599, -2.6958, -90.3270]);
        assert_eq!(line.record.claw_status, 1);
        assert_eq!(line.record.arm_flag, 2);
    }

    #[test]
    fn eight_tokens_default_arm_flag_to_zero() {
        let text = log(&["t0 1.0 2.0 3.0 4.0 5.0 6.0 0"]);
        let lines = parse_pose_log(&text).unwrap();
        assert_eq!(lines[0].format, LineFormat::ExplicitNoArm);
        assert_eq!(lines[0].record.claw_status, CLAW_CLOSED);
        assert_eq!(lines[0].record.arm_flag, 0);
    }

    // ── Legacy fallback ─────────────────────────────────────────────────────

    #[test]
    fn legacy_rows_one_two_five_are_closed() {
        let rows: Vec<String> = (0..6)
            .map(|i| format!("t{i} 1.0 2.0 3.0 4.0 5.0 6.0"))
            .collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let lines = parse_pose_log(&log(&refs)).unwrap();
        assert_eq!(lines.len(), 6);

        let statuses: Vec<i32> = lines.iter().map(|l| l.record.claw_status).collect();
        assert_eq!(
            statuses,
            [
                CLAW_CLOSED,
                CLAW_CLOSED,
                CLAW_OPEN,
                CLAW_OPEN,
                CLAW_CLOSED,
                CLAW_OPEN
            ]
        );
        assert!(lines.iter().all(|l| l.format == LineFormat::Legacy));
        assert!(lines.iter().all(|l| l.record.arm_flag == 0));
    }

    // ── Errors ──────────────────────────────────────────────────────────────

    #[test]
    fn short_line_is_truncated_error() {
        let text = log(&["t0 1.0 2.0 3.0"]);
        let err = parse_pose_log(&text).unwrap_err();
        assert_eq!(err, PoseLogError::Truncated { row: 1, tokens: 4 });
    }

    #[test]
    fn non_numeric_position_is_bad_number() {
        let text = log(&["t0 1.0 oops 3.0 4.0 5.0 6.0 1 0"]);
        let err = parse_pose_log(&text).unwrap_err();
        assert!(matches!(
            err,
            PoseLogError::BadNumber {
                row: 1,
                field: "position",
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_claw_is_bad_number() {
        let text = log(&["t0 1.0 2.0 3.0 4.0 5.0 6.0 open"]);
        let err = parse_pose_log(&text).unwrap_err();
        assert!(matches!(
            err,
            PoseLogError::BadNumber {
                field: "claw status",
                ..
            }
        ));
    }

    #[test]
    fn error_reports_correct_row() {
        let text = log(&[
            "t0 1.0 2.0 3.0 4.0 5.0 6.0 1 0",
            "t1 1.0 2.0 3.0 4.0 5.0 6.0 1 0",
            "t2 broken",
        ]);
        let err = parse_pose_log(&text).unwrap_err();
        assert_eq!(err, PoseLogError::Truncated { row: 3, tokens: 2 });
    }

    // ── Whole-log behaviour ─────────────────────────────────────────────────

    #[test]
    fn header_only_log_parses_to_empty() {
        assert!(parse_pose_log(HEADER).unwrap().is_empty());
    }

    #[test]
    fn output_order_matches_input_order() {
        let text = log(&[
            "t0 1.0 0.0 0.0 0.0 0.0 0.0 1 0",
            "t1 2.0 0.0 0.0 0.0 0.0 0.0 1 0",
            "t2 3.0 0.0 0.0 0.0 0.0 0.0 1 0",
        ]);
        let lines = parse_pose_log(&text).unwrap();
        let xs: Vec<f64> = lines.iter().map(|l| l.record.position_mm[0]).collect();
        assert_eq!(xs, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn surrounding_blank_lines_are_tolerated() {
        let text = format!("\n\n{}\n\n", log(&["t0 1.0 2.0 3.0 4.0 5.0 6.0 1 0"]));
        let lines = parse_pose_log(&text).unwrap();
        assert_eq!(lines.len(), 1);
    }
}
