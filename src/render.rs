//! Pure table rendering.
//!
//! `Renderer::render` maps a snapshot to a styled string with no other
//! inputs, so identical snapshots (including the animation tick the display
//! loop stores in them) always produce identical frames. The same string
//! serves the live display and the final scrollback snapshot.

use std::cmp::Ordering;
use std::collections::HashMap;

use crossterm::style::{Attribute, Stylize};

use crate::state::{Phase, Slot, Snapshot, TargetRecord, TargetStatus};
use crate::theme::Theme;

/// Spinner frames for outstanding measurement cells.
const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Phase offset between adjacent slots so concurrent cells animate out of
/// phase with each other.
const SLOT_PHASE_STEP: u64 = 3;

/// Rank annotations for the three fastest relays.
const RANK_MARKS: [&str; 3] = ["①", "②", "③"];

const SEQ_WIDTH: usize = 3;
const LABEL_WIDTH: usize = 24;
const TIER_WIDTH: usize = 9;
const TRY_WIDTH: usize = 3;
const SLOT_WIDTH: usize = 8;
const AVG_WIDTH: usize = 10;

pub struct Renderer {
    theme: Theme,
    slow_threshold_ms: u64,
}

impl Renderer {
    pub fn new(theme: Theme, slow_threshold_ms: u64) -> Self {
        Self { theme, slow_threshold_ms }
    }

    /// Produce one frame. Rows always follow sequence-number order; only
    /// the rank annotations move between frames.
    pub fn render(&self, snap: &Snapshot) -> String {
        let ranks = rank_by_average(snap);
        let mut out = String::new();
        out.push_str(&self.header_line(snap));
        out.push('\n');
        out.push('\n');
        out.push_str(&self.column_header());
        out.push('\n');
        for row in &snap.rows {
            out.push_str(&self.row_line(row, ranks.get(&row.sequence).copied(), snap.tick));
            out.push('\n');
        }
        out
    }

    fn header_line(&self, snap: &Snapshot) -> String {
        let phase = snap.phase();
        let spinner = match phase {
            Phase::Complete => '●',
            _ => SPINNER_CHARS[(snap.tick % SPINNER_CHARS.len() as u64) as usize],
        };

        format!(
            " {} {} │ {} │ {}  {}  {}  {}  {} │ {} in flight",
            spinner.with(self.theme.highlight),
            "pulseboard".bold(),
            phase.label().with(self.theme.highlight).bold(),
            self.count_span(snap.count(TargetStatus::Pending), "pending", self.theme.muted),
            self.count_span(snap.count(TargetStatus::Retrying), "retry", self.theme.warning),
            self.count_span(snap.count(TargetStatus::Up), "up", self.theme.up),
            self.count_span(snap.count(TargetStatus::Timeout), "timeout", self.theme.warning),
            self.count_span(snap.count(TargetStatus::Down), "down", self.theme.critical),
            snap.in_flight,
        )
    }

    fn count_span(&self, n: usize, label: &str, color: crossterm::style::Color) -> String {
        if n > 0 {
            format!("{} {}", n.to_string().with(color), label)
        } else {
            format!("{} {}", "0".attribute(Attribute::Dim), label)
        }
    }

    fn column_header(&self) -> String {
        let line = format!(
            " {:>sw$}  {:<lw$}  {:<tw$}  {:>yw$}  {:<cw$}{:<cw$}{:<cw$}{:<cw$}  {:<aw$}  STATUS",
            "#",
            "RELAY",
            "TIER",
            "TRY",
            "S1",
            "S2",
            "S3",
            "S4",
            "AVG",
            sw = SEQ_WIDTH,
            lw = LABEL_WIDTH,
            tw = TIER_WIDTH,
            yw = TRY_WIDTH,
            cw = SLOT_WIDTH,
            aw = AVG_WIDTH,
        );
        format!("{}", line.attribute(Attribute::Dim))
    }

    fn row_line(&self, rec: &TargetRecord, rank: Option<usize>, tick: u64) -> String {
        let mut line = String::new();
        line.push(' ');
        line.push_str(&format!("{:>width$}", rec.sequence, width = SEQ_WIDTH));
        line.push_str("  ");
        line.push_str(&pad(&rec.target.label, LABEL_WIDTH));
        line.push_str("  ");
        line.push_str(&format!(
            "{}",
            pad(rec.target.tier.label(), TIER_WIDTH).attribute(Attribute::Dim)
        ));
        line.push_str("  ");
        line.push_str(&format!("{:>width$}", rec.attempt, width = TRY_WIDTH));
        line.push_str("  ");
        for (index, slot) in rec.slots.iter().enumerate() {
            line.push_str(&self.slot_cell(*slot, index, tick));
        }
        line.push_str("  ");
        line.push_str(&self.average_cell(rec, rank));
        line.push_str("  ");
        line.push_str(&self.status_cell(rec));
        line
    }

    fn slot_cell(&self, slot: Slot, index: usize, tick: u64) -> String {
        match slot {
            Slot::Idle => format!("{}", pad("-", SLOT_WIDTH).attribute(Attribute::Dim)),
            Slot::Waiting => {
                let phase = (tick + index as u64 * SLOT_PHASE_STEP) % SPINNER_CHARS.len() as u64;
                let cell = pad(&SPINNER_CHARS[phase as usize].to_string(), SLOT_WIDTH);
                format!("{}", cell.with(self.theme.highlight))
            }
            Slot::Done(ms) => pad(&format!("{ms}ms"), SLOT_WIDTH),
            Slot::Missed => format!("{}", pad("n/a", SLOT_WIDTH).attribute(Attribute::Dim)),
        }
    }

    fn average_cell(&self, rec: &TargetRecord, rank: Option<usize>) -> String {
        let Some(avg) = rec.average_ms() else {
            return format!("{}", pad("-", AVG_WIDTH).attribute(Attribute::Dim));
        };
        let plain = match rank {
            Some(r) => format!("{avg:.0}ms {}", RANK_MARKS[r]),
            None => format!("{avg:.0}ms"),
        };
        let padded = pad(&plain, AVG_WIDTH);
        if rank.is_some() {
            format!("{}", padded.with(self.theme.highlight).bold())
        } else {
            padded
        }
    }

    fn status_cell(&self, rec: &TargetRecord) -> String {
        let color = self.theme.status_color(rec.status);
        let mut cell = format!("{}", rec.status.symbol().with(color));
        if rec.status == TargetStatus::Down {
            if let Some(code) = &rec.error_code {
                cell.push(' ');
                cell.push_str(&format!("{}", code.as_str().with(self.theme.critical)));
            }
        }
        if self.is_slow(rec) {
            cell.push(' ');
            cell.push_str(&format!("{}", "slow".with(self.theme.warning).bold()));
        }
        cell
    }

    fn is_slow(&self, rec: &TargetRecord) -> bool {
        rec.status == TargetStatus::Up
            && rec.average_ms().is_some_and(|avg| avg > self.slow_threshold_ms as f64)
    }
}

/// Fresh top-3 ranking over up targets with every slot populated,
/// ascending average, ties broken by ascending sequence number. Keys are
/// sequence numbers, values are 0-based ranks.
fn rank_by_average(snap: &Snapshot) -> HashMap<usize, usize> {
    let mut pool: Vec<(f64, usize)> = snap
        .rows
        .iter()
        .filter(|r| r.is_rankable())
        .filter_map(|r| r.average_ms().map(|avg| (avg, r.sequence)))
        .collect();
    pool.sort_by(|a, b| {
        a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1))
    });
    pool.into_iter()
        .take(RANK_MARKS.len())
        .enumerate()
        .map(|(rank, (_, sequence))| (sequence, rank))
        .collect()
}

/// Pad (or truncate) to an exact display width.
fn pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    while out.chars().count() < width {
        out.push(' ');
    }
    out
}
