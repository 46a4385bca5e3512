//! Element centers from a UI-hierarchy dump.
//!
//! The hierarchy is walked depth-first with an explicit stack. Children are
//! pushed in document order, so the last child is visited first. Every node
//! with a `bounds` attribute contributes the floor midpoint of its box until
//! [`OBSERVATION_SLOTS`] centers are collected; the remainder is padded with
//! `(0, 0)`. Nodes whose `bounds` cannot be parsed are skipped, but their
//! children are still visited.

use crate::error::BoundsError;
use droidlern_core::{diag, Point, OBSERVATION_SLOTS};
use std::path::Path;

/// Parallel x/y coordinate lists, always [`OBSERVATION_SLOTS`] long.
pub type Positions = (Vec<i32>, Vec<i32>);

/// All-zero positions, used when no dump is available.
pub fn empty_positions() -> Positions {
    (vec![0; OBSERVATION_SLOTS], vec![0; OBSERVATION_SLOTS])
}

/// Parses `"[x1,y1][x2,y2]"` into its two corners.
pub fn parse_bounds(bounds: &str) -> Result<(Point, Point), BoundsError> {
    let malformed = || BoundsError(bounds.to_string());
    let inner = bounds
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(malformed)?;
    let (left, right) = inner.split_once("][").ok_or_else(malformed)?;
    let corner = |s: &str| -> Option<Point> {
        let (x, y) = s.split_once(',')?;
        Some(Point::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    };
    Ok((
        corner(left).ok_or_else(malformed)?,
        corner(right).ok_or_else(malformed)?,
    ))
}

/// Floor of the mean; computed wide so extreme coordinates cannot overflow.
fn midpoint(a: i32, b: i32) -> i32 {
    (i64::from(a) + i64::from(b)).div_euclid(2) as i32
}

/// Samples element centers below `root`.
pub fn sample_positions(root: roxmltree::Node<'_, '_>) -> Positions {
    let mut posx = Vec::with_capacity(OBSERVATION_SLOTS);
    let mut posy = Vec::with_capacity(OBSERVATION_SLOTS);
    let mut stack = vec![root];

    while posx.len() < OBSERVATION_SLOTS {
        let Some(node) = stack.pop() else { break };
        if let Some(bounds) = node.attribute("bounds") {
            match parse_bounds(bounds) {
                Ok((a, b)) => {
                    posx.push(midpoint(a.x, b.x));
                    posy.push(midpoint(a.y, b.y));
                }
                Err(e) => diag::debug(&format!("skipping node: {e}")),
            }
        }
        stack.extend(node.children().filter(|c| c.is_element()));
    }

    posx.resize(OBSERVATION_SLOTS, 0);
    posy.resize(OBSERVATION_SLOTS, 0);
    (posx, posy)
}

/// Samples a dump given as XML text. Unparseable XML yields all zeros.
pub fn sample_xml(xml: &str) -> Positions {
    match roxmltree::Document::parse(xml) {
        Ok(doc) => sample_positions(doc.root_element()),
        Err(e) => {
            diag::warn(&format!("UI dump is not valid XML: {e}"));
            empty_positions()
        }
    }
}

/// Samples the dump stored at `path`. An unreadable file yields all zeros.
pub fn sample_file(path: &Path) -> Positions {
    match std::fs::read_to_string(path) {
        Ok(xml) => sample_xml(&xml),
        Err(e) => {
            diag::warn(&format!("could not read UI dump {}: {e}", path.display()));
            empty_positions()
        }
    }
}
