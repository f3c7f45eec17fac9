//! S2 external filter: collapses consecutive same-kind swings to the
//! extreme, enforcing strict alternation.

use crate::types::{Swing, SwingKind};

/// Collapses runs of same-kind swings to their single extreme
/// representative. Ties are resolved with "latest wins" (the candidate
/// replaces the tail when it is *at least* as extreme, not only when
/// strictly more extreme) — spec.md §9 open question (d).
pub fn extract_external_structure(swings: &[Swing]) -> Vec<Swing> {
    let mut out: Vec<Swing> = Vec::new();
    for &s in swings {
        match out.last_mut() {
            None => out.push(s),
            Some(tail) if tail.kind == s.kind => {
                let replaces = match s.kind {
                    SwingKind::SwingHigh => s.price >= tail.price,
                    SwingKind::SwingLow => s.price <= tail.price,
                };
                if replaces {
                    *tail = s;
                }
            }
            Some(_) => out.push(s),
        }
    }
    out
}
