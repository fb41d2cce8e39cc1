// ==========================================
// Competition Scheduler - Entry Numbering
// ==========================================
// Competition order = session order, then running order.
// Finalize numbers every scheduled entry from ENTRY_NUMBER_START.
// Entries placed after numbering is locked borrow the number of the
// nearest numbered predecessor plus a lowercase suffix (156a, 156b, ...).
// ==========================================

use crate::domain::entry::SchedulingEntry;
use crate::domain::entry_number::{EntryNumber, ENTRY_NUMBER_START};
use crate::domain::session::SessionCapacity;
use crate::engine::conflict_detector::entries_in_running_order;
use std::collections::HashSet;

/// Scheduled entries in competition order. Entries of sessions missing
/// from `sessions` are left out.
pub fn competition_order<'a>(
    entries: &'a [SchedulingEntry],
    sessions: &[SessionCapacity],
) -> Vec<&'a SchedulingEntry> {
    let mut seen: HashSet<&str> = HashSet::new();
    sessions
        .iter()
        .filter(|s| seen.insert(s.session_id.as_str()))
        .flat_map(|s| entries_in_running_order(s, entries))
        .collect()
}

/// Fresh numbering: `start, start + 1, ...` in competition order, no suffixes.
pub fn assign_entry_numbers(
    entries: &[SchedulingEntry],
    sessions: &[SessionCapacity],
    start: u32,
) -> Vec<(String, EntryNumber)> {
    competition_order(entries, sessions)
        .into_iter()
        .zip(start..)
        .map(|(entry, number)| (entry.id.clone(), EntryNumber::new(number)))
        .collect()
}

/// Number for an entry scheduled after numbering was locked.
///
/// Without a numbered predecessor the base is `ENTRY_NUMBER_START`, so
/// nothing is ever numbered below it.
/// Returns `None` when the entry is not scheduled in one of `sessions`,
/// or when all 26 suffixes of the base number are taken.
pub fn late_entry_number(
    entry_id: &str,
    entries: &[SchedulingEntry],
    sessions: &[SessionCapacity],
) -> Option<EntryNumber> {
    let ordered = competition_order(entries, sessions);
    let position = ordered.iter().position(|e| e.id == entry_id)?;

    let base = ordered[..position]
        .iter()
        .rev()
        .find_map(|e| e.entry_number)
        .map(|n| n.number)
        .unwrap_or(ENTRY_NUMBER_START);

    let used: HashSet<char> = entries
        .iter()
        .filter(|e| e.id != entry_id)
        .filter_map(|e| e.entry_number)
        .filter(|n| n.number == base)
        .filter_map(|n| n.suffix)
        .collect();

    ('a'..='z')
        .find(|c| !used.contains(c))
        .map(|suffix| EntryNumber::late(base, suffix))
}
