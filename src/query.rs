// 🔍 Audit Query Surface - Search and pagination over enrollment history
// Read-only views for the audit review screen. Everything here computes
// derived sequences; authority stays with the EnrollmentHistoryStore.

use serde::Serialize;

use crate::record::EnrollmentRecord;

// ============================================================================
// SEARCH
// ============================================================================

/// Case-insensitive substring search over a history.
///
/// A blank term returns the history unchanged, in the same order. A
/// non-blank term matches a record if ANY of these fields contains it:
/// reason, category, state (Spanish label or English name), previous
/// state, record type, or the human-formatted enrollment/recorded dates.
pub fn search(history: &[EnrollmentRecord], term: &str) -> Vec<EnrollmentRecord> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return history.to_vec();
    }

    history
        .iter()
        .filter(|record| record_matches(record, &needle))
        .cloned()
        .collect()
}

fn record_matches(record: &EnrollmentRecord, needle: &str) -> bool {
    let mut haystacks: Vec<String> = vec![
        record.state.as_str().to_lowercase(),
        record.state.display_label().to_lowercase(),
        record.category.as_str().to_lowercase(),
        record.record_type.as_str().to_lowercase(),
        record.record_type.display_label().to_lowercase(),
        record.enrolled_at_display(),
        record.recorded_at_display(),
    ];

    if let Some(reason) = &record.reason {
        haystacks.push(reason.to_lowercase());
    }

    if let Some(previous) = record.previous_state {
        haystacks.push(previous.as_str().to_lowercase());
        haystacks.push(previous.display_label().to_lowercase());
    }

    haystacks.iter().any(|value| value.contains(needle))
}

// ============================================================================
// PAGINATION
// ============================================================================

/// One page of a filtered history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// 1-indexed page number after clamping
    pub page_number: usize,

    /// Always at least 1, even for an empty input
    pub total_pages: usize,

    pub total_items: usize,
    pub page_size: usize,
}

impl<T> Page<T> {
    pub fn is_first(&self) -> bool {
        self.page_number == 1
    }

    pub fn is_last(&self) -> bool {
        self.page_number == self.total_pages
    }
}

/// Slice a filtered sequence into 1-indexed pages.
///
/// The requested page number is clamped to `[1, ceil(n / page_size)]`;
/// an empty input yields exactly one page of zero items, never an
/// out-of-range error.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page_number: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = usize::max(1, total_items.div_ceil(page_size));
    let page_number = page_number.clamp(1, total_pages);

    let start = (page_number - 1) * page_size;
    let end = usize::min(start + page_size, total_items);
    let page_items = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: page_items,
        page_number,
        total_pages,
        total_items,
        page_size,
    }
}

// ============================================================================
// AUDIT TRAIL VIEW
// ============================================================================

/// Stateful term + page position for the review screen.
///
/// Retains no copy of the history; callers hand the current history in on
/// every render. A new search term invalidates the previous page position
/// and resets to page 1.
#[derive(Debug, Clone)]
pub struct AuditTrailView {
    term: String,
    page_number: usize,
    page_size: usize,
}

impl AuditTrailView {
    pub fn new(page_size: usize) -> Self {
        AuditTrailView {
            term: String::new(),
            page_number: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    /// Change the search term; resets pagination to page 1.
    pub fn set_term(&mut self, term: &str) {
        if self.term != term {
            self.term = term.to_string();
            self.page_number = 1;
        }
    }

    pub fn go_to_page(&mut self, page_number: usize) {
        self.page_number = page_number.max(1);
    }

    pub fn next_page(&mut self) {
        self.page_number += 1;
    }

    pub fn previous_page(&mut self) {
        self.page_number = self.page_number.saturating_sub(1).max(1);
    }

    /// Filter and slice the given history for display.
    pub fn render(&mut self, history: &[EnrollmentRecord]) -> Page<EnrollmentRecord> {
        let filtered = search(history, &self.term);
        let page = paginate(&filtered, self.page_size, self.page_number);
        // Keep the cursor inside the clamped range for the next interaction
        self.page_number = page.page_number;
        page
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CategoryTier, EnrollmentState, RecordType};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn record(
        id: &str,
        state: EnrollmentState,
        previous: Option<EnrollmentState>,
        reason: Option<&str>,
        minute: u32,
    ) -> EnrollmentRecord {
        EnrollmentRecord {
            id: id.to_string(),
            state,
            previous_state: previous,
            category: CategoryTier::Infantil,
            reason: reason.map(str::to_string),
            enrolled_at: NaiveDate::from_ymd_opt(2025, 3, 15).unwrap(),
            recorded_at: Utc.with_ymd_and_hms(2025, 3, 15, 10, minute, 0).unwrap(),
            record_type: if previous.is_some() {
                RecordType::StateChange
            } else {
                RecordType::Initial
            },
        }
    }

    fn sample_history() -> Vec<EnrollmentRecord> {
        vec![
            record(
                "r3",
                EnrollmentState::Active,
                Some(EnrollmentState::Suspended),
                Some("Reactivación manual"),
                30,
            ),
            record(
                "r2",
                EnrollmentState::Suspended,
                Some(EnrollmentState::Active),
                Some("Lesión de rodilla"),
                20,
            ),
            record("r1", EnrollmentState::Active, None, None, 10),
        ]
    }

    #[test]
    fn test_blank_term_returns_history_unchanged() {
        let history = sample_history();

        let result = search(&history, "");
        assert_eq!(result, history);

        let result = search(&history, "   ");
        assert_eq!(result, history);
    }

    #[test]
    fn test_search_is_case_insensitive_on_state_label() {
        let history = vec![record("r1", EnrollmentState::Active, None, None, 10)];

        // "Vigente" is the on-screen label for Active
        let result = search(&history, "vigente");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "r1");

        let result = search(&history, "VIGENTE");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_search_matches_reason_substring() {
        let history = sample_history();

        let result = search(&history, "rodilla");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "r2");
    }

    #[test]
    fn test_search_matches_previous_state_and_type() {
        let history = sample_history();

        // previous_state = Suspended on r3 only; state = Suspended on r2
        let result = search(&history, "suspend");
        assert_eq!(result.len(), 2);

        let result = search(&history, "statechange");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_search_matches_human_formatted_date() {
        let history = sample_history();

        let result = search(&history, "15/03/2025");
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_search_preserves_order() {
        let history = sample_history();

        let result = search(&history, "a");
        let ids: Vec<&str> = result.iter().map(|r| r.id.as_str()).collect();
        let original: Vec<&str> = history
            .iter()
            .filter(|r| result.iter().any(|m| m.id == r.id))
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, original);
    }

    #[test]
    fn test_search_no_match() {
        let history = sample_history();
        assert!(search(&history, "zzz-no-such-term").is_empty());
    }

    #[test]
    fn test_paginate_twelve_items_page_three() {
        let items: Vec<u32> = (1..=12).collect();

        let page = paginate(&items, 5, 3);

        assert_eq!(page.items, vec![11, 12]);
        assert_eq!(page.page_number, 3);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 12);
        assert!(page.is_last());
    }

    #[test]
    fn test_paginate_empty_input_yields_one_empty_page() {
        let items: Vec<u32> = Vec::new();

        let page = paginate(&items, 5, 1);

        assert!(page.items.is_empty());
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.is_first() && page.is_last());
    }

    #[test]
    fn test_paginate_clamps_out_of_range_page() {
        let items: Vec<u32> = (1..=12).collect();

        // Beyond the last page clamps down
        let page = paginate(&items, 5, 99);
        assert_eq!(page.page_number, 3);
        assert_eq!(page.items, vec![11, 12]);

        // Page 0 clamps up
        let page = paginate(&items, 5, 0);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.items, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_view_resets_to_page_one_on_new_term() {
        let history = sample_history();
        let mut view = AuditTrailView::new(1);

        view.go_to_page(3);
        let page = view.render(&history);
        assert_eq!(page.page_number, 3);

        view.set_term("suspend");
        assert_eq!(view.page_number(), 1);

        let page = view.render(&history);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.total_items, 2);
    }

    #[test]
    fn test_view_same_term_keeps_position() {
        let history = sample_history();
        let mut view = AuditTrailView::new(1);

        view.set_term("a");
        view.next_page();
        let before = view.page_number();

        // Setting the identical term is not a new search
        view.set_term("a");
        assert_eq!(view.page_number(), before);
    }

    #[test]
    fn test_view_clamps_cursor_after_render() {
        let history = sample_history();
        let mut view = AuditTrailView::new(2);

        view.go_to_page(50);
        let page = view.render(&history);

        assert_eq!(page.page_number, 2); // 3 items, 2 per page
        assert_eq!(view.page_number(), 2);
    }
}
