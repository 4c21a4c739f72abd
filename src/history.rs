// ⏪ History - snapshot timeline behind undo
//
// The timeline is a list of immutable deep copies of the Book plus a cursor.
// Committing drops everything after the cursor, so there is no redo: an
// undone future is gone as soon as something new is committed.

use crate::book::Book;
use crate::error::BookError;
use chrono::{DateTime, Utc};
use tracing::debug;

// ============================================================================
// SNAPSHOT
// ============================================================================

/// Immutable copy of the whole Book at one point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Unique snapshot ID
    pub snapshot_id: String,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    book: Book,
}

impl Snapshot {
    fn capture(book: &Book) -> Self {
        Snapshot {
            snapshot_id: uuid::Uuid::new_v4().to_string(),
            taken_at: Utc::now(),
            book: book.clone(),
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// `snapshots[cursor]` is the state the live Book was last committed to
/// or restored from.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    cursor: usize,
}

impl History {
    /// Start a timeline whose only entry is `initial`
    pub fn new(initial: &Book) -> Self {
        History {
            snapshots: vec![Snapshot::capture(initial)],
            cursor: 0,
        }
    }

    /// Record the current Book as the newest state, discarding any undone future
    pub fn commit(&mut self, book: &Book) {
        let discarded = self.snapshots.len() - (self.cursor + 1);
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(Snapshot::capture(book));
        self.cursor += 1;
        debug!(cursor = self.cursor, discarded, "book state committed");
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Step back one snapshot and reset `book` to it in place
    pub fn undo(&mut self, book: &mut Book) -> Result<(), BookError> {
        if !self.can_undo() {
            return Err(BookError::NoHistory);
        }
        self.cursor -= 1;
        book.reset_data(self.snapshots[self.cursor].book());
        debug!(cursor = self.cursor, "book state restored");
        Ok(())
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Client, PolicyType};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn create_test_client(id: &str) -> Client {
        Client::new(
            id.parse().unwrap(),
            "Charlotte Oliveiro".parse().unwrap(),
            "93210283".parse().unwrap(),
            "charlotte@example.com".parse().unwrap(),
            "Blk 11 Ang Mo Kio Street 74".parse().unwrap(),
            NaiveDate::from_ymd_opt(1991, 7, 14).unwrap(),
        )
    }

    #[test]
    fn test_new_history_cannot_undo() {
        let mut book = Book::new();
        let mut history = History::new(&book);

        assert!(!history.can_undo());
        assert_eq!(history.undo(&mut book), Err(BookError::NoHistory));
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_undo_round_trip() {
        let mut book = Book::new();
        let b0 = book.clone();
        let mut history = History::new(&book);

        book.add_client(create_test_client("C1")).unwrap();
        history.commit(&book);
        assert!(history.can_undo());

        history.undo(&mut book).unwrap();
        assert_eq!(book, b0);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_commit_truncates_undone_future() {
        let mut book = Book::new();
        let mut history = History::new(&book);

        book.add_client(create_test_client("C1")).unwrap();
        history.commit(&book);
        let after_first = book.clone();

        history.undo(&mut book).unwrap();
        assert_eq!(book.client_count(), 0);

        book.add_policy_type(PolicyType::new("Life".parse().unwrap(), "1".parse().unwrap()))
            .unwrap();
        history.commit(&book);
        assert_eq!(history.len(), 2);

        history.undo(&mut book).unwrap();
        assert_eq!(book, Book::new());
        assert_ne!(book, after_first);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_snapshots_are_detached_from_live_book() {
        let mut book = Book::new();
        let mut history = History::new(&book);

        book.add_client(create_test_client("C1")).unwrap();
        history.commit(&book);

        book.add_client(create_test_client("C2")).unwrap();
        assert_eq!(history.current().book().client_count(), 1);
        assert!(!history.current().snapshot_id.is_empty());
    }
}
