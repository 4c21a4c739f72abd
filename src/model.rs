// 🧭 Model - live Book, its undo timeline, and the current list filters
//
// Commands only ever see a Model. Mutating commands change the Book and then
// call `commit_book()` themselves; queries only move the filters.

use crate::book::{Book, Result};
use crate::entities::{Client, Policy, PolicyType};
use crate::history::History;
use crate::values::{ClientId, PolicyTypeId, PolicyTypeName};

// ============================================================================
// FILTER PREDICATES
// ============================================================================

/// Which clients the client list currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientPredicate {
    #[default]
    All,

    /// Any keyword equals a word of the name, ignoring case
    NameKeywords(Vec<String>),

    Id(ClientId),
}

impl ClientPredicate {
    pub fn test(&self, client: &Client) -> bool {
        match self {
            ClientPredicate::All => true,
            ClientPredicate::NameKeywords(keywords) => client.name_has_any_word(keywords),
            ClientPredicate::Id(id) => &client.id == id,
        }
    }
}

/// Which policy types the policy-type list currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PolicyTypePredicate {
    #[default]
    All,
    Name(PolicyTypeName),
    Id(PolicyTypeId),

    /// Name and id both equal
    BothKeys(PolicyTypeName, PolicyTypeId),

    /// Name or id equal
    EitherKey(PolicyTypeName, PolicyTypeId),
}

impl PolicyTypePredicate {
    pub fn test(&self, policy_type: &PolicyType) -> bool {
        match self {
            PolicyTypePredicate::All => true,
            PolicyTypePredicate::Name(name) => &policy_type.name == name,
            PolicyTypePredicate::Id(id) => &policy_type.id == id,
            PolicyTypePredicate::BothKeys(name, id) => {
                &policy_type.name == name && &policy_type.id == id
            }
            PolicyTypePredicate::EitherKey(name, id) => {
                &policy_type.name == name || &policy_type.id == id
            }
        }
    }
}

// ============================================================================
// MODEL
// ============================================================================

#[derive(Debug, Clone)]
pub struct Model {
    book: Book,
    history: History,
    client_filter: ClientPredicate,
    policy_type_filter: PolicyTypePredicate,
}

impl Model {
    /// Wrap a loaded Book; it becomes the first snapshot of the timeline
    pub fn new(book: Book) -> Self {
        let history = History::new(&book);
        Model {
            book,
            history,
            client_filter: ClientPredicate::All,
            policy_type_filter: PolicyTypePredicate::All,
        }
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut Book {
        &mut self.book
    }

    /// Run a multi-step mutation against a scratch copy
    ///
    /// The copy is installed only if `mutation` succeeds, so a failure
    /// halfway through leaves the live Book untouched.
    pub fn try_mutate<T, F>(&mut self, mutation: F) -> Result<T>
    where
        F: FnOnce(&mut Book) -> Result<T>,
    {
        let mut scratch = self.book.clone();
        let output = mutation(&mut scratch)?;
        self.book = scratch;
        Ok(output)
    }

    // ------------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------------

    pub fn commit_book(&mut self) {
        self.history.commit(&self.book);
    }

    pub fn can_undo_book(&self) -> bool {
        self.history.can_undo()
    }

    pub fn undo_book(&mut self) -> Result<()> {
        self.history.undo(&mut self.book)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    // ------------------------------------------------------------------------
    // Filtered views
    // ------------------------------------------------------------------------

    pub fn update_client_filter(&mut self, predicate: ClientPredicate) {
        self.client_filter = predicate;
    }

    pub fn client_filter(&self) -> &ClientPredicate {
        &self.client_filter
    }

    pub fn filtered_clients(&self) -> Vec<&Client> {
        self.book.filtered_clients(|c| self.client_filter.test(c))
    }

    pub fn update_policy_type_filter(&mut self, predicate: PolicyTypePredicate) {
        self.policy_type_filter = predicate;
    }

    pub fn policy_type_filter(&self) -> &PolicyTypePredicate {
        &self.policy_type_filter
    }

    pub fn filtered_policy_types(&self) -> Vec<&PolicyType> {
        self.book
            .policy_types()
            .filtered(|p| self.policy_type_filter.test(p))
    }

    /// Policies across all portfolios matching a caller-supplied predicate
    pub fn filtered_policies<F>(&self, predicate: F) -> Vec<&Policy>
    where
        F: Fn(&Policy) -> bool,
    {
        self.book.filtered_policies(predicate)
    }

    pub fn reset_filters(&mut self) {
        self.client_filter = ClientPredicate::All;
        self.policy_type_filter = PolicyTypePredicate::All;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BookError;
    use chrono::NaiveDate;

    fn create_test_client(id: &str, name: &str) -> Client {
        Client::new(
            id.parse().unwrap(),
            name.parse().unwrap(),
            "99272758".parse().unwrap(),
            "someone@example.com".parse().unwrap(),
            "Blk 47 Tampines Street 20".parse().unwrap(),
            NaiveDate::from_ymd_opt(1988, 11, 2).unwrap(),
        )
    }

    fn policy_type(name: &str, id: &str) -> PolicyType {
        PolicyType::new(name.parse().unwrap(), id.parse().unwrap())
    }

    #[test]
    fn test_try_mutate_discards_scratch_on_failure() {
        let mut model = Model::new(Book::new());
        model.book_mut().add_client(create_test_client("C1", "Bernice Yu")).unwrap();
        let before = model.book().clone();

        let result = model.try_mutate(|book| {
            book.add_client(create_test_client("C2", "David Li"))?;
            book.add_client(create_test_client("C1", "Duplicate"))
        });

        assert!(matches!(result, Err(BookError::DuplicateIdentity { .. })));
        assert_eq!(model.book(), &before);
    }

    #[test]
    fn test_try_mutate_installs_on_success() {
        let mut model = Model::new(Book::new());
        model
            .try_mutate(|book| {
                book.add_client(create_test_client("C1", "Bernice Yu"))?;
                book.add_client(create_test_client("C2", "David Li"))
            })
            .unwrap();
        assert_eq!(model.book().client_count(), 2);
    }

    #[test]
    fn test_client_filter() {
        let mut model = Model::new(Book::new());
        model.book_mut().add_client(create_test_client("C1", "Bernice Yu")).unwrap();
        model.book_mut().add_client(create_test_client("C2", "David Li")).unwrap();

        model.update_client_filter(ClientPredicate::NameKeywords(vec!["li".to_string()]));
        let shown: Vec<&str> = model.filtered_clients().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(shown, vec!["C2"]);

        model.reset_filters();
        assert_eq!(model.filtered_clients().len(), 2);
    }

    #[test]
    fn test_policy_type_filter() {
        let mut model = Model::new(Book::new());
        model.book_mut().add_policy_type(policy_type("X", "1")).unwrap();
        model.book_mut().add_policy_type(policy_type("Y", "2")).unwrap();

        model.update_policy_type_filter(PolicyTypePredicate::EitherKey(
            "X".parse().unwrap(),
            "2".parse().unwrap(),
        ));
        assert_eq!(model.filtered_policy_types().len(), 2);

        model.update_policy_type_filter(PolicyTypePredicate::BothKeys(
            "X".parse().unwrap(),
            "2".parse().unwrap(),
        ));
        assert!(model.filtered_policy_types().is_empty());
    }

    #[test]
    fn test_commit_and_undo_through_model() {
        let mut model = Model::new(Book::new());
        assert!(!model.can_undo_book());

        model.book_mut().add_client(create_test_client("C1", "Bernice Yu")).unwrap();
        model.commit_book();
        assert!(model.can_undo_book());

        model.undo_book().unwrap();
        assert_eq!(model.book().client_count(), 0);
        assert_eq!(model.undo_book(), Err(BookError::NoHistory));
    }
}
