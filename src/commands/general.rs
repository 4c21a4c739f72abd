// General commands: undo, clear, reminders, exit

use crate::book::{Book, Result};
use crate::commands::{Command, CommandResult, View};
use crate::model::Model;
use chrono::NaiveDate;
use tracing::info;

/// Step the Book back to the previous committed state
#[derive(Debug, Clone, Default)]
pub struct UndoCommand;

impl Command for UndoCommand {
    fn name(&self) -> &'static str {
        "undo"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.undo_book()?;
        model.reset_filters();

        let history = model.history();
        let restored = history.current();
        info!(cursor = history.cursor(), snapshot = %restored.snapshot_id, "undo applied");
        Ok(CommandResult::with_view(
            format!(
                "Undo success! Restored the state from {} ({} more undo step(s) available)",
                restored.taken_at.format("%Y-%m-%d %H:%M:%S UTC"),
                history.cursor()
            ),
            View::ClientList,
        ))
    }
}

/// Replace everything with an empty Book; can be undone
#[derive(Debug, Clone, Default)]
pub struct ClearCommand;

impl Command for ClearCommand {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        model.book_mut().reset_data(&Book::new());
        model.reset_filters();
        model.commit_book();
        info!("book cleared");
        Ok(CommandResult::with_view("Book has been cleared!", View::ClientList))
    }
}

/// Upcoming birthdays and policy expiries
#[derive(Debug, Clone)]
pub struct RemindersCommand {
    pub today: NaiveDate,
    pub within_days: i64,
}

impl Command for RemindersCommand {
    fn name(&self) -> &'static str {
        "reminders"
    }

    fn execute(&self, model: &mut Model) -> Result<CommandResult> {
        let book = model.book();
        let birthdays = book.birthday_clients(self.today, self.within_days);
        let expiring = book.expiring_policies(self.today, self.within_days);

        let mut lines = vec![format!(
            "Reminders for the next {} day(s) from {}:",
            self.within_days, self.today
        )];

        if birthdays.is_empty() {
            lines.push("  No upcoming birthdays".to_string());
        }
        for client in birthdays {
            lines.push(format!(
                "  🎂 {} [{}] on {}",
                client.name,
                client.id,
                client.next_birthday(self.today)
            ));
        }

        if expiring.is_empty() {
            lines.push("  No policies expiring".to_string());
        }
        for policy in expiring {
            lines.push(format!(
                "  ⏳ Policy {} of client {} expires {}",
                policy.id, policy.client_id, policy.expiry_date
            ));
        }

        Ok(CommandResult::with_view(lines.join("\n"), View::Reminders))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExitCommand;

impl Command for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(&self, _model: &mut Model) -> Result<CommandResult> {
        Ok(CommandResult::exit("Exiting Policy Book as requested ..."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{parse_command, ParseContext};
    use crate::commands::test_support::*;
    use crate::commands::{AddClientCommand, AddPolicyTypeCommand, DeleteClientCommand};
    use crate::entities::PolicyType;
    use crate::error::BookError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_undo_with_nothing_committed() {
        let mut model = create_test_model();
        assert_eq!(
            UndoCommand.execute(&mut model).unwrap_err(),
            BookError::NoHistory
        );
    }

    #[test]
    fn test_undo_restores_previous_book() {
        let mut model = create_test_model();
        let b0 = model.book().clone();

        AddClientCommand {
            client: create_test_client("C", "Charlotte Oliveiro"),
        }
        .execute(&mut model)
        .unwrap();
        let result = UndoCommand.execute(&mut model).unwrap();

        assert_eq!(model.book(), &b0);
        assert!(result.feedback.starts_with("Undo success! Restored the state from "));
        assert!(result.feedback.ends_with("(0 more undo step(s) available)"));
        assert_eq!(model.history().current().book(), &b0);
    }

    #[test]
    fn test_new_commit_after_undo_drops_future() {
        let mut model = create_test_model();
        let b0 = model.book().clone();

        DeleteClientCommand { id: parse("A") }
            .execute(&mut model)
            .unwrap();
        UndoCommand.execute(&mut model).unwrap();
        assert_eq!(model.book(), &b0);

        AddPolicyTypeCommand {
            policy_type: PolicyType::new(parse("Travel"), parse("3")),
        }
        .execute(&mut model)
        .unwrap();

        UndoCommand.execute(&mut model).unwrap();
        assert_eq!(model.book(), &b0);
        assert!(model.book().has_client(&parse("A")));
        assert_eq!(
            UndoCommand.execute(&mut model).unwrap_err(),
            BookError::NoHistory
        );
    }

    #[test]
    fn test_clear_is_undoable() {
        let mut model = create_test_model();
        let b0 = model.book().clone();

        ClearCommand.execute(&mut model).unwrap();
        assert!(model.book().is_empty());

        UndoCommand.execute(&mut model).unwrap();
        assert_eq!(model.book(), &b0);
    }

    #[test]
    fn test_reminders() {
        let mut model = create_test_model();
        let result = RemindersCommand {
            today: date(2026, 2, 25),
            within_days: 7,
        }
        .execute(&mut model)
        .unwrap();

        assert_eq!(result.view, Some(View::Reminders));
        assert!(result.feedback.contains("No upcoming birthdays"));
        assert!(result.feedback.contains("Policy P1 of client A expires 2026-03-01"));

        let result = RemindersCommand {
            today: date(2026, 3, 30),
            within_days: 7,
        }
        .execute(&mut model)
        .unwrap();
        assert!(result.feedback.contains("Alice Tan [A] on 2026-04-02"));
        assert!(result.feedback.contains("Bernice Yu [B] on 2026-04-02"));
        assert!(result.feedback.contains("No policies expiring"));
        assert!(!model.can_undo_book());
    }

    #[test]
    fn test_reminders_with_window_past_last_date() {
        let mut model = create_test_model();
        let command = parse_command(
            "reminders --days 4000000000",
            &ParseContext {
                today: date(2026, 2, 25),
                reminder_window_days: 7,
            },
        )
        .unwrap();

        let result = command.execute(&mut model).unwrap();
        assert!(result.feedback.contains("Alice Tan [A] on 2026-04-02"));
        assert!(result.feedback.contains("Policy P1 of client A expires 2026-03-01"));

        let result = RemindersCommand {
            today: date(2026, 2, 25),
            within_days: i64::MAX,
        }
        .execute(&mut model)
        .unwrap();
        assert!(result.feedback.contains("Bernice Yu [B] on 2026-04-02"));
    }

    #[test]
    fn test_exit() {
        let mut model = create_test_model();
        let result = ExitCommand.execute(&mut model).unwrap();
        assert!(result.exit);
    }
}
