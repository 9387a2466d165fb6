// 🔔 Notification Collaborator - Operator feedback boundary
// The engine reports outcomes and asks for confirmation through this
// trait; rendering (toasts, dialogs) belongs to the consuming UI.
// Confirmation is a synchronous gate before a mutation is attempted:
// a declined confirm means full cancellation, no partial effects.

pub trait Notifier {
    fn notify_success(&self, title: &str, detail: &str);

    fn notify_error(&self, title: &str, detail: &str);

    /// Synchronous yes/no gate before destructive or irreversible actions.
    fn confirm(&self, title: &str, detail: &str) -> bool;
}

// ============================================================================
// CONSOLE NOTIFIER
// ============================================================================

/// Console implementation for the CLI.
pub struct ConsoleNotifier {
    /// When true, confirmation prompts are accepted without asking
    /// (non-interactive runs such as roster imports).
    pub auto_confirm: bool,
}

impl ConsoleNotifier {
    pub fn new(auto_confirm: bool) -> Self {
        ConsoleNotifier { auto_confirm }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify_success(&self, title: &str, detail: &str) {
        println!("✓ {}: {}", title, detail);
    }

    fn notify_error(&self, title: &str, detail: &str) {
        eprintln!("❌ {}: {}", title, detail);
    }

    fn confirm(&self, title: &str, detail: &str) -> bool {
        if self.auto_confirm {
            return true;
        }

        use std::io::Write;
        print!("{} - {} [y/N] ", title, detail);
        let _ = std::io::stdout().flush();

        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "s" | "si" | "sí")
    }
}

// ============================================================================
// RECORDING NOTIFIER (test support)
// ============================================================================

/// Captures notifications and scripts confirmation answers; used by
/// service tests to assert on operator-visible behavior.
#[cfg(test)]
pub mod testing {
    use super::Notifier;
    use std::cell::RefCell;

    #[derive(Default)]
    pub struct RecordingNotifier {
        pub successes: RefCell<Vec<(String, String)>>,
        pub errors: RefCell<Vec<(String, String)>>,
        pub confirm_answer: std::cell::Cell<bool>,
        pub confirms_asked: std::cell::Cell<usize>,
    }

    impl RecordingNotifier {
        pub fn accepting() -> Self {
            let notifier = RecordingNotifier::default();
            notifier.confirm_answer.set(true);
            notifier
        }

        pub fn declining() -> Self {
            RecordingNotifier::default()
        }

        pub fn last_error(&self) -> Option<String> {
            self.errors.borrow().last().map(|(_, detail)| detail.clone())
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify_success(&self, title: &str, detail: &str) {
            self.successes
                .borrow_mut()
                .push((title.to_string(), detail.to_string()));
        }

        fn notify_error(&self, title: &str, detail: &str) {
            self.errors
                .borrow_mut()
                .push((title.to_string(), detail.to_string()));
        }

        fn confirm(&self, _title: &str, _detail: &str) -> bool {
            self.confirms_asked.set(self.confirms_asked.get() + 1);
            self.confirm_answer.get()
        }
    }
}
