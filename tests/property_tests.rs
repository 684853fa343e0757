//! Property-based tests for input accumulation and result history
//!
//! These tests verify that:
//! - Unterminated input never completes, however many lines are added
//! - The continuation prompt is shown for every line after the first
//! - History keeps exactly the newest `capacity` entries

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use sqlcli::core::db::statement::StatementKind;
    use sqlcli::core::db::value::{ChangeSummary, Payload, ResultRecord};
    use sqlcli::repl::{accumulate, classify, Classified, Controller, Input, State};
    use sqlcli::session::history::HistoryBuffer;
    use sqlcli::session::settings::Settings;
    use sqlcli::session::Session;

    /// Lines that can never complete a command: no sigil, no terminator
    fn arb_plain_line() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9 _,()*=']{0,30}"
    }

    fn record(id: usize) -> ResultRecord {
        ResultRecord::changes(ChangeSummary {
            affected_rows: id,
            last_insert_id: id as i64,
            kind: StatementKind::Insert,
        })
    }

    proptest! {
        /// Joined lines are separated by exactly one space
        #[test]
        fn prop_accumulate_joins_trimmed_lines(first in "[a-z]{1,10}", second in " {0,3}[a-z]{1,10} {0,3}") {
            let joined = accumulate(&first, &second);
            prop_assert_eq!(joined, format!("{} {}", first, second.trim()));
        }

        /// A buffer without terminator or sigil stays incomplete
        #[test]
        fn prop_unterminated_input_never_completes(lines in prop::collection::vec(arb_plain_line(), 1..10)) {
            let mut buffer = String::new();
            for line in &lines {
                buffer = accumulate(&buffer, line);
                prop_assert_eq!(classify(&buffer), Classified::Incomplete);
            }
        }

        /// Every line after a non-empty first line is read at the continuation prompt
        #[test]
        fn prop_continuation_prompt_after_first_line(
            first in "[a-zA-Z]{1,10}",
            rest in prop::collection::vec(arb_plain_line(), 0..8),
        ) {
            let mut controller = Controller::new(Session::new(Settings::default()), Vec::<u8>::new(), Vec::<u8>::new());
            prop_assert_eq!(controller.prompt(), "disconnected> ");

            controller.handle(Input::Line(first)).unwrap();
            for line in rest {
                prop_assert_eq!(controller.prompt(), "... ");
                prop_assert_eq!(controller.state(), State::Accumulating);
                prop_assert_eq!(controller.handle(Input::Line(line)).unwrap(), None);
            }
            prop_assert_eq!(controller.prompt(), "... ");
        }

        /// After capacity + k pushes exactly the newest `capacity` entries remain
        #[test]
        fn prop_history_keeps_newest_entries(capacity in 1usize..30, extra in 0usize..30) {
            let mut history = HistoryBuffer::new();
            let total = capacity + extra;
            for id in 0..total {
                history.push(record(id), capacity);
            }

            prop_assert_eq!(history.len(), capacity);
            prop_assert_eq!(history.metadata().count(), capacity);
            for index in 0..capacity {
                let entry = history.get(index).unwrap();
                match entry.rows {
                    Payload::Changes(summary) => prop_assert_eq!(summary.affected_rows, total - 1 - index),
                    Payload::Rows(_) => prop_assert!(false, "unexpected row set"),
                }
            }
            prop_assert!(history.get(capacity).is_none());
        }
    }
}
