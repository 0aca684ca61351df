//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper serializes as a plain JSON array and prints its items one
//! after another, or a short notice when empty.

use std::{fmt, ops::Index};

use serde::Serialize;

use crate::models::{
    FlowTypeInfo, HistoryPage, Service, Step, TaskSummary, TemplateStep, TodoItem,
};

macro_rules! collection {
    ($(#[$meta:meta])* $name:ident($item:ty), $empty:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub Vec<$item>);

        impl $name {
            /// Check if the collection is empty.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Get the number of items in the collection.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Get a reference to the item at the given index.
            pub fn get(&self, index: usize) -> Option<&$item> {
                self.0.get(index)
            }

            /// Get an iterator over the items.
            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl Index<usize> for $name {
            type Output = $item;

            fn index(&self, index: usize) -> &Self::Output {
                &self.0[index]
            }
        }

        impl IntoIterator for $name {
            type Item = $item;
            type IntoIter = std::vec::IntoIter<Self::Item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.into_iter()
            }
        }

        impl<'a> IntoIterator for &'a $name {
            type Item = &'a $item;
            type IntoIter = std::slice::Iter<'a, $item>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0.is_empty() {
                    writeln!(f, $empty)
                } else {
                    for item in &self.0 {
                        write!(f, "{item}")?;
                    }
                    Ok(())
                }
            }
        }
    };
}

collection!(
    /// Task summaries, as returned by task listing.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use runbook_core::{
    ///     display::TaskSummaries,
    ///     models::{TaskStatus, TaskSummary},
    /// };
    /// use jiff::Timestamp;
    ///
    /// let summary = TaskSummary {
    ///     id: 1,
    ///     name: "Weekly release".to_string(),
    ///     description: None,
    ///     status: TaskStatus::InProgress,
    ///     start_time: None,
    ///     end_time: None,
    ///     created_at: Timestamp::now(),
    ///     updated_at: Timestamp::now(),
    ///     total_steps: 16,
    ///     completed_steps: 4,
    ///     pending_steps: 12,
    /// };
    ///
    /// let output = TaskSummaries(vec![summary]).to_string();
    /// assert!(output.contains("Weekly release (ID: 1) [in_progress] (4/16)"));
    /// ```
    TaskSummaries(TaskSummary),
    "No tasks found."
);

collection!(
    /// Steps of a task.
    Steps(Step),
    "No steps found."
);

collection!(
    /// Operator work items for a task.
    Todos(TodoItem),
    "Nothing to do right now."
);

collection!(
    /// Stored template steps, possibly of several flow types.
    Templates(TemplateStep),
    "No templates found."
);

collection!(
    /// The built-in flow type catalogue.
    FlowTypes(FlowTypeInfo),
    "No flow types available."
);

collection!(
    /// Registered services.
    Services(Service),
    "No services registered."
);

impl fmt::Display for HistoryPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            writeln!(f, "No finished tasks yet.")?;
        } else {
            for record in &self.records {
                write!(f, "{record}")?;
            }
        }
        let pages = self.pagination.total.div_ceil(self.pagination.page_size.max(1) as u64);
        writeln!(
            f,
            "Page {} of {} ({} finished tasks)",
            self.pagination.current,
            pages.max(1),
            self.pagination.total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Pagination;

    #[test]
    fn test_empty_collections() {
        assert_eq!(Todos(vec![]).to_string(), "Nothing to do right now.\n");
        assert_eq!(TaskSummaries(vec![]).to_string(), "No tasks found.\n");
        assert!(Steps(vec![]).is_empty());
    }

    #[test]
    fn test_collections_serialize_as_arrays() {
        let json = serde_json::to_string(&Todos(vec![])).unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_history_page_footer() {
        let page = HistoryPage {
            records: vec![],
            pagination: Pagination {
                current: 2,
                page_size: 10,
                total: 25,
            },
        };
        let output = page.to_string();
        assert!(output.contains("No finished tasks yet."));
        assert!(output.contains("Page 2 of 3 (25 finished tasks)"));
    }
}
