//! Deduplication of books across accumulated pages.
//!
//! The catalog's offset pagination can shift between requests, so the same
//! volume sometimes shows up on two pages. Accumulated results keep those
//! repeats; callers that want a clean list run it through these helpers.

use std::collections::HashSet;

use crate::models::Book;

/// Keep the first occurrence of every id, preserving order
pub fn dedup_by_id<'a, I>(books: I) -> Vec<&'a Book>
where
    I: IntoIterator<Item = &'a Book>,
{
    let mut seen: HashSet<&'a str> = HashSet::new();
    let mut unique = Vec::new();
    for book in books {
        if seen.insert(book.id.as_str()) {
            unique.push(book);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookBuilder;

    fn books(ids: &[&str]) -> Vec<Book> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| BookBuilder::new(*id, format!("Title {}", i)).build())
            .collect()
    }

    #[test]
    fn test_dedup_by_id_keeps_first() {
        let list = books(&["a", "b", "a"]);
        let unique = dedup_by_id(&list);
        let ids: Vec<&str> = unique.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(unique[0].title, "Title 0");
    }

    #[test]
    fn test_dedup_by_id_without_repeats() {
        let list = books(&["a", "b", "c"]);
        assert_eq!(dedup_by_id(&list).len(), 3);
        assert!(dedup_by_id(&Vec::<Book>::new()).is_empty());
    }
}
