//! Read-only question corpus lookups.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;
use quizbot_cache::BoundedCache;
use quizbot_types::{Question, QuestionId, Ticket, TicketId};
use tracing::{debug, trace, warn};

use crate::error::{DomainError, Result};

/// Lookup service over the question corpus.
pub trait QuestionBank: Send + Sync {
    /// Ordered questions of a ticket.
    fn ticket(&self, id: TicketId) -> Option<Arc<Ticket>>;

    /// A single question by id.
    fn question(&self, id: &QuestionId) -> Option<Question> {
        self.ticket(id.ticket)?.question(id.number).cloned()
    }

    /// All known ticket ids, ascending.
    fn ticket_ids(&self) -> Vec<TicketId>;
}

/// Corpus held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryQuestionBank {
    tickets: HashMap<TicketId, Arc<Ticket>>,
}

impl InMemoryQuestionBank {
    pub fn new(tickets: impl IntoIterator<Item = Ticket>) -> Self {
        Self {
            tickets: tickets
                .into_iter()
                .map(|t| (t.id, Arc::new(t)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

impl QuestionBank for InMemoryQuestionBank {
    fn ticket(&self, id: TicketId) -> Option<Arc<Ticket>> {
        self.tickets.get(&id).cloned()
    }

    fn ticket_ids(&self) -> Vec<TicketId> {
        let mut ids: Vec<TicketId> = self.tickets.keys().copied().collect();
        ids.sort();
        ids
    }
}

/// Corpus read from `ticket_<n>.json` files on demand.
///
/// Parsed tickets are memoized in a [`BoundedCache`], so only the most
/// recently used tickets stay in memory. A file that cannot be read or
/// parsed is logged and treated as a missing ticket.
pub struct FileQuestionBank {
    dir: PathBuf,
    ids: Vec<TicketId>,
    cache: Mutex<BoundedCache<TicketId, Arc<Ticket>>>,
}

impl FileQuestionBank {
    /// Index the ticket files in `dir`. Files are parsed lazily.
    pub fn open(dir: impl Into<PathBuf>, max_cached_tickets: usize) -> Result<Self> {
        let dir = dir.into();
        let entries = std::fs::read_dir(&dir).map_err(|e| DomainError::Corpus {
            path: dir.clone(),
            message: e.to_string(),
        })?;

        let mut ids: Vec<TicketId> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| ticket_id_from_file_name(&entry.file_name().to_string_lossy()))
            .collect();
        ids.sort();
        ids.dedup();

        debug!(dir = %dir.display(), tickets = ids.len(), "Indexed question corpus");

        Ok(Self {
            dir,
            ids,
            cache: Mutex::new(BoundedCache::new(max_cached_tickets)?),
        })
    }

    fn ticket_path(&self, id: TicketId) -> PathBuf {
        self.dir.join(format!("ticket_{}.json", id.0))
    }

    /// Read and parse one ticket file, bypassing the cache.
    pub fn load_ticket(&self, id: TicketId) -> Result<Ticket> {
        let path = self.ticket_path(id);
        let contents = std::fs::read_to_string(&path).map_err(|e| DomainError::Corpus {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let ticket = Ticket::from_json(&contents).map_err(|e| DomainError::Corpus {
            path: path.clone(),
            message: e.to_string(),
        })?;

        if ticket.id != id {
            return Err(DomainError::Corpus {
                path,
                message: format!("file declares ticket {} but is named for {}", ticket.id, id),
            });
        }
        Ok(ticket)
    }
}

impl QuestionBank for FileQuestionBank {
    fn ticket(&self, id: TicketId) -> Option<Arc<Ticket>> {
        if let Some(ticket) = self.cache.lock().get(&id) {
            trace!(ticket = %id, "Ticket cache hit");
            return Some(Arc::clone(ticket));
        }

        if self.ids.binary_search(&id).is_err() {
            return None;
        }

        // Parse outside the lock; a concurrent miss just parses twice.
        match self.load_ticket(id) {
            Ok(ticket) => {
                let ticket = Arc::new(ticket);
                self.cache.lock().set(id, Arc::clone(&ticket));
                Some(ticket)
            }
            Err(e) => {
                warn!(ticket = %id, error = %e, "Failed to load ticket");
                None
            }
        }
    }

    fn ticket_ids(&self) -> Vec<TicketId> {
        self.ids.clone()
    }
}

/// `ticket_12.json` -> `TicketId(12)`.
fn ticket_id_from_file_name(name: &str) -> Option<TicketId> {
    name.strip_prefix("ticket_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
        .map(TicketId)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Build a ticket whose correct answer is always option 0.
    pub(crate) fn ticket(id: u32, questions: u32) -> Ticket {
        let body: Vec<String> = (1..=questions)
            .map(|n| {
                format!(
                    r#"{{ "text": "Q{n}", "options": ["right", "wrong"], "correct_index": 0 }}"#
                )
            })
            .collect();
        Ticket::from_json(&format!(
            r#"{{ "id": {id}, "questions": [{}] }}"#,
            body.join(",")
        ))
        .unwrap()
    }

    fn write_ticket(dir: &Path, id: u32, questions: u32) {
        let body: Vec<String> = (1..=questions)
            .map(|n| {
                format!(r#"{{ "text": "Q{n}", "options": ["a", "b"], "correct_index": 1 }}"#)
            })
            .collect();
        fs::write(
            dir.join(format!("ticket_{id}.json")),
            format!(r#"{{ "id": {id}, "questions": [{}] }}"#, body.join(",")),
        )
        .unwrap();
    }

    #[test]
    fn test_in_memory_lookups() {
        let bank = InMemoryQuestionBank::new([ticket(2, 3), ticket(1, 2)]);

        assert_eq!(bank.ticket_ids(), vec![TicketId(1), TicketId(2)]);
        assert_eq!(bank.ticket(TicketId(2)).unwrap().len(), 3);
        assert!(bank.ticket(TicketId(3)).is_none());

        let q = bank.question(&QuestionId::new(2, 3)).unwrap();
        assert_eq!(q.text, "Q3");
        assert!(bank.question(&QuestionId::new(2, 4)).is_none());
        assert!(bank.question(&QuestionId::new(9, 1)).is_none());
    }

    #[test]
    fn test_ticket_id_from_file_name() {
        assert_eq!(ticket_id_from_file_name("ticket_12.json"), Some(TicketId(12)));
        assert_eq!(ticket_id_from_file_name("ticket_x.json"), None);
        assert_eq!(ticket_id_from_file_name("ticket_1.txt"), None);
        assert_eq!(ticket_id_from_file_name("readme.md"), None);
    }

    #[test]
    fn test_file_bank_loads_on_demand() {
        let dir = TempDir::new().unwrap();
        write_ticket(dir.path(), 1, 2);
        write_ticket(dir.path(), 3, 4);
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let bank = FileQuestionBank::open(dir.path(), 8).unwrap();
        assert_eq!(bank.ticket_ids(), vec![TicketId(1), TicketId(3)]);

        let ticket = bank.ticket(TicketId(3)).unwrap();
        assert_eq!(ticket.len(), 4);
        assert!(bank.cache.lock().has(&TicketId(3)));

        let q = bank.question(&QuestionId::new(1, 2)).unwrap();
        assert_eq!(q.correct_index, 1);
        assert!(bank.ticket(TicketId(2)).is_none());
    }

    #[test]
    fn test_file_bank_cache_is_bounded() {
        let dir = TempDir::new().unwrap();
        for id in 1..=3 {
            write_ticket(dir.path(), id, 1);
        }

        let bank = FileQuestionBank::open(dir.path(), 2).unwrap();
        for id in 1..=3 {
            assert!(bank.ticket(TicketId(id)).is_some());
        }

        let cache = bank.cache.lock();
        assert_eq!(cache.len(), 2);
        assert!(!cache.has(&TicketId(1)));
    }

    #[test]
    fn test_file_bank_malformed_ticket_is_missing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("ticket_5.json"), "{ not json").unwrap();

        let bank = FileQuestionBank::open(dir.path(), 4).unwrap();
        assert_eq!(bank.ticket_ids(), vec![TicketId(5)]);
        assert!(bank.ticket(TicketId(5)).is_none());
        assert!(matches!(
            bank.load_ticket(TicketId(5)),
            Err(DomainError::Corpus { .. })
        ));
    }

    #[test]
    fn test_file_bank_rejects_mismatched_id() {
        let dir = TempDir::new().unwrap();
        write_ticket(dir.path(), 7, 1);
        fs::rename(
            dir.path().join("ticket_7.json"),
            dir.path().join("ticket_8.json"),
        )
        .unwrap();

        let bank = FileQuestionBank::open(dir.path(), 4).unwrap();
        assert!(bank.ticket(TicketId(8)).is_none());
    }

    #[test]
    fn test_file_bank_missing_dir() {
        let result = FileQuestionBank::open("/nonexistent/questions", 4);
        assert!(matches!(result, Err(DomainError::Corpus { .. })));
    }
}
