//! Chat message repository.
//!
//! Stores [`Message`]s in a [`Table`] with two secondary indexes: a unique
//! index on `clientId`, so a client can't submit the same message twice, and
//! an ordered index on `chatId` that serves chat history.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::model::{ModelError, Table, TableOptions};
use crate::storage::Store;
use crate::types::{Index, Query};

/// A chat message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Time-ordered identifier. Generated by `create` when empty.
    pub id: String,
    pub chat_id: String,
    /// Client-chosen identifier, unique across all messages.
    pub client_id: String,
    pub user_id: String,
    pub text: String,
    /// Unix seconds of the last create or update.
    pub sent_at: i64,
}

/// Errors returned by the repository.
#[derive(Debug)]
pub enum RepositoryError {
    /// The message is missing a required field.
    InvalidMessage(String),
    /// The table rejected the operation.
    Model(ModelError),
}

impl std::fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMessage(reason) => write!(f, "invalid message: {reason}"),
            Self::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(e) => Some(e),
            Self::InvalidMessage(_) => None,
        }
    }
}

impl From<ModelError> for RepositoryError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

/// Messages over a store.
pub struct MessageRepository<S: Store> {
    table: Table<S>,
}

impl<S: Store> MessageRepository<S> {
    pub fn new(store: S, namespace: impl Into<String>, options: TableOptions) -> Self {
        let indexes = vec![
            Index::by_equality("clientId").unordered().unique(),
            Index::by_equality("chatId"),
        ];
        Self {
            table: Table::new(store, namespace, indexes, options),
        }
    }

    #[must_use]
    pub const fn table(&self) -> &Table<S> {
        &self.table
    }

    /// Store a new message and return it as stored.
    pub fn create(&self, mut message: Message) -> Result<Message, RepositoryError> {
        validate(&message)?;
        if message.id.is_empty() {
            message.id = new_message_id();
        }
        message.sent_at = unix_seconds();

        self.table.save(&message)?;
        tracing::debug!(
            "Created message {} in chat {} under '{}'",
            message.id,
            message.chat_id,
            self.table.namespace()
        );
        Ok(message)
    }

    pub fn read(&self, id: &str) -> Result<Message, RepositoryError> {
        Ok(self.table.read(&self.table.identity_index().to_query(id))?)
    }

    /// Replace an existing message. Fails with `NotFound` if there is none.
    pub fn update(&self, mut message: Message) -> Result<Message, RepositoryError> {
        validate(&message)?;
        if message.id.is_empty() {
            return Err(RepositoryError::InvalidMessage("id must not be empty".to_string()));
        }
        self.read(&message.id)?;

        message.sent_at = unix_seconds();
        self.table.save(&message)?;
        Ok(message)
    }

    /// Delete a message by id.
    ///
    /// Only the identity entry is removed, so `history` keeps returning the
    /// message until its chat index entry is overwritten.
    pub fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        self.table.delete(&self.table.identity_index().to_query(id))?;
        tracing::debug!("Deleted message {id}");
        Ok(())
    }

    /// Messages of `chat_id` in creation order.
    pub fn history(
        &self,
        chat_id: &str,
        offset: usize,
        limit: Option<usize>,
    ) -> Result<Vec<Message>, RepositoryError> {
        let mut query = Query::equals("chatId", chat_id).with_offset(offset);
        if let Some(limit) = limit {
            query = query.with_limit(limit);
        }
        Ok(self.table.list(&query)?)
    }
}

fn validate(message: &Message) -> Result<(), RepositoryError> {
    if message.chat_id.is_empty() {
        return Err(RepositoryError::InvalidMessage("chatId must not be empty".to_string()));
    }
    if message.client_id.is_empty() {
        return Err(RepositoryError::InvalidMessage("clientId must not be empty".to_string()));
    }
    Ok(())
}

/// Milliseconds since the epoch followed by 64 random bits, both in hex, so
/// ids sort by creation time.
fn new_message_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    format!("{millis:016x}{:016x}", rand::random::<u64>())
}

fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn repository() -> MessageRepository<MemoryStore> {
        MessageRepository::new(MemoryStore::new(), "messages", TableOptions::default())
    }

    fn message(chat_id: &str, client_id: &str, text: &str) -> Message {
        Message {
            chat_id: chat_id.to_string(),
            client_id: client_id.to_string(),
            user_id: "u1".to_string(),
            text: text.to_string(),
            ..Message::default()
        }
    }

    #[test]
    fn test_create_assigns_id_and_timestamp() {
        let repository = repository();
        let created = repository.create(message("c1", "k1", "hello")).unwrap();
        assert_eq!(created.id.len(), 32);
        assert!(created.sent_at > 0);
        assert_eq!(repository.read(&created.id).unwrap(), created);
        assert_eq!(repository.table().namespace(), "messages");
    }

    #[test]
    fn test_create_keeps_given_id() {
        let repository = repository();
        let mut input = message("c1", "k1", "hello");
        input.id = "m1".to_string();
        let created = repository.create(input).unwrap();
        assert_eq!(created.id, "m1");
    }

    #[test]
    fn test_duplicate_client_id_is_rejected() {
        let repository = repository();
        repository.create(message("c1", "k1", "hello")).unwrap();
        let result = repository.create(message("c1", "k1", "hello again"));
        assert!(matches!(
            result,
            Err(RepositoryError::Model(ModelError::UniqueConstraintViolated { ref field, .. }))
                if field == "clientId"
        ));
    }

    #[test]
    fn test_history_is_in_creation_order() {
        let repository = repository();
        let mut ids = Vec::new();
        for n in 0..5 {
            let mut input = message("c1", &format!("k{n}"), &format!("text {n}"));
            input.id = format!("m{n}");
            ids.push(repository.create(input).unwrap().id);
        }
        repository.create(message("c2", "other", "elsewhere")).unwrap();

        let history = repository.history("c1", 0, None).unwrap();
        let listed: Vec<String> = history.into_iter().map(|m| m.id).collect();
        assert_eq!(listed, ids);

        let page = repository.history("c1", 1, Some(2)).unwrap();
        let listed: Vec<&str> = page.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(listed, vec!["m1", "m2"]);
    }

    #[test]
    fn test_update_replaces_text() {
        let repository = repository();
        let mut created = repository.create(message("c1", "k1", "hello")).unwrap();
        created.text = "edited".to_string();
        repository.update(created.clone()).unwrap();

        assert_eq!(repository.read(&created.id).unwrap().text, "edited");
        assert_eq!(repository.history("c1", 0, None).unwrap().len(), 1);
    }

    #[test]
    fn test_update_unknown_message_fails() {
        let repository = repository();
        let mut input = message("c1", "k1", "hello");
        input.id = "missing".to_string();
        assert!(matches!(
            repository.update(input),
            Err(RepositoryError::Model(ModelError::NotFound))
        ));
    }

    #[test]
    fn test_delete() {
        let repository = repository();
        let created = repository.create(message("c1", "k1", "hello")).unwrap();
        repository.delete(&created.id).unwrap();

        assert!(matches!(
            repository.read(&created.id),
            Err(RepositoryError::Model(ModelError::NotFound))
        ));
        assert!(matches!(
            repository.delete(&created.id),
            Err(RepositoryError::Model(ModelError::NotFound))
        ));
    }

    #[test]
    fn test_empty_chat_id_is_invalid() {
        let result = repository().create(message("", "k1", "hello"));
        assert!(matches!(result, Err(RepositoryError::InvalidMessage(_))));
    }
}
