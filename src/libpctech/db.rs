use crate::libpctech::comments::{Comment, CommentStore, Feed, NewComment};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info, warn};
use rand::distr::Alphanumeric;
use rand::{rng, Rng};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::path::Path;
use std::sync::mpsc::{channel, Sender};
use std::time::Instant;
use thiserror::Error;

const ID_LENGTH: usize = 20;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no comment with id {0}")]
    NotFound(String),
}

struct Subscriber {
    limit: usize,
    sender: Sender<Vec<Comment>>,
}

/// Comment store backed by SQLite. Every live feed receives a fresh
/// snapshot when it subscribes and after each change.
pub struct SqliteCommentStore {
    conn: Connection,
    subscribers: Vec<Subscriber>,
}

impl SqliteCommentStore {
    pub fn create_or_open(src: &Path) -> Result<Self, StoreError> {
        let conn = if src.exists() {
            info!("[DB] Opening existing Database");
            open_db(src)?
        } else {
            info!("[DB] Creating new Database");
            create_db(src)?
        };
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = init_db(Connection::open_in_memory()?)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            subscribers: Vec::new(),
        }
    }

    pub fn close(self) -> Result<(), StoreError> {
        close_db(self.conn)
    }

    /// Newest first, at most `limit` entries.
    pub fn latest(&self, limit: usize) -> Result<Vec<Comment>, StoreError> {
        latest(&self.conn, limit)
    }

    fn broadcast(&mut self) {
        let mut live = Vec::with_capacity(self.subscribers.len());
        for subscriber in self.subscribers.drain(..) {
            let snapshot = match latest(&self.conn, subscriber.limit) {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    error!("[DB] Cannot build feed snapshot: {}", err);
                    live.push(subscriber);
                    continue;
                }
            };
            if subscriber.sender.send(snapshot).is_ok() {
                live.push(subscriber);
            } else {
                debug!("[DB] Dropping closed feed.");
            }
        }
        self.subscribers = live;
    }
}

fn latest(conn: &Connection, limit: usize) -> Result<Vec<Comment>, StoreError> {
    let mut statement = conn.prepare(
        "SELECT id, name, topic, text, rating, createdAt, timeDisplay FROM Comment \
         ORDER BY createdAt DESC, rowid DESC LIMIT ?1",
    )?;
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = statement.query_map(params![limit], from_row)?;

    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl CommentStore for SqliteCommentStore {
    fn subscribe(&mut self, limit: usize) -> Result<Feed, StoreError> {
        let (sender, receiver) = channel();
        if let Err(err) = sender.send(self.latest(limit)?) {
            warn!("[DB] Cannot send initial snapshot: {}", err);
        }
        self.subscribers.push(Subscriber { limit, sender });
        debug!("[DB] New feed subscribed (limit {}).", limit);
        Ok(Feed::new(receiver))
    }

    fn add(&mut self, comment: NewComment) -> Result<String, StoreError> {
        let id: String = rng()
            .sample_iter(&Alphanumeric)
            .take(ID_LENGTH)
            .map(char::from)
            .collect();
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        match self.conn.execute(
            "INSERT INTO Comment(id, name, topic, text, rating, createdAt, timeDisplay) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                comment.name,
                comment.topic,
                comment.text,
                comment.rating,
                created_at,
                comment.display_time
            ],
        ) {
            Ok(_) => debug!("[DB] Created new Comment '{}'", id),
            Err(err) => {
                error!("[DB] Error while creating new Comment: {:?}", err);
                return Err(err.into());
            }
        }
        self.broadcast();
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let removed = match self
            .conn
            .execute("DELETE FROM Comment WHERE id = ?1", params![id])
        {
            Ok(removed) => removed,
            Err(err) => {
                error!("[DB] Error while deleting Comment {}: {:?}", id, err);
                return Err(err.into());
            }
        };
        if removed == 0 {
            warn!("[DB] Comment '{}' does not exist", id);
            return Err(StoreError::NotFound(id.to_string()));
        }
        debug!("[DB] Deleted Comment '{}'", id);
        self.broadcast();
        Ok(())
    }
}

fn from_row(row: &Row) -> rusqlite::Result<Comment> {
    let created_at: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?
        .with_timezone(&Utc);
    Ok(Comment {
        id: row.get(0)?,
        name: row.get(1)?,
        topic: row.get(2)?,
        text: row.get(3)?,
        rating: row.get(4)?,
        created_at,
        display_time: row.get(6)?,
    })
}

fn create_db(dest: &Path) -> Result<Connection, StoreError> {
    let now = Instant::now();
    let db = init_db(Connection::open(dest)?)?;
    debug!(
        "[DB] Creating and Saving took {} ms.",
        now.elapsed().as_millis()
    );
    Ok(db)
}

fn open_db(src: &Path) -> Result<Connection, StoreError> {
    let now = Instant::now();
    let db = init_db(Connection::open(src)?)?;
    debug!("[DB] Opening took {} ms.", now.elapsed().as_millis());
    Ok(db)
}

fn close_db(connection: Connection) -> Result<(), StoreError> {
    info!("[DB] Closing Database");
    match connection.close() {
        Ok(_) => Ok(()),
        Err((conn, _)) => {
            error!("[DB] Cannot close connection. Retrying 1/1...");
            conn.close().map_err(|(_, err)| err.into())
        }
    }
}

fn init_db(conn: Connection) -> Result<Connection, StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS Comment (
              id TEXT NOT NULL PRIMARY KEY,
              name TEXT NOT NULL,
              topic TEXT NOT NULL,
              text TEXT NOT NULL,
              rating INTEGER NOT NULL,
              createdAt TEXT NOT NULL,
              timeDisplay TEXT NOT NULL
            )",
        (),
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS Comment_createdAt_idx ON Comment(createdAt)",
        (),
    )?;
    debug!("[DB INIT] Comment table ready");

    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_comment(text: &str) -> NewComment {
        NewComment {
            name: "Tester".to_string(),
            topic: "General".to_string(),
            text: text.to_string(),
            rating: 3,
            display_time: "16 Oct, 09:30".to_string(),
        }
    }

    #[test]
    fn add_assigns_opaque_ids() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        let a = store.add(new_comment("first")).unwrap();
        let b = store.add(new_comment("second")).unwrap();
        assert_eq!(a.len(), ID_LENGTH);
        assert_ne!(a, b);
    }

    #[test]
    fn latest_is_newest_first_and_capped() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        for i in 0..5 {
            store.add(new_comment(&format!("comment {i}"))).unwrap();
        }
        let latest = store.latest(3).unwrap();
        let texts: Vec<&str> = latest.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["comment 4", "comment 3", "comment 2"]);
        assert!(latest[0].created_at >= latest[1].created_at);
    }

    #[test]
    fn oversized_limit_is_clamped_not_wrapped() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        for i in 0..3 {
            store.add(new_comment(&format!("comment {i}"))).unwrap();
        }
        assert_eq!(store.latest(usize::MAX).unwrap().len(), 3);
        assert!(store.latest(0).unwrap().is_empty());

        let feed = store.subscribe(usize::MAX).unwrap();
        assert_eq!(feed.latest().map(|c| c.len()), Some(3));
    }

    #[test]
    fn feeds_receive_a_snapshot_per_change() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        let feed = store.subscribe(50).unwrap();
        assert_eq!(feed.latest(), Some(Vec::new()));

        let id = store.add(new_comment("hello")).unwrap();
        let snapshot = feed.latest().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);

        store.delete(&id).unwrap();
        assert_eq!(feed.latest(), Some(Vec::new()));
        assert_eq!(feed.latest(), None);
    }

    #[test]
    fn closed_feeds_are_dropped() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        let feed = store.subscribe(50).unwrap();
        drop(feed);
        store.add(new_comment("nobody listening")).unwrap();
        assert!(store.subscribers.is_empty());
    }

    #[test]
    fn deleting_unknown_id_fails() {
        let mut store = SqliteCommentStore::open_in_memory().unwrap();
        assert!(matches!(
            store.delete("missing"),
            Err(StoreError::NotFound(id)) if id == "missing"
        ));
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("comments.db");

        let mut store = SqliteCommentStore::create_or_open(&path).unwrap();
        store.add(new_comment("kept")).unwrap();
        store.close().unwrap();

        let store = SqliteCommentStore::create_or_open(&path).unwrap();
        let latest = store.latest(50).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].text, "kept");
        assert_eq!(latest[0].rating, 3);
    }
}
