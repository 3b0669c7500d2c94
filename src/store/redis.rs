//! Redis Stack backend: JSON documents plus a RediSearch index.
//!
//! Every operation is a single command round trip over a shared multiplexed
//! connection manager. Concurrent reuse of the handle is the client
//! library's concern, not ours.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::Value;

use crate::error::{Result, RolodexError};
use crate::model::Person;
use crate::query::Predicate;
use crate::schema::IndexSchema;

#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    schema: Arc<IndexSchema>,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    pub async fn connect(url: &str, schema: Arc<IndexSchema>) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn, schema })
    }

    fn key(&self, id: &str) -> String {
        format!("{}{}", self.schema.key_prefix, id)
    }

    pub async fn put(&self, id: &str, person: &Person) -> Result<()> {
        let payload = serde_json::to_string(person)?;
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("JSON.SET")
            .arg(self.key(id))
            .arg("$")
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Person>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = redis::cmd("JSON.GET")
            .arg(self.key(id))
            .arg("$")
            .query_async(&mut conn)
            .await?;
        match raw {
            None => Ok(None),
            // JSON.GET with a "$" path wraps the document in an array.
            Some(json) => {
                let mut docs: Vec<Person> = serde_json::from_str(&json)?;
                Ok(docs.pop())
            }
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        // UNLINK of an absent key reports 0 removed; callers treat that as a no-op.
        let _removed: i64 = redis::cmd("UNLINK")
            .arg(self.key(id))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn search(&self, predicate: &Predicate, limit: usize) -> Result<Vec<Person>> {
        let query = predicate.to_search_string();
        let mut conn = self.conn.clone();
        let reply: Value = redis::cmd("FT.SEARCH")
            .arg(&self.schema.name)
            .arg(&query)
            .arg("LIMIT")
            .arg(0)
            .arg(limit)
            .arg("DIALECT")
            .arg(2)
            .query_async(&mut conn)
            .await?;
        parse_search_reply(reply)
    }

    pub async fn list_index_names(&self) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let names: Vec<String> = redis::cmd("FT._LIST").query_async(&mut conn).await?;
        Ok(names)
    }

    pub async fn create_index(&self, schema: &IndexSchema) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("FT.CREATE")
            .arg(schema.create_args())
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Parse an `FT.SEARCH` reply: `[total, key, fields, key, fields, ...]`
/// where for JSON documents `fields` is `["$", "<document json>"]`.
fn parse_search_reply(reply: Value) -> Result<Vec<Person>> {
    let Value::Array(items) = reply else {
        return Err(RolodexError::Query(
            "unexpected FT.SEARCH reply shape".into(),
        ));
    };
    let mut people = Vec::new();
    let mut iter = items.into_iter();
    let _total = iter.next();
    loop {
        let Some(_key) = iter.next() else { break };
        let Some(fields) = iter.next() else { break };
        if let Some(doc) = extract_document(fields) {
            people.push(serde_json::from_str(&doc)?);
        }
    }
    Ok(people)
}

/// Pull the raw document out of a result entry's field list.
fn extract_document(fields: Value) -> Option<String> {
    let Value::Array(pairs) = fields else {
        return None;
    };
    let mut iter = pairs.into_iter();
    while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
        if value_to_string(name).as_deref() == Some("$") {
            return value_to_string(value);
        }
    }
    None
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::BulkString(bytes) => String::from_utf8(bytes).ok(),
        Value::SimpleString(s) => Some(s),
        _ => None,
    }
}
