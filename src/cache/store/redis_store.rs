use redis::{Client as RedisClient, Commands};

use super::SessionStore;
use crate::cache::keys::namespaced_key;
use crate::error::StoreError;

/// Redis 存储，键统一加命名空间前缀
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    pub fn open(url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(RedisClient::open(url)?))
    }
}

impl SessionStore for RedisStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.client.get_connection()?;
        let value: Option<String> = conn.get(namespaced_key(key))?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_connection()?;
        let _: () = conn.set(namespaced_key(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_connection()?;
        let _: () = conn.del(namespaced_key(key))?;
        Ok(())
    }
}
