use r2d2_redis::redis::{Commands, Connection, RedisError};
use rand::distributions::{Alphanumeric, DistString};

/// Seconds a session lives without being refreshed by a new login.
pub const SESSION_TTL_SECS: usize = 3600;

const TOKEN_LEN: usize = 32;

/// Opaque session tokens, stored server-side in redis as
/// token -> user id with a TTL. The session store lives for the
/// process; nothing here survives a redis restart.
pub struct Token {}

impl Token {
    /// Mints a token for the user and registers it in the store.
    pub fn new(redis_conn: &mut Connection, user_id: &str) -> Result<String, RedisError> {
        let token = Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LEN);

        redis_conn.set_ex::<&str, &str, ()>(&token, user_id, SESSION_TTL_SECS)?;

        Ok(token)
    }

    /// Resolves a token to the user id it was minted for. Missing and
    /// expired tokens come back as `None`; an error means the store
    /// itself could not be reached.
    pub fn find(redis_conn: &mut Connection, token: &str) -> Result<Option<String>, RedisError> {
        redis_conn.get::<&str, Option<String>>(token)
    }

    pub fn delete(redis_conn: &mut Connection, token: &str) {
        let _res = redis_conn.del::<&str, i32>(token);
    }
}
