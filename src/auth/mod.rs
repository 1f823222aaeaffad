pub mod guards;
pub mod token;

use r2d2_redis::redis::Connection as RedisConnection;
use rand::distributions::{Alphanumeric, DistString};
use sha256::digest;

use crate::{
    app::AppError,
    database::{models::user::User, DbConnection},
};

use token::Token;

const SALT_LEN: usize = 16;

fn generate_salt() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), SALT_LEN)
}

fn hash_password(password: &str, salt: &str) -> String {
    digest(format!("{}{}", salt, password))
}

fn verify_password(password: &str, salt: &str, stored_hash: &str) -> bool {
    hash_password(password, salt) == stored_hash
}

/// Creates an account. Only the salted hash of the password is stored.
/// Fails with `DuplicateUsername` when the name is taken.
pub fn register(
    conn: &DbConnection,
    username: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<User, AppError> {
    if User::find_by_username(conn, username)?.is_some() {
        return Err(AppError::DuplicateUsername);
    }

    let salt = generate_salt();
    let hash = hash_password(password, &salt);

    User::create(conn, username, &hash, &salt, display_name)
}

/// Verifies credentials and establishes a session. Unknown usernames
/// and hash mismatches are indistinguishable to the caller.
pub fn login(
    conn: &DbConnection,
    redis_conn: &mut RedisConnection,
    username: &str,
    password: &str,
) -> Result<(User, String), AppError> {
    let user = User::find_by_username(conn, username)?.ok_or(AppError::InvalidCredentials)?;

    if !verify_password(password, &user.pass_salt, &user.pass_hash) {
        return Err(AppError::InvalidCredentials);
    }

    let session = Token::new(redis_conn, &user.id)?;
    Ok((user, session))
}

/// Invalidates the session token server-side.
pub fn logout(redis_conn: &mut RedisConnection, session: &str) {
    Token::delete(redis_conn, session);
}
