use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    app::AppError,
    database::DbConnection,
    schema::{self, users},
};

/// Account record. Created at registration and never mutated after;
/// there is no delete path.
#[derive(Debug, Queryable, Clone)]
pub struct User {
    pub id: String,
    pub username: String,
    /// SHA256 of salt+password, never the plaintext
    pub pass_hash: String,
    pub pass_salt: String,
    pub display_name: Option<String>,
}

#[derive(Insertable)]
#[table_name = "users"]
struct UserInsert {
    id: String,
    username: String,
    pass_hash: String,
    pass_salt: String,
    display_name: Option<String>,
}

impl User {
    /// Pushes a new user row. The username must be free; a unique
    /// violation from the database surfaces as `DuplicateUsername`.
    pub fn create(
        conn: &DbConnection,
        username: &str,
        pass_hash: &str,
        pass_salt: &str,
        display_name: Option<&str>,
    ) -> Result<User, AppError> {
        let to_insert = UserInsert {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            pass_hash: pass_hash.to_string(),
            pass_salt: pass_salt.to_string(),
            display_name: display_name.map(String::from),
        };

        let ret_user: User = diesel::insert_into(schema::users::table)
            .values(&to_insert)
            .get_result(conn)?;

        Ok(ret_user)
    }

    pub fn find_by_id(conn: &DbConnection, user_id: &str) -> Result<User, AppError> {
        use crate::schema::users::dsl::*;

        Ok(users.filter(id.eq(user_id)).first::<User>(conn)?)
    }

    /// Returns the user with the specified username, `None` when no
    /// such account exists.
    pub fn find_by_username(conn: &DbConnection, uname: &str) -> Result<Option<User>, AppError> {
        use crate::schema::users::dsl::*;

        Ok(users
            .filter(username.eq(uname))
            .first::<User>(conn)
            .optional()?)
    }
}
