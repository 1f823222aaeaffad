pub mod db_utils;
pub mod models;

use diesel::{
    r2d2::{ConnectionManager, PooledConnection},
    PgConnection,
};

/// Checked-out postgres connection the model methods operate on.
pub type DbConnection = PooledConnection<ConnectionManager<PgConnection>>;
