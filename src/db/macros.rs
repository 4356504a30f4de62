//! Backend dispatch macros for reducing code duplication.
//!
//! The backends expose identical functionality over different sqlx connection
//! types; these macros expand the repetitive match at compile time.

/// Macro for generating `DbConnection` dispatch match arms.
///
/// # Example
///
/// ```ignore
/// impl_db_dispatch!(conn, {
///     MySql(c) => do_mysql(c),
///     Postgres(c) => do_postgres(c),
///     SQLite(c) => do_sqlite(c),
/// });
/// ```
#[macro_export]
macro_rules! impl_db_dispatch {
    ($conn:expr, { $($variant:ident($c:ident) => $body:expr),+ $(,)? }) => {
        match $conn {
            $(
                $crate::db::connection::DbConnection::$variant($c) => $body,
            )+
        }
    };
}

/// Same body for every backend.
#[macro_export]
macro_rules! db_dispatch_all {
    ($conn:expr, $c:ident => $body:expr) => {
        $crate::impl_db_dispatch!($conn, {
            MySql($c) => $body,
            Postgres($c) => $body,
            SQLite($c) => $body,
        })
    };
}

pub use db_dispatch_all;
pub use impl_db_dispatch;
