//! # Currency Repository
//!
//! Storage adapters for the currency rate client. `SqliteRepo` implements
//! both the `RateCache` and `PreferenceStore` ports on one durable database.

#[cfg(not(feature = "sqlite"))]
compile_error!("Enable a repo feature: `sqlite`.");

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
mod types;


#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepo;

/// Build and initialize a repository from a database URL.
///
/// This function:
/// 1. Creates the database file (and its directory) if missing
/// 2. Applies the schema
/// 3. Loads the stored currency selection
///
/// # Examples
///
/// ```ignore
/// let repo = build_repo("sqlite://data/currency.db?mode=rwc").await?;
/// let ephemeral = build_repo("sqlite::memory:").await?;
/// ```
#[cfg(feature = "sqlite")]
pub async fn build_repo(database_url: &str) -> anyhow::Result<SqliteRepo> {
    SqliteRepo::new(database_url).await
}
