/*
 * Responsibility
 * - What the repo layer tells its callers went wrong
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("stored recipe of drink {id} is not valid json")]
    CorruptRecipe {
        id: i32,
        #[source]
        source: serde_json::Error,
    },
    #[error("recipe could not be encoded")]
    EncodeRecipe(#[source] serde_json::Error),
}

impl RepoError {
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e
            && dbe.code().as_deref() == Some("23505")
        {
            return RepoError::Conflict;
        }
        RepoError::Db(e)
    }
}
