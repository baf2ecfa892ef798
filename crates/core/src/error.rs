use thiserror::Error;

use crate::catalog::CatalogError;
use crate::model::{ParseIdError, QuizError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    QuizId(#[from] ParseIdError),
}
