//! REST handlers. Each handler extracts, runs one `products_hr` pipeline and
//! wraps the outcome; no business rule lives here.

pub mod departments;
pub mod employees;
pub mod jobs;

use serde::{Deserialize, Serialize};

/// Run a write pipeline against the pool, or against a transaction when
/// `HR_ATOMIC_WRITES` is on. The transaction commits only when the pipeline
/// returns `Ok`; on any error it is dropped, which rolls it back.
///
/// Without atomic writes the reference pre-checks and the mutation use
/// separate statements, and a referenced row can disappear in between; the
/// store's foreign keys then reject the write.
macro_rules! write_scope {
    ($state:expr, |$conn:ident| $body:expr) => {{
        let state = &$state;
        if state.config.atomic_writes {
            let txn = ::sea_orm::TransactionTrait::begin(&state.pool)
                .await
                .map_err(::platform_api::ApiError::internal)?;
            let outcome = {
                let $conn = &txn;
                $body.await
            };
            match outcome {
                Ok(value) => {
                    txn.commit()
                        .await
                        .map_err(::platform_api::ApiError::internal)?;
                    Ok(value)
                }
                Err(err) => Err(err),
            }
        } else {
            let $conn = &state.pool;
            $body.await
        }
    }};
}

pub(crate) use write_scope;

/// `{"data": ..}`
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// `{"message": .., "data": ..}`; `data` is omitted when there is nothing to
/// echo back.
#[derive(Debug, Serialize)]
pub struct Done<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Done<()> {
    pub fn message(message: String) -> Self {
        Self {
            message,
            data: None,
        }
    }
}

impl<T> Done<T> {
    pub fn with(message: String, data: T) -> Self {
        Self {
            message,
            data: Some(data),
        }
    }
}

/// `?page=&limit=` as sent by browsers. Values that do not parse as positive
/// integers switch paging off rather than failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn request(&self) -> products_hr::PageRequest {
        let parse = |raw: &Option<String>| raw.as_deref().and_then(|v| v.trim().parse().ok());
        products_hr::PageRequest::new(parse(&self.page), parse(&self.limit))
    }
}
