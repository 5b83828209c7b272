//! Visit workflow: create, inspect, extend and close shop visits.

use chrono::{DateTime, Utc};
use thiserror::Error;

use shoptrail_core::{Price, VisitId};

use super::clock::Clock;
use crate::db::{RepositoryError, VisitStore};
use crate::error::ErrorKind;
use crate::models::visit::ExitVisit;
use crate::models::{LineItem, NewLineItem, NewVisit, Visit};

/// Errors that can occur in the visit workflow.
#[derive(Debug, Error)]
pub enum VisitError {
    /// The path segment is not a visit id.
    #[error("Invalid visit id: {0}")]
    InvalidId(String),

    /// The request body does not describe a valid visit.
    #[error("Invalid visit: {0}")]
    InvalidVisit(String),

    /// A product is missing its name or its price is negative or too large.
    #[error("Invalid product format")]
    InvalidProduct,

    /// Adding the product would push the total out of range.
    #[error("Visit total out of range")]
    TotalOutOfRange,

    #[error("Visit not found")]
    NotFound,

    #[error("Visit already exited")]
    AlreadyExited,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl VisitError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidId(_)
            | Self::InvalidVisit(_)
            | Self::InvalidProduct
            | Self::TotalOutOfRange => ErrorKind::Validation,
            Self::NotFound => ErrorKind::NotFound,
            Self::AlreadyExited => ErrorKind::Conflict,
            Self::Repository(_) => ErrorKind::Server,
        }
    }
}

/// Parse a visit id taken from a URL path.
///
/// # Errors
///
/// Returns `VisitError::InvalidId` if `raw` is not a UUID.
pub fn parse_visit_id(raw: &str) -> Result<VisitId, VisitError> {
    raw.parse().map_err(|_| VisitError::InvalidId(raw.to_owned()))
}

/// Visit service.
pub struct VisitService<'a> {
    visits: &'a dyn VisitStore,
    clock: &'a dyn Clock,
}

impl<'a> VisitService<'a> {
    #[must_use]
    pub const fn new(visits: &'a dyn VisitStore, clock: &'a dyn Clock) -> Self {
        Self { visits, clock }
    }

    /// Validate and store a new visit.
    ///
    /// `enteredAt` defaults to now and `total` to the sum of the items.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::InvalidVisit` or `VisitError::InvalidProduct` if
    /// the payload breaks an invariant.
    pub async fn create(&self, new: NewVisit) -> Result<Visit, VisitError> {
        if new.user.trim().is_empty() {
            return Err(VisitError::InvalidVisit("user is required".to_owned()));
        }
        if new.shop_id.trim().is_empty() {
            return Err(VisitError::InvalidVisit("shopId is required".to_owned()));
        }

        let items = new
            .items
            .into_iter()
            .map(validate_item)
            .collect::<Result<Vec<_>, _>>()?;
        let items_total = Price::checked_sum(items.iter().map(|item| item.price))
            .ok_or_else(|| VisitError::InvalidVisit("item prices exceed the maximum total".to_owned()))?;

        let total = match new.total {
            Some(total) if total != items_total => {
                return Err(VisitError::InvalidVisit(format!(
                    "total {total} does not match item sum {items_total}"
                )));
            }
            _ => items_total,
        };

        let entered_at = new.entered_at.unwrap_or_else(|| self.clock.now());
        if let Some(exited_at) = new.exited_at {
            check_exit_order(entered_at, exited_at)?;
        }

        let visit = Visit {
            id: VisitId::generate(),
            user: new.user,
            shop_id: new.shop_id,
            entered_at,
            exited_at: new.exited_at,
            items,
            total,
        };
        self.visits.create(&visit).await?;

        tracing::info!(visit_id = %visit.id, shop_id = %visit.shop_id, "Visit saved");
        Ok(visit)
    }

    /// # Errors
    ///
    /// Returns `VisitError::NotFound` if no visit has this id.
    pub async fn get(&self, id: VisitId) -> Result<Visit, VisitError> {
        self.visits.get(id).await?.ok_or(VisitError::NotFound)
    }

    /// Append a product and add its price to the total in one storage step.
    ///
    /// An unknown visit is reported before a bad product.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::NotFound`, `VisitError::InvalidProduct`, or
    /// `VisitError::TotalOutOfRange` if the new total would exceed the cap.
    pub async fn add_product(&self, id: VisitId, item: NewLineItem) -> Result<Visit, VisitError> {
        let item = match validate_item(item) {
            Ok(item) => item,
            Err(err) => {
                self.get(id).await?;
                return Err(err);
            }
        };

        let visit = self
            .visits
            .append_item(id, &item)
            .await
            .map_err(visit_error_from_store)?;

        tracing::debug!(visit_id = %id, total = %visit.total, "Product added");
        Ok(visit)
    }

    /// Record when the shopper left. Defaults to now.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::NotFound`, `VisitError::AlreadyExited`, or
    /// `VisitError::InvalidVisit` if the exit precedes the entry.
    pub async fn exit(&self, id: VisitId, body: ExitVisit) -> Result<Visit, VisitError> {
        let visit = self.get(id).await?;
        if visit.exited_at.is_some() {
            return Err(VisitError::AlreadyExited);
        }

        let exited_at = body.exited_at.unwrap_or_else(|| self.clock.now());
        check_exit_order(visit.entered_at, exited_at)?;

        self.visits
            .mark_exited(id, exited_at)
            .await
            .map_err(visit_error_from_store)
    }

    /// All visits, most recently entered first.
    ///
    /// # Errors
    ///
    /// Returns `VisitError::Repository` if storage fails.
    pub async fn list(&self) -> Result<Vec<Visit>, VisitError> {
        Ok(self.visits.list_recent_first().await?)
    }
}

fn validate_item(item: NewLineItem) -> Result<LineItem, VisitError> {
    if item.name.trim().is_empty() {
        return Err(VisitError::InvalidProduct);
    }
    let price = Price::new(item.price.amount()).map_err(|_| VisitError::InvalidProduct)?;
    Ok(LineItem {
        name: item.name,
        price,
    })
}

fn check_exit_order(
    entered_at: DateTime<Utc>,
    exited_at: DateTime<Utc>,
) -> Result<(), VisitError> {
    if exited_at < entered_at {
        return Err(VisitError::InvalidVisit(
            "exitedAt precedes enteredAt".to_owned(),
        ));
    }
    Ok(())
}

fn visit_error_from_store(err: RepositoryError) -> VisitError {
    match err {
        RepositoryError::NotFound => VisitError::NotFound,
        RepositoryError::Conflict(_) => VisitError::AlreadyExited,
        RepositoryError::OutOfRange => VisitError::TotalOutOfRange,
        other => VisitError::Repository(other),
    }
}
