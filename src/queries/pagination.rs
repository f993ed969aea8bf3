//! Paging and sorting shared by every list endpoint.

use std::str::FromStr;

use sea_orm::{DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, Select};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl From<SortDir> for Order {
    fn from(dir: SortDir) -> Self {
        match dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        }
    }
}

/// Query parameters for paged endpoints: `page` is 0-based.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<SortDir>,
}

impl PageRequest {
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn sorted(mut self, field: &str, dir: SortDir) -> Self {
        self.sort_by = Some(field.to_string());
        self.sort_dir = Some(dir);
        self
    }

    pub fn page(&self) -> u64 {
        self.page.unwrap_or(0)
    }

    pub fn size(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    pub fn sort_by(&self) -> &str {
        self.sort_by.as_deref().unwrap_or("id")
    }

    pub fn validate(&self) -> Result<(), String> {
        let size = self.size();
        if size < 1 {
            return Err("size must be at least 1".to_string());
        }
        if size > MAX_PAGE_SIZE {
            return Err(format!("size cannot exceed {MAX_PAGE_SIZE}"));
        }
        Ok(())
    }
}

/// One page of results plus the totals needed to render a pager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

/// Resolve a client-supplied sort field (snake_case or camelCase) to a column.
pub fn sort_column<E: EntityTrait>(field: &str) -> Result<E::Column, ApiError> {
    E::Column::from_str(field)
        .map_err(|_| ApiError::Validation(format!("Unknown sort field: {field}")))
}

/// Order, count and fetch one page of `select`.
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    request: &PageRequest,
) -> Result<Page<E::Model>, ApiError>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    request.validate().map_err(ApiError::Validation)?;

    let column = sort_column::<E>(request.sort_by())?;
    let dir = request.sort_dir.unwrap_or_default();
    let size = request.size();
    let page = request.page();

    let paginator = select.order_by(column, dir.into()).paginate(db, size);
    let totals = paginator.num_items_and_pages().await?;
    let content = paginator.fetch_page(page).await?;

    Ok(Page {
        content,
        page,
        size,
        total_elements: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// Fetch everything matching `select`, ordered by `id` descending.
pub async fn fetch_all<E>(db: &DatabaseConnection, select: Select<E>) -> Result<Vec<E::Model>, ApiError>
where
    E: EntityTrait,
{
    let column = sort_column::<E>("id")?;
    Ok(select.order_by(column, Order::Desc).all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{payments, properties};

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page(), 0);
        assert_eq!(req.size(), DEFAULT_PAGE_SIZE);
        assert_eq!(req.sort_by(), "id");
        assert_eq!(req.sort_dir.unwrap_or_default(), SortDir::Desc);
    }

    #[test]
    fn test_size_bounds() {
        assert!(PageRequest::new(0, 0).validate().is_err());
        assert!(PageRequest::new(0, 101).validate().is_err());
        assert!(PageRequest::new(3, 100).validate().is_ok());
    }

    #[test]
    fn test_sort_column_accepts_both_cases() {
        assert!(matches!(
            sort_column::<properties::Entity>("rentAmount"),
            Ok(properties::Column::RentAmount)
        ));
        assert!(matches!(
            sort_column::<payments::Entity>("due_date"),
            Ok(payments::Column::DueDate)
        ));
        assert!(matches!(
            sort_column::<payments::Entity>("nope"),
            Err(ApiError::Validation(_))
        ));
    }
}
