use serde::de::DeserializeOwned;
use serde::Serialize;

use super::client::StoreClient;
use super::error::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Builder for row-API query parameters. Collects filters, projection, and
/// ordering, then renders them as the store's query-string dialect
/// (`column=eq.value`, `order=column.desc`, ...). Pure; execution lives on
/// [`RowQuery`].
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    select: Option<String>,
    conditions: Vec<(String, String)>,
    order: Vec<(String, SortDirection)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl RowFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: &str) -> Result<Self, StoreError> {
        for column in columns.split(',') {
            Self::validate_column(column.trim())?;
        }
        self.select = Some(columns.to_string());
        Ok(self)
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Result<Self, StoreError> {
        Self::validate_column(column)?;
        self.conditions
            .push((column.to_string(), format!("eq.{}", value.to_string())));
        Ok(self)
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Result<Self, StoreError> {
        Self::validate_column(column)?;
        self.conditions
            .push((column.to_string(), format!("gte.{}", value.to_string())));
        Ok(self)
    }

    pub fn lte(mut self, column: &str, value: impl ToString) -> Result<Self, StoreError> {
        Self::validate_column(column)?;
        self.conditions
            .push((column.to_string(), format!("lte.{}", value.to_string())));
        Ok(self)
    }

    pub fn in_list<V: ToString>(mut self, column: &str, values: &[V]) -> Result<Self, StoreError> {
        Self::validate_column(column)?;
        let list = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.conditions
            .push((column.to_string(), format!("in.({})", list)));
        Ok(self)
    }

    pub fn order(mut self, column: &str, direction: SortDirection) -> Result<Self, StoreError> {
        Self::validate_column(column)?;
        self.order.push((column.to_string(), direction));
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        // Cap at the configured list maximum
        let max = crate::config::config().api.max_list_limit;
        self.limit = Some(limit.min(max));
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        for (column, condition) in &self.conditions {
            params.push((column.clone(), condition.clone()));
        }
        if !self.order.is_empty() {
            let rendered = self
                .order
                .iter()
                .map(|(column, dir)| format!("{}.{}", column, dir.to_param()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), rendered));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }

    fn validate_column(name: &str) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::InvalidColumnName("(empty)".to_string()));
        }
        let valid = name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '*');
        if !valid {
            return Err(StoreError::InvalidColumnName(name.to_string()));
        }
        Ok(())
    }
}

/// A filter bound to a table and a client, ready to execute.
pub struct RowQuery<'a> {
    client: &'a StoreClient,
    table: String,
    filter: RowFilter,
}

impl<'a> RowQuery<'a> {
    pub(crate) fn new(client: &'a StoreClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            filter: RowFilter::new(),
        }
    }

    pub fn select(mut self, columns: &str) -> Result<Self, StoreError> {
        self.filter = self.filter.select(columns)?;
        Ok(self)
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Result<Self, StoreError> {
        self.filter = self.filter.eq(column, value)?;
        Ok(self)
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Result<Self, StoreError> {
        self.filter = self.filter.gte(column, value)?;
        Ok(self)
    }

    pub fn lte(mut self, column: &str, value: impl ToString) -> Result<Self, StoreError> {
        self.filter = self.filter.lte(column, value)?;
        Ok(self)
    }

    pub fn in_list<V: ToString>(mut self, column: &str, values: &[V]) -> Result<Self, StoreError> {
        self.filter = self.filter.in_list(column, values)?;
        Ok(self)
    }

    pub fn order(mut self, column: &str, direction: SortDirection) -> Result<Self, StoreError> {
        self.filter = self.filter.order(column, direction)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.filter = self.filter.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.filter = self.filter.offset(offset);
        self
    }

    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, StoreError> {
        self.client
            .get_rows(&self.table, self.filter.to_params())
            .await
    }

    /// Fetch at most one row. Forces `limit=1` so the store never ships more
    /// than the caller will look at.
    pub async fn fetch_optional<T: DeserializeOwned>(self) -> Result<Option<T>, StoreError> {
        let rows: Vec<T> = self
            .client
            .get_rows(&self.table, self.filter.limit(1).to_params())
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        self,
        body: &B,
    ) -> Result<Vec<T>, StoreError> {
        self.client.insert_rows(&self.table, body).await
    }

    pub async fn update<B: Serialize>(self, body: &B) -> Result<(), StoreError> {
        self.client
            .update_rows(&self.table, self.filter.to_params(), body)
            .await
    }

    pub async fn delete(self) -> Result<(), StoreError> {
        self.client
            .delete_rows(&self.table, self.filter.to_params())
            .await
    }
}
