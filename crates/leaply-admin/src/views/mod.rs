//! List views: cached rows, local filtering, and row-level edit/delete.
//!
//! A view never re-queries the server to filter; the search term is applied
//! to whatever the cache returned for the view's key. Deletes go through a
//! [`Confirm`] hook first and invalidate the entity kind on success.

mod dashboard;
mod rows;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{CacheEvent, QueryKey};
use crate::context::{AdminContext, UNIVERSITY_FILTER_PARAM};
use crate::error::Result;
use crate::forms::Notification;
use crate::model::{Entity, Program};

pub use dashboard::DashboardStats;
pub use rows::{format_date, format_optional};

/// An entity that can be listed, searched and rendered as a table row.
pub trait ListEntity: Entity {
    /// Plural label used in messages ("programs").
    const PLURAL: &'static str;
    /// Confirmation prompt shown before a delete.
    const DELETE_PROMPT: &'static str;

    /// Fetch the rows for `key` through the cache.
    fn load(ctx: &AdminContext, key: &QueryKey) -> impl Future<Output = Result<Arc<Vec<Self>>>>;

    /// Case-insensitive match; `needle` is already lowercased.
    fn matches(&self, needle: &str) -> bool;

    fn columns() -> &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

/// Entities with an edit form.
pub trait Editable: ListEntity {
    type Form;

    fn edit_form(&self) -> Self::Form;
}

/// Rows matching `term` (case-insensitive substring). Blank matches all.
pub fn filter_rows<E: ListEntity>(rows: &[E], term: &str) -> Vec<E> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return rows.to_vec();
    }
    rows.iter().filter(|r| r.matches(&needle)).cloned().collect()
}

/// What a list view renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<E> {
    Rows(Vec<E>),
    /// Loaded, but nothing matched ("No programs found.").
    Empty(String),
    /// The fetch failed; render the fallback with this message.
    Failed(String),
}

/// Asks the user before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent.
    Cancelled,
    Deleted(Notification),
}

pub struct ListView<E: ListEntity> {
    ctx: AdminContext,
    key: QueryKey,
    search: String,
    _entity: PhantomData<E>,
}

impl<E: ListEntity> ListView<E> {
    pub fn new(ctx: AdminContext) -> Self {
        Self::with_key(ctx, QueryKey::all(E::KIND))
    }

    fn with_key(ctx: AdminContext, key: QueryKey) -> Self {
        Self {
            ctx,
            key,
            search: String::new(),
            _entity: PhantomData,
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    /// Filtered rows, or the fetch error.
    pub async fn rows(&self) -> Result<Vec<E>> {
        let all = E::load(&self.ctx, &self.key).await?;
        Ok(filter_rows(&all, &self.search))
    }

    pub async fn load(&self) -> ViewState<E> {
        match self.rows().await {
            Ok(rows) if rows.is_empty() => ViewState::Empty(format!("No {} found.", E::PLURAL)),
            Ok(rows) => ViewState::Rows(rows),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to load list");
                ViewState::Failed(e.user_message(&format!("Failed to load {}", E::PLURAL)))
            }
        }
    }

    /// Look a row up by id in the (unfiltered) cached list.
    pub async fn find(&self, id: Uuid) -> Result<Option<E>> {
        let all = E::load(&self.ctx, &self.key).await?;
        Ok(all.iter().find(|r| r.id() == id).cloned())
    }

    /// Whether `event` means this view should reload.
    pub fn is_affected_by(&self, event: &CacheEvent) -> bool {
        match event {
            CacheEvent::Invalidated { kind, .. } => *kind == E::KIND,
            CacheEvent::Updated(key) => *key == self.key,
        }
    }

    /// Confirm, delete, and invalidate every cached list of this kind.
    ///
    /// # Errors
    ///
    /// Request failures are returned unchanged; the cache is not touched.
    pub async fn delete(&self, id: Uuid, confirm: &impl Confirm) -> Result<DeleteOutcome> {
        if !confirm.confirm(E::DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }
        self.ctx.delete(E::KIND, id).await?;
        Ok(DeleteOutcome::Deleted(Notification::success(format!(
            "{} deleted successfully",
            E::KIND.label()
        ))))
    }

    /// Fixed message for a failed delete.
    pub fn delete_failed() -> Notification {
        Notification::error(format!(
            "Failed to delete {}",
            E::KIND.label().to_lowercase()
        ))
    }
}

impl<E: Editable> ListView<E> {
    /// The form pre-populated with row `id`, if it is listed.
    pub async fn edit(&self, id: Uuid) -> Result<Option<E::Form>> {
        Ok(self.find(id).await?.map(|row| row.edit_form()))
    }
}

impl ListView<Program> {
    /// Programs, optionally narrowed to one university.
    pub fn for_university(ctx: AdminContext, university_id: Option<Uuid>) -> Self {
        Self::with_key(ctx, AdminContext::programs_key(university_id))
    }

    pub fn university_filter(&self) -> Option<Uuid> {
        self.key
            .param(UNIVERSITY_FILTER_PARAM)
            .and_then(|v| Uuid::parse_str(v).ok())
    }

    pub fn clear_filter(&mut self) {
        self.key = AdminContext::programs_key(None);
    }
}
