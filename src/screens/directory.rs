//! Shelter directory — the home screen's list of shelters.
//!
//! One round trip through the query cache, rendered in server order. Delete
//! invalidates the cached collection and drops the cached item but leaves
//! the current cards alone; they change on the next `load`.

use tracing::{debug, info};

use super::{ERROR_TITLE, Mount, ScreenContext, ScreenError};
use crate::cache::QueryKey;
use crate::router::{Route, Router};
use crate::shelter::{Shelter, ShelterStatus};

const LOAD_FAILED: &str = "Não foi possível carregar os abrigos.";
const DELETE_FAILED: &str = "Não foi possível excluir o abrigo.";

/// Display form of one shelter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelterCard {
    pub id: u64,
    pub name: String,
    pub status: ShelterStatus,
    pub total_capacity: u32,
    pub current_capacity: u32,
    pub available_resources: String,
    /// `dd/mm/yyyy HH:MM`, or the raw server value when it does not parse.
    pub last_update: Option<String>,
    pub address_line: String,
    pub contact_line: String,
}

impl From<&Shelter> for ShelterCard {
    fn from(shelter: &Shelter) -> Self {
        let last_update = shelter
            .last_update_at()
            .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
            .or_else(|| shelter.last_update.clone());
        Self {
            id: shelter.id,
            name: shelter.name.clone(),
            status: shelter.status,
            total_capacity: shelter.total_capacity,
            current_capacity: shelter.current_capacity,
            available_resources: shelter.available_resources.clone(),
            last_update,
            address_line: shelter.address_line(),
            contact_line: shelter.contact_line(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryView {
    Loading,
    Ready(Vec<ShelterCard>),
    Failed,
}

pub struct ShelterDirectory {
    ctx: ScreenContext,
    view: DirectoryView,
    mount: Mount,
}

impl ShelterDirectory {
    #[must_use]
    pub fn new(ctx: ScreenContext) -> Self {
        Self { ctx, view: DirectoryView::Loading, mount: Mount::new() }
    }

    #[must_use]
    pub fn view(&self) -> &DirectoryView {
        &self.view
    }

    #[must_use]
    pub fn mount(&self) -> Mount {
        self.mount.clone()
    }

    /// Read the collection (from cache when fresh) and rebuild the cards.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure after raising a notice.
    pub async fn load(&mut self) -> Result<(), ScreenError> {
        if !matches!(self.view, DirectoryView::Ready(_)) {
            self.view = DirectoryView::Loading;
        }
        match self.ctx.cache.shelters(self.ctx.api.as_ref()).await {
            Ok(shelters) => {
                debug!(count = shelters.len(), "directory loaded");
                self.view = DirectoryView::Ready(shelters.iter().map(ShelterCard::from).collect());
                Ok(())
            }
            Err(e) => {
                if self.mount.is_mounted() {
                    self.ctx.notifier.error(ERROR_TITLE, LOAD_FAILED);
                }
                self.view = DirectoryView::Failed;
                Err(e.into())
            }
        }
    }

    /// Remove a shelter server-side, invalidate the collection and drop its
    /// cached item.
    ///
    /// # Errors
    ///
    /// Returns the gateway failure after raising a notice.
    pub async fn delete(&mut self, id: u64) -> Result<(), ScreenError> {
        match self.ctx.api.delete(id).await {
            Ok(()) => {
                info!(id, "shelter deleted");
                self.ctx.cache.invalidate(QueryKey::Shelters).await;
                self.ctx.cache.forget(id).await;
                Ok(())
            }
            Err(e) => {
                if self.mount.is_mounted() {
                    self.ctx.notifier.error(ERROR_TITLE, DELETE_FAILED);
                } else {
                    debug!(id, "delete failed after unmount");
                }
                Err(e.into())
            }
        }
    }

    /// Navigate to the edit screen for `id`.
    pub fn edit(&self, router: &mut Router, id: u64) {
        router.push(Route::Edit { id });
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
