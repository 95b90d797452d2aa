//! Create and edit flows around the shared `ShelterEditor`.
//!
//! Both screens submit through the editor, so an invalid draft never reaches
//! the backend. On success they invalidate the affected cache keys, raise a
//! success notice and pop one step. Backend failures raise a notice and
//! leave the draft as typed.

use std::sync::Arc;

use tracing::{debug, info};

use super::{ERROR_TITLE, Mount, SUCCESS_TITLE, ScreenContext, ScreenError};
use crate::cache::QueryKey;
use crate::editor::{ShelterEditor, SubmitError};
use crate::gateway::GatewayError;
use crate::router::Router;
use crate::shelter::{DEFAULT_OWNER_EMAIL, Shelter, ShelterDraft};

const CREATED: &str = "Abrigo criado com sucesso!";
const CREATE_FAILED: &str = "Não foi possível criar o abrigo.";
const UPDATED: &str = "Abrigo atualizado com sucesso!";
const UPDATE_FAILED: &str = "Não foi possível atualizar o abrigo.";
const MISSING_ID: &str = "ID do abrigo não informado!";
const LOAD_FAILED: &str = "Erro ao carregar dados do abrigo.";

/// Map an editor outcome onto the screen error, raising the failure notice
/// for backend rejections while mounted.
fn rejected(ctx: &ScreenContext, mount: &Mount, err: SubmitError<GatewayError>, message: &str) -> ScreenError {
    match err {
        SubmitError::Busy => ScreenError::Busy,
        SubmitError::Invalid(errors) => ScreenError::Invalid(errors),
        SubmitError::Rejected(e) => {
            if mount.is_mounted() {
                ctx.notifier.error(ERROR_TITLE, message);
            } else {
                debug!(error = %e, "mutation failed after unmount");
            }
            ScreenError::Gateway(e)
        }
    }
}

// =============================================================================
// CREATE
// =============================================================================

pub struct CreateShelterScreen {
    ctx: ScreenContext,
    editor: ShelterEditor,
    mount: Mount,
}

impl CreateShelterScreen {
    /// Empty draft owned by the signed-in user, or the placeholder owner.
    #[must_use]
    pub fn new(ctx: ScreenContext) -> Self {
        let owner = ctx.session.email().unwrap_or(DEFAULT_OWNER_EMAIL).to_owned();
        Self { ctx, editor: ShelterEditor::with_initial(ShelterDraft::for_owner(&owner)), mount: Mount::new() }
    }

    #[must_use]
    pub fn editor(&self) -> &ShelterEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ShelterEditor {
        &mut self.editor
    }

    #[must_use]
    pub fn mount(&self) -> Mount {
        self.mount.clone()
    }

    /// Validate and create.
    ///
    /// # Errors
    ///
    /// `Invalid` without a request, `Busy` while another submit runs, or the
    /// gateway failure.
    pub async fn submit(&mut self, router: &mut Router) -> Result<Shelter, ScreenError> {
        let api = Arc::clone(&self.ctx.api);
        let outcome = self.editor.submit(&self.ctx.notifier, |draft| async move { api.create(&draft).await }).await;

        let shelter = outcome.map_err(|e| rejected(&self.ctx, &self.mount, e, CREATE_FAILED))?;
        info!(id = shelter.id, "shelter created");
        self.ctx.cache.invalidate(QueryKey::Shelters).await;

        if self.mount.is_mounted() {
            self.ctx.notifier.success(SUCCESS_TITLE, CREATED);
            router.back();
        }
        Ok(shelter)
    }
}

// =============================================================================
// EDIT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditView {
    Loading,
    Ready,
    /// Load failed or the record is missing; nothing further is shown.
    Failed,
}

pub struct EditShelterScreen {
    ctx: ScreenContext,
    id: u64,
    editor: Option<ShelterEditor>,
    view: EditView,
    mount: Mount,
}

impl EditShelterScreen {
    /// Open the edit screen for a route parameter. A missing or zero id
    /// raises a notice and fetches nothing.
    ///
    /// # Errors
    ///
    /// `MissingId` when `id` is absent or zero.
    pub fn open(ctx: ScreenContext, id: Option<u64>) -> Result<Self, ScreenError> {
        let Some(id) = id.filter(|&id| id != 0) else {
            ctx.notifier.error(ERROR_TITLE, MISSING_ID);
            return Err(ScreenError::MissingId);
        };
        Ok(Self { ctx, id, editor: None, view: EditView::Loading, mount: Mount::new() })
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn view(&self) -> EditView {
        self.view
    }

    /// The form, once the record has loaded.
    #[must_use]
    pub fn editor(&self) -> Option<&ShelterEditor> {
        self.editor.as_ref()
    }

    pub fn editor_mut(&mut self) -> Option<&mut ShelterEditor> {
        self.editor.as_mut()
    }

    #[must_use]
    pub fn mount(&self) -> Mount {
        self.mount.clone()
    }

    /// Fetch the record (keyed by id in the cache) and seed the form.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing record, otherwise the gateway failure.
    pub async fn load(&mut self) -> Result<(), ScreenError> {
        match self.ctx.cache.shelter(self.ctx.api.as_ref(), self.id).await {
            Ok(shelter) => {
                self.editor = Some(ShelterEditor::with_initial(ShelterDraft::from(&shelter)));
                self.view = EditView::Ready;
                Ok(())
            }
            Err(e) => {
                if self.mount.is_mounted() {
                    self.ctx.notifier.error(ERROR_TITLE, LOAD_FAILED);
                }
                self.view = EditView::Failed;
                if e.is_not_found() { Err(ScreenError::NotFound(self.id)) } else { Err(e.into()) }
            }
        }
    }

    /// Validate and send the full replacement.
    ///
    /// # Errors
    ///
    /// `NotFound` before a successful load, then as `CreateShelterScreen::submit`.
    pub async fn submit(&mut self, router: &mut Router) -> Result<Shelter, ScreenError> {
        let id = self.id;
        let Some(editor) = self.editor.as_mut() else {
            return Err(ScreenError::NotFound(id));
        };

        let api = Arc::clone(&self.ctx.api);
        let outcome = editor.submit(&self.ctx.notifier, |draft| async move { api.update(id, &draft).await }).await;

        let shelter = outcome.map_err(|e| rejected(&self.ctx, &self.mount, e, UPDATE_FAILED))?;
        info!(id, "shelter updated");
        self.ctx.cache.invalidate(QueryKey::Shelter(id)).await;
        self.ctx.cache.invalidate(QueryKey::Shelters).await;

        if self.mount.is_mounted() {
            self.ctx.notifier.success(SUCCESS_TITLE, UPDATED);
            router.back();
        }
        Ok(shelter)
    }
}

#[cfg(test)]
#[path = "shelter_form_test.rs"]
mod tests;
