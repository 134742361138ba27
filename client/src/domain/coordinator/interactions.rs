//! Sending interaction notes.

use tracing::{debug, info};

use super::{MutationCoordinator, log_cache_result};
use crate::domain::ports::{QueryData, QueryKey};
use crate::domain::{
    Error, Interaction, InteractionComposer, InteractionContent, NoticeKind, prepend_unique,
};

impl MutationCoordinator {
    /// Send the composer's draft as a new interaction.
    ///
    /// The composer is marked as sending for the whole call and unmarked on
    /// every exit path. The note is not shown until the server returns it;
    /// it is then prepended to the cached interactions list if that list is
    /// cached. The draft is cleared only on success so a failed send can be
    /// retried.
    ///
    /// # Errors
    ///
    /// Blank drafts and overlapping sends are rejected without a network
    /// call. Gateway failures surface a notice.
    pub async fn create_interaction(
        &self,
        composer: &InteractionComposer,
    ) -> Result<Interaction, Error> {
        let content = InteractionContent::new(composer.draft())
            .map_err(|error| self.reject_input(NoticeKind::EmptyInteraction, error.to_string()))?;
        let epoch = self.require_session("create_interaction")?;
        let Some(_sending) = composer.begin_send() else {
            return Err(self.reject_input(
                NoticeKind::InteractionAlreadySending,
                "an interaction is already being sent",
            ));
        };

        let company_id = composer.company_id();
        let interaction = self
            .ports
            .gateway
            .create_interaction(company_id, &content)
            .await
            .map_err(|error| {
                self.gateway_failure("create_interaction", NoticeKind::InteractionFailed, error)
            })?;

        composer.clear_draft();
        self.reconcile(epoch, "create_interaction", || {
            let key = QueryKey::Interactions(company_id.clone());
            let result = self.ports.cache.update(&key, &mut |data| match data {
                QueryData::Interactions(list) => prepend_unique(list, interaction.clone()),
                _ => false,
            });
            if let Ok(inserted) = result {
                debug!(
                    company_id = %company_id,
                    interaction_id = %interaction.id,
                    inserted,
                    "interaction reconciled into cache"
                );
            }
            log_cache_result(&key, result);
        });
        info!(company_id = %company_id, interaction_id = %interaction.id, "interaction created");
        Ok(interaction)
    }
}
