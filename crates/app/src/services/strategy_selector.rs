//! Strategy selector: decides per form whether routing is location-based
//! or identifier-based.

use leadrouter_domain::error::SurfaceError;
use leadrouter_domain::form::FormId;
use leadrouter_domain::notification::NotificationKind;
use leadrouter_domain::routing::{SelectionBasis, StrategySelection};

use crate::ports::FormSurface;

/// Inspects a form's routing UI to pick its routing strategy.
///
/// Read-only: navigates to the first notification's editor and lists the
/// routing fields it offers, but never writes.
pub struct StrategySelector<S> {
    surface: S,
}

impl<S: FormSurface> StrategySelector<S> {
    /// Create a new selector driving the given surface.
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// Choose the routing strategy for a form.
    ///
    /// Never fails: when the routing UI cannot be reached the selection falls
    /// back to identifier-based routing and a warning is logged.
    #[tracing::instrument(skip_all, fields(form_id = %form_id))]
    pub async fn select_strategy(&self, form_id: &FormId) -> StrategySelection {
        let selection = match self.offered_fields(form_id).await {
            Ok(offered) => {
                tracing::debug!(?offered, "routing fields offered");
                StrategySelection::from_offered(&offered)
            }
            Err(err) => StrategySelection::inspection_failed(err.to_string()),
        };

        match &selection.basis {
            SelectionBasis::LocationField(field) => {
                tracing::info!(%field, "using location-based routing");
            }
            SelectionBasis::IdentifierField(field) => {
                tracing::info!(%field, "using dealer-id-based routing");
            }
            SelectionBasis::NoRoutingField => {
                tracing::warn!(
                    "neither a location nor a dealer id field is offered, defaulting to dealer-id-based routing"
                );
            }
            SelectionBasis::InspectionFailed(reason) => {
                tracing::warn!(
                    %reason,
                    "could not inspect routing fields, defaulting to dealer-id-based routing"
                );
            }
        }
        selection
    }

    async fn offered_fields(&self, form_id: &FormId) -> Result<Vec<String>, SurfaceError> {
        self.surface.open_notifications(form_id).await?;
        self.surface
            .open_notification(form_id, NotificationKind::ORDER[0])
            .await?;
        self.surface.routing_field_options().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Editor, FakeSurface, Form, Op};
    use leadrouter_domain::routing::RoutingStrategy;

    async fn select(editor: Editor) -> (StrategySelection, FakeSurface) {
        let surface = FakeSurface::with_forms(vec![Form::new("1", editor)]);
        let selector = StrategySelector::new(surface.clone());
        (selector.select_strategy(&FormId::new("1")).await, surface)
    }

    #[tokio::test]
    async fn should_select_location_when_location_field_offered() {
        let (selection, _) = select(Editor::offering(&["Name", "Choose A Location"])).await;
        assert_eq!(selection.strategy, RoutingStrategy::LocationBased);
    }

    #[tokio::test]
    async fn should_select_location_when_both_fields_offered() {
        let (selection, _) = select(Editor::offering(&["Dealer ID", "choose a location"])).await;
        assert_eq!(selection.strategy, RoutingStrategy::LocationBased);
        assert_eq!(
            selection.basis,
            SelectionBasis::LocationField("choose a location".to_string())
        );
    }

    #[tokio::test]
    async fn should_select_identifier_when_only_dealer_id_offered() {
        let (selection, _) = select(Editor::offering(&["Email", "Dealer ID"])).await;
        assert_eq!(selection.strategy, RoutingStrategy::IdentifierBased);
        assert!(!selection.is_fallback());
    }

    #[tokio::test]
    async fn should_fall_back_to_identifier_when_no_routing_field() {
        let (selection, _) = select(Editor::offering(&["Email"])).await;
        assert_eq!(selection.strategy, RoutingStrategy::IdentifierBased);
        assert_eq!(selection.basis, SelectionBasis::NoRoutingField);
    }

    #[tokio::test]
    async fn should_fall_back_to_identifier_when_form_cannot_be_inspected() {
        let surface = FakeSurface::with_forms(Vec::new());
        let selector = StrategySelector::new(surface);
        let selection = selector.select_strategy(&FormId::new("404")).await;

        assert_eq!(selection.strategy, RoutingStrategy::IdentifierBased);
        assert!(matches!(
            selection.basis,
            SelectionBasis::InspectionFailed(_)
        ));
    }

    #[tokio::test]
    async fn should_inspect_first_notification_without_writing() {
        let (_, surface) = select(Editor::offering(&["Dealer ID"]).with_blank_slots(2)).await;
        assert_eq!(
            surface.log(),
            vec![
                Op::OpenNotifications("1".to_string()),
                Op::OpenNotification("1".to_string(), NotificationKind::AdfXml),
                Op::ListFields,
            ]
        );
    }
}
