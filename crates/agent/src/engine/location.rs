//! Location steps for OrderEngine
//!
//! Address resolution, the outlet list, numeric selection and the `nearby:`
//! command.

use order_engine_core::{
    AssignedOutlet, ConversationState, DraftOrder, NearbyOption, OutletKind, PendingLocation,
    TurnNotice,
};
use order_engine_location::{round_km, ResolvedLocation};

use super::processing::Turn;
use super::OrderEngine;
use crate::routing::{AddressInput, Command, NearbyQuery};
use crate::{templates, Result};

impl OrderEngine {
    /// Geocode and rank outlets within `radius_km`, capped at the listable size
    async fn locate(
        &self,
        turn: &mut Turn,
        address: &str,
        radius_km: f64,
    ) -> (ResolvedLocation, Vec<NearbyOption>) {
        let resolved = self.resolver.geocode(address).await;
        if resolved.is_fallback() {
            turn.notice(TurnNotice::LocationFallback {
                label: resolved.label.clone(),
            });
        }

        let mut options = self
            .resolver
            .rank_nearby(resolved.location, radius_km, self.config.nearby.limit);
        options.truncate(self.config.nearby.max_listed);

        tracing::debug!(
            customer = %turn.customer_id(),
            label = %resolved.label,
            source = resolved.source.as_str(),
            options = options.len(),
            radius_km,
            "Located address"
        );
        (resolved, options)
    }

    /// Attach an address to the draft, then list outlets or route to the nearest branch
    pub(crate) async fn apply_location(
        &self,
        turn: &mut Turn,
        mut draft: DraftOrder,
        address: &str,
        instructions: Option<String>,
        radius_km: f64,
    ) -> Result<()> {
        let (resolved, options) = self.locate(turn, address, radius_km).await;
        draft.set_location(address, resolved.location, instructions.clone());

        if options.is_empty() {
            let nearest = self
                .resolver
                .nearest_branch(resolved.location, self.config.nearby.nearest_branch_max_km)
                .or_else(|| self.resolver.nearest_branch(resolved.location, f64::INFINITY));
            match nearest {
                Some((branch, distance)) => draft.assign_outlet(AssignedOutlet::Branch {
                    branch_id: branch.id,
                    name: branch.name.clone(),
                    distance_km: round_km(distance),
                }),
                None => {
                    tracing::warn!(customer = %turn.customer_id(), "No active branch to route to")
                },
            }

            turn.session.transition(ConversationState::AwaitingConfirmation)?;
            turn.save_order(&draft);
            turn.clear_scratch();
            turn.say(templates::order_summary(&draft));
            return Ok(());
        }

        let pending = PendingLocation::new(
            resolved.location,
            resolved.label,
            instructions,
            options.clone(),
            self.config.scratch_ttl(),
        );
        turn.session.transition(ConversationState::AwaitingRestaurantChoice)?;
        turn.save_order(&draft);
        turn.put_scratch(pending);
        turn.show(templates::nearby_list(templates::nearby_header(), &options, true));
        Ok(())
    }

    pub(crate) async fn on_awaiting_choice(
        &self,
        turn: &mut Turn,
        draft: DraftOrder,
        text: &str,
    ) -> Result<()> {
        if let Some(number) = self.router.selection(text) {
            return self.select_outlet(turn, draft, number).await;
        }

        // a new address replaces the listed options
        if self.router.is_address(text) {
            if let AddressInput::Address {
                address,
                instructions,
            } = self.router.parse_address(text)
            {
                let radius = self.config.nearby.radius_km;
                return self
                    .apply_location(turn, draft, &address, instructions, radius)
                    .await;
            }
        }

        if let Some(command) = Command::parse(text) {
            if self.answer_command(turn, command) {
                return Ok(());
            }
        }

        match self.store.scratch.get(turn.customer_id()).await? {
            Some(pending) => turn.say(templates::choice_reprompt(pending.options.len())),
            None => self.options_expired(turn)?,
        }
        Ok(())
    }

    async fn select_outlet(
        &self,
        turn: &mut Turn,
        mut draft: DraftOrder,
        number: usize,
    ) -> Result<()> {
        let Some(pending) = self.store.scratch.get(turn.customer_id()).await? else {
            return self.options_expired(turn);
        };

        let max = pending.options.len();
        if number == 0 || number > max {
            tracing::debug!(customer = %turn.customer_id(), number, max, "Selection out of range");
            turn.notice(TurnNotice::SelectionOutOfRange { max });
            turn.say(templates::invalid_choice(max));
            return Ok(());
        }
        let option = pending.options[number - 1].clone();

        match (option.kind, option.branch_id) {
            (OutletKind::OwnBranch, Some(branch_id)) => {
                if draft.location.is_none() {
                    draft.set_location(
                        pending.label.clone(),
                        pending.location,
                        pending.instructions.clone(),
                    );
                }
                draft.assign_outlet(AssignedOutlet::Branch {
                    branch_id,
                    name: option.name.clone(),
                    distance_km: option.distance_km,
                });

                turn.session.transition(ConversationState::AwaitingConfirmation)?;
                turn.save_order(&draft);
                turn.clear_scratch();

                tracing::info!(
                    customer = %turn.customer_id(),
                    order_id = draft.id,
                    branch_id,
                    distance_km = option.distance_km,
                    "Branch selected"
                );
                turn.say(templates::order_summary(&draft));
            },
            _ => {
                // we cannot fulfil it; the draft ends here
                draft.assign_outlet(AssignedOutlet::ThirdParty {
                    descriptor: option.clone(),
                });
                draft.cancel();

                turn.session.transition(ConversationState::New)?;
                turn.session.reset();
                turn.save_order(&draft);
                turn.clear_scratch();

                metrics::counter!("order_engine_orders_total", "status" => "cancelled").increment(1);
                tracing::info!(
                    customer = %turn.customer_id(),
                    order_id = draft.id,
                    outlet = %option.name,
                    "Third-party outlet selected, draft dropped"
                );
                turn.say(templates::third_party_selected(&option));
            },
        }
        Ok(())
    }

    /// The saved options are gone; ask for the location again
    fn options_expired(&self, turn: &mut Turn) -> Result<()> {
        tracing::info!(customer = %turn.customer_id(), "Location options expired");
        turn.session.transition(ConversationState::AwaitingLocation)?;
        turn.notice(TurnNotice::ScratchExpired);
        turn.say(templates::location_expired());
        Ok(())
    }

    /// `nearby: <place> [within N km]`
    ///
    /// Acts as the location step while a draft waits for one; otherwise it only
    /// lists outlets and the state stays put.
    pub(crate) async fn nearby_command(
        &self,
        turn: &mut Turn,
        draft: Option<DraftOrder>,
        query: NearbyQuery,
    ) -> Result<()> {
        if query.place.is_empty() {
            turn.say(templates::nearby_prompt());
            return Ok(());
        }
        let radius = query.radius_km.unwrap_or(self.config.nearby.command_radius_km);

        let locating = matches!(
            turn.session.state,
            ConversationState::AwaitingLocation | ConversationState::AwaitingRestaurantChoice
        );
        if let (true, Some(draft)) = (locating, draft) {
            return self
                .apply_location(turn, draft, &query.place, None, radius)
                .await;
        }

        let (_, options) = self.locate(turn, &query.place, radius).await;
        if options.is_empty() {
            turn.say(templates::no_restaurants_near(&query.place));
        } else {
            turn.show(templates::nearby_list(
                templates::nearby_header_for(&query.place),
                &options,
                false,
            ));
        }
        Ok(())
    }
}
