//! Turn processing for OrderEngine
//!
//! This module contains the main processing logic including:
//! - handle_message() - one inbound message to one outcome, never failing
//! - the per-state handlers of the conversation state machine
//! - order creation, confirmation, cancellation and tracking

use std::time::Instant;

use order_engine_core::text::contains_phrase;
use order_engine_core::{
    CatalogIndex, ConversationEntry, ConversationSession, ConversationState, DraftOrder, Intent,
    MessageDirection, OutboundMessage, PendingLocation, TurnNotice, TurnOutcome,
};

use super::OrderEngine;
use crate::routing::{AddressInput, Command};
use crate::{templates, Result};

/// Store write staged during a turn, applied once the session is committed
#[derive(Debug)]
pub(crate) enum StagedWrite {
    SaveOrder(DraftOrder),
    PutScratch(PendingLocation),
    ClearScratch,
}

/// Mutable state of the turn being processed
pub(crate) struct Turn {
    pub(crate) session: ConversationSession,
    messages: Vec<OutboundMessage>,
    notices: Vec<TurnNotice>,
    /// Terminal state reached this turn; the session itself is already back at `New`
    reported: Option<ConversationState>,
    writes: Vec<StagedWrite>,
}

impl Turn {
    fn new(session: ConversationSession) -> Self {
        Self {
            session,
            messages: Vec::new(),
            notices: Vec::new(),
            reported: None,
            writes: Vec::new(),
        }
    }

    pub(crate) fn save_order(&mut self, order: &DraftOrder) {
        self.writes.push(StagedWrite::SaveOrder(order.clone()));
    }

    pub(crate) fn put_scratch(&mut self, pending: PendingLocation) {
        self.writes.push(StagedWrite::PutScratch(pending));
    }

    pub(crate) fn clear_scratch(&mut self) {
        self.writes.push(StagedWrite::ClearScratch);
    }

    pub(crate) fn customer_id(&self) -> &str {
        &self.session.customer_id
    }

    pub(crate) fn say(&mut self, body: impl Into<String>) {
        self.messages.push(OutboundMessage::text(body));
    }

    pub(crate) fn show(&mut self, message: OutboundMessage) {
        self.messages.push(message);
    }

    pub(crate) fn notice(&mut self, notice: TurnNotice) {
        self.notices.push(notice);
    }

    /// Report `to` for this turn and reset the session for the next order
    pub(crate) fn finish(&mut self, to: ConversationState) -> Result<()> {
        self.session.transition(to)?;
        self.reported = Some(to);
        self.session.reset();
        Ok(())
    }

    fn into_outcome(self, previous_state: ConversationState) -> TurnOutcome {
        TurnOutcome {
            state: self.reported.unwrap_or(self.session.state),
            customer_id: self.session.customer_id,
            previous_state,
            messages: self.messages,
            notices: self.notices,
        }
    }
}

impl OrderEngine {
    /// Process one inbound message.
    ///
    /// Never fails: storage and state errors are logged and answered with an
    /// apology, leaving the persisted state as it was.
    pub async fn handle_message(&self, customer_id: &str, text: &str) -> TurnOutcome {
        let started = Instant::now();
        let lock = self.customer_lock(customer_id);
        let _guard = lock.lock().await;

        self.record(customer_id, MessageDirection::User, text).await;

        let stored = match self.store.sessions.get(customer_id).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!(customer = %customer_id, error = %e, "Failed to load session");
                return self
                    .unavailable(customer_id, ConversationState::New, started)
                    .await;
            },
        };
        let session = stored
            .clone()
            .unwrap_or_else(|| ConversationSession::new(customer_id));
        let previous = session.state;
        let mut turn = Turn::new(session);

        let processed = match self.process_turn(&mut turn, text).await {
            Ok(()) => self.commit(&mut turn, stored.as_ref()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = processed {
            tracing::error!(
                customer = %customer_id,
                state = %previous,
                error = %e,
                "Turn failed, state left unchanged"
            );
            return self.unavailable(customer_id, previous, started).await;
        }

        let outcome = turn.into_outcome(previous);
        self.complete(&outcome, started).await;
        outcome
    }

    /// Persist the session, then the writes staged behind it.
    ///
    /// The session write is the commit point: if it fails nothing else has been
    /// written. If a staged write fails afterwards the session is put back to
    /// `stored` so it never points at a draft that was not saved.
    async fn commit(&self, turn: &mut Turn, stored: Option<&ConversationSession>) -> Result<()> {
        self.store.sessions.put(&turn.session).await?;

        let writes = std::mem::take(&mut turn.writes);
        if let Err(e) = self.apply_writes(turn.customer_id(), writes).await {
            let restored = match stored {
                Some(session) => self.store.sessions.put(session).await,
                None => self.store.sessions.delete(turn.customer_id()).await,
            };
            if let Err(restore_err) = restored {
                tracing::error!(
                    customer = %turn.customer_id(),
                    error = %restore_err,
                    "Failed to restore session after a partial turn"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    async fn apply_writes(&self, customer_id: &str, writes: Vec<StagedWrite>) -> Result<()> {
        for write in writes {
            match write {
                StagedWrite::SaveOrder(order) => self.store.orders.save(&order).await?,
                StagedWrite::PutScratch(pending) => {
                    self.store.scratch.put(customer_id, pending).await?
                },
                StagedWrite::ClearScratch => self.store.scratch.clear(customer_id).await?,
            }
        }
        Ok(())
    }

    async fn process_turn(&self, turn: &mut Turn, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            turn.say(templates::menu(&self.catalog()));
            turn.notice(TurnNotice::RecoverableExtractionFailure);
            return Ok(());
        }
        let lower = text.to_lowercase();
        let draft = self.load_draft(turn).await?;

        // cancel wins in every state
        if contains_phrase(&lower, "cancel") {
            return self.cancel_order(turn, draft).await;
        }

        if let Some(query) = self.router.parse_nearby(text) {
            return self.nearby_command(turn, draft, query).await;
        }

        match (turn.session.state, draft) {
            (ConversationState::AwaitingLocation, Some(draft)) => {
                self.on_awaiting_location(turn, draft, text).await
            },
            (ConversationState::AwaitingRestaurantChoice, Some(draft)) => {
                self.on_awaiting_choice(turn, draft, text).await
            },
            (ConversationState::AwaitingConfirmation, Some(draft)) => {
                self.on_awaiting_confirmation(turn, draft, text, &lower).await
            },
            _ => self.on_new(turn, text, &lower).await,
        }
    }

    /// The session's live draft. A session pointing at nothing live, or at
    /// another customer's order, starts over.
    async fn load_draft(&self, turn: &mut Turn) -> Result<Option<DraftOrder>> {
        let draft = match turn.session.active_order_id {
            Some(order_id) => self
                .store
                .orders
                .get(order_id)
                .await?
                .filter(|o| o.is_draft() && o.customer_id == turn.customer_id()),
            None => None,
        };

        let stale = turn.session.state != ConversationState::New
            || turn.session.active_order_id.is_some();
        if draft.is_none() && stale {
            tracing::warn!(
                customer = %turn.customer_id(),
                state = %turn.session.state,
                order_id = ?turn.session.active_order_id,
                "Session has no live draft, starting over"
            );
            turn.session.reset();
        }
        Ok(draft)
    }

    async fn on_new(&self, turn: &mut Turn, text: &str, lower: &str) -> Result<()> {
        if contains_phrase(lower, "confirm") {
            Self::no_pending_order(turn);
            return Ok(());
        }
        if self.router.is_address(text) {
            turn.say(templates::place_order_first());
            return Ok(());
        }
        if self.router.is_track_request(lower) {
            return self.track_order(turn, lower).await;
        }

        let catalog = self.catalog();
        let classification = self.classifier.detect(text).await;
        tracing::debug!(
            customer = %turn.customer_id(),
            intent = %classification.intent,
            confidence = classification.confidence,
            source = ?classification.source,
            "Classified message"
        );

        match classification.intent {
            Intent::GetMenu => turn.say(templates::menu(&catalog)),
            Intent::TrackOrder => return self.track_order(turn, lower).await,
            Intent::BranchInfo => turn.say(templates::branches(
                self.resolver.directory().active_branches(),
            )),
            Intent::Help => turn.say(templates::help()),
            Intent::NearbyRestaurants => turn.say(templates::nearby_prompt()),
            Intent::Greeting if !self.router.has_order_signal(text, &catalog) => {
                turn.show(templates::welcome())
            },
            Intent::Greeting | Intent::PlaceOrder => {
                return self.start_order(turn, text, &catalog).await
            },
        }
        Ok(())
    }

    /// Extract, validate and open a draft when at least one line resolves
    async fn start_order(
        &self,
        turn: &mut Turn,
        text: &str,
        catalog: &CatalogIndex,
    ) -> Result<()> {
        let lines = self.extractor.extract(text, catalog);
        let report = self.matcher.validate(&lines, catalog);

        if report.resolved.is_empty() {
            tracing::info!(
                customer = %turn.customer_id(),
                extracted = lines.len(),
                unresolved = ?report.unresolved,
                "Nothing in the message matched the catalog"
            );
            turn.say(templates::menu(catalog));
            turn.notice(TurnNotice::RecoverableExtractionFailure);
            return Ok(());
        }

        let order_id = self.store.orders.next_order_id().await?;
        let order = DraftOrder::new(order_id, turn.customer_id(), report.resolved);
        turn.session.transition(ConversationState::AwaitingLocation)?;
        turn.session.active_order_id = Some(order_id);
        turn.save_order(&order);

        metrics::counter!("order_engine_orders_total", "status" => "draft").increment(1);
        tracing::info!(
            customer = %turn.customer_id(),
            order_id,
            lines = order.lines.len(),
            total = order.total_amount(),
            "Draft order created"
        );

        turn.say(templates::draft_created(&order));
        if !report.unresolved.is_empty() {
            turn.say(templates::unresolved_items(&report.unresolved));
            turn.notice(TurnNotice::UnresolvedItems {
                labels: report.unresolved,
            });
        }
        turn.say(templates::location_request());
        Ok(())
    }

    async fn on_awaiting_location(
        &self,
        turn: &mut Turn,
        draft: DraftOrder,
        text: &str,
    ) -> Result<()> {
        if let Some(command) = Command::parse(text) {
            if !self.answer_command(turn, command) {
                turn.say(templates::location_request());
            }
            return Ok(());
        }

        match self.router.parse_address(text) {
            AddressInput::NeedsAddress => {
                turn.say(templates::share_address_prompt());
                Ok(())
            },
            AddressInput::Address {
                address,
                instructions,
            } => {
                let radius = self.config.nearby.radius_km;
                self.apply_location(turn, draft, &address, instructions, radius)
                    .await
            },
        }
    }

    async fn on_awaiting_confirmation(
        &self,
        turn: &mut Turn,
        mut draft: DraftOrder,
        text: &str,
        lower: &str,
    ) -> Result<()> {
        if contains_phrase(lower, "confirm") {
            draft.confirm();
            turn.save_order(&draft);
            turn.finish(ConversationState::Confirmed)?;

            metrics::counter!("order_engine_orders_total", "status" => "confirmed").increment(1);
            tracing::info!(
                customer = %turn.customer_id(),
                order_id = draft.id,
                total = draft.total_amount(),
                outlet = draft.outlet.as_ref().map(|o| o.name()).unwrap_or("none"),
                "Order confirmed"
            );
            turn.say(templates::order_confirmed(&draft));
            return Ok(());
        }

        if let Some(command) = Command::parse(text) {
            if self.answer_command(turn, command) {
                return Ok(());
            }
        }
        turn.say(templates::confirmation_reprompt());
        Ok(())
    }

    async fn cancel_order(&self, turn: &mut Turn, draft: Option<DraftOrder>) -> Result<()> {
        let Some(mut draft) = draft else {
            Self::no_pending_order(turn);
            return Ok(());
        };

        draft.cancel();
        turn.save_order(&draft);
        turn.clear_scratch();
        turn.finish(ConversationState::Cancelled)?;

        metrics::counter!("order_engine_orders_total", "status" => "cancelled").increment(1);
        tracing::info!(customer = %turn.customer_id(), order_id = draft.id, "Order cancelled");
        turn.say(templates::order_cancelled());
        Ok(())
    }

    async fn track_order(&self, turn: &mut Turn, lower: &str) -> Result<()> {
        let Some(order_id) = self.router.order_reference(lower) else {
            turn.say(templates::track_prompt());
            return Ok(());
        };

        // other customers' orders read as missing
        let order = self
            .store
            .orders
            .get(order_id)
            .await?
            .filter(|o| o.customer_id == turn.customer_id());
        match order {
            Some(order) => turn.say(templates::order_status(&order)),
            None => turn.say(templates::order_not_found(order_id)),
        }
        Ok(())
    }

    /// Commands answered the same way mid-flow. Returns false for the rest.
    pub(crate) fn answer_command(&self, turn: &mut Turn, command: Command) -> bool {
        match command {
            Command::Menu => turn.say(templates::menu(&self.catalog())),
            Command::Help => turn.say(templates::help()),
            Command::Track => turn.say(templates::track_prompt()),
            _ => return false,
        }
        true
    }

    fn no_pending_order(turn: &mut Turn) {
        turn.say(templates::no_pending_order());
        turn.notice(TurnNotice::NoPendingOrder);
    }

    async fn record(&self, customer_id: &str, direction: MessageDirection, text: &str) {
        let entry = ConversationEntry::new(customer_id, direction, text);
        if let Err(e) = self.store.log.append(entry).await {
            tracing::warn!(customer = %customer_id, error = %e, "Failed to log message");
        }
    }

    /// Apology outcome for a turn that could not be processed
    async fn unavailable(
        &self,
        customer_id: &str,
        state: ConversationState,
        started: Instant,
    ) -> TurnOutcome {
        metrics::counter!("order_engine_storage_failures_total").increment(1);
        let outcome = TurnOutcome {
            customer_id: customer_id.to_string(),
            previous_state: state,
            state,
            messages: vec![OutboundMessage::text(templates::storage_unavailable())],
            notices: vec![TurnNotice::StorageUnavailable],
        };
        self.complete(&outcome, started).await;
        outcome
    }

    /// Log replies and record turn metrics
    async fn complete(&self, outcome: &TurnOutcome, started: Instant) {
        for message in &outcome.messages {
            self.record(&outcome.customer_id, MessageDirection::Bot, &message.render())
                .await;
        }

        let elapsed = started.elapsed();
        metrics::counter!("order_engine_messages_total", "state" => outcome.state.as_str())
            .increment(1);
        if outcome.state != outcome.previous_state {
            metrics::counter!(
                "order_engine_state_transitions_total",
                "from" => outcome.previous_state.as_str(),
                "to" => outcome.state.as_str()
            )
            .increment(1);
        }
        metrics::histogram!("order_engine_turn_duration_seconds").record(elapsed.as_secs_f64());

        tracing::info!(
            customer = %outcome.customer_id,
            from = %outcome.previous_state,
            to = %outcome.state,
            replies = outcome.messages.len(),
            notices = outcome.notices.len(),
            latency_ms = elapsed.as_millis() as u64,
            "Turn handled"
        );
    }
}
