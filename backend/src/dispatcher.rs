//! Command dispatcher for live matches
//!
//! Turns one inbound [`ClientCommand`] into store reads and writes plus
//! registry deliveries. Every failure is reported to the triggering
//! connection only, and a rejected command never broadcasts.

use std::sync::Arc;

use chess_engine::{Color, Game, Move};
use shared::{ClientCommand, MatchId, ServerMessage};
use tracing::{debug, error, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::hub::{MatchSession, SessionHub};
use crate::registry::Connection;
use crate::store::{GameStore, Identity, IdentityResolver, MatchRecord, MatchStore};

pub struct Dispatcher {
    identities: Arc<dyn IdentityResolver>,
    matches: Arc<dyn MatchStore>,
    games: Arc<dyn GameStore>,
    hub: Arc<SessionHub>,
}

impl Dispatcher {
    pub fn new(
        identities: Arc<dyn IdentityResolver>,
        matches: Arc<dyn MatchStore>,
        games: Arc<dyn GameStore>,
    ) -> Self {
        Dispatcher {
            identities,
            matches,
            games,
            hub: Arc::new(SessionHub::new()),
        }
    }

    pub fn hub(&self) -> &SessionHub {
        &self.hub
    }

    /// Parse and run one inbound text frame
    pub async fn handle_text(&self, conn: &Connection, text: &str) {
        debug!("{} inbound frame: {}", conn.id(), text);
        match serde_json::from_str::<ClientCommand>(text) {
            Ok(command) => self.handle(conn, command).await,
            Err(err) => {
                let err = SessionError::Malformed(err.to_string());
                self.reject(conn, "UNKNOWN", None, err)
            }
        }
    }

    pub async fn handle(&self, conn: &Connection, command: ClientCommand) {
        let kind = command.kind();
        let match_id = command.match_id();
        if let Err(err) = self.run(conn, command).await {
            self.reject(conn, kind, Some(match_id), err);
        }
    }

    async fn run(&self, conn: &Connection, command: ClientCommand) -> SessionResult<()> {
        let user = self.authenticate(command.auth_token()).await?;
        match command {
            ClientCommand::Connect { match_id, .. } => self.connect(conn, &user, match_id).await,
            ClientCommand::MakeMove { match_id, mv, .. } => {
                self.make_move(&user, match_id, mv).await
            }
            ClientCommand::Leave { match_id, .. } => self.leave(&user, match_id).await,
            ClientCommand::Resign { match_id, .. } => self.resign(&user, match_id).await,
        }
    }

    /// Transport closed; drop the connection from every registry
    pub fn disconnect(&self, conn: &Connection) {
        let removed = self.hub.disconnect(conn.id());
        debug!("{} closed, removed from {} session(s)", conn.id(), removed);
    }

    /// Administrative reset of all live sessions
    pub fn reset(&self) {
        info!("Resetting all live sessions");
        self.hub.clear();
    }

    async fn connect(&self, conn: &Connection, user: &str, match_id: MatchId) -> SessionResult<()> {
        let session = self.open_session(match_id).await?;
        let _turn = session.lock().await;

        let record = self.load_match(match_id).await?;
        let game = self.games.load_game(match_id).await?;
        let role = record.role_of(user);
        let joined = ServerMessage::notification(format!("{} joined as {}", user, role));

        {
            let mut registry = session.registry();
            if registry.add_participant(user, conn.clone()).is_some() {
                debug!("{} replaced an earlier connection of {}", conn.id(), user);
            }
            registry.send_to(user, &ServerMessage::LoadGame { game })?;
            registry.broadcast_except(user, &joined)?;
            debug!(
                "Match {} participants: {:?}",
                match_id,
                registry.participants().collect::<Vec<_>>()
            );
        }

        info!("{} joined match {} as {}", user, match_id, role);
        Ok(())
    }

    async fn make_move(&self, user: &str, match_id: MatchId, mv: Move) -> SessionResult<()> {
        let session = self.open_session(match_id).await?;
        let _turn = session.lock().await;

        let record = self.load_match(match_id).await?;
        let seat = record
            .seat_of(user)
            .ok_or(SessionError::ObserverAction { action: "move" })?;

        let mut game = self.games.load_game(match_id).await?;
        if game.is_terminal() {
            return Err(SessionError::game_over());
        }
        if game.side_to_move() != seat {
            return Err(SessionError::not_your_turn());
        }
        game.make_move(mv).map_err(|err| {
            debug!("{} rejected by engine: {}", mv, err);
            SessionError::invalid_move()
        })?;
        self.games.save_game(match_id, &game).await?;

        let opponent = game.side_to_move();
        let status = status_notification(&game, opponent);
        let moved = format!("{} moved {} to {}", user, mv.start, mv.end);

        {
            let mut registry = session.registry();
            registry.broadcast_all(&ServerMessage::LoadGame { game })?;
            registry.broadcast_except(user, &ServerMessage::notification(moved))?;
            if let Some(status) = &status {
                registry.broadcast_all(status)?;
            }
        }

        info!("{} played {} in match {}", user, mv, match_id);
        Ok(())
    }

    async fn leave(&self, user: &str, match_id: MatchId) -> SessionResult<()> {
        let session = self.open_session(match_id).await?;
        let _turn = session.lock().await;

        let mut record = self.load_match(match_id).await?;
        if let Some(seat) = record.seat_of(user) {
            record.clear_seat(seat);
            self.matches.update(&record).await?;
        }

        {
            let mut registry = session.registry();
            registry.remove_participant(user);
            let left = ServerMessage::notification(format!("{} left the game", user));
            registry.broadcast_except(user, &left)?;
        }

        info!("{} left match {}", user, match_id);
        Ok(())
    }

    async fn resign(&self, user: &str, match_id: MatchId) -> SessionResult<()> {
        let session = self.open_session(match_id).await?;
        let _turn = session.lock().await;

        let record = self.load_match(match_id).await?;
        if record.seat_of(user).is_none() {
            return Err(SessionError::ObserverAction { action: "resign" });
        }

        let mut game = self.games.load_game(match_id).await?;
        if game.is_terminal() {
            return Err(SessionError::game_over());
        }
        game.mark_terminal();
        self.games.save_game(match_id, &game).await?;

        session
            .registry()
            .broadcast_all(&ServerMessage::notification(format!("{} resigned", user)))?;

        info!("{} resigned match {}", user, match_id);
        Ok(())
    }

    async fn authenticate(&self, token: &str) -> SessionResult<Identity> {
        if token.is_empty() {
            return Err(SessionError::Unauthorized);
        }
        self.identities
            .resolve(token)
            .await?
            .ok_or(SessionError::Unauthorized)
    }

    /// Session for an existing match. Unknown ids never create one.
    async fn open_session(&self, match_id: MatchId) -> SessionResult<Arc<MatchSession>> {
        self.load_match(match_id).await?;
        Ok(self.hub.session(match_id))
    }

    async fn load_match(&self, match_id: MatchId) -> SessionResult<MatchRecord> {
        self.matches
            .get(match_id)
            .await?
            .ok_or(SessionError::NotFound { match_id })
    }

    fn reject(&self, conn: &Connection, kind: &str, match_id: Option<MatchId>, err: SessionError) {
        let target = match_id.map_or_else(String::new, |id| format!(" for match {}", id));
        match &err {
            SessionError::Internal(detail) => {
                error!("{} {}{} failed: {}", conn.id(), kind, target, detail)
            }
            other => warn!("{} {}{} rejected: {}", conn.id(), kind, target, other),
        }
        if !conn.send_text(error_frame(&err)) {
            debug!("{} gone before its error could be delivered", conn.id());
        }
    }
}

/// Check, checkmate or stalemate notice for the side now to move
fn status_notification(game: &Game, color: Color) -> Option<ServerMessage> {
    let text = if game.is_in_checkmate(color) {
        format!("Checkmate against {}", color)
    } else if game.is_in_check(color) {
        format!("Check against {}", color)
    } else if game.is_in_stalemate(color) {
        format!("Stalemate for {}", color)
    } else {
        return None;
    };
    Some(ServerMessage::notification(text))
}

fn error_frame(err: &SessionError) -> String {
    let message = ServerMessage::error(err.client_message());
    serde_json::to_string(&message)
        .unwrap_or_else(|_| r#"{"type":"ERROR","message":"Error: internal failure"}"#.to_string())
}
