//! Game-loop side of the adapter.
//!
//! Turns inbound commands into moves and session actions on a
//! [`GameState`], and produces the replies and observations the server
//! delivers. Synchronous; the game loop owns it.

use crate::core::{GameSnapshot, GameState, TickEvent};
use crate::protocol::{create_ack, create_error, create_move_error, ErrorCode};
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
use crate::server::build_observation;
use crate::types::{GameAction, MoveError, QueuedMoves};

#[derive(Debug, Default)]
pub struct AdapterBridge {
    moves: QueuedMoves,
    /// Client and seq waiting for the outcome of the queued swap
    pending: Option<(usize, u64)>,
    obs_seq: u64,
    snapshot: GameSnapshot,
    was_round_over: bool,
}

impl AdapterBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move source to hand the session while a remote swap is pending
    pub fn source(&mut self) -> &mut QueuedMoves {
        &mut self.moves
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply one inbound command. Replies are appended to `out`.
    pub fn handle(
        &mut self,
        game: &mut GameState,
        cmd: InboundCommand,
        out: &mut Vec<OutboundMessage>,
    ) {
        let InboundCommand {
            client_id,
            seq,
            payload,
        } = cmd;

        match payload {
            InboundPayload::SnapshotRequest => {
                let obs = self.observe(game);
                out.push(OutboundMessage::ToClientObservation { client_id, obs });
            }

            InboundPayload::Command(ClientCommand::Swap { a, b }) => {
                let err = if game.paused() {
                    Some(create_error(seq, ErrorCode::NotIdle, "game is paused"))
                } else if game.round_over() {
                    Some(create_error(seq, ErrorCode::NotIdle, "round is over"))
                } else if self.pending.is_some() || !game.controller().is_idle() {
                    Some(create_move_error(
                        seq,
                        MoveError::NotIdle {
                            phase: game.phase(),
                        },
                    ))
                } else {
                    None
                };

                match err {
                    Some(err) => out.push(OutboundMessage::ToClientError { client_id, err }),
                    None => {
                        self.moves.push(a, b);
                        self.pending = Some((client_id, seq));
                    }
                }
            }

            InboundPayload::Command(ClientCommand::Action(action)) => {
                let mut replies = Vec::new();
                if self.local_action(game, action, &mut replies) {
                    out.push(OutboundMessage::ToClientAck {
                        client_id,
                        ack: create_ack(seq),
                    });
                    out.append(&mut replies);
                } else {
                    let err = create_error(
                        seq,
                        ErrorCode::InvalidCommand,
                        &format!("Unsupported action: {}", action.as_str()),
                    );
                    out.push(OutboundMessage::ToClientError { client_id, err });
                }
            }
        }
    }

    /// Apply a session action (from any front end) and broadcast the result.
    ///
    /// Returns false, with nothing sent, for actions the session ignores.
    pub fn local_action(
        &mut self,
        game: &mut GameState,
        action: GameAction,
        out: &mut Vec<OutboundMessage>,
    ) -> bool {
        if !game.apply_action(action) {
            return false;
        }
        if action == GameAction::Restart {
            self.abandon_pending("round restarted", out);
            self.was_round_over = false;
        }
        let obs = self.observe(game);
        out.push(OutboundMessage::BroadcastObservation { obs });
        true
    }

    /// Report what the last tick did: move outcomes and observations.
    pub fn after_tick(&mut self, game: &GameState, event: TickEvent, out: &mut Vec<OutboundMessage>) {
        if let Some(result) = self.moves.take_feedback() {
            if let Some((client_id, seq)) = self.pending.take() {
                match result {
                    Ok(()) => out.push(OutboundMessage::ToClientAck {
                        client_id,
                        ack: create_ack(seq),
                    }),
                    Err(e) => out.push(OutboundMessage::ToClientError {
                        client_id,
                        err: create_move_error(seq, e),
                    }),
                }
            }
        }

        let round_over = game.round_over();
        if round_over && game.controller().is_idle() {
            // The session stops asking for moves once time is up.
            self.abandon_pending("round is over", out);
        }

        let publish = matches!(event, TickEvent::Settled | TickEvent::Reshuffled)
            || round_over != self.was_round_over;
        self.was_round_over = round_over;
        if publish {
            let obs = self.observe(game);
            out.push(OutboundMessage::BroadcastObservation { obs });
        }
    }

    fn abandon_pending(&mut self, reason: &str, out: &mut Vec<OutboundMessage>) {
        self.moves.clear();
        let _ = self.moves.take_feedback();
        if let Some((client_id, seq)) = self.pending.take() {
            out.push(OutboundMessage::ToClientError {
                client_id,
                err: create_error(seq, ErrorCode::NotIdle, reason),
            });
        }
    }

    fn observe(&mut self, game: &GameState) -> Box<crate::protocol::ObservationMessage> {
        game.snapshot_into(&mut self.snapshot);
        self.obs_seq += 1;
        Box::new(build_observation(&self.snapshot, self.obs_seq))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GameConfig;
    use crate::protocol::{AckStatus, PhaseLower};
    use crate::types::Coord;

    fn game() -> GameState {
        GameState::new(GameConfig::default().with_seed(11)).unwrap()
    }

    fn swap(client_id: usize, seq: u64, a: Coord, b: Coord) -> InboundCommand {
        InboundCommand {
            client_id,
            seq,
            payload: InboundPayload::Command(ClientCommand::Swap { a, b }),
        }
    }

    fn action(client_id: usize, seq: u64, action: GameAction) -> InboundCommand {
        InboundCommand {
            client_id,
            seq,
            payload: InboundPayload::Command(ClientCommand::Action(action)),
        }
    }

    fn error_code(msg: &OutboundMessage) -> Option<ErrorCode> {
        match msg {
            OutboundMessage::ToClientError { err, .. } => Some(err.code),
            _ => None,
        }
    }

    /// Tick until the session is idle again, collecting bridge output.
    fn run_to_idle(bridge: &mut AdapterBridge, gs: &mut GameState, out: &mut Vec<OutboundMessage>) {
        for _ in 0..10_000 {
            let event = gs.tick(16, bridge.source());
            bridge.after_tick(gs, event, out);
            if gs.controller().is_idle() && !bridge.has_pending() {
                return;
            }
        }
        panic!("session never settled");
    }

    #[test]
    fn snapshot_request_answers_requester_only() {
        let mut gs = game();
        let mut bridge = AdapterBridge::new();
        let mut out = Vec::new();
        bridge.handle(
            &mut gs,
            InboundCommand {
                client_id: 3,
                seq: 1,
                payload: InboundPayload::SnapshotRequest,
            },
            &mut out,
        );
        assert_eq!(out.len(), 1);
        match &out[0] {
            OutboundMessage::ToClientObservation { client_id, obs } => {
                assert_eq!(*client_id, 3);
                assert_eq!(obs.phase, PhaseLower::Idle);
                assert_eq!(obs.score, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn legal_swap_is_acked_then_observed() {
        let mut gs = game();
        let (a, b) = gs.board().clone().legal_moves()[0];
        let mut bridge = AdapterBridge::new();
        let mut out = Vec::new();

        bridge.handle(&mut gs, swap(1, 5, a, b), &mut out);
        assert!(out.is_empty());
        assert!(bridge.has_pending());

        run_to_idle(&mut bridge, &mut gs, &mut out);
        match &out[0] {
            OutboundMessage::ToClientAck { client_id, ack } => {
                assert_eq!(*client_id, 1);
                assert_eq!(ack.seq, 5);
                assert_eq!(ack.status, AckStatus::Ok);
            }
            other => panic!("unexpected {:?}", other),
        }
        let obs = out
            .iter()
            .rev()
            .find_map(|m| match m {
                OutboundMessage::BroadcastObservation { obs } => Some(obs),
                _ => None,
            })
            .expect("settled cascade is broadcast");
        assert!(obs.score > 0);
        assert_eq!(obs.score, gs.score());
        assert_eq!(obs.moves, 1);
        assert!(obs.last_cascade.is_some());
    }

    #[test]
    fn refused_swaps_map_to_error_codes() {
        let mut gs = game();
        let mut bridge = AdapterBridge::new();
        let mut out = Vec::new();

        bridge.handle(&mut gs, swap(1, 1, Coord::new(0, 0), Coord::new(4, 4)), &mut out);
        run_to_idle(&mut bridge, &mut gs, &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::InvalidMove));

        let mut scratch = gs.board().clone();
        let (a, b) = (0..8u8)
            .flat_map(|r| (0..7u8).map(move |c| (Coord::new(r, c), Coord::new(r, c + 1))))
            .find(|&(a, b)| !scratch.is_legal_swap(a, b))
            .expect("some adjacent swap makes no run");
        out.clear();
        bridge.handle(&mut gs, swap(1, 2, a, b), &mut out);
        run_to_idle(&mut bridge, &mut gs, &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::NoMatch));
        assert_eq!(gs.moves(), 0);
    }

    #[test]
    fn second_swap_while_busy_is_not_idle() {
        let mut gs = game();
        let (a, b) = gs.board().clone().legal_moves()[0];
        let mut bridge = AdapterBridge::new();
        let mut out = Vec::new();

        bridge.handle(&mut gs, swap(1, 1, a, b), &mut out);
        bridge.handle(&mut gs, swap(1, 2, a, b), &mut out);
        assert_eq!(out.len(), 1);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::NotIdle));
    }

    #[test]
    fn pause_and_restart_actions() {
        let mut gs = game();
        let mut bridge = AdapterBridge::new();
        let mut out = Vec::new();

        bridge.handle(&mut gs, action(1, 1, GameAction::Pause), &mut out);
        assert!(gs.paused());
        assert!(matches!(out[0], OutboundMessage::ToClientAck { .. }));
        assert!(matches!(
            &out[1],
            OutboundMessage::BroadcastObservation { obs } if obs.paused && !obs.playable
        ));

        out.clear();
        let (a, b) = gs.board().clone().legal_moves()[0];
        bridge.handle(&mut gs, swap(1, 2, a, b), &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::NotIdle));

        out.clear();
        bridge.handle(&mut gs, action(1, 3, GameAction::Restart), &mut out);
        assert_eq!(gs.episode_id(), 1);
        assert!(matches!(
            &out[1],
            OutboundMessage::BroadcastObservation { obs } if obs.episode_id == 1
        ));

        out.clear();
        bridge.handle(&mut gs, action(1, 4, GameAction::Select), &mut out);
        assert_eq!(error_code(&out[0]), Some(ErrorCode::InvalidCommand));
    }

    #[test]
    fn round_end_is_broadcast_once() {
        let mut config = GameConfig::default().with_seed(11);
        config.round_ms = 100;
        let mut gs = GameState::new(config).unwrap();
        let mut bridge = AdapterBridge::new();
        let mut out = Vec::new();

        for _ in 0..20 {
            let event = gs.tick(16, bridge.source());
            bridge.after_tick(&gs, event, &mut out);
        }
        assert!(gs.round_over());
        let broadcasts: Vec<_> = out
            .iter()
            .filter_map(|m| match m {
                OutboundMessage::BroadcastObservation { obs } => Some(obs),
                _ => None,
            })
            .collect();
        assert_eq!(broadcasts.len(), 1);
        assert!(broadcasts[0].round_over);
        assert_eq!(broadcasts[0].remaining_ms, Some(0));
    }
}
