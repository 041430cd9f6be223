use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::services::GameService;
use crate::state::app_state::AppState;
use crate::ws::hub::{snapshot_version, LeaderboardBroadcast, ObserverRegistry, SnapshotGate};
use crate::ws::protocol::{ClientMsg, ErrorCode, ServerMsg, PROTOCOL_VERSION};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

/// Snapshots queued per observer before new ones are dropped.
pub const OBSERVER_MAILBOX_CAPACITY: usize = 16;

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = WsSession::new(
        Uuid::new_v4(),
        app_state.games().clone(),
        app_state.broker().registry(),
    );
    ws::start(session, &req, stream)
}

/// One leaderboard observer. Registered on connect, so it receives updates
/// even before `hello`; `get_leaderboard` needs the handshake first.
pub struct WsSession {
    conn_id: Uuid,
    games: Arc<GameService>,
    registry: Arc<ObserverRegistry>,
    last_heartbeat: Instant,
    hello_done: bool,
    snapshots: SnapshotGate,
}

impl WsSession {
    fn new(conn_id: Uuid, games: Arc<GameService>, registry: Arc<ObserverRegistry>) -> Self {
        Self {
            conn_id,
            games,
            registry,
            last_heartbeat: Instant::now(),
            hello_done: false,
            snapshots: SnapshotGate::default(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error_and_close(
        &self,
        ctx: &mut ws::WebsocketContext<Self>,
        code: ErrorCode,
        message: impl Into<String>,
    ) {
        Self::send_json(
            ctx,
            &ServerMsg::Error {
                code,
                message: message.into(),
            },
        );
        ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Policy)));
        ctx.stop();
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_client_msg(&mut self, cmd: ClientMsg, ctx: &mut ws::WebsocketContext<Self>) {
        match cmd {
            ClientMsg::Hello { protocol } => {
                if protocol != PROTOCOL_VERSION {
                    self.send_error_and_close(
                        ctx,
                        ErrorCode::BadProtocol,
                        "Unsupported protocol version",
                    );
                    return;
                }
                self.hello_done = true;
                Self::send_json(
                    ctx,
                    &ServerMsg::HelloAck {
                        protocol: PROTOCOL_VERSION,
                    },
                );
            }

            ClientMsg::GetLeaderboard => {
                if !self.hello_done {
                    self.send_error_and_close(ctx, ErrorCode::BadRequest, "Must send hello first");
                    return;
                }

                let games = self.games.clone();
                let conn_id = self.conn_id;
                ctx.spawn(
                    async move { games.leaderboard().await }
                        .into_actor(self)
                        .map(move |res, actor, ctx| match res {
                            Ok(entries) => {
                                actor.snapshots.admit(snapshot_version(&entries));
                                Self::send_json(ctx, &ServerMsg::Leaderboard { entries });
                            }
                            Err(err) => {
                                warn!(error = %err, conn_id = %conn_id, "[WS SESSION] leaderboard read failed");
                                // Transient; the socket stays usable.
                                Self::send_json(
                                    ctx,
                                    &ServerMsg::Error {
                                        code: ErrorCode::Unavailable,
                                        message: "Leaderboard temporarily unavailable".to_string(),
                                    },
                                );
                            }
                        }),
                );
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.set_mailbox_capacity(OBSERVER_MAILBOX_CAPACITY);
        self.registry
            .register(self.conn_id, ctx.address().recipient::<LeaderboardBroadcast>());
        self.start_heartbeat(ctx);
        info!(
            conn_id = %self.conn_id,
            observers = self.registry.connection_count(),
            "[WS SESSION] started"
        );
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.registry.unregister(self.conn_id);
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(cmd) => self.handle_client_msg(cmd, ctx),
                    Err(_) => {
                        self.send_error_and_close(ctx, ErrorCode::BadRequest, "Malformed message")
                    }
                }
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                self.send_error_and_close(ctx, ErrorCode::BadRequest, "Binary not supported");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<LeaderboardBroadcast> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: LeaderboardBroadcast, ctx: &mut Self::Context) -> Self::Result {
        if !self.snapshots.admit(msg.version) {
            debug!(conn_id = %self.conn_id, version = msg.version, "[WS SESSION] stale snapshot skipped");
            return;
        }
        Self::send_json(
            ctx,
            &ServerMsg::LeaderboardUpdate {
                entries: msg.entries.as_ref().clone(),
            },
        );
    }
}
