use axum::routing::{get, post, put};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};

use crate::error::{GatewayError, GatewayResult};
use crate::inventory::{ApplicationInventory, DiscoveryCommand};
use crate::pipeline::Pipeline;
use crate::session::ConnectionManager;

pub mod applications;
pub mod error;
pub mod system;
pub mod ws;

pub struct Server {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    connections: ConnectionManager,
}

/// Everything the routes share.
pub struct ServerState {
    pub(crate) pipeline: Pipeline,
    pub(crate) connections: ConnectionManager,
    pub(crate) discovery: DiscoveryCommand,
}

impl ServerState {
    pub fn new(pipeline: Pipeline, discovery: DiscoveryCommand) -> Self {
        Self {
            pipeline,
            connections: ConnectionManager::new(),
            discovery,
        }
    }

    pub fn inventory(&self) -> &ApplicationInventory {
        self.pipeline.resolver().inventory()
    }
}

impl Server {
    /// Bind `addr` (port 0 picks a free port) and serve in the background until
    /// [`Server::shutdown`] is called or the server is dropped.
    pub async fn start(addr: SocketAddr, state: ServerState) -> GatewayResult<Self> {
        let connections = state.connections.clone();
        let state = Arc::new(state);
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        let app = Router::new()
            .route("/", get(ws::upgrade))
            .route("/ws", get(ws::upgrade))
            .route("/health", get(system::health))
            .route("/vocabulary", get(system::vocabulary))
            .route("/connections", get(system::connections))
            .route("/resolve", post(system::resolve))
            .route(
                "/applications",
                get(applications::list_applications).post(applications::add_application),
            )
            .route("/applications/:index", put(applications::update_application))
            .route(
                "/applications/refresh",
                post(applications::refresh_applications),
            )
            .with_state(state)
            .layer(cors);

        let listener = TcpListener::bind(addr).await.map_err(|error| {
            GatewayError::Io(format!("failed to bind {addr}: {error}"))
        })?;
        let addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(error) = axum::serve(listener, service)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                tracing::error!("server stopped with error: {error}");
            }
        });
        tracing::info!("listening on ws://{addr}/ws");

        Ok(Server {
            addr,
            shutdown: Some(shutdown_tx),
            task: Some(task),
            connections,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.connections
    }

    pub fn shutdown(&mut self) -> GatewayResult<()> {
        if let Some(sender) = self.shutdown.take() {
            sender
                .send(())
                .map_err(|_| GatewayError::Internal("failed to send server shutdown signal".to_string()))
        } else {
            Ok(())
        }
    }

    /// Signal shutdown and wait for the listener to stop accepting.
    pub async fn stop(mut self) -> GatewayResult<()> {
        self.shutdown()?;
        if let Some(task) = self.task.take() {
            task.await
                .map_err(|error| GatewayError::Internal(format!("server task failed: {error}")))?;
        }
        Ok(())
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Dispatcher;
    use crate::inventory::ApplicationEntry;
    use crate::llm::{GenerationParams, GenerativeAid, SharedGenerativeAid};
    use crate::platform::Platform;
    use crate::resolver::{Resolver, DEFAULT_AID_TIMEOUT};
    use crate::session::handler::INTERNAL_ERROR_REPLY;
    use crate::speech::UnavailableSpeech;
    use async_trait::async_trait;
    use futures_util::{SinkExt, StreamExt};
    use std::path::Path;
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message as WsMessage;

    struct QuietPlatform;

    impl Platform for QuietPlatform {
        fn lock_screen(&self) -> GatewayResult<()> {
            Ok(())
        }

        fn toggle_media(&self) -> GatewayResult<()> {
            Ok(())
        }

        fn launch(&self, _path: &Path) -> GatewayResult<()> {
            Ok(())
        }
    }

    /// Panics on any transcript containing "boom", otherwise says nothing useful.
    struct VolatileAid;

    #[async_trait]
    impl GenerativeAid for VolatileAid {
        fn id(&self) -> &str {
            "volatile"
        }

        async fn generate(&self, prompt: &str, _params: &GenerationParams) -> GatewayResult<String> {
            if prompt.contains("boom") {
                panic!("model exploded");
            }
            Ok("no idea".to_string())
        }
    }

    /// Sleeps far past any test budget on transcripts containing "slow", and answers
    /// "lock screen" otherwise.
    struct SlowAid;

    #[async_trait]
    impl GenerativeAid for SlowAid {
        fn id(&self) -> &str {
            "slow"
        }

        async fn generate(&self, prompt: &str, _params: &GenerationParams) -> GatewayResult<String> {
            if prompt.contains("slow") {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok("lock screen".to_string())
        }
    }

    fn state(discovery: DiscoveryCommand) -> ServerState {
        state_with(Arc::new(VolatileAid), DEFAULT_AID_TIMEOUT, discovery)
    }

    fn state_with(
        aid: SharedGenerativeAid,
        timeout: Duration,
        discovery: DiscoveryCommand,
    ) -> ServerState {
        let inventory = ApplicationInventory::new(vec![ApplicationEntry::new(
            "Visual Studio Code",
            "C:\\VSCode.exe",
        )]);
        let resolver = Resolver::new(inventory)
            .with_aid(aid)
            .with_timeout(timeout)
            .with_prompt(crate::prompt::PromptTemplate::new("{user_input}"));
        let pipeline = Pipeline::new(
            Arc::new(resolver),
            Dispatcher::new(Arc::new(QuietPlatform)),
            Arc::new(UnavailableSpeech),
        );
        ServerState::new(pipeline, discovery)
    }

    async fn start() -> Server {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        Server::start(addr, state(DiscoveryCommand::default()))
            .await
            .expect("start")
    }

    type Client = tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >;

    async fn exchange(socket: &mut Client, text: &str) -> String {
        socket
            .send(WsMessage::Text(text.to_string()))
            .await
            .expect("send");
        match socket.next().await.expect("reply").expect("message") {
            WsMessage::Text(reply) => reply,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_binds_random_port() {
        let mut server = start().await;
        assert_ne!(server.addr().port(), 0);
        server.shutdown().expect("shutdown");
        server.shutdown().expect("second shutdown is a no-op");
    }

    #[tokio::test]
    async fn text_messages_get_one_reply_each_in_order() {
        let server = start().await;
        let url = format!("ws://{}/ws", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.expect("connect");

        assert_eq!(
            exchange(&mut socket, "open visual studio code").await,
            "Opened visual studio code"
        );
        assert_eq!(
            exchange(&mut socket, "open slack").await,
            "ERROR: Application Path not Listed"
        );
        assert_eq!(
            exchange(&mut socket, "asdkjasdkj").await,
            "ERROR: NotFound - 'asdkjasdkj' is not a recognized command"
        );

        for text in ["lock screen", "play media", "pause media"] {
            socket
                .send(WsMessage::Text(text.to_string()))
                .await
                .expect("send");
        }
        let mut replies = Vec::new();
        for _ in 0..3 {
            match socket.next().await.expect("reply").expect("message") {
                WsMessage::Text(reply) => replies.push(reply),
                other => panic!("unexpected reply: {other:?}"),
            }
        }
        assert_eq!(
            replies,
            vec!["Screen locked", "Playing active media", "Pausing active media"]
        );
    }

    #[tokio::test]
    async fn root_path_accepts_connections() {
        let server = start().await;
        let url = format!("ws://{}", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.expect("connect");
        assert_eq!(exchange(&mut socket, "lock screen").await, "Screen locked");
    }

    #[tokio::test]
    async fn audio_without_engine_is_answered() {
        let server = start().await;
        let url = format!("ws://{}/ws", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.expect("connect");
        socket
            .send(WsMessage::Binary(vec![0u8; 640]))
            .await
            .expect("send");
        match socket.next().await.expect("reply").expect("message") {
            WsMessage::Text(reply) => {
                assert!(reply.contains("ERROR: Speech processing failed"), "{reply}")
            }
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn panic_closes_only_the_faulting_connection() {
        let server = start().await;
        let url = format!("ws://{}/ws", server.addr());
        let (mut healthy, _) = tokio_tungstenite::connect_async(url.clone())
            .await
            .expect("connect");
        let (mut faulty, _) = tokio_tungstenite::connect_async(url).await.expect("connect");

        assert_eq!(exchange(&mut healthy, "lock screen").await, "Screen locked");

        faulty
            .send(WsMessage::Text("boom".to_string()))
            .await
            .expect("send");
        match faulty.next().await {
            Some(Ok(WsMessage::Text(reply))) => assert_eq!(reply, INTERNAL_ERROR_REPLY),
            other => panic!("expected error reply, got {other:?}"),
        }
        match faulty.next().await {
            Some(Ok(WsMessage::Close(Some(frame)))) => assert_eq!(frame.reason, "internal error"),
            other => panic!("expected close frame, got {other:?}"),
        }

        assert_eq!(exchange(&mut healthy, "pause media").await, "Pausing active media");
    }

    async fn next_text(socket: &mut Client) -> String {
        match socket.next().await.expect("reply").expect("message") {
            WsMessage::Text(reply) => reply,
            other => panic!("unexpected reply: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_resolution_does_not_block_other_connections() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        let state = state_with(
            Arc::new(SlowAid),
            Duration::from_secs(30),
            DiscoveryCommand::default(),
        );
        let server = Server::start(addr, state).await.expect("start");
        let url = format!("ws://{}/ws", server.addr());
        let (mut stalled, _) = tokio_tungstenite::connect_async(url.clone())
            .await
            .expect("connect");
        let (mut other, _) = tokio_tungstenite::connect_async(url).await.expect("connect");

        stalled
            .send(WsMessage::Text("something slow".to_string()))
            .await
            .expect("send");

        let reply = tokio::time::timeout(
            Duration::from_secs(2),
            exchange(&mut other, "lock screen"),
        )
        .await
        .expect("other connection answered while the first was pending");
        assert_eq!(reply, "Screen locked");

        let pending = tokio::time::timeout(Duration::from_millis(100), stalled.next()).await;
        assert!(pending.is_err(), "stalled connection should still be waiting");
    }

    #[tokio::test]
    async fn timed_out_aid_still_answers() {
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        let state = state_with(
            Arc::new(SlowAid),
            Duration::from_millis(200),
            DiscoveryCommand::default(),
        );
        let server = Server::start(addr, state).await.expect("start");
        let url = format!("ws://{}/ws", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.expect("connect");

        socket
            .send(WsMessage::Text("something slow".to_string()))
            .await
            .expect("send");
        let reply = tokio::time::timeout(Duration::from_secs(5), next_text(&mut socket))
            .await
            .expect("reply after the aid timeout");
        assert_eq!(
            reply,
            "ERROR: NotFound - 'something slow' is not a recognized command"
        );

        assert_eq!(
            exchange(&mut socket, "anything quick").await,
            "Screen locked"
        );
    }

    #[tokio::test]
    async fn connections_are_tracked_and_released() {
        let server = start().await;
        let url = format!("ws://{}/ws", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.expect("connect");
        exchange(&mut socket, "lock screen").await;
        assert_eq!(server.connections().active_count().expect("count"), 1);

        let body: serde_json::Value = reqwest::get(format!("http://{}/connections", server.addr()))
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(body["count"], 1);
        assert_eq!(body["connections"][0]["messages"], 1);

        socket.close(None).await.expect("close");
        for _ in 0..50 {
            if server.connections().active_count().expect("count") == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(server.connections().active_count().expect("count"), 0);
    }

    #[tokio::test]
    async fn health_and_vocabulary_endpoints() {
        let server = start().await;
        let base = format!("http://{}", server.addr());
        let health = reqwest::get(format!("{base}/health"))
            .await
            .expect("request")
            .text()
            .await
            .expect("text");
        assert_eq!(health, "ok");

        let body: serde_json::Value = reqwest::get(format!("{base}/vocabulary"))
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(
            body["patterns"],
            "open <application_name>|lock screen|play media|pause media"
        );
        assert_eq!(body["entries"][1]["intent"], "lock_screen");
    }

    #[tokio::test]
    async fn resolve_endpoint_previews_without_dispatch() {
        let server = start().await;
        let client = reqwest::Client::new();
        let body: serde_json::Value = client
            .post(format!("http://{}/resolve", server.addr()))
            .json(&serde_json::json!({ "transcript": "open visual studio code" }))
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(body["command"], "open visual studio code");
        assert_eq!(body["path"], "C:\\VSCode.exe");
        assert_eq!(body["intent"], "open");
        assert_eq!(body["executable"], true);
    }

    #[tokio::test]
    async fn applications_can_be_listed_added_and_edited() {
        let server = start().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}/applications", server.addr());

        let response = client
            .post(&base)
            .json(&serde_json::json!({ "name": "Slack", "path": "C:\\Slack.exe" }))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        let created: serde_json::Value = response.json().await.expect("json");
        assert_eq!(created["index"], 1);

        let response = client
            .put(format!("{base}/1"))
            .json(&serde_json::json!({ "path": "D:\\Slack.exe" }))
            .send()
            .await
            .expect("request");
        assert!(response.status().is_success());

        let listing: serde_json::Value = client
            .get(&base)
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(listing["count"], 2);
        assert_eq!(listing["applications"][1]["path"], "D:\\Slack.exe");

        let url = format!("ws://{}/ws", server.addr());
        let (mut socket, _) = tokio_tungstenite::connect_async(url).await.expect("connect");
        assert_eq!(exchange(&mut socket, "open slack").await, "Opened slack");
    }

    #[tokio::test]
    async fn application_errors_use_error_body() {
        let server = start().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}/applications", server.addr());

        let response = client
            .put(format!("{base}/9"))
            .json(&serde_json::json!({ "name": "Ghost" }))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.expect("json");
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"]["code"], "not_found");

        let response = client
            .post(&base)
            .json(&serde_json::json!({ "name": "Blank", "path": "  " }))
            .send()
            .await
            .expect("request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn refresh_replaces_inventory_from_discovery() {
        let discovery = DiscoveryCommand {
            program: "printf".to_string(),
            args: vec!["DisplayName : Spotify\nExecutable  : \"/opt/spotify\"\n".to_string()],
            script: None,
        };
        let addr: SocketAddr = "127.0.0.1:0".parse().expect("addr");
        let server = Server::start(addr, state(discovery)).await.expect("start");
        let body: serde_json::Value = reqwest::Client::new()
            .post(format!("http://{}/applications/refresh", server.addr()))
            .send()
            .await
            .expect("request")
            .json()
            .await
            .expect("json");
        assert_eq!(body["count"], 1);
        assert_eq!(body["applications"][0]["name"], "Spotify");
        assert_eq!(body["applications"][0]["path"], "/opt/spotify");
    }

    #[tokio::test]
    async fn stop_waits_for_listener() {
        let server = start().await;
        let addr = server.addr();
        server.stop().await.expect("stop");
        assert!(tokio::net::TcpStream::connect(addr).await.is_err());
    }
}
