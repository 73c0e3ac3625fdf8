//! # Monitoring Socket
//!
//! The agent's monitoring endpoint exercised over real WebSocket
//! connections, plus the `/metrics` scrape route. The endpoint is up while
//! start-up still waits for the S-Chain.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{agent, agent_config};
    use futures::{SinkExt, StreamExt};
    use ima_01_schain_discovery::{EndpointBehavior, MockSChainRpc, RosterView};
    use ima_03_transfer_loop::{ScriptedTransfer, TransferDirection, TransferPort};
    use ima_agent::{AgentConfig, AgentRuntime, RunningAgent};
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

    struct Harness {
        _runtime: AgentRuntime,
        running: RunningAgent,
        transfer: Arc<ScriptedTransfer>,
        addr: SocketAddr,
    }

    async fn start_agent() -> Harness {
        ima_telemetry::register_metrics().unwrap();
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_node(3, EndpointBehavior::Unreachable);
        let transfer = Arc::new(ScriptedTransfer::new());
        transfer.fail(TransferDirection::MainToSChain);

        let config = AgentConfig {
            rediscovery_interval_ms: 0,
            loop_period_secs: 3_600,
            ..agent_config()
        };
        let runtime = agent(config, &rpc, Arc::clone(&transfer) as Arc<dyn TransferPort>)
            .with_monitoring_addr(SocketAddr::from(([127, 0, 0, 1], 0)));
        let running = runtime.start().await.unwrap();
        let addr = running.monitoring_addr().unwrap();
        Harness {
            _runtime: runtime,
            running,
            transfer,
            addr,
        }
    }

    async fn connect(addr: SocketAddr) -> Socket {
        let (socket, _) = connect_async(format!("ws://{}/", addr)).await.unwrap();
        socket
    }

    async fn next_answer(socket: &mut Socket) -> Value {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), socket.next())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            if let Message::Text(text) = message {
                return serde_json::from_str(text.as_str()).unwrap();
            }
        }
    }

    async fn ask(socket: &mut Socket, request: Value) -> Value {
        socket
            .send(Message::Text(request.to_string().into()))
            .await
            .unwrap();
        next_answer(socket).await
    }

    #[tokio::test]
    async fn test_snapshots_over_websocket() {
        let harness = start_agent().await;

        // the first cycle runs right away and fails M2S
        let errors = harness.transfer.error_log();
        tokio::time::timeout(Duration::from_secs(5), async {
            while errors.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let mut socket = connect(harness.addr).await;

        let pong = ask(&mut socket, json!({ "id": 1, "method": "ping" })).await;
        assert_eq!(pong, json!({ "id": 1, "method": "ping", "error": null }));

        let info = ask(&mut socket, json!({ "id": 2, "method": "get_schain_network_info" })).await;
        assert_eq!(info["error"], Value::Null);
        let network = info["schain_network_info"]["network"].as_array().unwrap();
        assert_eq!(network.len(), 4);
        assert_eq!(network[0]["imaInfo"]["t"], json!(2));
        assert!(network[3].get("imaInfo").is_none());

        let params = ask(&mut socket, json!({ "id": 3, "method": "get_runtime_params" })).await;
        assert_eq!(params["runtime_params"]["loop_period_secs"], json!(3_600));
        assert_eq!(params["runtime_params"]["rediscovery_interval_ms"], json!(0));

        let failures = ask(&mut socket, json!({ "id": "e", "method": "get_last_transfer_errors" })).await;
        assert_eq!(failures["id"], json!("e"));
        let entries = failures["last_transfer_errors"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0]["message"].as_str().unwrap().contains("M2S"));
        assert!(entries[0]["timestamp"].as_i64().unwrap() > 0);

        socket.close(None).await.unwrap();
        harness.running.shutdown().await;
    }

    #[tokio::test]
    async fn test_bad_messages_do_not_break_connections() {
        let harness = start_agent().await;
        let mut first = connect(harness.addr).await;
        let mut second = connect(harness.addr).await;

        first
            .send(Message::Text("{ definitely not json".into()))
            .await
            .unwrap();
        let garbled = next_answer(&mut first).await;
        assert_eq!(garbled["method"], Value::Null);
        assert_eq!(garbled["id"], Value::Null);
        assert!(garbled["error"].as_str().unwrap().starts_with("malformed request"));

        let unknown = ask(&mut first, json!({ "id": 5, "method": "shutdown" })).await;
        assert_eq!(unknown["method"], json!("shutdown"));
        assert!(unknown["error"].as_str().unwrap().contains("shutdown"));
        assert_eq!(unknown.as_object().unwrap().len(), 3);

        first
            .send(Message::Binary(vec![0xff, 0xfe, 0xfd].into()))
            .await
            .unwrap();
        let binary = next_answer(&mut first).await;
        assert!(binary["error"].as_str().unwrap().contains("UTF-8"));

        // same connection still answers
        let echo = ask(&mut first, json!({ "id": 6, "method": "echo" })).await;
        assert_eq!(echo["error"], Value::Null);

        // a peer vanishing mid-stream leaves the others untouched
        drop(first);
        let pong = ask(&mut second, json!({ "id": 7, "method": "ping" })).await;
        assert_eq!(pong["id"], json!(7));

        second.close(None).await.unwrap();
        harness.running.shutdown().await;
    }

    fn free_local_addr() -> SocketAddr {
        let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        probe.local_addr().unwrap()
    }

    async fn connect_when_listening(addr: SocketAddr) -> Socket {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Ok((socket, _)) = connect_async(format!("ws://{}/", addr)).await {
                    return socket;
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .unwrap()
    }

    fn waiting_for_schain(max_attempts: Option<u32>) -> (AgentRuntime, SocketAddr) {
        ima_telemetry::register_metrics().unwrap();
        let rpc = MockSChainRpc::with_healthy_nodes(4);
        rpc.set_seed(EndpointBehavior::Unreachable);
        let config = AgentConfig {
            no_wait_schain_started: false,
            max_wait_schain_attempts: max_attempts,
            ..agent_config()
        };
        let addr = free_local_addr();
        let runtime = agent(config, &rpc, Arc::new(ScriptedTransfer::new()))
            .with_startup_backoff(Duration::from_millis(50))
            .with_monitoring_addr(addr);
        (runtime, addr)
    }

    #[tokio::test]
    async fn test_endpoint_answers_while_waiting_for_schain() {
        let (runtime, addr) = waiting_for_schain(None);

        let client = async {
            let mut socket = connect_when_listening(addr).await;
            let info = ask(&mut socket, json!({ "id": 1, "method": "get_schain_network_info" })).await;
            let params = ask(&mut socket, json!({ "id": 2, "method": "get_runtime_params" })).await;
            socket.close(None).await.unwrap();
            (info, params)
        };

        let (info, params) = tokio::select! {
            started = runtime.start() => panic!("start-up finished without an S-Chain: {:?}", started.err()),
            answers = client => answers,
        };
        assert_eq!(info["error"], Value::Null);
        assert_eq!(info["schain_network_info"], Value::Null);
        assert_eq!(params["error"], Value::Null);
        assert!(runtime.store().snapshot().is_none());
    }

    #[tokio::test]
    async fn test_failed_start_closes_endpoint() {
        let (runtime, addr) = waiting_for_schain(Some(2));

        assert!(runtime.start().await.is_err());
        assert!(connect_async(format!("ws://{}/", addr)).await.is_err());
    }

    #[tokio::test]
    async fn test_metrics_route_exposes_registry() {
        let harness = start_agent().await;
        let mut socket = connect(harness.addr).await;
        ask(&mut socket, json!({ "id": 1, "method": "ping" })).await;

        let response = reqwest::get(format!("http://{}/metrics", harness.addr))
            .await
            .unwrap();
        assert!(response.status().is_success());
        let body = response.text().await.unwrap();
        assert!(body.contains("ima_monitoring_requests_total"));
        assert!(body.contains("method=\"ping\""));

        socket.close(None).await.unwrap();
        harness.running.shutdown().await;
    }
}
