use std::process::{Command, Stdio};
use std::io::{Write, BufRead, BufReader};
use std::sync::mpsc::{channel, Sender, Receiver};
use std::thread;
use std::time::Duration;
use serde_json::{json, Value};

/// Drives the shoprec binary over stdio JSON-RPC.
struct McpClient {
    child: std::process::Child,
    tx: Sender<Value>,
    rx: Receiver<Value>,
    next_id: std::cell::Cell<u64>,
}

impl McpClient {
    fn spawn() -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_shoprec"))
            .env("SHOPREC_SIMULATOR__ENABLED", "false")
            .env_remove("SHOPREC_CATALOG_PATH")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())  // Suppress log output in tests
            .spawn()
            .expect("Failed to spawn shoprec binary");

        let mut stdin = child.stdin.take().expect("Failed to get stdin");
        let stdout = child.stdout.take().expect("Failed to get stdout");

        let (req_tx, req_rx) = channel::<Value>();
        let (resp_tx, resp_rx) = channel::<Value>();

        thread::spawn(move || {
            while let Ok(request) = req_rx.recv() {
                let request_str = serde_json::to_string(&request).expect("Failed to serialize");
                if writeln!(stdin, "{}", request_str).is_err() {
                    break;
                }
                if stdin.flush().is_err() {
                    break;
                }
            }
        });

        thread::spawn(move || {
            let mut reader = BufReader::new(stdout);
            loop {
                let mut line = String::new();
                match reader.read_line(&mut line) {
                    Ok(0) => break,
                    Ok(_) => {
                        if let Ok(value) = serde_json::from_str::<Value>(&line) {
                            if resp_tx.send(value).is_err() {
                                break;
                            }
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        McpClient {
            child,
            tx: req_tx,
            rx: resp_rx,
            next_id: std::cell::Cell::new(1),
        }
    }

    fn send_request(&self, request: Value) -> Option<Value> {
        self.tx.send(request).ok()?;
        self.rx.recv_timeout(Duration::from_secs(2)).ok()
    }

    fn send_notification(&self, notification: Value) {
        let _ = self.tx.send(notification);
        thread::sleep(Duration::from_millis(50));
    }

    fn request(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let response = self
            .send_request(json!({
                "jsonrpc": "2.0",
                "method": method,
                "id": id,
                "params": params
            }))
            .unwrap_or_else(|| panic!("No response to {}", method));
        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], id);
        response
    }

    /// Spawn and complete the initialize handshake.
    fn ready() -> Self {
        let client = Self::spawn();
        client.request("initialize", json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "1.0"}
        }));
        client.send_notification(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }));
        client
    }

    /// Call a tool and return its `result` object.
    fn call_tool(&self, name: &str, arguments: Value) -> Value {
        let response = self.request("tools/call", json!({
            "name": name,
            "arguments": arguments
        }));
        assert!(response["result"].is_object(), "tools/call {} failed: {}", name, response);
        response["result"].clone()
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn is_ok(result: &Value) -> bool {
    result["isError"].is_null() || result["isError"] == false
}

#[test]
fn test_initialize_handshake() {
    let client = McpClient::spawn();

    let response = client.request("initialize", json!({
        "protocolVersion": "2024-11-05",
        "capabilities": {},
        "clientInfo": {"name": "test-client", "version": "1.0.0"}
    }));

    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["capabilities"]["resources"].is_object());
    assert_eq!(result["serverInfo"]["name"], "shoprec");
    assert!(result["serverInfo"]["version"].is_string());
    assert!(result["serverInfo"]["description"].is_string());
}

#[test]
fn test_tool_discovery() {
    let client = McpClient::ready();

    let response = client.request("tools/list", json!({}));
    let tools = response["result"]["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 7, "Should have exactly 7 tools");

    let tool_names: Vec<&str> = tools.iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    for expected in [
        "get_recommendations",
        "record_interaction",
        "get_categories",
        "get_user_preferences",
        "update_profile",
        "get_analytics",
        "health_check",
    ] {
        assert!(tool_names.contains(&expected), "missing tool {}", expected);
    }

    for tool in tools {
        assert!(tool["description"].is_string());
        assert!(tool["inputSchema"].is_object());
    }
}

#[test]
fn test_get_categories() {
    let client = McpClient::ready();
    let result = client.call_tool("get_categories", json!({}));
    assert!(is_ok(&result));

    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let content = &result["structuredContent"];
    assert_eq!(content["count"], 8);
    assert_eq!(content["categories"][0], "Electronics");
    assert_eq!(content["categories"][7], "Automotive");
}

#[test]
fn test_popular_recommendations_sorted_by_rating() {
    let client = McpClient::ready();
    let result = client.call_tool("get_recommendations", json!({
        "user_id": "shopper-1",
        "algorithm": "popular",
        "limit": 5
    }));
    assert!(is_ok(&result));

    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let content = &result["structuredContent"];
    assert_eq!(content["algorithm"], "popular");
    assert_eq!(content["fallback"], false);
    let recs = content["recommendations"].as_array().expect("recommendations array");
    assert_eq!(recs.len(), 5);
    assert_eq!(recs[0]["title"], "Atomic Habits by James Clear");
    let ratings: Vec<f64> = recs.iter().map(|r| r["rating"].as_f64().unwrap()).collect();
    assert!(ratings.windows(2).all(|w| w[0] >= w[1]));
    for rec in recs {
        assert_eq!(rec["inStock"], true);
        assert!(rec["reason"].is_string());
        assert!(rec["id"].as_str().unwrap().contains('-'), "id should be UUID-like");
    }
}

#[test]
fn test_unknown_algorithm_falls_back_to_hybrid() {
    let client = McpClient::ready();
    let result = client.call_tool("get_recommendations", json!({
        "user_id": "shopper-2",
        "algorithm": "neural"
    }));
    assert!(is_ok(&result), "fallback is not an error: {}", result);

    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let content = &result["structuredContent"];
    assert_eq!(content["algorithm"], "hybrid");
    assert_eq!(content["fallback"], true);
    assert_eq!(content["requested_algorithm"], "neural");
    assert!(content["count"].as_u64().unwrap() <= 12);
}

#[test]
fn test_record_interaction_updates_preferences() {
    let client = McpClient::ready();

    for _ in 0..2 {
        let result = client.call_tool("record_interaction", json!({
            "user_id": "reader",
            "product": "Atomic Habits by James Clear",
            "action": "view"
        }));
        assert!(is_ok(&result));
    }
    let result = client.call_tool("record_interaction", json!({
        "user_id": "reader",
        "product": {
            "title": "Imported Gadget",
            "category": "Electronics",
            "price": 1000,
            "inStock": true
        },
        "action": "add_to_cart"
    }));
    assert!(is_ok(&result), "unknown actions are accepted: {}", result);

    let result = client.call_tool("get_user_preferences", json!({"user_id": "reader"}));
    assert!(is_ok(&result));
    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let content = &result["structuredContent"];
    assert_eq!(content["category_preferences"]["Books"], 2);
    assert_eq!(content["category_preferences"]["Electronics"], 1);
    assert_eq!(content["interaction_count"], 3);
    let tally_total: u64 = content["category_preferences"]
        .as_object()
        .expect("tally object")
        .values()
        .map(|v| v.as_u64().unwrap())
        .sum();
    assert_eq!(tally_total, 3);

    let result = client.call_tool("get_recommendations", json!({
        "user_id": "reader",
        "algorithm": "content",
        "limit": 20
    }));
    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let recs = result["structuredContent"]["recommendations"].as_array().unwrap();
    let titles: Vec<&str> = recs.iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert!(!titles.contains(&"Atomic Habits by James Clear"));
    assert!(titles.contains(&"The Psychology of Money by Morgan Housel"));

    let result = client.call_tool("get_analytics", json!({}));
    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let content = &result["structuredContent"];
    assert_eq!(content["total_views"], 3);
    assert_eq!(content["total_clicks"], 0);
    assert_eq!(content["active_users"], 1);
    assert_eq!(content["total_products"], 16);
    assert_eq!(content["top_categories"][0]["category"], "Books");
}

#[test]
fn test_record_interaction_unknown_title_is_error() {
    let client = McpClient::ready();
    let result = client.call_tool("record_interaction", json!({
        "user_id": "u",
        "product": "No Such Product",
        "action": "view"
    }));
    assert_eq!(result["isError"], true);
}

#[test]
fn test_empty_user_id_is_validation_error() {
    let client = McpClient::ready();
    let result = client.call_tool("get_recommendations", json!({
        "user_id": "   ",
        "algorithm": "trending"
    }));
    assert_eq!(result["isError"], true, "Should have isError: true");

    let content_arr = result["content"].as_array().expect("content should be array");
    let error_text = content_arr[0]["text"].as_str().expect("should have error text");
    assert!(error_text.contains("user_id"), "Error should mention 'user_id': {}", error_text);
}

#[test]
fn test_zero_limit_is_validation_error() {
    let client = McpClient::ready();
    let result = client.call_tool("get_recommendations", json!({
        "user_id": "u",
        "algorithm": "popular",
        "limit": 0
    }));
    assert_eq!(result["isError"], true, "limit 0 must be rejected: {}", result);
    let error_text = result["content"][0]["text"].as_str().expect("should have error text");
    assert!(error_text.contains("limit"), "Error should mention 'limit': {}", error_text);
}

#[test]
fn test_oversized_limit_is_capped() {
    let client = McpClient::ready();
    let result = client.call_tool("get_recommendations", json!({
        "user_id": "u",
        "algorithm": "popular",
        "limit": 5000
    }));
    assert!(is_ok(&result), "large limits are capped, not rejected: {}", result);
    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    // All 16 built-in products are in stock.
    assert_eq!(result["structuredContent"]["count"], 16);
}

#[test]
fn test_update_profile_requires_a_field() {
    let client = McpClient::ready();
    let result = client.call_tool("update_profile", json!({"user_id": "u"}));
    assert_eq!(result["isError"], true);

    let result = client.call_tool("update_profile", json!({
        "user_id": "u",
        "preferences": {"favorite": "Books"},
        "feedback": "Love the deals"
    }));
    assert!(is_ok(&result));

    let result = client.call_tool("get_user_preferences", json!({"user_id": "u"}));
    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let content = &result["structuredContent"];
    assert_eq!(content["profile"]["preferences"]["favorite"], "Books");
    assert_eq!(content["feedback"][0]["feedback"], "Love the deals");
    assert_eq!(content["interaction_count"], 0);
}

#[test]
fn test_catalog_resource() {
    let client = McpClient::ready();
    let response = client.request("resources/read", json!({"uri": "catalog://products"}));
    let contents = response["result"]["contents"].as_array().expect("contents array");
    let text = contents[0]["text"].as_str().expect("text resource");
    assert_eq!(text.lines().count(), 16);
    assert!(text.contains("Philips Air Fryer"));
}

#[test]
fn test_health_check() {
    let client = McpClient::ready();
    let result = client.call_tool("health_check", json!({}));
    assert!(is_ok(&result));

    assert!(result["structuredContent"].is_object(), "missing structuredContent: {}", result);
    let health = &result["structuredContent"];
    assert_eq!(health["status"], "ok");
    assert!(health["version"].is_string());
    assert!(health["uptime_seconds"].is_number());
    assert_eq!(health["products"], 16);
}
