#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use checkout_client::{CheckoutClient, ClientConfig};
use serde_json::{Value, json};
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

pub const USER: &str = "u1";

/// Requests seen by the fake backend, in arrival order.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct BackendState {
    pub orders: HashMap<String, Value>,
    pub requests: Vec<Recorded>,
    pub next_order_no: Option<String>,
    pub created: usize,
    /// Answer successful submit/cancel calls with an empty 204.
    pub bodyless_actions: bool,
}

type Shared = Arc<Mutex<BackendState>>;

/// Order backend on an ephemeral port, shaped like the real API.
pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState::default()));
        let (addr, server) = warp::serve(routes(state.clone())).bind_ephemeral(([127, 0, 0, 1], 0));
        let handle = tokio::spawn(server);
        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> CheckoutClient {
        CheckoutClient::new(ClientConfig::builder().base_url(self.url()).build().unwrap())
    }

    pub fn insert_order(&self, order: Value) {
        let order_no = order["order_no"].as_str().unwrap().to_string();
        self.state.lock().unwrap().orders.insert(order_no, order);
    }

    pub fn set_status(&self, order_no: &str, status: &str) {
        let mut state = self.state.lock().unwrap();
        state.orders.get_mut(order_no).unwrap()["status"] = json!(status);
    }

    pub fn reply_without_body(&self) {
        self.state.lock().unwrap().bodyless_actions = true;
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn order(&self, order_no: &str) -> Value {
        self.state.lock().unwrap().orders[order_no].clone()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub fn order_json(order_no: &str, status: Option<&str>, expire_seconds: u64) -> Value {
    let mut order = json!({
        "order_no": order_no,
        "product_type": "membership",
        "product_id": "personal",
        "product_name": "个人版会员",
        "base_amount": 39.0,
        "pay_amount": 39.0,
        "price_code": "00",
        "pay_method": "wechat",
        "expire_at": "2026-10-17T12:15:00",
        "expire_seconds": expire_seconds,
        "transaction_id": null,
        "reject_reason": null
    });
    if let Some(status) = status {
        order["status"] = json!(status);
    }
    order
}

fn detail(status: StatusCode, message: &str) -> Response {
    warp::reply::with_status(warp::reply::json(&json!({ "detail": message })), status)
        .into_response()
}

fn ok(body: Value) -> Response {
    warp::reply::json(&body).into_response()
}

fn record(
    state: &Shared,
    method: &'static str,
    path: String,
    query: HashMap<String, String>,
    body: Option<Value>,
) {
    state.lock().unwrap().requests.push(Recorded {
        method,
        path,
        query,
        body,
    });
}

fn routes(state: Shared) -> impl Filter<Extract = (Response,), Error = warp::Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let create = warp::path!("api" / "v1" / "orders")
        .and(warp::post())
        .and(warp::body::json())
        .and(with_state.clone())
        .map(|body: Value, state: Shared| {
            record(&state, "POST", "/api/v1/orders".into(), HashMap::new(), Some(body.clone()));
            let (name, price) = match (body["product_type"].as_str(), body["product_id"].as_str()) {
                (Some("membership"), Some("personal")) => ("个人版会员", 39.0),
                (Some("credits"), Some("pack_10")) => ("10次生成", 9.9),
                (Some("membership" | "credits"), _) => {
                    return detail(StatusCode::BAD_REQUEST, "无效的商品");
                }
                _ => return detail(StatusCode::BAD_REQUEST, "无效的商品类型"),
            };

            let mut guard = state.lock().unwrap();
            guard.created += 1;
            let order_no = guard
                .next_order_no
                .clone()
                .unwrap_or_else(|| format!("O{}", guard.created));
            let data = json!({
                "order_no": order_no,
                "product_name": name,
                "base_amount": price,
                "pay_amount": price,
                "price_code": "00",
                "pay_method": body["pay_method"],
                "qrcode_url": format!("/payment/{}.jpg", body["pay_method"].as_str().unwrap_or("wechat")),
                "expire_at": "2026-10-17T12:15:00",
                "expire_seconds": 900
            });
            let mut stored = data.clone();
            stored["status"] = json!("pending");
            stored["product_type"] = body["product_type"].clone();
            stored["product_id"] = body["product_id"].clone();
            guard.orders.insert(order_no, stored);

            ok(json!({ "success": true, "existing": false, "data": data }))
        });

    let list = warp::path!("api" / "v1" / "orders")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state.clone())
        .map(|query: HashMap<String, String>, state: Shared| {
            record(&state, "GET", "/api/v1/orders".into(), query.clone(), None);
            let guard = state.lock().unwrap();
            let mut rows: Vec<Value> = guard
                .orders
                .values()
                .filter(|o| match query.get("status") {
                    Some(s) => o["status"].as_str() == Some(s.as_str()),
                    None => true,
                })
                .map(|o| {
                    json!({
                        "order_no": o["order_no"],
                        "product_name": o["product_name"],
                        "pay_amount": o["pay_amount"],
                        "status": o.get("status").cloned().unwrap_or(json!("pending")),
                        "created_at": "2026-10-17T12:00:00"
                    })
                })
                .collect();
            rows.sort_by(|a, b| a["order_no"].as_str().cmp(&b["order_no"].as_str()));
            ok(json!({ "success": true, "data": rows }))
        });

    let get = warp::path!("api" / "v1" / "orders" / String)
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state.clone())
        .map(|order_no: String, query: HashMap<String, String>, state: Shared| {
            record(&state, "GET", format!("/api/v1/orders/{order_no}"), query.clone(), None);
            if order_no == "BROKEN" {
                return warp::reply::with_status("bad gateway", StatusCode::BAD_GATEWAY)
                    .into_response();
            }
            let guard = state.lock().unwrap();
            match guard.orders.get(&order_no) {
                Some(order) if query.get("user_id").map(String::as_str) == Some(USER) => {
                    ok(json!({ "success": true, "data": order }))
                }
                _ => detail(StatusCode::NOT_FOUND, "订单不存在"),
            }
        });

    let submit = warp::path!("api" / "v1" / "orders" / String / "submit")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::body::json())
        .and(with_state.clone())
        .map(|order_no: String, query: HashMap<String, String>, body: Value, state: Shared| {
            record(
                &state,
                "POST",
                format!("/api/v1/orders/{order_no}/submit"),
                query.clone(),
                Some(body.clone()),
            );
            let mut guard = state.lock().unwrap();
            let bodyless = guard.bodyless_actions;
            let Some(order) = guard.orders.get_mut(&order_no) else {
                return detail(StatusCode::NOT_FOUND, "订单不存在");
            };
            match order.get("status").and_then(Value::as_str) {
                Some("submitted") => detail(StatusCode::BAD_REQUEST, "订单已提交，请等待审核"),
                Some("expired") => detail(StatusCode::BAD_REQUEST, "订单已过期，请重新下单"),
                _ => {
                    order["status"] = json!("submitted");
                    order["transaction_id"] = body["transaction_id"].clone();
                    order["reject_reason"] = Value::Null;
                    if bodyless {
                        return StatusCode::NO_CONTENT.into_response();
                    }
                    ok(json!({
                        "success": true,
                        "message": "订单已提交，我们将在1-24小时内确认",
                        "redirect_url": "/profile"
                    }))
                }
            }
        });

    let cancel = warp::path!("api" / "v1" / "orders" / String / "cancel")
        .and(warp::post())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state)
        .map(|order_no: String, query: HashMap<String, String>, state: Shared| {
            record(&state, "POST", format!("/api/v1/orders/{order_no}/cancel"), query, None);
            let mut guard = state.lock().unwrap();
            let bodyless = guard.bodyless_actions;
            match guard.orders.get_mut(&order_no) {
                Some(order) if order["status"] == "pending" => {
                    order["status"] = json!("cancelled");
                    if bodyless {
                        return StatusCode::NO_CONTENT.into_response();
                    }
                    ok(json!({ "success": true, "message": "订单已取消" }))
                }
                Some(_) => detail(StatusCode::BAD_REQUEST, "只能取消待支付的订单"),
                None => detail(StatusCode::NOT_FOUND, "订单不存在"),
            }
        });

    create
        .or(list)
        .unify()
        .or(get)
        .unify()
        .or(submit)
        .unify()
        .or(cancel)
        .unify()
}
