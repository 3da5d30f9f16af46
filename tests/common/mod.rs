use cadence::api;
use cadence::application_impl::*;
use cadence::application_port::*;
use cadence::domain_model::UserId;
use cadence::domain_port::SessionStore;
use cadence::infra_memory::MemorySessionStore;
use cadence::server::Server;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;
use warp::http::Response;
use warp::hyper::body::Bytes;

pub const USER_ID: u64 = 9_007_199_254_740_993; // 2^53 + 1

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        access_secret: b"scenario-access".to_vec(),
        refresh_secret: b"scenario-refresh".to_vec(),
        access_ttl: Duration::from_secs(15 * 60),
        refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
    }
}

pub struct TestApp {
    pub server: Arc<Server>,
    pub store: Arc<MemorySessionStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemorySessionStore::new());
        let cfg = jwt_config();
        let verifier = Arc::new(StaticCredentialVerifier::new([StaticAccount {
            user_id: UserId(USER_ID),
            username: "username".to_string(),
            password: "password".to_string(),
        }]));
        let session_store: Arc<dyn SessionStore> = store.clone();
        let auth: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            verifier,
            Arc::new(JwtHs256Codec::new(&cfg)),
            session_store,
            &cfg,
        ));
        TestApp {
            server: Arc::new(Server::new(auth)),
            store,
        }
    }

    pub async fn post(&self, path: &str, bearer: Option<&str>, body: Option<Value>) -> Response<Bytes> {
        let routes = api::v1::routes(self.server.clone()).recover(api::v1::recover_error);
        let mut req = warp::test::request().method("POST").path(path);
        if let Some(token) = bearer {
            req = req.header("authorization", format!("Bearer {}", token));
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        req.reply(&routes).await
    }

    /// Logs in as the configured account and returns (access, refresh).
    pub async fn login(&self) -> (String, String) {
        let res = self
            .post("/login", None, Some(json!({"username": "username", "password": "password"})))
            .await;
        assert_eq!(res.status(), 200);
        let body = json_body(&res);
        (
            body["data"]["access_token"].as_str().unwrap().to_string(),
            body["data"]["refresh_token"].as_str().unwrap().to_string(),
        )
    }
}

pub fn json_body(res: &Response<Bytes>) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}
