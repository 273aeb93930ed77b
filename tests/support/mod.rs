//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use sea_orm::{ConnectionTrait, Statement};
use serde_json::Value;
use tower::ServiceExt;

use turbine_sync::common::AppState;
use turbine_sync::config::Config;
use turbine_sync::error::AppResult;
use turbine_sync::etl::{EtlRunner, ScriptOutput};
use turbine_sync::geo::GeoTable;
use turbine_sync::routes;
use turbine_sync::store::{DataStore, StoreKind};

/// Records every call and answers with a fixed exit code.
#[derive(Default)]
pub struct FakeEtl {
    pub exit_code: Option<i32>,
    pub calls: Mutex<Vec<Vec<String>>>,
}

impl FakeEtl {
    pub fn exiting_with(code: i32) -> Self {
        Self {
            exit_code: Some(code),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EtlRunner for FakeEtl {
    async fn run(&self, args: &[String]) -> AppResult<ScriptOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(args.to_vec());
        }
        Ok(ScriptOutput {
            stdout: format!("ran with {args:?}"),
            stderr: if self.exit_code == Some(0) {
                String::new()
            } else {
                "Traceback: boom".to_string()
            },
            exit_code: self.exit_code,
        })
    }
}

pub fn test_config() -> Config {
    Config {
        disable_rate_limiting: true,
        ..Config::default()
    }
}

pub fn geo(entries: &[(&str, [f64; 2])]) -> GeoTable {
    GeoTable::new(
        entries
            .iter()
            .map(|(prefix, point)| ((*prefix).to_string(), *point))
            .collect::<HashMap<_, _>>(),
    )
}

pub struct TestApp {
    pub state: AppState,
    pub etl: Arc<FakeEtl>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with(test_config(), GeoTable::default()).await
    }

    pub async fn with(config: Config, geo: GeoTable) -> Self {
        Self::with_etl(config, geo, Arc::new(FakeEtl::exiting_with(0))).await
    }

    pub async fn with_etl(config: Config, geo: GeoTable, etl: Arc<FakeEtl>) -> Self {
        let store = DataStore::in_memory().await.expect("in-memory stores");
        let state = AppState::with_parts(store, config, geo, etl.clone());
        Self { state, etl }
    }

    pub fn store(&self) -> &DataStore {
        &self.state.store
    }

    pub fn router(&self) -> Router {
        routes::build_router(self.state.clone())
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        self.send(request).await
    }

    pub async fn post_empty(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::post(path).body(Body::empty()).expect("request");
        self.send(request).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::get(path).body(Body::empty()).expect("request");
        self.send(request).await
    }

    /// Post a multipart form; `files` are `(field, file name, bytes)`.
    pub async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> (StatusCode, Value) {
        let boundary = "turbine-sync-test-boundary";
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                    .as_bytes(),
            );
        }
        for (name, file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        let request = Request::post(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, json)
    }

    pub async fn exec(&self, kind: StoreKind, sql: &str) {
        let conn = self.store().conn(kind);
        conn.execute(Statement::from_string(conn.get_database_backend(), sql))
            .await
            .expect("statement");
    }

    pub async fn count(&self, kind: StoreKind, table: &str) -> i64 {
        self.scalar(kind, &format!("SELECT COUNT(*) AS n FROM \"{table}\"")).await
    }

    /// First column of the first row, named `n`.
    pub async fn scalar(&self, kind: StoreKind, sql: &str) -> i64 {
        let conn = self.store().conn(kind);
        conn.query_one(Statement::from_string(conn.get_database_backend(), sql))
            .await
            .expect("query")
            .expect("row")
            .try_get::<i64>("", "n")
            .expect("n column")
    }

    /// Make every insert into `table` on `kind` fail.
    pub async fn fail_inserts(&self, kind: StoreKind, table: &str) {
        self.exec(
            kind,
            &format!(
                "CREATE TRIGGER fail_{table} BEFORE INSERT ON \"{table}\" \
                 BEGIN SELECT RAISE(ABORT, 'simulated insert failure'); END"
            ),
        )
        .await;
    }
}
