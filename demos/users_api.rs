//! A small users API served under `/api`, showing query, form, multipart and JSON handling.
//!
//! Try it with:
//!
//! ```text
//! curl 'http://127.0.0.1:8080/api/users?limit=1'
//! curl -X POST -H 'Content-Type: application/json' -d '{"name":"Bob"}' http://127.0.0.1:8080/api/users
//! curl -X POST -d 'name=Alice&age=30' http://127.0.0.1:8080/api/users/form
//! curl -X POST -F name=Carol -F avatar=@README.md http://127.0.0.1:8080/api/users/form
//! ```

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use microroute::{HttpResponse, HttpServer, Router, ServerConfig, ServerError, StatusCode};

#[derive(Clone, Serialize, Deserialize)]
struct User {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let users: Arc<Mutex<Vec<User>>> = Arc::new(Mutex::new(vec![User { name: "Ada".to_string() }]));
    let mut router = Router::with_base_path("/api");

    let store = users.clone();
    router.get("/users", move |ctx| {
        let store = store.clone();
        async move {
            let limit = match ctx.param("limit").map(str::parse::<usize>) {
                Some(Ok(limit)) => limit,
                Some(Err(e)) => return Ok(HttpResponse::text(StatusCode::BadRequest, format!("bad limit: {e}"))),
                None => usize::MAX,
            };
            let listed: Vec<User> = store
                .lock()
                .map_err(|_| ServerError::InternalError("user store poisoned".to_string()))?
                .iter()
                .take(limit)
                .cloned()
                .collect();
            HttpResponse::new(StatusCode::Ok).with_json(&listed)
        }
    });

    let store = users.clone();
    router.post("/users", move |ctx| {
        let store = store.clone();
        async move {
            let user: User = ctx.body.json()?;
            store
                .lock()
                .map_err(|_| ServerError::InternalError("user store poisoned".to_string()))?
                .push(user.clone());
            HttpResponse::new(StatusCode::Created).with_json(&user)
        }
    });

    // Form and multipart bodies both decode to string fields
    router.post("/users/form", |ctx| async move {
        match ctx.body.get("name") {
            Some(name) => Ok(HttpResponse::text(StatusCode::Created, format!("Welcome, {name}!"))),
            None => Ok(HttpResponse::text(StatusCode::BadRequest, "missing name field")),
        }
    });

    let server = HttpServer::new(ServerConfig::default(), router);
    server.start().await?;

    Ok(())
}
