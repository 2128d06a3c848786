//! services/api/src/bin/openapi.rs
//!
//! Dumps the OpenAPI 3.0 document of the event tracker API: the `/auth/*`
//! session routes, the owner-only `/events` routes and the unauthenticated
//! `/events/public` routes. The same document is served live under `/swagger-ui`.
//!
//! Usage: `openapi [OUTPUT]`, where `OUTPUT` defaults to `openapi.json`.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

const DEFAULT_OUTPUT: &str = "openapi.json";

/// Serializes the event tracker document and writes it to `path`.
fn write_event_tracker_doc(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let doc = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(path, doc)?;
    println!("Event tracker OpenAPI document written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_OUTPUT.to_string());
    write_event_tracker_doc(&path)?;
    Ok(())
}
