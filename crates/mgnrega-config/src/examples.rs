// crates/mgnrega-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and `config example`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `mgnrega.toml`. Secrets are left to the environment.

/// Returns a canonical example `mgnrega.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[source]
base_url = "https://api.data.gov.in/resource"
# api_key is usually supplied through DATA_GOV_API_KEY
timeout_ms = 30000
page_limit = 1000
max_response_bytes = 16777216
user_agent = "MGNREGA-Data-Viz/1.0"

[server]
bind = "127.0.0.1:8080"
allowed_origins = ["http://localhost:3000"]
max_body_bytes = 65536

[trigger]
# secret is usually supplied through CRON_SECRET
freshness_window_secs = 86400
lock_ttl_secs = 900

[store]
type = "sqlite"
path = "data/mgnrega.sqlite"
journal_mode = "wal"
sync_mode = "full"
busy_timeout_ms = 5000

[normalize]
coercion_policy = "silent"

[audit]
enabled = true
# path = "data/audit.jsonl"
"#,
    )
}
