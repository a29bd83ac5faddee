/// Liveness probe; answers without touching the trigger.
pub async fn health_check() -> &'static str {
    "OK"
}
