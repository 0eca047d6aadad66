// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const AUTH_REGISTERED: &str = "auth.registered";
pub const AUTH_LOGIN_OK: &str = "auth.login.ok";
pub const AUTH_LOGIN_REJECTED: &str = "auth.login.rejected";
pub const AUTH_GATE_REJECTED: &str = "auth.gate.rejected";
pub const GOAL_CREATED: &str = "goal.created";
pub const GOAL_DELETED: &str = "goal.deleted";
