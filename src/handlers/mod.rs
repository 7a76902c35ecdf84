// Handlers grouped by surface:
//   auth   - signup / signin / user listing under /api/v1
//   data   - generic collection CRUD under /api/v1 and /api/v2
//   system - health check and JSON 404
pub mod auth;
pub mod data;
pub mod system;
