/// Game and list code helpers.
pub mod codes;
/// Scoresheet operations on single games.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Game list operations.
pub mod list_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
