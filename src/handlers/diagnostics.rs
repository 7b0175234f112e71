use axum::{extract::State, http::StatusCode, Json};
use std::sync::{Mutex, OnceLock};
use sysinfo::System;
use tracing::info;

use crate::models::{ApiError, DiagnosticsResponse};
use crate::state::AppState;

static SYSTEM_MONITOR: OnceLock<Mutex<System>> = OnceLock::new();

/// Dashboard connection count and process host load
pub async fn diagnostics(State(state): State<AppState>) -> Result<(StatusCode, Json<DiagnosticsResponse>), ApiError> {
    let n_dashboard_conn = state.notifier.registry().len().await as u32;

    // System stats
    let (cpu_usage, memory_alloc, memory_free, memory_total) = {
        let sys_lock = SYSTEM_MONITOR.get_or_init(|| Mutex::new(System::new_all()));
        match sys_lock.lock() {
            Ok(mut sys) => {
                sys.refresh_cpu();
                sys.refresh_memory();
                (
                    sys.global_cpu_info().cpu_usage(),
                    sys.used_memory(),
                    sys.free_memory(),
                    sys.total_memory(),
                )
            }
            Err(_) => (0.0, 0, 0, 0),
        }
    };

    info!(
        "Diagnostics: CPU: {:.2}%, Mem: {}/{} MB (Free: {} MB), Dashboards: {}",
        cpu_usage,
        memory_alloc / 1024 / 1024,
        memory_total / 1024 / 1024,
        memory_free / 1024 / 1024,
        n_dashboard_conn
    );

    Ok((
        StatusCode::OK,
        Json(DiagnosticsResponse {
            n_dashboard_conn,
            cpu_usage,
            memory_alloc,
            memory_total,
            memory_free,
        }),
    ))
}
