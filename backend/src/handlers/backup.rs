//! Backup export HTTP handler

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::middleware::{check_permission, CurrentUser};
use crate::services::backup::BackupService;
use crate::AppState;

/// Export all operational data as a JSON download (admin only)
pub async fn export_backup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> impl IntoResponse {
    if let Err(resp) = check_permission(&user, "backup", "read") {
        return resp;
    }
    let service = BackupService::new(state.db.clone());

    match service.export().await {
        Ok(backup) => {
            let filename = format!(
                "esm-backup-{}.json",
                backup.exported_at.format("%Y%m%d-%H%M%S")
            );
            (
                StatusCode::OK,
                [(
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", filename),
                )],
                Json(backup),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}
