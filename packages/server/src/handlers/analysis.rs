use axum::extract::State;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use common::{StorageError, StorageKey};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::chart::{
    self, ChartError, ChartLabels, EXPERIENCE_COLUMN, GroupedCounts, OUTCOME_COLUMN,
};
use crate::csv_table::{CsvError, CsvTable};
use crate::entity::upload;
use crate::error::AppError;
use crate::extractors::auth::CurrentAccount;
use crate::flash::Flash;
use crate::handlers::{Page, redirect_with, render};
use crate::state::AppState;

const MISSING_COLUMNS: &str = "Required columns 'Placement' or 'Internship_Experience' not found in the dataset for charting.";

#[derive(Debug, Error)]
enum AnalysisError {
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}

#[derive(Serialize)]
struct AnalysisBody {
    filename: String,
    chart: Option<String>,
}

/// Chart the latest upload as a data URI, or `None` without the needed columns.
fn placement_chart(bytes: &[u8]) -> Result<Option<String>, AnalysisError> {
    let table = CsvTable::parse(bytes)?;
    let Some(counts) = GroupedCounts::from_table(&table, EXPERIENCE_COLUMN, OUTCOME_COLUMN)
    else {
        return Ok(None);
    };
    let svg = chart::render_grouped_bar(&counts, &ChartLabels::placement())?;
    Ok(Some(chart::to_data_uri(&svg)))
}

#[instrument(skip_all, fields(account_id = account.id))]
pub async fn visuals_analysis(
    CurrentAccount(account): CurrentAccount,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let latest = upload::Entity::find()
        .filter(upload::Column::AccountId.eq(account.id))
        .order_by_desc(upload::Column::UploadedAt)
        .order_by_desc(upload::Column::Id)
        .one(&state.db)
        .await?;

    let Some(latest) = latest else {
        return Ok(redirect_with(
            jar,
            Flash::info("Please upload a CSV file first to perform analysis."),
            "/upload_csv",
        ));
    };

    let key = StorageKey::parse(latest.storage_key.as_str())?;
    let bytes = match state.blob_store.get(&key).await {
        Ok(bytes) => bytes,
        Err(StorageError::NotFound(_)) => {
            tracing::warn!(key = %key, "Latest upload has no blob");
            return Ok(redirect_with(
                jar,
                Flash::danger("The uploaded file was not found on the server."),
                "/preview_data",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let mut page = Page::new("visuals_analysis", "Visuals & Analysis", Some(&account));
    let chart = match placement_chart(&bytes) {
        Ok(Some(uri)) => Some(uri),
        Ok(None) => {
            page = page.flash(Flash::warning(MISSING_COLUMNS));
            None
        }
        Err(e) => {
            tracing::error!(filename = %latest.filename, error = %e, "Error generating chart");
            page = page.flash(Flash::danger(format!("Error generating chart: {e}")));
            None
        }
    };

    render(
        &state,
        jar,
        page,
        AnalysisBody {
            filename: latest.filename,
            chart,
        },
    )
}
