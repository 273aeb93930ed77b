use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use super::Envelope;
use crate::common::AppState;
use crate::error::AppResult;
use crate::etl::{HUMAN_IN_THE_LOOP, ScriptOutput};

#[derive(Debug, Serialize, ToSchema)]
pub struct BothOutputs {
    pub main: ScriptOutput,
    pub human_in_the_loop: ScriptOutput,
}

/// Run the data-cleaning ETL pass
#[utoipa::path(
    post,
    path = "/run-python",
    responses(
        (status = 200, description = "Script finished with exit code 0", body = Envelope<ScriptOutput>),
        (status = 404, description = "Script not found"),
        (status = 500, description = "Script exited non-zero; `error` holds stderr"),
    ),
    tag = "scripts"
)]
pub async fn run_python(State(state): State<AppState>) -> AppResult<Json<Envelope<ScriptOutput>>> {
    let output = state.etl.run(&[]).await?.into_result()?;
    Ok(Envelope::ok("Data Cleaning Complete", output))
}

/// Run the ETL in human-in-the-loop mode
#[utoipa::path(
    post,
    path = "/run-python-hitl",
    responses(
        (status = 200, description = "Script finished with exit code 0", body = Envelope<ScriptOutput>),
        (status = 404, description = "Script not found"),
        (status = 500, description = "Script exited non-zero; `error` holds stderr"),
    ),
    tag = "scripts"
)]
pub async fn run_python_hitl(State(state): State<AppState>) -> AppResult<Json<Envelope<ScriptOutput>>> {
    let output = state
        .etl
        .run(&[HUMAN_IN_THE_LOOP.to_string()])
        .await?
        .into_result()?;
    Ok(Envelope::ok("Human-in-the-loop run complete", output))
}

/// Run the cleaning pass, then the human-in-the-loop pass
///
/// The second run starts only if the first exited with code 0.
#[utoipa::path(
    post,
    path = "/run-python-both",
    responses(
        (status = 200, description = "Both runs finished with exit code 0", body = Envelope<BothOutputs>),
        (status = 404, description = "Script not found"),
        (status = 500, description = "A run exited non-zero; `error` holds its stderr"),
    ),
    tag = "scripts"
)]
pub async fn run_python_both(State(state): State<AppState>) -> AppResult<Json<Envelope<BothOutputs>>> {
    let main = state.etl.run(&[]).await?.into_result()?;
    let human_in_the_loop = state
        .etl
        .run(&[HUMAN_IN_THE_LOOP.to_string()])
        .await?
        .into_result()?;
    Ok(Envelope::ok(
        "Both scripts completed",
        BothOutputs {
            main,
            human_in_the_loop,
        },
    ))
}
