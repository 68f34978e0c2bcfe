//! `storyreel generate` handler.

use super::commands::GenerateArgs;
use std::path::PathBuf;
use std::sync::Arc;
use storyreel::{
    InMemoryRunRecorder, LogProgressSink, OwnerId, Pipeline, PipelineSettings, RunId, RunRequest,
    SourceKind, StoryreelConfig, StoryreelResult, is_tool_on_path, services_from_config,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Run one pipeline with console progress; Ctrl-C cancels it.
pub async fn generate(
    args: GenerateArgs,
    config: &StoryreelConfig,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let source_text = match (&args.prompt, &args.file) {
        (Some(prompt), _) => prompt.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path).await?,
        (None, None) => return Err("either --prompt or --file is required".into()),
    };
    let request = build_request(source_text, &args)?;

    for tool in [&config.encode.ffmpeg, &config.encode.ffprobe] {
        if !is_tool_on_path(tool).await {
            warn!(tool = %tool, "Encoder tool not found; assembly will fail");
        }
    }

    let pipeline = Pipeline::new(
        services_from_config(config)?,
        PipelineSettings::from_config(config),
    )
    .with_recorder(Arc::new(InMemoryRunRecorder::new()));

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling run");
            on_interrupt.cancel();
        }
    });

    info!(run_id = %request.run_id, source = %request.source_kind, "Starting run");
    let artifact = pipeline
        .run(&request, Arc::new(LogProgressSink), cancel)
        .await?;
    Ok(artifact)
}

fn build_request(source_text: String, args: &GenerateArgs) -> StoryreelResult<RunRequest> {
    let mut request = RunRequest::new(source_text, SourceKind::from_full_story(args.story));
    if let Some(raw) = &args.run_id {
        request = request.with_run_id(RunId::parse(raw.as_str())?);
    }
    if let Some(owner) = &args.owner {
        request = request.with_owner(OwnerId::new(owner.as_str()));
    }
    Ok(request)
}
