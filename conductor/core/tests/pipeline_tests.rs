//! Pipeline integration tests
//!
//! These tests run the generation pipelines and the Conductor through the
//! public API only, against a recording mock backend. Tests cover:
//! - Digest limits as seen by the concept request
//! - The concept and build-script pipelines
//! - A full Conductor session ending in an exported artifact
//! - Playback of a generated script

use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;

use nexus_core::digest::MAX_DIGEST_FILE_BYTES;
use nexus_core::{
    generate_build_script_with, generate_concept_with, Conductor, ConductorConfig,
    ConductorMessage, ConductorState, GenerationError, LlmBackend, LlmRequest, LlmResponse,
    ScriptPlayer, SurfaceEvent, SurfaceType,
};

const CONCEPT_JSON: &str = r#"{
    "osName": "Aurora",
    "codename": "Aurora Shell",
    "philosophy": "Night-sky tooling for amateur astronomers.",
    "kernelVersion": "6.10.2",
    "desktopEnvironment": "KDE Plasma",
    "defaultShell": "Zsh",
    "keyFeatures": ["Star charts in the lock screen", "Red-light mode"],
    "defaultPackages": ["stellarium", "kstars", "gimp"],
    "bootScreenAscii": "   *  .  *\n  AURORA\n .  *   ."
}"#;

// =============================================================================
// Mock Backend
// =============================================================================

/// Records every request and answers from a fixed list
#[derive(Clone, Default)]
struct RecordingBackend {
    replies: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<LlmRequest>>>,
}

impl RecordingBackend {
    fn answering(replies: &[&str]) -> Self {
        Self {
            // Popped from the back
            replies: Arc::new(Mutex::new(replies.iter().rev().map(|s| s.to_string()).collect())),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for RecordingBackend {
    fn name(&self) -> &str {
        "Recording"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn send(&self, request: &LlmRequest) -> anyhow::Result<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop() {
            Some(content) => Ok(LlmResponse {
                content,
                model: request.model.clone(),
                tokens_used: Some(42),
                duration_ms: Some(3),
            }),
            None => anyhow::bail!("503 Service Unavailable"),
        }
    }
}

fn temp_file_with(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

// =============================================================================
// Pipelines
// =============================================================================

#[tokio::test]
async fn test_concept_request_carries_snippets_and_schema() {
    let notes = temp_file_with(b"telescope alignment checklist");
    let huge = temp_file_with(&vec![b'a'; MAX_DIGEST_FILE_BYTES as usize + 1]);
    let backend = RecordingBackend::answering(&[CONCEPT_JSON]);

    let concept = generate_concept_with(
        &backend,
        "An OS for astronomers",
        &[notes.path().to_path_buf(), huge.path().to_path_buf()],
        "gemini-2.5-flash",
        0.8,
    )
    .await
    .unwrap();

    assert_eq!(concept.codename, "Aurora Shell");

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.prompt.contains("User's core idea: \"An OS for astronomers\""));
    assert!(request.prompt.contains("telescope alignment checklist"));
    assert!(request.prompt.contains("[File is too large to read content (1.00 MB)]"));
    assert!(request.wants_json());
    assert!(request.system.is_some());
    assert!((request.temperature - 0.8).abs() < f32::EPSILON);
}

#[tokio::test]
async fn test_file_at_limit_is_read() {
    let exact = temp_file_with(&vec![b'z'; MAX_DIGEST_FILE_BYTES as usize]);
    let backend = RecordingBackend::answering(&[CONCEPT_JSON]);

    generate_concept_with(&backend, "", &[exact.path().to_path_buf()], "m", 0.8)
        .await
        .unwrap();

    let prompt = &backend.requests()[0].prompt;
    assert!(!prompt.contains("too large"));
    assert!(prompt.contains(&"z".repeat(5000)));
    assert!(!prompt.contains(&"z".repeat(5001)));
}

#[tokio::test]
async fn test_service_failure_wording() {
    let backend = RecordingBackend::default();

    let err = generate_concept_with(&backend, "idea", &[], "m", 0.8)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::ConceptService(_)));
    assert_eq!(
        err.to_string(),
        "Failed to generate OS concept from API: 503 Service Unavailable"
    );
}

#[tokio::test]
async fn test_build_script_pipeline_strips_fence() {
    let backend =
        RecordingBackend::answering(&[CONCEPT_JSON, "```bash\n#!/bin/bash\necho hi\n```"]);
    let concept = generate_concept_with(&backend, "idea", &[], "m", 0.8)
        .await
        .unwrap();

    let script = generate_build_script_with(&backend, &concept, "m", 0.4)
        .await
        .unwrap();

    assert_eq!(script, "#!/bin/bash\necho hi");
    let requests = backend.requests();
    let script_request = &requests[1];
    assert!(!script_request.wants_json());
    assert!(script_request.prompt.contains("\"codename\": \"Aurora Shell\""));
    assert!(script_request.prompt.contains("KDE Plasma"));
    assert!(script_request.prompt.contains("stellarium, kstars, gimp"));
}

#[tokio::test]
async fn test_blank_script_is_an_error() {
    let backend = RecordingBackend::answering(&[CONCEPT_JSON, "```\n\n```"]);
    let concept = generate_concept_with(&backend, "idea", &[], "m", 0.8)
        .await
        .unwrap();

    let err = generate_build_script_with(&backend, &concept, "m", 0.4)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::EmptyScript));
}

// =============================================================================
// Conductor Session
// =============================================================================

#[tokio::test]
async fn test_full_session_exports_artifact() {
    let out_dir = tempfile::tempdir().unwrap();
    let script = "#!/bin/bash\n# Aurora build\necho -e \"\\e[36mStars aligned\\e[0m\"\nsleep 2\necho done";
    let backend = RecordingBackend::answering(&[CONCEPT_JSON, script]);
    let (tx, mut rx) = mpsc::channel(100);
    let config = ConductorConfig {
        output_dir: out_dir.path().to_path_buf(),
        ..ConductorConfig::default()
    };
    let mut conductor = Conductor::new(backend.clone(), config, tx);

    conductor.start().await.unwrap();
    conductor
        .handle_event(SurfaceEvent::Connected {
            surface_type: SurfaceType::Headless,
        })
        .await
        .unwrap();
    conductor
        .handle_event(SurfaceEvent::PromptChanged {
            text: "An OS for astronomers".to_string(),
        })
        .await
        .unwrap();
    conductor
        .handle_event(SurfaceEvent::GenerateRequested)
        .await
        .unwrap();
    assert_eq!(conductor.state(), ConductorState::Generating);
    assert!(conductor.wait_pending().await);

    conductor
        .handle_event(SurfaceEvent::BuildRequested)
        .await
        .unwrap();
    assert_eq!(conductor.state(), ConductorState::Building);
    assert!(conductor.wait_pending().await);
    assert_eq!(conductor.app().script.as_deref(), Some(script));

    conductor
        .handle_event(SurfaceEvent::ExportRequested { dir: None })
        .await
        .unwrap();

    let mut saved = None;
    let mut states = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        match msg {
            ConductorMessage::ArtifactSaved { path } => saved = Some(path),
            ConductorMessage::State { state } => states.push(state),
            _ => {}
        }
    }

    let expected = out_dir.path().join("build-aurora-shell.sh");
    assert_eq!(saved, Some(expected.clone()));
    assert_eq!(std::fs::read_to_string(expected).unwrap(), script);
    assert!(states.contains(&ConductorState::Generating));
    assert!(states.contains(&ConductorState::Building));
    assert_eq!(states.last(), Some(&ConductorState::Ready));
}

// =============================================================================
// Playback
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_generated_script_plays_back() {
    let script = "#!/bin/bash\n# Aurora build\necho -e \"\\e[36mStars aligned\\e[0m\"\nsleep 2\necho done";
    let mut player = ScriptPlayer::new();
    let start = tokio::time::Instant::now();
    player.play(script);

    while player.next_change().await {}

    // Initial delay + three typing gaps (< 70 ms each) + the 2 s sleep
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(2500));
    assert!(elapsed < Duration::from_millis(2720));

    let shown: Vec<String> = player
        .engine()
        .rendered_lines()
        .iter()
        .map(|l| l.text())
        .collect();
    assert_eq!(
        shown,
        vec![
            "#!/bin/bash",
            "# Aurora build",
            "echo -e \"Stars aligned\"",
            "echo done"
        ]
    );
}
