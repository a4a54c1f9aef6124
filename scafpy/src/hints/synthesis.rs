//! Optional external hint synthesis behind a hard timeout.
//!
//! A synthesizer runs on a worker thread; the generator waits with
//! `recv_timeout` and falls back to template hints on timeout or failure.
//! A stuck collaborator can never stall a batch.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use crate::analyzer::DeclKind;
use crate::convert::Hint;
use crate::unit::Tier;

/// Structural summary handed to a synthesizer. Carries no body source,
/// so a collaborator cannot leak what the learner is meant to write.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub name: String,
    pub kind: DeclKind,
    pub tier: Tier,
    pub param_names: Vec<String>,
    pub docstring_topic: Option<String>,
}

/// External hint producer. Implementations must be cheap to share; the
/// bounded call clones the `Arc` per invocation.
pub trait HintSynthesizer: Send + Sync {
    fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<Hint>, TransientCollaboratorError>;
}

/// Failure of one synthesis call. Always recovered locally by falling
/// back to templates; it never propagates past the generator.
#[derive(Debug, Clone)]
pub enum TransientCollaboratorError {
    Timeout(Duration),
    Failed(String),
}

impl std::fmt::Display for TransientCollaboratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout(limit) => write!(f, "hint synthesis timed out after {limit:?}"),
            Self::Failed(reason) => write!(f, "hint synthesis failed: {reason}"),
        }
    }
}

impl std::error::Error for TransientCollaboratorError {}

/// Runs one synthesis call with a hard deadline. The worker thread is
/// detached; if it outlives the deadline its result is dropped with the
/// channel.
pub(crate) fn call_bounded(
    synthesizer: &Arc<dyn HintSynthesizer>,
    request: SynthesisRequest,
    timeout: Duration,
) -> Result<Vec<Hint>, TransientCollaboratorError> {
    let (sender, receiver) = mpsc::channel();
    let worker = Arc::clone(synthesizer);
    std::thread::spawn(move || {
        let result = worker.synthesize(&request);
        let _ = sender.send(result);
    });

    match receiver.recv_timeout(timeout) {
        Ok(result) => result,
        Err(_) => Err(TransientCollaboratorError::Timeout(timeout)),
    }
}
