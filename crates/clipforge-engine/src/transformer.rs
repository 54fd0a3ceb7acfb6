//! The execution adapter: one request in, one terminal outcome out.

use clipforge_core::{Error, Result, TransformRequest, TransformResult};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::engine::{CompletionListener, Engine, EngineJob, OutcomeCell, Terminal};
use crate::report::translate;

/// Drives transformations against an engine backend.
///
/// Each call to [`transform`](Self::transform) owns an independent
/// engine job and compiled graph; invocations share no state, so a
/// single `Transformer` may serve concurrent calls without
/// coordination.
pub struct Transformer<E: Engine> {
    engine: E,
}

impl<E: Engine> Transformer<E> {
    /// Create a transformer over the given engine backend.
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Execute one transformation request to its terminal outcome.
    ///
    /// Validates and compiles the request, starts exactly one engine
    /// job, then suspends until the first of {success callback,
    /// failure callback, cancellation} resolves the outcome. The
    /// engine job and compiled graph are scoped to this call.
    ///
    /// Cancelling `cancel` while the job is running forwards a cancel
    /// to the engine and resolves with [`Error::Cancelled`] without
    /// waiting for an engine acknowledgement; a cancellation that
    /// arrives after the engine already reported is a no-op.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingArgument`] if a required field is absent; the
    ///   engine is never started in that case.
    /// - [`Error::Engine`] if the engine fails to start or reports a
    ///   failure.
    /// - [`Error::Cancelled`] if cancellation won the outcome.
    pub async fn transform(
        &self,
        request: &TransformRequest,
        cancel: CancellationToken,
    ) -> Result<TransformResult> {
        let graph = clipforge_compile::compile(request)?;
        tracing::debug!(
            uri = %graph.source.uri,
            effects = graph.effects.len(),
            audio_processors = graph.audio_processors.len(),
            output = %graph.output_path.display(),
            "starting transformation"
        );

        let (cell, mut rx) = OutcomeCell::channel();
        let listener = CompletionListener::new(std::sync::Arc::clone(&cell));
        let mut job = self.engine.start(graph, listener)?;

        // Biased toward cancellation: a cancel requested before either
        // callback fires deterministically wins; one racing a callback
        // is settled by the cell's claim.
        let event = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            terminal = &mut rx => Some(terminal),
        };
        let terminal = match event {
            Some(terminal) => terminal.map_err(closed_without_event)?,
            None => {
                if cell.resolve(Terminal::Cancelled) {
                    tracing::info!("transformation cancelled, forwarding to engine");
                    job.cancel();
                }
                // The cell has been resolved either way; the receiver
                // yields whichever event won the claim.
                rx.await.map_err(closed_without_event)?
            }
        };

        match terminal {
            Terminal::Completed(report) => {
                tracing::info!("transformation completed");
                Ok(translate(report))
            }
            Terminal::Failed(error) => {
                tracing::warn!(message = %error.message, "transformation failed");
                Err(error.into())
            }
            Terminal::Cancelled => Err(Error::Cancelled),
        }
    }

    /// Borrow the underlying engine backend.
    pub fn engine(&self) -> &E {
        &self.engine
    }
}

fn closed_without_event(_: oneshot::error::RecvError) -> Error {
    // The engine dropped its listener without firing either callback;
    // surface that as an engine failure rather than hanging.
    Error::engine("engine terminated without reporting a result")
}
