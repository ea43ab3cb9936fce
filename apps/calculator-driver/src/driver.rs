//! Sequential orchestration of every call shape.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use calculator_sdk::{CalculatorClient, CalculatorError, Operation, ReplyStream};

use crate::inputs::DriverInputs;

/// Error aborting a driver run.
#[derive(thiserror::Error, Debug)]
pub enum DriverError {
    #[error("could not {call}: {source}")]
    Call {
        call: String,
        #[source]
        source: CalculatorError,
    },

    #[error("AllCalcsEach receiver task failed: {0}")]
    Receiver(String),
}

impl DriverError {
    fn call(call: impl Into<String>) -> impl FnOnce(CalculatorError) -> Self {
        let call = call.into();
        move |source| Self::Call { call, source }
    }

    /// Whether the run was aborted by a call deadline.
    #[must_use]
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::Call { source, .. } if source.is_deadline_exceeded())
    }
}

/// Results of one complete run, in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverReport {
    pub unary: Vec<(Operation, f64)>,
    pub reductions: Vec<(Operation, f64)>,
    pub all_calcs: Vec<f64>,
    /// Every reply of the bidirectional call, four per streamed value.
    pub all_calcs_each: Vec<f64>,
}

/// Render results as `[1, -1, 12, 0.75]`.
#[must_use]
pub fn format_results(results: &[f64]) -> String {
    let items: Vec<String> = results.iter().map(f64::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Runs the calculator through all call shapes against one client.
#[derive(Clone)]
pub struct Driver {
    client: Arc<dyn CalculatorClient>,
}

impl Driver {
    #[must_use]
    pub fn new(client: Arc<dyn CalculatorClient>) -> Self {
        Self { client }
    }

    /// Execute every call in order, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first failed call; later calls are not attempted.
    pub async fn run(&self, inputs: &DriverInputs) -> Result<DriverReport, DriverError> {
        let mut unary = Vec::with_capacity(inputs.operations.len());
        for &op in &inputs.operations {
            unary.push((op, self.calc(op, inputs.a, inputs.b).await?));
        }

        let mut reductions = Vec::with_capacity(inputs.operations.len());
        for &op in &inputs.operations {
            reductions.push((op, self.calc_client_streams(op, &inputs.values).await?));
        }

        let all_calcs = self.calc_streams(inputs.a, inputs.b).await?;
        let all_calcs_each = self.calc_each_streams(&inputs.values).await?;

        Ok(DriverReport {
            unary,
            reductions,
            all_calcs,
            all_calcs_each,
        })
    }

    /// Unary call.
    ///
    /// # Errors
    /// Returns [`DriverError::Call`] if the call fails or times out.
    pub async fn calc(&self, op: Operation, a: f64, b: f64) -> Result<f64, DriverError> {
        let result = self
            .client
            .calculate(op, a, b)
            .await
            .map_err(DriverError::call(op.name()))?;
        info!("{op} = {result:.2}");
        Ok(result)
    }

    /// Client-streaming reduction of `values`.
    ///
    /// # Errors
    /// Returns [`DriverError::Call`] if the call fails or times out.
    pub async fn calc_client_streams(
        &self,
        op: Operation,
        values: &[f64],
    ) -> Result<f64, DriverError> {
        let result = self
            .client
            .reduce(op, values.to_vec())
            .await
            .map_err(DriverError::call(format!("{op}Stream")))?;
        info!("{op} = {result}");
        Ok(result)
    }

    /// Server-streaming fan-out of `(a, b)`.
    ///
    /// # Errors
    /// Returns [`DriverError::Call`] if the call fails or times out.
    pub async fn calc_streams(&self, a: f64, b: f64) -> Result<Vec<f64>, DriverError> {
        let results = self
            .client
            .all_calcs(a, b)
            .await
            .map_err(DriverError::call("AllCalcs"))?;
        info!("Result of AllCalcs: {}", format_results(&results));
        Ok(results)
    }

    /// Bidirectional fan-out: send `values` while a receiver task drains the
    /// replies, then wait for the receiver to observe end-of-stream.
    ///
    /// # Errors
    /// Returns [`DriverError::Call`] if the call fails or times out, and
    /// [`DriverError::Receiver`] if the receiver task panicked.
    pub async fn calc_each_streams(&self, values: &[f64]) -> Result<Vec<f64>, DriverError> {
        let (value_tx, value_rx) = mpsc::channel(values.len().max(1));
        let replies = self
            .client
            .all_calcs_each(value_rx)
            .await
            .map_err(DriverError::call("AllCalcsEach"))?;

        let (done_tx, done_rx) = oneshot::channel();
        let receiver = tokio::spawn(receive_each(replies, done_tx));

        for &value in values {
            if value_tx.send(value).await.is_err() {
                debug!("AllCalcsEach send side closed early");
                break;
            }
        }
        // Close-send: the server finishes once it has answered every value.
        drop(value_tx);

        if done_rx.await.is_err() {
            debug!("AllCalcsEach receiver stopped before end-of-stream");
        }

        receiver
            .await
            .map_err(|e| DriverError::Receiver(e.to_string()))?
    }
}

async fn receive_each(
    mut replies: ReplyStream,
    done: oneshot::Sender<()>,
) -> Result<Vec<f64>, DriverError> {
    let mut results = Vec::new();

    while let Some(reply) = replies.next().await {
        let result = reply.map_err(DriverError::call("AllCalcsEach"))?;
        results.push(result);
        info!("{}th result: {}", results.len(), format_results(&results));
    }

    if done.send(()).is_err() {
        debug!("AllCalcsEach completion signal not observed");
    }
    Ok(results)
}
