//! Forward-only model evaluation and reporting helpers

use crate::data::Dataset;
use crate::error::{ForecastError, Result};
use crate::model::Net;
use burn::tensor::{backend::Backend, ElementConversion, Tensor};

/// Mean squared error over one batch
pub(crate) fn mse_loss<B: Backend>(output: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    (output - targets).powf_scalar(2.0).mean()
}

/// Average MSE over a dataset: per-batch means averaged across batches.
///
/// Forward passes only; no gradients, no parameter mutation.
pub fn average_loss<B: Backend>(
    model: &Net<B>,
    dataset: &mut Dataset,
    device: &B::Device,
) -> Result<f64> {
    if dataset.is_empty() {
        return Err(ForecastError::InvalidState(
            "cannot evaluate on an empty dataset".to_string(),
        ));
    }

    dataset.reset();
    let mut loss_sum = 0.0;
    let mut batch_count = 0usize;

    while let Some(batch) = dataset.next_batch() {
        let features = batch.features_tensor::<B>(device);
        let targets = batch.targets_tensor::<B>(device);

        let loss = mse_loss(model.forward(features), targets);
        loss_sum += loss.into_scalar().elem::<f64>();
        batch_count += 1;
    }

    Ok(loss_sum / batch_count as f64)
}

/// Runs the model over the dataset and concatenates per-batch outputs in
/// batch order into one prediction sequence
pub fn collect_predictions<B: Backend>(
    model: &Net<B>,
    dataset: &mut Dataset,
    device: &B::Device,
) -> Vec<f64> {
    dataset.reset();
    let mut predictions = Vec::with_capacity(dataset.len());

    while let Some(batch) = dataset.next_batch() {
        let output = model.forward(batch.features_tensor::<B>(device));
        let values: Vec<f32> = output.into_data().to_vec().unwrap();
        predictions.extend(values.into_iter().map(f64::from));
    }

    predictions
}

/// Mean absolute error between aligned prediction and observation sequences
pub fn mean_absolute_error(predictions: &[f64], actuals: &[f64]) -> Result<f64> {
    if predictions.len() != actuals.len() {
        return Err(ForecastError::InvalidArgument(format!(
            "{} predictions against {} observations",
            predictions.len(),
            actuals.len()
        )));
    }
    if predictions.is_empty() {
        return Err(ForecastError::InvalidState(
            "cannot compute error over empty sequences".to_string(),
        ));
    }

    let sum: f64 = predictions
        .iter()
        .zip(actuals.iter())
        .map(|(p, a)| (p - a).abs())
        .sum();
    Ok(sum / predictions.len() as f64)
}
