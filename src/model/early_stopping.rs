//! Early stopping on stalled validation loss

/// Outcome of one early-stopping check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopDecision {
    /// Validation loss reached a new best; the caller should checkpoint
    Improved,
    /// No improvement, but patience is not exhausted yet
    NoImprovement,
    /// Patience exhausted; training should halt now
    Stop,
}

/// Halts training once validation loss stops improving.
///
/// Tracks `best_score = -best_validation_loss` and a counter of consecutive
/// epochs without improvement. The counter resets on every improvement.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    patience: usize,
    delta: f64,
    counter: usize,
    best_score: Option<f64>,
}

impl EarlyStopping {
    pub fn new(patience: usize, delta: f64) -> Self {
        Self {
            patience,
            delta,
            counter: 0,
            best_score: None,
        }
    }

    /// Feeds one epoch's average validation loss and decides how to proceed
    pub fn check(&mut self, val_loss: f64) -> StopDecision {
        let score = -val_loss;

        match self.best_score {
            Some(best) if score < best + self.delta => {
                self.counter += 1;
                if self.counter >= self.patience {
                    StopDecision::Stop
                } else {
                    StopDecision::NoImprovement
                }
            }
            _ => {
                self.best_score = Some(score);
                self.counter = 0;
                StopDecision::Improved
            }
        }
    }

    /// Consecutive epochs without improvement so far
    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Best validation loss seen, if any
    pub fn best_val_loss(&self) -> Option<f64> {
        self.best_score.map(|s| -s)
    }
}
