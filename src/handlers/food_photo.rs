use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::AnalysisError;
use crate::models::{AnalysisState, ImageInput, NutritionResult};
use crate::services::{Notification, Notifier, NutritionEstimator};

/// Receives each accepted analysis; the host appends it to its meal list.
pub type AnalysisCompleteCallback = Box<dyn Fn(NutritionResult) + Send + Sync>;

#[derive(Default)]
struct FlowInner {
    state: AnalysisState,
    preview: Option<ImageInput>,
    // Bumped on every submit and discard; a resolution carrying an older value is stale.
    generation: u64,
}

/// Photo-to-nutrition flow: submit a photo, then accept or discard the estimate.
pub struct FoodPhotoAnalyzer {
    estimator: Arc<dyn NutritionEstimator>,
    notifier: Arc<dyn Notifier>,
    on_analysis_complete: AnalysisCompleteCallback,
    inner: Mutex<FlowInner>,
}

impl FoodPhotoAnalyzer {
    pub fn new(
        estimator: Arc<dyn NutritionEstimator>,
        notifier: Arc<dyn Notifier>,
        on_analysis_complete: AnalysisCompleteCallback,
    ) -> Self {
        Self {
            estimator,
            notifier,
            on_analysis_complete,
            inner: Mutex::new(FlowInner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FlowInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> AnalysisState {
        self.lock().state.clone()
    }

    pub fn is_analyzing(&self) -> bool {
        matches!(self.lock().state, AnalysisState::Analyzing)
    }

    /// The photo currently shown alongside the analysis, if any.
    pub fn preview(&self) -> Option<ImageInput> {
        self.lock().preview.clone()
    }

    /// Sends `image` for analysis and waits for the estimate.
    ///
    /// Non-image input is rejected before any request is made and leaves the
    /// state untouched. A call made while another analysis is in flight returns
    /// [`AnalysisError::Busy`]. If the flow is discarded before the response
    /// arrives, the response is dropped and [`AnalysisError::Discarded`] is returned.
    pub async fn submit_photo(&self, image: ImageInput) -> Result<NutritionResult, AnalysisError> {
        if !image.is_image() {
            log::warn!("⚠️ Rejected non-image upload: {}", image.media_type);
            self.notifier
                .notify(Notification::error("Error", "Please select an image"));
            return Err(AnalysisError::InvalidInput {
                media_type: image.media_type,
            });
        }

        let (generation, data_url) = {
            let mut inner = self.lock();
            if matches!(inner.state, AnalysisState::Analyzing) {
                return Err(AnalysisError::Busy);
            }

            inner.generation += 1;
            let data_url = image.to_data_url();
            inner.preview = Some(image);
            inner.state = AnalysisState::Analyzing;
            (inner.generation, data_url)
        };

        log::info!("📸 Analysis #{} started", generation);

        let outcome = self.estimator.estimate(&data_url).await;

        {
            let mut inner = self.lock();
            if inner.generation != generation {
                log::info!("🗑️ Analysis #{} resolved after discard, ignoring", generation);
                return Err(AnalysisError::Discarded);
            }

            inner.state = match &outcome {
                Ok(result) => AnalysisState::Succeeded(result.clone()),
                Err(e) => AnalysisState::Failed(e.to_string()),
            };
        }

        match &outcome {
            Ok(result) => {
                log::info!("✅ Analysis #{} recognized: {} ({} kcal)", generation, result.name, result.calories);
                self.notifier.notify(Notification::info(
                    "Analysis complete!",
                    format!("Recognized: {}", result.name),
                ));
            }
            Err(e) => {
                log::error!("❌ Analysis #{} failed: {:?}", generation, e);
                self.notifier
                    .notify(Notification::error("Analysis error", e.to_string()));
            }
        }

        outcome
    }

    /// Hands the held result to the completion callback and resets the flow.
    ///
    /// Returns false, without side effects, unless the flow is `Succeeded`.
    /// In particular a `Failed` flow stays `Failed`; leave it with [`discard`]
    /// or a new [`submit_photo`].
    ///
    /// [`discard`]: FoodPhotoAnalyzer::discard
    /// [`submit_photo`]: FoodPhotoAnalyzer::submit_photo
    pub fn accept_result(&self) -> bool {
        let result = {
            let mut inner = self.lock();
            match std::mem::take(&mut inner.state) {
                AnalysisState::Succeeded(result) => {
                    inner.preview = None;
                    result
                }
                other => {
                    inner.state = other;
                    return false;
                }
            }
        };

        let name = result.name.clone();
        (self.on_analysis_complete)(result);

        self.notifier.notify(Notification::info(
            "Added to diary!",
            format!("{} added to the meal plan", name),
        ));
        true
    }

    /// Returns to `Idle` from any state. An in-flight request keeps running but
    /// its response will be ignored.
    pub fn discard(&self) {
        let mut inner = self.lock();
        log::debug!("🗑️ Discarding analysis (was {})", inner.state.as_str());
        inner.generation += 1;
        inner.state = AnalysisState::Idle;
        inner.preview = None;
    }
}
