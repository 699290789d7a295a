//! Classification orchestrator.
//!
//! A request runs the primary model on a preprocessed image and, when the
//! predicted class is the configured trigger, a stage model on the same tensor.
//! Primary failures fail the request. Stage failures never do: they are logged
//! and the default stage is reported instead.

use super::labels::LabelSet;
use super::result::{ClassProbabilities, ClassificationResult};
use crate::core::config::ServiceConfig;
use crate::core::{ClassifierError, ClassifierResult, Tensor2D, Tensor4D};
use crate::models::{AdapterCache, AdapterLoader, Predictor, ResilientLoader};
use crate::processors::normalize::normalize;
use crate::processors::preprocess::ImagePreprocessor;
use crate::utils::load_image;
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Stage reported when no stage model is configured.
pub const DEFAULT_STAGE: &str = "stage_0";

/// When and how to run the stage model.
#[derive(Debug, Clone, PartialEq)]
pub struct StagePolicy {
    /// Primary label that triggers the stage model.
    pub trigger_label: String,
    /// Artifact reference of the stage model.
    pub artifact: String,
    /// Stage labels by output index.
    pub labels: LabelSet,
    /// Stage reported when the model is skipped, fails, or emits an unknown index.
    pub default_stage: String,
}

/// Composes preprocessing, cached adapters, normalization and stage chaining.
pub struct Classifier<L: AdapterLoader = ResilientLoader> {
    cache: Arc<AdapterCache<L>>,
    preprocessor: ImagePreprocessor,
    labels: LabelSet,
    stage: Option<StagePolicy>,
}

impl<L: AdapterLoader> std::fmt::Debug for Classifier<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("cache", &self.cache)
            .field("preprocessor", &self.preprocessor)
            .field("labels", &self.labels)
            .field("stage", &self.stage)
            .finish()
    }
}

impl Classifier<ResilientLoader> {
    /// Builds a classifier with the production loader from a service config.
    pub fn from_config(config: &ServiceConfig) -> ClassifierResult<Self> {
        config.validate()?;
        let loader = ResilientLoader::new(config.loader.clone());
        let cache = Arc::new(AdapterCache::new(loader, config.cache_capacity)?);

        let stage = config.stage.as_ref().and_then(|stage| {
            config.stage_artifact().map(|artifact| StagePolicy {
                trigger_label: stage.trigger_label.clone(),
                artifact: artifact.to_string_lossy().into_owned(),
                labels: LabelSet::new(stage.labels.iter().cloned()),
                default_stage: stage.default_stage.clone(),
            })
        });

        Ok(Self::new(
            cache,
            ImagePreprocessor::new(config.max_target_size),
            LabelSet::new(config.class_labels.iter().cloned()),
            stage,
        ))
    }
}

impl<L: AdapterLoader> Classifier<L> {
    /// Creates a classifier over an existing adapter cache.
    pub fn new(
        cache: Arc<AdapterCache<L>>,
        preprocessor: ImagePreprocessor,
        labels: LabelSet,
        stage: Option<StagePolicy>,
    ) -> Self {
        Self {
            cache,
            preprocessor,
            labels,
            stage,
        }
    }

    /// The shared adapter cache.
    pub fn cache(&self) -> &Arc<AdapterCache<L>> {
        &self.cache
    }

    /// Primary class labels.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Stage chaining policy, if enabled.
    pub fn stage(&self) -> Option<&StagePolicy> {
        self.stage.as_ref()
    }
}

impl<L> Classifier<L>
where
    L: AdapterLoader,
    L::Adapter: Predictor,
{
    /// Classifies `image` with the model at `reference`.
    ///
    /// # Errors
    ///
    /// Any failure before the stage step is returned as
    /// [`ClassifierError::Classification`] wrapping the first underlying error.
    pub fn classify(
        &self,
        image: &DynamicImage,
        reference: &str,
        target_size: u32,
    ) -> ClassifierResult<ClassificationResult> {
        self.run(image, reference, target_size).map_err(|e| {
            error!(model = reference, error = %e.detail(), "classification failed");
            ClassifierError::classification(reference, e)
        })
    }

    /// Loads the image at `image_path` and classifies it.
    ///
    /// A missing image is `NotFound` and is returned without the
    /// classification wrapper.
    pub fn classify_path(
        &self,
        image_path: impl AsRef<Path>,
        reference: &str,
        target_size: u32,
    ) -> ClassifierResult<ClassificationResult> {
        let image = load_image(image_path.as_ref())?;
        self.classify(&image, reference, target_size)
    }

    fn run(
        &self,
        image: &DynamicImage,
        reference: &str,
        target_size: u32,
    ) -> ClassifierResult<ClassificationResult> {
        let tensor = self.preprocessor.preprocess(image, target_size)?;
        let adapter = self.cache.get_or_load(reference)?;
        let probabilities = normalize(&adapter.predict(&tensor)?)?;

        let (index, max_prob) = top_class(&probabilities)?;
        let predicted_class = self.labels.label(index);
        let class_probabilities = ClassProbabilities::from_row(probabilities.row(0), &self.labels);
        let predicted_stage = self.predict_stage(&predicted_class, &tensor);

        debug!(
            model = reference,
            predicted_class = %predicted_class,
            max_prob,
            predicted_stage = %predicted_stage,
            "classified image"
        );
        Ok(ClassificationResult {
            max_prob: f64::from(max_prob),
            predicted_class,
            class_probabilities,
            predicted_stage,
        })
    }

    fn predict_stage(&self, predicted_class: &str, tensor: &Tensor4D) -> String {
        let Some(stage) = &self.stage else {
            return DEFAULT_STAGE.to_string();
        };
        if predicted_class != stage.trigger_label {
            return stage.default_stage.clone();
        }

        match self.run_stage(stage, tensor) {
            Ok(predicted) => predicted,
            Err(e) => {
                warn!(
                    model = %stage.artifact,
                    error = %e.detail(),
                    "stage prediction failed, reporting default stage"
                );
                stage.default_stage.clone()
            }
        }
    }

    fn run_stage(&self, stage: &StagePolicy, tensor: &Tensor4D) -> ClassifierResult<String> {
        let adapter = self.cache.get_or_load(&stage.artifact)?;
        let probabilities = normalize(&adapter.predict(tensor)?)?;
        let (index, _) = top_class(&probabilities)?;
        Ok(stage
            .labels
            .get(index)
            .map(str::to_string)
            .unwrap_or_else(|| stage.default_stage.clone()))
    }
}

/// Arg-max of the first row; the first maximum wins ties.
fn top_class(probabilities: &Tensor2D) -> ClassifierResult<(usize, f32)> {
    if probabilities.nrows() == 0 || probabilities.ncols() == 0 {
        return Err(ClassifierError::OutputShape {
            shape: probabilities.shape().to_vec(),
        });
    }
    let row = probabilities.row(0);
    let mut best = (0, row[0]);
    for (index, &p) in row.iter().enumerate().skip(1) {
        if p > best.1 {
            best = (index, p);
        }
    }
    Ok(best)
}
