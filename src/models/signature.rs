//! Signature-based adapter: a directory bundle of named graph entry points.
//!
//! A bundle is a directory holding one or more ONNX graphs. Its signatures are
//! declared in an optional `signatures.json`:
//!
//! ```json
//! {
//!   "signatures": [
//!     { "name": "serving_default", "graph": "model.onnx",
//!       "inputs": ["input_1"], "outputs": ["predictions"] }
//!   ]
//! }
//! ```
//!
//! `inputs` and `outputs` may be omitted, in which case the graph's declared
//! inputs and outputs are used. Without a manifest, every `*.onnx` file in the
//! directory becomes a signature named after its file stem, in file-name order.

use crate::core::config::OrtSessionConfig;
use crate::core::inference::OrtInfer;
use crate::core::tensor::RawOutput;
use crate::core::{ClassifierError, Tensor4D};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// Manifest file name inside a bundle directory.
pub const MANIFEST_FILE: &str = "signatures.json";

/// Signature selected when present.
pub const DEFAULT_SIGNATURE: &str = "serving_default";

/// One entry point of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureSpec {
    /// Signature name.
    pub name: String,
    /// Graph file, relative to the bundle directory.
    pub graph: PathBuf,
    /// Input names to feed; empty means every declared graph input.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Output names in mapping order; empty means the graph's declared order.
    #[serde(default)]
    pub outputs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SignatureManifest {
    signatures: Vec<SignatureSpec>,
}

/// Lists the signatures of the bundle at `dir`.
pub fn discover_signatures(dir: &Path) -> Result<Vec<SignatureSpec>, ClassifierError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let signatures = if manifest_path.is_file() {
        let text = std::fs::read_to_string(&manifest_path)?;
        let manifest: SignatureManifest = serde_json::from_str(&text)?;
        debug!(manifest = %manifest_path.display(), count = manifest.signatures.len(), "read signature manifest");
        manifest.signatures
    } else {
        let mut graphs: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|ext| ext.to_str())
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("onnx"))
            })
            .collect();
        graphs.sort();
        graphs
            .into_iter()
            .filter_map(|path| {
                let name = path.file_stem()?.to_str()?.to_string();
                let graph = PathBuf::from(path.file_name()?);
                Some(SignatureSpec {
                    name,
                    graph,
                    inputs: Vec::new(),
                    outputs: Vec::new(),
                })
            })
            .collect()
    };

    if signatures.is_empty() {
        return Err(ClassifierError::model_load_error(
            dir,
            "bundle declares no signatures",
            None::<ClassifierError>,
        ));
    }
    if let Some(bad) = signatures
        .iter()
        .find(|s| !s.graph.components().all(|c| matches!(c, Component::Normal(_))))
    {
        return Err(ClassifierError::model_load_error(
            dir,
            format!(
                "signature '{}' points outside the bundle: {}",
                bad.name,
                bad.graph.display()
            ),
            None::<ClassifierError>,
        ));
    }
    Ok(signatures)
}

/// Picks `serving_default` if declared, otherwise the first signature.
pub fn select_signature(signatures: &[SignatureSpec]) -> Option<&SignatureSpec> {
    signatures
        .iter()
        .find(|s| s.name == DEFAULT_SIGNATURE)
        .or_else(|| signatures.first())
}

/// Adapter over the selected signature of a bundle directory.
#[derive(Debug)]
pub struct SignatureGraphAdapter {
    inference: OrtInfer,
    signature: String,
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl SignatureGraphAdapter {
    /// Loads the bundle at `dir`, selecting its serving signature.
    pub fn load(
        dir: impl AsRef<Path>,
        options: &OrtSessionConfig,
        session_pool_size: usize,
    ) -> Result<Self, ClassifierError> {
        let dir = dir.as_ref();
        let signatures = discover_signatures(dir)?;
        let spec = select_signature(&signatures)
            .ok_or_else(|| {
                ClassifierError::model_load_error(dir, "no signature", None::<ClassifierError>)
            })?
            .clone();

        let inference = OrtInfer::from_config(options, dir.join(&spec.graph), session_pool_size)?;
        let inputs = resolve_names(dir, &spec, "input", &spec.inputs, inference.input_names())?;
        let outputs = resolve_names(dir, &spec, "output", &spec.outputs, inference.output_names())?;

        info!(
            model = %dir.display(),
            signature = %spec.name,
            inputs = ?inputs,
            outputs = ?outputs,
            "signature bundle loaded"
        );
        Ok(Self {
            inference,
            signature: spec.name,
            inputs,
            outputs,
        })
    }

    /// Name of the selected signature.
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Inputs fed on every call.
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    /// Name of the loaded model.
    pub fn model_name(&self) -> &str {
        self.inference.model_name()
    }

    pub(crate) fn predict(&self, x: &Tensor4D) -> Result<RawOutput, ClassifierError> {
        let outputs = self.inference.run_replicated(x, &self.inputs, &self.outputs)?;
        let (_, first) = outputs.into_iter().next().ok_or_else(|| {
            ClassifierError::prediction_error(
                self.inference.model_name(),
                format!("signature '{}' produced no outputs", self.signature),
                crate::core::errors::SimpleError::new("empty output mapping"),
            )
        })?;
        Ok(RawOutput::Single(first))
    }
}

/// Uses the manifest's names when given, checking them against the graph.
fn resolve_names(
    dir: &Path,
    spec: &SignatureSpec,
    what: &str,
    declared: &[String],
    graph: &[String],
) -> Result<Vec<String>, ClassifierError> {
    if declared.is_empty() {
        return Ok(graph.to_vec());
    }
    if let Some(unknown) = declared.iter().find(|name| !graph.contains(name)) {
        return Err(ClassifierError::model_load_error(
            dir,
            format!(
                "signature '{}' names {what} '{unknown}' which the graph does not declare (graph has {graph:?})",
                spec.name
            ),
            None::<ClassifierError>,
        ));
    }
    Ok(declared.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::test_graphs;

    fn spec(name: &str) -> SignatureSpec {
        SignatureSpec {
            name: name.to_string(),
            graph: PathBuf::from(format!("{name}.onnx")),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[test]
    fn test_select_prefers_serving_default() {
        let signatures = vec![spec("predict"), spec("serving_default"), spec("embed")];
        assert_eq!(select_signature(&signatures).unwrap().name, "serving_default");
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let signatures = vec![spec("predict"), spec("embed")];
        assert_eq!(select_signature(&signatures).unwrap().name, "predict");
        assert!(select_signature(&[]).is_none());
    }

    #[test]
    fn test_discover_reads_manifest_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"signatures": [
                {"name": "embed", "graph": "embed.onnx"},
                {"name": "serving_default", "graph": "cls.onnx", "inputs": ["a", "b"], "outputs": ["probs"]}
            ]}"#,
        )
        .unwrap();

        let signatures = discover_signatures(dir.path()).unwrap();
        assert_eq!(signatures.len(), 2);
        assert_eq!(signatures[0].name, "embed");
        assert!(signatures[0].inputs.is_empty());
        assert_eq!(signatures[1].inputs, vec!["a", "b"]);
        assert_eq!(signatures[1].outputs, vec!["probs"]);
    }

    #[test]
    fn test_discover_without_manifest_uses_graph_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_model.onnx"), b"x").unwrap();
        std::fs::write(dir.path().join("a_model.ONNX"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let signatures = discover_signatures(dir.path()).unwrap();
        let names: Vec<_> = signatures.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a_model", "b_model"]);
        assert_eq!(signatures[0].graph, PathBuf::from("a_model.ONNX"));
    }

    #[test]
    fn test_empty_bundle_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover_signatures(dir.path()).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }

    #[test]
    fn test_manifest_graph_must_stay_in_bundle() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"signatures": [{"name": "serving_default", "graph": "../other/model.onnx"}]}"#,
        )
        .unwrap();
        let err = discover_signatures(dir.path()).unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }

    #[test]
    fn test_resolve_names_checks_graph() {
        let dir = Path::new("bundle");
        let graph = vec!["x".to_string(), "y".to_string()];
        let s = spec("serving_default");

        assert_eq!(resolve_names(dir, &s, "input", &[], &graph).unwrap(), graph);
        assert_eq!(
            resolve_names(dir, &s, "input", &["y".to_string()], &graph).unwrap(),
            vec!["y"]
        );
        assert!(resolve_names(dir, &s, "input", &["z".to_string()], &graph).is_err());
    }

    #[test]
    fn test_load_with_unreadable_graph_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("serving_default.onnx"), b"not a graph").unwrap();
        let err = SignatureGraphAdapter::load(dir.path(), &OrtSessionConfig::strict(), 1)
            .unwrap_err();
        assert!(matches!(err, ClassifierError::ModelLoad { .. }));
    }

    #[test]
    fn test_bundle_without_manifest_returns_first_output() {
        let dir = tempfile::tempdir().unwrap();
        test_graphs::write(
            dir.path(),
            "serving_default.onnx",
            &test_graphs::add_and_identity(&test_graphs::DYNAMIC),
        );
        let adapter = SignatureGraphAdapter::load(dir.path(), &OrtSessionConfig::strict(), 1)
            .unwrap();
        assert_eq!(adapter.signature(), DEFAULT_SIGNATURE);
        assert_eq!(adapter.inputs(), ["a", "b"]);

        let x = Tensor4D::from_elem((1, 2, 2, 3), 1.5);
        let output = adapter.predict(&x).unwrap();
        assert_eq!(
            output,
            RawOutput::Single(Tensor4D::from_elem((1, 2, 2, 3), 3.0).into_dyn())
        );
    }

    #[test]
    fn test_manifest_outputs_set_mapping_order() {
        let dir = tempfile::tempdir().unwrap();
        test_graphs::write(
            dir.path(),
            "model.onnx",
            &test_graphs::add_and_identity(&test_graphs::DYNAMIC),
        );
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"signatures": [{"name": "serving_default", "graph": "model.onnx", "outputs": ["copy", "sum"]}]}"#,
        )
        .unwrap();
        let adapter = SignatureGraphAdapter::load(dir.path(), &OrtSessionConfig::strict(), 1)
            .unwrap();

        let x = Tensor4D::from_elem((1, 2, 2, 3), 1.5);
        assert_eq!(adapter.predict(&x).unwrap(), RawOutput::Single(x.into_dyn()));
    }
}
