use super::*;
use crate::core::config::OrtSessionConfig;
use crate::core::inference::test_graphs;

#[test]
fn test_from_config_missing_file_is_load_error() {
    let result = OrtInfer::from_config(&OrtSessionConfig::strict(), "dummy_path.onnx", 1);
    assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
}

#[test]
fn test_from_config_rejects_garbage_graph() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.onnx");
    std::fs::write(&path, b"definitely not a protobuf graph").unwrap();

    for config in [OrtSessionConfig::strict(), OrtSessionConfig::relaxed()] {
        let result = OrtInfer::from_config(&config, &path, 2);
        assert!(matches!(result, Err(ClassifierError::ModelLoad { .. })));
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn sample_input() -> crate::core::Tensor4D {
    crate::core::Tensor4D::from_shape_fn((1, 2, 2, 3), |(_, h, w, c)| (h * 6 + w * 3 + c) as f32)
}

#[test]
fn test_run_replicated_feeds_every_input() {
    let dir = tempfile::tempdir().unwrap();
    let path = test_graphs::write(
        dir.path(),
        "twin.onnx",
        &test_graphs::add_and_identity(&test_graphs::DYNAMIC),
    );
    let infer = OrtInfer::from_config(&OrtSessionConfig::strict(), &path, 2).unwrap();
    assert_eq!(infer.input_names(), names(&["a", "b"]).as_slice());
    assert_eq!(infer.output_names(), names(&["sum", "copy"]).as_slice());
    assert_eq!(infer.model_name(), "twin");

    let x = sample_input();
    let outputs = infer
        .run_replicated(&x, infer.input_names(), infer.output_names())
        .unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].0, "sum");
    assert_eq!(outputs[0].1, x.mapv(|v| v * 2.0).into_dyn());
    assert_eq!(outputs[1].0, "copy");
    assert_eq!(outputs[1].1, x.clone().into_dyn());
}

#[test]
fn test_run_replicated_follows_requested_output_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = test_graphs::write(
        dir.path(),
        "twin.onnx",
        &test_graphs::add_and_identity(&test_graphs::DYNAMIC),
    );
    let infer = OrtInfer::from_config(&OrtSessionConfig::relaxed(), &path, 1).unwrap();

    let x = sample_input();
    let outputs = infer
        .run_replicated(&x, infer.input_names(), &names(&["copy"]))
        .unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].0, "copy");
    assert_eq!(outputs[0].1, x.into_dyn());
}

#[test]
fn test_integer_output_is_read_as_f32() {
    let dir = tempfile::tempdir().unwrap();
    let path = test_graphs::write(
        dir.path(),
        "cast.onnx",
        &test_graphs::cast_to_int64(&test_graphs::DYNAMIC),
    );
    let infer = OrtInfer::from_config(&OrtSessionConfig::strict(), &path, 1).unwrap();

    let x = sample_input();
    let outputs = infer
        .run_replicated(&x, infer.input_names(), infer.output_names())
        .unwrap();
    assert_eq!(outputs[0].0, "y");
    assert_eq!(outputs[0].1, x.into_dyn());
}

#[test]
fn test_shape_mismatch_is_prediction_error() {
    let dir = tempfile::tempdir().unwrap();
    let fixed = [
        test_graphs::Dim::Value(1),
        test_graphs::Dim::Value(2),
        test_graphs::Dim::Value(2),
        test_graphs::Dim::Value(3),
    ];
    let path = test_graphs::write(dir.path(), "fixed.onnx", &test_graphs::add_and_identity(&fixed));
    let infer = OrtInfer::from_config(&OrtSessionConfig::strict(), &path, 1).unwrap();

    let x = crate::core::Tensor4D::zeros((1, 2, 2, 2));
    let err = infer
        .run_replicated(&x, infer.input_names(), infer.output_names())
        .unwrap_err();
    assert!(matches!(err, ClassifierError::Prediction { .. }));
}
