//! Small ONNX graphs written as raw protobuf for tests.
//!
//! Only the handful of `ModelProto` fields the graphs below need are encoded.

use std::path::{Path, PathBuf};

const VARINT: u32 = 0;
const LEN: u32 = 2;

const ELEM_FLOAT: u64 = 1;
const ELEM_INT64: u64 = 7;
const ATTR_INT: u64 = 2;

/// One tensor dimension of a declared graph input or output.
#[derive(Debug, Clone, Copy)]
pub enum Dim {
    Param(&'static str),
    Value(i64),
}

/// NHWC with every axis symbolic.
pub const DYNAMIC: [Dim; 4] = [
    Dim::Param("n"),
    Dim::Param("h"),
    Dim::Param("w"),
    Dim::Param("c"),
];

#[derive(Default)]
struct Message(Vec<u8>);

impl Message {
    fn key(&mut self, field: u32, wire_type: u32) {
        push_varint(&mut self.0, u64::from((field << 3) | wire_type));
    }

    fn varint(mut self, field: u32, value: u64) -> Self {
        self.key(field, VARINT);
        push_varint(&mut self.0, value);
        self
    }

    fn bytes(mut self, field: u32, value: &[u8]) -> Self {
        self.key(field, LEN);
        push_varint(&mut self.0, value.len() as u64);
        self.0.extend_from_slice(value);
        self
    }

    fn string(self, field: u32, value: &str) -> Self {
        self.bytes(field, value.as_bytes())
    }

    fn message(self, field: u32, value: Message) -> Self {
        self.bytes(field, &value.0)
    }
}

fn push_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

fn value_info(name: &str, elem_type: u64, dims: &[Dim]) -> Message {
    let shape = dims.iter().fold(Message::default(), |shape, dim| {
        let dim = match *dim {
            Dim::Value(v) => Message::default().varint(1, v as u64),
            Dim::Param(p) => Message::default().string(2, p),
        };
        shape.message(1, dim)
    });
    let tensor = Message::default().varint(1, elem_type).message(2, shape);
    Message::default()
        .string(1, name)
        .message(2, Message::default().message(1, tensor))
}

fn node(op_type: &str, inputs: &[&str], outputs: &[&str]) -> Message {
    let node = inputs
        .iter()
        .fold(Message::default(), |node, name| node.string(1, name));
    let node = outputs.iter().fold(node, |node, name| node.string(2, name));
    node.string(3, &format!("{op_type}_0")).string(4, op_type)
}

fn model(graph: Message) -> Vec<u8> {
    Message::default()
        .varint(1, 8)
        .message(7, graph)
        .message(8, Message::default().varint(2, 13))
        .0
}

/// Inputs `a` and `b`, outputs `sum = a + b` then `copy = a`, all `float`.
pub fn add_and_identity(dims: &[Dim]) -> Vec<u8> {
    let graph = Message::default()
        .message(1, node("Add", &["a", "b"], &["sum"]))
        .message(1, node("Identity", &["a"], &["copy"]))
        .string(2, "add_and_identity")
        .message(11, value_info("a", ELEM_FLOAT, dims))
        .message(11, value_info("b", ELEM_FLOAT, dims))
        .message(12, value_info("sum", ELEM_FLOAT, dims))
        .message(12, value_info("copy", ELEM_FLOAT, dims));
    model(graph)
}

/// Input `x` (`float`), output `y = Cast<int64>(x)`.
pub fn cast_to_int64(dims: &[Dim]) -> Vec<u8> {
    let to = Message::default()
        .string(1, "to")
        .varint(3, ELEM_INT64)
        .varint(20, ATTR_INT);
    let graph = Message::default()
        .message(1, node("Cast", &["x"], &["y"]).message(5, to))
        .string(2, "cast_to_int64")
        .message(11, value_info("x", ELEM_FLOAT, dims))
        .message(12, value_info("y", ELEM_INT64, dims));
    model(graph)
}

/// Writes `bytes` to `dir/name` and returns the path.
pub fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn test_varint_encoding() {
    let mut buf = Vec::new();
    push_varint(&mut buf, 1);
    push_varint(&mut buf, 300);
    assert_eq!(buf, vec![0x01, 0xac, 0x02]);
}
