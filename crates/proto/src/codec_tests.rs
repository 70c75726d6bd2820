// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn encode_returns_json_without_length_prefix() {
    let encoded = encode(&serde_json::json!({"ok": true})).unwrap();
    let json_str = std::str::from_utf8(&encoded).unwrap();
    assert!(json_str.starts_with('{'), "should be a JSON object: {json_str}");
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let original = b"hello world";
    let mut buffer = Vec::new();
    write_message(&mut buffer, original).await.unwrap();
    assert_eq!(buffer.len(), 4 + original.len());

    let mut cursor = std::io::Cursor::new(buffer);
    let read_back = read_message(&mut cursor).await.unwrap();
    assert_eq!(read_back, original);
}

#[tokio::test]
async fn write_message_adds_big_endian_length_prefix() {
    let data = b"test data";
    let mut buffer = Vec::new();
    write_message(&mut buffer, data).await.unwrap();
    let len = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as usize;
    assert_eq!(len, data.len());
    assert_eq!(&buffer[4..], data);
}

#[tokio::test]
async fn oversized_frame_is_rejected_on_read() {
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&(MAX_FRAME_LEN + 1).to_be_bytes());
    let mut cursor = std::io::Cursor::new(buffer);
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::FrameTooLarge(_)));
}

#[tokio::test]
async fn write_read_framed_roundtrips_typed_value() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Thing {
        n: u32,
        s: String,
    }
    let value = Thing { n: 7, s: "x".into() };
    let mut buffer = Vec::new();
    write_framed(&mut buffer, &value).await.unwrap();
    let mut cursor = std::io::Cursor::new(buffer);
    let back: Thing = read_framed(&mut cursor).await.unwrap();
    assert_eq!(back, value);
}
