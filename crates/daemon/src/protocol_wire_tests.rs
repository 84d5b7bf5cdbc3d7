use super::*;

#[test]
fn encode_decode_roundtrip() {
    let req = Request::Start { profile: "email".to_string() };
    let bytes = encode(&req).unwrap();
    let decoded: Request = decode(&bytes).unwrap();
    assert!(matches!(decoded, Request::Start { profile } if profile == "email"));
}

#[test]
fn encode_rejects_oversized_message() {
    // A message larger than MAX_MESSAGE_SIZE should never reach the wire.
    let huge = "x".repeat(MAX_MESSAGE_SIZE + 1);
    let req = Request::ProfileChanged {
        profile: huge,
        kind: syncd_core::ProfileChangeKind::Added,
    };
    let err = encode(&req).unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}

#[tokio::test]
async fn read_write_message_roundtrip() {
    let mut buf = Vec::new();
    write_message(&mut buf, b"hello").await.unwrap();

    let mut cursor = std::io::Cursor::new(buf);
    let got = read_message(&mut cursor).await.unwrap();
    assert_eq!(got, b"hello");
}

#[tokio::test]
async fn read_message_on_empty_stream_is_connection_closed() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_message(&mut cursor).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn read_request_times_out_on_stalled_stream() {
    let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
    let err = read_request(&mut cursor, std::time::Duration::from_millis(10)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout));
}

#[tokio::test]
async fn write_response_roundtrips_through_read_message() {
    let mut buf = Vec::new();
    write_response(&mut buf, &Response::Pong, DEFAULT_TIMEOUT).await.unwrap();

    let mut cursor = std::io::Cursor::new(buf);
    let bytes = read_message(&mut cursor).await.unwrap();
    let decoded: Response = decode(&bytes).unwrap();
    assert!(matches!(decoded, Response::Pong));
}
