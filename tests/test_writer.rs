use bytes::BytesMut;
use gridline::http::io::HeaderLimits;
use gridline::http::parser::{read_request_head, read_response_head};
use gridline::http::request::{Method, Protocol, RequestHead};
use gridline::http::response::{ResponseHead, StatusCode};
use gridline::http::writer::{
    encode_request_head, encode_response_head, request_segments, response_segments,
    segment_count, write_request_head, write_response_head,
};

#[test]
fn test_segment_count_formula() {
    assert_eq!(segment_count(2, 0), 3);
    assert_eq!(segment_count(3, 0), 4);
    assert_eq!(segment_count(2, 3), 15);
}

#[test]
fn test_response_segments_per_field() {
    let mut head = ResponseHead::new(StatusCode::Ok);
    head.set_content_type("application/json");
    head.set_content_length(2);

    let segments = response_segments(&head);

    assert_eq!(segments.len(), 2 + 4 * 2 + 1);
    assert_eq!(&*segments[0], b"HTTP/1.1 ");
    assert_eq!(&*segments[1], b"200 OK\r\n");
    assert_eq!(&*segments[segments.len() - 1], b"\r\n");
}

#[test]
fn test_request_segments_tokens() {
    let head = RequestHead::builder()
        .method(Method::PATCH)
        .url("/api")
        .build();

    let segments = request_segments(&head);

    assert_eq!(segments.len(), 4);
    assert_eq!(&*segments[0], b"PATCH ");
    assert_eq!(&*segments[1], b"/api");
    assert_eq!(&*segments[2], b" HTTP/1.1\r\n");
}

#[test]
fn test_encode_fields_exactly_once() {
    let mut head = ResponseHead::new(StatusCode::Ok);
    head.fields.insert("A".to_string(), "1".to_string());
    head.fields.insert("B".to_string(), "2".to_string());

    let text = String::from_utf8(encode_response_head(&head)).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(text.ends_with("\r\n\r\n"));
    assert_eq!(text.matches("A: 1\r\n").count(), 1);
    assert_eq!(text.matches("B: 2\r\n").count(), 1);
    assert_eq!(text.len(), "HTTP/1.1 200 OK\r\nA: 1\r\nB: 2\r\n\r\n".len());
}

#[test]
fn test_unnamed_status_encodes_as_not_implemented() {
    let head = ResponseHead::new(StatusCode::Other(302));

    assert_eq!(encode_response_head(&head), b"HTTP/1.1 501 Not Implemented\r\n\r\n");
    // the stored value is untouched
    assert_eq!(head.status.as_u16(), 302);
}

#[test]
fn test_http10_response() {
    let mut head = ResponseHead::new(StatusCode::BadRequest);
    head.protocol = Protocol::Http10;

    assert_eq!(encode_response_head(&head), b"HTTP/1.0 400 Bad Request\r\n\r\n");
}

#[tokio::test]
async fn test_request_round_trip() {
    let original = RequestHead::builder()
        .method(Method::PUT)
        .url("/api/v1/prosumers/42?full=1")
        .protocol(Protocol::Http10)
        .field("Host", "hub.local:3000")
        .field("Content-Type", "application/json")
        .field("X-Empty", "")
        .build();

    let mut wire = Vec::new();
    let written = write_request_head(&mut wire, &original).await.unwrap();
    assert_eq!(written, wire.len());
    assert_eq!(wire, encode_request_head(&original));

    let mut input: &[u8] = &wire;
    let mut buf = BytesMut::new();
    let decoded = read_request_head(&mut input, &mut buf, HeaderLimits::default()).await.unwrap();

    assert_eq!(decoded, original);
}

#[tokio::test]
async fn test_response_round_trip() {
    let mut original = ResponseHead::new(StatusCode::NotFound);
    original.protocol = Protocol::Http10;
    original.set_content_length(9);
    original.set_content_type("text/plain; charset=utf-8");

    let mut wire = Vec::new();
    write_response_head(&mut wire, &original).await.unwrap();

    let mut input: &[u8] = &wire;
    let mut buf = BytesMut::new();
    let decoded = read_response_head(&mut input, &mut buf, HeaderLimits::default()).await.unwrap();

    assert_eq!(decoded, original);
}
