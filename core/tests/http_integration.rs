/*
 * http_integration.rs
 * Copyright (C) 2026 Chris Burdess
 *
 * This file is part of openml-client, a synchronized client for the OpenML REST API.
 *
 * openml-client is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * openml-client is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with openml-client.  If not, see <http://www.gnu.org/licenses/>.
 */

//! End-to-end tests: `Connection` over real sockets against a local HTTP/1.1 server thread,
//! a concurrency check through a recording transport, and an ignored test against the
//! public OpenML test server.

use std::collections::HashSet;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use openml_core::protocol::http::decode_query;
use openml_core::{ClientError, Connection, ConnectionConfig, Endpoint, Params, PlainTransport, Reply, Transport};
use serde_json::{json, Value};

struct Request {
    method: String,
    target: String,
    body: Vec<u8>,
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<Request> {
    let mut line = String::new();
    if reader.read_line(&mut line).ok()? == 0 {
        return None;
    }
    let mut parts = line.trim_end().splitn(3, ' ');
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();
    let mut content_length = 0usize;
    loop {
        line.clear();
        reader.read_line(&mut line).ok()?;
        let header = line.trim_end();
        if header.is_empty() {
            break;
        }
        let (name, value) = header.split_once(':')?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value.trim().parse().ok()?;
        }
    }
    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).ok()?;
    Some(Request { method, target, body })
}

fn respond(stream: &mut TcpStream, request: &Request) -> io::Result<bool> {
    let path = request.target.split('?').next().unwrap_or("");
    if path.ends_with("/missing") {
        let body = json!({"error": {"code": "111", "message": "Unknown dataset"}}).to_string();
        write!(stream, "HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}", body.len(), body)?;
        return Ok(true);
    }
    if path.ends_with("/chunked") {
        stream.write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n7\r\n{\"chunk\r\n9\r\ned\":true}\r\n0\r\n\r\n")?;
        return Ok(true);
    }
    let body = json!({
        "method": request.method,
        "target": request.target,
        "body": String::from_utf8_lossy(&request.body),
    })
    .to_string();
    let close = path.ends_with("/close");
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n{}Content-Length: {}\r\n\r\n{}",
        if close { "Connection: close\r\n" } else { "" },
        body.len(),
        body
    )?;
    Ok(!close)
}

/// Serve keep-alive connections one at a time; returns the port and the accept counter.
fn start_server() -> (u16, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepts = Arc::new(AtomicUsize::new(0));
    let counter = accepts.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            counter.fetch_add(1, Ordering::SeqCst);
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            while let Some(request) = read_request(&mut reader) {
                match respond(&mut stream, &request) {
                    Ok(true) => {}
                    _ => break,
                }
            }
        }
    });
    (port, accepts)
}

fn local_connection(port: u16) -> Connection {
    let config = ConnectionConfig::default().with_endpoint(Endpoint::new("127.0.0.1", port, "/api/v1/json"));
    Connection::with_transport(config, Box::new(PlainTransport::new()))
}

fn echoed(reply: Reply) -> Value {
    match reply {
        Reply::Json(v) => v,
        other => panic!("expected JSON reply, got {:?}", other),
    }
}

#[test]
fn get_post_del_over_one_keep_alive_socket() {
    let (port, accepts) = start_server();
    let conn = local_connection(port);
    conn.set_key(Some("test-key".to_string()));

    let params = Params::new().with("tag", "a b&c").with("limit", "5").with("name", "über");
    let v = echoed(conn.get("/data/list", &params).unwrap());
    assert_eq!(v["method"], "GET");
    let target = v["target"].as_str().unwrap();
    let (path, query) = target.split_once('?').unwrap();
    assert_eq!(path, "/api/v1/json/data/list");
    let mut expected: Vec<(String, String)> = params.clone().into_iter().collect();
    expected.push(("api_key".to_string(), "test-key".to_string()));
    assert_eq!(decode_query(query), expected);

    let v = echoed(conn.post("/data/tag", &Params::new().with("data_id", "61").with("tag", "iris")).unwrap());
    assert_eq!(v["method"], "POST");
    assert_eq!(v["target"], "/api/v1/json/data/tag");
    assert_eq!(v["body"], "data_id=61&tag=iris&api_key=test-key");

    let v = echoed(conn.del("/data/61", &Params::new()).unwrap());
    assert_eq!(v["method"], "DELETE");
    assert_eq!(v["target"], "/api/v1/json/data/61?api_key=test-key");

    assert_eq!(accepts.load(Ordering::SeqCst), 1);
    assert!(conn.is_connected());
}

#[test]
fn multipart_upload_reaches_server() {
    let (port, _) = start_server();
    let conn = local_connection(port);
    let params = Params::new()
        .with("description|text/xml|run.xml", "<oml:run/>")
        .with("predictions|text/plain", "row,prediction\n0,1\n");
    let v = echoed(conn.post("/run", &params).unwrap());
    let body = v["body"].as_str().unwrap();
    assert!(body.contains("Content-Disposition: form-data; name=\"description\"; filename=\"run.xml\"\r\nContent-Type: text/xml\r\n\r\n<oml:run/>\r\n"));
    assert!(body.contains("name=\"predictions\"; filename=\"predictions\"\r\nContent-Type: text/plain\r\n\r\nrow,prediction\n0,1\n\r\n"));
    assert!(body.trim_end().ends_with("--"));
}

#[test]
fn http_error_status_is_reply_not_error() {
    let (port, _) = start_server();
    let conn = local_connection(port);
    let reply = conn.post("/data/missing", &Params::new()).unwrap();
    assert_eq!(reply, Reply::Status(404));
    // connection still usable after an HTTP-level failure
    assert!(conn.get("/data/list", &Params::new()).unwrap().json().is_some());
}

#[test]
fn chunked_response_decoded() {
    let (port, _) = start_server();
    let conn = local_connection(port);
    assert_eq!(conn.get("/chunked", &Params::new()).unwrap(), Reply::Json(json!({"chunked": true})));
}

#[test]
fn server_close_forces_reconnect() {
    let (port, accepts) = start_server();
    let conn = local_connection(port);
    echoed(conn.get("/close", &Params::new()).unwrap());
    assert!(!conn.is_connected());
    echoed(conn.get("/data/list", &Params::new()).unwrap());
    assert_eq!(accepts.load(Ordering::SeqCst), 2);
}

#[test]
fn refused_connection_is_not_connected_reply() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let conn = local_connection(port);
    assert_eq!(conn.get("/data/list", &Params::new()).unwrap(), Reply::NotConnected);
    assert_eq!(conn.get("/data/list", &Params::new()).unwrap().into_json(), Value::Null);
}

#[test]
fn truncated_response_surfaces_io_error() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut stream = stream;
        read_request(&mut reader).unwrap();
        stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n{\"partial\"").unwrap();
    });
    let conn = local_connection(port);
    match conn.get("/data/list", &Params::new()) {
        Err(ClientError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("expected UnexpectedEof, got {:?}", other),
    }
    assert!(!conn.is_connected());
}

/// Shared transport that writes in small slices, yielding between them, and answers each
/// request with a fixed JSON response.
struct Recording {
    wire: Arc<Mutex<Vec<u8>>>,
    pending: Vec<u8>,
    connected: bool,
}

const CANNED: &[u8] = b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n\r\n{\"ok\":true}";

impl Transport for Recording {
    fn connect(&mut self, _host: &str, _port: u16) -> io::Result<()> {
        self.connected = true;
        Ok(())
    }
    fn is_connected(&self) -> bool {
        self.connected
    }
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        for piece in data.chunks(7) {
            self.wire.lock().unwrap().extend_from_slice(piece);
            thread::yield_now();
        }
        Ok(())
    }
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            self.pending = CANNED.to_vec();
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
    fn close(&mut self) {
        self.connected = false;
    }
}

#[test]
fn concurrent_posts_never_interleave_on_the_wire() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 25;

    let wire = Arc::new(Mutex::new(Vec::new()));
    let transport = Recording {
        wire: wire.clone(),
        pending: Vec::new(),
        connected: false,
    };
    let config = ConnectionConfig::default().with_endpoint(Endpoint::new("openml.test", 443, "/api/v1/json"));
    let conn = Connection::with_transport(config, Box::new(transport));

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let conn = &conn;
            scope.spawn(move || {
                for seq in 0..PER_THREAD {
                    let params = Params::new()
                        .with("worker", worker.to_string())
                        .with("seq", seq.to_string());
                    let reply = conn.post("/run", &params).unwrap();
                    assert_eq!(reply, Reply::Json(json!({"ok": true})));
                }
            });
        }
    });

    // The wire must split cleanly into whole requests, each framed by its own Content-Length.
    let wire = wire.lock().unwrap();
    let mut rest: &[u8] = &wire;
    let mut bodies = HashSet::new();
    while !rest.is_empty() {
        let head_end = rest.windows(4).position(|w| w == b"\r\n\r\n").expect("complete head");
        let head = std::str::from_utf8(&rest[..head_end]).unwrap();
        assert!(head.starts_with("POST /api/v1/json/run HTTP/1.1\r\n"), "interleaved head: {:?}", head);
        let length: usize = head
            .lines()
            .find_map(|l| l.strip_prefix("Content-Length: "))
            .expect("Content-Length")
            .parse()
            .unwrap();
        let body = &rest[head_end + 4..head_end + 4 + length];
        let body = std::str::from_utf8(body).unwrap().to_string();
        assert!(body.starts_with("worker="), "interleaved body: {:?}", body);
        assert!(bodies.insert(body), "duplicate request on the wire");
        rest = &rest[head_end + 4 + length..];
    }
    assert_eq!(bodies.len(), THREADS * PER_THREAD);
}

#[test]
#[ignore] // requires network; run with: cargo test --test http_integration -- --ignored --nocapture
fn test_server_data_description() {
    let conn = Connection::new();
    conn.enable_test_mode();
    let reply = conn.get("/data/61", &Params::new()).unwrap();
    println!("reply: {:?}", reply);
    let value = reply.json().expect("JSON reply from test server");
    assert!(value.get("data_set_description").is_some());
}
