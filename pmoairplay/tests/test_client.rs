use pmoairplay::{AirplayClient, AirplayCommand, AirplayError};
use pmodevices::DeviceRegistry;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Requête reçue par le faux récepteur.
struct Captured {
    request_line: String,
    headers: Vec<(String, String)>,
    body: String,
}

impl Captured {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Faux récepteur : accepte une connexion, lit la requête et répond `response`.
fn fake_receiver(response: &'static str) -> (u16, mpsc::Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((k, v)) = line.split_once(':') {
                headers.push((k.trim().to_string(), v.trim().to_string()));
            }
        }

        let length = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
            .map(|(_, v)| v.parse::<usize>().unwrap())
            .unwrap_or(0);
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).unwrap();

        let mut stream = stream;
        stream.write_all(response.as_bytes()).unwrap();
        stream.flush().unwrap();

        tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            headers,
            body: String::from_utf8(body).unwrap(),
        })
        .unwrap();
    });

    (port, rx)
}

const OK_EMPTY: &str = "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

fn client_for(id: u32, port: u16) -> AirplayClient {
    let registry = Arc::new(DeviceRegistry::new());
    registry.add_receiver(id, "127.0.0.1", port);
    AirplayClient::new(registry, Duration::from_secs(2))
}

#[test]
fn test_unknown_device_never_reaches_network() {
    let client = AirplayClient::new(Arc::new(DeviceRegistry::new()), Duration::from_secs(1));

    for command in [
        AirplayCommand::Stop,
        AirplayCommand::Scrub { position: 1.0 },
        AirplayCommand::RateChange { rate: 1.0 },
        AirplayCommand::PlaybackStatus,
    ] {
        let err = client.send(42, &command).unwrap_err();
        assert!(matches!(err, AirplayError::UnknownDevice(42)));
        assert!(err.to_string().contains("42"));
    }
}

#[test]
fn test_scrub_request_shape() {
    let (port, rx) = fake_receiver(OK_EMPTY);
    let client = client_for(7, port);

    let response = client.scrub(7, 42.5).unwrap();
    assert!(response.is_success());

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.request_line, "POST /scrub HTTP/1.1");
    assert_eq!(captured.body, "position: 42.5\n");
    assert_eq!(captured.header("Content-Type"), Some("text/parameters"));
    assert_eq!(captured.header("User-Agent"), Some("MediaControl/1.0"));
    assert_eq!(captured.header("Content-Length"), Some("15"));
}

#[test]
fn test_play_request_shape() {
    let (port, rx) = fake_receiver(OK_EMPTY);
    let client = client_for(1, port);

    client.play(1, "http://10.0.0.2:8080/content/abc", 0.25).unwrap();

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.request_line, "POST /play HTTP/1.1");
    assert_eq!(
        captured.body,
        "Content-Location: http://10.0.0.2:8080/content/abc\nStart-Position: 0.25\n"
    );
}

#[test]
fn test_pause_sets_rate_zero() {
    let (port, rx) = fake_receiver(OK_EMPTY);
    let client = client_for(1, port);

    client.pause(1).unwrap();
    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.request_line, "POST /rate?value=0.0 HTTP/1.1");
}

#[test]
fn test_status_decodes_parameters() {
    let (port, rx) = fake_receiver(
        "HTTP/1.1 200 OK\r\nContent-Type: text/parameters\r\nContent-Length: 40\r\nConnection: close\r\n\r\nduration: 83.124794\nposition: 14.467000\n",
    );
    let client = client_for(3, port);

    let status = client.status(3).unwrap();
    assert_eq!(status.duration, 83.124794);
    assert_eq!(status.position, 14.467);

    let captured = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(captured.request_line, "GET /scrub HTTP/1.1");
}

#[test]
fn test_error_status_is_returned_raw() {
    let (port, _rx) = fake_receiver(
        "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
    );
    let client = client_for(4, port);

    let response = client.stop(4).unwrap();
    assert_eq!(response.status, 404);
    assert!(!response.is_success());
}

#[test]
fn test_connection_refused_is_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(5, port);

    let err = client.stop(5).unwrap_err();
    assert!(err.is_network());
}

#[test]
fn test_silent_receiver_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let holder = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(2));
        drop(stream);
    });

    let registry = Arc::new(DeviceRegistry::new());
    registry.add_receiver(6, "127.0.0.1", port);
    let client = AirplayClient::new(registry, Duration::from_millis(300));

    let started = Instant::now();
    let err = client.stop(6).unwrap_err();
    assert!(err.is_network());
    assert!(started.elapsed() < Duration::from_secs(2));

    holder.join().unwrap();
}
