//! Local HTTP and FTP fixtures shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use stager_assets::{Config, FtpConfig, TransportConfig};
use tiny_http::{Response, Server, StatusCode};
use zip::write::SimpleFileOptions;

/// Build a zip at `path` from `(name, content)` pairs
pub fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap();
}

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.zip");
    write_zip(&path, entries);
    std::fs::read(path).unwrap()
}

/// Transport settings that never route through a system proxy
pub fn local_transport() -> TransportConfig {
    TransportConfig::new().without_system_proxy()
}

pub fn config_in(root: &Path) -> Config {
    Config::new(root.join("root"), root.join("cache"))
}

// ============ HTTP ============

#[derive(Clone)]
enum Route {
    /// Served with a Content-Length header
    Sized(Vec<u8>),
    /// Served without a length
    Chunked(Vec<u8>),
    Status(u16),
}

#[derive(Default)]
pub struct HttpFixtureBuilder {
    routes: HashMap<String, Route>,
}

impl HttpFixtureBuilder {
    pub fn sized(mut self, path: &str, body: &[u8]) -> Self {
        self.routes.insert(path.to_string(), Route::Sized(body.to_vec()));
        self
    }

    pub fn without_length(mut self, path: &str, body: &[u8]) -> Self {
        self.routes.insert(path.to_string(), Route::Chunked(body.to_vec()));
        self
    }

    pub fn status(mut self, path: &str, status: u16) -> Self {
        self.routes.insert(path.to_string(), Route::Status(status));
        self
    }

    pub fn start(self) -> HttpFixture {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let routes = self.routes;

        let counter = Arc::clone(&hits);
        thread::spawn(move || {
            for request in server.incoming_requests() {
                counter.fetch_add(1, Ordering::SeqCst);
                let route = routes.get(request.url()).cloned();
                let _ = match route {
                    Some(Route::Sized(body)) => request.respond(Response::from_data(body)),
                    Some(Route::Chunked(body)) => request.respond(Response::new(
                        StatusCode(200),
                        vec![],
                        Cursor::new(body),
                        None,
                        None,
                    )),
                    Some(Route::Status(code)) => {
                        request.respond(Response::from_string("error").with_status_code(code))
                    }
                    None => request.respond(Response::from_string("not found").with_status_code(404)),
                };
            }
        });

        HttpFixture { addr, hits }
    }
}

pub struct HttpFixture {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl HttpFixture {
    pub fn builder() -> HttpFixtureBuilder {
        HttpFixtureBuilder::default()
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Announces `announced` bytes, sends `sent`, then hangs up
pub fn truncating_http_server(announced: usize, sent: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap_or(0) > 0 {
                if line == "\r\n" {
                    break;
                }
                line.clear();
            }
            let header = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                announced
            );
            let _ = stream.write_all(header.as_bytes());
            let _ = stream.write_all(sent);
        }
    });

    format!("http://{}/broken.zip", addr)
}

// ============ FTP ============

/// Minimal passive-mode FTP server
pub struct FtpFixture {
    addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
pub struct FtpFixtureBuilder {
    user: String,
    pass: String,
    files: HashMap<String, Vec<u8>>,
    /// `SIZE` answers that differ from the stored content
    announced_sizes: HashMap<String, usize>,
    listings: HashMap<String, Vec<String>>,
    supports_size: bool,
    /// Reply to a finished transfer with this line instead of `226`
    completion: String,
}

impl FtpFixtureBuilder {
    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    /// Serve `content` at `path` but answer `SIZE` with `announced`
    pub fn short_file(mut self, path: &str, content: &[u8], announced: usize) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self.announced_sizes.insert(path.to_string(), announced);
        self
    }

    pub fn listing(mut self, path: &str, lines: &[&str]) -> Self {
        self.listings
            .insert(path.to_string(), lines.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Report every transfer as failed once the data has been sent
    pub fn failing_completion(mut self) -> Self {
        self.completion = "451 local error in processing".to_string();
        self
    }

    pub fn without_size(mut self) -> Self {
        self.supports_size = false;
        self
    }

    pub fn start(self) -> FtpFixture {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let commands = Arc::new(Mutex::new(Vec::new()));
        let state = Arc::new(self);

        let log = Arc::clone(&commands);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&state);
                let log = Arc::clone(&log);
                thread::spawn(move || serve_session(stream, &state, &log));
            }
        });

        FtpFixture { addr, commands }
    }
}

impl FtpFixture {
    pub fn builder() -> FtpFixtureBuilder {
        FtpFixtureBuilder {
            user: "deploy".to_string(),
            pass: "secret".to_string(),
            files: HashMap::new(),
            announced_sizes: HashMap::new(),
            listings: HashMap::new(),
            supports_size: true,
            completion: "226 transfer complete".to_string(),
        }
    }

    pub fn config(&self) -> FtpConfig {
        FtpConfig::new(self.addr.to_string(), "deploy", "secret")
    }

    pub fn config_with_password(&self, pass: &str) -> FtpConfig {
        FtpConfig::new(self.addr.to_string(), "deploy", pass)
    }

    /// Wait until the client has sent `QUIT`, for failure paths where the
    /// client does not read the server's reply to it
    pub fn wait_for_quit(&self) {
        for _ in 0..100 {
            if self.verbs().iter().any(|v| v == "QUIT") {
                return;
            }
            thread::sleep(Duration::from_millis(20));
        }
    }

    /// Command verbs received so far, in order
    pub fn verbs(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_uppercase())
            .collect()
    }
}

fn reply(stream: &mut TcpStream, line: &str) {
    let _ = stream.write_all(format!("{}\r\n", line).as_bytes());
    let _ = stream.flush();
}

fn open_data_listener() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

fn send_data(stream: &mut TcpStream, data_listener: Option<TcpListener>, data: &[u8], completion: &str) {
    let Some(listener) = data_listener else {
        reply(stream, "425 use PASV first");
        return;
    };
    reply(stream, "150 opening binary mode data connection");
    if let Ok((mut data_stream, _)) = listener.accept() {
        let _ = data_stream.write_all(data);
    }
    reply(stream, completion);
}

fn serve_session(stream: TcpStream, state: &FtpFixtureBuilder, log: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut writer = stream;
    let mut user = String::new();
    let mut data_listener: Option<TcpListener> = None;

    reply(&mut writer, "220 fixture ready");

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end().to_string();
        log.lock().unwrap().push(line.clone());

        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb.to_uppercase(), arg.to_string()),
            None => (line.to_uppercase(), String::new()),
        };

        match verb.as_str() {
            "USER" => {
                user = arg;
                reply(&mut writer, "331 password required");
            }
            "PASS" => {
                if user == state.user && arg == state.pass {
                    reply(&mut writer, "230 logged in");
                } else {
                    reply(&mut writer, "530 login incorrect");
                }
            }
            "TYPE" => reply(&mut writer, "200 type set"),
            "SIZE" => match state.files.get(&arg) {
                _ if !state.supports_size => reply(&mut writer, "502 command not implemented"),
                Some(data) => {
                    let size = state.announced_sizes.get(&arg).copied().unwrap_or(data.len());
                    reply(&mut writer, &format!("213 {}", size))
                }
                None => reply(&mut writer, "550 file not found"),
            },
            "PASV" => {
                let (listener, port) = open_data_listener();
                data_listener = Some(listener);
                reply(
                    &mut writer,
                    &format!("227 Entering Passive Mode (127,0,0,1,{},{})", port / 256, port % 256),
                );
            }
            "EPSV" => {
                let (listener, port) = open_data_listener();
                data_listener = Some(listener);
                reply(&mut writer, &format!("229 Entering Extended Passive Mode (|||{}|)", port));
            }
            "RETR" => match state.files.get(&arg) {
                Some(data) => send_data(&mut writer, data_listener.take(), data, &state.completion),
                None => reply(&mut writer, "550 file not found"),
            },
            "LIST" => match state.listings.get(&arg) {
                Some(lines) => {
                    let mut body = lines.join("\r\n");
                    body.push_str("\r\n");
                    send_data(&mut writer, data_listener.take(), body.as_bytes(), "226 transfer complete");
                }
                None => reply(&mut writer, "550 directory not found"),
            },
            "QUIT" => {
                reply(&mut writer, "221 bye");
                break;
            }
            _ => reply(&mut writer, "502 command not implemented"),
        }
    }
}
