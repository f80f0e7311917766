//! Shared helpers for the send tests: a single-connection SMTP stub
//! server and in-memory collaborator implementations.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use auth9_mailer::{SecretVault, ThemeResourceProvider};

/// Everything the stub server saw on its one connection.
pub struct SmtpTranscript {
    /// Client command lines, in order, without line endings
    pub commands: Vec<String>,
    /// Raw DATA payload (the transmitted MIME document)
    pub data: String,
}

impl SmtpTranscript {
    pub fn saw(&self, prefix: &str) -> bool {
        self.commands.iter().any(|c| c.starts_with(prefix))
    }
}

/// Minimal SMTP server accepting exactly one connection on an ephemeral
/// loopback port. Speaks just enough of the protocol for a plaintext
/// (optionally authenticated) session.
pub struct FakeSmtpServer {
    pub port: u16,
    handle: JoinHandle<SmtpTranscript>,
}

impl FakeSmtpServer {
    pub fn start(advertise_auth: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub smtp server");
        let port = listener.local_addr().expect("local addr").port();
        let handle = thread::spawn(move || serve(listener, advertise_auth));
        Self { port, handle }
    }

    /// Wait for the connection to finish and return what the server saw.
    pub fn finish(self) -> SmtpTranscript {
        self.handle.join().expect("stub smtp server panicked")
    }
}

fn serve(listener: TcpListener, advertise_auth: bool) -> SmtpTranscript {
    let (stream, _) = listener.accept().expect("accept");
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut commands = Vec::new();
    let mut data = String::new();

    reply(&stream, "220 stub.test ESMTP\r\n");

    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let command = line.trim_end().to_owned();
        let keyword = command
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_uppercase();
        commands.push(command);

        match keyword.as_str() {
            "EHLO" | "HELO" => {
                if advertise_auth {
                    reply(
                        &stream,
                        "250-stub.test\r\n250-AUTH PLAIN LOGIN\r\n250 8BITMIME\r\n",
                    );
                } else {
                    reply(&stream, "250-stub.test\r\n250 8BITMIME\r\n");
                }
            }
            "AUTH" => reply(&stream, "235 2.7.0 authentication successful\r\n"),
            "DATA" => {
                reply(&stream, "354 end data with <CR><LF>.<CR><LF>\r\n");
                loop {
                    line.clear();
                    match reader.read_line(&mut line) {
                        Ok(0) | Err(_) => break,
                        Ok(_) if line == ".\r\n" => break,
                        Ok(_) => data.push_str(&line),
                    }
                }
                reply(&stream, "250 2.0.0 queued\r\n");
            }
            "QUIT" => {
                reply(&stream, "221 2.0.0 bye\r\n");
                break;
            }
            _ => reply(&stream, "250 2.0.0 ok\r\n"),
        }
    }

    SmtpTranscript { commands, data }
}

fn reply(mut stream: &TcpStream, response: &str) {
    stream
        .write_all(response.as_bytes())
        .and_then(|_| stream.flush())
        .expect("write response");
}

/// Vault backed by a fixed map, counting lookups.
#[derive(Default)]
pub struct StaticVault {
    secrets: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl StaticVault {
    pub fn with_secret(reference: &str, value: &str) -> Self {
        let mut secrets = HashMap::new();
        secrets.insert(reference.to_string(), value.to_string());
        Self {
            secrets,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl SecretVault for StaticVault {
    fn string_secret(&self, reference: &str) -> Option<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.secrets.get(reference).cloned()
    }
}

/// Theme backed by a fixed path/bytes map.
#[derive(Default)]
pub struct StaticTheme {
    resources: HashMap<String, Vec<u8>>,
}

impl StaticTheme {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_resource(path: &str, bytes: &[u8]) -> Self {
        let mut resources = HashMap::new();
        resources.insert(path.to_string(), bytes.to_vec());
        Self { resources }
    }
}

impl ThemeResourceProvider for StaticTheme {
    fn resource(&self, path: &str) -> std::io::Result<Option<Vec<u8>>> {
        Ok(self.resources.get(path).cloned())
    }
}
