use std::net::TcpStream;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// A `pygit serve` child process, killed when the guard drops
pub struct ServerGuard {
    child: Child,
    pub port: u16,
}

impl ServerGuard {
    /// Serve `root` on an ephemeral local port and wait until it accepts
    pub fn start(root: &Path) -> Self {
        let port = free_port();
        let binary = assert_cmd::cargo::cargo_bin("pygit");

        let child = Command::new(binary)
            .arg("serve")
            .arg("--port")
            .arg(port.to_string())
            .arg(root)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to spawn pygit serve");

        let guard = ServerGuard { child, port };
        guard.wait_until_ready();
        guard
    }

    pub fn url(&self, repo: &str) -> String {
        format!("pygit://127.0.0.1:{}/{}", self.port, repo)
    }

    fn wait_until_ready(&self) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while Instant::now() < deadline {
            if TcpStream::connect(("127.0.0.1", self.port)).is_ok() {
                return;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        panic!("server did not start listening on port {}", self.port);
    }
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind an ephemeral port")
        .local_addr()
        .expect("Failed to read the ephemeral port")
        .port()
}
