use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub const DEFAULT_GECKODRIVER_PORT: u16 = 4444;

/// Common paths where geckodriver might be installed
const GECKODRIVER_PATHS: &[&str] = &[
    "/usr/bin/geckodriver",
    "/usr/local/bin/geckodriver",
    "/snap/bin/geckodriver",
];

pub fn webdriver_url(port: u16) -> String {
    format!("http://localhost:{}", port)
}

fn which(binary: &str) -> Option<PathBuf> {
    let output = Command::new("which").arg(binary).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let path = String::from_utf8(output.stdout).ok()?;
    let path = path.trim();
    (!path.is_empty()).then(|| PathBuf::from(path))
}

/// Find geckodriver: an explicit path wins, then `PATH`, then common locations.
pub fn find_geckodriver_binary(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    which("geckodriver").or_else(|| {
        GECKODRIVER_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|p| p.exists())
    })
}

/// Handle to a running geckodriver. The process is killed on drop.
pub struct GeckodriverProcess {
    child: Child,
    port: u16,
}

impl GeckodriverProcess {
    pub fn webdriver_url(&self) -> String {
        webdriver_url(self.port)
    }
}

impl Drop for GeckodriverProcess {
    fn drop(&mut self) {
        info!("Shutting down geckodriver (PID {})...", self.child.id());
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start geckodriver on `port` and wait until its `/status` endpoint answers.
pub async fn launch_geckodriver(
    binary: Option<&Path>,
    port: u16,
) -> Result<GeckodriverProcess, String> {
    let path = find_geckodriver_binary(binary).ok_or_else(|| match binary {
        Some(p) => format!("geckodriver not found at {}", p.display()),
        None => "geckodriver not found. Install it or pass --geckodriver-path".to_string(),
    })?;

    info!("Launching geckodriver from: {}", path.display());

    let child = Command::new(&path)
        .args(["--port", &port.to_string()])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to launch geckodriver: {}", e))?;

    info!("geckodriver launched with PID: {}", child.id());

    // From here on, dropping the handle kills the process.
    let process = GeckodriverProcess { child, port };
    let url = format!("{}/status", process.webdriver_url());
    let client = reqwest::Client::new();

    for attempt in 1..=30 {
        sleep(Duration::from_millis(200)).await;

        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("geckodriver ready after {} attempts", attempt);
                return Ok(process);
            }
            Ok(_) => {
                warn!("geckodriver responded but not ready yet (attempt {})", attempt);
            }
            Err(_) => {
                if attempt % 5 == 0 {
                    info!("Waiting for geckodriver... (attempt {})", attempt);
                }
            }
        }
    }

    Err("geckodriver did not become ready within timeout".to_string())
}

/// Firefox capabilities: optional binary, headless unless a visible window
/// was asked for, and no download prompts.
pub fn firefox_capabilities(
    firefox_binary: Option<&Path>,
    headless: bool,
) -> serde_json::Map<String, serde_json::Value> {
    let mut options = serde_json::Map::new();
    if let Some(binary) = firefox_binary {
        options.insert("binary".into(), json!(binary.display().to_string()));
    }
    let args: Vec<&str> = if headless { vec!["-headless"] } else { vec![] };
    options.insert("args".into(), json!(args));
    options.insert(
        "prefs".into(),
        json!({
            "browser.download.folderList": 2,
            "browser.helperApps.neverAsk.saveToDisk": "audio/mpeg",
        }),
    );

    let mut caps = serde_json::Map::new();
    caps.insert("browserName".into(), json!("firefox"));
    caps.insert("moz:firefoxOptions".into(), serde_json::Value::Object(options));
    caps
}
