//! Console shutdown watcher.
//!
//! Reads lines from stdin as its own task; `quit` or `q` triggers monitor
//! shutdown, anything else re-prompts. Closing stdin ends the watcher
//! without ending the monitor.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::warn;

use crate::monitor::Monitor;

const PROMPT: &str = "'quit' or 'q' to terminate program";

pub fn spawn(monitor: Arc<Monitor>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("{PROMPT}");
        while monitor.is_running() {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let cmd = line.trim();
                    if cmd == "q" || cmd == "quit" {
                        monitor.stop();
                        break;
                    }
                    println!("{PROMPT}");
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("console watcher read failed: {e}");
                    break;
                }
            }
        }
    })
}
