//! SQLite-backed [`KvBackend`].
//!
//! A dedicated worker thread owns the connection; callers hand it closures
//! over an mpsc channel and await the reply on a oneshot. rusqlite's
//! `Connection` is not `Sync`, and funnelling every operation through one
//! thread also keeps write ordering deterministic.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use log::{error, info};
use rusqlite::{params, Connection};
use tokio::sync::oneshot;

use super::KvBackend;
use crate::error::{Result, VaultError};

type KvTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum KvCommand {
    Execute(KvTask),
    Shutdown,
}

struct SqliteKvInner {
    sender: mpsc::Sender<KvCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for SqliteKvInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(KvCommand::Shutdown) {
                error!("Failed to send shutdown to kv thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join kv thread: {join_err:?}");
            }
        }
    }
}

#[derive(Clone)]
pub struct SqliteKv {
    inner: Arc<SqliteKvInner>,
}

impl SqliteKv {
    pub fn open(db_path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create kv directory {}", parent.display()))?;
        }

        let (command_tx, command_rx) = mpsc::channel::<KvCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("tabvault-kv".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(
                            anyhow::Error::new(err).context("failed to open kv database")
                        ));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result = conn
                    .execute(
                        "CREATE TABLE IF NOT EXISTS kv_entries (
                             key TEXT PRIMARY KEY,
                             value TEXT NOT NULL
                         )",
                        [],
                    )
                    .map(|_| ())
                    .context("failed to create kv table");
                if ready_tx.send(init_result).is_err() {
                    error!("kv initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        KvCommand::Execute(task) => task(&mut conn),
                        KvCommand::Shutdown => break,
                    }
                }

                info!("kv thread shutting down");
            })
            .with_context(|| "failed to spawn kv worker thread")?;

        ready_rx
            .recv()
            .context("kv worker exited before signaling readiness")??;

        info!("kv store opened at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(SqliteKvInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    async fn execute<F, T>(&self, task: F) -> anyhow::Result<T>
    where
        F: FnOnce(&mut Connection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = KvCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("kv caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to kv thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("kv thread terminated unexpectedly"))?
    }
}

fn storage_err(err: anyhow::Error) -> VaultError {
    VaultError::Storage(format!("{err:#}"))
}

#[async_trait]
impl KvBackend for SqliteKv {
    async fn get(&self, keys: &[String]) -> Result<HashMap<String, String>> {
        let keys = keys.to_vec();
        self.execute(move |conn| {
            let mut stmt = conn.prepare("SELECT value FROM kv_entries WHERE key = ?1")?;
            let mut found = HashMap::new();
            for key in keys {
                let mut rows = stmt.query(params![key])?;
                if let Some(row) = rows.next()? {
                    found.insert(key, row.get::<_, String>(0)?);
                }
            }
            Ok(found)
        })
        .await
        .map_err(storage_err)
    }

    async fn set(&self, entries: HashMap<String, String>) -> Result<()> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            for (key, value) in &entries {
                tx.execute(
                    "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                    params![key, value],
                )
                .with_context(|| format!("failed to upsert kv entry '{key}'"))?;
            }
            tx.commit()?;
            Ok(())
        })
        .await
        .map_err(storage_err)
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let keys = keys.to_vec();
        self.execute(move |conn| {
            for key in keys {
                conn.execute("DELETE FROM kv_entries WHERE key = ?1", params![key])?;
            }
            Ok(())
        })
        .await
        .map_err(storage_err)
    }

    async fn get_all(&self) -> Result<HashMap<String, String>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT key, value FROM kv_entries")?;
            let mut rows = stmt.query([])?;
            let mut entries = HashMap::new();
            while let Some(row) = rows.next()? {
                entries.insert(row.get::<_, String>(0)?, row.get::<_, String>(1)?);
            }
            Ok(entries)
        })
        .await
        .map_err(storage_err)
    }
}
