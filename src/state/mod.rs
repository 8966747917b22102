//! Durable task state, artifact naming, and archival.
//!
//! A single well-known state file doubles as the system-wide
//! single-active-task lock: [`TaskStore::acquire`] creates it with an
//! atomic create-exclusive open, and archiving the finished task renames
//! it away, releasing the lock. All of a task's artifacts (state, log,
//! report) derive their names from the same slug, so they group
//! trivially on disk.

use crate::types::{AppError, ResearchTask, Result};
use chrono::Utc;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Well-known name of the single-active-task state file.
pub const STATE_FILE: &str = "research_task.json";

/// Filesystem slug derived from the initial query: transliterated,
/// lower-cased, stripped of non-alphanumerics, words joined with `_`.
pub fn slugify(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for ch in query.chars().flat_map(char::to_lowercase) {
        match transliterate(ch) {
            Some(mapped) => out.push_str(mapped),
            None => {
                if ch.is_ascii_alphanumeric() || ch.is_whitespace() {
                    out.push(ch);
                }
            }
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Cyrillic-to-Latin mapping for lower-case input.
fn transliterate(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' | 'ы' => "y",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "kh",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    };
    Some(mapped)
}

/// Directory holding the active state file and all task artifacts.
pub struct TaskStore {
    dir: PathBuf,
}

impl TaskStore {
    /// Open (creating if needed) a store at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| AppError::State(format!("cannot create store dir: {e}")))?;
        Ok(Self { dir })
    }

    /// Whether a task currently holds the active slot.
    pub fn is_active(&self) -> bool {
        self.state_path().exists()
    }

    /// Claim the single-active-task slot.
    ///
    /// Atomic create-exclusive: two concurrent callers cannot both
    /// succeed. Fails with [`AppError::TaskActive`] when the slot is
    /// taken.
    pub fn acquire(&self) -> Result<TaskLease> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.state_path())
        {
            Ok(_) => Ok(TaskLease {
                path: self.state_path(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(AppError::TaskActive),
            Err(e) => Err(AppError::State(format!("cannot create state file: {e}"))),
        }
    }

    /// Next free artifact path for `base_name` with `ext`:
    /// `research_<base>.<ext>`, then `research_<base>_001.<ext>` upward.
    pub fn unique_path(&self, base_name: &str, ext: &str) -> PathBuf {
        let first = self.dir.join(format!("research_{base_name}.{ext}"));
        if !first.exists() {
            return first;
        }
        let mut counter = 1u32;
        loop {
            let candidate = self
                .dir
                .join(format!("research_{base_name}_{counter:03}.{ext}"));
            if !candidate.exists() {
                return candidate;
            }
            counter += 1;
        }
    }

    fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILE)
    }
}

/// Exclusive ownership of the active-task slot.
///
/// Holding a lease is the permission to write the state file; consuming
/// it through [`TaskLease::archive`] releases the slot. A task is
/// archived exactly once because archive takes the lease by value.
#[derive(Debug)]
pub struct TaskLease {
    path: PathBuf,
}

impl TaskLease {
    /// Persist the task, fully overwriting the state file.
    pub fn save(&self, task: &ResearchTask) -> Result<()> {
        let json = serde_json::to_string_pretty(task)
            .map_err(|e| AppError::State(format!("cannot serialize task: {e}")))?;
        fs::write(&self.path, json)
            .map_err(|e| AppError::State(format!("cannot write state file: {e}")))
    }

    /// Move the state file to a numbered archive slot, scanning upward
    /// from `.001` until a free name is found. Never overwrites a prior
    /// archive; releases the active-task lock.
    pub fn archive(self) -> Result<PathBuf> {
        let mut counter = 1u32;
        loop {
            let candidate = self.path.with_file_name(format!("{STATE_FILE}.{counter:03}"));
            if !candidate.exists() {
                fs::rename(&self.path, &candidate)
                    .map_err(|e| AppError::State(format!("cannot archive state file: {e}")))?;
                return Ok(candidate);
            }
            counter += 1;
        }
    }
}

/// Plain per-task log file, distinct from the process-wide tracing
/// output: one file per task, attached to the error notification as a
/// diagnostic artifact.
pub struct TaskLog {
    file: File,
    path: PathBuf,
}

impl TaskLog {
    /// Create the log file at `path`.
    pub fn create(path: PathBuf) -> Result<Self> {
        let file = File::create(&path)
            .map_err(|e| AppError::State(format!("cannot create task log: {e}")))?;
        Ok(Self { file, path })
    }

    /// Log at info level.
    pub fn info(&mut self, msg: &str) {
        self.write("INFO", msg);
    }

    /// Log at warning level.
    pub fn warn(&mut self, msg: &str) {
        self.write("WARNING", msg);
    }

    /// Log at error level.
    pub fn error(&mut self, msg: &str) {
        self.write("ERROR", msg);
    }

    /// Path of the log file, for delivery as an artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&mut self, level: &str, msg: &str) {
        // A failed log write must never fail the task.
        let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S");
        let _ = writeln!(self.file, "{stamp} [{level}] {msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(
            slugify("Impact of AI on journalism, 2024!"),
            "impact_of_ai_on_journalism_2024"
        );
    }

    #[test]
    fn test_slugify_collapses_whitespace() {
        assert_eq!(slugify("  rust   async\truntime "), "rust_async_runtime");
    }

    #[test]
    fn test_slugify_transliterates_cyrillic() {
        assert_eq!(slugify("Новости России"), "novosti_rossii");
        assert_eq!(slugify("объём данных"), "obem_dannykh");
    }

    #[test]
    fn test_slugify_drops_unmapped_symbols() {
        assert_eq!(slugify("prix du café €"), "prix_du_caf");
    }
}
