//! Schedule compiler
//!
//! Turns a job's cron expressions into the two scripts the container uses to
//! schedule itself: a crontab installer and a start script. Expressions are
//! passed through verbatim.

use std::path::Path;

use crate::error::{JobError, Result};

/// Crontab installer, run once while the image is built
pub const INSTALL_SCRIPT: &str = "schedule.sh";

/// Start script invoked by every crontab line
pub const START_SCRIPT: &str = "start.sh";

/// Directory the build context is copied to inside the image
const APP_DIR: &str = "/app";

const CRONTAB: &str = "/etc/crontabs/root";

/// Generated scheduling scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleArtifacts {
    pub install: String,
    pub start: String,
}

/// Compiles the scheduling scripts for a job
///
/// Output depends only on the arguments, in order. An empty schedule gives
/// an empty installer.
pub fn compile(expressions: &[String], entrypoint: &str, runtime: &str) -> ScheduleArtifacts {
    let mut install = String::new();
    for expression in expressions {
        let line = format!("{} sh {}/{}", expression, APP_DIR, START_SCRIPT);
        install.push_str(&format!("echo {} >> {}\n", shell_quote(&line), CRONTAB));
    }

    let start = format!("{} {}/{}\n", runtime, APP_DIR, entrypoint);

    ScheduleArtifacts { install, start }
}

impl ScheduleArtifacts {
    /// Writes both scripts into `dir`
    pub async fn write(&self, dir: &Path) -> Result<()> {
        write_script(&dir.join(INSTALL_SCRIPT), &self.install).await?;
        write_script(&dir.join(START_SCRIPT), &self.start).await
    }
}

async fn write_script(path: &Path, contents: &str) -> Result<()> {
    let write = async {
        super::unlink_if_symlink(path).await?;
        tokio::fs::write(path, contents).await
    };

    write.await.map_err(|e| {
        JobError::Template(format!("failed to write {}: {}", path.display(), e))
    })
}

/// Single-quotes `value` for POSIX sh
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
