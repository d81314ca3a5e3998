//! Runs one embedded `PostgreSQL` lifecycle step as an unprivileged user.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! The payload is a JSON-serialised `WorkerPayload` (cluster settings plus
//! environment overrides) written by the integration-test harness. When
//! launched as root the worker re-executes itself as `nobody` before it
//! touches the data directory, because `initdb` refuses to run as root.
//!
//! `start` leaves the server running after the worker exits; `stop` shuts
//! it down again.

/// Boxed error returned from `main`.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(unix)]
mod unix {
    use super::BoxError;
    use camino::{Utf8Path, Utf8PathBuf};
    use nix::unistd::{Uid, User, initgroups, setgid, setuid};
    use pg_embedded_setup_unpriv::ambient_dir_and_path;
    use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
    use postgresql_embedded::{PostgreSQL, Status};
    use std::env;
    use std::ffi::CString;
    use std::fmt;
    use std::io::{self, Read};
    use std::path::Path;
    use std::process::{Command, ExitStatus};
    use std::str::FromStr;
    use thiserror::Error;

    const REEXEC_MARKER: &str = "PG_WORKER_REEXEC";
    const TRUSTED_PATH: &str = "/usr/sbin:/usr/bin:/sbin:/bin";
    const UNPRIVILEGED_USER: &str = "nobody";

    #[derive(Debug, Error)]
    enum WorkerError {
        #[error("usage: pg_worker <setup|start|stop> <payload.json>: {0}")]
        Usage(String),
        #[error("failed to read payload: {0}")]
        PayloadRead(#[source] BoxError),
        #[error("failed to parse payload: {0}")]
        PayloadParse(#[source] serde_json::Error),
        #[error("invalid cluster settings: {0}")]
        Settings(String),
        #[error("failed to build runtime: {0}")]
        Runtime(#[source] io::Error),
        #[error("failed to drop privileges: {0}")]
        Privileges(String),
        #[error("postgres {step} failed: {message}")]
        Postgres { step: Step, message: String },
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        Setup,
        Start,
        Stop,
    }

    impl FromStr for Step {
        type Err = WorkerError;

        fn from_str(raw: &str) -> Result<Self, Self::Err> {
            match raw {
                "setup" => Ok(Self::Setup),
                "start" => Ok(Self::Start),
                "stop" => Ok(Self::Stop),
                other => Err(WorkerError::Usage(format!("unknown step '{other}'"))),
            }
        }
    }

    impl fmt::Display for Step {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(match self {
                Self::Setup => "setup",
                Self::Start => "start",
                Self::Stop => "stop",
            })
        }
    }

    #[derive(Debug)]
    struct Invocation {
        step: Step,
        payload: Utf8PathBuf,
    }

    impl Invocation {
        fn parse(args: &[String]) -> Result<Self, WorkerError> {
            match args {
                [] | [_] => Err(WorkerError::Usage("missing step argument".into())),
                [_, _] => Err(WorkerError::Usage("missing payload path".into())),
                [_, step, payload] => Ok(Self {
                    step: step.parse()?,
                    payload: Utf8PathBuf::from(payload),
                }),
                [_, _, _, extra, ..] => Err(WorkerError::Usage(format!(
                    "unexpected argument '{extra}'"
                ))),
            }
        }
    }

    pub(super) fn main() -> Result<(), BoxError> {
        let args = env::args_os()
            .map(|arg| {
                arg.into_string()
                    .map_err(|_| WorkerError::Usage("arguments must be UTF-8".into()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let invocation = Invocation::parse(&args)?;

        if Uid::effective().is_root() && env::var_os(REEXEC_MARKER).is_none() {
            let status = reexec_as_nobody(args.get(1..).unwrap_or_default())?;
            std::process::exit(status.code().unwrap_or(1));
        }
        run(&invocation).map_err(Into::into)
    }

    fn reexec_as_nobody(forwarded: &[String]) -> Result<ExitStatus, WorkerError> {
        let exe = env::current_exe().map_err(|err| WorkerError::Privileges(err.to_string()))?;
        let launched = Command::new("runuser")
            .args(["-u", UNPRIVILEGED_USER, "--"])
            .arg(&exe)
            .args(forwarded)
            .env(REEXEC_MARKER, "1")
            .env("PATH", TRUSTED_PATH)
            .status();
        match launched {
            Ok(status) => Ok(status),
            Err(err) if err.kind() == io::ErrorKind::NotFound => reexec_via_su(&exe, forwarded),
            Err(err) => Err(WorkerError::Privileges(err.to_string())),
        }
    }

    fn reexec_via_su(exe: &Path, forwarded: &[String]) -> Result<ExitStatus, WorkerError> {
        let program = exe
            .to_str()
            .ok_or_else(|| WorkerError::Privileges("executable path is not UTF-8".into()))?;
        let line = std::iter::once(program)
            .chain(forwarded.iter().map(String::as_str))
            .map(shell_escape)
            .fold(format!("{REEXEC_MARKER}=1 exec"), |mut line, word| {
                line.push(' ');
                line.push_str(&word);
                line
            });
        Command::new("/bin/su")
            .args(["-s", "/bin/sh", UNPRIVILEGED_USER, "-c"])
            .arg(line)
            .env("PATH", TRUSTED_PATH)
            .status()
            .map_err(|err| WorkerError::Privileges(err.to_string()))
    }

    /// Quotes `word` for `/bin/sh`.
    fn shell_escape(word: &str) -> String {
        format!("'{}'", word.replace('\'', r"'\''"))
    }

    fn run(invocation: &Invocation) -> Result<(), WorkerError> {
        let payload = load_payload(&invocation.payload)?;
        drop_privileges(UNPRIVILEGED_USER)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| WorkerError::Settings(err.to_string()))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(WorkerError::Runtime)?;
        apply_environment(&payload.environment);

        let step = invocation.step;
        let mut postgres = PostgreSQL::new(settings);
        runtime.block_on(async move {
            match step {
                Step::Setup => {
                    postgres.setup().await.map_err(|err| failed(step, &err))?;
                    ensure_started(&mut postgres, step).await
                }
                Step::Start => {
                    ensure_started(&mut postgres, step).await?;
                    // Dropping the handle would stop the server.
                    let _running = std::mem::ManuallyDrop::new(postgres);
                    Ok(())
                }
                Step::Stop => postgres.stop().await.map_err(|err| failed(step, &err)),
            }
        })
    }

    fn failed(step: Step, err: &dyn fmt::Display) -> WorkerError {
        WorkerError::Postgres {
            step,
            message: err.to_string(),
        }
    }

    async fn ensure_started(postgres: &mut PostgreSQL, step: Step) -> Result<(), WorkerError> {
        if matches!(postgres.status(), Status::Started) {
            return Ok(());
        }
        postgres.start().await.map_err(|err| failed(step, &err))
    }

    fn load_payload(path: &Utf8Path) -> Result<WorkerPayload, WorkerError> {
        let (dir, relative) =
            ambient_dir_and_path(path).map_err(|err| WorkerError::PayloadRead(err.into()))?;
        let mut bytes = Vec::new();
        dir.open(relative.as_std_path())
            .and_then(|mut file| file.read_to_end(&mut bytes))
            .map_err(|err| WorkerError::PayloadRead(Box::new(err)))?;
        serde_json::from_slice(&bytes).map_err(WorkerError::PayloadParse)
    }

    fn drop_privileges(username: &str) -> Result<(), WorkerError> {
        if !Uid::effective().is_root() {
            return Ok(());
        }
        let denied = |err: nix::Error| WorkerError::Privileges(err.to_string());
        let user = User::from_name(username)
            .map_err(denied)?
            .ok_or_else(|| WorkerError::Privileges(format!("user '{username}' not found")))?;
        let name = CString::new(user.name.clone())
            .map_err(|err| WorkerError::Privileges(err.to_string()))?;
        initgroups(&name, user.gid).map_err(denied)?;
        setgid(user.gid).map_err(denied)?;
        setuid(user.uid).map_err(denied)?;

        // SAFETY: the worker is single-threaded at this point and owns its
        // environment.
        unsafe {
            env::set_var("HOME", &user.dir);
            env::set_var("USER", &user.name);
            env::set_var("LOGNAME", &user.name);
        }
        Ok(())
    }

    fn apply_environment(environment: &[(String, Option<PlainSecret>)]) {
        for (key, value) in environment {
            // SAFETY: no other thread reads or writes the environment while
            // the worker applies its payload.
            unsafe {
                match value {
                    Some(secret) => env::set_var(key, secret.expose()),
                    None => env::remove_var(key),
                }
            }
        }
    }

}

#[cfg(unix)]
fn main() -> Result<(), BoxError> {
    unix::main()
}

#[cfg(not(unix))]
fn main() -> Result<(), BoxError> {
    Err("pg_worker is not supported on non-Unix platforms".into())
}
