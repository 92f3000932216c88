//! dupesig-timeout - run a command under a wall-clock alarm.
//!
//! Arms `alarm(2)` for N seconds and then replaces itself with the given
//! command via exec. The kernel delivers SIGALRM to the exec'd program when
//! the timer fires; nothing here survives the exec, so this process returns
//! only when the exec itself fails.
//!
//! ```bash
//! dupesig-timeout 30 dupesig scan /data
//! ```

use std::process::ExitCode;

#[cfg(unix)]
fn main() -> ExitCode {
    use std::env;
    use std::os::unix::process::CommandExt;
    use std::process::Command;

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: {} seconds command [args...]", args[0]);
        return ExitCode::from(2);
    }

    let seconds: u32 = args[1].parse().unwrap_or(0);
    if seconds > 0 {
        // Safety: alarm(2) has no failure modes and touches no memory.
        unsafe {
            libc::alarm(seconds);
        }
    }

    // Returns only on failure; the alarm stays armed across the exec.
    let err = Command::new(&args[2]).args(&args[3..]).exec();
    eprintln!("{}: {}", args[2], err);
    ExitCode::from(127)
}

#[cfg(not(unix))]
fn main() -> ExitCode {
    eprintln!("dupesig-timeout requires a Unix platform (alarm/exec semantics)");
    ExitCode::from(2)
}
