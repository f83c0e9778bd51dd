use super::Pid;

/// True iff `pid` refers to a live process this user may signal.
#[cfg(unix)]
pub(crate) fn is_alive(pid: Pid) -> bool {
    if pid.0 <= 0 {
        return false;
    }
    // SAFETY: signal 0 only runs the existence and permission checks.
    unsafe { libc::kill(pid.0 as libc::pid_t, 0) == 0 }
}

#[cfg(not(unix))]
pub(crate) fn is_alive(_pid: Pid) -> bool {
    false
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn own_process_is_alive() {
        assert!(is_alive(Pid(std::process::id() as i32)));
    }

    #[test]
    fn non_positive_ids_are_never_alive() {
        assert!(!is_alive(Pid(0)));
        assert!(!is_alive(Pid(-1)));
    }

    #[test]
    fn reaped_child_is_not_alive() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = Pid(child.id() as i32);
        child.wait().unwrap();
        assert!(!is_alive(pid));
    }
}
