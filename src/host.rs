use std::ffi::OsString;
use std::io;
use std::sync::OnceLock;

static HOSTNAME: OnceLock<String> = OnceLock::new();

/// Host name used for `@source_host`.
///
/// Looked up on first use and cached for the lifetime of the process.
pub fn hostname() -> &'static str {
    HOSTNAME.get_or_init(resolve_hostname)
}

/// Query the operating system for the host name.
///
/// Never fails, see [`hostname_from`].
pub fn resolve_hostname() -> String {
    hostname_from(hostname::get())
}

/// Turn a host name lookup result into the reported name.
///
/// A lookup error is rendered into the returned string, and a name that is
/// not valid UTF-8 is converted lossily.
fn hostname_from(result: io::Result<OsString>) -> String {
    match result {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            tracing::warn!(error = %e, "host name lookup failed");
            e.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_value_is_stable() {
        let first = hostname();
        let second = hostname();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn lookup_error_becomes_the_name() {
        assert_eq!(hostname_from(Err(io::Error::other("no host"))), "no host");
    }

    #[test]
    fn plain_name_is_kept() {
        assert_eq!(hostname_from(Ok(OsString::from("web-1"))), "web-1");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_name_is_converted_lossily() {
        use std::os::unix::ffi::OsStringExt;

        let name = OsString::from_vec(vec![b'w', b'e', b'b', 0xff]);
        assert_eq!(hostname_from(Ok(name)), "web\u{fffd}");
    }
}
