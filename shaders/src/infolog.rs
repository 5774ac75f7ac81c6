/// size of the first buffer handed to the driver when reading an info log.
pub const INITIAL_INFO_LOG_CAPACITY: usize = 512;

/// reads a driver info log of unknown length.
///
/// `query` behaves like glGetShaderInfoLog: it writes a nul-terminated prefix of the log into the
/// buffer and returns the prefix length without the terminator. when the prefix together with its
/// terminator fills the whole buffer there is no way to tell a log that fits exactly from a
/// truncated one, so the buffer is doubled and the query repeated.
///
/// NOTE: this avoids the INFO_LOG_LENGTH query, which some drivers report inconsistently (with or
/// without the terminator).
pub fn read_info_log(mut query: impl FnMut(&mut [u8]) -> usize) -> String {
    let mut buf = vec![0_u8; INITIAL_INFO_LOG_CAPACITY];
    loop {
        let len = query(&mut buf);
        if len + 1 < buf.len() {
            buf.truncate(len);
            break;
        }
        let cap = buf.len() * 2;
        buf.resize(cap, 0);
    }
    match String::from_utf8(buf) {
        Ok(log) => log,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
