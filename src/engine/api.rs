//! The foreign engine's call surface, typed.
//!
//! The bridge does not implement the SSH protocol; a pre-compiled engine
//! does, inside its sandbox. This trait is the typed contract an
//! embedding implements over that engine so the rest of the application
//! never touches raw exports. Handle-returning calls answer `None` where
//! the engine returns its null value, and `i32` returns carry the
//! engine's result codes verbatim (interpret them with
//! [`ErrorCode`](crate::engine::ErrorCode)).
//!
//! The surface is grouped the way the engine groups it: session, auth,
//! channel, port forwarding, SFTP, known hosts, tracing. Convenience
//! wrappers that the engine itself defines as shorthands (`shell`,
//! `exec`, `subsystem` over `process_startup`, credential dispatch over
//! the concrete auth calls) are provided methods here.

// ============================================================================
// Imports
// ============================================================================

use crate::engine::handles::{
    ChannelHandle, KnownHostsHandle, ListenerHandle, SessionHandle, SftpFileHandle, SftpHandle,
};
use crate::engine::types::{
    Credentials, HostKey, InteractivePrompt, KnownHostCheck, PtyOptions, SftpAttributes,
};

// ============================================================================
// Callback types
// ============================================================================

/// Answers a keyboard-interactive exchange: `(name, instruction,
/// prompts)` in, one response per prompt out.
pub type InteractiveResponder =
    Box<dyn FnMut(&str, &str, &[InteractivePrompt]) -> Vec<String> + Send>;

/// Receives engine trace lines when tracing is enabled.
pub type TraceHandler = Box<dyn FnMut(&str) + Send>;

// ============================================================================
// Engine
// ============================================================================

/// Typed surface of the sandboxed SSH engine.
pub trait Engine {
    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Initializes the engine library. Zero on success.
    fn init(&mut self) -> i32;

    /// Releases the engine library.
    fn exit(&mut self);

    /// Engine version string.
    fn version(&self) -> String;

    // ------------------------------------------------------------------
    // Session management
    // ------------------------------------------------------------------

    /// Creates a session with the bridge's socket callbacks installed.
    fn session_init(&mut self) -> Option<SessionHandle>;

    /// Runs the protocol handshake over the bridged socket.
    fn session_handshake(&mut self, session: SessionHandle) -> i32;

    /// Switches the session between blocking and polling mode. The
    /// bridge requires polling mode; in blocking mode the engine would
    /// spin on `EAGAIN` without yielding.
    fn session_set_blocking(&mut self, session: SessionHandle, blocking: bool) -> i32;

    /// Last error code the session recorded.
    fn session_last_errno(&self, session: SessionHandle) -> i32;

    /// Last error message the session recorded.
    fn session_last_error(&self, session: SessionHandle) -> String;

    /// Sends a disconnect message with the given reason.
    fn session_disconnect(&mut self, session: SessionHandle, reason: &str) -> i32;

    /// Frees the session. The handle is dead afterwards.
    fn session_free(&mut self, session: SessionHandle);

    /// Banner the remote side presented, if the handshake got that far.
    fn session_banner(&self, session: SessionHandle) -> String;

    /// Host key the remote side presented.
    fn session_hostkey(&self, session: SessionHandle) -> Option<HostKey>;

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Comma-separated auth methods the remote offers for `username`.
    fn userauth_list(&mut self, session: SessionHandle, username: &str) -> String;

    /// Whether the session is authenticated.
    fn userauth_authenticated(&self, session: SessionHandle) -> bool;

    /// Password authentication.
    fn userauth_password(&mut self, session: SessionHandle, username: &str, password: &str)
        -> i32;

    /// Public-key authentication from key material in memory.
    fn userauth_publickey_from_memory(
        &mut self,
        session: SessionHandle,
        username: &str,
        public_key: Option<&str>,
        private_key: &str,
        passphrase: Option<&str>,
    ) -> i32;

    /// Public-key authentication from files in the engine's sandbox
    /// filesystem.
    fn userauth_publickey_from_file(
        &mut self,
        session: SessionHandle,
        username: &str,
        public_key_path: Option<&str>,
        private_key_path: &str,
        passphrase: &str,
    ) -> i32;

    /// Keyboard-interactive authentication driven by `responder`.
    fn userauth_keyboard_interactive(
        &mut self,
        session: SessionHandle,
        username: &str,
        responder: InteractiveResponder,
    ) -> i32;

    /// Authenticates with whatever material `credentials` carries.
    fn authenticate(&mut self, session: SessionHandle, credentials: &Credentials) -> i32 {
        match credentials {
            Credentials::Password { username, password } => {
                self.userauth_password(session, username, password)
            }
            Credentials::Key {
                username,
                public_key,
                private_key,
                passphrase,
            } => self.userauth_publickey_from_memory(
                session,
                username,
                public_key.as_deref(),
                private_key,
                passphrase.as_deref(),
            ),
        }
    }

    // ------------------------------------------------------------------
    // Channel management
    // ------------------------------------------------------------------

    /// Opens a session channel.
    fn channel_open_session(&mut self, session: SessionHandle) -> Option<ChannelHandle>;

    /// Opens a direct TCP/IP forward to `host:port`, reporting
    /// `source_host:source_port` as the originator.
    fn channel_direct_tcpip(
        &mut self,
        session: SessionHandle,
        host: &str,
        port: u16,
        source_host: &str,
        source_port: u16,
    ) -> Option<ChannelHandle>;

    /// Requests a PTY with the given terminal settings.
    fn channel_request_pty(&mut self, channel: ChannelHandle, pty: &PtyOptions) -> i32;

    /// Resizes an already granted PTY.
    fn channel_request_pty_size(&mut self, channel: ChannelHandle, width: u16, height: u16)
        -> i32;

    /// Starts a process on the channel. `request` is the channel request
    /// type; `message` its argument, when the type takes one.
    fn channel_process_startup(
        &mut self,
        channel: ChannelHandle,
        request: &str,
        message: Option<&str>,
    ) -> i32;

    /// Starts the user's login shell.
    fn channel_shell(&mut self, channel: ChannelHandle) -> i32 {
        self.channel_process_startup(channel, "shell", None)
    }

    /// Executes a single command.
    fn channel_exec(&mut self, channel: ChannelHandle, command: &str) -> i32 {
        self.channel_process_startup(channel, "exec", Some(command))
    }

    /// Starts a named subsystem, such as `sftp`.
    fn channel_subsystem(&mut self, channel: ChannelHandle, subsystem: &str) -> i32 {
        self.channel_process_startup(channel, "subsystem", Some(subsystem))
    }

    // ------------------------------------------------------------------
    // Channel I/O
    // ------------------------------------------------------------------

    /// Reads from the channel's stdout into `buf`. Bytes read, `0` at
    /// stream end, or a negative code (`EAGAIN` for "poll again").
    fn channel_read(&mut self, channel: ChannelHandle, buf: &mut [u8]) -> i32;

    /// Reads from the channel's stderr into `buf`.
    fn channel_read_stderr(&mut self, channel: ChannelHandle, buf: &mut [u8]) -> i32;

    /// Writes to the channel's stdin. Bytes accepted or a negative code.
    fn channel_write(&mut self, channel: ChannelHandle, data: &[u8]) -> i32;

    /// Writes to the channel's stderr stream.
    fn channel_write_stderr(&mut self, channel: ChannelHandle, data: &[u8]) -> i32;

    /// Flushes pending stdout data.
    fn channel_flush(&mut self, channel: ChannelHandle) -> i32;

    /// Flushes pending stderr data.
    fn channel_flush_stderr(&mut self, channel: ChannelHandle) -> i32;

    // ------------------------------------------------------------------
    // Channel control
    // ------------------------------------------------------------------

    /// `1` if the remote sent EOF, `0` if not, negative on error.
    fn channel_eof(&self, channel: ChannelHandle) -> i32;

    /// Tells the remote no more data will be sent.
    fn channel_send_eof(&mut self, channel: ChannelHandle) -> i32;

    /// Waits for the remote's EOF acknowledgement.
    fn channel_wait_eof(&mut self, channel: ChannelHandle) -> i32;

    /// Waits for the remote to close the channel.
    fn channel_wait_closed(&mut self, channel: ChannelHandle) -> i32;

    /// Exit status of the channel's process, once closed.
    fn channel_get_exit_status(&self, channel: ChannelHandle) -> i32;

    /// Signal name that terminated the process, when there was one.
    fn channel_get_exit_signal(&self, channel: ChannelHandle) -> Option<String>;

    /// Closes the channel.
    fn channel_close(&mut self, channel: ChannelHandle) -> i32;

    /// Frees the channel. The handle is dead afterwards.
    fn channel_free(&mut self, channel: ChannelHandle);

    // ------------------------------------------------------------------
    // Port forwarding
    // ------------------------------------------------------------------

    /// Asks the remote to listen on `host:port` and forward connections
    /// back.
    fn channel_forward_listen(
        &mut self,
        session: SessionHandle,
        host: &str,
        port: u16,
    ) -> Option<ListenerHandle>;

    /// Accepts a forwarded connection as a new channel.
    fn channel_forward_accept(&mut self, listener: ListenerHandle) -> Option<ChannelHandle>;

    /// Cancels the remote listener.
    fn channel_forward_cancel(&mut self, listener: ListenerHandle) -> i32;

    // ------------------------------------------------------------------
    // SFTP
    // ------------------------------------------------------------------

    /// Starts the SFTP subsystem on the session.
    fn sftp_init(&mut self, session: SessionHandle) -> Option<SftpHandle>;

    /// Shuts the SFTP subsystem down.
    fn sftp_shutdown(&mut self, sftp: SftpHandle) -> i32;

    /// Opens a remote file. `flags` and `mode` use the SFTP protocol's
    /// own encoding.
    fn sftp_open(
        &mut self,
        sftp: SftpHandle,
        filename: &str,
        flags: u32,
        mode: u32,
    ) -> Option<SftpFileHandle>;

    /// Closes an open remote file.
    fn sftp_close(&mut self, handle: SftpFileHandle) -> i32;

    /// Reads from the file at its current offset.
    fn sftp_read(&mut self, handle: SftpFileHandle, buf: &mut [u8]) -> i32;

    /// Writes to the file at its current offset.
    fn sftp_write(&mut self, handle: SftpFileHandle, data: &[u8]) -> i32;

    /// Moves the file offset.
    fn sftp_seek(&mut self, handle: SftpFileHandle, offset: u64);

    /// Current file offset.
    fn sftp_tell(&self, handle: SftpFileHandle) -> u64;

    /// Attributes of a remote path, following symlinks.
    fn sftp_stat(&mut self, sftp: SftpHandle, path: &str) -> Option<SftpAttributes>;

    /// Attributes of a remote path, not following symlinks.
    fn sftp_lstat(&mut self, sftp: SftpHandle, path: &str) -> Option<SftpAttributes>;

    /// Attributes of an open file.
    fn sftp_fstat(&mut self, handle: SftpFileHandle) -> Option<SftpAttributes>;

    /// Updates attributes of a remote path.
    fn sftp_setstat(&mut self, sftp: SftpHandle, path: &str, attrs: &SftpAttributes) -> i32;

    /// Creates a remote directory.
    fn sftp_mkdir(&mut self, sftp: SftpHandle, path: &str, mode: u32) -> i32;

    /// Removes a remote directory.
    fn sftp_rmdir(&mut self, sftp: SftpHandle, path: &str) -> i32;

    /// Removes a remote file.
    fn sftp_unlink(&mut self, sftp: SftpHandle, filename: &str) -> i32;

    /// Renames a remote path.
    fn sftp_rename(&mut self, sftp: SftpHandle, source: &str, dest: &str) -> i32;

    // ------------------------------------------------------------------
    // Known hosts
    // ------------------------------------------------------------------

    /// Creates an empty known-hosts collection.
    fn knownhost_init(&mut self, session: SessionHandle) -> Option<KnownHostsHandle>;

    /// Frees the collection. The handle is dead afterwards.
    fn knownhost_free(&mut self, hosts: KnownHostsHandle);

    /// Loads entries from a file in the engine's sandbox filesystem.
    fn knownhost_readfile(&mut self, hosts: KnownHostsHandle, filename: &str) -> i32;

    /// Writes entries to a file in the engine's sandbox filesystem.
    fn knownhost_writefile(&mut self, hosts: KnownHostsHandle, filename: &str, format: i32)
        -> i32;

    /// Checks a presented host key against the collection.
    fn knownhost_check(
        &mut self,
        hosts: KnownHostsHandle,
        host: &str,
        key: &[u8],
        typemask: i32,
    ) -> KnownHostCheck;

    // ------------------------------------------------------------------
    // Tracing
    // ------------------------------------------------------------------

    /// Enables engine-internal tracing for the categories in `bitmask`.
    fn trace(&mut self, session: SessionHandle, bitmask: u32);

    /// Routes engine trace output to `handler`.
    fn trace_set_handler(&mut self, session: SessionHandle, handler: TraceHandler);
}

// ============================================================================
// Tests
// ============================================================================
